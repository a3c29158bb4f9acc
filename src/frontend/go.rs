//! Declaration-level parser for Go source files

use super::ast::{CompositeLit, Decl, Element, FuncDecl, ImportSpec, Position, SourceFile, TypeExpr};
use super::lexer::{tokenize, Token, TokenKind};
use super::{Frontend, SyntaxError};

/// Default [`Frontend`] for Go sources
///
/// Parses the package clause, imports, function signatures and composite
/// literals. Statement and expression structure beyond that is skipped by
/// bracket matching, so any file that lexes and has balanced brackets parses.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoFrontend;

impl GoFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Frontend for GoFrontend {
    fn parse(&self, file_name: &str, source: &str) -> Result<SourceFile, SyntaxError> {
        let lexed = tokenize(file_name, source)?;
        let eof = lexed
            .tokens
            .last()
            .map(|t| t.position)
            .unwrap_or(Position::new(1, 1));
        let mut parser = Parser {
            file: file_name,
            tokens: lexed.tokens,
            pos: 0,
            eof,
        };
        let (package_name, package_line, decls) = parser.parse_file()?;

        let build_constraints = lexed
            .comments
            .into_iter()
            .filter(|c| c.position.line < package_line)
            .filter(|c| c.text.starts_with("//go:build") || c.text.starts_with("// +build"))
            .map(|c| c.text)
            .collect();

        Ok(SourceFile {
            name: file_name.to_string(),
            package_name,
            build_constraints,
            decls,
        })
    }

    fn is_source_file(&self, file_name: &str) -> bool {
        file_name.ends_with(".go")
            && !file_name.ends_with("_test.go")
            && !file_name.starts_with('.')
            && !file_name.starts_with('_')
    }
}

/// Decodes a Go string literal (interpreted or raw)
pub fn unquote(literal: &str) -> Option<String> {
    if literal.len() >= 2 && literal.starts_with('`') && literal.ends_with('`') {
        return Some(literal[1..literal.len() - 1].replace('\r', ""));
    }
    if literal.len() < 2 || !literal.starts_with('"') || !literal.ends_with('"') {
        return None;
    }

    let body = &literal[1..literal.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return None,
            '\\' => {
                let decoded = match chars.next()? {
                    'a' => '\u{7}',
                    'b' => '\u{8}',
                    'f' => '\u{c}',
                    'n' => '\n',
                    'r' => '\r',
                    't' => '\t',
                    'v' => '\u{b}',
                    '\\' => '\\',
                    '"' => '"',
                    'x' => hex_escape(&mut chars, 2)?,
                    'u' => hex_escape(&mut chars, 4)?,
                    'U' => hex_escape(&mut chars, 8)?,
                    d @ '0'..='7' => {
                        let mut value = d.to_digit(8)?;
                        for _ in 0..2 {
                            value = value * 8 + chars.next()?.to_digit(8)?;
                        }
                        char::from_u32(value).filter(|_| value <= 255)?
                    }
                    _ => return None,
                };
                out.push(decoded);
            }
            c => out.push(c),
        }
    }
    Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..digits {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(value)
}

struct Parser<'a> {
    file: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    eof: Position,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn at(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    fn peek_is_op(&self, op: &str) -> bool {
        self.peek().is_some_and(|t| t.is_op(op))
    }

    fn error_at(&self, index: usize, message: impl Into<String>) -> SyntaxError {
        let position = self.at(index).map(|t| t.position).unwrap_or(self.eof);
        SyntaxError::new(self.file, position, message)
    }

    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        self.error_at(self.pos, message)
    }

    fn skip_semis(&mut self) {
        while self.peek().is_some_and(Token::is_semi) {
            self.pos += 1;
        }
    }

    fn expect_end_of_decl(&mut self) -> Result<(), SyntaxError> {
        match self.peek() {
            None => Ok(()),
            Some(t) if t.is_semi() => {
                self.pos += 1;
                Ok(())
            }
            Some(_) => Err(self.error_here("expected ';' after declaration")),
        }
    }

    /// Index of the bracket closing the one at `open`
    fn matching(&self, open: usize) -> Result<usize, SyntaxError> {
        let mut stack: Vec<&'static str> = Vec::new();
        for index in open..self.tokens.len() {
            let op: &'static str = match &self.tokens[index].kind {
                TokenKind::Op(op) => op,
                _ => continue,
            };
            match op {
                "(" => stack.push(")"),
                "[" => stack.push("]"),
                "{" => stack.push("}"),
                ")" | "]" | "}" => {
                    if stack.pop() != Some(op) {
                        return Err(self.error_at(index, format!("unexpected {}", op)));
                    }
                    if stack.is_empty() {
                        return Ok(index);
                    }
                }
                _ => {}
            }
        }
        Err(SyntaxError::new(self.file, self.eof, "unexpected EOF"))
    }

    fn parse_file(&mut self) -> Result<(String, usize, Vec<Decl>), SyntaxError> {
        self.skip_semis();
        let package_line = match self.peek() {
            Some(t) if t.is_ident("package") => t.position.line,
            _ => return Err(self.error_here("expected 'package'")),
        };
        self.pos += 1;
        let package_name = self
            .peek()
            .and_then(Token::name)
            .map(str::to_string)
            .ok_or_else(|| self.error_here("expected package name"))?;
        self.pos += 1;
        self.expect_end_of_decl()?;

        let mut decls = Vec::new();
        let mut past_imports = false;
        loop {
            self.skip_semis();
            let Some(token) = self.peek() else {
                break;
            };
            let keyword = token.ident().unwrap_or_default().to_string();
            match keyword.as_str() {
                "import" => {
                    if past_imports {
                        return Err(
                            self.error_here("imports must appear before other declarations")
                        );
                    }
                    decls.push(Decl::Import(self.parse_import_decl()?));
                }
                "func" => {
                    past_imports = true;
                    decls.push(Decl::Func(self.parse_func_decl()?));
                }
                "var" | "const" | "type" => {
                    past_imports = true;
                    decls.push(Decl::Value(self.parse_value_decl()?));
                }
                _ => return Err(self.error_here("non-declaration statement outside function body")),
            }
        }

        Ok((package_name, package_line, decls))
    }

    fn parse_import_decl(&mut self) -> Result<Vec<ImportSpec>, SyntaxError> {
        self.pos += 1;
        let mut specs = Vec::new();
        if self.peek_is_op("(") {
            self.pos += 1;
            loop {
                self.skip_semis();
                match self.peek() {
                    Some(t) if t.is_op(")") => {
                        self.pos += 1;
                        break;
                    }
                    Some(_) => specs.push(self.parse_import_spec()?),
                    None => return Err(self.error_here("unexpected EOF in import declaration")),
                }
            }
        } else {
            specs.push(self.parse_import_spec()?);
        }
        self.expect_end_of_decl()?;
        Ok(specs)
    }

    fn parse_import_spec(&mut self) -> Result<ImportSpec, SyntaxError> {
        let start = self.peek().map(|t| t.position).unwrap_or(self.eof);
        let name = match self.peek() {
            Some(t) if t.is_op(".") => Some(".".to_string()),
            Some(t) => t.name().map(str::to_string),
            None => None,
        };
        if name.is_some() {
            self.pos += 1;
        }

        let path_literal = match self.peek().map(|t| &t.kind) {
            Some(TokenKind::Str(lit)) => lit.clone(),
            _ => return Err(self.error_here("missing import path")),
        };
        self.pos += 1;

        match self.peek() {
            Some(t) if t.is_semi() || t.is_op(")") => {}
            None => {}
            Some(_) => return Err(self.error_here("expected ';' after import spec")),
        }

        Ok(ImportSpec {
            name,
            path_literal,
            position: start,
        })
    }

    fn parse_func_decl(&mut self) -> Result<FuncDecl, SyntaxError> {
        let position = self.tokens[self.pos].position;
        self.pos += 1;

        let mut has_receiver = false;
        if self.peek_is_op("(") {
            self.pos = self.matching(self.pos)? + 1;
            has_receiver = true;
        }

        let name = self
            .peek()
            .and_then(Token::name)
            .map(str::to_string)
            .ok_or_else(|| self.error_here("expected function name"))?;
        self.pos += 1;

        if self.peek_is_op("[") {
            self.pos = self.matching(self.pos)? + 1;
        }

        if !self.peek_is_op("(") {
            return Err(self.error_here("expected '(' in function signature"));
        }
        let close = self.matching(self.pos)?;
        let param_count = self.count_fields(self.pos + 1, close);
        self.pos = close + 1;

        let result_count = match self.peek() {
            None => 0,
            Some(t) if t.is_op("{") || t.is_semi() => 0,
            Some(t) if t.is_op("(") => {
                let close = self.matching(self.pos)?;
                let count = self.count_fields(self.pos + 1, close);
                self.pos = close + 1;
                count
            }
            Some(_) => {
                self.skip_result_type()?;
                1
            }
        };

        let mut literals = Vec::new();
        if self.peek_is_op("{") {
            let close = self.matching(self.pos)?;
            literals = self.scan_literals(self.pos + 1, close)?;
            self.pos = close + 1;
        }
        self.expect_end_of_decl()?;

        Ok(FuncDecl {
            name,
            position,
            has_receiver,
            param_count,
            result_count,
            literals,
        })
    }

    /// Skips an unparenthesized result type, stopping at the body or the end of the declaration
    fn skip_result_type(&mut self) -> Result<(), SyntaxError> {
        while let Some(token) = self.peek() {
            if token.is_semi() {
                break;
            }
            let type_literal = token.is_ident("struct") || token.is_ident("interface");
            if type_literal && self.at(self.pos + 1).is_some_and(|t| t.is_op("{")) {
                self.pos = self.matching(self.pos + 1)? + 1;
            } else if token.is_op("{") {
                break;
            } else if token.is_op("(") || token.is_op("[") {
                self.pos = self.matching(self.pos)? + 1;
            } else {
                self.pos += 1;
            }
        }
        Ok(())
    }

    /// Number of comma-separated fields between `start` and `end` (exclusive)
    fn count_fields(&self, start: usize, end: usize) -> usize {
        self.split_top_level(start, end).len()
    }

    /// Splits a bracketed range at depth-0 commas, dropping empty segments
    fn split_top_level(&self, start: usize, end: usize) -> Vec<(usize, usize)> {
        let mut segments = Vec::new();
        let mut depth = 0usize;
        let mut segment_start = start;
        for index in start..=end {
            let at_boundary = index == end
                || (depth == 0 && self.tokens[index].is_op(","));
            if at_boundary {
                let non_empty = self.tokens[segment_start..index]
                    .iter()
                    .any(|t| !t.is_semi());
                if non_empty {
                    segments.push((segment_start, index));
                }
                segment_start = index + 1;
                continue;
            }
            match self.tokens[index].kind {
                TokenKind::Op("(" | "[" | "{") => depth += 1,
                TokenKind::Op(")" | "]" | "}") => depth = depth.saturating_sub(1),
                _ => {}
            }
        }
        segments
    }

    fn parse_value_decl(&mut self) -> Result<Vec<CompositeLit>, SyntaxError> {
        self.pos += 1;
        if self.peek_is_op("(") {
            let close = self.matching(self.pos)?;
            let literals = self.scan_literals(self.pos + 1, close)?;
            self.pos = close + 1;
            self.expect_end_of_decl()?;
            return Ok(literals);
        }

        let start = self.pos;
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Semi if depth == 0 => break,
                TokenKind::Op("(" | "[" | "{") => depth += 1,
                TokenKind::Op(")" | "]" | "}") => {
                    if depth == 0 {
                        return Err(self.error_here(format!("unexpected {:?}", token.kind)));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.pos += 1;
        }
        if depth != 0 {
            return Err(self.error_here("unexpected EOF"));
        }
        let literals = self.scan_literals(start, self.pos)?;
        self.expect_end_of_decl()?;
        Ok(literals)
    }

    /// Finds the outermost composite literals in `start..end`
    fn scan_literals(&self, start: usize, end: usize) -> Result<Vec<CompositeLit>, SyntaxError> {
        let mut literals = Vec::new();
        let mut depth = 0usize;
        // Paren depth of each open `if`/`for`/`switch` header awaiting its block.
        let mut headers: Vec<usize> = Vec::new();
        let mut index = start;

        while index < end {
            let token = &self.tokens[index];
            match &token.kind {
                TokenKind::Ident(w) if matches!(w.as_str(), "if" | "for" | "switch") => {
                    headers.push(depth);
                }
                TokenKind::Op("(" | "[") => depth += 1,
                TokenKind::Op(")" | "]") => depth = depth.saturating_sub(1),
                TokenKind::Op("{") => {
                    if headers.last() == Some(&depth) {
                        headers.pop();
                    }
                }
                TokenKind::Ident(_) if token.name().is_some() => {
                    let in_header = headers.last() == Some(&depth);
                    if let Some((literal, next)) = self.composite_lit_at(index, end, in_header)? {
                        literals.push(literal);
                        index = next;
                        continue;
                    }
                }
                _ => {}
            }
            index += 1;
        }

        Ok(literals)
    }

    fn composite_lit_at(
        &self,
        index: usize,
        end: usize,
        in_header: bool,
    ) -> Result<Option<(CompositeLit, usize)>, SyntaxError> {
        let prev = index.checked_sub(1).and_then(|i| self.at(i));
        if prev.is_some_and(|t| t.is_op(".")) {
            return Ok(None);
        }

        let token = &self.tokens[index];
        let Some(name) = token.name() else {
            return Ok(None);
        };
        let next = |offset: usize| self.at(index + offset).filter(|_| index + offset < end);

        let (mut ty, brace) = if next(1).is_some_and(|t| t.is_op("."))
            && next(3).is_some_and(|t| t.is_op("{"))
        {
            match next(2).and_then(Token::name) {
                Some(selected) => (
                    TypeExpr::Selector {
                        package: name.to_string(),
                        name: selected.to_string(),
                    },
                    index + 3,
                ),
                None => return Ok(None),
            }
        } else if next(1).is_some_and(|t| t.is_op("{")) {
            (TypeExpr::Ident(name.to_string()), index + 1)
        } else {
            return Ok(None);
        };

        let (start, bracketed) = self.type_prefix_start(index);
        let before = start.checked_sub(1).and_then(|i| self.at(i));
        // `func() T {` opens a function body
        if before.is_some_and(|t| t.is_op(")")) {
            return Ok(None);
        }
        if bracketed {
            ty = TypeExpr::Other;
        }
        if in_header && ty != TypeExpr::Other {
            return Ok(None);
        }

        let close = self.matching(brace)?;
        if close >= end {
            return Err(self.error_at(end, "unexpected EOF"));
        }

        let mut elements = Vec::new();
        for (start, stop) in self.split_top_level(brace + 1, close) {
            let keyed = self.has_top_level_colon(start, stop);
            let nested = self.scan_literals(start, stop)?;
            elements.push(Element { keyed, nested });
        }

        Ok(Some((
            CompositeLit {
                position: token.position,
                ty,
                elements,
            },
            close + 1,
        )))
    }

    /// Walks back from the type name at `index` over `*`, `[..]`, `map`
    /// and channel prefixes, returning where the type starts and whether
    /// it passed a bracketed prefix
    fn type_prefix_start(&self, index: usize) -> (usize, bool) {
        let mut start = index;
        let mut bracketed = false;
        while let Some(prev) = start.checked_sub(1).and_then(|i| self.at(i)) {
            if prev.is_op("*") || prev.is_ident("chan") {
                start -= 1;
            } else if prev.is_op("<-") {
                let chan_before = start
                    .checked_sub(2)
                    .and_then(|i| self.at(i))
                    .is_some_and(|t| t.is_ident("chan"));
                let chan_after = start < index && self.tokens[start].is_ident("chan");
                if !(chan_before || chan_after) {
                    break;
                }
                start -= 1;
            } else if prev.is_op("]") {
                match self.matching_back(start - 1) {
                    Some(open) => {
                        start = open;
                        bracketed = true;
                        if start
                            .checked_sub(1)
                            .and_then(|i| self.at(i))
                            .is_some_and(|t| t.is_ident("map"))
                        {
                            start -= 1;
                        }
                    }
                    None => break,
                }
            } else {
                break;
            }
        }
        (start, bracketed)
    }

    fn matching_back(&self, close: usize) -> Option<usize> {
        let mut depth = 0usize;
        for index in (0..=close).rev() {
            match self.tokens[index].kind {
                TokenKind::Op(")" | "]" | "}") => depth += 1,
                TokenKind::Op("(" | "[" | "{") => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(index);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn has_top_level_colon(&self, start: usize, end: usize) -> bool {
        let mut depth = 0usize;
        for token in &self.tokens[start..end] {
            match token.kind {
                TokenKind::Op("(" | "[" | "{") => depth += 1,
                TokenKind::Op(")" | "]" | "}") => depth = depth.saturating_sub(1),
                TokenKind::Op(":") if depth == 0 => return true,
                _ => {}
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> SourceFile {
        GoFrontend.parse("test.go", src).unwrap()
    }

    fn literals(file: &SourceFile) -> Vec<CompositeLit> {
        struct Collect(Vec<CompositeLit>);
        impl super::super::Visitor for Collect {
            fn visit_composite_lit(&mut self, lit: &CompositeLit) {
                self.0.push(lit.clone());
            }
        }
        let mut collect = Collect(Vec::new());
        super::super::walk_source_file(&mut collect, file);
        collect.0
    }

    fn selector(package: &str, name: &str) -> TypeExpr {
        TypeExpr::Selector {
            package: package.into(),
            name: name.into(),
        }
    }

    #[test]
    fn test_package_and_imports() {
        let file = parse(
            r#"// Package web serves pages.
package web

import "fmt"

import (
	"net/http"
	str "strings"
	. "math"
	_ "embed"
	`example.com/raw`
)
"#,
        );
        assert_eq!(file.package_name, "web");

        let imports: Vec<(Option<&str>, &str)> = file
            .imports()
            .map(|s| (s.name.as_deref(), s.path_literal.as_str()))
            .collect();
        assert_eq!(
            imports,
            vec![
                (None, "\"fmt\""),
                (None, "\"net/http\""),
                (Some("str"), "\"strings\""),
                (Some("."), "\"math\""),
                (Some("_"), "\"embed\""),
                (None, "`example.com/raw`"),
            ]
        );
        assert_eq!(file.imports().nth(1).unwrap().position, Position::new(7, 2));
    }

    #[test]
    fn test_consecutive_single_imports() {
        let file = parse("package a\nimport \"fmt\"\nimport \"os\"\nfunc f() {}\n");
        let paths: Vec<&str> = file.imports().map(|s| s.path_literal.as_str()).collect();
        assert_eq!(paths, vec!["\"fmt\"", "\"os\""]);
        assert_eq!(file.funcs().count(), 1);
    }

    #[test]
    fn test_function_signatures() {
        let file = parse(
            r#"package p

func init() {}

func (s *Server) init() {}

func initialize() {}

func helper(a, b int, c string) (int, error) { return 0, nil }

func single() error { return nil }

func anon() interface{ M() } { return nil }

func generic[T any](v T) T { return v }

func asm(x int) int
"#,
        );
        let funcs: Vec<(&str, bool, usize, usize)> = file
            .funcs()
            .map(|f| (f.name.as_str(), f.has_receiver, f.param_count, f.result_count))
            .collect();
        assert_eq!(
            funcs,
            vec![
                ("init", false, 0, 0),
                ("init", true, 0, 0),
                ("initialize", false, 0, 0),
                ("helper", false, 3, 2),
                ("single", false, 0, 1),
                ("anon", false, 0, 1),
                ("generic", false, 1, 1),
                ("asm", false, 1, 1),
            ]
        );
        let inits: Vec<bool> = file.funcs().map(FuncDecl::is_init).collect();
        assert_eq!(inits, vec![true, false, false, false, false, false, false, false]);
    }

    #[test]
    fn test_init_with_parameters_is_not_initializer() {
        let file = parse("package p\nfunc init(x int) {}\nfunc init() int { return 1 }\n");
        assert!(file.funcs().all(|f| !f.is_init()));
    }

    #[test]
    fn test_composite_literals_keyed_and_positional() {
        let file = parse(
            r#"package p

import "net/http"

var c = &http.Cookie{Name: "a", Value: "b"}

func f() {
	r := http.Request{nil, "GET"}
	_ = Local{1, 2}
}
"#,
        );
        let lits = literals(&file);
        assert_eq!(lits.len(), 3);

        assert_eq!(lits[0].ty, selector("http", "Cookie"));
        assert!(lits[0].all_keyed());
        assert_eq!(lits[0].position, Position::new(5, 10));

        assert_eq!(lits[1].ty, selector("http", "Request"));
        assert!(!lits[1].all_keyed());
        assert_eq!(lits[1].elements.len(), 2);
        assert_eq!(lits[1].position, Position::new(8, 7));

        assert_eq!(lits[2].ty, TypeExpr::Ident("Local".into()));
    }

    #[test]
    fn test_nested_and_wrapped_literals() {
        let file = parse(
            r#"package p

var routes = []http.Route{
	{Path: "/", H: mux.Handler{a, b}},
}

var m = map[string]*big.Int{"one": big.Int{}}
"#,
        );
        let lits = literals(&file);
        let types: Vec<&TypeExpr> = lits.iter().map(|l| &l.ty).collect();
        assert_eq!(
            types,
            vec![
                &TypeExpr::Other,
                &selector("mux", "Handler"),
                &TypeExpr::Other,
                &selector("big", "Int"),
            ]
        );
        assert!(!lits[1].all_keyed());
        assert!(lits[2].all_keyed());
        assert!(lits[3].elements.is_empty());
    }

    #[test]
    fn test_control_clause_braces_are_blocks() {
        let file = parse(
            r#"package p

func f() {
	if x == os.Stdout {
		return
	}
	for _, v := range []os.Signal{a, b} {
		_ = v
	}
	switch v := val.(type) {
	}
	if ok := check(sync.Mutex{}); ok {
	}
	g := func() io.Reader { return nil }
	_ = g
}
"#,
        );
        let lits = literals(&file);
        let types: Vec<&TypeExpr> = lits.iter().map(|l| &l.ty).collect();
        assert_eq!(types, vec![&TypeExpr::Other, &selector("sync", "Mutex")]);
    }

    #[test]
    fn test_func_literal_result_types_are_not_literals() {
        let file = parse(
            r#"package p

import (
	"net/http"
	"os"
)

var mk = func() chan os.Signal { return make(chan os.Signal) }

var recv = func() <-chan os.Signal { return nil }

func f() {
	newReq := func() *http.Request { return nil }
	headers := func() map[string]http.Header { return nil }
	handler := func(w http.ResponseWriter, r *http.Request) {}
	cookies := []*http.Cookie{{Name: "a"}}
	_, _, _, _ = newReq, headers, handler, cookies
}
"#,
        );
        let lits = literals(&file);
        let types: Vec<&TypeExpr> = lits.iter().map(|l| &l.ty).collect();
        assert_eq!(types, vec![&TypeExpr::Other]);
        assert_eq!(lits[0].elements.len(), 1);
    }

    #[test]
    fn test_send_statement_value_is_literal() {
        let file = parse("package p
func f() {
	ch <- pkg.Msg{1}
}
");
        let lits = literals(&file);
        assert_eq!(lits.len(), 1);
        assert_eq!(lits[0].ty, selector("pkg", "Msg"));
    }

    #[test]
    fn test_slice_expressions_do_not_count_as_keys() {
        let file = parse("package p\nvar x = pkg.T{a[1:2], m[k]}\n");
        let lits = literals(&file);
        assert_eq!(lits.len(), 1);
        assert!(lits[0].elements.iter().all(|e| !e.keyed));
    }

    #[test]
    fn test_build_constraints_above_package_only() {
        let file = parse("//go:build ignore\n\npackage tool\n\n// +build linux\nfunc f() {}\n");
        assert_eq!(file.build_constraints, vec!["//go:build ignore"]);
        assert!(!crate::frontend::BuildContext::host()
            .matches_constraints(&file.build_constraints)
            .unwrap());
    }

    #[test]
    fn test_syntax_errors() {
        let err = GoFrontend.parse("a.go", "func f() {}\n").unwrap_err();
        assert_eq!(err.to_string(), "a.go:1:1: expected 'package'");

        let err = GoFrontend
            .parse("a.go", "package a\nfunc f() {\n")
            .unwrap_err();
        assert!(err.message.contains("unexpected EOF"));

        let err = GoFrontend
            .parse("a.go", "package a\nvar x = 1\nimport \"fmt\"\n")
            .unwrap_err();
        assert_eq!(err.line, 3);
        assert!(err.message.contains("imports must appear before"));

        let err = GoFrontend
            .parse("a.go", "package a\nx := 1\n")
            .unwrap_err();
        assert!(err.message.contains("non-declaration statement"));

        let err = GoFrontend
            .parse("a.go", "package a\nimport fmt\n")
            .unwrap_err();
        assert!(err.message.contains("missing import path"));
    }

    #[test]
    fn test_is_source_file() {
        let fe = GoFrontend::new();
        assert!(fe.is_source_file("main.go"));
        assert!(!fe.is_source_file("main_test.go"));
        assert!(!fe.is_source_file("_scratch.go"));
        assert!(!fe.is_source_file(".hidden.go"));
        assert!(!fe.is_source_file("README.md"));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"net/http\"").as_deref(), Some("net/http"));
        assert_eq!(unquote("`raw/path`").as_deref(), Some("raw/path"));
        assert_eq!(unquote("\"a\\x41\\u00e9\\101\"").as_deref(), Some("aAéA"));
        assert_eq!(unquote("\"tab\\t\"").as_deref(), Some("tab\t"));
        assert_eq!(unquote("\"bad\\q\""), None);
        assert_eq!(unquote("\"unterminated"), None);
        assert_eq!(unquote("plain"), None);
    }
}
