//! Tokenizer for the Go subset understood by [`super::GoFrontend`]

use super::{Position, SyntaxError};

pub(crate) const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

// Longest first so that prefix matching picks `<<=` over `<<` over `<`.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=",
    "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "+", "-", "*", "/", "%", "&", "|",
    "^", "<", ">", "=", "!", "(", ")", "[", "]", "{", "}", ",", ".", ":", "~",
];

pub(crate) fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    Ident(String),
    /// String literal including its quotes
    Str(String),
    Char,
    Number,
    Op(&'static str),
    /// Explicit `;` or one inserted at a line end
    Semi,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    pub fn is_op(&self, op: &str) -> bool {
        matches!(self.kind, TokenKind::Op(o) if o == op)
    }

    pub fn is_ident(&self, word: &str) -> bool {
        matches!(&self.kind, TokenKind::Ident(w) if w == word)
    }

    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Ident(w) => Some(w),
            _ => None,
        }
    }

    /// An identifier that is not a keyword
    pub fn name(&self) -> Option<&str> {
        self.ident().filter(|w| !is_keyword(w))
    }

    pub fn is_semi(&self) -> bool {
        self.kind == TokenKind::Semi
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Comment {
    pub text: String,
    pub position: Position,
}

#[derive(Debug, Default)]
pub(crate) struct Lexed {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

struct Lexer<'a> {
    file: &'a str,
    src: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
    line: usize,
    line_start: usize,
    semi_pending: bool,
    out: Lexed,
}

pub(crate) fn tokenize(file: &str, src: &str) -> Result<Lexed, SyntaxError> {
    let mut lexer = Lexer {
        file,
        src,
        chars: src.char_indices().collect(),
        index: 0,
        line: 1,
        line_start: 0,
        semi_pending: false,
        out: Lexed::default(),
    };
    lexer.run()?;
    Ok(lexer.out)
}

impl<'a> Lexer<'a> {
    fn offset(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(o, _)| *o)
            .unwrap_or(self.src.len())
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.offset() - self.line_start + 1)
    }

    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).map(|(_, c)| *c)
    }

    fn bump(&mut self) -> Option<char> {
        let (offset, c) = *self.chars.get(self.index)?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.line_start = offset + 1;
        }
        Some(c)
    }

    fn error(&self, position: Position, message: &str) -> SyntaxError {
        SyntaxError::new(self.file, position, message)
    }

    fn push(&mut self, kind: TokenKind, position: Position) {
        self.semi_pending = match &kind {
            TokenKind::Ident(w) => {
                !is_keyword(w) || matches!(w.as_str(), "break" | "continue" | "fallthrough" | "return")
            }
            TokenKind::Str(_) | TokenKind::Char | TokenKind::Number => true,
            TokenKind::Op(op) => matches!(*op, ")" | "]" | "}" | "++" | "--"),
            TokenKind::Semi => false,
        };
        self.out.tokens.push(Token { kind, position });
    }

    fn newline(&mut self, position: Position) {
        if self.semi_pending {
            self.push(TokenKind::Semi, position);
        }
    }

    fn run(&mut self) -> Result<(), SyntaxError> {
        // A byte order mark is only legal as the first character
        if self.peek() == Some('\u{feff}') {
            self.bump();
            self.line_start = self.offset();
        }
        while let Some(c) = self.peek() {
            let start = self.position();
            match c {
                '\n' => {
                    self.newline(start);
                    self.bump();
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek_at(1) == Some('/') => self.line_comment(start),
                '/' if self.peek_at(1) == Some('*') => self.block_comment(start)?,
                '"' => self.interpreted_string(start)?,
                '`' => self.raw_string(start)?,
                '\'' => self.rune(start)?,
                ';' => {
                    self.bump();
                    self.push(TokenKind::Semi, start);
                }
                c if c.is_ascii_digit() => self.number(start),
                '.' if self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => self.number(start),
                c if c.is_alphabetic() || c == '_' => self.identifier(start),
                _ => self.operator(start)?,
            }
        }
        let end = self.position();
        self.newline(end);
        Ok(())
    }

    fn line_comment(&mut self, start: Position) {
        let begin = self.offset();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
        }
        let text = self.src[begin..self.offset()].trim_end().to_string();
        self.out.comments.push(Comment {
            text,
            position: start,
        });
    }

    fn block_comment(&mut self, start: Position) -> Result<(), SyntaxError> {
        let begin = self.offset();
        self.bump();
        self.bump();
        let mut saw_newline = false;
        loop {
            match self.bump() {
                Some('*') if self.peek() == Some('/') => {
                    self.bump();
                    break;
                }
                Some('\n') => saw_newline = true,
                Some(_) => {}
                None => return Err(self.error(start, "comment not terminated")),
            }
        }
        self.out.comments.push(Comment {
            text: self.src[begin..self.offset()].to_string(),
            position: start,
        });
        if saw_newline {
            self.newline(start);
        }
        Ok(())
    }

    fn interpreted_string(&mut self, start: Position) -> Result<(), SyntaxError> {
        let begin = self.offset();
        self.bump();
        loop {
            match self.peek() {
                Some('"') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some('\n') | None => {
                    return Err(self.error(start, "string literal not terminated"))
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        let text = self.src[begin..self.offset()].to_string();
        self.push(TokenKind::Str(text), start);
        Ok(())
    }

    fn raw_string(&mut self, start: Position) -> Result<(), SyntaxError> {
        let begin = self.offset();
        self.bump();
        loop {
            match self.bump() {
                Some('`') => break,
                Some(_) => {}
                None => return Err(self.error(start, "raw string literal not terminated")),
            }
        }
        let text = self.src[begin..self.offset()].to_string();
        self.push(TokenKind::Str(text), start);
        Ok(())
    }

    fn rune(&mut self, start: Position) -> Result<(), SyntaxError> {
        self.bump();
        loop {
            match self.peek() {
                Some('\'') => {
                    self.bump();
                    break;
                }
                Some('\\') => {
                    self.bump();
                    if self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                Some('\n') | None => return Err(self.error(start, "rune literal not terminated")),
                Some(_) => {
                    self.bump();
                }
            }
        }
        self.push(TokenKind::Char, start);
        Ok(())
    }

    fn number(&mut self, start: Position) {
        let begin = self.offset();
        let hex = self.peek() == Some('0') && matches!(self.peek_at(1), Some('x' | 'X'));
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' || c == '.' {
                self.bump();
                continue;
            }
            let prev = self.src[begin..self.offset()].chars().last();
            let exponent = match prev {
                Some('p' | 'P') => true,
                Some('e' | 'E') => !hex,
                _ => false,
            };
            if (c == '+' || c == '-') && exponent {
                self.bump();
                continue;
            }
            break;
        }
        self.push(TokenKind::Number, start);
    }

    fn identifier(&mut self, start: Position) {
        let begin = self.offset();
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }
        let word = self.src[begin..self.offset()].to_string();
        self.push(TokenKind::Ident(word), start);
    }

    fn operator(&mut self, start: Position) -> Result<(), SyntaxError> {
        let rest = &self.src[self.offset()..];
        let op = OPERATORS
            .iter()
            .find(|op| rest.starts_with(*op))
            .copied()
            .ok_or_else(|| {
                let c = rest.chars().next().unwrap_or('?');
                self.error(start, &format!("invalid character {:?}", c))
            })?;
        for _ in 0..op.chars().count() {
            self.bump();
        }
        self.push(TokenKind::Op(op), start);
        Ok(())
    }
}
