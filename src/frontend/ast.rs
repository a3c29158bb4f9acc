//! Parsed form of a source file, reduced to what package assembly inspects

use serde::Serialize;
use std::fmt;

/// 1-based line and byte column
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub package_name: String,
    /// Build constraint lines (`//go:build ...`, `// +build ...`) above the package clause
    pub build_constraints: Vec<String>,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    /// Import specs of every import declaration, in source order
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls.iter().flat_map(|decl| {
            let specs: &[ImportSpec] = match decl {
                Decl::Import(specs) => specs,
                _ => &[],
            };
            specs
        })
    }

    pub fn funcs(&self) -> impl Iterator<Item = &FuncDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Func(func) => Some(func),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Import(Vec<ImportSpec>),
    Func(FuncDecl),
    /// `var`, `const` or `type` declaration; only its literals matter
    Value(Vec<CompositeLit>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit local name (`_`, `.`, or an identifier)
    pub name: Option<String>,
    /// The path literal exactly as written, quotes included
    pub path_literal: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub name: String,
    pub position: Position,
    pub has_receiver: bool,
    pub param_count: usize,
    pub result_count: usize,
    pub literals: Vec<CompositeLit>,
}

impl FuncDecl {
    /// A true package initializer: `func init()` with no receiver, params, or results
    pub fn is_init(&self) -> bool {
        self.name == "init" && !self.has_receiver && self.param_count == 0 && self.result_count == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`
    Ident(String),
    /// `pkg.T`
    Selector { package: String, name: String },
    /// slice, array, map, or anything else that is not a bare name
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeLit {
    pub position: Position,
    pub ty: TypeExpr,
    pub elements: Vec<Element>,
}

impl CompositeLit {
    pub fn all_keyed(&self) -> bool {
        self.elements.iter().all(|e| e.keyed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// `Key: value` rather than a bare value
    pub keyed: bool,
    /// Composite literals appearing inside this element
    pub nested: Vec<CompositeLit>,
}

/// Callbacks for [`walk_source_file`]
pub trait Visitor {
    fn visit_import(&mut self, _spec: &ImportSpec) {}

    fn visit_func(&mut self, _func: &FuncDecl) {}

    fn visit_composite_lit(&mut self, _lit: &CompositeLit) {}
}

/// Visits declarations in source order, descending into nested literals
pub fn walk_source_file<V: Visitor + ?Sized>(visitor: &mut V, file: &SourceFile) {
    for decl in &file.decls {
        match decl {
            Decl::Import(specs) => specs.iter().for_each(|spec| visitor.visit_import(spec)),
            Decl::Func(func) => {
                visitor.visit_func(func);
                walk_literals(visitor, &func.literals);
            }
            Decl::Value(literals) => walk_literals(visitor, literals),
        }
    }
}

fn walk_literals<V: Visitor + ?Sized>(visitor: &mut V, literals: &[CompositeLit]) {
    for lit in literals {
        visitor.visit_composite_lit(lit);
        for element in &lit.elements {
            walk_literals(visitor, &element.nested);
        }
    }
}
