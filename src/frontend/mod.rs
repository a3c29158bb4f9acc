//! Language frontend boundary
//!
//! The core never parses source text itself. It asks a [`Frontend`] for a
//! [`SourceFile`]: the declared package name, the raw import specs, the
//! function declarations needed to spot initializers, and the composite
//! literals the tagging check walks over.
//!
//! [`GoFrontend`] is the default implementation, a small lexer and
//! declaration-level parser for the Go subset those facts require.

pub mod ast;
pub mod constraints;
mod go;
mod lexer;

pub use ast::{
    walk_source_file, CompositeLit, Decl, Element, FuncDecl, ImportSpec, Position, SourceFile,
    TypeExpr, Visitor,
};
pub use constraints::{BuildContext, ConstraintError};
pub use go::{unquote, GoFrontend};

use thiserror::Error;

/// A parse failure, reported verbatim by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct SyntaxError {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(file: &str, position: Position, message: impl Into<String>) -> Self {
        Self {
            file: file.to_string(),
            line: position.line,
            column: position.column,
            message: message.into(),
        }
    }
}

/// Turns one source file into its parsed form
pub trait Frontend: Send + Sync {
    /// Parse `source`, whose display name is `file_name`
    fn parse(&self, file_name: &str, source: &str) -> Result<SourceFile, SyntaxError>;

    /// Whether a directory entry named `file_name` is a compilable source file
    fn is_source_file(&self, file_name: &str) -> bool;
}
