//! Build errors
//!
//! Every failure of a build is a single [`BuildError`]. The untagged-literal
//! check is the one case that aggregates: all violations found in a file are
//! carried together instead of only the first.

use crate::config::ConfigError;
use crate::frontend::{Position, SyntaxError};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// A positional composite literal of a standard-library type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralViolation {
    pub file: String,
    pub position: Position,
    pub import_path: String,
    pub type_name: String,
}

impl fmt::Display for LiteralViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: composite struct literal {}.{} with untagged fields",
            self.file, self.position, self.import_path, self.type_name
        )
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("bad filename {name:?}")]
    MalformedFilename { name: String },

    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    #[error("{file}: bad ImportSpec {literal}")]
    BadImportLiteral { file: String, literal: String },

    #[error("{file}: bad import {path:?}: {reason}")]
    InvalidImportPath {
        file: String,
        path: String,
        reason: String,
    },

    #[error("{}", format_violations(.violations))]
    UntaggedLiterals {
        file: String,
        violations: Vec<LiteralViolation>,
    },

    #[error("top-level main package is forbidden")]
    ReservedImportPath,

    #[error("package {import_path:?} has the same name as a standard package")]
    ShadowsStandardPackage { import_path: String },

    #[error("package {import_path} required, but all its files were excluded by the exclusion pattern")]
    ExternalPackageExcluded { import_path: String },

    #[error("cyclic dependency graph: {}", .cycle.join(" -> "))]
    CyclicDependency { cycle: Vec<String> },

    #[error("failed parsing dir {dir}: {message}")]
    PackageDiscovery { dir: String, message: String },

    #[error("{}: {message}", .path.display())]
    Io { path: PathBuf, message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn format_violations(violations: &[LiteralViolation]) -> String {
    let mut out = violations
        .first()
        .map(ToString::to_string)
        .unwrap_or_default();
    if violations.len() > 1 {
        out.push_str(&format!(" (and {} more errors)", violations.len() - 1));
    }
    out
}

impl BuildError {
    /// Stable kebab-case name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            BuildError::MalformedFilename { .. } => "malformed-input",
            BuildError::Syntax(_) => "frontend-syntax-error",
            BuildError::BadImportLiteral { .. } | BuildError::InvalidImportPath { .. } => {
                "invalid-import-path"
            }
            BuildError::UntaggedLiterals { .. } => "literal-tagging-violation",
            BuildError::ReservedImportPath => "reserved-identifier",
            BuildError::ShadowsStandardPackage { .. } => "name-shadow-not-allowed",
            BuildError::ExternalPackageExcluded { .. } => "external-package-fully-excluded",
            BuildError::CyclicDependency { .. } => "cyclic-dependency",
            BuildError::PackageDiscovery { .. } => "package-discovery",
            BuildError::Io { .. } => "io",
            BuildError::Config(_) => "config",
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, err: anyhow::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            message: format!("{:#}", err),
        }
    }

    /// Every violation, for errors that aggregate them
    pub fn violations(&self) -> &[LiteralViolation] {
        match self {
            BuildError::UntaggedLiterals { violations, .. } => violations,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violation(line: usize, ty: &str) -> LiteralViolation {
        LiteralViolation {
            file: "a/a.go".into(),
            position: Position::new(line, 9),
            import_path: "net/http".into(),
            type_name: ty.into(),
        }
    }

    #[test]
    fn test_violation_display() {
        assert_eq!(
            violation(4, "Cookie").to_string(),
            "a/a.go:4:9: composite struct literal net/http.Cookie with untagged fields"
        );
    }

    #[test]
    fn test_untagged_literals_aggregate() {
        let err = BuildError::UntaggedLiterals {
            file: "a/a.go".into(),
            violations: vec![violation(4, "Cookie"), violation(7, "Request")],
        };
        assert_eq!(err.kind(), "literal-tagging-violation");
        assert_eq!(err.violations().len(), 2);
        assert!(err.to_string().ends_with("(and 1 more errors)"));
    }

    #[test]
    fn test_cycle_message() {
        let err = BuildError::CyclicDependency {
            cycle: vec!["p".into(), "q".into(), "p".into()],
        };
        assert_eq!(err.to_string(), "cyclic dependency graph: p -> q -> p");
        assert_eq!(err.kind(), "cyclic-dependency");
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            BuildError::ReservedImportPath.to_string(),
            "top-level main package is forbidden"
        );
        assert_eq!(
            BuildError::ShadowsStandardPackage {
                import_path: "fmt".into()
            }
            .to_string(),
            "package \"fmt\" has the same name as a standard package"
        );
        assert_eq!(
            BuildError::MalformedFilename { name: "/".into() }.kind(),
            "malformed-input"
        );
    }

    #[test]
    fn test_io_keeps_context_chain() {
        let inner = anyhow::anyhow!("no such file").context("Failed to read a/b.go");
        let err = BuildError::io("a/b.go", inner);
        assert_eq!(err.to_string(), "a/b.go: Failed to read a/b.go: no such file");
        assert_eq!(err.kind(), "io");
    }
}
