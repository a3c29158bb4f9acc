//! Pluggable answers the pipeline asks of its environment
//!
//! - [`StandardLibrary`]: is an import path part of the standard library?
//! - [`Workspace`]: where are the sources of a reusable package?
//! - [`SuffixSource`]: which numeric suffix names the top-level package?

pub mod naming;
pub mod stdlib;
pub mod workspace;

pub use naming::{synthetic_import_path, FixedSuffix, RandomSuffix, SuffixSource};
pub use stdlib::{CachedStdlib, GorootStdlib, StandardLibrary, StaticStdlib};
pub use workspace::{GopathWorkspace, LookupError, Workspace, WorkspacePackage};
