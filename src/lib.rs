//! appgraph - dependency graph builder for Go-style applications
//!
//! Given an application's root directory and its source files, appgraph
//! groups the files into packages by directory, validates every import and
//! every composite literal of a standard-library struct type, optionally
//! pulls in packages from a workspace, and returns an [`Application`] whose
//! packages are ordered so that each one follows all of its dependencies.
//!
//! # Example Usage
//!
//! ```no_run
//! use appgraph::{parse_files, BuilderConfig, PipelineContext};
//! use std::path::Path;
//!
//! let ctx = PipelineContext::from_config(BuilderConfig::default())?;
//! let files = vec!["main.go".to_string(), "lib/lib.go".to_string()];
//! let app = parse_files(&ctx, Path::new("/src/app"), &files)?;
//!
//! for package in app.packages() {
//!     println!("{}", package.import_path);
//! }
//! # Ok::<(), appgraph::BuildError>(())
//! ```
//!
//! # Project Structure
//!
//! - [`frontend`]: source parsing behind the [`Frontend`] trait
//! - [`oracle`]: standard-library, workspace and naming collaborators
//! - [`pipeline`]: the build phases and their orchestrator
//! - [`model`]: the resulting package arena and build order

pub mod cli;
pub mod config;
pub mod error;
pub mod frontend;
pub mod fs;
pub mod model;
pub mod oracle;
pub mod pipeline;
pub mod progress;
pub mod util;
pub mod validation;

pub use config::{BuilderConfig, ConfigError, LiteralExemptions};
pub use error::{BuildError, LiteralViolation};
pub use frontend::{BuildContext, Frontend, GoFrontend, SyntaxError};
pub use model::{Application, File, Package, PackageId};
pub use oracle::{StandardLibrary, SuffixSource, Workspace};
pub use pipeline::{PipelineContext, PipelineOrchestrator};
pub use progress::{LoggingHandler, NoOpHandler, ProgressEvent, ProgressHandler};

use std::path::Path;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Builds the application rooted at `base_dir` from `filenames`
///
/// Filenames are relative to `base_dir` and `/`-separated. Runs every phase
/// without progress reporting; use [`PipelineOrchestrator`] directly to
/// observe the build.
pub fn parse_files(
    context: &PipelineContext,
    base_dir: &Path,
    filenames: &[String],
) -> Result<Application, BuildError> {
    PipelineOrchestrator::new(None).execute(context, base_dir, filenames)
}
