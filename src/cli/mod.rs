pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{CliArgs, Commands, ConfigArgs, ResolveArgs};
pub use output::{BuildReport, OutputFormat, OutputFormatter, PackageReport};
