use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Dependency graph builder for Go-style applications
#[derive(Parser, Debug)]
#[command(
    name = "appgraph",
    about = "Resolve an application's packages into a dependency-ordered build graph",
    version,
    long_about = "appgraph parses an application's source files, groups them into packages, \
                  validates imports and struct literals, resolves external packages from a \
                  workspace, and prints the packages in dependency order."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Build the dependency graph of an application",
        long_about = "Parses the given files (or every .go file under BASE_DIR) and prints \
                      the application's packages in build order.\n\n\
                      Examples:\n  \
                      appgraph resolve\n  \
                      appgraph resolve ./app main.go lib/util.go\n  \
                      appgraph resolve ./app --workspace-root ~/go --format json"
    )]
    Resolve(ResolveArgs),

    #[command(about = "Show the effective configuration")]
    Config(ConfigArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(
        value_name = "BASE_DIR",
        help = "Application root (defaults to current directory)"
    )]
    pub base_dir: Option<PathBuf>,

    #[arg(
        value_name = "FILES",
        help = "Source files relative to BASE_DIR (discovered when omitted)"
    )]
    pub files: Vec<String>,

    #[arg(long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Root of the standard library tree")]
    pub stdlib_root: Option<PathBuf>,

    #[arg(long, value_name = "DIR", help = "Workspace for external packages")]
    pub workspace_root: Option<PathBuf>,

    #[arg(
        long = "allow-shadow",
        value_name = "IMPORT_PATH",
        help = "Permit a package to share a standard package's name (repeatable)"
    )]
    pub allow_shadows: Vec<String>,

    #[arg(
        long,
        value_name = "REGEX",
        help = "Exclude external files whose importpath/filename matches"
    )]
    pub exclude_files: Option<String>,

    #[arg(
        long = "exempt-literal",
        value_name = "PATH.TYPE",
        help = "Allow untagged literals of a standard type (repeatable)"
    )]
    pub exempt_literals: Vec<String>,

    #[arg(
        long = "tag",
        value_name = "TAG",
        help = "Build tag satisfied by constraint lines (repeatable)"
    )]
    pub build_tags: Vec<String>,

    #[arg(long, value_name = "GOOS", help = "Target operating system for file selection")]
    pub goos: Option<String>,

    #[arg(long, value_name = "GOARCH", help = "Target architecture for file selection")]
    pub goarch: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(long, value_name = "FILE", help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}
