//! Command handlers; each returns the process exit code

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::commands::{ConfigArgs, ResolveArgs};
use super::output::{BuildReport, OutputFormat, OutputFormatter};
use crate::config::BuilderConfig;
use crate::error::BuildError;
use crate::frontend::{Frontend, GoFrontend};
use crate::pipeline::{PipelineContext, PipelineOrchestrator};
use crate::progress::{LoggingHandler, ProgressHandler};

/// Environment defaults, then the config file, then command-line flags
fn load_config(config_file: Option<&Path>) -> Result<BuilderConfig> {
    let mut config = BuilderConfig::default();
    if let Some(path) = config_file {
        let source = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        config
            .merge_toml(&source)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
    }
    Ok(config)
}

fn apply_flags(config: &mut BuilderConfig, args: &ResolveArgs) {
    if let Some(root) = &args.stdlib_root {
        config.stdlib_root = Some(root.clone());
    }
    if let Some(root) = &args.workspace_root {
        config.workspace_root = Some(root.clone());
    }
    if let Some(pattern) = &args.exclude_files {
        config.exclude_files = Some(pattern.clone());
    }
    if let Some(goos) = &args.goos {
        config.goos = goos.clone();
    }
    if let Some(goarch) = &args.goarch {
        config.goarch = goarch.clone();
    }
    config.allowed_shadows.extend(args.allow_shadows.iter().cloned());
    config
        .literal_exemptions
        .extend(args.exempt_literals.iter().cloned());
    config.build_tags.extend(args.build_tags.iter().cloned());
}

/// Source files under `base_dir`, relative and `/`-separated, sorted
///
/// Hidden and git-ignored entries are skipped.
pub fn discover_source_files(base_dir: &Path, frontend: &dyn Frontend) -> Vec<String> {
    let mut files = Vec::new();
    for result in WalkBuilder::new(base_dir).git_ignore(true).build() {
        let entry = match result {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "Failed to read directory entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let is_source = entry
            .file_name()
            .to_str()
            .is_some_and(|name| frontend.is_source_file(name));
        if !is_source {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(base_dir) else {
            continue;
        };
        let components: Option<Vec<&str>> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect();
        match components {
            Some(parts) => files.push(parts.join("/")),
            None => warn!(path = %entry.path().display(), "Skipping non-UTF-8 path"),
        }
    }
    files.sort();
    debug!(count = files.len(), "Discovered source files");
    files
}

fn write_output(output: &str, path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("Failed to write output to {}", path.display())),
        None => {
            print!("{}", output);
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

pub fn handle_resolve(args: &ResolveArgs, quiet: bool) -> i32 {
    let format: OutputFormat = args.format.into();
    let formatter = OutputFormatter::new(format);

    let mut config = match load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };
    apply_flags(&mut config, args);

    let context = match PipelineContext::from_config(config) {
        Ok(context) => context,
        Err(e) => return report_failure(&formatter, &e, args.output.as_ref()),
    };

    let base_dir = args.base_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let files = if args.files.is_empty() {
        discover_source_files(&base_dir, &GoFrontend::new())
    } else {
        args.files.clone()
    };

    let handler = if quiet {
        None
    } else {
        Some(Arc::new(LoggingHandler) as Arc<dyn ProgressHandler>)
    };
    let app = match PipelineOrchestrator::new(handler).execute(&context, &base_dir, &files) {
        Ok(app) => app,
        Err(e) => return report_failure(&formatter, &e, args.output.as_ref()),
    };

    let rendered = match formatter.format(&BuildReport::from_application(&app)) {
        Ok(rendered) => rendered,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return 1;
        }
    };
    match write_output(&rendered, args.output.as_ref()) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}

/// Prints a build error in the requested format and yields exit code 1
fn report_failure(
    formatter: &OutputFormatter,
    err: &BuildError,
    output: Option<&PathBuf>,
) -> i32 {
    error!(kind = err.kind(), "{}", err);
    match formatter.format_error(err) {
        Ok(rendered) => {
            if let Err(e) = write_output(&rendered, output) {
                eprintln!("Error: {:#}", e);
            }
        }
        Err(e) => eprintln!("Error: {:#}", e),
    }
    1
}

pub fn handle_config(args: &ConfigArgs) -> i32 {
    let result = load_config(args.config.as_deref()).and_then(|config| {
        config.validate()?;
        OutputFormatter::new(args.format.into()).format_config(&config)
    });

    match result {
        Ok(rendered) => match write_output(&rendered, None) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("Error: {:#}", e);
                1
            }
        },
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    }
}
