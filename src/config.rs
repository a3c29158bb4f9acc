//! Configuration management for appgraph
//!
//! Settings load from environment variables with fallbacks, can be overlaid
//! with a TOML file, and are validated before a pipeline is built from them.
//!
//! # Environment Variables
//!
//! - `APPGRAPH_STDLIB_ROOT`: standard library root - falls back to `GOROOT`
//! - `APPGRAPH_ALLOWED_SHADOWS`: comma-separated import paths allowed to
//!   share a name with a standard package
//! - `APPGRAPH_WORKSPACE_ROOT`: workspace of reusable packages - falls back to
//!   `GOPATH`; unset disables external resolution
//! - `APPGRAPH_EXCLUDE_FILES`: regex over `importpath/filename` dropping files
//!   of externally resolved packages
//! - `APPGRAPH_LITERAL_EXEMPTIONS`: comma-separated `path.Type` pairs exempt
//!   from the untagged literal check, added to the built-in ones
//! - `APPGRAPH_BUILD_TAGS`: comma-separated build tags satisfied in addition
//!   to `appengine`
//! - `APPGRAPH_GOOS` / `APPGRAPH_GOARCH`: target platform for file selection -
//!   fall back to `GOOS` / `GOARCH`, then to the host
//! - `APPGRAPH_LOG_LEVEL`: logging level - default: "info"
//!
//! # Example
//!
//! ```no_run
//! use appgraph::BuilderConfig;
//!
//! let mut config = BuilderConfig::default();
//! config.merge_toml("allowed_shadows = [\"errors\"]").unwrap();
//! config.validate().expect("Invalid configuration");
//! ```

use crate::frontend::constraints::{
    host_goarch, host_goos, is_known_arch, is_known_os, is_valid_tag, DEFAULT_BUILD_TAG,
};
use crate::validation::ImportValidator;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Exemptions registered for every build
const DEFAULT_LITERAL_EXEMPTIONS: &[&str] =
    &["appengine/datastore.PropertyList", "appengine.MultiError"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid exclusion pattern {pattern:?}: {error}")]
    InvalidExclusionPattern { pattern: String, error: String },

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// `import-path.TypeName` pairs the untagged literal check skips
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LiteralExemptions(BTreeSet<String>);

impl LiteralExemptions {
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    pub fn with_defaults() -> Self {
        Self(DEFAULT_LITERAL_EXEMPTIONS.iter().map(|s| s.to_string()).collect())
    }

    pub fn insert(&mut self, entry: impl Into<String>) -> bool {
        self.0.insert(entry.into())
    }

    pub fn contains(&self, import_path: &str, type_name: &str) -> bool {
        self.0.contains(&format!("{}.{}", import_path, type_name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for LiteralExemptions {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<S: Into<String>> Extend<S> for LiteralExemptions {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// Inputs every build shares
///
/// Constructed once before the pipeline runs and passed in; nothing in it is
/// mutated while a build is in progress.
#[derive(Debug, Clone, Serialize)]
pub struct BuilderConfig {
    /// Root of the standard library tree (`<root>/src/<path>`)
    pub stdlib_root: Option<PathBuf>,

    /// Import paths permitted to collide with standard package names
    pub allowed_shadows: BTreeSet<String>,

    /// Workspace of reusable packages; `None` disables external resolution
    pub workspace_root: Option<PathBuf>,

    /// Regex over `importpath/filename` for externally resolved files
    pub exclude_files: Option<String>,

    pub literal_exemptions: LiteralExemptions,

    /// Tags build constraints are evaluated against, besides platform and release tags
    pub build_tags: BTreeSet<String>,

    /// Target operating system, in GOOS spelling
    pub goos: String,

    /// Target architecture, in GOARCH spelling
    pub goarch: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for BuilderConfig {
    /// Loads `APPGRAPH_*` variables, falling back to `GOROOT`/`GOPATH`
    fn default() -> Self {
        let stdlib_root = non_empty_var("APPGRAPH_STDLIB_ROOT")
            .or_else(|| non_empty_var("GOROOT"))
            .map(PathBuf::from);

        let workspace_root = non_empty_var("APPGRAPH_WORKSPACE_ROOT")
            .or_else(|| non_empty_var("GOPATH"))
            .map(PathBuf::from);

        let allowed_shadows = list_var("APPGRAPH_ALLOWED_SHADOWS").into_iter().collect();

        let exclude_files = non_empty_var("APPGRAPH_EXCLUDE_FILES");

        let mut literal_exemptions = LiteralExemptions::with_defaults();
        literal_exemptions.extend(list_var("APPGRAPH_LITERAL_EXEMPTIONS"));

        let mut build_tags = default_build_tags();
        build_tags.extend(list_var("APPGRAPH_BUILD_TAGS"));

        let goos = non_empty_var("APPGRAPH_GOOS")
            .or_else(|| non_empty_var("GOOS"))
            .unwrap_or_else(host_goos);

        let goarch = non_empty_var("APPGRAPH_GOARCH")
            .or_else(|| non_empty_var("GOARCH"))
            .unwrap_or_else(host_goarch);

        let log_level = env::var("APPGRAPH_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            stdlib_root,
            allowed_shadows,
            workspace_root,
            exclude_files,
            literal_exemptions,
            build_tags,
            goos,
            goarch,
            log_level,
        }
    }
}

fn default_build_tags() -> BTreeSet<String> {
    BTreeSet::from([DEFAULT_BUILD_TAG.to_string()])
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn list_var(key: &str) -> Vec<String> {
    env::var(key)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Shape of a `--config` file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    stdlib_root: Option<PathBuf>,
    #[serde(default)]
    allowed_shadows: Vec<String>,
    workspace_root: Option<PathBuf>,
    exclude_files: Option<String>,
    #[serde(default)]
    literal_exemptions: Vec<String>,
    #[serde(default)]
    build_tags: Vec<String>,
    goos: Option<String>,
    goarch: Option<String>,
    log_level: Option<String>,
}

impl BuilderConfig {
    /// Configuration with no environment input and only the built-in exemptions
    pub fn empty() -> Self {
        Self {
            stdlib_root: None,
            allowed_shadows: BTreeSet::new(),
            workspace_root: None,
            exclude_files: None,
            literal_exemptions: LiteralExemptions::with_defaults(),
            build_tags: default_build_tags(),
            goos: host_goos(),
            goarch: host_goarch(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    /// Overlays values from a TOML document
    ///
    /// Scalars replace the current value; lists add to it.
    pub fn merge_toml(&mut self, source: &str) -> Result<(), ConfigError> {
        let file: ConfigFile = toml::from_str(source).map_err(|e| ConfigError::ParseError {
            field: "config file".to_string(),
            error: e.to_string(),
        })?;

        if let Some(root) = file.stdlib_root {
            self.stdlib_root = Some(root);
        }
        if let Some(root) = file.workspace_root {
            self.workspace_root = Some(root);
        }
        if let Some(pattern) = file.exclude_files {
            self.exclude_files = Some(pattern);
        }
        if let Some(goos) = file.goos {
            self.goos = goos;
        }
        if let Some(goarch) = file.goarch {
            self.goarch = goarch;
        }
        if let Some(level) = file.log_level {
            self.log_level = level.to_lowercase();
        }
        self.allowed_shadows.extend(file.allowed_shadows);
        self.literal_exemptions.extend(file.literal_exemptions);
        self.build_tags.extend(file.build_tags);
        Ok(())
    }

    /// Validates the configuration
    ///
    /// Checks that:
    /// - the exclusion pattern compiles
    /// - every literal exemption has `path.Type` shape
    /// - every allowed shadow is a legal import path
    /// - the target platform names a known GOOS and GOARCH
    /// - every build tag is well formed
    /// - the log level is known
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.exclusion_regex()?;

        for entry in self.literal_exemptions.iter() {
            let well_formed = entry.rsplit_once('.').is_some_and(|(path, ty)| {
                !path.is_empty()
                    && !ty.is_empty()
                    && !ty.contains('/')
                    && ty.chars().all(|c| c == '_' || c.is_alphanumeric())
            });
            if !well_formed {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid literal exemption {:?}: expected import-path.TypeName",
                    entry
                )));
            }
        }

        let validator = ImportValidator::new();
        for shadow in &self.allowed_shadows {
            validator.validate(shadow).map_err(|e| {
                ConfigError::ValidationFailed(format!("Invalid allowed shadow {:?}: {}", shadow, e))
            })?;
        }

        if !is_known_os(&self.goos) {
            return Err(ConfigError::ValidationFailed(format!(
                "Unknown GOOS {:?}",
                self.goos
            )));
        }
        if !is_known_arch(&self.goarch) {
            return Err(ConfigError::ValidationFailed(format!(
                "Unknown GOARCH {:?}",
                self.goarch
            )));
        }
        if let Some(tag) = self.build_tags.iter().find(|t| !is_valid_tag(t)) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid build tag {:?}",
                tag
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    /// Compiled exclusion pattern, if one is configured
    pub fn exclusion_regex(&self) -> Result<Option<Regex>, ConfigError> {
        self.exclude_files
            .as_deref()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidExclusionPattern {
                    pattern: pattern.to_string(),
                    error: e.to_string(),
                })
            })
            .transpose()
    }
}

impl fmt::Display for BuilderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn or_unset(value: Option<String>) -> String {
            value.unwrap_or_else(|| "(unset)".to_string())
        }

        writeln!(f, "Appgraph Configuration:")?;
        writeln!(
            f,
            "  Stdlib Root: {}",
            or_unset(self.stdlib_root.as_ref().map(|p| p.display().to_string()))
        )?;
        writeln!(
            f,
            "  Workspace Root: {}",
            or_unset(self.workspace_root.as_ref().map(|p| p.display().to_string()))
        )?;
        writeln!(f, "  Exclude Files: {}", or_unset(self.exclude_files.clone()))?;
        writeln!(
            f,
            "  Allowed Shadows: {}",
            self.allowed_shadows.iter().cloned().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(
            f,
            "  Literal Exemptions: {}",
            self.literal_exemptions.iter().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(f, "  Target: {}/{}", self.goos, self.goarch)?;
        writeln!(
            f,
            "  Build Tags: {}",
            self.build_tags.iter().cloned().collect::<Vec<_>>().join(", ")
        )?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
