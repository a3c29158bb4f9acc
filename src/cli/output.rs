//! Output formatting for build reports
//!
//! A [`BuildReport`] is the serializable view of a resolved
//! [`Application`]: packages in build order, each with dependencies named by
//! import path rather than by arena id.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::BuilderConfig;
use crate::error::BuildError;
use crate::model::Application;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    Yaml,
    /// Human-readable formatted text
    Human,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageReport {
    pub import_path: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub base_dir: Option<PathBuf>,
    pub files: Vec<String>,
    pub dependencies: Vec<String>,
    pub has_init: bool,
    pub shadows_std: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    /// Packages in build order
    pub packages: Vec<PackageReport>,
    pub root_packages: Vec<String>,
}

impl BuildReport {
    pub fn from_application(app: &Application) -> Self {
        let packages = app
            .order()
            .iter()
            .map(|id| {
                let package = app.package(*id);
                PackageReport {
                    import_path: package.import_path.clone(),
                    base_dir: package.base_dir.clone(),
                    files: package.files.iter().map(|f| f.name.clone()).collect(),
                    dependencies: app
                        .dependencies_of(*id)
                        .map(|dep| dep.import_path.clone())
                        .collect(),
                    has_init: package.has_init,
                    shadows_std: package.shadows_std,
                }
            })
            .collect();

        Self {
            packages,
            root_packages: app
                .root_packages()
                .map(|p| p.import_path.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct ErrorReport {
    kind: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    violations: Vec<String>,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self, report: &BuildReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize build report to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(report).context("Failed to serialize build report to YAML")
            }
            OutputFormat::Human => Ok(self.format_human(report)),
        }
    }

    /// Renders a build failure; JSON and YAML carry the error kind
    pub fn format_error(&self, error: &BuildError) -> Result<String> {
        let report = ErrorReport {
            kind: error.kind(),
            message: error.to_string(),
            violations: error.violations().iter().map(ToString::to_string).collect(),
        };

        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&report)
                .context("Failed to serialize error to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(&report).context("Failed to serialize error to YAML")
            }
            OutputFormat::Human => {
                let mut output = format!(
                    "\u{2717} Build failed ({})\n{}\n",
                    report.kind, report.message
                );
                if report.violations.len() > 1 {
                    for violation in &report.violations {
                        output.push_str(&format!("  {}\n", violation));
                    }
                }
                Ok(output)
            }
        }
    }

    pub fn format_config(&self, config: &BuilderConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(config)
                .context("Failed to serialize config to JSON"),
            OutputFormat::Yaml => {
                serde_yaml::to_string(config).context("Failed to serialize config to YAML")
            }
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_human(&self, report: &BuildReport) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "\u{2713} Build Order ({} packages)\n",
            report.packages.len()
        ));
        output.push_str(&"\u{2501}".repeat(42));
        output.push_str("\n\n");

        for (i, package) in report.packages.iter().enumerate() {
            let mut flags = Vec::new();
            if package.has_init {
                flags.push("init");
            }
            if package.shadows_std {
                flags.push("shadows std");
            }
            if package.base_dir.is_some() {
                flags.push("external");
            }

            output.push_str(&format!("{:>3}. {}", i + 1, package.import_path));
            if !flags.is_empty() {
                output.push_str(&format!(" [{}]", flags.join(", ")));
            }
            output.push('\n');

            if let Some(dir) = &package.base_dir {
                output.push_str(&format!("     \u{251C}\u{2500} Dir:   {}\n", dir.display()));
            }
            output.push_str(&format!(
                "     \u{251C}\u{2500} Files: {}\n",
                package.files.join(", ")
            ));
            if package.dependencies.is_empty() {
                output.push_str("     \u{2514}\u{2500} Deps:  (none)\n");
            } else {
                output.push_str(&format!(
                    "     \u{2514}\u{2500} Deps:  {}\n",
                    package.dependencies.join(", ")
                ));
            }
        }

        output.push('\n');
        if report.root_packages.is_empty() {
            output.push_str("Root packages: (none)\n");
        } else {
            output.push_str(&format!(
                "Root packages: {}\n",
                report.root_packages.join(", ")
            ));
        }
        output
    }
}
