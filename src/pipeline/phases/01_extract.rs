use crate::error::BuildError;
use crate::frontend::{unquote, SourceFile};
use crate::fs::{FileSystem, OverlayFileSystem};
use crate::model::File;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::{BuildPhase, BuildState};
use crate::validation::check_literals;
use std::collections::BTreeSet;
use std::path::{Component, Path};
use std::sync::Arc;
use tracing::{debug, info};

/// Groups the supplied files by directory and turns each into a [`File`]
///
/// Directories are read through an [`OverlayFileSystem`], so only listed files
/// are ever considered part of the application.
pub struct ExtractPhase;

/// Slash-separated parent directory of a relative file name, `.` at top level
fn relative_dir(filename: &str) -> Option<String> {
    let path = Path::new(filename);
    let parent = path.parent()?;
    path.file_name()?;

    let mut parts = Vec::new();
    for component in parent.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => return None,
        }
    }

    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}

/// Validates one parsed file and reduces it to a [`File`] record
///
/// Fails on the first illegal import path, or with every untagged
/// standard-library literal in the file.
pub fn extract_file(context: &PipelineContext, parsed: &SourceFile) -> Result<File, BuildError> {
    let mut import_paths = Vec::new();
    for spec in parsed.imports() {
        let path = unquote(&spec.path_literal).ok_or_else(|| BuildError::BadImportLiteral {
            file: parsed.name.clone(),
            literal: spec.path_literal.clone(),
        })?;
        context
            .import_validator
            .validate(&path)
            .map_err(|e| BuildError::InvalidImportPath {
                file: parsed.name.clone(),
                path: path.clone(),
                reason: e.to_string(),
            })?;
        import_paths.push(path);
    }

    let violations = check_literals(
        parsed,
        context.stdlib.as_ref(),
        &context.config.literal_exemptions,
    );
    if !violations.is_empty() {
        return Err(BuildError::UntaggedLiterals {
            file: parsed.name.clone(),
            violations,
        });
    }

    Ok(File {
        name: parsed.name.clone(),
        package_name: parsed.package_name.clone(),
        import_paths,
        has_init: parsed.funcs().any(|f| f.is_init()),
    })
}

impl ExtractPhase {
    fn extract_dir(
        &self,
        context: &PipelineContext,
        overlay: &OverlayFileSystem,
        dir: &str,
    ) -> Result<Vec<File>, BuildError> {
        let dir_path = overlay.base_dir().join(dir);
        let mut entries = overlay
            .read_dir(&dir_path)
            .map_err(|e| BuildError::io(&dir_path, e))?;
        entries.retain(|e| {
            e.is_file()
                && context.frontend.is_source_file(e.file_name())
                && context.build_context.matches_file_name(e.file_name())
        });
        entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));

        let mut files: Vec<File> = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = if dir == "." {
                entry.file_name().to_string()
            } else {
                format!("{}/{}", dir, entry.file_name())
            };

            let source = overlay
                .read_to_string(entry.path())
                .map_err(|e| BuildError::io(entry.path(), e))?;
            let parsed = context.frontend.parse(&name, &source)?;
            let included = context
                .build_context
                .matches_constraints(&parsed.build_constraints)
                .map_err(|e| BuildError::PackageDiscovery {
                    dir: dir.to_string(),
                    message: format!("{}: {}", name, e),
                })?;
            if !included {
                debug!(file = %name, "Skipping file excluded by build constraints");
                continue;
            }

            if let Some(first) = files.first() {
                if first.package_name != parsed.package_name {
                    return Err(BuildError::PackageDiscovery {
                        dir: dir.to_string(),
                        message: format!(
                            "found packages {} ({}) and {} ({})",
                            first.package_name, first.name, parsed.package_name, name
                        ),
                    });
                }
            }

            let file = extract_file(context, &parsed)?;
            debug!(
                file = %file.name,
                package = %file.package_name,
                imports = file.import_paths.len(),
                has_init = file.has_init,
                "Extracted file"
            );
            files.push(file);
        }

        Ok(files)
    }
}

impl BuildPhase for ExtractPhase {
    fn name(&self) -> &'static str {
        "ExtractPhase"
    }

    fn execute(&self, context: &PipelineContext, state: &mut BuildState) -> Result<(), BuildError> {
        let mut dirs = BTreeSet::new();
        for filename in &state.filenames {
            let dir = relative_dir(filename).ok_or_else(|| BuildError::MalformedFilename {
                name: filename.clone(),
            })?;
            dirs.insert(dir);
        }

        let overlay = OverlayFileSystem::new(
            &state.base_dir,
            &state.filenames,
            Arc::clone(&context.file_system),
        );

        for dir in dirs {
            let files = self.extract_dir(context, &overlay, &dir)?;
            if files.is_empty() {
                debug!(dir = %dir, "No buildable files, skipping directory");
                continue;
            }
            state.dir_files.insert(dir, files);
        }

        info!(
            dirs = state.dir_files.len(),
            files = state.dir_files.values().map(Vec::len).sum::<usize>(),
            "Extracted application files"
        );
        Ok(())
    }
}
