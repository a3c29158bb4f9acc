use crate::error::BuildError;
use crate::model::Package;
use crate::oracle::synthetic_import_path;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::{BuildPhase, BuildState};
use std::mem;
use tracing::{debug, info};

/// Import path no application package may take
pub const RESERVED_IMPORT_PATH: &str = "main";

/// Turns each directory's files into a registered [`Package`]
pub struct AssemblePhase;

impl AssemblePhase {
    fn import_path_for(context: &PipelineContext, dir: &str) -> String {
        if dir == "." {
            synthetic_import_path(context.suffix_source.next_suffix())
        } else {
            dir.to_string()
        }
    }
}

impl BuildPhase for AssemblePhase {
    fn name(&self) -> &'static str {
        "AssemblePhase"
    }

    fn execute(&self, context: &PipelineContext, state: &mut BuildState) -> Result<(), BuildError> {
        for (dir, files) in mem::take(&mut state.dir_files) {
            let import_path = Self::import_path_for(context, &dir);
            if import_path == RESERVED_IMPORT_PATH {
                return Err(BuildError::ReservedImportPath);
            }

            let shadows_std = context.stdlib.is_standard(&import_path);
            if shadows_std && !context.config.allowed_shadows.contains(&import_path) {
                return Err(BuildError::ShadowsStandardPackage { import_path });
            }

            let mut package = Package::new(import_path, files);
            package.shadows_std = shadows_std;
            debug!(
                dir = %dir,
                import_path = %package.import_path,
                files = package.files.len(),
                has_init = package.has_init,
                "Assembled package"
            );

            state.app.insert_package(package).map_err(|existing| {
                BuildError::PackageDiscovery {
                    dir: dir.clone(),
                    message: format!(
                        "import path {} is already taken",
                        state.app.package(existing).import_path
                    ),
                }
            })?;
        }

        info!(
            packages = state.app.len(),
            root_packages = state.app.root_packages().count(),
            "Assembled application packages"
        );
        Ok(())
    }
}
