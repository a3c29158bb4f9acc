use crate::error::BuildError;
use crate::model::PackageId;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::{BuildPhase, BuildState};
use tracing::{debug, info};

/// Links every package to the packages it imports
///
/// Imports that name no registered package are dropped; they are assumed to
/// be standard-library packages. Each dependency list is unique and sorted
/// by import path.
pub struct GraphPhase;

impl BuildPhase for GraphPhase {
    fn name(&self) -> &'static str {
        "GraphPhase"
    }

    fn execute(&self, _context: &PipelineContext, state: &mut BuildState) -> Result<(), BuildError> {
        let mut edges = 0usize;
        for id in state.app.order().to_vec() {
            let package = state.app.package(id);
            let dependencies: Vec<PackageId> = package
                .imports()
                .into_iter()
                .filter_map(|path| state.app.id_of(path))
                .collect();
            debug!(
                import_path = %package.import_path,
                dependencies = dependencies.len(),
                "Linked package"
            );

            edges += dependencies.len();
            state.app.package_mut(id).dependencies = dependencies;
        }

        info!(packages = state.app.len(), edges, "Dependency graph built");
        Ok(())
    }
}
