use crate::error::BuildError;
use crate::model::{Application, PackageId};
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::{BuildPhase, BuildState};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Reorders packages so every dependency precedes its dependents
pub struct BuildOrderPhase;

/// Dependency-first permutation of the application's current order
///
/// Works in rounds over the unselected tail: each package whose dependencies
/// are all selected is swapped to the front of the tail. An already sorted
/// order is returned unchanged. A round that selects nothing means the tail
/// holds a cycle, which is reported starting from its smallest import path.
pub fn topological_sort(app: &Application) -> Result<Vec<PackageId>, BuildError> {
    let mut order = app.order().to_vec();
    let mut selected: HashSet<PackageId> = HashSet::with_capacity(order.len());
    let mut start = 0;

    while start < order.len() {
        let mut n = start;
        for i in start..order.len() {
            let id = order[i];
            if app
                .package(id)
                .dependencies
                .iter()
                .all(|dep| selected.contains(dep))
            {
                selected.insert(id);
                order.swap(i, n);
                n += 1;
            }
        }

        if n == start {
            let cycle = find_cycle(app, &order[start..]);
            let mut paths: Vec<String> = cycle
                .iter()
                .map(|id| app.package(*id).import_path.clone())
                .collect();
            if let Some(first) = paths.first().cloned() {
                paths.push(first);
            }
            return Err(BuildError::CyclicDependency { cycle: paths });
        }
        start = n;
    }

    Ok(order)
}

/// A cycle among `remaining`, every member of which has an unselected dependency
fn find_cycle(app: &Application, remaining: &[PackageId]) -> Vec<PackageId> {
    let members: HashSet<PackageId> = remaining.iter().copied().collect();
    let Some(start) = remaining
        .iter()
        .copied()
        .min_by(|a, b| app.package(*a).import_path.cmp(&app.package(*b).import_path))
    else {
        return Vec::new();
    };

    let mut cycle = vec![start];
    let mut seen: HashMap<PackageId, usize> = HashMap::from([(start, 0)]);
    loop {
        let last = cycle[cycle.len() - 1];
        let dependencies = &app.package(last).dependencies;

        if let Some(i) = dependencies.iter().find_map(|dep| seen.get(dep).copied()) {
            return cycle.split_off(i);
        }

        let Some(next) = dependencies.iter().copied().find(|dep| members.contains(dep)) else {
            return cycle;
        };
        seen.insert(next, cycle.len());
        cycle.push(next);
    }
}

impl BuildPhase for BuildOrderPhase {
    fn name(&self) -> &'static str {
        "BuildOrderPhase"
    }

    fn execute(&self, _context: &PipelineContext, state: &mut BuildState) -> Result<(), BuildError> {
        let order = topological_sort(&state.app)?;
        state.app.set_order(order);
        info!(order = ?state.app.import_paths(), "Build order computed");
        Ok(())
    }
}
