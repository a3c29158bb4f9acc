use crate::error::BuildError;
use crate::model::{File, Package, PackageId};
use crate::oracle::WorkspacePackage;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::phase_trait::{BuildPhase, BuildState};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Pulls in workspace packages reachable from the application, transitively
///
/// Works through a queue of packages whose imports have not been examined
/// yet; every package it registers joins the back of the queue. Lookup
/// failures are logged once per import path and otherwise ignored.
pub struct ExternalPhase;

impl ExternalPhase {
    fn to_package(
        context: &PipelineContext,
        import_path: &str,
        found: WorkspacePackage,
    ) -> Result<Package, BuildError> {
        let files: Vec<File> = found
            .files
            .iter()
            .filter(|name| match &context.exclusion {
                Some(re) => !re.is_match(&format!("{}/{}", import_path, name)),
                None => true,
            })
            .map(|name| File {
                name: name.clone(),
                package_name: found.name.clone(),
                // Package-level imports stand in for each file's own list.
                import_paths: found.imports.clone(),
                has_init: false,
            })
            .collect();

        if files.is_empty() {
            return Err(BuildError::ExternalPackageExcluded {
                import_path: import_path.to_string(),
            });
        }

        let mut package = Package::new(import_path, files);
        package.base_dir = Some(found.dir);
        Ok(package)
    }
}

impl BuildPhase for ExternalPhase {
    fn name(&self) -> &'static str {
        "ExternalPhase"
    }

    fn execute(&self, context: &PipelineContext, state: &mut BuildState) -> Result<(), BuildError> {
        let Some(workspace) = &context.workspace else {
            debug!("No workspace configured, skipping external resolution");
            return Ok(());
        };

        let mut queue: VecDeque<PackageId> = state.app.order().iter().copied().collect();
        let mut unresolved: HashSet<String> = HashSet::new();
        let mut added = 0usize;

        while let Some(id) = queue.pop_front() {
            let imports: Vec<String> = state
                .app
                .package(id)
                .files
                .iter()
                .flat_map(|f| f.import_paths.iter().cloned())
                .collect();

            for import_path in imports {
                if unresolved.contains(&import_path)
                    || state.app.contains(&import_path)
                    || context.stdlib.is_standard(&import_path)
                {
                    continue;
                }

                let found = match workspace.locate(&import_path) {
                    Ok(found) => found,
                    Err(e) => {
                        warn!(import_path = %import_path, error = %e, "Can't find package in workspace");
                        unresolved.insert(import_path);
                        continue;
                    }
                };

                let package = Self::to_package(context, &import_path, found)?;
                debug!(
                    import_path = %import_path,
                    files = package.files.len(),
                    "Resolved external package"
                );
                if let Ok(new_id) = state.app.insert_package(package) {
                    queue.push_back(new_id);
                    added += 1;
                }
            }
        }

        info!(
            added,
            unresolved = unresolved.len(),
            "External resolution complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuilderConfig;
    use crate::frontend::GoFrontend;
    use crate::fs::MockFileSystem;
    use crate::oracle::{LookupError, StaticStdlib, Workspace};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// In-memory workspace counting lookups
    #[derive(Default)]
    struct FakeWorkspace {
        packages: HashMap<String, WorkspacePackage>,
        lookups: AtomicUsize,
    }

    impl FakeWorkspace {
        fn with(mut self, path: &str, files: &[&str], imports: &[&str]) -> Self {
            self.packages.insert(
                path.to_string(),
                WorkspacePackage {
                    name: path.rsplit('/').next().unwrap_or(path).to_string(),
                    dir: PathBuf::from("/gopath/src").join(path),
                    files: files.iter().map(|s| s.to_string()).collect(),
                    imports: imports.iter().map(|s| s.to_string()).collect(),
                },
            );
            self
        }
    }

    impl Workspace for FakeWorkspace {
        fn locate(&self, import_path: &str) -> Result<WorkspacePackage, LookupError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.packages
                .get(import_path)
                .cloned()
                .ok_or_else(|| LookupError::NotFound {
                    import_path: import_path.to_string(),
                    searched: vec![],
                })
        }
    }

    fn context(workspace: Arc<FakeWorkspace>, exclude: Option<&str>) -> PipelineContext {
        let mut config = BuilderConfig::empty();
        config.exclude_files = exclude.map(str::to_string);
        PipelineContext::new(
            Arc::new(MockFileSystem::new()),
            Arc::new(GoFrontend),
            Arc::new(StaticStdlib::go_defaults()),
            config,
        )
        .unwrap()
        .with_workspace(Some(workspace as Arc<dyn Workspace>))
    }

    fn local_state(imports: &[&str]) -> BuildState {
        let mut state = BuildState::new("/app", vec![]);
        state
            .app
            .insert_package(Package::new(
                "web",
                vec![File {
                    name: "web/w.go".into(),
                    package_name: "web".into(),
                    import_paths: imports.iter().map(|s| s.to_string()).collect(),
                    has_init: true,
                }],
            ))
            .unwrap();
        state
    }

    #[test]
    fn test_transitive_resolution() {
        let ws = Arc::new(
            FakeWorkspace::default()
                .with("ex.com/a", &["a.go"], &["ex.com/b", "fmt"])
                .with("ex.com/b", &["b1.go", "b2.go"], &["strings"]),
        );
        let ctx = context(Arc::clone(&ws), None);
        let mut state = local_state(&["ex.com/a", "fmt"]);

        ExternalPhase.execute(&ctx, &mut state).unwrap();

        assert_eq!(state.app.import_paths(), vec!["web", "ex.com/a", "ex.com/b"]);
        let b = state.app.get("ex.com/b").unwrap();
        assert_eq!(b.base_dir, Some(PathBuf::from("/gopath/src/ex.com/b")));
        assert_eq!(b.files.len(), 2);
        assert!(b.files.iter().all(|f| f.import_paths == vec!["strings"]));
        assert_eq!(ws.lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unresolved_looked_up_once() {
        let ws = Arc::new(FakeWorkspace::default().with("ex.com/a", &["a.go"], &["ex.com/missing"]));
        let ctx = context(Arc::clone(&ws), None);
        let mut state = local_state(&["ex.com/missing", "ex.com/a"]);

        ExternalPhase.execute(&ctx, &mut state).unwrap();

        assert_eq!(state.app.import_paths(), vec!["web", "ex.com/a"]);
        assert_eq!(ws.lookups.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_exclusion_filters_files() {
        let ws = Arc::new(FakeWorkspace::default().with("ex.com/a", &["a.go", "a_gen.go"], &[]));
        let ctx = context(ws, Some("^ex\\.com/a/a_gen\\.go$"));
        let mut state = local_state(&["ex.com/a"]);

        ExternalPhase.execute(&ctx, &mut state).unwrap();

        let package = state.app.get("ex.com/a").unwrap();
        let names: Vec<&str> = package.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.go"]);
    }

    #[test]
    fn test_fully_excluded_package_fails() {
        let ws = Arc::new(FakeWorkspace::default().with("ex.com/a", &["a.go"], &[]));
        let ctx = context(ws, Some("^ex\\.com/a/"));
        let mut state = local_state(&["ex.com/a"]);

        let err = ExternalPhase.execute(&ctx, &mut state).unwrap_err();
        assert_eq!(err.kind(), "external-package-fully-excluded");
        assert!(err.to_string().starts_with("package ex.com/a required"));
    }

    #[test]
    fn test_no_workspace_is_noop() {
        let ctx = context(Arc::new(FakeWorkspace::default()), None).with_workspace(None);
        let mut state = local_state(&["ex.com/a"]);
        ExternalPhase.execute(&ctx, &mut state).unwrap();
        assert_eq!(state.app.len(), 1);
    }
}
