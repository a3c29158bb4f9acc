use crate::frontend::{unquote, BuildContext, ConstraintError, Frontend, SyntaxError};
use crate::fs::FileSystem;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Sources of one reusable package found in a workspace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspacePackage {
    /// Declared package name
    pub name: String,
    /// Directory the file names are relative to
    pub dir: PathBuf,
    /// Source file names, sorted
    pub files: Vec<String>,
    /// Union of every file's imports, sorted
    pub imports: Vec<String>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("cannot find package {import_path:?} in any of: {}", display_paths(.searched))]
    NotFound {
        import_path: String,
        searched: Vec<PathBuf>,
    },

    #[error("no buildable source files in {}", .dir.display())]
    NoSourceFiles { dir: PathBuf },

    #[error(transparent)]
    Parse(#[from] SyntaxError),

    #[error("{file}: {source}")]
    Constraint {
        file: String,
        source: ConstraintError,
    },

    #[error("{}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Locates reusable packages by import path
pub trait Workspace: Send + Sync {
    fn locate(&self, import_path: &str) -> Result<WorkspacePackage, LookupError>;
}

/// GOPATH-style workspace: a package lives in `<root>/src/<import path>`
///
/// The root may hold several directories joined with the platform path-list
/// separator; the first one containing the package wins.
pub struct GopathWorkspace {
    roots: Vec<PathBuf>,
    fs: Arc<dyn FileSystem>,
    frontend: Arc<dyn Frontend>,
    build_context: Arc<BuildContext>,
}

impl GopathWorkspace {
    pub fn new(
        root: impl AsRef<Path>,
        fs: Arc<dyn FileSystem>,
        frontend: Arc<dyn Frontend>,
        build_context: Arc<BuildContext>,
    ) -> Self {
        let roots = std::env::split_paths(root.as_ref().as_os_str())
            .filter(|p| !p.as_os_str().is_empty())
            .collect();
        Self {
            roots,
            fs,
            frontend,
            build_context,
        }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn read_package(&self, dir: &Path) -> Result<WorkspacePackage, LookupError> {
        let io_error = |path: &Path, err: anyhow::Error| LookupError::Io {
            path: path.to_path_buf(),
            message: format!("{:#}", err),
        };

        let entries = self.fs.read_dir(dir).map_err(|e| io_error(dir, e))?;

        let mut name = None;
        let mut files = Vec::new();
        let mut imports = BTreeSet::new();
        for entry in entries {
            if !entry.is_file()
                || !self.frontend.is_source_file(entry.file_name())
                || !self.build_context.matches_file_name(entry.file_name())
            {
                continue;
            }
            let source = self
                .fs
                .read_to_string(entry.path())
                .map_err(|e| io_error(entry.path(), e))?;
            let display_name = entry.path().display().to_string();
            let parsed = self.frontend.parse(&display_name, &source)?;
            let included = self
                .build_context
                .matches_constraints(&parsed.build_constraints)
                .map_err(|source| LookupError::Constraint {
                    file: display_name.clone(),
                    source,
                })?;
            if !included {
                debug!(file = %display_name, "Skipping file excluded by build constraints");
                continue;
            }

            imports.extend(parsed.imports().filter_map(|spec| unquote(&spec.path_literal)));
            name.get_or_insert(parsed.package_name);
            files.push(entry.file_name().to_string());
        }

        files.sort();
        match name {
            Some(name) => Ok(WorkspacePackage {
                name,
                dir: dir.to_path_buf(),
                files,
                imports: imports.into_iter().collect(),
            }),
            None => Err(LookupError::NoSourceFiles {
                dir: dir.to_path_buf(),
            }),
        }
    }
}

impl Workspace for GopathWorkspace {
    fn locate(&self, import_path: &str) -> Result<WorkspacePackage, LookupError> {
        let mut searched = Vec::with_capacity(self.roots.len());
        for root in &self.roots {
            let dir = root.join("src").join(import_path);
            if self.fs.is_dir(&dir) {
                return self.read_package(&dir);
            }
            searched.push(dir);
        }
        Err(LookupError::NotFound {
            import_path: import_path.to_string(),
            searched,
        })
    }
}
