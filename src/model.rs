//! Application model: an arena of packages addressed by [`PackageId`]
//!
//! Dependency edges are ids into the arena, never references, so two packages
//! are the same package only if their ids are equal. The build order is a
//! permutation of ids kept beside the arena; sorting never moves packages.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct PackageId(pub usize);

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    /// Path relative to the package's base directory
    pub name: String,
    pub package_name: String,
    pub import_paths: Vec<String>,
    /// Declares a true `init` function
    pub has_init: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Package {
    pub import_path: String,
    pub files: Vec<File>,
    /// Set only for packages resolved from the workspace
    pub base_dir: Option<PathBuf>,
    /// Direct dependencies, sorted by import path once the graph is built
    pub dependencies: Vec<PackageId>,
    pub has_init: bool,
    /// Shares its import path with a standard package (allow-listed)
    pub shadows_std: bool,
}

impl Package {
    pub fn new(import_path: impl Into<String>, files: Vec<File>) -> Self {
        let has_init = files.iter().any(|f| f.has_init);
        Self {
            import_path: import_path.into(),
            files,
            base_dir: None,
            dependencies: Vec::new(),
            has_init,
            shadows_std: false,
        }
    }

    pub fn is_external(&self) -> bool {
        self.base_dir.is_some()
    }

    /// Union of the import paths of every file, deduplicated and sorted
    pub fn imports(&self) -> BTreeSet<&str> {
        self.files
            .iter()
            .flat_map(|f| f.import_paths.iter().map(String::as_str))
            .collect()
    }
}

/// Everything one build knows about the application
#[derive(Debug, Default)]
pub struct Application {
    packages: Vec<Package>,
    order: Vec<PackageId>,
    root_packages: Vec<PackageId>,
    index: HashMap<String, PackageId>,
}

impl Application {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a package under its import path
    ///
    /// Returns the id of the already registered package when the path is taken.
    pub fn insert_package(&mut self, package: Package) -> Result<PackageId, PackageId> {
        if let Some(existing) = self.index.get(&package.import_path) {
            return Err(*existing);
        }
        let id = PackageId(self.packages.len());
        self.index.insert(package.import_path.clone(), id);
        if package.has_init {
            self.root_packages.push(id);
        }
        self.order.push(id);
        self.packages.push(package);
        Ok(id)
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub(crate) fn package_mut(&mut self, id: PackageId) -> &mut Package {
        &mut self.packages[id.0]
    }

    pub fn id_of(&self, import_path: &str) -> Option<PackageId> {
        self.index.get(import_path).copied()
    }

    pub fn get(&self, import_path: &str) -> Option<&Package> {
        self.id_of(import_path).map(|id| self.package(id))
    }

    pub fn contains(&self, import_path: &str) -> bool {
        self.index.contains_key(import_path)
    }

    /// Package ids in current order (dependency-first once sorted)
    pub fn order(&self) -> &[PackageId] {
        &self.order
    }

    pub(crate) fn set_order(&mut self, order: Vec<PackageId>) {
        debug_assert_eq!(order.len(), self.packages.len());
        self.order = order;
    }

    /// Packages in current order
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.order.iter().map(|id| self.package(*id))
    }

    pub fn import_paths(&self) -> Vec<&str> {
        self.packages().map(|p| p.import_path.as_str()).collect()
    }

    /// Packages declaring initialization logic, in registration order
    pub fn root_packages(&self) -> impl Iterator<Item = &Package> {
        self.root_packages.iter().map(|id| self.package(*id))
    }

    pub fn files(&self) -> impl Iterator<Item = &File> {
        self.packages().flat_map(|p| p.files.iter())
    }

    pub fn dependencies_of(&self, id: PackageId) -> impl Iterator<Item = &Package> {
        self.package(id).dependencies.iter().map(|dep| self.package(*dep))
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, imports: &[&str], has_init: bool) -> File {
        File {
            name: name.into(),
            package_name: "p".into(),
            import_paths: imports.iter().map(|s| s.to_string()).collect(),
            has_init,
        }
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut app = Application::new();
        let a = app.insert_package(Package::new("a", vec![])).unwrap();
        let b = app
            .insert_package(Package::new("b", vec![file("b/b.go", &[], true)]))
            .unwrap();

        assert_eq!(app.id_of("a"), Some(a));
        assert_eq!(app.get("b").map(|p| p.has_init), Some(true));
        assert!(app.get("c").is_none());
        assert_eq!(app.import_paths(), vec!["a", "b"]);
        assert_eq!(
            app.root_packages().map(|p| p.import_path.as_str()).collect::<Vec<_>>(),
            vec!["b"]
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_duplicate_import_path_rejected() {
        let mut app = Application::new();
        let first = app.insert_package(Package::new("a", vec![])).unwrap();
        assert_eq!(app.insert_package(Package::new("a", vec![])), Err(first));
        assert_eq!(app.len(), 1);
    }

    #[test]
    fn test_imports_union() {
        let pkg = Package::new(
            "x",
            vec![
                file("x/1.go", &["fmt", "y"], false),
                file("x/2.go", &["y", "z"], false),
            ],
        );
        assert_eq!(pkg.imports().into_iter().collect::<Vec<_>>(), vec!["fmt", "y", "z"]);
        assert!(!pkg.has_init);
        assert!(!pkg.is_external());
    }

    #[test]
    fn test_reorder_is_a_permutation() {
        let mut app = Application::new();
        let a = app.insert_package(Package::new("a", vec![])).unwrap();
        let b = app.insert_package(Package::new("b", vec![])).unwrap();
        app.package_mut(b).dependencies.push(a);

        app.set_order(vec![b, a]);
        assert_eq!(app.import_paths(), vec!["b", "a"]);
        assert_eq!(app.package(a).import_path, "a");
        assert_eq!(
            app.dependencies_of(b).map(|p| p.import_path.as_str()).collect::<Vec<_>>(),
            vec!["a"]
        );
    }
}
