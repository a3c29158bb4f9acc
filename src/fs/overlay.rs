//! Directory overlay exposing a curated subset of files as a tree

use super::{DirEntry, FileMetadata, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Presents an explicit file list as if it were the whole directory tree.
///
/// Only the listed files (and the directories that contain them) are visible.
/// Listing a directory yields the listed files whose immediate parent is that
/// directory; metadata comes from the underlying file system, so a listed file
/// that vanished from disk surfaces as an I/O error.
pub struct OverlayFileSystem {
    base_dir: PathBuf,
    files: BTreeSet<PathBuf>,
    inner: Arc<dyn FileSystem>,
}

fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

impl OverlayFileSystem {
    pub fn new<I, S>(base_dir: impl AsRef<Path>, filenames: I, inner: Arc<dyn FileSystem>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        let base_dir = normalize(base_dir.as_ref());
        let files = filenames
            .into_iter()
            .map(|f| normalize(&base_dir.join(f.as_ref())))
            .collect();

        Self {
            base_dir,
            files,
            inner,
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn is_listed(&self, path: &Path) -> bool {
        self.files.contains(&normalize(path))
    }

    fn is_listed_dir(&self, path: &Path) -> bool {
        let dir = normalize(path);
        self.files
            .iter()
            .any(|f| f.starts_with(&dir) && f.as_path() != dir.as_path())
    }
}

impl FileSystem for OverlayFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.is_listed(path) || self.is_listed_dir(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_listed_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.is_listed(path) && self.inner.is_file(path)
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        if !self.exists(path) {
            return Err(anyhow!("Path not found in overlay: {:?}", path));
        }
        self.inner.metadata(path)
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        if !self.is_listed(path) {
            return Err(anyhow!("File not found in overlay: {:?}", path));
        }
        self.inner.read_to_string(path)
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let dir = normalize(path);
        let mut entries = Vec::new();

        for file in &self.files {
            if file.parent() != Some(dir.as_path()) {
                continue;
            }
            let meta = self.inner.metadata(file)?;
            entries.push(DirEntry {
                path: file.clone(),
                name: file
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default(),
                file_type: meta.file_type,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{FileType, MockFileSystem, RealFileSystem};

    fn mock_tree() -> Arc<MockFileSystem> {
        let fs = MockFileSystem::new();
        fs.add_file("app.go", "package app");
        fs.add_file("stray.go", "package app");
        fs.add_file("util/a.go", "package util");
        fs.add_file("util/b.go", "package util");
        fs.add_file("util/deep/c.go", "package deep");
        Arc::new(fs)
    }

    #[test]
    fn test_read_dir_only_lists_selected_files() {
        let overlay = OverlayFileSystem::new(
            "/mock",
            ["app.go", "util/b.go", "util/deep/c.go"],
            mock_tree(),
        );

        let root: Vec<String> = overlay
            .read_dir(Path::new("/mock"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(root, vec!["app.go"]);

        let util: Vec<String> = overlay
            .read_dir(Path::new("/mock/util"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(util, vec!["b.go"]);
    }

    #[test]
    fn test_read_dir_normalizes_query_path() {
        let overlay = OverlayFileSystem::new("/mock", ["./util/a.go"], mock_tree());

        let entries = overlay.read_dir(Path::new("/mock/./util/")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_type(), FileType::File);
    }

    #[test]
    fn test_hidden_files_are_invisible() {
        let overlay = OverlayFileSystem::new("/mock", ["app.go"], mock_tree());

        assert!(overlay.exists(Path::new("/mock/app.go")));
        assert!(!overlay.exists(Path::new("/mock/stray.go")));
        assert!(overlay.read_to_string(Path::new("/mock/stray.go")).is_err());
        assert_eq!(
            overlay.read_to_string(Path::new("/mock/app.go")).unwrap(),
            "package app"
        );
    }

    #[test]
    fn test_directories_of_listed_files_exist() {
        let overlay = OverlayFileSystem::new("/mock", ["util/deep/c.go"], mock_tree());

        assert!(overlay.is_dir(Path::new("/mock/util")));
        assert!(overlay.is_dir(Path::new("/mock/util/deep")));
        assert!(!overlay.is_dir(Path::new("/mock/util/deep/c.go")));
        assert!(overlay.is_file(Path::new("/mock/util/deep/c.go")));
    }

    #[test]
    fn test_missing_backing_file_propagates_error() {
        let overlay = OverlayFileSystem::new("/mock", ["ghost.go"], mock_tree());
        assert!(overlay.read_dir(Path::new("/mock")).is_err());
    }

    #[test]
    fn test_real_file_system_backing() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("pkg")).unwrap();
        std::fs::write(temp.path().join("pkg/one.go"), "package pkg\n").unwrap();
        std::fs::write(temp.path().join("pkg/two.go"), "package pkg\n").unwrap();

        let overlay = OverlayFileSystem::new(
            temp.path(),
            ["pkg/two.go"],
            Arc::new(RealFileSystem::new()),
        );
        let entries = overlay.read_dir(&temp.path().join("pkg")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name(), "two.go");
    }
}
