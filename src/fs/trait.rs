//! The [`FileSystem`] seam between package discovery and the disk

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Kind of entry found while listing a package directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    /// Sockets, devices and dangling links; never compiled
    Other,
}

/// What the workspace oracle needs to know about a path
#[derive(Debug, Clone)]
pub struct FileMetadata {
    pub file_type: FileType,
}

impl FileMetadata {
    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

/// One entry of a package directory
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
    /// Base name, compared against the frontend's source-file rules
    pub name: String,
    pub file_type: FileType,
}

impl DirEntry {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }
}

/// Read-only view of the application tree and the workspace roots
///
/// Paths are absolute. Implementations must return `read_dir` entries
/// sorted by name so package file order is stable.
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    fn metadata(&self, path: &Path) -> Result<FileMetadata>;

    fn read_to_string(&self, path: &Path) -> Result<String>;

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;
}
