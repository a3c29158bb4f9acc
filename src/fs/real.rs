use super::{DirEntry, FileMetadata, FileSystem, FileType};
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// [`FileSystem`] backed by `std::fs`
pub struct RealFileSystem;

impl RealFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RealFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn file_type_of(path: &Path) -> FileType {
    if path.is_file() {
        FileType::File
    } else if path.is_dir() {
        FileType::Directory
    } else {
        FileType::Other
    }
}

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        let meta = fs::metadata(path).context(format!("Failed to stat {:?}", path))?;

        let file_type = if meta.is_file() {
            FileType::File
        } else if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::Other
        };

        Ok(FileMetadata { file_type })
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).context(format!("Failed to read file {:?}", path))
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>> {
        let entries = fs::read_dir(path).context(format!("Failed to read directory {:?}", path))?;

        let mut result = Vec::new();
        for entry in entries {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().to_string();
            let file_type = file_type_of(&path);

            result.push(DirEntry {
                path,
                name,
                file_type,
            });
        }
        result.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        let base = dir.path();

        fs::create_dir(base.join("util")).unwrap();
        fs::File::create(base.join("main.go"))
            .unwrap()
            .write_all(b"package app\n")
            .unwrap();
        fs::File::create(base.join("util/strings.go"))
            .unwrap()
            .write_all(b"package util\n")
            .unwrap();

        dir
    }

    #[test]
    fn test_exists_and_kinds() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        assert!(fs.exists(temp.path()));
        assert!(fs.is_dir(&temp.path().join("util")));
        assert!(fs.is_file(&temp.path().join("main.go")));
        assert!(!fs.exists(&temp.path().join("missing.go")));
    }

    #[test]
    fn test_metadata() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let meta = fs.metadata(&temp.path().join("main.go")).unwrap();
        assert!(meta.is_file());

        assert!(fs.metadata(&temp.path().join("missing.go")).is_err());
    }

    #[test]
    fn test_read_to_string() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let content = fs
            .read_to_string(&temp.path().join("util/strings.go"))
            .unwrap();
        assert_eq!(content, "package util\n");
    }

    #[test]
    fn test_read_dir_sorted() {
        let temp = create_test_dir();
        let fs = RealFileSystem::new();

        let entries = fs.read_dir(temp.path()).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.file_name()).collect();

        assert_eq!(names, vec!["main.go", "util"]);
        assert_eq!(entries[1].file_type(), FileType::Directory);
    }
}
