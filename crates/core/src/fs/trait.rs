//! FileSystem trait definition

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Type of file system entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    File,
    Directory,
    Symlink,
}

/// A directory entry returned by read_dir
#[derive(Debug, Clone)]
pub struct DirEntry {
    pub path: PathBuf,
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

    pub fn is_dir(&self) -> bool {
        self.file_type == FileType::Directory
    }

    pub fn is_file(&self) -> bool {
        self.file_type == FileType::File
    }

    /// Dot-prefixed entries (`.github`, `.git`) are never app folders.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Read-only view of the checked-out tree.
///
/// Folder qualification and deletion analysis both read live state through
/// this trait, so tests can substitute [`super::MockFileSystem`].
pub trait FileSystem: Send + Sync {
    /// Check if path is a directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Check if path is a file
    fn is_file(&self, path: &Path) -> bool;

    /// List directory contents. Order is unspecified.
    fn read_dir(&self, path: &Path) -> Result<Vec<DirEntry>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_entry() {
        let entry = DirEntry {
            path: PathBuf::from("/repo/apps/web/Dockerfile"),
            name: "Dockerfile".to_string(),
            file_type: FileType::File,
        };
        assert_eq!(entry.path(), Path::new("/repo/apps/web/Dockerfile"));
        assert_eq!(entry.file_name(), "Dockerfile");
        assert_eq!(entry.file_type(), FileType::File);
        assert!(entry.is_file());
        assert!(!entry.is_dir());
    }

    #[test]
    fn test_hidden_entry() {
        let entry = DirEntry {
            path: PathBuf::from("/repo/.github"),
            name: ".github".to_string(),
            file_type: FileType::Directory,
        };
        assert!(entry.is_hidden());
        assert!(entry.is_dir());
    }
}
