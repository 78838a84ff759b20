//! Received-file storage.
//!
//! Files land at `<root>/<username>/<name>`. Client-supplied names are
//! confined to a single path component below the user's directory.

use crate::config::StorageConfig;
use crate::error::StorageError;
use std::path::PathBuf;
use tokio::fs::{self, File};

/// Longest accepted file name in bytes.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// Whether `name` is usable as one directory entry.
///
/// Rejects empty names, separators, NUL and other control characters, and
/// anything starting with a dot (which covers `.` and `..`).
pub fn is_safe_component(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_FILE_NAME_LEN
        && !name.starts_with('.')
        && !name.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}

/// Validate a client-supplied file name.
pub fn validate_file_name(name: &str) -> Result<(), StorageError> {
    if is_safe_component(name) {
        Ok(())
    } else {
        Err(StorageError::InvalidFileName(name.to_owned()))
    }
}

/// Per-user file store.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    max_bytes: Option<u64>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: Option<u64>) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.root.clone(), config.size_limit())
    }

    /// Size limit for one file (`None` = unlimited).
    pub fn max_bytes(&self) -> Option<u64> {
        self.max_bytes
    }

    /// Reject a declared size over the limit.
    pub fn check_size(&self, size: u64) -> Result<(), StorageError> {
        match self.max_bytes {
            Some(limit) if size > limit => Err(StorageError::FileTooLarge { size, limit }),
            _ => Ok(()),
        }
    }

    /// Directory holding `username`'s files.
    pub fn user_dir(&self, username: &str) -> Result<PathBuf, StorageError> {
        validate_file_name(username)?;
        Ok(self.root.join(username))
    }

    /// Final path for `name` received from `username`.
    pub fn destination(&self, username: &str, name: &str) -> Result<PathBuf, StorageError> {
        validate_file_name(name)?;
        let dir = self.user_dir(username)?;
        let path = dir.join(name);

        // Ensure the path is still a direct child of the user's directory
        if path.parent() != Some(dir.as_path()) {
            return Err(StorageError::InvalidFileName(name.to_owned()));
        }
        Ok(path)
    }

    /// Create (or truncate) the destination file, making the user's
    /// directory on first use.
    pub async fn create(&self, username: &str, name: &str) -> Result<(PathBuf, File), StorageError> {
        let path = self.destination(username, name)?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let file = File::create(&path).await?;
        Ok((path, file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_safe_names() {
        for name in ["notes.txt", "report 2024.pdf", "a", "ümlaut.bin", "x..y"] {
            assert!(is_safe_component(name), "{name:?} should be accepted");
        }
    }

    #[test]
    fn test_unsafe_names() {
        let long = "a".repeat(MAX_FILE_NAME_LEN + 1);
        for name in [
            "",
            ".",
            "..",
            ".hidden",
            "../etc/passwd",
            "dir/file",
            "dir\\file",
            "nul\0byte",
            "tab\tname",
            long.as_str(),
        ] {
            assert!(!is_safe_component(name), "{name:?} should be rejected");
        }
    }

    #[test]
    fn test_destination_layout() {
        let store = FileStore::new("/srv/drop", None);
        assert_eq!(
            store.destination("user1", "a.txt").unwrap(),
            PathBuf::from("/srv/drop/user1/a.txt")
        );
        assert!(matches!(
            store.destination("user1", "../user2/a.txt"),
            Err(StorageError::InvalidFileName(_))
        ));
        assert!(store.destination("../user1", "a.txt").is_err());
    }

    #[test]
    fn test_size_limit() {
        let unlimited = FileStore::new("/tmp", None);
        assert!(unlimited.check_size(u64::MAX).is_ok());

        let limited = FileStore::new("/tmp", Some(100));
        assert!(limited.check_size(100).is_ok());
        assert!(matches!(
            limited.check_size(101),
            Err(StorageError::FileTooLarge { size: 101, limit: 100 })
        ));
    }

    #[tokio::test]
    async fn test_create_makes_user_dir() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path(), None);

        let (path, _file) = store.create("user1", "hello.txt").await.unwrap();
        assert_eq!(path, tmp.path().join("user1").join("hello.txt"));
        assert!(tmp.path().join("user1").is_dir());
        assert!(path.is_file());
    }
}
