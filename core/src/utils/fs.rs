//! Filesystem access
//!
//! Every file the engine touches goes through [`FileAccess`], so tests can
//! substitute failures. The `*_quietly` helpers log and swallow errors; they
//! are meant for best-effort work such as artifact cleanup.

use std::fs;
use std::path::{Path, PathBuf};
use log::{debug, warn};

use crate::error::{to_filesystem_error, Result, ToolboxError};

/// Filesystem capability
pub trait FileAccess {
    /// Read a whole file as UTF-8
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create or replace a file with `contents`
    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;

    /// Create a directory and its missing parents
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Whether anything exists at `path`
    fn exists(&self, path: &Path) -> bool;

    /// Whether `path` is an existing directory
    fn is_dir(&self, path: &Path) -> bool;

    /// Delete a file, returning whether it is gone. Never fails.
    fn delete_quietly(&self, path: &Path) -> bool;

    /// Absolute form of `path`
    fn absolute_path(&self, path: &Path) -> Result<PathBuf>;

    /// Read a file, or `None` if it cannot be read
    fn read_quietly(&self, path: &Path) -> Option<String> {
        match self.read_to_string(path) {
            Ok(contents) => Some(contents),
            Err(e) => {
                warn!("Unable to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Write a file, returning whether it succeeded
    fn write_quietly(&self, path: &Path, contents: &str) -> bool {
        match self.write_string(path, contents) {
            Ok(()) => true,
            Err(e) => {
                warn!("Unable to write {}: {}", path.display(), e);
                false
            }
        }
    }

    /// Make sure the parent directory of `path` exists. A parent that exists
    /// but is not a directory is an error.
    fn ensure_parent_dir(&self, path: &Path) -> Result<()> {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => return Ok(()),
        };

        if self.is_dir(parent) {
            return Ok(());
        }
        if self.exists(parent) {
            return Err(ToolboxError::Filesystem(format!(
                "{} exists and is not a directory",
                parent.display()
            )));
        }

        debug!("Creating directory {}", parent.display());
        self.create_dir_all(parent)
    }
}

impl<F: FileAccess + ?Sized> FileAccess for &F {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        (**self).read_to_string(path)
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        (**self).write_string(path, contents)
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        (**self).create_dir_all(path)
    }

    fn exists(&self, path: &Path) -> bool {
        (**self).exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        (**self).is_dir(path)
    }

    fn delete_quietly(&self, path: &Path) -> bool {
        (**self).delete_quietly(path)
    }

    fn absolute_path(&self, path: &Path) -> Result<PathBuf> {
        (**self).absolute_path(path)
    }
}

/// [`FileAccess`] on the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileAccess;

impl FileAccess for LocalFileAccess {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .map_err(|e| to_filesystem_error(format!("{}: {}", path.display(), e)))
    }

    fn write_string(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents)
            .map_err(|e| to_filesystem_error(format!("{}: {}", path.display(), e)))
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .map_err(|e| to_filesystem_error(format!("{}: {}", path.display(), e)))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn delete_quietly(&self, path: &Path) -> bool {
        match fs::remove_file(path) {
            Ok(()) => true,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => {
                warn!("Unable to delete {}: {}", path.display(), e);
                false
            }
        }
    }

    fn absolute_path(&self, path: &Path) -> Result<PathBuf> {
        if path.is_absolute() {
            return Ok(path.to_path_buf());
        }
        std::env::current_dir()
            .map(|dir| dir.join(path))
            .map_err(to_filesystem_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_read_delete() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("dataset.xml");
        let files = LocalFileAccess;

        files.write_string(&path, "<dataset/>").unwrap();
        assert!(files.exists(&path));
        assert!(!files.is_dir(&path));
        assert_eq!(files.read_to_string(&path).unwrap(), "<dataset/>");

        assert!(files.delete_quietly(&path));
        assert!(!files.exists(&path));
        // Deleting a missing file is not a failure
        assert!(files.delete_quietly(&path));
    }

    #[test]
    fn test_quiet_helpers() {
        let dir = tempdir().unwrap();
        let files = LocalFileAccess;

        assert_eq!(files.read_quietly(&dir.path().join("missing.xml")), None);
        assert!(!files.write_quietly(&dir.path().join("missing/dir/file.xml"), "x"));
        assert!(files.write_quietly(&dir.path().join("file.xml"), "x"));
        assert_eq!(files.read_quietly(&dir.path().join("file.xml")), Some("x".to_string()));
    }

    #[test]
    fn test_ensure_parent_dir() {
        let dir = tempdir().unwrap();
        let files = LocalFileAccess;

        let nested = dir.path().join("a/b/out.xml");
        files.ensure_parent_dir(&nested).unwrap();
        assert!(files.is_dir(&dir.path().join("a/b")));

        let blocker = dir.path().join("blocker");
        files.write_string(&blocker, "").unwrap();
        let result = files.ensure_parent_dir(&blocker.join("out.xml"));
        assert!(matches!(result, Err(ToolboxError::Filesystem(_))));

        // Bare file names have nothing to create
        files.ensure_parent_dir(Path::new("out.xml")).unwrap();
    }

    #[test]
    fn test_absolute_path() {
        let files = LocalFileAccess;
        let absolute = files.absolute_path(Path::new("data/users.xml")).unwrap();
        assert!(absolute.is_absolute());
        assert!(absolute.ends_with("data/users.xml"));
    }
}
