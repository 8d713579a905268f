//! Filesystem primitives for config and credential files
//!
//! Files are created exclusively: an existing file means the home directory
//! is being reused across tasks, which could leak a previous task's
//! secrets, so it is reported as [`Error::ConfigConflict`].

use std::fs::{DirBuilder, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::{Error, Result};

/// Create `path` and any missing parents with `mode`
pub fn ensure_dir(path: &Path, mode: u32) -> Result<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;
    builder.create(path)?;
    Ok(())
}

/// Create `path` with `mode` and write `contents`, refusing to replace an
/// existing file. Missing parent directories are created owner-only.
pub fn create_exclusive(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent, 0o700)?;
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(path).map_err(|e| {
        if e.kind() == ErrorKind::AlreadyExists {
            Error::ConfigConflict {
                path: path.to_path_buf(),
            }
        } else {
            Error::Io(e)
        }
    })?;
    file.write_all(contents)?;
    file.flush()?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Created file");
    Ok(())
}

/// Reject a value that would end or split a line of a line-oriented
/// config file
pub fn single_line<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    if value.chars().any(char::is_control) {
        return Err(Error::Validation(format!(
            "{} contains control characters",
            field
        )));
    }
    Ok(value)
}

/// Recursively delete `path`; a missing directory is not an error
pub async fn remove_dir(path: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Io(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("user", "deploy bot").unwrap(), "deploy bot");
        assert!(matches!(single_line("user", "a\nb"), Err(Error::Validation(_))));
        assert!(matches!(single_line("user", "a\rb"), Err(Error::Validation(_))));
        assert!(matches!(single_line("user", "a\0b"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_create_exclusive_conflict_keeps_first() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(".subversion").join("servers");

        create_exclusive(&path, b"first", 0o600).unwrap();
        let err = create_exclusive(&path, b"second", 0o600).unwrap_err();

        assert!(err.is_conflict());
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }

    #[cfg(unix)]
    #[test]
    fn test_create_exclusive_mode() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("key");
        create_exclusive(&path, b"secret", 0o600).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("a").join("b");
        ensure_dir(&path, 0o755).unwrap();
        ensure_dir(&path, 0o755).unwrap();
        assert!(path.is_dir());
    }

    #[tokio::test]
    async fn test_remove_dir_missing_is_ok() {
        let tmp = TempDir::new().unwrap();
        remove_dir(&tmp.path().join("absent")).await.unwrap();
    }

    #[tokio::test]
    async fn test_remove_dir_recursive() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("source");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("nested").join("marker"), "x").unwrap();
        remove_dir(&dir).await.unwrap();
        assert!(!dir.exists());
    }
}
