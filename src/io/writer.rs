use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::{Result, SyncError};

/// Write `contents` to `path` all at once.
///
/// Parent directories are created first. The bytes go to a temporary file
/// next to `path` which is then renamed over it, so `path` either holds the
/// previous contents or the complete new ones. The replaced file keeps its
/// permissions; a new one gets `0644` on unix.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| SyncError::write(parent, e))?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| SyncError::write(parent, e))?;
    staged
        .write_all(contents)
        .and_then(|_| staged.flush())
        .map_err(|e| SyncError::write(path, e))?;

    // tempfile creates its files 0600
    let permissions = match fs::metadata(path) {
        Ok(existing) => Some(existing.permissions()),
        Err(e) if e.kind() == ErrorKind::NotFound => default_permissions(),
        Err(e) => return Err(SyncError::read(path, e)),
    };
    if let Some(permissions) = permissions {
        staged
            .as_file()
            .set_permissions(permissions)
            .map_err(|e| SyncError::write(path, e))?;
    }

    staged
        .persist(path)
        .map_err(|e| SyncError::write(path, e.error))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

#[cfg(unix)]
fn default_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<fs::Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("updated-cf-deployment/nested/cf-deployment.yml");

        write_atomic(&target, b"releases:\n").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "releases:\n");
    }

    #[test]
    fn test_replaces_existing_file_without_leftovers() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("out.yml");
        fs::write(&target, "old contents that are longer").unwrap();

        write_atomic(&target, b"new").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        let entries = fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("cf-deployment.yml");

        write_atomic(&target, b"releases:\n").unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_replaced_file_keeps_its_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("ops.yml");
        fs::write(&target, "old").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&target, b"new").unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_unwritable_parent_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let err = write_atomic(&blocker.join("out.yml"), b"x").unwrap_err();
        assert!(matches!(err, SyncError::Write { .. }));
    }
}
