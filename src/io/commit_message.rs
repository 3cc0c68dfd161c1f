use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use super::writer::write_atomic;
use crate::summary::is_sentinel;
use crate::{Result, SyncError};

/// Write `message` to the commit-message file unless that would lose
/// information.
///
/// Several update passes share one file. A real message always replaces a
/// missing file or a "nothing changed" sentinel; an existing real message is
/// never replaced. Returns whether the file was written.
pub fn write_commit_message(path: &Path, message: &str) -> Result<bool> {
    let existing = match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(SyncError::read(path, e)),
    };

    match existing {
        Some(current) if !is_sentinel(&current) => {
            debug!(
                "Keeping existing commit message in {}: {}",
                path.display(),
                current.trim()
            );
            Ok(false)
        }
        _ => {
            write_atomic(path, message.as_bytes())?;
            info!("Wrote commit message to {}", path.display());
            Ok(true)
        }
    }
}
