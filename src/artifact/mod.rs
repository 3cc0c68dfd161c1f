//! Metadata of freshly built artifacts
//!
//! Two sources produce the same [`ArtifactMetadata`]: the plain
//! `<name>-release/{version,url,sha1}` directory convention and the
//! compiled-release tarball whose filename encodes the stemcell it was
//! built against.

pub mod digest;
pub mod directory;
pub mod stemcell;
pub mod tarball;

pub use directory::DirectorySource;
pub use stemcell::StemcellInput;
pub use tarball::{CompiledArchiveName, CompiledReleaseDir, CompiledTarballSource};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::manifest::{Release, StemcellRef};
use crate::{Result, SyncError};

/// What a build produced for one release
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub name: String,
    pub version: String,
    /// `None` together with `sha` when the release was not rebuilt
    pub url: Option<String>,
    pub sha: Option<String>,
    pub stemcell: Option<StemcellRef>,
}

impl ArtifactMetadata {
    /// Build the record that replaces `existing` in a manifest.
    ///
    /// Fields the build did not produce keep their current values.
    pub fn apply_to(&self, existing: &Release) -> Release {
        Release {
            name: self.name.clone(),
            url: self.url.clone().unwrap_or_else(|| existing.url.clone()),
            version: self.version.clone(),
            sha1: self.sha.clone().unwrap_or_else(|| existing.sha1.clone()),
            stemcell: self.stemcell.clone().or_else(|| existing.stemcell.clone()),
        }
    }

    /// The full record, as written into compiled-release ops
    pub fn to_release(&self) -> Release {
        self.apply_to(&Release::placeholder(self.name.clone()))
    }
}

/// Anything that can produce metadata for a named release
pub trait ArtifactSource {
    fn fetch(&self, name: &str) -> Result<ArtifactMetadata>;
}

/// Read a metadata file, trimmed. `Ok(None)` when it does not exist.
pub(crate) fn read_trimmed(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content.trim().to_string())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SyncError::read(path, e)),
    }
}

/// `<parent dir name>/<file>` for error messages
pub(crate) fn display_path(dir: &Path, file: &str) -> PathBuf {
    match dir.file_name() {
        Some(parent) => Path::new(parent).join(file),
        None => PathBuf::from(file),
    }
}

/// Read a metadata file that must exist
pub(crate) fn read_required(dir: &Path, file: &str) -> Result<String> {
    read_trimmed(&dir.join(file))?.ok_or_else(|| SyncError::MissingMetadataFile {
        path: display_path(dir, file),
    })
}
