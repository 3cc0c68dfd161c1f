use std::path::{Path, PathBuf};

use tracing::debug;

use super::{display_path, read_required, read_trimmed, ArtifactMetadata, ArtifactSource};
use crate::{Result, SyncError};

/// Reads `<build-dir>/<name>-release/{version,url,sha1}`
#[derive(Debug, Clone)]
pub struct DirectorySource {
    build_dir: PathBuf,
}

impl DirectorySource {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
        }
    }

    pub fn release_dir(&self, name: &str) -> PathBuf {
        self.build_dir.join(format!("{}-release", name))
    }

    /// Only the `version` file, for sources that compute the rest themselves
    pub fn read_version(&self, name: &str) -> Result<String> {
        read_required(&self.release_dir(name), "version")
    }

    /// `sha1`, or a bosh.io style `sha256` file rendered as `sha256:<digest>`
    fn read_sha(&self, release_dir: &Path) -> Result<Option<String>> {
        if let Some(sha1) = read_trimmed(&release_dir.join("sha1"))? {
            return Ok(Some(sha1));
        }

        Ok(read_trimmed(&release_dir.join("sha256"))?.map(|sha256| {
            debug!("No sha1 file in {}, using sha256", release_dir.display());
            format!("sha256:{}", sha256)
        }))
    }
}

impl ArtifactSource for DirectorySource {
    fn fetch(&self, name: &str) -> Result<ArtifactMetadata> {
        let release_dir = self.release_dir(name);
        debug!("Reading release metadata from {}", release_dir.display());

        let sha = self.read_sha(&release_dir)?;
        let url = read_trimmed(&release_dir.join("url"))?;

        // Both or neither: a lone url or sha1 means the build output is broken.
        match (&sha, &url) {
            (Some(_), None) => {
                return Err(SyncError::MissingMetadataFile {
                    path: display_path(&release_dir, "url"),
                })
            }
            (None, Some(_)) => {
                return Err(SyncError::MissingMetadataFile {
                    path: display_path(&release_dir, "sha1"),
                })
            }
            _ => {}
        }

        let version = read_required(&release_dir, "version")?;

        Ok(ArtifactMetadata {
            name: name.to_string(),
            version,
            url,
            sha,
            stemcell: None,
        })
    }
}
