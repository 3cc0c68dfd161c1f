use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("missing metadata file: '{}'", path.display())]
    MissingMetadataFile { path: PathBuf },

    #[error("expected exactly 1 compiled release tarball in {}, found {found}", dir.display())]
    AmbiguousArtifact { dir: PathBuf, found: usize },

    #[error("invalid tarball name syntax: {filename}")]
    InvalidArchiveName { filename: String },

    #[error("no compiled releases found in {}", dir.display())]
    NoCompiledReleases { dir: PathBuf },

    #[error("stemcell mismatch: {name} was compiled against {found}, expected {expected}")]
    CompiledStemcellMismatch {
        name: String,
        found: String,
        expected: String,
    },

    #[error("change from {from} to {to} is not a forward bump")]
    NonForwardBump { from: String, to: String },

    #[error("invalid version {version:?}: expected dot-separated non-negative integers")]
    InvalidVersion { version: String },

    #[error("stemcell os mismatch: found {from:?} and {to:?}")]
    StemcellOsMismatch { from: String, to: String },

    #[error("{marker} was not found at the bottom of the manifest")]
    SectionMarkerNotFound { marker: String },

    #[error("found keys other than the release and stemcell sections at the bottom of the manifest: {}", keys.join(", "))]
    UnexpectedTopLevelKeys { keys: Vec<String> },

    #[error("{section} was not found at the bottom of the manifest")]
    MissingRequiredSection { section: String },

    #[error("stemcell URL does not contain a supported os: {url}")]
    UnsupportedStemcellURL { url: String },

    #[error("no stemcell with alias {alias:?} in manifest")]
    StemcellAliasNotFound { alias: String },

    #[error("ops-file does not contain release named {name}")]
    ReleaseNotFoundInOpsFile { name: String },

    #[error("no release names to update")]
    NoReleaseNames,

    #[error("YAML serialization failed: {0}")]
    SerializationFailure(String),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Regex error: {0}")]
    Pattern(#[from] regex::Error),
}

impl From<serde_yaml_ng::Error> for SyncError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        SyncError::SerializationFailure(err.to_string())
    }
}

impl SyncError {
    /// Wrap an I/O error raised while reading `path`
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Read {
            path: path.into(),
            source,
        }
    }

    /// Wrap an I/O error raised while writing `path`
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SyncError::Write {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
