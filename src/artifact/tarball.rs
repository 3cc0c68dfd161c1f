//! Compiled-release tarballs
//!
//! A compiled tarball is named
//! `<name>-<version>-<stemcell-os>-<stemcell-version>-<ts>-<ts>-<ts>.tgz`.
//! Release names contain hyphens, so when the caller knows the release the
//! name and version are matched literally. Scanning a whole directory of
//! tarballs falls back to the greedy [`CompiledArchiveName::parse_any`].

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::digest::sha256_file;
use super::{ArtifactMetadata, ArtifactSource, DirectorySource};
use crate::manifest::StemcellRef;
use crate::{Result, SyncError};

/// The parts of a compiled tarball filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledArchiveName {
    pub filename: String,
    pub name: String,
    pub version: String,
    pub stemcell: StemcellRef,
    pub timestamp: String,
}

static ANY_ARCHIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<name>.+)-(?P<version>\d+(?:\.\d+)*)-(?P<os>.+)-(?P<stemcell>\d+(?:\.\d+)*)-(?P<ts>\d+-\d+-\d+)\.tgz$")
        .expect("compiled archive pattern")
});

impl CompiledArchiveName {
    /// Parse `filename` for a release already known to be `name` at `version`
    pub fn parse(filename: &str, name: &str, version: &str) -> Result<Self> {
        let pattern = format!(
            r"^{}-{}-(?P<os>.+)-(?P<stemcell>\d+(?:\.\d+)*)-(?P<ts>\d+-\d+-\d+)\.tgz$",
            regex::escape(name),
            regex::escape(version)
        );
        let grammar = Regex::new(&pattern)?;

        let captures = grammar
            .captures(filename)
            .ok_or_else(|| SyncError::InvalidArchiveName {
                filename: filename.to_string(),
            })?;

        Ok(Self::from_captures(filename, name, version, &captures))
    }

    /// Parse `filename` without knowing the release.
    ///
    /// The name is everything up to the last `-<digits>` group that still
    /// leaves a stemcell and timestamp behind it.
    pub fn parse_any(filename: &str) -> Result<Self> {
        let captures = ANY_ARCHIVE
            .captures(filename)
            .ok_or_else(|| SyncError::InvalidArchiveName {
                filename: filename.to_string(),
            })?;

        Ok(Self::from_captures(
            filename,
            &captures["name"],
            &captures["version"],
            &captures,
        ))
    }

    fn from_captures(filename: &str, name: &str, version: &str, captures: &Captures) -> Self {
        Self {
            filename: filename.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            stemcell: StemcellRef {
                os: captures["os"].to_string(),
                version: captures["stemcell"].to_string(),
            },
            timestamp: captures["ts"].to_string(),
        }
    }
}

/// Every compiled tarball under one directory, as found by a bulk export
#[derive(Debug, Clone)]
pub struct CompiledReleaseDir {
    dir: PathBuf,
    url_prefix: String,
}

impl CompiledReleaseDir {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.into(),
        }
    }

    /// Metadata for every file below the directory, ordered by path.
    ///
    /// Every file must be a compiled tarball and there must be at least one.
    pub fn scan(&self) -> Result<Vec<ArtifactMetadata>> {
        let pattern = format!("{}/**/*", glob::Pattern::escape(&self.dir.to_string_lossy()));

        let mut tarballs: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| SyncError::Config(format!("Invalid tarball glob {}: {}", pattern, e)))?
            .filter_map(|entry| entry.ok())
            .filter(|path| path.is_file())
            .collect();
        tarballs.sort();

        if tarballs.is_empty() {
            return Err(SyncError::NoCompiledReleases {
                dir: self.dir.clone(),
            });
        }

        tarballs
            .iter()
            .map(|tarball| -> Result<ArtifactMetadata> {
                let filename = tarball
                    .file_name()
                    .map(|f| f.to_string_lossy().to_string())
                    .unwrap_or_default();
                let archive = CompiledArchiveName::parse_any(&filename)?;
                debug!("Found compiled release {} {}", archive.name, archive.version);

                Ok(ArtifactMetadata {
                    url: Some(format!("{}/{}", self.url_prefix, archive.filename)),
                    sha: Some(sha256_file(tarball)?),
                    name: archive.name,
                    version: archive.version,
                    stemcell: Some(archive.stemcell),
                })
            })
            .collect()
    }
}

/// Reads `<build-dir>/<name>-compiled-release-tarball/*.tgz`
#[derive(Debug, Clone)]
pub struct CompiledTarballSource {
    build_dir: PathBuf,
    url_prefix: String,
    versions: DirectorySource,
}

impl CompiledTarballSource {
    pub fn new(build_dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let build_dir = build_dir.into();
        Self {
            versions: DirectorySource::new(build_dir.clone()),
            build_dir,
            url_prefix: url_prefix.into(),
        }
    }

    pub fn tarball_dir(&self, name: &str) -> PathBuf {
        self.build_dir
            .join(format!("{}-compiled-release-tarball", name))
    }

    /// The single tarball in `dir`
    fn find_tarball(&self, dir: &Path) -> Result<PathBuf> {
        let pattern = format!("{}/*.tgz", glob::Pattern::escape(&dir.to_string_lossy()));

        let matches: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| SyncError::Config(format!("Invalid tarball glob {}: {}", pattern, e)))?
            .filter_map(|entry| entry.ok())
            .collect();

        match matches.as_slice() {
            [single] => Ok(single.clone()),
            _ => Err(SyncError::AmbiguousArtifact {
                dir: dir.to_path_buf(),
                found: matches.len(),
            }),
        }
    }
}

impl ArtifactSource for CompiledTarballSource {
    fn fetch(&self, name: &str) -> Result<ArtifactMetadata> {
        let version = self.versions.read_version(name)?;
        let tarball = self.find_tarball(&self.tarball_dir(name))?;

        let filename = tarball
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_default();
        let archive = CompiledArchiveName::parse(&filename, name, &version)?;
        debug!(
            "Parsed {} as stemcell {} {}",
            filename, archive.stemcell.os, archive.stemcell.version
        );

        let sha = sha256_file(&tarball)?;
        info!("Found compiled release {} {}", name, version);

        Ok(ArtifactMetadata {
            name: name.to_string(),
            version,
            url: Some(format!("{}/{}", self.url_prefix, archive.filename)),
            sha: Some(sha),
            stemcell: Some(archive.stemcell),
        })
    }
}
