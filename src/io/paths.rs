use crate::{Result, SyncError};
use std::fs;
use std::path::PathBuf;

const RELEASE_DIR_SUFFIX: &str = "-release";
const STEMCELL_DIR: &str = "stemcell";
const COMPILED_RELEASES_DIR: &str = "compiled-releases";

/// Path conventions of a CI build directory
#[derive(Debug, Clone)]
pub struct BuildDir {
    /// Root of the build (the task's working directory)
    pub root: PathBuf,
}

impl BuildDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// An input or output directory that must already exist
    pub fn sub_dir(&self, name: &str) -> Result<PathBuf> {
        let dir = self.root.join(name);
        if !dir.is_dir() {
            return Err(SyncError::Config(format!(
                "missing sub directory '{}' in build directory '{}'",
                name,
                self.root.display()
            )));
        }
        Ok(dir)
    }

    /// Default stemcell resource directory
    pub fn stemcell_dir(&self) -> Result<PathBuf> {
        self.sub_dir(STEMCELL_DIR)
    }

    /// Default directory of exported compiled tarballs
    pub fn compiled_releases_dir(&self) -> Result<PathBuf> {
        self.sub_dir(COMPILED_RELEASES_DIR)
    }

    /// Every `<name>-release` directory in the build, sorted by name
    pub fn discover_release_names(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| SyncError::read(&self.root, e))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SyncError::read(&self.root, e))?;
            if !entry.path().is_dir() {
                continue;
            }

            let file_name = entry.file_name();
            let Some(dir_name) = file_name.to_str() else {
                continue;
            };
            if let Some(name) = dir_name.strip_suffix(RELEASE_DIR_SUFFIX) {
                if !name.is_empty() {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}
