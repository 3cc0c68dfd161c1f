use regex::Regex;
use std::path::PathBuf;

use super::read_required;
use crate::manifest::StemcellRef;
use crate::{Result, SyncError};

/// A stemcell resource directory holding `version` and `url`
#[derive(Debug, Clone)]
pub struct StemcellInput {
    dir: PathBuf,
    os_family: String,
}

impl StemcellInput {
    pub fn new(dir: impl Into<PathBuf>, os_family: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            os_family: os_family.into(),
        }
    }

    pub fn read(&self) -> Result<StemcellRef> {
        let version = read_required(&self.dir, "version")?;
        let url = read_required(&self.dir, "url")?;
        let os = os_from_url(&url, &self.os_family)?;

        Ok(StemcellRef { os, version })
    }
}

/// Pull `<family>-<codename>` out of a `...-<family>-<codename>-go_agent.tgz` URL
pub fn os_from_url(url: &str, os_family: &str) -> Result<String> {
    let url = url.trim();
    let filename = url
        .split(['?', '#'])
        .next()
        .and_then(|path| path.rsplit('/').next())
        .unwrap_or(url);

    let pattern = Regex::new(&format!(
        r"({}-[\w-]+?)-go_agent\.tgz$",
        regex::escape(os_family)
    ))?;

    pattern
        .captures(filename)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| SyncError::UnsupportedStemcellURL {
            url: url.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_os_from_url() {
        assert_eq!(
            os_from_url(
                "https://s3.amazonaws.com/some-stemcell/stuff-ubuntu-some-os-go_agent.tgz\n",
                "ubuntu"
            )
            .unwrap(),
            "ubuntu-some-os"
        );
        assert_eq!(
            os_from_url(
                "https://storage.googleapis.com/bosh/light-bosh-stemcell-1.83-google-kvm-ubuntu-jammy-go_agent.tgz",
                "ubuntu"
            )
            .unwrap(),
            "ubuntu-jammy"
        );
    }

    #[test]
    fn test_os_from_url_rejects_other_families() {
        let err = os_from_url(
            "https://example.com/bosh-stemcell-2019.2-windows2019-go_agent.tgz",
            "ubuntu",
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "stemcell URL does not contain a supported os: https://example.com/bosh-stemcell-2019.2-windows2019-go_agent.tgz"
        );
    }

    #[test]
    fn test_read_stemcell_input() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("stemcell");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("version"), "1.83\n").unwrap();
        fs::write(
            dir.join("url"),
            "https://example.com/bosh-stemcell-1.83-warden-boshlite-ubuntu-jammy-go_agent.tgz",
        )
        .unwrap();

        let stemcell = StemcellInput::new(&dir, "ubuntu").read().unwrap();
        assert_eq!(
            stemcell,
            StemcellRef {
                os: "ubuntu-jammy".to_string(),
                version: "1.83".to_string(),
            }
        );
    }

    #[test]
    fn test_read_reports_missing_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("stemcell");
        fs::create_dir_all(&dir).unwrap();

        let err = StemcellInput::new(&dir, "ubuntu").read().unwrap_err();
        assert_eq!(err.to_string(), "missing metadata file: 'stemcell/version'");
    }
}
