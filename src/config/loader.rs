use super::types::SyncSettings;
use crate::{Result, SyncError};
use std::path::Path;
use tracing::debug;

/// Produces validated [`SyncSettings`]
#[derive(Debug, Default)]
pub struct SettingsLoader;

impl SettingsLoader {
    pub fn new() -> Self {
        Self
    }

    /// Load settings from `path`, or use defaults when no file is given
    pub fn load(&self, path: Option<&Path>) -> Result<SyncSettings> {
        let settings = match path {
            Some(path) => self.load_file(path)?,
            None => {
                debug!("No settings file given, using defaults");
                SyncSettings::default()
            }
        };

        self.validate(settings)
    }

    fn load_file(&self, path: &Path) -> Result<SyncSettings> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!(
                "Failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;

        // An empty file means "all defaults"
        if contents.trim().is_empty() {
            return Ok(SyncSettings::default());
        }

        serde_yaml_ng::from_str(&contents).map_err(|e| {
            SyncError::Config(format!(
                "Failed to parse settings file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Check required values and normalize the URL prefix
    fn validate(&self, mut settings: SyncSettings) -> Result<SyncSettings> {
        let prefix = settings.compiled_releases_url_prefix.trim().trim_end_matches('/');
        if prefix.is_empty() {
            return Err(SyncError::Config(
                "compiled_releases_url_prefix must not be empty".to_string(),
            ));
        }
        if !prefix.starts_with("https://") && !prefix.starts_with("http://") {
            return Err(SyncError::Config(format!(
                "compiled_releases_url_prefix must be an http(s) URL, got '{}'",
                prefix
            )));
        }
        settings.compiled_releases_url_prefix = prefix.to_string();

        for (field, value) in [
            ("stemcell_alias", &settings.stemcell_alias),
            ("stemcell_os_family", &settings.stemcell_os_family),
        ] {
            if value.trim().is_empty() {
                return Err(SyncError::Config(format!("{} must not be empty", field)));
            }
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::DEFAULT_COMPILED_RELEASES_URL_PREFIX;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let settings = SettingsLoader::new().load(None).unwrap();
        assert_eq!(settings, SyncSettings::default());
        assert_eq!(
            settings.compiled_releases_url_prefix,
            DEFAULT_COMPILED_RELEASES_URL_PREFIX
        );
    }

    #[test]
    fn test_partial_file_fills_defaults_and_trims_slash() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("release-sync.yml");
        fs::write(
            &path,
            "compiled_releases_url_prefix: https://example.com/bucket/\n",
        )
        .unwrap();

        let settings = SettingsLoader::new().load(Some(&path)).unwrap();
        assert_eq!(settings.compiled_releases_url_prefix, "https://example.com/bucket");
        assert_eq!(settings.stemcell_alias, "default");
        assert_eq!(settings.stemcell_os_family, "ubuntu");
    }

    #[test]
    fn test_empty_file_is_all_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("release-sync.yml");
        fs::write(&path, "\n").unwrap();

        let settings = SettingsLoader::new().load(Some(&path)).unwrap();
        assert_eq!(settings, SyncSettings::default());
    }

    #[test]
    fn test_rejects_unknown_keys_and_blank_values() {
        let temp_dir = TempDir::new().unwrap();

        let path = temp_dir.path().join("unknown.yml");
        fs::write(&path, "releases_marker: releases\n").unwrap();
        let err = SettingsLoader::new().load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse settings file"));

        let path = temp_dir.path().join("blank.yml");
        fs::write(&path, "stemcell_alias: \"  \"\n").unwrap();
        let err = SettingsLoader::new().load(Some(&path)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: stemcell_alias must not be empty"
        );
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let err = SettingsLoader::new()
            .load(Some(Path::new("/nonexistent/release-sync.yml")))
            .unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }
}
