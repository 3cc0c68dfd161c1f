use serde::{Deserialize, Deserializer, Serialize};

/// Stemcell a compiled release was built against
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemcellRef {
    pub os: String,
    pub version: String,
}

/// One entry of the manifest's `releases:` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stemcell: Option<StemcellRef>,
}

impl Release {
    /// Name-only record used when a release is being added to a manifest
    pub fn placeholder(name: impl Into<String>) -> Self {
        Release {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One entry of the manifest's `stemcells:` list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stemcell {
    pub alias: String,
    pub os: String,
    pub version: String,
}

impl Stemcell {
    pub fn os_and_version(&self) -> StemcellRef {
        StemcellRef {
            os: self.os.clone(),
            version: self.version.clone(),
        }
    }
}

/// The trailing structured section of a manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSuffix {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub releases: Vec<Release>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub stemcells: Vec<Stemcell>,
}

impl ManifestSuffix {
    pub fn release(&self, name: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.name == name)
    }

    pub fn stemcell(&self, alias: &str) -> Option<&Stemcell> {
        self.stemcells.iter().find(|s| s.alias == alias)
    }
}

/// `releases:` with no entries decodes as null
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_sections_decode_as_empty_lists() {
        let suffix: ManifestSuffix = serde_yaml_ng::from_str("releases:\nstemcells:\n").unwrap();
        assert_eq!(suffix, ManifestSuffix::default());
    }

    #[test]
    fn test_release_without_stemcell_omits_the_key() {
        let release = Release {
            name: "capi".to_string(),
            url: "https://example.com/capi.tgz".to_string(),
            version: "1.2.3".to_string(),
            sha1: "abc".to_string(),
            stemcell: None,
        };
        let yaml = serde_yaml_ng::to_string(&release).unwrap();
        assert!(!yaml.contains("stemcell"));
    }

    #[test]
    fn test_lookup_by_name_and_alias() {
        let suffix: ManifestSuffix = serde_yaml_ng::from_str(
            "releases:\n- name: capi\n  version: 1.2.3\nstemcells:\n- alias: default\n  os: ubuntu-jammy\n  version: \"1.5\"\n",
        )
        .unwrap();

        assert_eq!(suffix.release("capi").unwrap().version, "1.2.3");
        assert!(suffix.release("diego").is_none());
        assert_eq!(suffix.stemcell("default").unwrap().os, "ubuntu-jammy");
    }
}
