use serde::{Deserialize, Serialize};

pub const DEFAULT_COMPILED_RELEASES_URL_PREFIX: &str =
    "https://storage.googleapis.com/cf-deployment-compiled-releases";
pub const DEFAULT_STEMCELL_ALIAS: &str = "default";
pub const DEFAULT_STEMCELL_OS_FAMILY: &str = "ubuntu";

/// Settings shared by every subcommand, assembled once at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSettings {
    /// Bucket URL compiled-release tarball names are appended to
    #[serde(default = "default_url_prefix")]
    pub compiled_releases_url_prefix: String,

    /// Manifest stemcell alias that stemcell updates target
    #[serde(default = "default_stemcell_alias")]
    pub stemcell_alias: String,

    /// OS family token expected in stemcell tarball names
    #[serde(default = "default_os_family")]
    pub stemcell_os_family: String,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            compiled_releases_url_prefix: default_url_prefix(),
            stemcell_alias: default_stemcell_alias(),
            stemcell_os_family: default_os_family(),
        }
    }
}

fn default_url_prefix() -> String {
    DEFAULT_COMPILED_RELEASES_URL_PREFIX.to_string()
}

fn default_stemcell_alias() -> String {
    DEFAULT_STEMCELL_ALIAS.to_string()
}

fn default_os_family() -> String {
    DEFAULT_STEMCELL_OS_FAMILY.to_string()
}
