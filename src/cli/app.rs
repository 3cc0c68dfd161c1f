use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::bump::OsMismatchPolicy;

/// release-sync: keep deployment manifests and ops-files in step with freshly
/// built releases and stemcells
#[derive(Parser, Debug)]
#[command(name = "release-sync")]
#[command(version)]
#[command(about = "Synchronize release and stemcell metadata into BOSH manifests and ops-files")]
#[command(
    long_about = "release-sync rewrites only the releases/stemcells section of a deployment manifest, or the release operations of an ops-file, and reports what changed as a one-line commit message."
)]
pub struct Cli {
    /// Set log level (logs go to stderr)
    #[arg(long, value_enum, default_value = "warn", global = true)]
    pub log_level: LogLevel,

    /// Settings file (YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for the change summary
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Update release records in a deployment manifest
    ManifestReleases {
        /// Directory holding the `<name>-release` inputs
        #[arg(long, env = "BUILD_DIR", default_value = ".")]
        build_dir: PathBuf,

        /// Manifest to read
        #[arg(long, env = "ORIGINAL_DEPLOYMENT_MANIFEST_PATH")]
        input: PathBuf,

        /// Where to write the updated manifest
        #[arg(long, env = "UPDATED_DEPLOYMENT_MANIFEST_PATH")]
        output: PathBuf,

        /// Shared commit-message file
        #[arg(long, env = "COMMIT_MESSAGE_PATH")]
        commit_message: Option<PathBuf>,

        /// Release to update (repeatable). Defaults to every `<name>-release` directory
        #[arg(long = "release")]
        releases: Vec<String>,
    },

    /// Update the deployment stemcell in a manifest
    ManifestStemcell {
        #[arg(long, env = "BUILD_DIR", default_value = ".")]
        build_dir: PathBuf,

        /// Stemcell resource directory with `version` and `url` (default: <build-dir>/stemcell)
        #[arg(long)]
        stemcell_dir: Option<PathBuf>,

        #[arg(long, env = "ORIGINAL_DEPLOYMENT_MANIFEST_PATH")]
        input: PathBuf,

        #[arg(long, env = "UPDATED_DEPLOYMENT_MANIFEST_PATH")]
        output: PathBuf,

        #[arg(long, env = "COMMIT_MESSAGE_PATH")]
        commit_message: Option<PathBuf>,
    },

    /// Update release records embedded in an ops-file
    OpsFileReleases {
        #[arg(long, env = "BUILD_DIR", default_value = ".")]
        build_dir: PathBuf,

        #[arg(long, env = "ORIGINAL_OPS_FILE_PATH")]
        input: PathBuf,

        #[arg(long, env = "UPDATED_OPS_FILE_PATH")]
        output: PathBuf,

        #[arg(long, env = "COMMIT_MESSAGE_PATH")]
        commit_message: Option<PathBuf>,

        #[arg(long = "release")]
        releases: Vec<String>,
    },

    /// Update a compiled-releases ops-file from compiled tarballs
    CompiledReleases {
        #[arg(long, env = "BUILD_DIR", default_value = ".")]
        build_dir: PathBuf,

        #[arg(long, env = "ORIGINAL_OPS_FILE_PATH")]
        input: PathBuf,

        #[arg(long, env = "UPDATED_OPS_FILE_PATH")]
        output: PathBuf,

        #[arg(long, env = "COMMIT_MESSAGE_PATH")]
        commit_message: Option<PathBuf>,

        #[arg(long = "release")]
        releases: Vec<String>,
    },

    /// Regenerate a compiled-releases ops-file from every compiled tarball
    RegenerateCompiledReleases {
        #[arg(long, env = "BUILD_DIR", default_value = ".")]
        build_dir: PathBuf,

        /// Directory holding the compiled tarballs (default: <build-dir>/compiled-releases)
        #[arg(long)]
        compiled_releases_dir: Option<PathBuf>,

        /// Stemcell the tarballs must be compiled against (default: <build-dir>/stemcell)
        #[arg(long)]
        stemcell_dir: Option<PathBuf>,

        #[arg(long, env = "UPDATED_OPS_FILE_PATH")]
        output: PathBuf,

        #[arg(long, env = "COMMIT_MESSAGE_PATH")]
        commit_message: Option<PathBuf>,
    },

    /// Classify a candidate stemcell as a major, minor or no bump
    DetectStemcellBump {
        #[arg(long, env = "BUILD_DIR", default_value = ".")]
        build_dir: PathBuf,

        /// Deployed manifest (default: <build-dir>/cf-deployment/cf-deployment.yml)
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Candidate stemcell resource directory (default: <build-dir>/stemcell)
        #[arg(long)]
        stemcell_dir: Option<PathBuf>,

        /// Result file (default: <build-dir>/stemcell-bump-type/result)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Whether a change of stemcell OS is an error
        #[arg(long, value_enum, default_value = "proceed")]
        os_mismatch: OsMismatchPolicy,
    },
}

impl Commands {
    /// Get the command name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Commands::ManifestReleases { .. } => "manifest-releases",
            Commands::ManifestStemcell { .. } => "manifest-stemcell",
            Commands::OpsFileReleases { .. } => "ops-file-releases",
            Commands::CompiledReleases { .. } => "compiled-releases",
            Commands::RegenerateCompiledReleases { .. } => "regenerate-compiled-releases",
            Commands::DetectStemcellBump { .. } => "detect-stemcell-bump",
        }
    }

    /// Check if this command writes a commit message
    pub fn writes_commit_message(&self) -> bool {
        !matches!(self, Commands::DetectStemcellBump { .. })
    }
}
