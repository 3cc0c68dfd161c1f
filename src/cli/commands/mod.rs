pub mod compiled_releases;
pub mod detect_stemcell_bump;
pub mod manifest_releases;
pub mod manifest_stemcell;
pub mod ops_file_releases;
pub mod regenerate_compiled_releases;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::app::OutputFormat;
use crate::config::SyncSettings;
use crate::io::{write_atomic, write_commit_message, BuildDir};
use crate::summary::ChangeSummary;
use crate::{Result, SyncError};

/// Common trait for all command handlers
pub trait CommandHandler {
    /// Execute the command
    fn execute(&self) -> Result<()>;

    /// Get command name for logging
    fn name(&self) -> &'static str;
}

/// What every command receives from process startup
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub settings: SyncSettings,
    pub format: OutputFormat,
}

impl CommandContext {
    pub fn new(settings: SyncSettings, format: OutputFormat) -> Self {
        Self { settings, format }
    }

    /// Print a line of output in the selected format
    pub fn print<T: Serialize>(&self, text: &str, json: &T) -> Result<()> {
        match self.format {
            OutputFormat::Text => println!("{}", text),
            OutputFormat::Json => {
                let rendered = serde_json::to_string(json)
                    .map_err(|e| SyncError::SerializationFailure(e.to_string()))?;
                println!("{}", rendered);
            }
        }
        Ok(())
    }
}

/// Input and output locations shared by the update commands
#[derive(Debug, Clone)]
pub struct UpdatePaths {
    pub build_dir: PathBuf,
    pub input: PathBuf,
    pub output: PathBuf,
    pub commit_message: Option<PathBuf>,
}

#[derive(Serialize)]
struct SummaryReport {
    changed: bool,
    message: String,
}

impl UpdatePaths {
    pub fn build(&self) -> BuildDir {
        BuildDir::new(&self.build_dir)
    }

    pub fn read_input(&self) -> Result<Vec<u8>> {
        fs::read(&self.input).map_err(|e| SyncError::read(&self.input, e))
    }

    pub fn finish(
        &self,
        context: &CommandContext,
        document: &[u8],
        summary: &ChangeSummary,
    ) -> Result<()> {
        publish(
            context,
            &self.output,
            self.commit_message.as_deref(),
            document,
            summary,
        )
    }
}

/// Write the document, then the commit message, then report
pub fn publish(
    context: &CommandContext,
    output: &Path,
    commit_message: Option<&Path>,
    document: &[u8],
    summary: &ChangeSummary,
) -> Result<()> {
    write_atomic(output, document)?;
    info!("Wrote {}", output.display());

    let message = summary.message();
    if let Some(path) = commit_message {
        write_commit_message(path, &message)?;
    }

    context.print(
        &message,
        &SummaryReport {
            changed: !summary.is_empty(),
            message: message.clone(),
        },
    )
}

/// Explicit release names, or every `<name>-release` directory in the build
pub fn resolve_targets(build: &BuildDir, releases: &[String]) -> Result<Vec<String>> {
    if !releases.is_empty() {
        return Ok(releases.to_vec());
    }

    let discovered = build.discover_release_names()?;
    if discovered.is_empty() {
        return Err(SyncError::NoReleaseNames);
    }
    info!("Discovered releases: {}", discovered.join(", "));
    Ok(discovered)
}

/// `explicit`, or `default` joined onto the build dir
pub fn or_build_path(explicit: &Option<PathBuf>, build: &Path, default: &str) -> PathBuf {
    explicit.clone().unwrap_or_else(|| build.join(default))
}
