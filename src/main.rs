use anyhow::{Context, Result};
use clap::Parser;
use release_sync::{
    cli::commands::{
        compiled_releases::CompiledReleasesCommand,
        detect_stemcell_bump::DetectStemcellBumpCommand,
        manifest_releases::ManifestReleasesCommand, manifest_stemcell::ManifestStemcellCommand,
        ops_file_releases::OpsFileReleasesCommand,
        regenerate_compiled_releases::RegenerateCompiledReleasesCommand, CommandContext,
        CommandHandler, UpdatePaths,
    },
    cli::{Cli, Commands, LogLevel},
    config::SettingsLoader,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Logs always go to stderr so stdout carries only the summary
fn initialize_tracing(log_level: LogLevel) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.to_filter_directive()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);

    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = SettingsLoader::new()
        .load(cli.config.as_deref())
        .context("loading settings")?;
    let context = CommandContext::new(settings, cli.format);

    let name = cli.command.name();
    debug!(
        command = name,
        writes_commit_message = cli.command.writes_commit_message(),
        "Starting"
    );

    let handler: Box<dyn CommandHandler> = match cli.command {
        Commands::ManifestReleases {
            build_dir,
            input,
            output,
            commit_message,
            releases,
        } => Box::new(ManifestReleasesCommand::new(
            UpdatePaths {
                build_dir,
                input,
                output,
                commit_message,
            },
            releases,
            context,
        )),
        Commands::ManifestStemcell {
            build_dir,
            stemcell_dir,
            input,
            output,
            commit_message,
        } => Box::new(ManifestStemcellCommand::new(
            UpdatePaths {
                build_dir,
                input,
                output,
                commit_message,
            },
            stemcell_dir,
            context,
        )),
        Commands::OpsFileReleases {
            build_dir,
            input,
            output,
            commit_message,
            releases,
        } => Box::new(OpsFileReleasesCommand::new(
            UpdatePaths {
                build_dir,
                input,
                output,
                commit_message,
            },
            releases,
            context,
        )),
        Commands::CompiledReleases {
            build_dir,
            input,
            output,
            commit_message,
            releases,
        } => Box::new(CompiledReleasesCommand::new(
            UpdatePaths {
                build_dir,
                input,
                output,
                commit_message,
            },
            releases,
            context,
        )),
        Commands::RegenerateCompiledReleases {
            build_dir,
            compiled_releases_dir,
            stemcell_dir,
            output,
            commit_message,
        } => Box::new(RegenerateCompiledReleasesCommand::new(
            build_dir,
            compiled_releases_dir,
            stemcell_dir,
            output,
            commit_message,
            context,
        )),
        Commands::DetectStemcellBump {
            build_dir,
            manifest,
            stemcell_dir,
            output,
            os_mismatch,
        } => Box::new(DetectStemcellBumpCommand::new(
            build_dir,
            manifest,
            stemcell_dir,
            output,
            os_mismatch,
            context,
        )),
    };

    handler
        .execute()
        .with_context(|| format!("{} failed", handler.name()))
}
