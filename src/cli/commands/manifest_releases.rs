use tracing::info;

use super::{resolve_targets, CommandContext, CommandHandler, UpdatePaths};
use crate::artifact::DirectorySource;
use crate::codec::YamlCodec;
use crate::manifest::update_releases;
use crate::Result;

/// Handler for the `manifest-releases` command
pub struct ManifestReleasesCommand {
    pub paths: UpdatePaths,
    pub releases: Vec<String>,
    pub context: CommandContext,
}

impl ManifestReleasesCommand {
    pub fn new(paths: UpdatePaths, releases: Vec<String>, context: CommandContext) -> Self {
        Self {
            paths,
            releases,
            context,
        }
    }
}

impl CommandHandler for ManifestReleasesCommand {
    fn execute(&self) -> Result<()> {
        let build = self.paths.build();
        let targets = resolve_targets(&build, &self.releases)?;
        info!("Updating {} release(s) in {}", targets.len(), self.paths.input.display());

        let manifest = self.paths.read_input()?;
        let source = DirectorySource::new(&build.root);
        let rendered = update_releases(&manifest, &targets, &source, &YamlCodec)?;

        self.paths
            .finish(&self.context, &rendered.document, &rendered.summary)
    }

    fn name(&self) -> &'static str {
        "manifest-releases"
    }
}
