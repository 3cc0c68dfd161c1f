use tracing::debug;

use super::{resolve_targets, CommandContext, CommandHandler, UpdatePaths};
use crate::artifact::CompiledTarballSource;
use crate::codec::YamlCodec;
use crate::opsfile::update_compiled_releases;
use crate::Result;

/// Handler for the `compiled-releases` command
pub struct CompiledReleasesCommand {
    pub paths: UpdatePaths,
    pub releases: Vec<String>,
    pub context: CommandContext,
}

impl CompiledReleasesCommand {
    pub fn new(paths: UpdatePaths, releases: Vec<String>, context: CommandContext) -> Self {
        Self {
            paths,
            releases,
            context,
        }
    }
}

impl CommandHandler for CompiledReleasesCommand {
    fn execute(&self) -> Result<()> {
        let build = self.paths.build();
        let targets = resolve_targets(&build, &self.releases)?;

        let prefix = &self.context.settings.compiled_releases_url_prefix;
        debug!("Compiled release URLs under {}", prefix);
        let source = CompiledTarballSource::new(&build.root, prefix.clone());

        let ops_file = self.paths.read_input()?;
        let rendered = update_compiled_releases(&ops_file, &targets, &source, &YamlCodec)?;

        self.paths
            .finish(&self.context, &rendered.document, &rendered.summary)
    }

    fn name(&self) -> &'static str {
        "compiled-releases"
    }
}
