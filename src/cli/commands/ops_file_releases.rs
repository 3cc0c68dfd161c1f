use super::{resolve_targets, CommandContext, CommandHandler, UpdatePaths};
use crate::artifact::DirectorySource;
use crate::codec::YamlCodec;
use crate::opsfile::update_releases;
use crate::Result;

/// Handler for the `ops-file-releases` command
pub struct OpsFileReleasesCommand {
    pub paths: UpdatePaths,
    pub releases: Vec<String>,
    pub context: CommandContext,
}

impl OpsFileReleasesCommand {
    pub fn new(paths: UpdatePaths, releases: Vec<String>, context: CommandContext) -> Self {
        Self {
            paths,
            releases,
            context,
        }
    }
}

impl CommandHandler for OpsFileReleasesCommand {
    fn execute(&self) -> Result<()> {
        let build = self.paths.build();
        let targets = resolve_targets(&build, &self.releases)?;

        let ops_file = self.paths.read_input()?;
        let source = DirectorySource::new(&build.root);
        let rendered = update_releases(&ops_file, &targets, &source, &YamlCodec)?;

        self.paths
            .finish(&self.context, &rendered.document, &rendered.summary)
    }

    fn name(&self) -> &'static str {
        "ops-file-releases"
    }
}
