use std::path::PathBuf;

use tracing::info;

use super::{CommandContext, CommandHandler, UpdatePaths};
use crate::artifact::StemcellInput;
use crate::codec::YamlCodec;
use crate::manifest::update_stemcell;
use crate::Result;

/// Handler for the `manifest-stemcell` command
pub struct ManifestStemcellCommand {
    pub paths: UpdatePaths,
    pub stemcell_dir: Option<PathBuf>,
    pub context: CommandContext,
}

impl ManifestStemcellCommand {
    pub fn new(
        paths: UpdatePaths,
        stemcell_dir: Option<PathBuf>,
        context: CommandContext,
    ) -> Self {
        Self {
            paths,
            stemcell_dir,
            context,
        }
    }
}

impl CommandHandler for ManifestStemcellCommand {
    fn execute(&self) -> Result<()> {
        let settings = &self.context.settings;
        let stemcell_dir = match &self.stemcell_dir {
            Some(dir) => dir.clone(),
            None => self.paths.build().stemcell_dir()?,
        };

        let stemcell = StemcellInput::new(&stemcell_dir, &settings.stemcell_os_family).read()?;
        info!("Candidate stemcell is {} {}", stemcell.os, stemcell.version);

        let manifest = self.paths.read_input()?;
        let rendered =
            update_stemcell(&manifest, &settings.stemcell_alias, &stemcell, &YamlCodec)?;

        self.paths
            .finish(&self.context, &rendered.document, &rendered.summary)
    }

    fn name(&self) -> &'static str {
        "manifest-stemcell"
    }
}
