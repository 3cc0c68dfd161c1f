use std::path::PathBuf;

use tracing::info;

use super::{publish, CommandContext, CommandHandler};
use crate::artifact::{CompiledReleaseDir, StemcellInput};
use crate::codec::YamlCodec;
use crate::io::BuildDir;
use crate::opsfile::regenerate_compiled_releases;
use crate::Result;

/// Handler for the `regenerate-compiled-releases` command
pub struct RegenerateCompiledReleasesCommand {
    pub build_dir: PathBuf,
    pub compiled_releases_dir: Option<PathBuf>,
    pub stemcell_dir: Option<PathBuf>,
    pub output: PathBuf,
    pub commit_message: Option<PathBuf>,
    pub context: CommandContext,
}

impl RegenerateCompiledReleasesCommand {
    pub fn new(
        build_dir: PathBuf,
        compiled_releases_dir: Option<PathBuf>,
        stemcell_dir: Option<PathBuf>,
        output: PathBuf,
        commit_message: Option<PathBuf>,
        context: CommandContext,
    ) -> Self {
        Self {
            build_dir,
            compiled_releases_dir,
            stemcell_dir,
            output,
            commit_message,
            context,
        }
    }
}

impl CommandHandler for RegenerateCompiledReleasesCommand {
    fn execute(&self) -> Result<()> {
        let settings = &self.context.settings;
        let build = BuildDir::new(&self.build_dir);

        let stemcell_dir = match &self.stemcell_dir {
            Some(dir) => dir.clone(),
            None => build.stemcell_dir()?,
        };
        let stemcell = StemcellInput::new(&stemcell_dir, &settings.stemcell_os_family).read()?;
        info!("Expecting releases compiled against {} {}", stemcell.os, stemcell.version);

        let tarball_dir = match &self.compiled_releases_dir {
            Some(dir) => dir.clone(),
            None => build.compiled_releases_dir()?,
        };
        let compiled =
            CompiledReleaseDir::new(tarball_dir, settings.compiled_releases_url_prefix.clone())
                .scan()?;

        let rendered = regenerate_compiled_releases(&compiled, &stemcell, &YamlCodec)?;

        publish(
            &self.context,
            &self.output,
            self.commit_message.as_deref(),
            &rendered.document,
            &rendered.summary,
        )
    }

    fn name(&self) -> &'static str {
        "regenerate-compiled-releases"
    }
}
