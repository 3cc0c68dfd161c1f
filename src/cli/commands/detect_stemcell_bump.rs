use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use super::{or_build_path, CommandContext, CommandHandler};
use crate::artifact::StemcellInput;
use crate::bump::{BumpDetector, OsMismatchPolicy};
use crate::codec::YamlCodec;
use crate::io::{write_atomic, BuildDir};
use crate::{Result, SyncError};

const MANIFEST_DIR: &str = "cf-deployment";
const MANIFEST_FILE: &str = "cf-deployment.yml";
const RESULT_FILE: &str = "stemcell-bump-type/result";

/// Handler for the `detect-stemcell-bump` command
pub struct DetectStemcellBumpCommand {
    pub build_dir: PathBuf,
    pub manifest: Option<PathBuf>,
    pub stemcell_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub os_mismatch: OsMismatchPolicy,
    pub context: CommandContext,
}

#[derive(Serialize)]
struct BumpReport {
    bump: String,
}

impl DetectStemcellBumpCommand {
    pub fn new(
        build_dir: PathBuf,
        manifest: Option<PathBuf>,
        stemcell_dir: Option<PathBuf>,
        output: Option<PathBuf>,
        os_mismatch: OsMismatchPolicy,
        context: CommandContext,
    ) -> Self {
        Self {
            build_dir,
            manifest,
            stemcell_dir,
            output,
            os_mismatch,
            context,
        }
    }

    fn manifest_path(&self, build: &BuildDir) -> Result<PathBuf> {
        match &self.manifest {
            Some(path) => Ok(path.clone()),
            None => Ok(build.sub_dir(MANIFEST_DIR)?.join(MANIFEST_FILE)),
        }
    }

    fn stemcell_path(&self, build: &BuildDir) -> Result<PathBuf> {
        match &self.stemcell_dir {
            Some(path) => Ok(path.clone()),
            None => build.stemcell_dir(),
        }
    }
}

impl CommandHandler for DetectStemcellBumpCommand {
    fn execute(&self) -> Result<()> {
        let build = BuildDir::new(&self.build_dir);
        let settings = &self.context.settings;

        let manifest_path = self.manifest_path(&build)?;
        let manifest = fs::read(&manifest_path).map_err(|e| SyncError::read(&manifest_path, e))?;

        let candidate =
            StemcellInput::new(self.stemcell_path(&build)?, &settings.stemcell_os_family).read()?;

        let outcome = BumpDetector::new(&settings.stemcell_alias, self.os_mismatch).detect(
            &manifest,
            &candidate,
            &YamlCodec,
        )?;
        info!("Stemcell bump type: {}", outcome);

        let output = or_build_path(&self.output, &build.root, RESULT_FILE);
        write_atomic(&output, outcome.to_string().as_bytes())?;

        self.context.print(
            &outcome.to_string(),
            &BumpReport {
                bump: outcome.to_string(),
            },
        )
    }

    fn name(&self) -> &'static str {
        "detect-stemcell-bump"
    }
}
