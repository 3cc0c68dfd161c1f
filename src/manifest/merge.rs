//! Record-level merges over a manifest suffix
//!
//! Both merges take the decoded suffix by reference and return a new one,
//! along with the summary of what differs. Rendering back to bytes goes
//! through [`Descriptor::render`] so the preamble is never touched.

use std::collections::HashMap;

use tracing::{debug, info};

use super::splitter::{Descriptor, DocumentSplitter};
use super::types::{ManifestSuffix, Release, Stemcell, StemcellRef};
use crate::artifact::{ArtifactMetadata, ArtifactSource};
use crate::codec::DocumentCodec;
use crate::summary::{ChangeSummary, DocumentKind};
use crate::Result;

/// A merged suffix and the changes it carries
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub suffix: ManifestSuffix,
    pub summary: ChangeSummary,
}

/// A fully rendered manifest ready to be written
#[derive(Debug, Clone)]
pub struct RenderedManifest {
    pub document: Vec<u8>,
    pub summary: ChangeSummary,
}

/// Replace every targeted release with freshly fetched metadata.
///
/// Targets missing from the manifest are appended in target order. Metadata
/// is fetched once per target, in target order, before anything is merged.
pub fn merge_releases<S>(
    suffix: &ManifestSuffix,
    targets: &[String],
    source: &S,
) -> Result<MergeOutcome>
where
    S: ArtifactSource + ?Sized,
{
    let mut fetched: HashMap<&str, ArtifactMetadata> = HashMap::new();
    for name in targets {
        if fetched.contains_key(name.as_str()) {
            continue;
        }
        fetched.insert(name.as_str(), source.fetch(name)?);
    }

    let mut releases = suffix.releases.clone();
    for name in targets {
        if !releases.iter().any(|r| &r.name == name) {
            debug!("Appending placeholder for new release {}", name);
            releases.push(Release::placeholder(name.clone()));
        }
    }

    let mut summary = ChangeSummary::new(DocumentKind::Manifest);
    let merged = releases
        .into_iter()
        .map(|release| match fetched.get(release.name.as_str()) {
            Some(metadata) => {
                let updated = metadata.apply_to(&release);
                if summary.record_release(suffix.release(&release.name), &updated) {
                    info!("Release {} is now at {}", updated.name, updated.version);
                }
                updated
            }
            None => release,
        })
        .collect();

    Ok(MergeOutcome {
        suffix: ManifestSuffix {
            releases: merged,
            stemcells: suffix.stemcells.clone(),
        },
        summary,
    })
}

/// Point the stemcell with `alias` at `stemcell`, appending it if absent
pub fn merge_stemcell(suffix: &ManifestSuffix, alias: &str, stemcell: &StemcellRef) -> MergeOutcome {
    let mut summary = ChangeSummary::new(DocumentKind::Manifest);
    let previous = suffix.stemcell(alias).map(Stemcell::os_and_version);
    summary.record_stemcell(previous.as_ref(), stemcell);

    let mut stemcells = suffix.stemcells.clone();
    match stemcells.iter_mut().find(|s| s.alias == alias) {
        Some(existing) => {
            existing.os = stemcell.os.clone();
            existing.version = stemcell.version.clone();
        }
        None => {
            debug!("No stemcell with alias {}, appending one", alias);
            stemcells.push(Stemcell {
                alias: alias.to_string(),
                os: stemcell.os.clone(),
                version: stemcell.version.clone(),
            });
        }
    }

    MergeOutcome {
        suffix: ManifestSuffix {
            releases: suffix.releases.clone(),
            stemcells,
        },
        summary,
    }
}

/// Split, merge releases, and render a whole manifest
pub fn update_releases<C, S>(
    document: &[u8],
    targets: &[String],
    source: &S,
    codec: &C,
) -> Result<RenderedManifest>
where
    C: DocumentCodec,
    S: ArtifactSource + ?Sized,
{
    let descriptor = DocumentSplitter.split(document, codec)?;
    let outcome = merge_releases(descriptor.suffix(), targets, source)?;
    render(&descriptor, outcome, codec)
}

/// Split, merge the stemcell, and render a whole manifest
pub fn update_stemcell<C: DocumentCodec>(
    document: &[u8],
    alias: &str,
    stemcell: &StemcellRef,
    codec: &C,
) -> Result<RenderedManifest> {
    let descriptor = DocumentSplitter.split(document, codec)?;
    let outcome = merge_stemcell(descriptor.suffix(), alias, stemcell);
    render(&descriptor, outcome, codec)
}

fn render<C: DocumentCodec>(
    descriptor: &Descriptor<'_>,
    outcome: MergeOutcome,
    codec: &C,
) -> Result<RenderedManifest> {
    let document = descriptor.render(codec, &outcome.suffix)?;
    Ok(RenderedManifest {
        document,
        summary: outcome.summary,
    })
}
