//! Compiled-release ops-files
//!
//! These address releases by name, either as a whole record
//! (`/releases/name=<n>`) or one field at a time
//! (`/releases/name=<n>/url`, `.../version`, `.../sha1`, `.../stemcell?`).

use serde_yaml_ng::{Mapping, Value};
use tracing::{debug, info};

use super::types::{
    scalar_text, set_record_scalar, set_scalar, PatchOperation, PatchValue, ReleaseField,
    ReleasePath, ReleaseValue, StemcellValue,
};
use crate::artifact::ArtifactSource;
use crate::manifest::{Release, StemcellRef};
use crate::summary::{ChangeEntry, ChangeSummary, DocumentKind};
use crate::{Result, SyncError};

/// Rewrite every operation that addresses one of `targets`.
///
/// A target no operation addresses gets a new whole-record `replace`
/// appended. Values already matching the compiled release are kept as
/// decoded.
pub fn rewrite_compiled_releases<S>(
    ops: &mut Vec<PatchOperation>,
    targets: &[String],
    source: &S,
) -> Result<ChangeSummary>
where
    S: ArtifactSource + ?Sized,
{
    if targets.is_empty() {
        return Err(SyncError::NoReleaseNames);
    }

    let mut summary = ChangeSummary::new(DocumentKind::CompiledReleases);

    for name in targets {
        info!("Updating compiled release {}", name);
        let release = source.fetch(name)?.to_release();

        let mut addressed = false;
        let mut changed = false;
        let mut old_version = None;

        for op in ops.iter_mut() {
            let Some(path) = op.release_path() else {
                continue;
            };
            if path.name() != Some(name.as_str()) {
                continue;
            }

            addressed = true;
            if old_version.is_none() {
                old_version = version_of(&path, op);
            }
            changed |= rewrite_value(&path, &mut op.value, &release)?;
        }

        if !addressed {
            debug!("No operation addresses {}, appending one", name);
            ops.push(PatchOperation::replace(
                format!("/releases/name={}", name),
                serde_yaml_ng::to_value(ReleaseValue::from(&release))?,
            ));
            changed = true;
        }

        if changed {
            summary.record(ChangeEntry::release(
                release.name.clone(),
                old_version,
                release.version.clone(),
            ));
        }
    }

    Ok(summary)
}

/// Point the value of an operation at `path` at `release`; returns whether
/// anything changed
fn rewrite_value(path: &ReleasePath, slot: &mut Option<Value>, release: &Release) -> Result<bool> {
    let field = match path {
        ReleasePath::Append => return Ok(false),
        ReleasePath::Record { .. } => {
            return match slot.as_mut().and_then(Value::as_mapping_mut) {
                Some(record) => rewrite_record(record, release),
                None => {
                    *slot = Some(serde_yaml_ng::to_value(ReleaseValue::from(release))?);
                    Ok(true)
                }
            };
        }
        ReleasePath::Field { field, .. } => *field,
    };

    match field {
        ReleaseField::Url => Ok(set_scalar(slot, &release.url)),
        ReleaseField::Version => Ok(set_scalar(slot, &release.version)),
        ReleaseField::Sha1 => Ok(set_scalar(slot, &release.sha1)),
        ReleaseField::Stemcell => match &release.stemcell {
            Some(stemcell) => set_stemcell(slot, stemcell),
            None => Ok(false),
        },
    }
}

// Extra keys of the record (exported_from and the like) are kept.
fn rewrite_record(record: &mut Mapping, release: &Release) -> Result<bool> {
    let mut changed = set_record_scalar(record, "url", &release.url);
    changed |= set_record_scalar(record, "version", &release.version);
    changed |= set_record_scalar(record, "sha1", &release.sha1);

    if let Some(stemcell) = &release.stemcell {
        let wanted = StemcellValue::from(stemcell);
        match record.get_mut("stemcell") {
            Some(existing) if StemcellValue::from_value(existing).as_ref() == Some(&wanted) => {}
            Some(existing) => {
                *existing = serde_yaml_ng::to_value(wanted)?;
                changed = true;
            }
            None => {
                record.insert(
                    Value::String("stemcell".to_string()),
                    serde_yaml_ng::to_value(wanted)?,
                );
                changed = true;
            }
        }
    }

    Ok(changed)
}

fn set_stemcell(slot: &mut Option<Value>, stemcell: &StemcellRef) -> Result<bool> {
    let wanted = StemcellValue::from(stemcell);
    if slot.as_ref().and_then(StemcellValue::from_value).as_ref() == Some(&wanted) {
        return Ok(false);
    }
    *slot = Some(serde_yaml_ng::to_value(wanted)?);
    Ok(true)
}

fn version_of(path: &ReleasePath, op: &PatchOperation) -> Option<String> {
    match (path, op.typed_value()?) {
        (ReleasePath::Record { .. }, PatchValue::Release(release)) => release.version,
        (
            ReleasePath::Field {
                field: ReleaseField::Version,
                ..
            },
            PatchValue::Scalar(scalar),
        ) => scalar_text(&scalar),
        _ => None,
    }
}
