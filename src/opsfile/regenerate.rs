//! Regenerated compiled-release ops-files
//!
//! Unlike the in-place rewrites, the document is rebuilt from nothing: one
//! whole-record `replace` per compiled tarball, under a header marking the
//! file as generated.

use tracing::info;

use super::types::{PatchOperation, ReleaseValue};
use super::RenderedOpsFile;
use crate::artifact::ArtifactMetadata;
use crate::codec::DocumentCodec;
use crate::manifest::StemcellRef;
use crate::summary::{ChangeEntry, ChangeSummary, DocumentKind};
use crate::{Result, SyncError};

pub const GENERATED_HEADER: &str = "## GENERATED FILE. DO NOT EDIT\n---\n";

/// One `replace /releases/name=<n>` per compiled release.
///
/// Every release must have been compiled against `stemcell`.
pub fn compiled_release_ops(
    compiled: &[ArtifactMetadata],
    stemcell: &StemcellRef,
) -> Result<(Vec<PatchOperation>, ChangeSummary)> {
    if compiled.is_empty() {
        return Err(SyncError::NoReleaseNames);
    }

    let mut ops = Vec::with_capacity(compiled.len());
    let mut summary = ChangeSummary::new(DocumentKind::CompiledReleases);

    for metadata in compiled {
        if metadata.stemcell.as_ref() != Some(stemcell) {
            return Err(SyncError::CompiledStemcellMismatch {
                name: metadata.name.clone(),
                found: metadata
                    .stemcell
                    .as_ref()
                    .map(|s| format!("{} {}", s.os, s.version))
                    .unwrap_or_else(|| "no stemcell".to_string()),
                expected: format!("{} {}", stemcell.os, stemcell.version),
            });
        }

        let release = metadata.to_release();
        ops.push(PatchOperation::replace(
            format!("/releases/name={}", release.name),
            serde_yaml_ng::to_value(ReleaseValue::from(&release))?,
        ));
        summary.record(ChangeEntry::release(release.name, None, release.version));
    }

    info!("Generated {} compiled release operations", ops.len());
    Ok((ops, summary))
}

/// Build the whole ops-file for `compiled`, header included
pub fn regenerate_compiled_releases<C: DocumentCodec>(
    compiled: &[ArtifactMetadata],
    stemcell: &StemcellRef,
    codec: &C,
) -> Result<RenderedOpsFile> {
    let (ops, summary) = compiled_release_ops(compiled, stemcell)?;

    let mut document = GENERATED_HEADER.as_bytes().to_vec();
    document.extend_from_slice(&codec.encode(&ops)?);

    Ok(RenderedOpsFile { document, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::YamlCodec;
    use crate::opsfile::PatchValue;
    use pretty_assertions::assert_eq;

    fn jammy(version: &str) -> StemcellRef {
        StemcellRef {
            os: "ubuntu-jammy".to_string(),
            version: version.to_string(),
        }
    }

    fn compiled(name: &str, version: &str, stemcell: &str) -> ArtifactMetadata {
        ArtifactMetadata {
            name: name.to_string(),
            version: version.to_string(),
            url: Some(format!("https://example.com/{}-{}.tgz", name, version)),
            sha: Some(format!("sha256:{}", name)),
            stemcell: Some(jammy(stemcell)),
        }
    }

    #[test]
    fn test_one_replace_per_release_under_header() {
        let releases = vec![compiled("bpm", "1.2", "1.83"), compiled("capi", "1.1", "1.83")];

        let rendered = regenerate_compiled_releases(&releases, &jammy("1.83"), &YamlCodec).unwrap();

        let text = String::from_utf8(rendered.document).unwrap();
        assert!(text.starts_with("## GENERATED FILE. DO NOT EDIT\n---\n"));

        let ops: Vec<PatchOperation> =
            serde_yaml_ng::from_str(&text[GENERATED_HEADER.len()..]).unwrap();
        let paths: Vec<_> = ops.iter().map(|op| op.path.as_str()).collect();
        assert_eq!(paths, vec!["/releases/name=bpm", "/releases/name=capi"]);
        assert!(ops.iter().all(|op| op.op_type == "replace"));

        let capi = ops[1].typed_value().and_then(PatchValue::into_release).unwrap();
        assert_eq!(capi.url.as_deref(), Some("https://example.com/capi-1.1.tgz"));
        assert_eq!(capi.sha1.as_deref(), Some("sha256:capi"));
        assert_eq!(capi.stemcell.unwrap().version, "1.83");

        assert_eq!(
            rendered.summary.message(),
            "Updated compiled releases with bpm 1.2, capi 1.1"
        );
    }

    #[test]
    fn test_release_on_other_stemcell_is_rejected() {
        let releases = vec![compiled("bpm", "1.2", "1.83"), compiled("capi", "1.1", "1.80")];

        let err = regenerate_compiled_releases(&releases, &jammy("1.83"), &YamlCodec).unwrap_err();

        assert!(err.to_string().starts_with("stemcell mismatch"));
        assert!(matches!(
            err,
            SyncError::CompiledStemcellMismatch { ref name, .. } if name == "capi"
        ));
    }

    #[test]
    fn test_nothing_to_regenerate() {
        let err = compiled_release_ops(&[], &jammy("1.83")).unwrap_err();
        assert!(matches!(err, SyncError::NoReleaseNames));
    }
}
