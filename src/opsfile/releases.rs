use std::collections::HashMap;

use serde_yaml_ng::Mapping;
use tracing::{debug, info};

use super::types::{scalar_text, set_record_scalar, PatchOperation, ReleasePath};
use crate::artifact::{ArtifactMetadata, ArtifactSource};
use crate::summary::{ChangeEntry, ChangeSummary, DocumentKind};
use crate::{Result, SyncError};

/// The release record embedded in `op`, if it carries one
fn embedded_release(op: &mut PatchOperation) -> Option<&mut Mapping> {
    match op.release_path()? {
        ReleasePath::Append | ReleasePath::Record { .. } => {}
        ReleasePath::Field { .. } => return None,
    }

    op.value.as_mut()?.as_mapping_mut()
}

fn record_name(record: &Mapping) -> Option<String> {
    record.get("name").and_then(scalar_text)
}

/// Rewrite `sha1`, `url` and `version` of the release records embedded in
/// `ops` for every name in `targets`.
///
/// Only keys an operation already carries are rewritten, apart from
/// `version` which is always set. Every target must be addressed by at least
/// one operation. Records of other releases are left exactly as decoded.
pub fn rewrite_releases<S>(
    ops: &mut [PatchOperation],
    targets: &[String],
    source: &S,
) -> Result<ChangeSummary>
where
    S: ArtifactSource + ?Sized,
{
    if targets.is_empty() {
        return Err(SyncError::NoReleaseNames);
    }

    for name in targets {
        let addressed = ops
            .iter_mut()
            .filter_map(embedded_release)
            .any(|record| record_name(record).as_deref() == Some(name.as_str()));
        if !addressed {
            return Err(SyncError::ReleaseNotFoundInOpsFile { name: name.clone() });
        }
    }

    let mut fetched: HashMap<String, ArtifactMetadata> = HashMap::new();
    for name in targets {
        if !fetched.contains_key(name) {
            fetched.insert(name.clone(), source.fetch(name)?);
        }
    }

    let mut summary = ChangeSummary::new(DocumentKind::OpsFile);
    for record in ops.iter_mut().filter_map(embedded_release) {
        let Some(metadata) = record_name(record).and_then(|name| fetched.get(&name)) else {
            continue;
        };

        let previous_version = record.get("version").and_then(scalar_text);
        if apply_metadata(record, metadata) {
            info!("Ops-file release {} is now at {}", metadata.name, metadata.version);
            summary.record(ChangeEntry::release(
                metadata.name.clone(),
                previous_version,
                metadata.version.clone(),
            ));
        } else {
            debug!("Ops-file release {} already up to date", metadata.name);
        }
    }

    Ok(summary)
}

fn apply_metadata(record: &mut Mapping, metadata: &ArtifactMetadata) -> bool {
    let mut changed = false;

    if record.contains_key("sha1") {
        if let Some(sha) = &metadata.sha {
            changed |= set_record_scalar(record, "sha1", sha);
        }
    }

    if record.contains_key("url") {
        if let Some(url) = &metadata.url {
            changed |= set_record_scalar(record, "url", url);
        }
    }

    changed | set_record_scalar(record, "version", &metadata.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opsfile::PatchValue;
    use serde_yaml_ng::Value;
    use crate::summary::NO_OPS_FILE_CHANGES;
    use pretty_assertions::assert_eq;

    struct StaticSource(Vec<ArtifactMetadata>);

    impl ArtifactSource for StaticSource {
        fn fetch(&self, name: &str) -> Result<ArtifactMetadata> {
            self.0
                .iter()
                .find(|m| m.name == name)
                .cloned()
                .ok_or_else(|| SyncError::MissingMetadataFile {
                    path: format!("{}-release/version", name).into(),
                })
        }
    }

    const OPS_FILE: &str = r#"
- type: replace
  path: /releases/-
  value:
    name: release1
    url: original-release1-url
    version: original-release1-version
    sha1: original-release1-sha1
- type: replace
  path: /releases/-
  value:
    name: release2
    url: original-release2-url
    version: original-release2-version
    sha1: original-release2-sha1
- type: replace
  path: /instance_groups/name=api/instances
  value: 2
"#;

    fn ops() -> Vec<PatchOperation> {
        serde_yaml_ng::from_str(OPS_FILE).unwrap()
    }

    fn built(name: &str, sha: &str, url: &str, version: &str) -> ArtifactMetadata {
        ArtifactMetadata {
            name: name.to_string(),
            version: version.to_string(),
            url: Some(url.to_string()),
            sha: Some(sha.to_string()),
            stemcell: None,
        }
    }

    #[test]
    fn test_rewrites_only_the_targeted_release() {
        let mut ops = ops();
        let source = StaticSource(vec![built("release2", "X", "Y", "Z")]);

        let summary = rewrite_releases(&mut ops, &["release2".to_string()], &source).unwrap();

        let original = self::ops();
        assert_eq!(ops[0], original[0]);
        assert_eq!(ops[2], original[2]);

        let release2 = ops[1].typed_value().and_then(PatchValue::into_release).unwrap();
        assert_eq!(release2.sha1.as_deref(), Some("X"));
        assert_eq!(release2.url.as_deref(), Some("Y"));
        assert_eq!(release2.version.as_deref(), Some("Z"));
        assert_eq!(summary.message(), "Updated opsfile with release2-release Z");
    }

    #[test]
    fn test_unchanged_release_yields_sentinel() {
        let mut ops = ops();
        let source = StaticSource(vec![built(
            "release1",
            "original-release1-sha1",
            "original-release1-url",
            "original-release1-version",
        )]);

        let summary = rewrite_releases(&mut ops, &["release1".to_string()], &source).unwrap();

        assert_eq!(ops, self::ops());
        assert_eq!(summary.message(), NO_OPS_FILE_CHANGES);
    }

    #[test]
    fn test_version_only_op_gains_no_url_or_sha() {
        let mut ops: Vec<PatchOperation> = serde_yaml_ng::from_str(
            "- type: replace\n  path: /releases/name=bpm\n  value:\n    name: bpm\n    version: \"1.0\"\n",
        )
        .unwrap();
        let source = StaticSource(vec![built("bpm", "sha", "url", "1.1")]);

        rewrite_releases(&mut ops, &["bpm".to_string()], &source).unwrap();

        let bpm = ops[0].typed_value().and_then(PatchValue::into_release).unwrap();
        assert_eq!(bpm.version.as_deref(), Some("1.1"));
        assert_eq!(bpm.url, None);
        assert_eq!(bpm.sha1, None);
    }

    #[test]
    fn test_unbuilt_release_keeps_url_and_sha() {
        let mut ops = ops();
        let source = StaticSource(vec![ArtifactMetadata {
            name: "release1".to_string(),
            version: "2.0".to_string(),
            ..Default::default()
        }]);

        rewrite_releases(&mut ops, &["release1".to_string()], &source).unwrap();

        let release1 = ops[0].typed_value().and_then(PatchValue::into_release).unwrap();
        assert_eq!(release1.sha1.as_deref(), Some("original-release1-sha1"));
        assert_eq!(release1.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_untargeted_records_keep_their_scalar_types() {
        let mut ops: Vec<PatchOperation> = serde_yaml_ng::from_str(
            "- type: replace\n  path: /releases/-\n  value:\n    name: release1\n    version: 2\n    stemcell:\n      os: ubuntu-jammy\n      version: 1.80\n- type: replace\n  path: /releases/name=release2\n  value:\n    name: release2\n    version: 1.0\n",
        )
        .unwrap();
        let source = StaticSource(vec![built("release2", "sha", "url", "1.1")]);

        rewrite_releases(&mut ops, &["release2".to_string()], &source).unwrap();

        let encoded = serde_yaml_ng::to_string(&ops).unwrap();
        let reparsed: Vec<PatchOperation> = serde_yaml_ng::from_str(&encoded).unwrap();
        let release1 = reparsed[0].value.as_ref().unwrap();
        assert_eq!(release1["version"], Value::from(2));
        assert_eq!(release1["stemcell"]["version"], Value::from(1.80));
        assert!(!encoded.contains("'2'"));
        assert!(!encoded.contains("'1.8'"));
        assert_eq!(reparsed[1].value.as_ref().unwrap()["version"], Value::from("1.1"));
    }

    #[test]
    fn test_equal_numeric_version_is_left_alone() {
        let mut ops: Vec<PatchOperation> = serde_yaml_ng::from_str(
            "- type: replace\n  path: /releases/-\n  value:\n    name: release1\n    version: 2\n",
        )
        .unwrap();
        let source = StaticSource(vec![ArtifactMetadata {
            name: "release1".to_string(),
            version: "2".to_string(),
            ..Default::default()
        }]);

        let summary = rewrite_releases(&mut ops, &["release1".to_string()], &source).unwrap();

        assert_eq!(ops[0].value.as_ref().unwrap()["version"], Value::from(2));
        assert_eq!(summary.message(), NO_OPS_FILE_CHANGES);
    }

    #[test]
    fn test_missing_release_is_an_error() {
        let mut ops = ops();
        let source = StaticSource(vec![]);

        let err = rewrite_releases(&mut ops, &["release3".to_string()], &source).unwrap_err();
        assert_eq!(err.to_string(), "ops-file does not contain release named release3");
    }

    #[test]
    fn test_empty_targets_are_rejected() {
        let mut ops = ops();
        let err = rewrite_releases(&mut ops, &[], &StaticSource(vec![])).unwrap_err();
        assert!(matches!(err, SyncError::NoReleaseNames));
    }
}
