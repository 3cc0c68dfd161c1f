//! Stemcell bump classification
//!
//! Runs ahead of a stemcell merge to decide what kind of bump a candidate
//! stemcell is relative to the one a manifest currently deploys. A move to a
//! lower version is always rejected. A move to a different OS is governed by
//! [`OsMismatchPolicy`].

use std::fmt;

use clap::ValueEnum;
use tracing::{debug, warn};

use crate::codec::DocumentCodec;
use crate::manifest::{DocumentSplitter, StemcellRef};
use crate::version::{check_forward_bump, BumpType};
use crate::{Result, SyncError};

/// What to do when the candidate stemcell has a different OS
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OsMismatchPolicy {
    /// Fail with `StemcellOsMismatch`
    Fatal,
    /// Log a warning and treat the change as a major bump
    #[default]
    Proceed,
}

/// Terminal state of a successful classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpOutcome {
    Accepted(BumpType),
    /// Same OS and an equal version
    Unchanged,
}

impl fmt::Display for BumpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpOutcome::Accepted(bump) => write!(f, "{}", bump),
            BumpOutcome::Unchanged => write!(f, "none"),
        }
    }
}

/// Classify `candidate` relative to `current`
pub fn classify(
    current: &StemcellRef,
    candidate: &StemcellRef,
    policy: OsMismatchPolicy,
) -> Result<BumpOutcome> {
    if current.os != candidate.os {
        return match policy {
            OsMismatchPolicy::Fatal => Err(SyncError::StemcellOsMismatch {
                from: current.os.clone(),
                to: candidate.os.clone(),
            }),
            OsMismatchPolicy::Proceed => {
                warn!(
                    "Stemcell OS changes from {} to {}, treating as a major bump",
                    current.os, candidate.os
                );
                Ok(BumpOutcome::Accepted(BumpType::Major))
            }
        };
    }

    let outcome = match check_forward_bump(&current.version, &candidate.version)? {
        Some(bump) => BumpOutcome::Accepted(bump),
        None => BumpOutcome::Unchanged,
    };
    debug!(
        "Stemcell {} {} -> {}: {}",
        current.os, current.version, candidate.version, outcome
    );

    Ok(outcome)
}

/// Reads the deployed stemcell out of a manifest and classifies a candidate
#[derive(Debug, Clone)]
pub struct BumpDetector {
    alias: String,
    policy: OsMismatchPolicy,
}

impl BumpDetector {
    pub fn new(alias: impl Into<String>, policy: OsMismatchPolicy) -> Self {
        Self {
            alias: alias.into(),
            policy,
        }
    }

    /// The stemcell the manifest deploys under this detector's alias
    pub fn deployed_stemcell<C: DocumentCodec>(
        &self,
        manifest: &[u8],
        codec: &C,
    ) -> Result<StemcellRef> {
        let descriptor = DocumentSplitter.split(manifest, codec)?;
        descriptor
            .suffix()
            .stemcell(&self.alias)
            .map(|s| s.os_and_version())
            .ok_or_else(|| SyncError::StemcellAliasNotFound {
                alias: self.alias.clone(),
            })
    }

    pub fn detect<C: DocumentCodec>(
        &self,
        manifest: &[u8],
        candidate: &StemcellRef,
        codec: &C,
    ) -> Result<BumpOutcome> {
        let current = self.deployed_stemcell(manifest, codec)?;
        classify(&current, candidate, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::YamlCodec;
    use pretty_assertions::assert_eq;

    fn stemcell(os: &str, version: &str) -> StemcellRef {
        StemcellRef {
            os: os.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn test_minor_bump() {
        let outcome = classify(
            &stemcell("whatever", "456.1"),
            &stemcell("whatever", "456.2"),
            OsMismatchPolicy::Fatal,
        )
        .unwrap();
        assert_eq!(outcome, BumpOutcome::Accepted(BumpType::Minor));
        assert_eq!(outcome.to_string(), "minor");
    }

    #[test]
    fn test_major_bump() {
        let outcome = classify(
            &stemcell("whatever", "456.1"),
            &stemcell("whatever", "460.0"),
            OsMismatchPolicy::Fatal,
        )
        .unwrap();
        assert_eq!(outcome.to_string(), "major");
    }

    #[test]
    fn test_regression_is_always_fatal() {
        for policy in [OsMismatchPolicy::Fatal, OsMismatchPolicy::Proceed] {
            let err = classify(
                &stemcell("whatever", "456.2"),
                &stemcell("whatever", "456.1"),
                policy,
            )
            .unwrap_err();
            assert_eq!(err.to_string(), "change from 456.2 to 456.1 is not a forward bump");
        }
    }

    #[test]
    fn test_equal_versions_are_unchanged() {
        let outcome = classify(
            &stemcell("ubuntu-jammy", "1.83"),
            &stemcell("ubuntu-jammy", "1.83"),
            OsMismatchPolicy::Fatal,
        )
        .unwrap();
        assert_eq!(outcome.to_string(), "none");
    }

    #[test]
    fn test_os_mismatch_policies() {
        let current = stemcell("whatever", "460.0");
        let candidate = stemcell("new-os", "1.1");

        let err = classify(&current, &candidate, OsMismatchPolicy::Fatal).unwrap_err();
        assert_eq!(
            err.to_string(),
            "stemcell os mismatch: found \"whatever\" and \"new-os\""
        );

        let outcome = classify(&current, &candidate, OsMismatchPolicy::Proceed).unwrap();
        assert_eq!(outcome, BumpOutcome::Accepted(BumpType::Major));
    }

    #[test]
    fn test_detect_reads_alias_from_manifest() {
        let manifest = b"name: cf\nreleases:\n- name: capi\n  version: \"1.0\"\nstemcells:\n- alias: default\n  os: ubuntu-jammy\n  version: \"1.80\"\n";

        let detector = BumpDetector::new("default", OsMismatchPolicy::Fatal);
        let outcome = detector
            .detect(manifest, &stemcell("ubuntu-jammy", "1.83"), &YamlCodec)
            .unwrap();
        assert_eq!(outcome, BumpOutcome::Accepted(BumpType::Minor));

        let err = BumpDetector::new("windows", OsMismatchPolicy::Fatal)
            .detect(manifest, &stemcell("ubuntu-jammy", "1.83"), &YamlCodec)
            .unwrap_err();
        assert!(matches!(err, SyncError::StemcellAliasNotFound { .. }));
    }
}
