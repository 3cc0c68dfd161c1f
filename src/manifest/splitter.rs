//! Splits a manifest into an opaque preamble and its release/stemcell suffix
//!
//! Only the suffix is ever decoded. The preamble is kept as a byte range over
//! the caller's buffer and copied back verbatim when the manifest is rendered.

use once_cell::sync::Lazy;
use regex::bytes::Regex;
use serde_yaml_ng::{Mapping, Value};
use tracing::debug;

use super::types::ManifestSuffix;
use crate::codec::DocumentCodec;
use crate::{Result, SyncError};

/// A manifest split at the release section marker
#[derive(Debug, Clone)]
pub struct Descriptor<'a> {
    document: &'a [u8],
    boundary: usize,
    suffix: ManifestSuffix,
}

impl<'a> Descriptor<'a> {
    /// Everything before the release section marker, untouched
    pub fn preamble(&self) -> &'a [u8] {
        &self.document[..self.boundary]
    }

    /// Byte offset of the release section marker in the original document
    pub fn boundary(&self) -> usize {
        self.boundary
    }

    pub fn suffix(&self) -> &ManifestSuffix {
        &self.suffix
    }

    /// Concatenate the preamble with a freshly encoded suffix
    pub fn render<C: DocumentCodec>(&self, codec: &C, suffix: &ManifestSuffix) -> Result<Vec<u8>> {
        let encoded = codec.encode(suffix)?;

        let mut rendered = Vec::with_capacity(self.boundary + encoded.len());
        rendered.extend_from_slice(self.preamble());
        rendered.extend_from_slice(&encoded);
        Ok(rendered)
    }
}

pub const RELEASES_SECTION: &str = "releases";
pub const STEMCELLS_SECTION: &str = "stemcells";

static RELEASES_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^releases:\r?$").expect("releases marker pattern"));

/// Locates the release/stemcell suffix of a manifest
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentSplitter;

impl DocumentSplitter {
    pub fn split<'a, C: DocumentCodec>(&self, document: &'a [u8], codec: &C) -> Result<Descriptor<'a>> {
        let boundary = RELEASES_MARKER
            .find(document)
            .map(|m| m.start())
            .ok_or_else(|| SyncError::SectionMarkerNotFound {
                marker: RELEASES_SECTION.to_string(),
            })?;

        let suffix_bytes = &document[boundary..];
        debug!(
            boundary,
            suffix_len = suffix_bytes.len(),
            "Found release section marker"
        );

        let generic: Mapping = codec.decode(suffix_bytes)?;
        validate_shape(&generic)?;

        let suffix: ManifestSuffix = codec.decode(suffix_bytes)?;

        Ok(Descriptor {
            document,
            boundary,
            suffix,
        })
    }
}

fn validate_shape(generic: &Mapping) -> Result<()> {
    if !generic.contains_key(STEMCELLS_SECTION) {
        return Err(SyncError::MissingRequiredSection {
            section: STEMCELLS_SECTION.to_string(),
        });
    }

    let unexpected: Vec<String> = generic
        .keys()
        .filter(|key| {
            key.as_str() != Some(RELEASES_SECTION) && key.as_str() != Some(STEMCELLS_SECTION)
        })
        .map(describe_key)
        .collect();

    if !unexpected.is_empty() {
        return Err(SyncError::UnexpectedTopLevelKeys { keys: unexpected });
    }

    Ok(())
}

fn describe_key(key: &Value) -> String {
    match key {
        Value::String(s) => s.clone(),
        other => serde_yaml_ng::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_else(|_| format!("{:?}", other)),
    }
}
