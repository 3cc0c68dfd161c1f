//! Ops-file synchronization
//!
//! Ops-files have no preamble to protect, so the whole operation list is
//! decoded, rewritten in place and encoded again. A compiled-releases
//! ops-file can also be regenerated outright from a directory of tarballs.

pub mod compiled;
pub mod regenerate;
pub mod releases;
pub mod types;

pub use compiled::rewrite_compiled_releases;
pub use regenerate::{compiled_release_ops, regenerate_compiled_releases, GENERATED_HEADER};
pub use releases::rewrite_releases;
pub use types::{
    PatchOperation, PatchValue, ReleaseField, ReleasePath, ReleaseValue, StemcellValue,
};

use crate::artifact::ArtifactSource;
use crate::codec::DocumentCodec;
use crate::summary::ChangeSummary;
use crate::Result;

/// An encoded ops-file ready to be written
#[derive(Debug, Clone)]
pub struct RenderedOpsFile {
    pub document: Vec<u8>,
    pub summary: ChangeSummary,
}

/// Decode `document`, update embedded release records, and encode it again
pub fn update_releases<C, S>(
    document: &[u8],
    targets: &[String],
    source: &S,
    codec: &C,
) -> Result<RenderedOpsFile>
where
    C: DocumentCodec,
    S: ArtifactSource + ?Sized,
{
    let mut ops: Vec<PatchOperation> = codec.decode(document)?;
    let summary = rewrite_releases(&mut ops, targets, source)?;

    Ok(RenderedOpsFile {
        document: codec.encode(&ops)?,
        summary,
    })
}

/// Decode `document`, update compiled-release operations, and encode it again
pub fn update_compiled_releases<C, S>(
    document: &[u8],
    targets: &[String],
    source: &S,
    codec: &C,
) -> Result<RenderedOpsFile>
where
    C: DocumentCodec,
    S: ArtifactSource + ?Sized,
{
    let mut ops: Vec<PatchOperation> = codec.decode(document)?;
    let summary = rewrite_compiled_releases(&mut ops, targets, source)?;

    Ok(RenderedOpsFile {
        document: codec.encode(&ops)?,
        summary,
    })
}
