//! Deployment manifest handling
//!
//! A manifest is an opaque preamble followed by `releases:` and `stemcells:`.
//! [`DocumentSplitter`] finds the boundary, [`merge`] rewrites the suffix.

pub mod merge;
pub mod splitter;
pub mod types;

pub use merge::{
    merge_releases, merge_stemcell, update_releases, update_stemcell, MergeOutcome,
    RenderedManifest,
};
pub use splitter::{Descriptor, DocumentSplitter, RELEASES_SECTION, STEMCELLS_SECTION};
pub use types::{ManifestSuffix, Release, Stemcell, StemcellRef};
