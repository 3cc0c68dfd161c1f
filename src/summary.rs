//! Human-readable change summaries
//!
//! A summary renders to a single line that automation uses as a commit
//! message. When nothing changed it renders to a fixed sentinel instead.

use std::fmt;

use crate::manifest::{Release, StemcellRef};

pub const NO_MANIFEST_CHANGES: &str = "No manifest release or stemcell version updates";
pub const NO_OPS_FILE_CHANGES: &str = "No opsfile release updates";
pub const NO_COMPILED_RELEASE_CHANGES: &str = "No compiled release updates";

/// True for any of the "nothing changed" messages
pub fn is_sentinel(message: &str) -> bool {
    matches!(
        message.trim(),
        NO_MANIFEST_CHANGES | NO_OPS_FILE_CHANGES | NO_COMPILED_RELEASE_CHANGES
    )
}

/// Which document a summary describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Manifest,
    OpsFile,
    CompiledReleases,
}

impl DocumentKind {
    fn subject(&self) -> &'static str {
        match self {
            DocumentKind::Manifest => "manifest",
            DocumentKind::OpsFile => "opsfile",
            DocumentKind::CompiledReleases => "compiled releases",
        }
    }

    fn sentinel(&self) -> &'static str {
        match self {
            DocumentKind::Manifest => NO_MANIFEST_CHANGES,
            DocumentKind::OpsFile => NO_OPS_FILE_CHANGES,
            DocumentKind::CompiledReleases => NO_COMPILED_RELEASE_CHANGES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeSubject {
    Release(String),
    /// Keyed by the new stemcell OS
    Stemcell(String),
}

/// One record whose tracked fields changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEntry {
    pub subject: ChangeSubject,
    pub old_version: Option<String>,
    pub new_version: String,
}

impl ChangeEntry {
    pub fn release(
        name: impl Into<String>,
        old_version: Option<String>,
        new_version: impl Into<String>,
    ) -> Self {
        ChangeEntry {
            subject: ChangeSubject::Release(name.into()),
            old_version,
            new_version: new_version.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSummary {
    kind: DocumentKind,
    entries: Vec<ChangeEntry>,
}

impl ChangeSummary {
    pub fn new(kind: DocumentKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    pub fn entries(&self) -> &[ChangeEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record `new` if it differs from `old` in any field
    pub fn record_release(&mut self, old: Option<&Release>, new: &Release) -> bool {
        if old == Some(new) {
            return false;
        }

        self.record(ChangeEntry::release(
            new.name.clone(),
            old.map(|r| r.version.clone()),
            new.version.clone(),
        ));
        true
    }

    /// Record a stemcell change; only OS and version are compared
    pub fn record_stemcell(&mut self, old: Option<&StemcellRef>, new: &StemcellRef) -> bool {
        if old == Some(new) {
            return false;
        }

        self.entries.push(ChangeEntry {
            subject: ChangeSubject::Stemcell(new.os.clone()),
            old_version: old.map(|s| s.version.clone()),
            new_version: new.version.clone(),
        });
        true
    }

    /// Record an entry computed by the caller
    pub fn record(&mut self, entry: ChangeEntry) {
        self.entries.push(entry);
    }

    /// The commit message line
    pub fn message(&self) -> String {
        self.to_string()
    }

    fn render_entry(&self, entry: &ChangeEntry) -> String {
        match (&entry.subject, self.kind) {
            (ChangeSubject::Release(name), DocumentKind::CompiledReleases) => {
                format!("{} {}", name, entry.new_version)
            }
            (ChangeSubject::Release(name), _) => format!("{}-release {}", name, entry.new_version),
            (ChangeSubject::Stemcell(os), _) => format!("{} stemcell {}", os, entry.new_version),
        }
    }
}

impl fmt::Display for ChangeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "{}", self.kind.sentinel());
        }

        let rendered: Vec<String> = self.entries.iter().map(|e| self.render_entry(e)).collect();
        write!(f, "Updated {} with {}", self.kind.subject(), rendered.join(", "))
    }
}
