//! Filesystem side of a sync run: build-directory conventions, all-or-nothing
//! output writes and the shared commit-message file.

pub mod commit_message;
pub mod paths;
pub mod writer;

pub use commit_message::write_commit_message;
pub use paths::BuildDir;
pub use writer::write_atomic;
