pub mod artifact;
pub mod bump;
pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod io;
pub mod manifest;
pub mod opsfile;
pub mod summary;
pub mod version;

pub use error::{Result, SyncError};
