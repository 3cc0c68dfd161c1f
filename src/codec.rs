//! Serializer capability handed to every merge function
//!
//! Merge code never calls `serde_yaml_ng` directly; it receives a
//! [`DocumentCodec`] so tests can substitute a failing or instrumented one.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::Result;

/// Encodes and decodes structured document sections
pub trait DocumentCodec {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T>;

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>>;
}

/// The YAML codec used by the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl DocumentCodec for YamlCodec {
    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T> {
        Ok(serde_yaml_ng::from_slice(bytes)?)
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>> {
        Ok(serde_yaml_ng::to_string(value)?.into_bytes())
    }
}
