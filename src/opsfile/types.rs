//! Patch operations and the value shapes they carry
//!
//! Operations keep the YAML value they were decoded with. A typed view is
//! built from the `path` only when an operation is about to be read or
//! rewritten, so operations nobody targets re-encode exactly as decoded.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use serde_yaml_ng::{Mapping, Value};

use crate::manifest::{Release, StemcellRef};

/// One `{type, path, value}` entry of an ops-file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    #[serde(rename = "type")]
    pub op_type: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOperation {
    /// `replace <path>` carrying `value`
    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op_type: "replace".to_string(),
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn release_path(&self) -> Option<ReleasePath> {
        ReleasePath::parse(&self.path)
    }

    /// The value, typed by what the path addresses
    pub fn typed_value(&self) -> Option<PatchValue> {
        let value = self.value.as_ref()?;
        Some(PatchValue::classify(self.release_path().as_ref(), value))
    }
}

/// Typed view of a patch operation's value
#[derive(Debug, Clone, PartialEq)]
pub enum PatchValue {
    /// A release record, under `/releases/-` or `/releases/name=<n>`
    Release(ReleaseValue),
    /// Under `/releases/name=<n>/stemcell`
    Stemcell(StemcellValue),
    /// Anything else, as decoded
    Scalar(Value),
}

impl PatchValue {
    pub fn classify(path: Option<&ReleasePath>, value: &Value) -> Self {
        let typed = match path {
            Some(ReleasePath::Append) | Some(ReleasePath::Record { .. }) if value.is_mapping() => {
                serde_yaml_ng::from_value(value.clone()).ok().map(PatchValue::Release)
            }
            Some(ReleasePath::Field {
                field: ReleaseField::Stemcell,
                ..
            }) => StemcellValue::from_value(value).map(PatchValue::Stemcell),
            _ => None,
        };

        typed.unwrap_or_else(|| PatchValue::Scalar(value.clone()))
    }

    /// A plain string value, for the `url`/`version`/`sha1` field paths
    pub fn string(value: impl Into<String>) -> Self {
        PatchValue::Scalar(Value::String(value.into()))
    }

    pub fn into_release(self) -> Option<ReleaseValue> {
        match self {
            PatchValue::Release(release) => Some(release),
            _ => None,
        }
    }
}

/// A release record embedded in an operation
///
/// `url` and `sha1` are optional because version-only ops are common.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseValue {
    #[serde(deserialize_with = "scalar")]
    pub name: String,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub version: Option<String>,
    #[serde(
        default,
        deserialize_with = "optional_scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stemcell: Option<StemcellValue>,
}

impl From<&Release> for ReleaseValue {
    fn from(release: &Release) -> Self {
        ReleaseValue {
            name: release.name.clone(),
            url: Some(release.url.clone()),
            version: Some(release.version.clone()),
            sha1: Some(release.sha1.clone()),
            stemcell: release.stemcell.as_ref().map(StemcellValue::from),
        }
    }
}

/// Stemcell `{os, version}` embedded in an operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StemcellValue {
    #[serde(deserialize_with = "scalar")]
    pub os: String,
    #[serde(deserialize_with = "scalar")]
    pub version: String,
}

impl StemcellValue {
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_mapping() {
            return None;
        }
        serde_yaml_ng::from_value(value.clone()).ok()
    }
}

impl From<&StemcellRef> for StemcellValue {
    fn from(stemcell: &StemcellRef) -> Self {
        StemcellValue {
            os: stemcell.os.clone(),
            version: stemcell.version.clone(),
        }
    }
}

/// Which part of a release a path addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseField {
    Url,
    Version,
    Sha1,
    Stemcell,
}

/// A parsed `/releases/...` operation path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleasePath {
    /// `/releases/-`
    Append,
    /// `/releases/name=<n>`
    Record { name: String },
    /// `/releases/name=<n>/<field>`
    Field { name: String, field: ReleaseField },
}

static RELEASE_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/releases/(?:(?P<append>-)|name=(?P<name>[^/?]+)\??(?:/(?P<field>url|version|sha1|stemcell)\??)?)$")
        .expect("release path pattern")
});

impl ReleasePath {
    pub fn parse(path: &str) -> Option<Self> {
        let captures = RELEASE_PATH.captures(path)?;

        if captures.name("append").is_some() {
            return Some(ReleasePath::Append);
        }

        let name = captures.name("name")?.as_str().to_string();
        let field = match captures.name("field").map(|m| m.as_str()) {
            None => return Some(ReleasePath::Record { name }),
            Some("url") => ReleaseField::Url,
            Some("version") => ReleaseField::Version,
            Some("sha1") => ReleaseField::Sha1,
            Some(_) => ReleaseField::Stemcell,
        };

        Some(ReleasePath::Field { name, field })
    }

    /// The release name, when the path names one
    pub fn name(&self) -> Option<&str> {
        match self {
            ReleasePath::Append => None,
            ReleasePath::Record { name } | ReleasePath::Field { name, .. } => Some(name.as_str()),
        }
    }
}

/// A scalar read as text. Mappings, sequences and null have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Point `slot` at the string `text` unless it already reads as `text`.
///
/// Returns whether the slot was rewritten.
pub(crate) fn set_scalar(slot: &mut Option<Value>, text: &str) -> bool {
    if slot.as_ref().and_then(scalar_text).as_deref() == Some(text) {
        return false;
    }
    *slot = Some(Value::String(text.to_string()));
    true
}

/// [`set_scalar`] for one key of a record
pub(crate) fn set_record_scalar(record: &mut Mapping, key: &str, text: &str) -> bool {
    if record.get(key).and_then(scalar_text).as_deref() == Some(text) {
        return false;
    }
    record.insert(Value::String(key.to_string()), Value::String(text.to_string()));
    true
}

/// Accepts any YAML scalar as a string; unquoted versions decode as numbers
struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(ScalarVisitor)
}

fn optional_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .map(|value| match value {
            Value::Null => Ok(None),
            other => scalar(other).map(Some),
        })
        .transpose()
        .map_err(<D::Error as de::Error>::custom)?
        .flatten())
}
