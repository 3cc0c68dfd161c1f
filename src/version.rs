//! Ordinal comparison of dot-separated numeric versions
//!
//! Versions have arbitrary arity. A shorter version compares as if padded
//! with trailing zeros, so `621` and `621.0` are equal.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{Result, SyncError};

/// A parsed dot-separated version such as `621.125`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    components: Vec<u64>,
}

impl Version {
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for Version {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || SyncError::InvalidVersion {
            version: s.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let components = trimmed
            .split('.')
            .map(|part| {
                // u64::from_str would also take a leading '+'
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(invalid());
                }
                part.parse::<u64>().map_err(|_| invalid())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Version { components })
    }
}

/// Result of comparing two versions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparison {
    pub ordering: Ordering,
    /// Index of the first component that differs, `None` when equal
    pub first_difference: Option<usize>,
}

impl Comparison {
    /// -1, 0 or +1
    pub fn sign(&self) -> i32 {
        match self.ordering {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
}

/// Magnitude of a forward version change.
///
/// A change in the first component is `Major`, anything later is `Minor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpType {
    Major,
    Minor,
}

impl BumpType {
    fn from_index(index: usize) -> Self {
        if index == 0 {
            BumpType::Major
        } else {
            BumpType::Minor
        }
    }
}

impl fmt::Display for BumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BumpType::Major => write!(f, "major"),
            BumpType::Minor => write!(f, "minor"),
        }
    }
}

/// Compare `left` against `right` component by component
pub fn compare(left: &Version, right: &Version) -> Comparison {
    let arity = left.components.len().max(right.components.len());

    for index in 0..arity {
        match left.component(index).cmp(&right.component(index)) {
            Ordering::Equal => continue,
            ordering => {
                return Comparison {
                    ordering,
                    first_difference: Some(index),
                }
            }
        }
    }

    Comparison {
        ordering: Ordering::Equal,
        first_difference: None,
    }
}

/// Parse and compare two version strings
pub fn compare_str(left: &str, right: &str) -> Result<Comparison> {
    Ok(compare(&left.parse()?, &right.parse()?))
}

/// Check that moving from `old` to `new` does not go backwards.
///
/// Returns the bump type for a forward move and `None` for equal versions.
pub fn check_forward_bump(old: &str, new: &str) -> Result<Option<BumpType>> {
    let comparison = compare_str(new, old)?;

    match (comparison.ordering, comparison.first_difference) {
        (Ordering::Less, _) => Err(SyncError::NonForwardBump {
            from: old.trim().to_string(),
            to: new.trim().to_string(),
        }),
        (Ordering::Greater, Some(index)) => Ok(Some(BumpType::from_index(index))),
        _ => Ok(None),
    }
}
