//! Typed ID definitions for fleet resources.
//!
//! Each ID type has a unique prefix that identifies the resource type.

use crate::{define_id, IdError};

// =============================================================================
// Fleet
// =============================================================================

define_id!(PoolId, "pool");
define_id!(ScalesetId, "vmss");
define_id!(NodeId, "node");

// =============================================================================
// Work
// =============================================================================

define_id!(JobId, "job");
define_id!(TaskId, "task");

// =============================================================================
// Pool Names
// =============================================================================

/// Operator-chosen pool label.
///
/// Pools are looked up by name, tasks reference them by name, and every
/// scaleset carries the name of the pool it backs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PoolName(String);

impl PoolName {
    /// Maximum accepted length.
    pub const MAX_LEN: usize = 64;

    /// Validates and wraps a pool name.
    pub fn parse(s: &str) -> Result<Self, IdError> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.len() > Self::MAX_LEN {
            return Err(IdError::InvalidName {
                name: s.to_string(),
                reason: "longer than 64 characters",
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(IdError::InvalidName {
                name: s.to_string(),
                reason: "only ASCII letters, digits, '-', '_' and '.' are allowed",
            });
        }
        Ok(Self(s.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PoolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PoolName {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PoolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for PoolName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PoolName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
