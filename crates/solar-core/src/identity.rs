//! Identity types for entities and definitions

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for an entity instance at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Create a new entity ID
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Key used when an id indexes a component map
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = Error;

    /// Accepts both the display form (`entity:7`) and the bare map key (`7`)
    fn from_str(s: &str) -> Result<Self> {
        let raw = s.strip_prefix("entity:").unwrap_or(s);
        raw.parse::<u64>()
            .map(EntityId)
            .map_err(|_| Error::InvalidEntityId(s.to_string()))
    }
}

/// Identifier for a definition (entity type, behavior name, etc.)
///
/// Uses a string-based ID so it reads naturally in JSON and RON files
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefId(pub String);

impl DefId {
    /// Create a new definition ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DefId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for DefId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<str> for DefId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id() {
        let id = EntityId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "entity:42");
        assert_eq!(id.key(), "42");
    }

    #[test]
    fn test_entity_id_parse() {
        assert_eq!("entity:7".parse::<EntityId>(), Ok(EntityId(7)));
        assert_eq!("7".parse::<EntityId>(), Ok(EntityId(7)));
        assert!("ship".parse::<EntityId>().is_err());
    }

    #[test]
    fn test_def_id() {
        let id = DefId::new("fighter");
        assert_eq!(id.as_str(), "fighter");
        assert_eq!(format!("{}", id), "fighter");
        assert!(id == *"fighter");
    }
}
