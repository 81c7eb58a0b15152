//! Character identity.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, unique identifier of a character in the host graph.
///
/// Display names are not unique; everything that needs identity (closure
/// membership, record keys) uses this instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates a new entity ID from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the entity ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_display() {
        let id = EntityId::new("lord_aserai_3");
        assert_eq!(id.to_string(), "lord_aserai_3");
        assert_eq!(id.as_str(), "lord_aserai_3");
    }

    #[test]
    fn test_entity_id_serde_transparent() {
        let id = EntityId::new("hero_9");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"hero_9\"");
    }
}
