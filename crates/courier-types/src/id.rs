//! Correlation identifiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier shared by a live session and its durable conversation.
///
/// The same value addresses the workflow actor, keys pub/sub routing
/// metadata, and names the live session in the registry. It is opaque:
/// ids minted elsewhere are accepted verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random identifier for a new session.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty (never valid for routing).
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        let a = CorrelationId::generate();
        let b = CorrelationId::generate();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = CorrelationId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");

        let parsed: CorrelationId = serde_json::from_str("\"abc123\"").unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_blank_id_is_empty() {
        assert!(CorrelationId::new("").is_empty());
        assert!(CorrelationId::new("   ").is_empty());
        assert!(!CorrelationId::new("x").is_empty());
    }
}
