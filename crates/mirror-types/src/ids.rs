//! Identifier wrapper for mirrored entities.
//!
//! Host entities carry identifiers of varying shape (snowflake strings,
//! integers, UUIDs). Everything that reaches the store is addressed by the
//! textual form, so [`EntityId`] normalizes to a string once at the boundary.

use serde::{Deserialize, Serialize};

/// Unique identifier of a host entity, in the text form used in store keys
/// and notification payloads.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an identifier from its text form.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&EntityId> for EntityId {
    fn from(id: &EntityId) -> Self {
        id.clone()
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_render_as_decimal() {
        let id = EntityId::from(81_384_788_765_712_384_u64);
        assert_eq!(id.as_str(), "81384788765712384");
    }

    #[test]
    fn id_serializes_as_bare_string() {
        let json = serde_json::to_string(&EntityId::from("u1")).ok();
        assert_eq!(json.as_deref(), Some("\"u1\""));
    }
}
