//! Generic key-value view of a host entity.
//!
//! The host owns its entities and hands the mirror a snapshot of their
//! fields. Field sets are arbitrary (nested structures included); the
//! sanitizer in `mirror-db` decides what is storable. The only shape
//! requirement enforced here is a scalar `id`.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{TypesError, value_kind};
use crate::ids::EntityId;

/// A host entity as a field map with a guaranteed identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityRecord {
    id: EntityId,
    fields: Map<String, Value>,
}

impl EntityRecord {
    /// Build a record from any serializable host value.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::Serialization`] if the value cannot be
    /// serialized, [`TypesError::NotAnObject`] if it does not serialize to
    /// an object, and [`TypesError::MissingId`] / [`TypesError::InvalidId`]
    /// if it lacks a usable `id`.
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, TypesError> {
        Self::try_from(serde_json::to_value(value)?)
    }

    /// Identifier of the entity.
    pub const fn id(&self) -> &EntityId {
        &self.id
    }

    /// All fields supplied by the host, including `id`.
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Look up a single field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

impl TryFrom<Map<String, Value>> for EntityRecord {
    type Error = TypesError;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match fields.get("id") {
            None | Some(Value::Null) => return Err(TypesError::MissingId),
            Some(Value::String(s)) => EntityId::new(s.as_str()),
            Some(Value::Number(n)) => EntityId::new(n.to_string()),
            Some(other) => return Err(TypesError::InvalidId(value_kind(other))),
        };
        Ok(Self { id, fields })
    }
}

impl TryFrom<Value> for EntityRecord {
    type Error = TypesError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Self::try_from(fields),
            other => Err(TypesError::NotAnObject(value_kind(&other))),
        }
    }
}

impl From<&EntityRecord> for EntityId {
    fn from(record: &EntityRecord) -> Self {
        record.id.clone()
    }
}
