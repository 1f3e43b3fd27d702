//! Error types for building host entities.

/// Errors raised when a host value cannot be turned into an [`EntityRecord`].
///
/// [`EntityRecord`]: crate::EntityRecord
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// The value is not a JSON object, so it has no fields to mirror.
    #[error("entity must be an object, got {0}")]
    NotAnObject(&'static str),

    /// The object has no `id` field.
    #[error("entity has no id field")]
    MissingId,

    /// The `id` field is present but is not a string or a number.
    #[error("entity id must be a string or number, got {0}")]
    InvalidId(&'static str),

    /// The host value could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Name of a JSON value's kind, for error messages.
pub(crate) const fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
