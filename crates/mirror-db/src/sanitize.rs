//! Field sanitization.
//!
//! Only flat scalar data is stored. [`clean`] keeps the fields whose value is
//! a string, number or boolean and silently drops everything else: nested
//! objects, arrays and `null`. Absent fields never appear in the input map,
//! so they are dropped by construction. The transform is pure and never
//! fails.

use std::collections::BTreeMap;

use mirror_types::EntityRecord;
use serde_json::{Map, Number, Value};

/// A storable field value.
///
/// On the wire every scalar is a string: text as-is, booleans as `true` or
/// `false`, integers in decimal. Floats with no fractional part below `1e21`
/// are written like integers (`1.0` becomes `1`); other floats use the
/// shortest round-trip form from `serde_json` (`0.5`, `1e21`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// A string.
    Text(String),
    /// An integer or floating point number, kept in its JSON form.
    Number(Number),
    /// A boolean.
    Bool(bool),
}

impl Scalar {
    /// Classify a JSON value. Returns `None` for anything that is not stored.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Number(n) => Some(Self::Number(n.clone())),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Wire form written into the hash field.
    pub fn encode(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => encode_number(n),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Largest magnitude at which integral floats are still written without an
/// exponent.
const INTEGRAL_FLOAT_LIMIT: f64 = 1e21;

fn encode_number(n: &Number) -> String {
    if let Some(f) = n.as_f64().filter(|_| n.is_f64()) {
        let integral = f.trunc().to_bits() == f.to_bits();
        if integral && f.abs() < INTEGRAL_FLOAT_LIMIT {
            let rendered = format!("{f:.0}");
            // -0.0 is written as 0.
            return if rendered == "-0" { "0".to_owned() } else { rendered };
        }
    }
    n.to_string()
}

/// A sanitized entity: field name to scalar value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(BTreeMap<String, Scalar>);

impl Record {
    /// Number of stored fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no field survived sanitization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a field.
    pub fn get(&self, field: &str) -> Option<&Scalar> {
        self.0.get(field)
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Scalar)> {
        self.0.iter()
    }

    /// Field map as it is written to the store.
    pub fn encode(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(field, value)| (field.clone(), value.encode()))
            .collect()
    }
}

/// Keep only the scalar, non-null fields of `fields`.
pub fn clean(fields: &Map<String, Value>) -> Record {
    Record(
        fields
            .iter()
            .filter_map(|(field, value)| Scalar::from_value(value).map(|s| (field.clone(), s)))
            .collect(),
    )
}

/// [`clean`] applied to a host entity.
pub fn clean_entity(entity: &EntityRecord) -> Record {
    clean(entity.fields())
}
