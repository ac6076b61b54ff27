//! Normalized payload produced by a successful schema run.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

/// Coerced value for a single schema field.
#[derive(Debug, Clone, PartialEq)]
pub enum NormalizedValue {
    /// Trimmed (or raw, when the rule says so) string.
    String(String),
    /// JSON number, kept as-is so integers stay integers.
    Number(Number),
    /// Boolean flag.
    Bool(bool),
    /// Timestamp coerced from a string or epoch milliseconds.
    Date(DateTime<Utc>),
    /// Nested object normalized against a nested schema.
    Object(NormalizedPayload),
}

impl NormalizedValue {
    /// Render the value as JSON. Dates become RFC 3339 strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(value) => Value::String(value.clone()),
            Self::Number(value) => Value::Number(value.clone()),
            Self::Bool(value) => Value::Bool(*value),
            Self::Date(value) => {
                Value::String(value.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            Self::Object(value) => value.to_json(),
        }
    }
}

/// Request body after validation and coercion.
///
/// Only keys declared by the schema survive, in declaration order; optional
/// keys that were absent or `null` are omitted.
///
/// # Examples
/// ```
/// use userdesk::domain::validation::{NormalizedPayload, NormalizedValue};
///
/// let mut payload = NormalizedPayload::default();
/// payload.insert("name", NormalizedValue::String("Ada".into()));
/// assert_eq!(payload.str("name"), Some("Ada"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedPayload {
    fields: Vec<(String, NormalizedValue)>,
}

impl NormalizedPayload {
    /// Store a coerced field value. Re-inserting a key replaces its value in
    /// place.
    pub fn insert(&mut self, key: impl Into<String>, value: NormalizedValue) {
        let key = key.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up a field.
    pub fn get(&self, key: &str) -> Option<&NormalizedValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Whether the payload carries `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// String field accessor.
    pub fn str(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            Some(NormalizedValue::String(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Integer field accessor.
    pub fn i64(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(NormalizedValue::Number(value)) => value.as_i64(),
            _ => None,
        }
    }

    /// Date field accessor.
    pub fn date(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key) {
            Some(NormalizedValue::Date(value)) => Some(*value),
            _ => None,
        }
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether no field survived normalization.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate fields in schema declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NormalizedValue)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Render the payload as a JSON object.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }

    /// Deserialize the payload into a typed structure.
    ///
    /// # Errors
    /// Returns the `serde_json` error when the payload does not fit `T`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.to_json())
    }
}
