//! Finalized structured records

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name that carries the originating document identifier
pub const DEFAULT_SOURCE_ID_FIELD: &str = "source_id";

/// One structured output, a JSON object of named fields.
///
/// Field order is preserved so that tabular exports list columns in the
/// order the model produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap a parsed object and tag it with its source identifier.
    ///
    /// An existing value under `field` is overwritten.
    pub fn finalize(mut fields: Map<String, Value>, field: &str, source_id: &str) -> Self {
        fields.insert(field.to_string(), Value::String(source_id.to_string()));
        Self(fields)
    }

    /// Source identifier stored under `field`, if it is a string
    pub fn source_id(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set a field value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the record has no fields
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
