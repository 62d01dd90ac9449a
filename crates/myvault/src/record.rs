//! Record model
//!
//! A record is one secret entry: an insertion-ordered map of field names to
//! JSON values, keyed by its `property` field. Field order is kept exactly
//! as read so that a load/save cycle does not reshuffle anyone's file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the key field every record carries
pub const PROPERTY: &str = "property";

/// A single vault entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// The `property` value, or "" when missing or not a string
    pub fn property(&self) -> &str {
        self.0.get(PROPERTY).and_then(Value::as_str).unwrap_or("")
    }

    /// Case-folded `property`, used for every key comparison
    pub fn property_key(&self) -> String {
        self.property().to_lowercase()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Overlay `update` onto this record. Keys present in both take the
    /// update's value and keep their position; new keys are appended.
    pub fn merge(&mut self, update: &Record) {
        for (key, value) in &update.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}
