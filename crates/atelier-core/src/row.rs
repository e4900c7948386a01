//! Rows: keyed field maps with manual-override tracking

use crate::value::FieldValue;
use ahash::{AHashMap, AHashSet};

/// A single row of a table: a mapping from column key to value, plus the
/// set of fields the operator has overridden by hand. Manual fields are
/// never rewritten by recomputation.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    /// Unique row id
    pub id: String,
    /// Field values keyed by column key
    #[cfg_attr(feature = "serde", serde(default))]
    fields: AHashMap<String, FieldValue>,
    /// Keys whose values were entered by hand over a formula result
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "std::collections::HashSet::is_empty")
    )]
    manual: AHashSet<String>,
}

impl Row {
    /// Create an empty row
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            fields: AHashMap::new(),
            manual: AHashSet::new(),
        }
    }

    /// Get a field value
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Get a field as a number, coercing missing/unparseable values to `0.0`
    pub fn number(&self, key: &str) -> f64 {
        self.fields.get(key).map_or(0.0, FieldValue::coerce_number)
    }

    /// Get a field as display text (empty string when missing)
    pub fn text(&self, key: &str) -> String {
        self.fields.get(key).map_or_else(String::new, FieldValue::as_text)
    }

    /// Get a field as a boolean (false when missing or unparseable)
    pub fn flag(&self, key: &str) -> bool {
        self.fields
            .get(key)
            .and_then(FieldValue::as_bool)
            .unwrap_or(false)
    }

    /// Set a field value
    pub fn set<K: Into<String>, V: Into<FieldValue>>(&mut self, key: K, value: V) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style set, for test and import code
    pub fn with<K: Into<String>, V: Into<FieldValue>>(mut self, key: K, value: V) -> Self {
        self.set(key, value);
        self
    }

    /// Remove a field value
    pub fn unset(&mut self, key: &str) -> Option<FieldValue> {
        self.manual.remove(key);
        self.fields.remove(key)
    }

    /// Mark a field as manually overridden
    pub fn mark_manual<K: Into<String>>(&mut self, key: K) {
        self.manual.insert(key.into());
    }

    /// Clear a manual override, letting recomputation own the field again
    pub fn clear_manual(&mut self, key: &str) {
        self.manual.remove(key);
    }

    /// Whether a field is manually overridden
    pub fn is_manual(&self, key: &str) -> bool {
        self.manual.contains(key)
    }

    /// Iterate over (key, value) pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of set fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the row has no set fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
