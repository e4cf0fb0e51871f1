//! User record domain model.
//!
//! # Responsibility
//! - Define the record shape shared by the store, the mirror and the API.
//! - Generate client-side keys for new and duplicated records.
//!
//! # Invariants
//! - A record's `key` is never shadowed by a `key` entry in `fields`.
//! - Generated keys are random UUID v4 strings, never content hashes.
//! - Field values are opaque passthrough data.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Wire name of the identifier field.
pub const KEY_FIELD: &str = "key";

/// Opaque user-defined fields (name, age, address, ...).
pub type RecordFields = Map<String, Value>;

/// Unique identifier of one record within the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordKey(String);

impl RecordKey {
    /// Wraps an existing key, e.g. one returned by the server.
    ///
    /// Returns `None` for empty or whitespace-only input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return None;
        }
        Some(Self(value))
    }

    /// Generates a fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrows the raw key text, e.g. for URL path segments.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RecordKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).ok_or_else(|| serde::de::Error::custom("record key cannot be empty"))
    }
}

/// One user entity: a unique key plus passthrough fields.
///
/// Serialized as a single flat JSON object, e.g.
/// `{"key":"a","name":"Alice","age":31}`.
///
/// Fields stay private so every construction path goes through
/// [`Record::with_key`] or deserialization, neither of which can leave a
/// `key` entry inside `fields`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    key: RecordKey,
    #[serde(flatten)]
    fields: RecordFields,
}

impl Record {
    /// Creates a record with a freshly generated key.
    pub fn new(fields: RecordFields) -> Self {
        Self::with_key(RecordKey::generate(), fields)
    }

    /// Creates a record with a caller-provided key.
    ///
    /// Any `key` entry inside `fields` is dropped.
    pub fn with_key(key: RecordKey, mut fields: RecordFields) -> Self {
        fields.remove(KEY_FIELD);
        Self { key, fields }
    }

    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    /// Passthrough fields, never containing `key`.
    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    /// Returns a copy with identical fields and a new generated key.
    pub fn duplicate(&self) -> Self {
        Self::with_key(RecordKey::generate(), self.fields.clone())
    }

    /// Returns one field value by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Form state for the "add record" entry flow.
///
/// Holds key-less fields until the user submits or cancels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryForm {
    fields: RecordFields,
}

impl EntryForm {
    /// Creates an empty form.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one field. A `key` field is ignored since keys are client-assigned.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if name == KEY_FIELD {
            return;
        }
        self.fields.insert(name, value);
    }

    /// Values entered so far.
    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Builds a keyed record from the current form values.
    pub fn to_record(&self) -> Record {
        Record::new(self.fields.clone())
    }

    /// Drops all entered values.
    pub fn reset(&mut self) {
        self.fields.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{EntryForm, Record, RecordKey};
    use serde_json::json;

    #[test]
    fn record_key_rejects_blank_values() {
        assert!(RecordKey::new("").is_none());
        assert!(RecordKey::new("   ").is_none());
        assert_eq!(RecordKey::new("a").unwrap().as_str(), "a");
    }

    #[test]
    fn with_key_strips_shadowing_key_field() {
        let fields = json!({"key": "spoofed", "name": "Alice"});
        let record = Record::with_key(
            RecordKey::new("a").unwrap(),
            fields.as_object().cloned().unwrap(),
        );
        assert_eq!(record.key().as_str(), "a");
        assert!(record.field("key").is_none());
        assert_eq!(record.field("name"), Some(&json!("Alice")));
    }

    #[test]
    fn deserialized_record_serializes_single_key() {
        let record: Record = serde_json::from_value(json!({"key": "a", "name": "Alice"})).unwrap();
        assert!(record.fields().get("key").is_none());

        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(text.matches("\"key\"").count(), 1);
        assert_eq!(record.duplicate().fields(), record.fields());
    }

    #[test]
    fn entry_form_ignores_key_and_resets() {
        let mut form = EntryForm::new();
        form.set_field("key", json!("x"));
        form.set_field("name", json!("Bob"));
        assert_eq!(form.fields().len(), 1);

        let record = form.to_record();
        assert_eq!(record.field("name"), Some(&json!("Bob")));

        form.reset();
        assert!(form.is_empty());
    }
}
