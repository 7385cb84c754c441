//! Record type: the dynamic field map behind every table row.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One table row: field name → dynamically-typed value.
///
/// Field order is deterministic (BTreeMap) so serialized snapshots and
/// reports are stable across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a parsed JSON object. Non-object values are not
    /// records; callers treat them as read errors.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let fields = object
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        Some(Self { fields })
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Whether the record carries the field at all (a null value counts as
    /// present; observation rules handle null separately).
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The field's comparable token, if it holds a non-null scalar.
    pub fn field_token(&self, name: &str) -> Option<String> {
        self.field(name).and_then(scalar_token)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(name.into(), value)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Merge `patch` into this record, replacing existing fields.
    pub fn apply_patch(&mut self, patch: &Record) {
        for (name, value) in patch.fields() {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Render a scalar JSON value as its comparable token.
///
/// Enum and foreign-key comparisons need equality that holds across the
/// string/number/boolean renderings the snapshot files actually contain:
/// - strings pass through
/// - numbers render in canonical decimal form (`9` and `"9"` compare equal)
/// - booleans render as the `"on"`/`"off"` wire tokens the snapshot format
///   serializes them to
/// - null, arrays, and objects have no token (treated as not observed)
pub fn scalar_token(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(true) => Some("on".to_string()),
        Value::Bool(false) => Some("off".to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
