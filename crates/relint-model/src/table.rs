//! Table type: a named, keyed collection of records.

use crate::record::Record;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// A named mapping from primary-key string to record.
///
/// Built from entry sequences with deterministic last-write-wins semantics;
/// duplicate keys are remembered so the structural checker can report them
/// instead of the duplication being silently absorbed.
#[derive(Debug, Clone, Default)]
pub struct Table {
    name: String,
    records: BTreeMap<String, Record>,
    duplicate_keys: Vec<String>,
    raw_key_count: usize,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Build a table from raw `(key, record)` entries.
    pub fn from_entries(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (String, Record)>,
    ) -> Self {
        let mut records = BTreeMap::new();
        let mut duplicate_keys = BTreeSet::new();
        let mut raw_key_count = 0;
        for (key, record) in entries {
            raw_key_count += 1;
            if records.insert(key.clone(), record).is_some() {
                duplicate_keys.insert(key);
            }
        }
        Self {
            name: name.into(),
            records,
            duplicate_keys: duplicate_keys.into_iter().collect(),
            raw_key_count,
        }
    }

    /// Build a table from a parsed JSON object of key → record object.
    ///
    /// Returns `None` when any entry value is not an object (the file does
    /// not have the keyed-collection shape).
    pub fn from_object(
        name: impl Into<String>,
        object: &serde_json::Map<String, Value>,
    ) -> Option<Self> {
        let mut entries = Vec::with_capacity(object.len());
        for (key, value) in object {
            entries.push((key.clone(), Record::from_value(value)?));
        }
        Some(Self::from_entries(name, entries))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Record> {
        self.records.get_mut(key)
    }

    pub fn insert(&mut self, key: String, record: Record) -> Option<Record> {
        self.raw_key_count += 1;
        self.records.insert(key, record)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// Primary keys in deterministic order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.records.keys()
    }

    /// Records in deterministic key order.
    pub fn records(&self) -> impl Iterator<Item = (&String, &Record)> {
        self.records.iter()
    }

    /// Keys that appeared more than once in the source entries.
    pub fn duplicate_keys(&self) -> &[String] {
        &self.duplicate_keys
    }

    /// Number of source entries before duplicate keys collapsed.
    pub fn raw_key_count(&self) -> usize {
        self.raw_key_count
    }

    /// Whether any record carries the column.
    ///
    /// An empty table vacuously has every column: zero records define no
    /// fields, and declared columns on empty tables must not read as schema
    /// mismatches.
    pub fn has_column(&self, column: &str) -> bool {
        self.is_empty() || self.records.values().any(|record| record.has_field(column))
    }

    /// Union of field names across all records.
    pub fn columns(&self) -> BTreeSet<String> {
        self.records
            .values()
            .flat_map(|record| record.field_names().cloned())
            .collect()
    }

    /// `(key, value)` pairs for records that carry the column, including
    /// null values. Observation rules decide what null means per check.
    pub fn column_values<'a>(
        &'a self,
        column: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Value)> {
        self.records
            .iter()
            .filter_map(move |(key, record)| record.field(column).map(|value| (key, value)))
    }
}
