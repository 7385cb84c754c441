//! Record-store surface over a dataset snapshot.
//!
//! This is the interface the tool layer consumes: point reads, field
//! lookups, and the mutation trio (create / update / soft-delete).
//! Verification only ever reads through it.

use crate::dataset::Dataset;
use crate::record::{Record, scalar_token};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;

/// Errors raised by store mutations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("record not found: {table}/{id}")]
    RecordNotFound { table: String, id: String },

    #[error("record already exists: {table}/{id}")]
    DuplicateId { table: String, id: String },
}

/// Explicit id allocation state: table name → next integer id.
///
/// Passed into the store rather than read from process-wide counters, so
/// allocation is deterministic and per-run.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: BTreeMap<String, u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed every table's counter one past its highest numeric key.
    pub fn seeded_from(dataset: &Dataset) -> Self {
        let mut next = BTreeMap::new();
        for table in dataset.tables() {
            let highest = table
                .keys()
                .filter_map(|key| key.parse::<u64>().ok())
                .max()
                .unwrap_or(0);
            next.insert(table.name().to_string(), highest + 1);
        }
        Self { next }
    }

    pub fn next_id(&mut self, table: &str) -> String {
        let counter = self.next.entry(table.to_string()).or_insert(1);
        let id = *counter;
        *counter += 1;
        id.to_string()
    }

    pub fn peek(&self, table: &str) -> u64 {
        self.next.get(table).copied().unwrap_or(1)
    }
}

/// Read/write access to one dataset snapshot.
#[derive(Debug, Clone)]
pub struct DataStore {
    dataset: Dataset,
    ids: IdAllocator,
    fixed_now: Option<DateTime<Utc>>,
}

impl DataStore {
    pub fn new(dataset: Dataset) -> Self {
        let ids = IdAllocator::seeded_from(&dataset);
        Self {
            dataset,
            ids,
            fixed_now: None,
        }
    }

    /// Pin `now()` for deterministic tests.
    pub fn with_fixed_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    pub fn next_id(&mut self, table: &str) -> String {
        self.ids.next_id(table)
    }

    pub fn get(&self, table: &str, id: &str) -> Option<&Record> {
        self.dataset.table(table)?.get(id)
    }

    /// First record (in key order) whose field compares token-equal to
    /// `value`.
    pub fn find_by_field(&self, table: &str, field: &str, value: &Value) -> Option<&Record> {
        self.find_all_by_field(table, field, value).into_iter().next()
    }

    /// Every record whose field compares token-equal to `value`, in key
    /// order.
    pub fn find_all_by_field(&self, table: &str, field: &str, value: &Value) -> Vec<&Record> {
        let Some(wanted) = scalar_token(value) else {
            return Vec::new();
        };
        let Some(table) = self.dataset.table(table) else {
            return Vec::new();
        };
        table
            .records()
            .filter(|(_, record)| record.field_token(field).as_deref() == Some(wanted.as_str()))
            .map(|(_, record)| record)
            .collect()
    }

    /// Insert a new record. The table is created if absent.
    pub fn create(&mut self, table: &str, id: &str, record: Record) -> Result<(), StoreError> {
        let entry = self.dataset.table_entry(table);
        if entry.contains_key(id) {
            return Err(StoreError::DuplicateId {
                table: table.to_string(),
                id: id.to_string(),
            });
        }
        entry.insert(id.to_string(), record);
        Ok(())
    }

    /// Merge `patch` into an existing record.
    pub fn update(&mut self, table: &str, id: &str, patch: &Record) -> Result<(), StoreError> {
        let record = self
            .dataset
            .table_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?
            .get_mut(id)
            .ok_or_else(|| StoreError::RecordNotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;
        record.apply_patch(patch);
        Ok(())
    }

    /// Soft-delete: stamp `deleted_at` rather than removing the record.
    pub fn delete(&mut self, table: &str, id: &str) -> Result<(), StoreError> {
        let stamp = self.now().to_rfc3339();
        let record = self
            .dataset
            .table_mut(table)
            .ok_or_else(|| StoreError::TableNotFound(table.to_string()))?
            .get_mut(id)
            .ok_or_else(|| StoreError::RecordNotFound {
                table: table.to_string(),
                id: id.to_string(),
            })?;
        record.insert("deleted_at", Value::String(stamp));
        Ok(())
    }
}
