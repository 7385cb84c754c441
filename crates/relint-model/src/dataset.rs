//! Dataset loading: a directory of JSON table files, or an in-memory value.
//!
//! One file per table, each a single JSON object mapping primary-key string
//! to record object. A file that cannot be read or parsed into that shape is
//! skipped with a recorded read-error outcome; the load continues so one bad
//! table never hides the state of the others.

use crate::record::Record;
use crate::table::Table;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// The canonical in-memory snapshot: table name → table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    tables: BTreeMap<String, Table>,
}

/// A per-table load failure, recorded instead of thrown.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableReadError {
    pub table: String,
    pub message: String,
}

/// Errors that abort a load outright (nothing meaningful to check).
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("tables directory unreadable: {path}: {message}")]
    Directory { path: String, message: String },

    #[error("in-memory source must be an object of table name → keyed collection")]
    SourceShape,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tables(tables: impl IntoIterator<Item = Table>) -> Self {
        Self {
            tables: tables
                .into_iter()
                .map(|table| (table.name().to_string(), table))
                .collect(),
        }
    }

    /// Load every `*.json` file in `dir` as one table named after the file
    /// stem. Unparseable files become `TableReadError` outcomes.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<(Self, Vec<TableReadError>), LoadError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| LoadError::Directory {
            path: dir.display().to_string(),
            message: e.to_string(),
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LoadError::Directory {
                path: dir.display().to_string(),
                message: e.to_string(),
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push((stem.to_string(), path));
            }
        }
        names.sort();

        let mut dataset = Self::new();
        let mut errors = Vec::new();
        for (name, path) in names {
            match load_table_file(&name, &path) {
                Ok(table) => {
                    dataset.tables.insert(name, table);
                }
                Err(message) => errors.push(TableReadError {
                    table: name,
                    message,
                }),
            }
        }
        Ok((dataset, errors))
    }

    /// Build a dataset from an in-memory JSON value shaped
    /// `{table: {key: record}}`. Tables with the wrong shape are recorded
    /// as read errors, mirroring the directory loader.
    pub fn from_value(source: &Value) -> Result<(Self, Vec<TableReadError>), LoadError> {
        let root = source.as_object().ok_or(LoadError::SourceShape)?;

        let mut dataset = Self::new();
        let mut errors = Vec::new();
        for (name, value) in root {
            match value
                .as_object()
                .and_then(|object| Table::from_object(name.clone(), object))
            {
                Some(table) => {
                    dataset.tables.insert(name.clone(), table);
                }
                None => errors.push(TableReadError {
                    table: name.clone(),
                    message: "not a keyed collection of record objects".to_string(),
                }),
            }
        }
        Ok((dataset, errors))
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.get_mut(name)
    }

    pub fn insert(&mut self, table: Table) -> Option<Table> {
        self.tables.insert(table.name().to_string(), table)
    }

    /// Ensure a table exists, creating an empty one if needed.
    pub fn table_entry(&mut self, name: &str) -> &mut Table {
        self.tables
            .entry(name.to_string())
            .or_insert_with(|| Table::new(name))
    }

    /// Tables in deterministic name order.
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Content digest of the snapshot, for report provenance.
    ///
    /// Canonical form is the deterministic `{table: {key: record}}` JSON
    /// rendering (all maps are ordered), so identical snapshots always hash
    /// to the same `ds1_` ref.
    pub fn snapshot_ref(&self) -> String {
        let mut canonical: BTreeMap<&str, BTreeMap<&String, &Record>> = BTreeMap::new();
        for table in self.tables.values() {
            canonical.insert(table.name(), table.records().collect());
        }
        let rendered = serde_json::to_string(&canonical)
            .expect("canonical snapshot rendering should serialize");
        let mut hasher = Sha256::new();
        hasher.update(rendered.as_bytes());
        format!("ds1_{:x}", hasher.finalize())
    }
}

fn load_table_file(name: &str, path: &Path) -> Result<Table, String> {
    let bytes = fs::read(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| format!("{}: parse error: {e}", path.display()))?;
    value
        .as_object()
        .and_then(|object| Table::from_object(name, object))
        .ok_or_else(|| {
            format!(
                "{}: not a keyed collection of record objects",
                path.display()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "relint-dataset-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        path
    }

    #[test]
    fn load_dir_records_read_errors_and_continues() {
        let dir = temp_dir("read-errors");
        fs::write(dir.join("spaces.json"), r#"{"1": {"space_id": "1"}}"#)
            .expect("spaces fixture should write");
        fs::write(dir.join("pages.json"), "{ not json").expect("pages fixture should write");
        fs::write(dir.join("notes.txt"), "ignored").expect("notes fixture should write");

        let (dataset, errors) = Dataset::load_dir(&dir).expect("load should succeed");
        assert_eq!(dataset.len(), 1);
        assert!(dataset.table("spaces").is_some());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].table, "pages");
        assert!(errors[0].message.contains("parse error"));

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn load_dir_fails_on_missing_directory() {
        let missing = std::env::temp_dir().join("relint-no-such-dir-ever");
        let result = Dataset::load_dir(&missing);
        assert!(matches!(result, Err(LoadError::Directory { .. })));
    }

    #[test]
    fn from_value_keeps_empty_tables_present() {
        let source = json!({
            "spaces": {"1": {"space_id": "1"}},
            "pages": {}
        });
        let (dataset, errors) = Dataset::from_value(&source).expect("load should succeed");
        assert!(errors.is_empty());
        let pages = dataset.table("pages").expect("empty table must be present");
        assert!(pages.is_empty());
    }

    #[test]
    fn snapshot_ref_is_stable_and_content_sensitive() {
        let source = json!({"spaces": {"1": {"space_id": "1"}}});
        let (first, _) = Dataset::from_value(&source).expect("load should succeed");
        let (second, _) = Dataset::from_value(&source).expect("load should succeed");
        assert_eq!(first.snapshot_ref(), second.snapshot_ref());
        assert!(first.snapshot_ref().starts_with("ds1_"));

        let changed = json!({"spaces": {"1": {"space_id": "2"}}});
        let (third, _) = Dataset::from_value(&changed).expect("load should succeed");
        assert_ne!(first.snapshot_ref(), third.snapshot_ref());
    }
}
