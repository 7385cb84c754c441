//! Schema-config documents: the `foreign_keys` and `generic_foreign_keys`
//! sections, plus the enum declaration document.
//!
//! Both load from JSON or TOML, chosen by file extension. A missing or
//! unparseable schema config is fatal — with no declarations there is
//! nothing meaningful to check — so loading happens before any checks run.

use crate::enums::{EnumDocument, EnumRegistry};
use crate::generic::GenericForeignKey;
use crate::relationship::Relationship;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Errors from loading declaration documents.
#[derive(Debug, thiserror::Error)]
pub enum SchemaConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("unsupported config format: {path} (expected .json or .toml)")]
    UnsupportedFormat { path: String },

    #[error("invalid enum value for {table}.{column}: {value} (must be a scalar literal)")]
    InvalidEnumValue {
        table: String,
        column: String,
        value: String,
    },
}

/// The relationship-declaration document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub foreign_keys: Vec<Relationship>,
    #[serde(default)]
    pub generic_foreign_keys: Vec<GenericForeignKey>,
}

impl SchemaConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaConfigError> {
        load_document(path.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.foreign_keys.is_empty() && self.generic_foreign_keys.is_empty()
    }
}

impl EnumRegistry {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SchemaConfigError> {
        let document: EnumDocument = load_document(path.as_ref())?;
        Self::from_document(document)
    }
}

fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T, SchemaConfigError> {
    let text = fs::read_to_string(path).map_err(|e| SchemaConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&text).map_err(|e| SchemaConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
        Some("toml") => toml::from_str(&text).map_err(|e| SchemaConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
        _ => Err(SchemaConfigError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}
