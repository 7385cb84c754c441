//! Permitted enum values per table column.
//!
//! Declared values normalize to string tokens on load: booleans map to the
//! `"on"`/`"off"` tokens the snapshot format serializes them to, numbers to
//! their canonical decimal rendering. Normalization is per column — a bare
//! value list keeps the compatible default (normalization on); the detailed
//! form can opt out.

use crate::config::SchemaConfigError;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// table name → column name → permitted tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumRegistry {
    columns: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

/// One column's declaration as it appears in the config document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EnumDeclaration {
    Plain(Vec<Value>),
    Detailed {
        values: Vec<Value>,
        #[serde(default = "default_normalize_booleans")]
        normalize_booleans: bool,
    },
}

fn default_normalize_booleans() -> bool {
    true
}

/// The raw document shape: table → column → declaration.
pub type EnumDocument = BTreeMap<String, BTreeMap<String, EnumDeclaration>>;

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize a parsed declaration document into the registry.
    pub fn from_document(document: EnumDocument) -> Result<Self, SchemaConfigError> {
        let mut columns: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();
        for (table, declarations) in document {
            for (column, declaration) in declarations {
                let (values, normalize_booleans) = match declaration {
                    EnumDeclaration::Plain(values) => (values, true),
                    EnumDeclaration::Detailed {
                        values,
                        normalize_booleans,
                    } => (values, normalize_booleans),
                };

                let mut permitted = BTreeSet::new();
                for value in values {
                    let token = declared_token(&value, normalize_booleans).ok_or_else(|| {
                        SchemaConfigError::InvalidEnumValue {
                            table: table.clone(),
                            column: column.clone(),
                            value: value.to_string(),
                        }
                    })?;
                    permitted.insert(token);
                }
                columns
                    .entry(table.clone())
                    .or_default()
                    .insert(column, permitted);
            }
        }
        Ok(Self { columns })
    }

    pub fn permitted(&self, table: &str, column: &str) -> Option<&BTreeSet<String>> {
        self.columns.get(table)?.get(column)
    }

    /// Declared columns for one table, in deterministic order.
    pub fn columns_for(
        &self,
        table: &str,
    ) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.columns.get(table).into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.values().map(|columns| columns.len()).sum()
    }
}

fn declared_token(value: &Value, normalize_booleans: bool) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(if normalize_booleans {
            if *flag { "on" } else { "off" }.to_string()
        } else {
            flag.to_string()
        }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry(document: Value) -> EnumRegistry {
        let document: EnumDocument =
            serde_json::from_value(document).expect("document should deserialize");
        EnumRegistry::from_document(document).expect("registry should build")
    }

    #[test]
    fn plain_declarations_normalize_booleans() {
        let registry = registry(json!({
            "pages": {
                "state": ["draft", "published", "archived"],
                "notifications_enabled": [true, false]
            }
        }));

        let permitted = registry
            .permitted("pages", "notifications_enabled")
            .expect("column should be declared");
        assert!(permitted.contains("on"));
        assert!(permitted.contains("off"));
        assert!(!permitted.contains("true"));
    }

    #[test]
    fn detailed_declarations_can_opt_out_of_normalization() {
        let registry = registry(json!({
            "flags": {
                "enabled": {"values": [true, false], "normalize_booleans": false}
            }
        }));

        let permitted = registry
            .permitted("flags", "enabled")
            .expect("column should be declared");
        assert!(permitted.contains("true"));
        assert!(!permitted.contains("on"));
    }

    #[test]
    fn numeric_declarations_render_canonically() {
        let registry = registry(json!({"steps": {"order": [1, 2, 3]}}));
        let permitted = registry
            .permitted("steps", "order")
            .expect("column should be declared");
        assert_eq!(
            permitted.iter().cloned().collect::<Vec<_>>(),
            vec!["1".to_string(), "2".to_string(), "3".to_string()]
        );
    }

    #[test]
    fn non_scalar_declarations_are_rejected() {
        let document: EnumDocument =
            serde_json::from_value(json!({"pages": {"state": [["nested"]]}}))
                .expect("document should deserialize");
        let err = EnumRegistry::from_document(document).expect_err("nested value must be rejected");
        assert!(matches!(err, SchemaConfigError::InvalidEnumValue { .. }));
    }
}
