//! Declared foreign-key relationships.

use crate::cardinality::Cardinality;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A table + column pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// One declared parent/child relationship with cardinality and policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRelationship", into = "RawRelationship")]
pub struct Relationship {
    pub parent: ColumnRef,
    pub child: ColumnRef,
    pub cardinality: Cardinality,
    pub mandatory: bool,
    pub min_children: Option<u64>,
    pub max_children: Option<u64>,
    pub link_parent_column: Option<String>,
    pub link_child_column: Option<String>,
}

impl Relationship {
    pub fn new(parent: ColumnRef, child: ColumnRef, cardinality: Cardinality) -> Self {
        Self {
            parent,
            child,
            cardinality,
            mandatory: false,
            min_children: None,
            max_children: None,
            link_parent_column: None,
            link_child_column: None,
        }
    }

    /// Stable label used in report entries.
    pub fn label(&self) -> String {
        format!("{} -> {}", self.parent, self.child)
    }
}

/// The flat declaration shape the config document carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawRelationship {
    parent_table: String,
    parent_column: String,
    child_table: String,
    child_column: String,
    cardinality: Cardinality,
    #[serde(default)]
    mandatory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    min_children: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_children: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link_parent_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    link_child_column: Option<String>,
}

impl From<RawRelationship> for Relationship {
    fn from(raw: RawRelationship) -> Self {
        Self {
            parent: ColumnRef::new(raw.parent_table, raw.parent_column),
            child: ColumnRef::new(raw.child_table, raw.child_column),
            cardinality: raw.cardinality,
            mandatory: raw.mandatory,
            min_children: raw.min_children,
            max_children: raw.max_children,
            link_parent_column: raw.link_parent_column,
            link_child_column: raw.link_child_column,
        }
    }
}

impl From<Relationship> for RawRelationship {
    fn from(relationship: Relationship) -> Self {
        Self {
            parent_table: relationship.parent.table,
            parent_column: relationship.parent.column,
            child_table: relationship.child.table,
            child_column: relationship.child.column,
            cardinality: relationship.cardinality,
            mandatory: relationship.mandatory,
            min_children: relationship.min_children,
            max_children: relationship.max_children,
            link_parent_column: relationship.link_parent_column,
            link_child_column: relationship.link_child_column,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_flat_declaration_into_column_refs() {
        let raw = json!({
            "parent_table": "spaces",
            "parent_column": "space_id",
            "child_table": "pages",
            "child_column": "space_id",
            "cardinality": "1:N",
            "mandatory": true,
            "max_children": 50
        });

        let relationship: Relationship =
            serde_json::from_value(raw).expect("declaration should deserialize");
        assert_eq!(relationship.parent, ColumnRef::new("spaces", "space_id"));
        assert_eq!(relationship.child, ColumnRef::new("pages", "space_id"));
        assert_eq!(relationship.cardinality, Cardinality::OneToMany);
        assert!(relationship.mandatory);
        assert_eq!(relationship.min_children, None);
        assert_eq!(relationship.max_children, Some(50));
        assert_eq!(
            relationship.label(),
            "spaces.space_id -> pages.space_id"
        );
    }
}
