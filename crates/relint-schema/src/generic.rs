//! Polymorphic (generic) foreign-key declarations.
//!
//! The target table of the foreign key is selected per row by a sibling
//! type column; each possible type value maps to a parent table/column and
//! optionally to the set of action values allowed for rows of that type.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where one type value points, plus optional per-type policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericTarget {
    pub parent_table: String,
    pub parent_column: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_actions: Option<BTreeSet<String>>,
}

/// One polymorphic foreign-key declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericForeignKey {
    pub child_table: String,
    pub type_column: String,
    pub id_column: String,
    /// type value → target, in deterministic order.
    pub mapping: BTreeMap<String, GenericTarget>,
}

impl GenericForeignKey {
    /// Stable label used in report entries.
    pub fn label(&self) -> String {
        format!(
            "{}.{}/{}",
            self.child_table, self.type_column, self.id_column
        )
    }
}
