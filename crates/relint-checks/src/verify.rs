//! One-pass verification driver.
//!
//! Fixed deterministic order: per-table checks for each table in name
//! order, declared-relationship checks in declaration order, polymorphic
//! checks in declaration order, then assembly. The dataset is an immutable
//! snapshot for the duration of the run.

use crate::enums::check_enum;
use crate::foreign_keys::check_relationship;
use crate::generic::check_generic_fk;
use crate::report::{TableReport, VerificationReport};
use crate::result::{CheckResult, RelationshipCheck};
use crate::structural::check_table;
use relint_model::{Dataset, TableReadError};
use relint_schema::{EnumRegistry, SchemaConfig};
use serde_json::json;
use std::collections::BTreeMap;

/// Run every check over one loaded snapshot and assemble the report.
///
/// `read_errors` are the per-table load failures recorded by the loader;
/// each becomes a failing `read_error` check in that table's section.
pub fn run_verification(
    dataset: &Dataset,
    read_errors: &[TableReadError],
    schema: &SchemaConfig,
    enums: &EnumRegistry,
) -> VerificationReport {
    let mut tables: BTreeMap<String, TableReport> = BTreeMap::new();

    for error in read_errors {
        tables.insert(
            error.table.clone(),
            TableReport {
                table: error.table.clone(),
                row_count: 0,
                checks: vec![CheckResult::fail(
                    "read_error",
                    json!({"message": error.message}),
                )],
            },
        );
    }

    for table in dataset.tables() {
        let mut checks = check_table(table);
        for (column, permitted) in enums.columns_for(table.name()) {
            checks.push(check_enum(table, column, permitted));
        }
        tables.insert(
            table.name().to_string(),
            TableReport {
                table: table.name().to_string(),
                row_count: table.len(),
                checks,
            },
        );
    }

    let mut relationships: Vec<RelationshipCheck> = Vec::new();
    for relationship in &schema.foreign_keys {
        relationships.extend(check_relationship(dataset, relationship));
    }
    for declaration in &schema.generic_foreign_keys {
        relationships.extend(check_generic_fk(dataset, declaration));
    }

    VerificationReport::assemble(
        dataset.snapshot_ref(),
        tables.into_values().collect(),
        relationships,
    )
}
