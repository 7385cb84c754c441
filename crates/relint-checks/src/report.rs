//! Report assembly: the ordered aggregation of one verification run.
//!
//! The polymorphic sub-list and its summary are derived purely from the
//! collected relationship checks — nothing is recomputed against the source
//! tables.

use crate::result::{CheckResult, RelationshipCheck};
use serde::Serialize;

pub const REPORT_SCHEMA: u32 = 1;

/// One table's section: row count plus structural and enum checks.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReport {
    pub table: String,
    pub row_count: usize,
    pub checks: Vec<CheckResult>,
}

/// Pass/fail/info counts over the polymorphic subsection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericFkSummary {
    pub total_checks: usize,
    pub passes: usize,
    pub fails: usize,
    pub info_metrics_count: usize,
}

/// The full report for one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub schema: u32,
    pub snapshot_ref: String,
    pub tables: Vec<TableReport>,
    pub relationships: Vec<RelationshipCheck>,
    pub generic_relationships: Vec<RelationshipCheck>,
    pub generic_fk_summary: GenericFkSummary,
}

impl VerificationReport {
    /// Assemble the report from collected sections, deriving the generic
    /// sub-list and its summary from the flat relationship list.
    pub fn assemble(
        snapshot_ref: String,
        tables: Vec<TableReport>,
        relationships: Vec<RelationshipCheck>,
    ) -> Self {
        let generic_relationships: Vec<RelationshipCheck> = relationships
            .iter()
            .filter(|check| check.is_generic())
            .cloned()
            .collect();

        let mut summary = GenericFkSummary {
            total_checks: generic_relationships.len(),
            passes: 0,
            fails: 0,
            info_metrics_count: 0,
        };
        for check in &generic_relationships {
            if check.result.passed() {
                summary.passes += 1;
            } else if check.result.failed() {
                summary.fails += 1;
            } else {
                summary.info_metrics_count += 1;
            }
        }

        Self {
            schema: REPORT_SCHEMA,
            snapshot_ref,
            tables,
            relationships,
            generic_relationships,
            generic_fk_summary: summary,
        }
    }

    /// Whether any boolean check failed anywhere in the report.
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    pub fn failure_count(&self) -> usize {
        let table_failures: usize = self
            .tables
            .iter()
            .map(|table| {
                table
                    .checks
                    .iter()
                    .filter(|check| check.result.failed())
                    .count()
            })
            .sum();
        let relationship_failures = self
            .relationships
            .iter()
            .filter(|check| check.result.failed())
            .count();
        table_failures + relationship_failures
    }

    pub fn check_count(&self) -> usize {
        let table_checks: usize = self.tables.iter().map(|table| table.checks.len()).sum();
        table_checks + self.relationships.len()
    }
}
