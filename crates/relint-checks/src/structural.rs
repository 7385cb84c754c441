//! Structural checks: intrinsic per-table key invariants.

use crate::result::{CheckResult, SAMPLE_LIMIT, sorted_sample};
use relint_model::Table;
use serde_json::json;

/// Run the three structural checks for one table.
pub fn check_table(table: &Table) -> Vec<CheckResult> {
    vec![
        check_key_strings(table),
        check_self_id(table),
        check_key_uniqueness(table),
    ]
}

/// All primary keys are non-empty strings.
fn check_key_strings(table: &Table) -> CheckResult {
    let invalid: Vec<String> = table
        .keys()
        .filter(|key| key.trim().is_empty())
        .cloned()
        .collect();
    if invalid.is_empty() {
        return CheckResult::pass("Primary keys are strings");
    }
    let (sample, total) = sorted_sample(invalid, SAMPLE_LIMIT);
    CheckResult::fail(
        "Primary keys are strings",
        json!({"invalidKeys": sample, "invalidCount": total}),
    )
}

/// The table's conventional self-id field, when present on a record, must
/// stringwise-equal that record's key.
fn check_self_id(table: &Table) -> CheckResult {
    let field = self_id_field(table.name());
    let check = format!("{field} matches key");

    if table.is_empty() {
        // No records means no applicable self-id field; flag it without
        // failing the table.
        return CheckResult::info(check, json!("table empty"));
    }

    let mut mismatched = Vec::new();
    let mut observed = 0usize;
    for (key, record) in table.records() {
        if !record.has_field(&field) {
            continue;
        }
        observed += 1;
        if record.field_token(&field).as_deref() != Some(key.as_str()) {
            mismatched.push(key.clone());
        }
    }

    if mismatched.is_empty() {
        return CheckResult::outcome(check, true, Some(json!({"observed": observed})));
    }
    let (sample, total) = sorted_sample(mismatched, SAMPLE_LIMIT);
    CheckResult::fail(
        check,
        json!({"mismatchedKeys": sample, "mismatchCount": total, "observed": observed}),
    )
}

/// Set-size uniqueness over the raw key sequence.
fn check_key_uniqueness(table: &Table) -> CheckResult {
    if table.duplicate_keys().is_empty() {
        return CheckResult::outcome(
            "Primary keys unique",
            true,
            Some(json!({
                "rawKeyCount": table.raw_key_count(),
                "distinctKeyCount": table.len()
            })),
        );
    }
    let (sample, total) = sorted_sample(table.duplicate_keys().iter().cloned(), SAMPLE_LIMIT);
    CheckResult::fail(
        "Primary keys unique",
        json!({
            "duplicateKeys": sample,
            "duplicateCount": total,
            "rawKeyCount": table.raw_key_count(),
            "distinctKeyCount": table.len()
        }),
    )
}

/// Conventional self-id field name: singularized table name + `_id`.
///
/// `users` → `user_id`, `currencies` → `currency_id`,
/// `audit_logs` → `audit_log_id`, `statuses` → `status_id`.
pub fn self_id_field(table_name: &str) -> String {
    let singular = if let Some(stem) = table_name.strip_suffix("ies") {
        format!("{stem}y")
    } else if table_name.ends_with("ses")
        || table_name.ends_with("xes")
        || table_name.ends_with("zes")
        || table_name.ends_with("ches")
        || table_name.ends_with("shes")
    {
        table_name[..table_name.len() - 2].to_string()
    } else if let Some(stem) = table_name.strip_suffix('s') {
        stem.to_string()
    } else {
        table_name.to_string()
    };
    format!("{singular}_id")
}
