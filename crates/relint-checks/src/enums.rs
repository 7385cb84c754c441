//! Enum checks: observed column values against declared permitted tokens.

use crate::result::{CheckResult, SAMPLE_LIMIT};
use relint_model::{Table, scalar_token};
use serde_json::json;
use std::collections::BTreeSet;

/// Verify every non-null observed value of `column` lies in `permitted`.
///
/// Columns absent from a record are not observed. On failure the details
/// carry up to five invalid values and up to five offending record keys, in
/// deterministic order.
pub fn check_enum(table: &Table, column: &str, permitted: &BTreeSet<String>) -> CheckResult {
    let check = format!("{column} values permitted");

    let observed: BTreeSet<String> = table
        .column_values(column)
        .filter_map(|(_, value)| scalar_token(value))
        .collect();
    let invalid: BTreeSet<String> = observed.difference(permitted).cloned().collect();

    if invalid.is_empty() {
        return CheckResult::pass(check);
    }

    let sample_keys: Vec<String> = table
        .column_values(column)
        .filter(|(_, value)| {
            scalar_token(value).is_some_and(|token| invalid.contains(&token))
        })
        .map(|(key, _)| key.clone())
        .take(SAMPLE_LIMIT)
        .collect();
    let invalid_count = invalid.len();
    let invalid_sample: Vec<String> = invalid.into_iter().take(SAMPLE_LIMIT).collect();

    CheckResult::fail(
        check,
        json!({
            "invalidValues": invalid_sample,
            "invalidCount": invalid_count,
            "sampleKeys": sample_keys
        }),
    )
}
