//! Polymorphic foreign-key checks.
//!
//! The target table of the foreign key is chosen per row by a sibling type
//! column. Coverage of the type→parent mapping is checked first; each
//! mapped-and-observed type then gets its own existence, load, policy, and
//! chronology checks. A missing parent table fails only that type's checks.

use crate::foreign_keys::round2;
use crate::result::{RelationshipCheck, SAMPLE_LIMIT, TYPE_SAMPLE_LIMIT, sorted_sample};
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use relint_model::{Dataset, Record, Table, scalar_token};
use relint_schema::GenericForeignKey;
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

fn created_at_column_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?:[a-z0-9]+_)*created_at$").expect("created-at column regex must compile")
    })
}

/// Run every polymorphic check for one declaration. All results carry the
/// `generic` kind tag.
pub fn check_generic_fk(
    dataset: &Dataset,
    declaration: &GenericForeignKey,
) -> Vec<RelationshipCheck> {
    let label = declaration.label();

    let Some(child_table) = dataset.table(&declaration.child_table) else {
        return vec![
            RelationshipCheck::fail(
                label,
                "Tables present",
                json!({"missingTables": [declaration.child_table]}),
            )
            .generic(),
        ];
    };

    let mut checks = Vec::new();

    let observed_types: BTreeSet<String> = child_table
        .column_values(&declaration.type_column)
        .filter_map(|(_, value)| scalar_token(value))
        .collect();
    let mapped_types: BTreeSet<String> = declaration.mapping.keys().cloned().collect();

    let unmapped: Vec<String> = observed_types
        .difference(&mapped_types)
        .cloned()
        .collect();
    if unmapped.is_empty() {
        checks.push(RelationshipCheck::pass(&label, "All type values are mapped"));
    } else {
        let (sample, total) = sorted_sample(unmapped, TYPE_SAMPLE_LIMIT);
        checks.push(RelationshipCheck::fail(
            &label,
            "All type values are mapped",
            json!({"unmappedTypes": sample, "unmappedCount": total}),
        ));
    }

    let (stale_sample, stale_count) = sorted_sample(
        mapped_types.difference(&observed_types).cloned(),
        TYPE_SAMPLE_LIMIT,
    );
    checks.push(RelationshipCheck::info(
        &label,
        "Stale mappings",
        json!({"staleTypes": stale_sample, "staleCount": stale_count}),
    ));

    for type_value in observed_types.intersection(&mapped_types) {
        let target = &declaration.mapping[type_value];
        check_type(
            &mut checks,
            &label,
            dataset,
            child_table,
            declaration,
            type_value,
            target,
        );
    }

    check_user_link(&mut checks, &label, dataset, child_table);

    checks.into_iter().map(RelationshipCheck::generic).collect()
}

fn check_type(
    checks: &mut Vec<RelationshipCheck>,
    label: &str,
    dataset: &Dataset,
    child_table: &Table,
    declaration: &GenericForeignKey,
    type_value: &str,
    target: &relint_schema::GenericTarget,
) {
    let parent_table = dataset.table(&target.parent_table);
    let parent_ok = parent_table
        .map(|table| table.has_column(&target.parent_column))
        .unwrap_or(false);
    let Some(parent_table) = parent_table.filter(|_| parent_ok) else {
        checks.push(RelationshipCheck::fail(
            label,
            format!("{type_value}: parent present"),
            json!({
                "parentTable": target.parent_table,
                "parentColumn": target.parent_column
            }),
        ));
        return;
    };

    let rows: Vec<(&String, &Record)> = child_table
        .records()
        .filter(|(_, record)| {
            record.field_token(&declaration.type_column).as_deref() == Some(type_value)
        })
        .collect();
    let ids: Vec<String> = rows
        .iter()
        .filter_map(|(_, record)| record.field_token(&declaration.id_column))
        .collect();

    let parent_tokens: BTreeSet<String> = parent_table
        .column_values(&target.parent_column)
        .filter_map(|(_, value)| scalar_token(value))
        .collect();

    let id_set: BTreeSet<String> = ids.iter().cloned().collect();
    let missing: Vec<String> = id_set.difference(&parent_tokens).cloned().collect();
    let (missing_sample, missing_count) = sorted_sample(missing, SAMPLE_LIMIT);
    checks.push(RelationshipCheck::outcome(
        label,
        format!("{type_value}: all ids exist"),
        missing_count == 0,
        Some(json!({"missingIds": missing_sample, "missingCount": missing_count})),
    ));

    checks.push(RelationshipCheck::info(
        label,
        format!("{type_value}: reference load"),
        reference_load(&ids),
    ));

    if let Some(allowed) = &target.allowed_actions
        && child_table.columns().contains("action")
    {
        let mut invalid_values = Vec::new();
        let mut violation_count = 0usize;
        for (_, record) in &rows {
            if let Some(action) = record.field_token("action")
                && !allowed.contains(&action)
            {
                violation_count += 1;
                invalid_values.push(action);
            }
        }
        let (sample, _) = sorted_sample(invalid_values, SAMPLE_LIMIT);
        checks.push(RelationshipCheck::outcome(
            label,
            format!("{type_value}: actions allowed"),
            violation_count == 0,
            (violation_count > 0)
                .then(|| json!({"invalidActions": sample, "invalidCount": violation_count})),
        ));
    }

    if child_table.columns().contains("field_name") {
        let parent_columns = parent_table.columns();
        let invalid: Vec<String> = rows
            .iter()
            .filter_map(|(_, record)| record.field_token("field_name"))
            .filter(|name| !parent_columns.contains(name))
            .collect();
        let (sample, total) = sorted_sample(invalid, SAMPLE_LIMIT);
        let column_sample: Vec<&String> =
            parent_columns.iter().take(TYPE_SAMPLE_LIMIT).collect();
        checks.push(RelationshipCheck::outcome(
            label,
            format!("{type_value}: field names valid"),
            total == 0,
            (total > 0).then(|| {
                json!({
                    "invalidFieldNames": sample,
                    "invalidCount": total,
                    "parentColumns": column_sample
                })
            }),
        ));
    }

    if let (Some(child_ts_column), Some(parent_ts_column)) = (
        created_at_column(child_table),
        created_at_column(parent_table),
    ) {
        let parent_by_token = index_by_column(parent_table, &target.parent_column);
        let mut violation_count = 0usize;
        for (_, record) in &rows {
            let Some(id) = record.field_token(&declaration.id_column) else {
                continue;
            };
            let Some(parent_record) = parent_by_token.get(&id) else {
                continue;
            };
            let child_ts = record.field(&child_ts_column).and_then(parse_timestamp);
            let parent_ts = parent_record
                .field(&parent_ts_column)
                .and_then(parse_timestamp);
            if let (Some(child_ts), Some(parent_ts)) = (child_ts, parent_ts)
                && child_ts < parent_ts
            {
                violation_count += 1;
            }
        }
        checks.push(RelationshipCheck::outcome(
            label,
            format!("{type_value}: chronology"),
            violation_count == 0,
            Some(json!({"violationCount": violation_count})),
        ));
    }
}

fn check_user_link(
    checks: &mut Vec<RelationshipCheck>,
    label: &str,
    dataset: &Dataset,
    child_table: &Table,
) {
    if !child_table.columns().contains("user_id") {
        return;
    }

    let Some(users) = dataset.table("users") else {
        checks.push(RelationshipCheck::fail(
            label,
            "Users table present",
            json!({"missingTables": ["users"]}),
        ));
        return;
    };

    let user_tokens: BTreeSet<String> = users
        .column_values("user_id")
        .filter_map(|(_, value)| scalar_token(value))
        .collect();
    let referenced: BTreeSet<String> = child_table
        .column_values("user_id")
        .filter_map(|(_, value)| scalar_token(value))
        .collect();
    let missing: Vec<String> = referenced.difference(&user_tokens).cloned().collect();
    let (sample, total) = sorted_sample(missing, SAMPLE_LIMIT);
    checks.push(RelationshipCheck::outcome(
        label,
        "All user_ids exist",
        total == 0,
        Some(json!({"missingIds": sample, "missingCount": total})),
    ));
}

/// Average and maximum child rows per referenced parent id.
fn reference_load(ids: &[String]) -> Value {
    if ids.is_empty() {
        return json!({"avg": 0.0, "max": 0});
    }
    let mut counts: BTreeMap<&String, usize> = BTreeMap::new();
    for id in ids {
        *counts.entry(id).or_insert(0) += 1;
    }
    let max = counts.values().max().copied().unwrap_or(0);
    let avg = round2(ids.len() as f64 / counts.len() as f64);
    json!({"avg": avg, "max": max})
}

/// First record per distinct column token, in key order.
fn index_by_column<'a>(table: &'a Table, column: &str) -> BTreeMap<String, &'a Record> {
    let mut index = BTreeMap::new();
    for (_, record) in table.records() {
        if let Some(token) = record.field_token(column) {
            index.entry(token).or_insert(record);
        }
    }
    index
}

/// The table's `created_at`-style column, preferring the exact name.
fn created_at_column(table: &Table) -> Option<String> {
    let columns = table.columns();
    if columns.contains("created_at") {
        return Some("created_at".to_string());
    }
    columns
        .into_iter()
        .find(|column| created_at_column_re().is_match(column))
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed.and_utc());
        }
    }
    None
}
