//! Declared foreign-key checks.
//!
//! Cardinality selects one of three check bundles layered on a common
//! prefix: column existence, null accounting, referential integrity, and
//! parent uniqueness always run; the continuation depends on whether the
//! relationship is 1:1, 1:N, or M:N. An unknown cardinality is itself a
//! failing check, never an abort.

use crate::result::{RelationshipCheck, SAMPLE_LIMIT, sorted_sample};
use relint_model::{Dataset, Table, scalar_token};
use relint_schema::{Cardinality, Relationship};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

/// Separator for composite junction pairs in evidence samples.
const PAIR_SEPARATOR: &str = "§";

/// Run every check for one declared relationship.
pub fn check_relationship(dataset: &Dataset, relationship: &Relationship) -> Vec<RelationshipCheck> {
    let label = relationship.label();

    let parent = dataset.table(&relationship.parent.table);
    let child = dataset.table(&relationship.child.table);
    let (Some(parent_table), Some(child_table)) = (parent, child) else {
        let mut missing_tables = Vec::new();
        if parent.is_none() {
            missing_tables.push(relationship.parent.table.clone());
        }
        if child.is_none() {
            missing_tables.push(relationship.child.table.clone());
        }
        missing_tables.sort();
        missing_tables.dedup();
        return vec![RelationshipCheck::fail(
            label,
            "Tables present",
            json!({"missingTables": missing_tables}),
        )];
    };

    let mut missing_columns = Vec::new();
    if !parent_table.has_column(&relationship.parent.column) {
        missing_columns.push(relationship.parent.to_string());
    }
    if !child_table.has_column(&relationship.child.column) {
        missing_columns.push(relationship.child.to_string());
    }
    if !missing_columns.is_empty() {
        missing_columns.sort();
        return vec![RelationshipCheck::fail(
            label,
            "Columns present",
            json!({"missingColumns": missing_columns}),
        )];
    }

    let mut checks = vec![RelationshipCheck::pass(&label, "Columns present")];

    let null_children = child_table
        .column_values(&relationship.child.column)
        .filter(|(_, value)| value.is_null())
        .count();
    checks.push(RelationshipCheck::info(
        &label,
        "Null child values",
        json!(null_children),
    ));

    let parent_tokens = column_tokens(parent_table, &relationship.parent.column);
    let parent_token_set: BTreeSet<String> = parent_tokens.iter().cloned().collect();
    let child_tokens = column_tokens(child_table, &relationship.child.column);
    let child_token_set: BTreeSet<String> = child_tokens.iter().cloned().collect();

    let missing: Vec<String> = child_token_set
        .difference(&parent_token_set)
        .cloned()
        .collect();
    let (missing_sample, missing_count) = sorted_sample(missing, SAMPLE_LIMIT);
    checks.push(RelationshipCheck::outcome(
        &label,
        "All children have parents",
        missing_count == 0,
        Some(json!({"missingIds": missing_sample, "missingCount": missing_count})),
    ));

    let duplicate_parents = duplicated(&parent_tokens);
    if duplicate_parents.is_empty() {
        checks.push(RelationshipCheck::pass(&label, "Parent keys unique"));
    } else {
        let (sample, total) = sorted_sample(duplicate_parents, SAMPLE_LIMIT);
        checks.push(RelationshipCheck::fail(
            &label,
            "Parent keys unique",
            json!({"duplicateValues": sample, "duplicateCount": total}),
        ));
    }

    match &relationship.cardinality {
        Cardinality::OneToOne => check_one_to_one(
            &mut checks,
            &label,
            relationship,
            &parent_token_set,
            &child_tokens,
        ),
        Cardinality::OneToMany => check_one_to_many(
            &mut checks,
            &label,
            relationship,
            &parent_token_set,
            &child_tokens,
        ),
        Cardinality::ManyToMany => check_many_to_many(
            &mut checks,
            &label,
            relationship,
            child_table,
            &parent_token_set,
        ),
        Cardinality::Unknown(raw) => checks.push(RelationshipCheck::fail(
            &label,
            "Unknown relationship type",
            json!({"cardinality": raw}),
        )),
    }

    checks
}

fn check_one_to_one(
    checks: &mut Vec<RelationshipCheck>,
    label: &str,
    relationship: &Relationship,
    parent_tokens: &BTreeSet<String>,
    child_tokens: &[String],
) {
    let duplicate_children = duplicated(child_tokens);
    if duplicate_children.is_empty() {
        checks.push(RelationshipCheck::pass(label, "Child references unique"));
    } else {
        let (sample, total) = sorted_sample(duplicate_children, SAMPLE_LIMIT);
        checks.push(RelationshipCheck::fail(
            label,
            "Child references unique",
            json!({"duplicateValues": sample, "duplicateCount": total}),
        ));
    }

    if !relationship.mandatory {
        return;
    }

    let child_counts = occurrence_counts(child_tokens);
    let uncovered: Vec<String> = parent_tokens
        .iter()
        .filter(|token| !child_counts.contains_key(*token))
        .cloned()
        .collect();
    let over_referenced: Vec<String> = parent_tokens
        .iter()
        .filter(|token| child_counts.get(*token).copied().unwrap_or(0) > 1)
        .cloned()
        .collect();

    if uncovered.is_empty() && over_referenced.is_empty() {
        checks.push(RelationshipCheck::pass(label, "Mandatory 1:1 coverage"));
        return;
    }
    let (uncovered_sample, uncovered_count) = sorted_sample(uncovered, SAMPLE_LIMIT);
    let (over_sample, over_count) = sorted_sample(over_referenced, SAMPLE_LIMIT);
    checks.push(RelationshipCheck::fail(
        label,
        "Mandatory 1:1 coverage",
        json!({
            "uncoveredParents": uncovered_sample,
            "uncoveredCount": uncovered_count,
            "overReferencedParents": over_sample,
            "overReferencedCount": over_count
        }),
    ));
}

fn check_one_to_many(
    checks: &mut Vec<RelationshipCheck>,
    label: &str,
    relationship: &Relationship,
    parent_tokens: &BTreeSet<String>,
    child_tokens: &[String],
) {
    let counts = occurrence_counts(child_tokens);

    checks.push(RelationshipCheck::info(
        label,
        "Child distribution",
        distribution_payload(&counts),
    ));

    if relationship.min_children.is_some() || relationship.max_children.is_some() {
        let mut violations: Vec<(String, usize)> = counts
            .iter()
            .filter(|(_, count)| {
                let count = **count as u64;
                relationship.min_children.is_some_and(|min| count < min)
                    || relationship.max_children.is_some_and(|max| count > max)
            })
            .map(|(token, count)| (token.clone(), *count))
            .collect();
        violations.sort();
        let violation_count = violations.len();
        let sample: Vec<_> = violations
            .into_iter()
            .take(SAMPLE_LIMIT)
            .map(|(parent, count)| json!({"parent": parent, "count": count}))
            .collect();
        checks.push(RelationshipCheck::outcome(
            label,
            "Children per parent within bounds",
            violation_count == 0,
            Some(json!({
                "violations": sample,
                "violationCount": violation_count,
                "minChildren": relationship.min_children,
                "maxChildren": relationship.max_children
            })),
        ));
    }

    if relationship.mandatory {
        let childless: Vec<String> = parent_tokens
            .iter()
            .filter(|token| !counts.contains_key(*token))
            .cloned()
            .collect();
        if childless.is_empty() {
            checks.push(RelationshipCheck::pass(label, "Mandatory coverage"));
        } else {
            let (sample, total) = sorted_sample(childless, SAMPLE_LIMIT);
            checks.push(RelationshipCheck::fail(
                label,
                "Mandatory coverage",
                json!({"childlessParents": sample, "childlessCount": total}),
            ));
        }
    }
}

fn check_many_to_many(
    checks: &mut Vec<RelationshipCheck>,
    label: &str,
    relationship: &Relationship,
    junction_table: &Table,
    parent_tokens: &BTreeSet<String>,
) {
    let (Some(link_parent), Some(link_child)) = (
        relationship.link_parent_column.as_deref(),
        relationship.link_child_column.as_deref(),
    ) else {
        checks.push(RelationshipCheck::fail(
            label,
            "Link columns declared",
            json!({
                "linkParentColumn": relationship.link_parent_column,
                "linkChildColumn": relationship.link_child_column
            }),
        ));
        return;
    };

    let mut missing_columns = Vec::new();
    for column in [link_parent, link_child] {
        if !junction_table.has_column(column) {
            missing_columns.push(format!("{}.{column}", junction_table.name()));
        }
    }
    if !missing_columns.is_empty() {
        checks.push(RelationshipCheck::fail(
            label,
            "Link columns present",
            json!({"missingColumns": missing_columns}),
        ));
        return;
    }
    checks.push(RelationshipCheck::pass(label, "Link columns present"));

    let mut pairs = Vec::new();
    let mut link_parent_tokens = Vec::new();
    for (_, record) in junction_table.records() {
        let parent_token = record.field_token(link_parent);
        if let Some(token) = &parent_token {
            link_parent_tokens.push(token.clone());
        }
        if let (Some(parent_token), Some(child_token)) =
            (parent_token, record.field_token(link_child))
        {
            pairs.push(format!("{parent_token}{PAIR_SEPARATOR}{child_token}"));
        }
    }

    // Each duplicated pair counts once, as a duplicate group.
    let duplicate_pairs = duplicated(&pairs);
    if duplicate_pairs.is_empty() {
        checks.push(RelationshipCheck::pass(
            label,
            "Composite uniqueness (parent, child)",
        ));
    } else {
        let (sample, total) = sorted_sample(duplicate_pairs, SAMPLE_LIMIT);
        checks.push(RelationshipCheck::fail(
            label,
            "Composite uniqueness (parent, child)",
            json!({"duplicatePairsSample": sample, "duplicatePairCount": total}),
        ));
    }

    let link_parent_set: BTreeSet<String> = link_parent_tokens.into_iter().collect();
    let missing: Vec<String> = link_parent_set
        .difference(parent_tokens)
        .cloned()
        .collect();
    let (sample, total) = sorted_sample(missing, SAMPLE_LIMIT);
    checks.push(RelationshipCheck::outcome(
        label,
        "Link parents exist",
        total == 0,
        Some(json!({"missingIds": sample, "missingCount": total})),
    ));
}

/// Per-record non-null tokens of one column.
fn column_tokens(table: &Table, column: &str) -> Vec<String> {
    table
        .column_values(column)
        .filter_map(|(_, value)| scalar_token(value))
        .collect()
}

fn occurrence_counts(tokens: &[String]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for token in tokens {
        *counts.entry(token.clone()).or_insert(0usize) += 1;
    }
    counts
}

/// Tokens that occur more than once, each reported once.
fn duplicated(tokens: &[String]) -> Vec<String> {
    occurrence_counts(tokens)
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(token, _)| token)
        .collect()
}

fn distribution_payload(counts: &BTreeMap<String, usize>) -> serde_json::Value {
    if counts.is_empty() {
        return json!({"avg": 0.0, "min": 0, "max": 0, "top": []});
    }
    let total: usize = counts.values().sum();
    let avg = round2(total as f64 / counts.len() as f64);
    let min = counts.values().min().copied().unwrap_or(0);
    let max = counts.values().max().copied().unwrap_or(0);

    let mut ranked: Vec<(&String, &usize)> = counts.iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    let top: Vec<_> = ranked
        .into_iter()
        .take(SAMPLE_LIMIT)
        .map(|(parent, count)| json!({"parent": parent, "count": count}))
        .collect();

    json!({"avg": avg, "min": min, "max": max, "top": top})
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use relint_schema::ColumnRef;
    use serde_json::{Value, json};

    fn dataset(value: Value) -> Dataset {
        let (dataset, errors) = Dataset::from_value(&value).expect("dataset should load");
        assert!(errors.is_empty(), "unexpected read errors: {errors:?}");
        dataset
    }

    fn relationship(cardinality: Cardinality) -> Relationship {
        Relationship::new(
            ColumnRef::new("spaces", "space_id"),
            ColumnRef::new("pages", "space_id"),
            cardinality,
        )
    }

    fn find<'a>(checks: &'a [RelationshipCheck], name: &str) -> &'a RelationshipCheck {
        checks
            .iter()
            .find(|check| check.check == name)
            .unwrap_or_else(|| panic!("check `{name}` should be present in {checks:?}"))
    }

    #[test]
    fn orphan_child_fails_referential_integrity() {
        let dataset = dataset(json!({
            "spaces": {"1": {"space_id": "1"}},
            "pages": {
                "10": {"space_id": "1"},
                "11": {"space_id": "9"}
            }
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::OneToMany));
        let referential = find(&checks, "All children have parents");
        assert!(referential.result.failed());
        let details = referential
            .details
            .as_ref()
            .expect("details should be present");
        assert_eq!(details["missingIds"], json!(["9"]));
        assert_eq!(details["missingCount"], json!(1));
    }

    #[test]
    fn covered_child_passes_with_distribution() {
        let dataset = dataset(json!({
            "spaces": {"1": {"space_id": "1"}},
            "pages": {"10": {"space_id": "1"}}
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::OneToMany));
        let referential = find(&checks, "All children have parents");
        assert!(referential.result.passed());
        assert_eq!(
            referential.details.as_ref().expect("details")["missingCount"],
            json!(0)
        );

        let distribution = find(&checks, "Child distribution");
        let payload = match &distribution.result {
            crate::result::CheckOutcome::Info(value) => value,
            other => panic!("distribution should be informational, got {other:?}"),
        };
        assert_eq!(payload["avg"], json!(1.0));
        assert_eq!(payload["min"], json!(1));
        assert_eq!(payload["max"], json!(1));
    }

    #[test]
    fn numeric_and_string_ids_compare_token_equal() {
        let dataset = dataset(json!({
            "spaces": {"1": {"space_id": 1}},
            "pages": {"10": {"space_id": "1"}}
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::OneToMany));
        assert!(find(&checks, "All children have parents").result.passed());
    }

    #[test]
    fn missing_column_aborts_remaining_checks() {
        let dataset = dataset(json!({
            "spaces": {"1": {"space_id": "1"}},
            "pages": {"10": {"title": "no fk here"}}
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::OneToMany));
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].check, "Columns present");
        assert!(checks[0].result.failed());
        assert_eq!(
            checks[0].details.as_ref().expect("details")["missingColumns"],
            json!(["pages.space_id"])
        );
    }

    #[test]
    fn missing_table_reports_tables_present() {
        let dataset = dataset(json!({
            "spaces": {"1": {"space_id": "1"}}
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::OneToMany));
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].check, "Tables present");
        assert!(checks[0].result.failed());
    }

    #[test]
    fn null_children_are_counted_not_failed() {
        let dataset = dataset(json!({
            "spaces": {"1": {"space_id": "1"}},
            "pages": {
                "10": {"space_id": "1"},
                "11": {"space_id": null}
            }
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::OneToMany));
        let nulls = find(&checks, "Null child values");
        assert_eq!(nulls.result, crate::result::CheckOutcome::Info(json!(1)));
        assert!(find(&checks, "All children have parents").result.passed());
    }

    #[test]
    fn duplicate_parent_keys_fail_uniqueness() {
        let dataset = dataset(json!({
            "spaces": {
                "1": {"space_id": "7"},
                "2": {"space_id": "7"}
            },
            "pages": {"10": {"space_id": "7"}}
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::OneToMany));
        let uniqueness = find(&checks, "Parent keys unique");
        assert!(uniqueness.result.failed());
        assert_eq!(
            uniqueness.details.as_ref().expect("details")["duplicateValues"],
            json!(["7"])
        );
    }

    #[test]
    fn one_to_one_reports_duplicate_children_and_coverage() {
        let dataset = dataset(json!({
            "spaces": {
                "1": {"space_id": "1"},
                "2": {"space_id": "2"}
            },
            "pages": {
                "10": {"space_id": "1"},
                "11": {"space_id": "1"}
            }
        }));

        let mut declared = relationship(Cardinality::OneToOne);
        declared.mandatory = true;
        let checks = check_relationship(&dataset, &declared);

        let unique = find(&checks, "Child references unique");
        assert!(unique.result.failed());
        assert_eq!(
            unique.details.as_ref().expect("details")["duplicateValues"],
            json!(["1"])
        );

        let coverage = find(&checks, "Mandatory 1:1 coverage");
        assert!(coverage.result.failed());
        let details = coverage.details.as_ref().expect("details");
        assert_eq!(details["uncoveredParents"], json!(["2"]));
        assert_eq!(details["overReferencedParents"], json!(["1"]));
    }

    #[test]
    fn exact_one_to_one_coverage_passes() {
        let dataset = dataset(json!({
            "spaces": {"1": {"space_id": "1"}},
            "pages": {"10": {"space_id": "1"}}
        }));

        let mut declared = relationship(Cardinality::OneToOne);
        declared.mandatory = true;
        let checks = check_relationship(&dataset, &declared);
        assert!(find(&checks, "Child references unique").result.passed());
        assert!(find(&checks, "Mandatory 1:1 coverage").result.passed());
    }

    #[test]
    fn distribution_reports_rounded_average_and_top_parents() {
        let dataset = dataset(json!({
            "spaces": {
                "1": {"space_id": "1"},
                "2": {"space_id": "2"},
                "3": {"space_id": "3"}
            },
            "pages": {
                "10": {"space_id": "1"},
                "11": {"space_id": "1"},
                "12": {"space_id": "2"}
            }
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::OneToMany));
        let payload = match &find(&checks, "Child distribution").result {
            crate::result::CheckOutcome::Info(value) => value.clone(),
            other => panic!("distribution should be informational, got {other:?}"),
        };
        // Average is over parents with children: 3 children / 2 parents.
        assert_eq!(payload["avg"], json!(1.5));
        assert_eq!(payload["min"], json!(1));
        assert_eq!(payload["max"], json!(2));
        assert_eq!(payload["top"][0], json!({"parent": "1", "count": 2}));
    }

    #[test]
    fn child_count_bounds_report_violators() {
        let dataset = dataset(json!({
            "spaces": {
                "1": {"space_id": "1"},
                "2": {"space_id": "2"}
            },
            "pages": {
                "10": {"space_id": "1"},
                "11": {"space_id": "1"},
                "12": {"space_id": "1"},
                "13": {"space_id": "2"}
            }
        }));

        let mut declared = relationship(Cardinality::OneToMany);
        declared.max_children = Some(2);
        let checks = check_relationship(&dataset, &declared);
        let bounds = find(&checks, "Children per parent within bounds");
        assert!(bounds.result.failed());
        let details = bounds.details.as_ref().expect("details");
        assert_eq!(details["violationCount"], json!(1));
        assert_eq!(details["violations"][0], json!({"parent": "1", "count": 3}));
    }

    #[test]
    fn mandatory_one_to_many_reports_childless_parents() {
        let dataset = dataset(json!({
            "spaces": {
                "1": {"space_id": "1"},
                "2": {"space_id": "2"}
            },
            "pages": {"10": {"space_id": "1"}}
        }));

        let mut declared = relationship(Cardinality::OneToMany);
        declared.mandatory = true;
        let checks = check_relationship(&dataset, &declared);
        let coverage = find(&checks, "Mandatory coverage");
        assert!(coverage.result.failed());
        assert_eq!(
            coverage.details.as_ref().expect("details")["childlessParents"],
            json!(["2"])
        );
    }

    #[test]
    fn many_to_many_reports_duplicate_pairs_once() {
        let dataset = dataset(json!({
            "users": {
                "1": {"user_id": "1"},
                "2": {"user_id": "2"}
            },
            "user_groups": {
                "100": {"user_id": "1", "group_id": "5"},
                "101": {"user_id": "1", "group_id": "5"},
                "102": {"user_id": "2", "group_id": "5"}
            }
        }));

        let mut declared = Relationship::new(
            ColumnRef::new("users", "user_id"),
            ColumnRef::new("user_groups", "user_id"),
            Cardinality::ManyToMany,
        );
        declared.link_parent_column = Some("user_id".to_string());
        declared.link_child_column = Some("group_id".to_string());

        let checks = check_relationship(&dataset, &declared);
        let composite = find(&checks, "Composite uniqueness (parent, child)");
        assert!(composite.result.failed());
        let details = composite.details.as_ref().expect("details");
        assert_eq!(details["duplicatePairsSample"], json!(["1§5"]));
        assert_eq!(details["duplicatePairCount"], json!(1));

        assert!(find(&checks, "Link parents exist").result.passed());
    }

    #[test]
    fn many_to_many_without_link_columns_is_a_declaration_failure() {
        let dataset = dataset(json!({
            "users": {"1": {"user_id": "1"}},
            "user_groups": {"100": {"user_id": "1", "group_id": "5"}}
        }));

        let declared = Relationship::new(
            ColumnRef::new("users", "user_id"),
            ColumnRef::new("user_groups", "user_id"),
            Cardinality::ManyToMany,
        );
        let checks = check_relationship(&dataset, &declared);
        assert!(find(&checks, "Link columns declared").result.failed());
    }

    #[test]
    fn unknown_cardinality_is_reported_not_fatal() {
        let dataset = dataset(json!({
            "spaces": {"1": {"space_id": "1"}},
            "pages": {"10": {"space_id": "1"}}
        }));

        let checks = check_relationship(&dataset, &relationship(Cardinality::Unknown("N:M".into())));
        let unknown = find(&checks, "Unknown relationship type");
        assert!(unknown.result.failed());
        assert_eq!(
            unknown.details.as_ref().expect("details")["cardinality"],
            json!("N:M")
        );
        // The common prefix still ran.
        assert!(find(&checks, "All children have parents").result.passed());
    }

    #[test]
    fn round2_rounds_half_up_to_two_decimals() {
        assert_eq!(round2(1.0 / 3.0), 0.33);
        assert_eq!(round2(2.0 / 3.0), 0.67);
        assert_eq!(round2(1.005), 1.0); // binary representation sits below .005
    }
}
