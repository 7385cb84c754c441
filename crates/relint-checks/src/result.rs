//! Check-result model: one evaluated invariant, never mutated after
//! creation.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::Value;

/// Tag separating polymorphic-FK checks from declared-FK checks in the flat
/// relationship list.
pub const GENERIC_KIND: &str = "generic";

/// Evidence samples are bounded to keep reports readable.
pub const SAMPLE_LIMIT: usize = 5;
pub const TYPE_SAMPLE_LIMIT: usize = 10;

/// Outcome of one check: boolean pass/fail, or an informational payload.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    Pass,
    Fail,
    Info(Value),
}

impl CheckOutcome {
    pub fn from_bool(passed: bool) -> Self {
        if passed {
            CheckOutcome::Pass
        } else {
            CheckOutcome::Fail
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, CheckOutcome::Pass)
    }

    pub fn failed(&self) -> bool {
        matches!(self, CheckOutcome::Fail)
    }

    pub fn is_info(&self) -> bool {
        matches!(self, CheckOutcome::Info(_))
    }
}

impl Serialize for CheckOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CheckOutcome::Pass => serializer.serialize_bool(true),
            CheckOutcome::Fail => serializer.serialize_bool(false),
            CheckOutcome::Info(value) => value.serialize(serializer),
        }
    }
}

/// One evaluated per-table invariant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub check: String,
    pub result: CheckOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl CheckResult {
    pub fn pass(check: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            result: CheckOutcome::Pass,
            details: None,
        }
    }

    pub fn fail(check: impl Into<String>, details: Value) -> Self {
        Self {
            check: check.into(),
            result: CheckOutcome::Fail,
            details: Some(details),
        }
    }

    pub fn outcome(check: impl Into<String>, passed: bool, details: Option<Value>) -> Self {
        Self {
            check: check.into(),
            result: CheckOutcome::from_bool(passed),
            details,
        }
    }

    pub fn info(check: impl Into<String>, value: Value) -> Self {
        Self {
            check: check.into(),
            result: CheckOutcome::Info(value),
            details: None,
        }
    }
}

/// One evaluated relationship invariant (declared or polymorphic).
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipCheck {
    pub relationship: String,
    pub check: String,
    pub result: CheckOutcome,
    pub details: Option<Value>,
    pub kind: Option<String>,
}

impl RelationshipCheck {
    pub fn pass(relationship: impl Into<String>, check: impl Into<String>) -> Self {
        Self {
            relationship: relationship.into(),
            check: check.into(),
            result: CheckOutcome::Pass,
            details: None,
            kind: None,
        }
    }

    pub fn fail(
        relationship: impl Into<String>,
        check: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            relationship: relationship.into(),
            check: check.into(),
            result: CheckOutcome::Fail,
            details: Some(details),
            kind: None,
        }
    }

    pub fn outcome(
        relationship: impl Into<String>,
        check: impl Into<String>,
        passed: bool,
        details: Option<Value>,
    ) -> Self {
        Self {
            relationship: relationship.into(),
            check: check.into(),
            result: CheckOutcome::from_bool(passed),
            details,
            kind: None,
        }
    }

    pub fn info(
        relationship: impl Into<String>,
        check: impl Into<String>,
        value: Value,
    ) -> Self {
        Self {
            relationship: relationship.into(),
            check: check.into(),
            result: CheckOutcome::Info(value),
            details: None,
            kind: None,
        }
    }

    /// Tag this check as belonging to the polymorphic section.
    pub fn generic(mut self) -> Self {
        self.kind = Some(GENERIC_KIND.to_string());
        self
    }

    pub fn is_generic(&self) -> bool {
        self.kind.as_deref() == Some(GENERIC_KIND)
    }
}

impl Serialize for RelationshipCheck {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut fields = 3;
        if self.details.is_some() {
            fields += 1;
        }
        if self.kind.is_some() {
            fields += 1;
        }
        let mut state = serializer.serialize_struct("RelationshipCheck", fields)?;
        state.serialize_field("relationship", &self.relationship)?;
        state.serialize_field("check", &self.check)?;
        state.serialize_field("result", &self.result)?;
        if let Some(details) = &self.details {
            state.serialize_field("details", details)?;
        }
        if let Some(kind) = &self.kind {
            state.serialize_field("kind", kind)?;
        }
        state.end()
    }
}

/// Deterministic bounded sample: sort, truncate, and report how many items
/// the sample covers out of the total.
pub fn sorted_sample(items: impl IntoIterator<Item = String>, limit: usize) -> (Vec<String>, usize) {
    let mut items: Vec<String> = items.into_iter().collect();
    items.sort();
    items.dedup();
    let total = items.len();
    items.truncate(limit);
    (items, total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_serializes_as_bool_or_payload() {
        let pass = serde_json::to_value(CheckResult::pass("Primary keys unique"))
            .expect("pass should serialize");
        assert_eq!(pass, json!({"check": "Primary keys unique", "result": true}));

        let info = serde_json::to_value(CheckResult::info(
            "Child distribution",
            json!({"avg": 1.5, "min": 1, "max": 2}),
        ))
        .expect("info should serialize");
        assert_eq!(info["result"], json!({"avg": 1.5, "min": 1, "max": 2}));
    }

    #[test]
    fn generic_tag_appears_only_when_set() {
        let declared = serde_json::to_value(RelationshipCheck::pass("a -> b", "Columns present"))
            .expect("declared check should serialize");
        assert!(declared.get("kind").is_none());

        let generic = serde_json::to_value(
            RelationshipCheck::pass("a -> b", "Columns present").generic(),
        )
        .expect("generic check should serialize");
        assert_eq!(generic["kind"], "generic");
    }

    #[test]
    fn sorted_sample_dedupes_sorts_and_truncates() {
        let (sample, total) = sorted_sample(
            ["9", "2", "9", "5", "1", "7", "3"]
                .iter()
                .map(|item| item.to_string()),
            5,
        );
        assert_eq!(sample, vec!["1", "2", "3", "5", "7"]);
        assert_eq!(total, 6);
    }
}
