//! Cardinality tags, normalized once at configuration-load time.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// How many child rows may reference one parent row.
///
/// The `Unknown` arm preserves the raw declaration so verification can emit
/// a failing "Unknown relationship type" check instead of aborting the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cardinality {
    OneToOne,
    OneToMany,
    ManyToMany,
    Unknown(String),
}

impl Cardinality {
    pub fn as_str(&self) -> &str {
        match self {
            Cardinality::OneToOne => "1:1",
            Cardinality::OneToMany => "1:N",
            Cardinality::ManyToMany => "M:N",
            Cardinality::Unknown(raw) => raw,
        }
    }

    /// Normalize one raw declaration token.
    ///
    /// `61` is the sexagesimal mis-encoding of an unquoted `1:1` in the
    /// source format; it folds back to `OneToOne`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "1:1" | "61" => Cardinality::OneToOne,
            "1:N" => Cardinality::OneToMany,
            "M:N" => Cardinality::ManyToMany,
            other => Cardinality::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Cardinality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Cardinality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CardinalityVisitor;

        impl<'de> Visitor<'de> for CardinalityVisitor {
            type Value = Cardinality;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a cardinality tag such as \"1:1\", \"1:N\", or \"M:N\"")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(Cardinality::parse(value))
            }

            fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
                Ok(Cardinality::parse(&value.to_string()))
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
                Ok(Cardinality::parse(&value.to_string()))
            }
        }

        deserializer.deserialize_any(CardinalityVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_the_three_tags() {
        assert_eq!(Cardinality::parse("1:1"), Cardinality::OneToOne);
        assert_eq!(Cardinality::parse("1:N"), Cardinality::OneToMany);
        assert_eq!(Cardinality::parse("M:N"), Cardinality::ManyToMany);
    }

    #[test]
    fn parse_folds_sexagesimal_artifact_to_one_to_one() {
        assert_eq!(Cardinality::parse("61"), Cardinality::OneToOne);
        let from_number: Cardinality =
            serde_json::from_str("61").expect("numeric tag should deserialize");
        assert_eq!(from_number, Cardinality::OneToOne);
    }

    #[test]
    fn parse_preserves_unknown_tags() {
        let unknown = Cardinality::parse("N:M");
        assert_eq!(unknown, Cardinality::Unknown("N:M".to_string()));
        assert_eq!(unknown.as_str(), "N:M");
    }

    #[test]
    fn serializes_as_normalized_tag() {
        let rendered =
            serde_json::to_string(&Cardinality::OneToOne).expect("tag should serialize");
        assert_eq!(rendered, "\"1:1\"");
    }
}
