//! # relint-schema
//!
//! Declared shape of a dataset: foreign-key relationships (with
//! cardinality and coverage policy), polymorphic foreign keys, and
//! permitted enum values per column.
//!
//! Declarations are data, loaded once per run from a JSON or TOML
//! document. Everything stringly or mis-encoded in the source format
//! (cardinality tags, the `61` artifact, boolean enum literals) is
//! normalized here, at load time, so the checkers downstream dispatch on
//! closed types only.

pub mod cardinality;
pub mod config;
pub mod enums;
pub mod generic;
pub mod relationship;

pub use cardinality::Cardinality;
pub use config::{SchemaConfig, SchemaConfigError};
pub use enums::EnumRegistry;
pub use generic::{GenericForeignKey, GenericTarget};
pub use relationship::{ColumnRef, Relationship};
