//! # relint-checks
//!
//! The verification core: four checkers over a loaded dataset plus report
//! assembly.
//!
//! - structural: per-table key invariants
//! - enums: declared-value membership per column
//! - foreign_keys: declared relationships, dispatched on cardinality
//! - generic: polymorphic foreign keys (type-column dispatch)
//!
//! Every evaluated invariant becomes exactly one check result — pass, fail,
//! or informational — with bounded, deterministically-sorted evidence.
//! `verify::run_verification` drives all of them in a fixed order and
//! assembles one report per run.

pub mod enums;
pub mod foreign_keys;
pub mod generic;
pub mod report;
pub mod result;
pub mod structural;
pub mod verify;

pub use report::{GenericFkSummary, TableReport, VerificationReport};
pub use result::{CheckOutcome, CheckResult, GENERIC_KIND, RelationshipCheck};
pub use verify::run_verification;
