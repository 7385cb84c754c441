//! # relint-model
//!
//! Snapshot model for relational integrity verification.
//!
//! This crate provides:
//! - `Record` (dynamic field map) and scalar tokenization
//! - `Table` (primary key → record, deterministic ordering)
//! - `Dataset` loading from a directory of JSON files or an in-memory value
//! - `DataStore` + `IdAllocator` (the record-store surface consumed by the
//!   tool layer; verification only reads through it)
//!
//! It intentionally knows nothing about schemas or checks. Those concerns
//! live in `relint-schema` and `relint-checks`.
//!
//! ## Data model
//!
//! ```text
//! <tables dir>/*.json (one keyed collection per table)
//!     ↓  load (read errors recorded, not thrown)
//! Dataset (deterministic in-memory snapshot)
//! ```

pub mod dataset;
pub mod record;
pub mod store;
pub mod table;

pub use dataset::{Dataset, LoadError, TableReadError};
pub use record::{Record, scalar_token};
pub use store::{DataStore, IdAllocator, StoreError};
pub use table::Table;
