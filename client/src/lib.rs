//! Fixture loading, snapshot export and occurrence assertions
//!
//! This crate drives a database through the boundaries defined in
//! `dbtest-core`: the [`loader`] seeds fixture data, the [`exporter`] reads
//! table snapshots back, and the [`assertion`] engine checks snapshots
//! against row patterns. [`harness::DatabaseTest`] wraps all three for use
//! inside tests, and the [`postgres`] and [`memory`] modules provide
//! backends.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod assertion;
pub mod exporter;
pub mod harness;
pub mod loader;
pub mod logging;
pub mod memory;
pub mod postgres;

#[cfg(test)]
mod testing;

pub use assertion::{AssertionEngine, AssertionReport};
pub use exporter::{SnapshotExporter, TableQueries};
pub use harness::DatabaseTest;
pub use loader::{DatasetSource, FixtureLoader, LoadSummary};
pub use memory::MemoryDatabase;
pub use postgres::PgProvider;
