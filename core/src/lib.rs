//! # dbtest core
//!
//! Core data structures of the database test toolbox: the in-memory dataset
//! model and its flat XML form, row patterns and the selectors they compile
//! to, placeholder substitution, SQL rendering and the database and
//! filesystem boundaries the engine runs against.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod pattern;
pub mod schema;
pub mod sql;
pub mod substitution;
pub mod utils;
pub mod xml;

/// Re-export common types for ease of use
pub use config::ToolboxConfig;
pub use database::{DatabaseConnection, DatabaseProvider, ForeignKey};
pub use error::{Result, ToolboxError};
pub use models::{CellValue, Dataset, Operation, Row, Table};
pub use pattern::{RowPattern, RowSelector};
pub use substitution::SubstitutionMap;

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
