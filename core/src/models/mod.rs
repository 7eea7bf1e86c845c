//! Data models for fixture datasets
//!
//! This module provides data structures for representing datasets in memory:
//! ordered tables of rows with textual cell values, and the write operations
//! that apply them to a database.

mod dataset;
mod operation;
mod row;
mod table;
mod value;

pub use dataset::Dataset;
pub use operation::Operation;
pub use row::Row;
pub use table::Table;
pub use value::{CellValue, NULL_TOKEN};
