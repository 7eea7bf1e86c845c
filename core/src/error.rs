//! Error types for the toolbox
//!
//! This module provides a consolidated error type shared by the core and
//! client crates. Loading and snapshot failures are never recovered by the
//! engine; they travel up to the test facade which turns them into a test
//! failure.

use thiserror::Error;

/// Toolbox error type
#[derive(Error, Debug)]
pub enum ToolboxError {
    /// Malformed dataset XML or unexpected root element
    #[error("Format error: {0}")]
    Format(String),

    /// Connection or SQL failure reported by the database
    #[error("Database error: {0}")]
    Database(String),

    /// Unreadable or unwritable path, directory creation failure
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// A row pattern matched a different number of rows than expected
    #[error("Unexpected number of occurrences of {selector}: expected {expected}, actual {actual}")]
    AssertionMismatch {
        /// Rendered selector of the failing pattern
        selector: String,

        /// Expected number of matching rows
        expected: usize,

        /// Number of rows that actually matched
        actual: usize,
    },

    /// Two tables with the same (case-insensitive) name in one dataset
    #[error("Duplicate table in dataset: {0}")]
    DuplicateTable(String),

    /// Key based write operation on a table without primary key
    #[error("Table {0} has no primary key")]
    NoPrimaryKey(String),

    /// A row does not carry one of its table's key columns
    #[error("Row of table {table} has no value for key column {column}")]
    MissingKeyColumn {
        /// Table name
        table: String,

        /// Key column missing from the row
        column: String,
    },

    /// Foreign keys between dataset tables form a cycle
    #[error("Cyclic dependency between tables: {0}")]
    CyclicDependency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the toolbox
pub type Result<T> = std::result::Result<T, ToolboxError>;

/// Convert an error to a FormatError
pub fn to_format_error<E: std::fmt::Display>(err: E) -> ToolboxError {
    ToolboxError::Format(err.to_string())
}

/// Convert an error to a DatabaseError
pub fn to_database_error<E: std::fmt::Display>(err: E) -> ToolboxError {
    ToolboxError::Database(err.to_string())
}

/// Convert an error to a FilesystemError
pub fn to_filesystem_error<E: std::fmt::Display>(err: E) -> ToolboxError {
    ToolboxError::Filesystem(err.to_string())
}

impl ToolboxError {
    /// Whether this error is the outcome of a failed occurrence assertion
    /// rather than a fault while talking to the database or filesystem
    pub fn is_assertion_mismatch(&self) -> bool {
        matches!(self, ToolboxError::AssertionMismatch { .. })
    }
}
