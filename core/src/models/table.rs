//! Dataset table representation
//!
//! A table is a name plus an ordered sequence of rows. Rows of the same table
//! are not required to share a column set.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

use super::row::Row;
use super::value::CellValue;

/// A named table of rows
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Name of the table, as written by the fixture author or requested
    /// from the database
    name: String,

    /// Rows in order
    rows: Vec<Row>,
}

impl Debug for Table {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("row_count", &self.rows.len())
            .finish()
    }
}

impl Table {
    /// Create an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Create a table from rows
    pub fn with_rows(name: impl Into<String>, rows: Vec<Row>) -> Self {
        Table {
            name: name.into(),
            rows,
        }
    }

    /// Name of the table
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this table is named `name`, ignoring case
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Rows of the table
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Append a row
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Union of the column names seen across all rows, in first-seen order.
    /// Names differing only by case are reported once.
    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for row in &self.rows {
            for column in row.columns() {
                if !columns.iter().any(|known| known.eq_ignore_ascii_case(column)) {
                    columns.push(column.to_string());
                }
            }
        }
        columns
    }

    /// Whether every row carries a non-null value for `column`
    pub fn is_column_required(&self, column: &str) -> bool {
        !self.rows.is_empty()
            && self
                .rows
                .iter()
                .all(|row| matches!(row.get(column), Some(CellValue::Text(_))))
    }

    /// Mutable access to the rows
    pub fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_columns() {
        let mut table = Table::new("users");
        table.push(Row::new().with("id", "1").with("name", "Alice"));
        table.push(Row::new().with("ID", "2").with("email", "bob@example.com"));

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns(), vec!["id", "name", "email"]);
    }

    #[test]
    fn test_required_columns() {
        let table = Table::with_rows(
            "users",
            vec![
                Row::new().with("id", "1").with("name", "Alice"),
                Row::new().with("id", "2").with("name", CellValue::Null),
            ],
        );

        assert!(table.is_column_required("id"));
        assert!(!table.is_column_required("name"));
        assert!(!Table::new("empty").is_column_required("id"));
    }

    #[test]
    fn test_is_named() {
        let table = Table::new("Users");
        assert!(table.is_named("users"));
        assert!(!table.is_named("user"));
    }
}
