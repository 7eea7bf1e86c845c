//! Dataset row representation
//!
//! A row maps column names to textual values. Columns keep the order in which
//! they were first set so that encoding a row reproduces the attribute order
//! it was read with. Column lookup ignores case because the source database
//! may report identifiers with a different case than fixture authors used.
//! A row therefore cannot hold two columns whose names differ only by case:
//! [`Row::set`] overwrites, [`Row::try_push`] refuses.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

use crate::error::{Result, ToolboxError};
use super::value::CellValue;

/// A row of a dataset table
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// Column values in insertion order
    cells: Vec<(String, CellValue)>,
}

impl Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_map()
            .entries(self.cells.iter().map(|(column, value)| (column, value)))
            .finish()
    }
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column value, consuming the row (builder style)
    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Set a value for a column, replacing any value stored under the same
    /// column name regardless of case
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.position(&column) {
            Some(index) => self.cells[index].1 = value,
            None => self.cells.push((column, value)),
        }
    }

    /// Append a column that the row does not carry yet. A column already
    /// present under any case is a [`ToolboxError::Format`] error.
    pub fn try_push(&mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Result<()> {
        let column = column.into();
        if let Some(index) = self.position(&column) {
            return Err(ToolboxError::Format(format!(
                "column \"{}\" clashes with column \"{}\"",
                column, self.cells[index].0
            )));
        }
        self.cells.push((column, value.into()));
        Ok(())
    }

    /// Get a value by column name (case-insensitive)
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.position(column).map(|index| &self.cells[index].1)
    }

    /// Whether the row carries the column (case-insensitive)
    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(column, _)| column.as_str())
    }

    /// Column/value pairs in order
    pub fn cells(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(column, value)| (column.as_str(), value))
    }

    /// Mutable access to values
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut CellValue> {
        self.cells.iter_mut().map(|(_, value)| value)
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the row has no columns
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.cells
            .iter()
            .position(|(name, _)| name.eq_ignore_ascii_case(column))
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<CellValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (column, value) in iter {
            row.set(column, value);
        }
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keeps_insertion_order() {
        let row = Row::new()
            .with("id", "1")
            .with("name", "Alice")
            .with("age", "30");

        let columns: Vec<&str> = row.columns().collect();
        assert_eq!(columns, vec!["id", "name", "age"]);
        assert_eq!(row.len(), 3);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut row = Row::new().with("Name", "Alice");

        assert_eq!(row.get("name"), Some(&CellValue::text("Alice")));
        assert!(row.contains("NAME"));

        // Setting under a different case replaces the value but keeps the spelling
        row.set("NAME", "Bob");
        assert_eq!(row.len(), 1);
        assert_eq!(row.columns().next(), Some("Name"));
        assert_eq!(row.get("name"), Some(&CellValue::text("Bob")));
    }

    #[test]
    fn test_try_push_refuses_case_variants() {
        let mut row = Row::new();
        row.try_push("Id", "1").unwrap();
        row.try_push("name", "Alice").unwrap();

        let clash = row.try_push("id", "2");
        match clash {
            Err(ToolboxError::Format(message)) => {
                assert_eq!(message, "column \"id\" clashes with column \"Id\"")
            }
            other => panic!("Expected Format error, got {:?}", other),
        }
        assert_eq!(row.get("ID"), Some(&CellValue::text("1")));
        assert_eq!(row.len(), 2);
    }

    #[test]
    fn test_null_cells() {
        let row: Row = vec![("id", Some("1")), ("deleted_at", None)].into_iter().collect();

        assert_eq!(row.get("deleted_at"), Some(&CellValue::Null));
        assert_eq!(row.get("missing"), None);
    }
}
