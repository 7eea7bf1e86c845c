//! Dataset representation
//!
//! A dataset is an ordered collection of uniquely named tables. Order matters:
//! write operations visit tables in the order they appear here.

use serde::{Serialize, Deserialize};

use crate::error::{Result, ToolboxError};
use super::row::Row;
use super::table::Table;

/// An ordered set of tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Tables in order; names are unique ignoring case
    tables: Vec<Table>,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dataset from tables, rejecting duplicate names
    pub fn from_tables(tables: Vec<Table>) -> Result<Self> {
        let mut dataset = Dataset::new();
        for table in tables {
            dataset.push_table(table)?;
        }
        Ok(dataset)
    }

    /// Append a table
    pub fn push_table(&mut self, table: Table) -> Result<()> {
        if self.table(table.name()).is_some() {
            return Err(ToolboxError::DuplicateTable(table.name().to_string()));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Append a row to the named table, creating the table at the end of the
    /// dataset if it does not exist yet
    pub fn push_row(&mut self, table_name: &str, row: Row) {
        self.table_or_insert(table_name).push(row);
    }

    /// Get the named table, creating an empty one if needed
    pub fn table_or_insert(&mut self, table_name: &str) -> &mut Table {
        let index = match self.position(table_name) {
            Some(index) => index,
            None => {
                self.tables.push(Table::new(table_name));
                self.tables.len() - 1
            }
        };
        &mut self.tables[index]
    }

    /// Get a table by name (case-insensitive)
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.position(name).map(|index| &self.tables[index])
    }

    /// Tables in order
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Mutable tables in order
    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.tables.iter_mut()
    }

    /// Table names in order
    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(Table::name).collect()
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Whether the dataset has no tables
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Total number of rows across all tables
    pub fn row_count(&self) -> usize {
        self.tables.iter().map(Table::row_count).sum()
    }

    /// Rearrange tables into the given order. Every table must be named
    /// exactly once.
    pub fn reordered<S: AsRef<str>>(mut self, order: &[S]) -> Result<Self> {
        if order.len() != self.tables.len() {
            return Err(ToolboxError::Config(format!(
                "table order lists {} tables, dataset has {}",
                order.len(),
                self.tables.len()
            )));
        }

        let mut tables = Vec::with_capacity(order.len());
        for name in order {
            let name = name.as_ref();
            let index = self.position(name).ok_or_else(|| {
                ToolboxError::Config(format!("table {} is not part of the dataset", name))
            })?;
            tables.push(self.tables.remove(index));
        }

        Ok(Dataset { tables })
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.tables.iter().position(|table| table.is_named(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_and_orders() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.push_row("users", Row::new().with("id", "1"));
        dataset.push_row("orders", Row::new().with("id", "10").with("user_id", "1"));
        dataset.push_row("USERS", Row::new().with("id", "2"));
        dataset
    }

    #[test]
    fn test_push_row_merges_case_insensitively() {
        let dataset = users_and_orders();

        assert_eq!(dataset.table_names(), vec!["users", "orders"]);
        assert_eq!(dataset.table("Users").map(Table::row_count), Some(2));
        assert_eq!(dataset.row_count(), 3);
    }

    #[test]
    fn test_duplicate_table_rejected() {
        let result = Dataset::from_tables(vec![Table::new("users"), Table::new("Users")]);

        match result {
            Err(ToolboxError::DuplicateTable(name)) => assert_eq!(name, "Users"),
            other => panic!("Expected DuplicateTable, got {:?}", other),
        }
    }

    #[test]
    fn test_reordered() {
        let dataset = users_and_orders().reordered(&["orders", "users"]).unwrap();
        assert_eq!(dataset.table_names(), vec!["orders", "users"]);

        assert!(users_and_orders().reordered(&["orders"]).is_err());
        assert!(users_and_orders().reordered(&["orders", "items"]).is_err());
    }
}
