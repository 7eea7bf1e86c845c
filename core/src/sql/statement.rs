//! Write statement rendering
//!
//! Renders the per-row statements used by the fixture loader. Values are
//! embedded as dialect literals so that the server coerces the text to each
//! column's native type.

use crate::error::{Result, ToolboxError};
use crate::models::{CellValue, Row};
use super::dialect::SqlDialect;

/// Renders write statements for tables of one schema
pub struct StatementBuilder<'a> {
    dialect: &'a dyn SqlDialect,
    schema: &'a str,
}

impl<'a> StatementBuilder<'a> {
    /// Create a builder for `schema`
    pub fn new(dialect: &'a dyn SqlDialect, schema: &'a str) -> Self {
        Self { dialect, schema }
    }

    /// `INSERT` of the columns the row carries
    pub fn insert(&self, table: &str, row: &Row) -> String {
        if row.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES", self.table(table));
        }

        let columns: Vec<String> = row
            .columns()
            .map(|column| self.dialect.quote_identifier(column))
            .collect();
        let values: Vec<String> = row
            .cells()
            .map(|(_, value)| self.dialect.literal(value))
            .collect();

        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table(table),
            columns.join(", "),
            values.join(", ")
        )
    }

    /// `UPDATE` of the row's non-key columns, matched by key. A row made of
    /// key columns only assigns the key to itself, so the affected row count
    /// still tells whether the row exists.
    pub fn update(&self, table: &str, row: &Row, key: &[String]) -> Result<String> {
        let predicate = self.key_predicate(table, row, key)?;

        let mut assignments: Vec<String> = row
            .cells()
            .filter(|(column, _)| !key.iter().any(|k| k.eq_ignore_ascii_case(column)))
            .map(|(column, value)| {
                format!(
                    "{} = {}",
                    self.dialect.quote_identifier(column),
                    self.dialect.literal(value)
                )
            })
            .collect();

        if assignments.is_empty() {
            assignments = key
                .iter()
                .map(|column| {
                    let quoted = self.dialect.quote_identifier(column);
                    format!("{} = {}", quoted, quoted)
                })
                .collect();
        }

        Ok(format!(
            "UPDATE {} SET {} WHERE {}",
            self.table(table),
            assignments.join(", "),
            predicate
        ))
    }

    /// `DELETE` of the row matched by key
    pub fn delete(&self, table: &str, row: &Row, key: &[String]) -> Result<String> {
        let predicate = self.key_predicate(table, row, key)?;
        Ok(format!("DELETE FROM {} WHERE {}", self.table(table), predicate))
    }

    /// `DELETE` of every row
    pub fn delete_all(&self, table: &str) -> String {
        format!("DELETE FROM {}", self.table(table))
    }

    /// `TRUNCATE` of the table
    pub fn truncate(&self, table: &str) -> String {
        format!("TRUNCATE TABLE {}", self.table(table))
    }

    fn table(&self, table: &str) -> String {
        self.dialect.qualified_table(self.schema, table)
    }

    fn key_predicate(&self, table: &str, row: &Row, key: &[String]) -> Result<String> {
        if key.is_empty() {
            return Err(ToolboxError::NoPrimaryKey(table.to_string()));
        }

        let mut conditions = Vec::with_capacity(key.len());
        for column in key {
            let value = row.get(column).ok_or_else(|| ToolboxError::MissingKeyColumn {
                table: table.to_string(),
                column: column.clone(),
            })?;
            let quoted = self.dialect.quote_identifier(column);
            conditions.push(match value {
                CellValue::Null => format!("{} IS NULL", quoted),
                CellValue::Text(_) => format!("{} = {}", quoted, self.dialect.literal(value)),
            });
        }

        Ok(conditions.join(" AND "))
    }
}
