//! In-memory backend
//!
//! [`MemoryDatabase`] keeps tables as plain rows behind a mutex and enforces
//! primary key uniqueness and foreign keys, which is enough to exercise the
//! loader, exporter and assertion engine without a server. Raw statements are
//! recorded but not interpreted, and snapshots only support whole tables.

use std::sync::{Mutex, MutexGuard};
use log::debug;

use dbtest_core::database::{DatabaseConnection, DatabaseProvider, ForeignKey};
use dbtest_core::error::{Result, ToolboxError};
use dbtest_core::models::{CellValue, Row, Table};

/// In-process database
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: Vec<MemoryTable>,
    foreign_keys: Vec<(String, ForeignKey)>,
    executed: Vec<String>,
}

#[derive(Debug)]
struct MemoryTable {
    schema: String,
    name: String,
    primary_key: Vec<String>,
    rows: Vec<Row>,
}

fn key_matches(stored: &Row, row: &Row, key: &[String]) -> bool {
    key.iter().all(|column| cell(stored, column) == cell(row, column))
}

static NULL: CellValue = CellValue::Null;

/// Cell of `column`, NULL when the row does not carry it
fn cell<'r>(row: &'r Row, column: &str) -> &'r CellValue {
    row.get(column).unwrap_or(&NULL)
}

impl MemoryState {
    fn position(&self, schema: &str, table: &str) -> Result<usize> {
        let (schema, table) = table.split_once('.').unwrap_or((schema, table));
        self.tables
            .iter()
            .position(|t| t.schema.eq_ignore_ascii_case(schema) && t.name.eq_ignore_ascii_case(table))
            .ok_or_else(|| {
                ToolboxError::Database(format!("relation \"{}.{}\" does not exist", schema, table))
            })
    }

    /// Foreign keys of `schema` whose child table is `table`
    fn outgoing<'s>(&'s self, schema: &'s str, table: &'s str) -> impl Iterator<Item = &'s ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(move |(s, key)| s.eq_ignore_ascii_case(schema) && key.table.eq_ignore_ascii_case(table))
            .map(|(_, key)| key)
    }

    /// Foreign keys of `schema` whose parent table is `table`
    fn incoming<'s>(&'s self, schema: &'s str, table: &'s str) -> impl Iterator<Item = &'s ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(move |(s, key)| {
                s.eq_ignore_ascii_case(schema) && key.referenced_table.eq_ignore_ascii_case(table)
            })
            .map(|(_, key)| key)
    }

    fn check_references(&self, index: usize, row: &Row) -> Result<()> {
        let table = &self.tables[index];
        for key in self.outgoing(&table.schema, &table.name) {
            let value = cell(row, &key.column);
            if value.is_null() {
                continue;
            }
            let parent = self.position(&table.schema, &key.referenced_table)?;
            let found = self.tables[parent]
                .rows
                .iter()
                .any(|parent_row| cell(parent_row, &key.referenced_column) == value);
            // Self references may point at the row being inserted
            let self_match = key.is_self_reference() && cell(row, &key.referenced_column) == value;
            if !found && !self_match {
                return Err(ToolboxError::Database(format!(
                    "insert or update on table \"{}\" violates foreign key on column {}",
                    table.name, key.column
                )));
            }
        }
        Ok(())
    }

    fn check_not_referenced(&self, index: usize, removed: &[&Row]) -> Result<()> {
        let table = &self.tables[index];
        for key in self.incoming(&table.schema, &table.name) {
            let child = self.position(&table.schema, &key.table)?;
            for removed_row in removed {
                let value = cell(removed_row, &key.referenced_column);
                if value.is_null() {
                    continue;
                }
                let referenced = self.tables[child].rows.iter().any(|child_row| {
                    cell(child_row, &key.column) == value
                        && !(child == index && removed.iter().any(|r| std::ptr::eq(*r, child_row)))
                });
                if referenced {
                    return Err(ToolboxError::Database(format!(
                        "delete on table \"{}\" violates foreign key from table \"{}\"",
                        table.name, key.table
                    )));
                }
            }
        }
        Ok(())
    }
}

impl MemoryDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table in `schema`. An empty `primary_key` declares a table
    /// without key.
    pub fn create_table(&self, schema: &str, name: &str, primary_key: &[&str]) -> Result<()> {
        let mut state = self.lock()?;
        if state.position(schema, name).is_ok() {
            return Err(ToolboxError::Database(format!("relation \"{}\" already exists", name)));
        }
        state.tables.push(MemoryTable {
            schema: schema.to_string(),
            name: name.to_string(),
            primary_key: primary_key.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        });
        Ok(())
    }

    /// Declare a foreign key between two tables of `schema`
    pub fn declare_foreign_key(&self, schema: &str, key: ForeignKey) -> Result<()> {
        let mut state = self.lock()?;
        state.position(schema, &key.table)?;
        state.position(schema, &key.referenced_table)?;
        state.foreign_keys.push((schema.to_string(), key));
        Ok(())
    }

    /// Current rows of a table
    pub fn rows(&self, schema: &str, table: &str) -> Result<Vec<Row>> {
        let state = self.lock()?;
        let index = state.position(schema, table)?;
        Ok(state.tables[index].rows.clone())
    }

    /// Raw statements received so far
    pub fn executed(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.executed.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| ToolboxError::Database("in-memory database lock poisoned".to_string()))
    }
}

impl DatabaseProvider for MemoryDatabase {
    fn connect(&self, schema: &str) -> Result<Box<dyn DatabaseConnection + '_>> {
        debug!("Opening in-memory connection on schema {}", schema);
        Ok(Box::new(MemoryConnection {
            database: self,
            schema: schema.to_string(),
        }))
    }
}

/// Connection to a [`MemoryDatabase`]
pub struct MemoryConnection<'a> {
    database: &'a MemoryDatabase,
    schema: String,
}

impl DatabaseConnection for MemoryConnection<'_> {
    fn schema(&self) -> &str {
        &self.schema
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        debug!("Recording statement: {}", sql);
        self.database.lock()?.executed.push(sql.to_string());
        Ok(0)
    }

    fn fetch_table(&mut self, table: &str, query: Option<&str>) -> Result<Table> {
        if query.is_some() {
            return Err(ToolboxError::Database(format!(
                "custom snapshot queries are not supported in memory (table {})",
                table
            )));
        }
        let rows = self.database.rows(&self.schema, table)?;
        Ok(Table::with_rows(table, rows))
    }

    fn primary_keys(&mut self, table: &str) -> Result<Vec<String>> {
        let state = self.database.lock()?;
        let index = state.position(&self.schema, table)?;
        Ok(state.tables[index].primary_key.clone())
    }

    fn foreign_keys(&mut self) -> Result<Vec<ForeignKey>> {
        let state = self.database.lock()?;
        Ok(state
            .foreign_keys
            .iter()
            .filter(|(schema, _)| schema.eq_ignore_ascii_case(&self.schema))
            .map(|(_, key)| key.clone())
            .collect())
    }

    fn insert_row(&mut self, table: &str, row: &Row) -> Result<u64> {
        let mut state = self.database.lock()?;
        let index = state.position(&self.schema, table)?;

        let target = &state.tables[index];
        if !target.primary_key.is_empty()
            && target.rows.iter().any(|stored| key_matches(stored, row, &target.primary_key))
        {
            return Err(ToolboxError::Database(format!(
                "duplicate key value violates primary key of \"{}\"",
                target.name
            )));
        }
        state.check_references(index, row)?;

        state.tables[index].rows.push(row.clone());
        Ok(1)
    }

    fn update_row(&mut self, table: &str, row: &Row, key: &[String]) -> Result<u64> {
        let mut state = self.database.lock()?;
        let index = state.position(&self.schema, table)?;
        check_key(table, row, key)?;
        state.check_references(index, row)?;

        let mut updated = 0;
        for stored in state.tables[index].rows.iter_mut() {
            if !key_matches(stored, row, key) {
                continue;
            }
            for (column, value) in row.cells() {
                stored.set(column, value.clone());
            }
            updated += 1;
        }
        Ok(updated)
    }

    fn delete_row(&mut self, table: &str, row: &Row, key: &[String]) -> Result<u64> {
        let mut state = self.database.lock()?;
        let index = state.position(&self.schema, table)?;
        check_key(table, row, key)?;

        let target = &state.tables[index];
        let removed: Vec<&Row> = target
            .rows
            .iter()
            .filter(|stored| key_matches(stored, row, key))
            .collect();
        state.check_not_referenced(index, &removed)?;

        let target = &mut state.tables[index];
        let before = target.rows.len();
        target.rows.retain(|stored| !key_matches(stored, row, key));
        Ok((before - target.rows.len()) as u64)
    }

    fn delete_all(&mut self, table: &str) -> Result<u64> {
        let mut state = self.database.lock()?;
        let index = state.position(&self.schema, table)?;

        let removed: Vec<&Row> = state.tables[index].rows.iter().collect();
        state.check_not_referenced(index, &removed)?;

        let target = &mut state.tables[index];
        let count = target.rows.len() as u64;
        target.rows.clear();
        Ok(count)
    }

    fn truncate(&mut self, table: &str) -> Result<()> {
        self.delete_all(table).map(|_| ())
    }
}

fn check_key(table: &str, row: &Row, key: &[String]) -> Result<()> {
    if key.is_empty() {
        return Err(ToolboxError::NoPrimaryKey(table.to_string()));
    }
    match key.iter().find(|column| !row.contains(column)) {
        Some(column) => Err(ToolboxError::MissingKeyColumn {
            table: table.to_string(),
            column: column.clone(),
        }),
        None => Ok(()),
    }
}
