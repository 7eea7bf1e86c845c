//! Database boundary
//!
//! The engine never opens connections itself. A [`DatabaseProvider`] hands out
//! a [`DatabaseConnection`] scoped to one schema, and the loader, exporter and
//! assertion engine work exclusively through it. Row level writes have default
//! implementations that render SQL with the connection's dialect; backends
//! that do not speak SQL override them.

use serde::{Serialize, Deserialize};

use crate::error::Result;
use crate::models::{Row, Table};
use crate::sql::{PostgresDialect, SqlDialect, StatementBuilder};

/// Foreign key column of one table referencing a column of another
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Referencing (child) table
    pub table: String,

    /// Referencing column
    pub column: String,

    /// Referenced (parent) table
    pub referenced_table: String,

    /// Referenced column
    pub referenced_column: String,
}

impl ForeignKey {
    /// Create a foreign key description
    pub fn new(
        table: impl Into<String>,
        column: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }

    /// Whether the key references its own table
    pub fn is_self_reference(&self) -> bool {
        self.table.eq_ignore_ascii_case(&self.referenced_table)
    }
}

/// Live connection scoped to one schema
pub trait DatabaseConnection {
    /// Schema every unqualified table name resolves in
    fn schema(&self) -> &str;

    /// SQL conventions of the backend
    fn dialect(&self) -> &dyn SqlDialect {
        &PostgresDialect
    }

    /// Execute a raw statement, returning the number of affected rows
    fn execute(&mut self, sql: &str) -> Result<u64>;

    /// Fetch a table as text cells. `None` selects the whole table; otherwise
    /// the query result is named after `table`. NULL results are
    /// `CellValue::Null`.
    fn fetch_table(&mut self, table: &str, query: Option<&str>) -> Result<Table>;

    /// Primary key columns of `table`, in key order. Empty when the table has
    /// no primary key.
    fn primary_keys(&mut self, table: &str) -> Result<Vec<String>>;

    /// Every foreign key declared in the schema
    fn foreign_keys(&mut self) -> Result<Vec<ForeignKey>>;

    /// Insert one row
    fn insert_row(&mut self, table: &str, row: &Row) -> Result<u64> {
        let sql = StatementBuilder::new(self.dialect(), self.schema()).insert(table, row);
        self.execute(&sql)
    }

    /// Update the row matched by `key`, returning the number of rows updated
    fn update_row(&mut self, table: &str, row: &Row, key: &[String]) -> Result<u64> {
        let sql = StatementBuilder::new(self.dialect(), self.schema()).update(table, row, key)?;
        self.execute(&sql)
    }

    /// Delete the row matched by `key`
    fn delete_row(&mut self, table: &str, row: &Row, key: &[String]) -> Result<u64> {
        let sql = StatementBuilder::new(self.dialect(), self.schema()).delete(table, row, key)?;
        self.execute(&sql)
    }

    /// Delete every row of `table`
    fn delete_all(&mut self, table: &str) -> Result<u64> {
        let sql = StatementBuilder::new(self.dialect(), self.schema()).delete_all(table);
        self.execute(&sql)
    }

    /// Truncate `table`
    fn truncate(&mut self, table: &str) -> Result<()> {
        let sql = StatementBuilder::new(self.dialect(), self.schema()).truncate(table);
        self.execute(&sql).map(|_| ())
    }
}

/// Source of schema scoped connections
pub trait DatabaseProvider {
    /// Open a connection whose unqualified names resolve in `schema`
    fn connect(&self, schema: &str) -> Result<Box<dyn DatabaseConnection + '_>>;
}

impl<P: DatabaseProvider + ?Sized> DatabaseProvider for &P {
    fn connect(&self, schema: &str) -> Result<Box<dyn DatabaseConnection + '_>> {
        (**self).connect(schema)
    }
}
