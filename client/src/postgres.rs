//! PostgreSQL backend
//!
//! Connections use the synchronous `postgres` client. Snapshots go through the
//! simple query protocol, which returns every value in its text form whatever
//! the column type, so no per-type decoding is needed.

use log::{debug, info};
use postgres::{Client, Config, NoTls, SimpleQueryMessage};

use dbtest_core::config::DatabaseConfig;
use dbtest_core::database::{DatabaseConnection, DatabaseProvider, ForeignKey};
use dbtest_core::error::{to_database_error, Result};
use dbtest_core::models::{CellValue, Row, Table};
use dbtest_core::sql::{PostgresDialect, SqlDialect};

/// Opens schema scoped connections to a PostgreSQL server
pub struct PgProvider {
    /// Connection parameters
    config: Config,

    /// SQL conventions
    dialect: Box<dyn SqlDialect>,
}

impl PgProvider {
    /// Provider for the server described by `database`
    pub fn new(database: &DatabaseConfig) -> Self {
        let mut config = Config::new();
        config
            .host(&database.host)
            .port(database.port)
            .user(&database.user)
            .dbname(&database.dbname)
            .connect_timeout(database.connect_timeout)
            .application_name(&database.application_name);
        if let Some(password) = &database.password {
            config.password(password);
        }

        Self {
            config,
            dialect: Box::new(PostgresDialect),
        }
    }

    /// Provider for a `host=... user=...` or `postgresql://` connection string
    pub fn from_connection_string(connection_string: &str) -> Result<Self> {
        let config = connection_string.parse::<Config>().map_err(to_database_error)?;
        Ok(Self {
            config,
            dialect: Box::new(PostgresDialect),
        })
    }

    /// Replace the SQL conventions
    pub fn with_dialect(mut self, dialect: impl SqlDialect + 'static) -> Self {
        self.dialect = Box::new(dialect);
        self
    }
}

impl DatabaseProvider for PgProvider {
    fn connect(&self, schema: &str) -> Result<Box<dyn DatabaseConnection + '_>> {
        let mut client = self.config.connect(NoTls).map_err(to_database_error)?;
        client
            .batch_execute(&self.dialect.set_schema(schema))
            .map_err(to_database_error)?;

        info!("Connected to {} with schema {}", self.dialect.name(), schema);
        Ok(Box::new(PgConnection {
            client,
            schema: schema.to_string(),
            dialect: self.dialect.as_ref(),
        }))
    }
}

/// Connection to a PostgreSQL server
pub struct PgConnection<'a> {
    client: Client,
    schema: String,
    dialect: &'a dyn SqlDialect,
}

impl PgConnection<'_> {
    /// Schema and table name as stored in the catalog
    fn catalog_table(&self, table: &str) -> (String, String) {
        match table.split_once('.') {
            Some((schema, table)) => (
                self.dialect.catalog_name(schema),
                self.dialect.catalog_name(table),
            ),
            None => (
                self.dialect.catalog_name(&self.schema),
                self.dialect.catalog_name(table),
            ),
        }
    }
}

impl DatabaseConnection for PgConnection<'_> {
    fn schema(&self) -> &str {
        &self.schema
    }

    fn dialect(&self) -> &dyn SqlDialect {
        self.dialect
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        debug!("Executing: {}", sql);
        let messages = self.client.simple_query(sql).map_err(to_database_error)?;

        let affected = messages
            .iter()
            .map(|message| match message {
                SimpleQueryMessage::CommandComplete(count) => *count,
                _ => 0,
            })
            .sum();
        Ok(affected)
    }

    fn fetch_table(&mut self, table: &str, query: Option<&str>) -> Result<Table> {
        let sql = match query {
            Some(query) => query.to_string(),
            None => self.dialect.select_all(&self.schema, table),
        };
        debug!("Fetching {}: {}", table, sql);

        let messages = self.client.simple_query(&sql).map_err(to_database_error)?;
        let mut result = Table::new(table);
        for message in messages {
            if let SimpleQueryMessage::Row(pg_row) = message {
                let mut row = Row::new();
                for (index, column) in pg_row.columns().iter().enumerate() {
                    let value = pg_row
                        .try_get(index)
                        .map_err(to_database_error)?
                        .map_or(CellValue::Null, CellValue::text);
                    row.try_push(column.name(), value)?;
                }
                result.push(row);
            }
        }
        Ok(result)
    }

    fn primary_keys(&mut self, table: &str) -> Result<Vec<String>> {
        let (schema, table) = self.catalog_table(table);
        let rows = self
            .client
            .query(self.dialect.primary_key_query(), &[&schema, &table])
            .map_err(to_database_error)?;

        rows.iter()
            .map(|row| row.try_get::<_, String>(0).map_err(to_database_error))
            .collect()
    }

    fn foreign_keys(&mut self) -> Result<Vec<ForeignKey>> {
        let schema = self.dialect.catalog_name(&self.schema);
        let rows = self
            .client
            .query(self.dialect.foreign_key_query(), &[&schema])
            .map_err(to_database_error)?;

        rows.iter()
            .map(|row| {
                Ok(ForeignKey::new(
                    row.try_get::<_, String>(0).map_err(to_database_error)?,
                    row.try_get::<_, String>(1).map_err(to_database_error)?,
                    row.try_get::<_, String>(2).map_err(to_database_error)?,
                    row.try_get::<_, String>(3).map_err(to_database_error)?,
                ))
            })
            .collect()
    }
}
