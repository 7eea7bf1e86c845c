//! Fixture loading
//!
//! The loader writes a dataset into a schema with one [`Operation`], table by
//! table in dataset order. Any database error aborts the load at once; rows
//! already written stay written.

use std::path::Path;
use std::time::Duration;
use log::{debug, info};

use dbtest_core::database::{DatabaseConnection, DatabaseProvider};
use dbtest_core::error::{Result, ToolboxError};
use dbtest_core::models::{Dataset, Operation, Table};
use dbtest_core::schema::DependencyGraph;
use dbtest_core::substitution::SubstitutionMap;
use dbtest_core::utils::{FileAccess, LocalFileAccess, Timer};
use dbtest_core::xml;

/// Where a dataset comes from
#[derive(Debug, Clone)]
pub enum DatasetSource<'a> {
    /// Dataset already in memory
    Dataset(Dataset),

    /// Flat XML document
    Xml(&'a str),

    /// Flat XML file
    File(&'a Path),
}

impl<'a> DatasetSource<'a> {
    /// Decode the source into a dataset
    pub fn resolve(self, files: &impl FileAccess) -> Result<Dataset> {
        match self {
            DatasetSource::Dataset(dataset) => Ok(dataset),
            DatasetSource::Xml(document) => xml::decode(document),
            DatasetSource::File(path) => {
                debug!("Reading dataset {}", path.display());
                xml::decode(&files.read_to_string(path)?)
            }
        }
    }
}

impl From<Dataset> for DatasetSource<'_> {
    fn from(dataset: Dataset) -> Self {
        DatasetSource::Dataset(dataset)
    }
}

impl<'a> From<&'a Path> for DatasetSource<'a> {
    fn from(path: &'a Path) -> Self {
        DatasetSource::File(path)
    }
}

/// Outcome of a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Number of dataset tables processed
    pub tables: usize,

    /// Rows inserted, updated or deleted
    pub rows_affected: u64,
}

/// Writes datasets into a database
pub struct FixtureLoader<P, F = LocalFileAccess> {
    provider: P,
    files: F,
    slow_threshold: Option<Duration>,
}

impl<P: DatabaseProvider> FixtureLoader<P> {
    /// Loader reading files from the local filesystem
    pub fn new(provider: P) -> Self {
        Self::with_files(provider, LocalFileAccess)
    }
}

impl<P: DatabaseProvider, F: FileAccess> FixtureLoader<P, F> {
    /// Loader reading files through `files`
    pub fn with_files(provider: P, files: F) -> Self {
        Self {
            provider,
            files,
            slow_threshold: None,
        }
    }

    /// Log loads slower than `threshold` at warn level
    pub fn with_slow_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Apply `operation` with every table of `source`, in dataset order
    pub fn load<'s>(
        &self,
        source: impl Into<DatasetSource<'s>>,
        schema: &str,
        operation: Operation,
    ) -> Result<LoadSummary> {
        let dataset = source.into().resolve(&self.files)?;
        let mut connection = self.provider.connect(schema)?;
        self.apply(connection.as_mut(), &dataset, operation)
    }

    /// Replace placeholders of `source` through `substitutions`, then load it
    pub fn load_with_substitution<'s>(
        &self,
        source: impl Into<DatasetSource<'s>>,
        substitutions: &SubstitutionMap,
        schema: &str,
        operation: Operation,
    ) -> Result<LoadSummary> {
        let dataset = substitutions.apply(source.into().resolve(&self.files)?);
        let mut connection = self.provider.connect(schema)?;
        self.apply(connection.as_mut(), &dataset, operation)
    }

    /// Load with tables reordered along the schema's foreign keys, parents
    /// first
    pub fn load_ordered<'s>(
        &self,
        source: impl Into<DatasetSource<'s>>,
        schema: &str,
        operation: Operation,
    ) -> Result<LoadSummary> {
        let dataset = source.into().resolve(&self.files)?;
        let mut connection = self.provider.connect(schema)?;

        let foreign_keys = connection.foreign_keys()?;
        let order = DependencyGraph::new(&dataset.table_names(), &foreign_keys).insertion_order()?;
        let dataset = dataset.reordered(&order)?;

        self.apply(connection.as_mut(), &dataset, operation)
    }

    /// Run a raw SQL script in `schema`
    pub fn execute_sql(&self, schema: &str, sql: &str) -> Result<u64> {
        let mut connection = self.provider.connect(schema)?;
        let affected = connection.execute(sql)?;
        debug!("Executed SQL in {}: {} rows affected", schema, affected);
        Ok(affected)
    }

    fn apply(
        &self,
        connection: &mut dyn DatabaseConnection,
        dataset: &Dataset,
        operation: Operation,
    ) -> Result<LoadSummary> {
        let timer = Timer::start(format!("{} into {}", operation, connection.schema()))
            .with_slow_threshold(self.slow_threshold);
        let mut summary = LoadSummary {
            tables: dataset.len(),
            rows_affected: 0,
        };

        if operation.empties_tables() {
            // Children are emptied before the tables they reference
            for table in dataset.tables().iter().rev() {
                summary.rows_affected += match operation {
                    Operation::Truncate => connection.truncate(table.name()).map(|_| 0)?,
                    _ => connection.delete_all(table.name())?,
                };
                debug!("Emptied table {}", table.name());
            }
        }

        for table in dataset.tables() {
            let affected = match operation {
                Operation::Insert | Operation::CleanInsert => insert_rows(connection, table)?,
                Operation::Update | Operation::Delete | Operation::Refresh => {
                    write_by_key(connection, table, operation)?
                }
                Operation::DeleteAll | Operation::Truncate => continue,
            };
            debug!("{} {}: {} rows", operation, table.name(), affected);
            summary.rows_affected += affected;
        }

        timer.finish(format_args!("{} rows", summary.rows_affected));
        info!(
            "Loaded {} tables with {}: {} rows affected",
            summary.tables, operation, summary.rows_affected
        );
        Ok(summary)
    }
}

fn insert_rows(connection: &mut dyn DatabaseConnection, table: &Table) -> Result<u64> {
    let mut affected = 0;
    for row in table.rows() {
        affected += connection.insert_row(table.name(), row)?;
    }
    Ok(affected)
}

fn write_by_key(
    connection: &mut dyn DatabaseConnection,
    table: &Table,
    operation: Operation,
) -> Result<u64> {
    if table.is_empty() {
        return Ok(0);
    }

    let key = connection.primary_keys(table.name())?;
    if key.is_empty() {
        return Err(ToolboxError::NoPrimaryKey(table.name().to_string()));
    }

    let mut affected = 0;
    for row in table.rows() {
        affected += match operation {
            Operation::Update => connection.update_row(table.name(), row, &key)?,
            Operation::Delete => connection.delete_row(table.name(), row, &key)?,
            _ => match connection.update_row(table.name(), row, &key)? {
                0 => connection.insert_row(table.name(), row)?,
                updated => updated,
            },
        };
    }
    Ok(affected)
}
