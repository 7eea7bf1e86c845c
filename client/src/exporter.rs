//! Snapshot export
//!
//! The exporter reads the current state of a set of tables into a [`Dataset`],
//! optionally persisting it as flat XML alongside its structure descriptor.
//! It knows nothing about assertions.

use std::path::Path;
use std::time::Duration;
use log::{debug, info};

use dbtest_core::database::DatabaseProvider;
use dbtest_core::error::Result;
use dbtest_core::models::Dataset;
use dbtest_core::utils::{FileAccess, LocalFileAccess, Timer};
use dbtest_core::xml;

/// Ordered table → query mapping. A table without query is exported whole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQueries {
    entries: Vec<(String, Option<String>)>,
}

impl TableQueries {
    /// Empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Whole-table export of every table of `tables`
    pub fn whole_tables<S: AsRef<str>>(tables: &[S]) -> Self {
        tables
            .iter()
            .fold(Self::new(), |queries, table| queries.whole_table(table.as_ref()))
    }

    /// Export `table` whole
    pub fn whole_table(self, table: impl Into<String>) -> Self {
        self.insert(table.into(), None)
    }

    /// Export `table` as the result of `query`. A blank query exports the
    /// whole table.
    pub fn with_query(self, table: impl Into<String>, query: impl Into<String>) -> Self {
        let query = query.into();
        let query = if query.trim().is_empty() { None } else { Some(query) };
        self.insert(table.into(), query)
    }

    /// Table names in export order
    pub fn table_names(&self) -> Vec<&str> {
        self.entries.iter().map(|(table, _)| table.as_str()).collect()
    }

    /// Tables with their query, in export order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(table, query)| (table.as_str(), query.as_deref()))
    }

    /// Number of tables
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no table is listed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // A table listed again keeps its position and takes the new query
    fn insert(mut self, table: String, query: Option<String>) -> Self {
        match self.entries.iter_mut().find(|(name, _)| *name == table) {
            Some(entry) => entry.1 = query,
            None => self.entries.push((table, query)),
        }
        self
    }
}

impl<S: Into<String>> FromIterator<(S, Option<S>)> for TableQueries {
    fn from_iter<I: IntoIterator<Item = (S, Option<S>)>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |queries, (table, query)| match query {
            Some(query) => queries.with_query(table, query),
            None => queries.whole_table(table),
        })
    }
}

/// Reads table snapshots out of a database
pub struct SnapshotExporter<P, F = LocalFileAccess> {
    provider: P,
    files: F,
    slow_threshold: Option<Duration>,
}

impl<P: DatabaseProvider> SnapshotExporter<P> {
    /// Exporter writing to the local filesystem
    pub fn new(provider: P) -> Self {
        Self::with_files(provider, LocalFileAccess)
    }
}

impl<P: DatabaseProvider, F: FileAccess> SnapshotExporter<P, F> {
    /// Exporter writing through `files`
    pub fn with_files(provider: P, files: F) -> Self {
        Self {
            provider,
            files,
            slow_threshold: None,
        }
    }

    /// Log snapshots slower than `threshold` at warn level
    pub fn with_slow_threshold(mut self, threshold: Option<Duration>) -> Self {
        self.slow_threshold = threshold;
        self
    }

    /// Snapshot every table of `queries`, in order
    pub fn snapshot(&self, schema: &str, queries: &TableQueries) -> Result<Dataset> {
        let timer = Timer::start(format!("Snapshot of {}", schema))
            .with_slow_threshold(self.slow_threshold);
        let mut connection = self.provider.connect(schema)?;

        let mut dataset = Dataset::new();
        for (table, query) in queries.iter() {
            let snapshot = connection.fetch_table(table, query)?;
            debug!("Fetched {} rows from {}", snapshot.row_count(), table);
            dataset.push_table(snapshot)?;
        }

        timer.finish(format_args!("of {} tables", dataset.len()));
        Ok(dataset)
    }

    /// Snapshot and write the dataset to `destination`
    pub fn snapshot_and_persist(
        &self,
        schema: &str,
        queries: &TableQueries,
        destination: &Path,
    ) -> Result<Dataset> {
        let dataset = self.snapshot(schema, queries)?;
        self.persist(&xml::encode(&dataset)?, destination)?;
        info!("Exported {} tables to {}", dataset.len(), destination.display());
        Ok(dataset)
    }

    /// Snapshot, write the dataset to `destination` and its structure
    /// descriptor to `structure_destination`
    pub fn snapshot_and_persist_with_structure(
        &self,
        schema: &str,
        queries: &TableQueries,
        destination: &Path,
        structure_destination: &Path,
    ) -> Result<Dataset> {
        let dataset = self.snapshot_and_persist(schema, queries, destination)?;
        self.persist(&xml::write_structure(&dataset), structure_destination)?;
        debug!("Wrote structure of {} to {}", schema, structure_destination.display());
        Ok(dataset)
    }

    fn persist(&self, contents: &str, destination: &Path) -> Result<()> {
        self.files.ensure_parent_dir(destination)?;
        self.files.write_string(destination, contents)
    }
}
