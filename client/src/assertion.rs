//! Occurrence assertions
//!
//! An assertion snapshots whole tables into a uniquely named temporary file,
//! reads the file back and counts, for each [`RowPattern`], the rows its
//! selector matches. The first pattern whose count differs from the
//! expectation fails the assertion. The temporary file is removed whatever
//! the outcome; a failed removal is only logged.

use std::path::{Path, PathBuf};
use log::{debug, info, warn};

use dbtest_core::database::DatabaseProvider;
use dbtest_core::error::{Result, ToolboxError};
use dbtest_core::pattern::RowPattern;
use dbtest_core::utils::{temp_artifact_name, FileAccess, LocalFileAccess};
use dbtest_core::xml;

use crate::exporter::{SnapshotExporter, TableQueries};

/// Count observed for one pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternOutcome {
    /// Rendered selector
    pub selector: String,

    /// Number of matching rows
    pub actual: usize,
}

/// Outcome of a passed assertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionReport {
    /// Expected number of matches per pattern
    pub expected: usize,

    /// Per-pattern counts, in pattern order
    pub outcomes: Vec<PatternOutcome>,
}

impl AssertionReport {
    /// Whether no pattern was checked
    pub fn is_vacuous(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Checks database contents against row patterns
pub struct AssertionEngine<P, F = LocalFileAccess> {
    provider: P,
    files: F,
    test_name: String,
    work_dir: PathBuf,
}

impl<P: DatabaseProvider> AssertionEngine<P> {
    /// Engine writing temporary snapshots under `work_dir` on the local
    /// filesystem
    pub fn new(provider: P, test_name: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self::with_files(provider, LocalFileAccess, test_name, work_dir)
    }
}

impl<P: DatabaseProvider, F: FileAccess> AssertionEngine<P, F> {
    /// Engine writing temporary snapshots through `files`
    pub fn with_files(
        provider: P,
        files: F,
        test_name: impl Into<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            provider,
            files,
            test_name: test_name.into(),
            work_dir: work_dir.into(),
        }
    }

    /// Name of the test the engine works for
    pub fn test_name(&self) -> &str {
        &self.test_name
    }

    /// Directory receiving temporary snapshots
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Check that every pattern matches exactly `expected` rows in a fresh
    /// snapshot of `tables`
    pub fn assert_occurrence<S: AsRef<str>>(
        &self,
        schema: &str,
        tables: &[S],
        patterns: &[RowPattern],
        expected: usize,
    ) -> Result<AssertionReport> {
        if patterns.is_empty() {
            warn!(
                "{}: occurrence assertion without patterns passes without checking anything",
                self.test_name
            );
        }

        let artifact = self.work_dir.join(temp_artifact_name(&self.test_name, tables));
        let outcome = self.evaluate(schema, tables, patterns, expected, &artifact);

        if self.files.delete_quietly(&artifact) {
            debug!("Removed temporary snapshot {}", artifact.display());
        } else {
            warn!("Temporary snapshot {} was left behind", artifact.display());
        }

        outcome
    }

    /// Check that every pattern matches exactly one row
    pub fn assert_contains<S: AsRef<str>>(
        &self,
        schema: &str,
        tables: &[S],
        patterns: &[RowPattern],
    ) -> Result<AssertionReport> {
        self.assert_occurrence(schema, tables, patterns, 1)
    }

    /// Check that no pattern matches any row
    pub fn assert_not_contains<S: AsRef<str>>(
        &self,
        schema: &str,
        tables: &[S],
        patterns: &[RowPattern],
    ) -> Result<AssertionReport> {
        self.assert_occurrence(schema, tables, patterns, 0)
    }

    /// Check that the pattern's table holds exactly one matching row
    pub fn assert_contains_row(&self, schema: &str, pattern: &RowPattern) -> Result<AssertionReport> {
        self.assert_contains(schema, &[pattern.table()], std::slice::from_ref(pattern))
    }

    /// Check that the pattern's table holds no matching row
    pub fn assert_not_contains_row(
        &self,
        schema: &str,
        pattern: &RowPattern,
    ) -> Result<AssertionReport> {
        self.assert_not_contains(schema, &[pattern.table()], std::slice::from_ref(pattern))
    }

    fn evaluate<S: AsRef<str>>(
        &self,
        schema: &str,
        tables: &[S],
        patterns: &[RowPattern],
        expected: usize,
        artifact: &Path,
    ) -> Result<AssertionReport> {
        let exporter = SnapshotExporter::with_files(&self.provider, &self.files);
        exporter.snapshot_and_persist(schema, &TableQueries::whole_tables(tables), artifact)?;
        let snapshot = xml::decode(&self.files.read_to_string(artifact)?)?;

        let mut outcomes = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let selector = pattern.compile();
            let actual = selector.count(&snapshot);
            if actual != expected {
                info!(
                    "{}: {} matched {} rows, expected {}",
                    self.test_name, selector, actual, expected
                );
                return Err(ToolboxError::AssertionMismatch {
                    selector: selector.to_string(),
                    expected,
                    actual,
                });
            }
            outcomes.push(PatternOutcome {
                selector: selector.to_string(),
                actual,
            });
        }

        debug!("{}: {} patterns matched {} rows each", self.test_name, outcomes.len(), expected);
        Ok(AssertionReport { expected, outcomes })
    }
}
