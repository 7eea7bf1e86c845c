//! Test facade
//!
//! [`DatabaseTest`] bundles everything a database test needs: its name, the
//! toolbox configuration, a provider and file access. Its methods never
//! return errors. Any failure panics, which fails the calling test with the
//! original description; mismatches report the selector with expected and
//! actual counts.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use log::error;

use dbtest_core::config::ToolboxConfig;
use dbtest_core::database::DatabaseProvider;
use dbtest_core::error::Result;
use dbtest_core::models::{Dataset, Operation};
use dbtest_core::pattern::RowPattern;
use dbtest_core::substitution::SubstitutionMap;
use dbtest_core::utils::{FileAccess, LocalFileAccess};

use crate::assertion::{AssertionEngine, AssertionReport};
use crate::exporter::{SnapshotExporter, TableQueries};
use crate::loader::{DatasetSource, FixtureLoader, LoadSummary};
use crate::logging::init_logging;

/// Database test context
pub struct DatabaseTest<P, F = LocalFileAccess> {
    name: String,
    config: ToolboxConfig,
    provider: P,
    files: F,
}

impl<P: DatabaseProvider> DatabaseTest<P> {
    /// Context for the test `name`, using the local filesystem
    pub fn new(name: impl Into<String>, config: ToolboxConfig, provider: P) -> Self {
        Self::with_files(name, config, provider, LocalFileAccess)
    }
}

impl<P: DatabaseProvider, F: FileAccess> DatabaseTest<P, F> {
    /// Context for the test `name`, using `files`
    pub fn with_files(name: impl Into<String>, config: ToolboxConfig, provider: P, files: F) -> Self {
        init_logging(&config);
        Self {
            name: name.into(),
            config,
            provider,
            files,
        }
    }

    /// Test name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configuration in use
    pub fn config(&self) -> &ToolboxConfig {
        &self.config
    }

    /// Root of the test resources
    pub fn resources_dir(&self) -> PathBuf {
        self.config.data.resources_dir.clone()
    }

    /// Data directory of this test
    pub fn data_dir(&self) -> PathBuf {
        self.config.data.test_dir(&self.name)
    }

    /// Data directory shared by every test
    pub fn common_data_dir(&self) -> PathBuf {
        self.config.data.common_path()
    }

    /// Dataset emptying the whole schema
    pub fn purge_dataset_path(&self) -> PathBuf {
        self.config.data.purge_dataset_path()
    }

    /// Loader bound to this test's provider and files
    pub fn loader(&self) -> FixtureLoader<&P, &F> {
        FixtureLoader::with_files(&self.provider, &self.files)
            .with_slow_threshold(self.config.slow_operation_threshold)
    }

    /// Exporter bound to this test's provider and files
    pub fn exporter(&self) -> SnapshotExporter<&P, &F> {
        SnapshotExporter::with_files(&self.provider, &self.files)
            .with_slow_threshold(self.config.slow_operation_threshold)
    }

    /// Assertion engine bound to this test
    pub fn assertions(&self) -> AssertionEngine<&P, &F> {
        AssertionEngine::with_files(&self.provider, &self.files, &self.name, self.config.work_dir())
    }

    /// Run raw SQL in `schema`
    pub fn exec_db(&self, schema: &str, sql: &str) -> u64 {
        self.check(self.loader().execute_sql(schema, sql))
    }

    /// Load an XML dataset with the default operation
    pub fn load_xml(&self, xml: &str, schema: &str) -> LoadSummary {
        self.load_xml_with_operation(xml, schema, self.config.default_operation)
    }

    /// Load an XML dataset with `operation`
    pub fn load_xml_with_operation(&self, xml: &str, schema: &str, operation: Operation) -> LoadSummary {
        self.check(self.loader().load(DatasetSource::Xml(xml), schema, operation))
    }

    /// Load an XML template after placeholder substitution, with the default
    /// operation
    pub fn load_xml_with_substitutions(
        &self,
        xml: &str,
        substitutions: &SubstitutionMap,
        schema: &str,
    ) -> LoadSummary {
        self.check(self.loader().load_with_substitution(
            DatasetSource::Xml(xml),
            substitutions,
            schema,
            self.config.default_operation,
        ))
    }

    /// Load an XML file with the default operation
    pub fn load_file(&self, path: impl AsRef<Path>, schema: &str) -> LoadSummary {
        self.load_file_with_operation(path, schema, self.config.default_operation)
    }

    /// Load an XML file with `operation`
    pub fn load_file_with_operation(
        &self,
        path: impl AsRef<Path>,
        schema: &str,
        operation: Operation,
    ) -> LoadSummary {
        self.check(self.loader().load(path.as_ref(), schema, operation))
    }

    /// Load an XML template file after placeholder substitution, with the
    /// default operation
    pub fn load_file_with_substitutions(
        &self,
        path: impl AsRef<Path>,
        substitutions: &SubstitutionMap,
        schema: &str,
    ) -> LoadSummary {
        self.check(self.loader().load_with_substitution(
            path.as_ref(),
            substitutions,
            schema,
            self.config.default_operation,
        ))
    }

    /// Load an XML file with tables ordered along foreign keys
    pub fn load_file_ordered(
        &self,
        path: impl AsRef<Path>,
        schema: &str,
        operation: Operation,
    ) -> LoadSummary {
        self.check(self.loader().load_ordered(path.as_ref(), schema, operation))
    }

    /// Export whole tables to `destination`
    pub fn export_tables<S: AsRef<str>>(
        &self,
        schema: &str,
        tables: &[S],
        destination: impl AsRef<Path>,
    ) -> Dataset {
        self.export_queries(schema, &TableQueries::whole_tables(tables), destination)
    }

    /// Export one whole table to `destination`
    pub fn export_table(&self, schema: &str, table: &str, destination: impl AsRef<Path>) -> Dataset {
        self.export_tables(schema, &[table], destination)
    }

    /// Export query results to `destination`
    pub fn export_queries(
        &self,
        schema: &str,
        queries: &TableQueries,
        destination: impl AsRef<Path>,
    ) -> Dataset {
        self.check(self.exporter().snapshot_and_persist(schema, queries, destination.as_ref()))
    }

    /// Export query results to `destination` and their structure descriptor
    /// to `structure_destination`
    pub fn export_queries_with_structure(
        &self,
        schema: &str,
        queries: &TableQueries,
        destination: impl AsRef<Path>,
        structure_destination: impl AsRef<Path>,
    ) -> Dataset {
        self.check(self.exporter().snapshot_and_persist_with_structure(
            schema,
            queries,
            destination.as_ref(),
            structure_destination.as_ref(),
        ))
    }

    /// Every pattern must match exactly `expected` rows
    pub fn assert_occurrence<S: AsRef<str>>(
        &self,
        schema: &str,
        tables: &[S],
        patterns: &[RowPattern],
        expected: usize,
    ) -> AssertionReport {
        self.check(self.assertions().assert_occurrence(schema, tables, patterns, expected))
    }

    /// Every pattern must match exactly one row
    pub fn assert_contains<S: AsRef<str>>(
        &self,
        schema: &str,
        tables: &[S],
        patterns: &[RowPattern],
    ) -> AssertionReport {
        self.check(self.assertions().assert_contains(schema, tables, patterns))
    }

    /// The pattern must match exactly one row of its table
    pub fn assert_contains_row(&self, schema: &str, pattern: &RowPattern) -> AssertionReport {
        self.check(self.assertions().assert_contains_row(schema, pattern))
    }

    /// No pattern may match any row
    pub fn assert_not_contains<S: AsRef<str>>(
        &self,
        schema: &str,
        tables: &[S],
        patterns: &[RowPattern],
    ) -> AssertionReport {
        self.check(self.assertions().assert_not_contains(schema, tables, patterns))
    }

    /// The pattern may not match any row of its table
    pub fn assert_not_contains_row(&self, schema: &str, pattern: &RowPattern) -> AssertionReport {
        self.check(self.assertions().assert_not_contains_row(schema, pattern))
    }

    fn check<T>(&self, result: Result<T>) -> T {
        match result {
            Ok(value) => value,
            Err(e) if e.is_assertion_mismatch() => self.fail(e),
            Err(e) => self.fail(format_args!("Unexpected error : {}", e)),
        }
    }

    fn fail(&self, message: impl Display) -> ! {
        error!("{}: {}", self.name, message);
        panic!("{}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDatabase;
    use dbtest_core::database::ForeignKey;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    fn context<'a>(database: &'a MemoryDatabase, dir: &TempDir) -> DatabaseTest<&'a MemoryDatabase> {
        let mut config = ToolboxConfig::testing();
        config.data.resources_dir = dir.path().join("resources");
        config.work_dir = Some(dir.path().join("work"));
        DatabaseTest::new("UserServiceTest", config, database)
    }

    fn database() -> MemoryDatabase {
        let database = MemoryDatabase::new();
        database.create_table("public", "users", &["id"]).unwrap();
        database.create_table("public", "orders", &["id"]).unwrap();
        database
            .declare_foreign_key("public", ForeignKey::new("orders", "user_id", "users", "id"))
            .unwrap();
        database
    }

    fn user(name: &str) -> RowPattern {
        RowPattern::builder("users").column("name", name).build()
    }

    #[test]
    fn test_data_directories() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);

        let resources = dir.path().join("resources");
        assert_eq!(test.resources_dir(), resources);
        assert_eq!(test.data_dir(), resources.join("data/UserServiceTest"));
        assert_eq!(test.common_data_dir(), resources.join("data/Common"));
        assert_eq!(test.purge_dataset_path(), resources.join("data/Common/schema_purge_ds.xml"));
    }

    #[test]
    fn test_load_and_assert() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);

        test.load_xml(r#"<dataset><users id="1" name="Alice"/></dataset>"#, "public");
        test.assert_contains_row("public", &user("Alice"));
        test.assert_not_contains_row("public", &user("Bob"));
        test.assert_occurrence("public", &["users", "orders"], &[RowPattern::any_row("orders")], 0);
    }

    #[test]
    fn test_load_file_with_substitutions() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);

        std::fs::create_dir_all(test.data_dir()).unwrap();
        let fixture = test.data_dir().join("users.xml");
        std::fs::write(&fixture, r#"<dataset><users id="${ID}" name="${NAME}"/></dataset>"#).unwrap();

        let substitutions = SubstitutionMap::builder().add("${ID}", "9").add("${NAME}", "Zoe").build();
        let summary = test.load_file_with_substitutions(&fixture, &substitutions, "public");

        assert_eq!(summary.rows_affected, 1);
        test.assert_contains("public", &["users"], &[user("Zoe")]);
    }

    #[test]
    fn test_load_file_ordered() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);

        let fixture = dir.path().join("orders.xml");
        std::fs::write(
            &fixture,
            r#"<dataset><orders id="1" user_id="1"/><users id="1" name="Alice"/></dataset>"#,
        )
        .unwrap();

        test.load_file_ordered(&fixture, "public", Operation::Insert);
        test.assert_contains_row("public", &RowPattern::builder("orders").column("user_id", "1").build());
    }

    #[test]
    fn test_export() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);
        test.load_xml(r#"<dataset><users id="1" name="Alice"/></dataset>"#, "public");

        let destination = dir.path().join("out/users.xml");
        let exported = test.export_table("public", "users", &destination);
        assert_eq!(exported.row_count(), 1);
        assert!(destination.is_file());

        let structure = dir.path().join("out/users.dtd");
        test.export_queries_with_structure(
            "public",
            &TableQueries::new().whole_table("users"),
            &destination,
            &structure,
        );
        assert!(structure.is_file());
    }

    #[test]
    fn test_exec_db() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);

        test.exec_db("public", "UPDATE users SET name = 'x'");
        assert_eq!(database.executed().unwrap(), vec!["UPDATE users SET name = 'x'".to_string()]);
    }

    #[test]
    #[should_panic(expected = "Unexpected number of occurrences of /dataset/users[@name=\"Bob\"]: expected 1, actual 0")]
    fn test_mismatch_panics() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);

        test.load_xml(r#"<dataset><users id="1" name="Alice"/></dataset>"#, "public");
        test.assert_contains_row("public", &user("Bob"));
    }

    #[test]
    #[should_panic(expected = "Unexpected error : Format error")]
    fn test_errors_panic() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);

        test.load_xml("<dataset><users", "public");
    }

    #[test]
    #[should_panic(expected = "Unexpected error : Filesystem error")]
    fn test_missing_file_panics() {
        let database = database();
        let dir = tempdir().unwrap();
        let test = context(&database, &dir);

        test.load_file(PathBuf::from("missing.xml"), "public");
    }
}
