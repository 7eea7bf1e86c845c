//! Configuration for the toolbox
//!
//! This module provides the connection settings of the database under test,
//! the layout of the test data directories and engine defaults. Configurations
//! are plain JSON documents.

use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Serialize, Deserialize};

use crate::error::{to_filesystem_error, Result};
use crate::models::Operation;

/// Connection settings of the database under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Login user
    pub user: String,

    /// Login password
    pub password: Option<String>,

    /// Database name
    pub dbname: String,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// Application name reported to the server
    pub application_name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: None,
            dbname: "postgres".to_string(),
            connect_timeout: Duration::from_secs(5),
            application_name: "dbtest-toolbox".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Key/value connection string. The password is left out.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} dbname={} connect_timeout={} application_name={}",
            self.host,
            self.port,
            self.user,
            self.dbname,
            self.connect_timeout.as_secs().max(1),
            self.application_name
        )
    }
}

/// Layout of the test data directories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root of the test resources
    pub resources_dir: PathBuf,

    /// Sub-directory of the resources holding per-test data directories
    pub data_subdir: String,

    /// Data directory shared by every test
    pub common_dir: String,

    /// Dataset purging the whole schema, relative to the common directory
    pub purge_dataset: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            resources_dir: PathBuf::from("src/test/resources"),
            data_subdir: "data".to_string(),
            common_dir: "Common".to_string(),
            purge_dataset: "schema_purge_ds.xml".to_string(),
        }
    }
}

impl DataConfig {
    /// Directory holding every test data directory
    pub fn data_root(&self) -> PathBuf {
        self.resources_dir.join(&self.data_subdir)
    }

    /// Data directory of `test_name`
    pub fn test_dir(&self, test_name: &str) -> PathBuf {
        self.data_root().join(test_name)
    }

    /// Data directory shared by every test
    pub fn common_path(&self) -> PathBuf {
        self.data_root().join(&self.common_dir)
    }

    /// Path of the purge dataset
    pub fn purge_dataset_path(&self) -> PathBuf {
        self.common_path().join(&self.purge_dataset)
    }
}

/// Toolbox configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolboxConfig {
    /// Database connection settings
    pub database: DatabaseConfig,

    /// Test data layout
    pub data: DataConfig,

    /// Operation used when loading without an explicit operation
    pub default_operation: Operation,

    /// Directory receiving temporary snapshot artifacts. The system temp
    /// directory when unset.
    pub work_dir: Option<PathBuf>,

    /// Loads and snapshots slower than this are logged at warn level
    pub slow_operation_threshold: Option<Duration>,

    /// Log level
    pub log_level: String,
}

impl Default for ToolboxConfig {
    fn default() -> Self {
        ToolboxConfig {
            database: DatabaseConfig::default(),
            data: DataConfig::default(),
            default_operation: Operation::Insert,
            work_dir: None,
            slow_operation_threshold: Some(Duration::from_secs(2)),
            log_level: "info".to_string(),
        }
    }
}

impl ToolboxConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(to_filesystem_error)?;
        let config = serde_json::from_reader(file)?;
        Ok(config)
    }

    /// Save configuration to a JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path.as_ref()).map_err(to_filesystem_error)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Directory receiving temporary snapshot artifacts
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Create a development configuration
    pub fn development() -> Self {
        let mut config = Self::default();
        config.log_level = "debug".to_string();
        config
    }

    /// Create a testing configuration
    pub fn testing() -> Self {
        let mut config = Self::default();
        config.log_level = "debug".to_string();
        config.database.connect_timeout = Duration::from_secs(2);
        config.slow_operation_threshold = Some(Duration::from_millis(500));
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = ToolboxConfig::default();

        assert_eq!(config.database.port, 5432);
        assert_eq!(config.default_operation, Operation::Insert);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.work_dir(), std::env::temp_dir());
    }

    #[test]
    fn test_presets() {
        let config = ToolboxConfig::development();
        assert_eq!(config.log_level, "debug");

        let config = ToolboxConfig::testing();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.database.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.slow_operation_threshold, Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_data_layout() {
        let data = DataConfig::default();

        assert_eq!(data.test_dir("UserTest"), PathBuf::from("src/test/resources/data/UserTest"));
        assert_eq!(data.common_path(), PathBuf::from("src/test/resources/data/Common"));
        assert_eq!(
            data.purge_dataset_path(),
            PathBuf::from("src/test/resources/data/Common/schema_purge_ds.xml")
        );
    }

    #[test]
    fn test_connection_string() {
        let mut database = DatabaseConfig::default();
        database.password = Some("secret".to_string());

        let conn = database.connection_string();
        assert_eq!(
            conn,
            "host=localhost port=5432 user=postgres dbname=postgres connect_timeout=5 application_name=dbtest-toolbox"
        );
        assert!(!conn.contains("secret"));
    }

    #[test]
    fn test_config_file_io() {
        let mut config = ToolboxConfig::testing();
        config.default_operation = Operation::CleanInsert;
        config.work_dir = Some(PathBuf::from("target/tmp"));

        let temp_file = NamedTempFile::new().unwrap();
        config.to_file(temp_file.path()).unwrap();

        let loaded = ToolboxConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded, config);

        let json = std::fs::read_to_string(temp_file.path()).unwrap();
        assert!(json.contains("\"CLEAN_INSERT\""));
    }

    #[test]
    fn test_missing_file() {
        let result = ToolboxConfig::from_file("does/not/exist.json");
        assert!(matches!(result, Err(crate::error::ToolboxError::Filesystem(_))));
    }
}
