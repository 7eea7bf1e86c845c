//! Shared test doubles

use std::path::{Path, PathBuf};
use mockall::mock;

use dbtest_core::error::Result;
use dbtest_core::utils::FileAccess;

mock! {
    pub Files {}

    impl FileAccess for Files {
        fn read_to_string(&self, path: &Path) -> Result<String>;
        fn write_string(&self, path: &Path, contents: &str) -> Result<()>;
        fn create_dir_all(&self, path: &Path) -> Result<()>;
        fn exists(&self, path: &Path) -> bool;
        fn is_dir(&self, path: &Path) -> bool;
        fn delete_quietly(&self, path: &Path) -> bool;
        fn absolute_path(&self, path: &Path) -> Result<PathBuf>;
    }
}
