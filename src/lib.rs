//! dbtest-toolbox - fixture loading and dataset assertions for database
//! integration tests
//!
//! This is the root crate of the workspace. The implementation lives in the
//! subcrates:
//! - `dbtest-core`: dataset model, XML codec, row patterns, SQL rendering
//! - `dbtest-client`: loader, exporter, assertion engine, test facade

pub use dbtest_client;
pub use dbtest_core;

/// Returns the version of the package.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
