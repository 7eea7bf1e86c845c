//! Logging setup for test binaries

use env_logger::{Builder, Env, DEFAULT_FILTER_ENV};

use dbtest_core::config::ToolboxConfig;

/// Install the `env_logger` backend. `RUST_LOG` wins over the configured
/// level. Calling it again, from another test for instance, has no effect.
pub fn init_logging(config: &ToolboxConfig) {
    let env = Env::default().filter_or(DEFAULT_FILTER_ENV, config.log_level.as_str());
    let _ = Builder::from_env(env).is_test(true).try_init();
}
