//! SQL generation
//!
//! Dialect conventions and the write statements rendered from dataset rows.

mod dialect;
mod statement;

pub use dialect::{PostgresDialect, SqlDialect};
pub use statement::StatementBuilder;
