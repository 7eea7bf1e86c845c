//! Schema relations
//!
//! This module orders dataset tables along the foreign keys declared in the
//! database, so that parents are written before the rows referencing them.

mod dependency;

pub use dependency::DependencyGraph;
