//! Placeholder substitution for dataset templates
//!
//! Fixture files may contain placeholders such as `${USER_ID}` that are
//! replaced before the dataset is loaded. A cell is replaced only when its
//! whole text equals a placeholder key. The keys `${NULL}` and `${null}` are
//! always present and map to a database NULL.

use std::collections::HashMap;
use log::debug;

use crate::models::{CellValue, Dataset};

/// Reserved placeholders mapping to NULL
pub const NULL_PLACEHOLDERS: [&str; 2] = ["${NULL}", "${null}"];

/// Immutable placeholder → value mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionMap {
    entries: HashMap<String, CellValue>,
}

/// Incremental builder for [`SubstitutionMap`]
#[derive(Debug, Clone, Default)]
pub struct SubstitutionBuilder {
    entries: HashMap<String, CellValue>,
}

impl SubstitutionBuilder {
    /// Replace cells equal to `key` with `value`
    pub fn add(mut self, key: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Replace cells equal to `key` with NULL
    pub fn add_null(self, key: impl Into<String>) -> Self {
        self.add(key, CellValue::Null)
    }

    /// Add every pair of `pairs`
    pub fn extend<K, V, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<CellValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            self.entries.insert(key.into(), value.into());
        }
        self
    }

    /// Finish the map. The reserved NULL placeholders override any value
    /// given for them.
    pub fn build(mut self) -> SubstitutionMap {
        for key in NULL_PLACEHOLDERS {
            self.entries.insert(key.to_string(), CellValue::Null);
        }
        SubstitutionMap { entries: self.entries }
    }
}

impl Default for SubstitutionMap {
    fn default() -> Self {
        SubstitutionBuilder::default().build()
    }
}

impl SubstitutionMap {
    /// Start building a map
    pub fn builder() -> SubstitutionBuilder {
        SubstitutionBuilder::default()
    }

    /// Replacement for `key`, if any
    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.entries.get(key)
    }

    /// Number of placeholders, the reserved ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: the reserved placeholders are present
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the substitutions to every cell of `dataset`
    pub fn apply(&self, mut dataset: Dataset) -> Dataset {
        let mut replaced = 0usize;
        for table in dataset.tables_mut() {
            for row in table.rows_mut() {
                for value in row.values_mut() {
                    if let CellValue::Text(text) = value {
                        if let Some(replacement) = self.entries.get(text.as_str()) {
                            *value = replacement.clone();
                            replaced += 1;
                        }
                    }
                }
            }
        }
        debug!("Substituted {} placeholder values", replaced);
        dataset
    }
}
