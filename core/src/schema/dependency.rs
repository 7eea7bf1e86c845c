//! Table dependency ordering

use std::collections::{BTreeSet, HashMap};
use log::debug;

use crate::database::ForeignKey;
use crate::error::{Result, ToolboxError};

/// Parent/child relations between a set of tables
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Tables in their original order
    tables: Vec<String>,

    /// For each table index, the indexes of the tables it references
    parents: Vec<BTreeSet<usize>>,
}

impl DependencyGraph {
    /// Build the graph of `tables` from `foreign_keys`. Keys involving a table
    /// outside the set and self references are ignored.
    pub fn new<S: AsRef<str>>(tables: &[S], foreign_keys: &[ForeignKey]) -> Self {
        let tables: Vec<String> = tables.iter().map(|t| t.as_ref().to_string()).collect();
        let index: HashMap<String, usize> = tables
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_ascii_lowercase(), i))
            .collect();

        let mut parents = vec![BTreeSet::new(); tables.len()];
        for key in foreign_keys.iter().filter(|key| !key.is_self_reference()) {
            let child = index.get(&key.table.to_ascii_lowercase());
            let parent = index.get(&key.referenced_table.to_ascii_lowercase());
            if let (Some(&child), Some(&parent)) = (child, parent) {
                parents[child].insert(parent);
            }
        }

        Self { tables, parents }
    }

    /// Tables the given table references
    pub fn parents_of(&self, table: &str) -> Vec<&str> {
        self.tables
            .iter()
            .position(|name| name.eq_ignore_ascii_case(table))
            .map(|i| self.parents[i].iter().map(|&p| self.tables[p].as_str()).collect())
            .unwrap_or_default()
    }

    /// Tables ordered parents first. Among tables that are free to go next,
    /// the one that came first in the original order wins.
    pub fn insertion_order(&self) -> Result<Vec<String>> {
        let mut placed = vec![false; self.tables.len()];
        let mut order = Vec::with_capacity(self.tables.len());

        while order.len() < self.tables.len() {
            let next = (0..self.tables.len()).find(|&i| {
                !placed[i] && self.parents[i].iter().all(|&p| placed[p])
            });

            match next {
                Some(i) => {
                    placed[i] = true;
                    order.push(self.tables[i].clone());
                }
                None => {
                    let remaining: Vec<&str> = self
                        .tables
                        .iter()
                        .zip(&placed)
                        .filter(|(_, done)| !**done)
                        .map(|(name, _)| name.as_str())
                        .collect();
                    return Err(ToolboxError::CyclicDependency(remaining.join(", ")));
                }
            }
        }

        debug!("Dependency order: {}", order.join(", "));
        Ok(order)
    }
}
