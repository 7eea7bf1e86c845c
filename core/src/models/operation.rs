//! Write operations applied to every table of a dataset

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use serde::{Serialize, Deserialize};

use crate::error::ToolboxError;

/// Write mode used when loading a dataset into the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Insert every row
    #[default]
    Insert,

    /// Update every row, matched by primary key
    Update,

    /// Delete every row, matched by primary key
    Delete,

    /// Update rows that exist, insert the others
    Refresh,

    /// Empty every dataset table, then insert
    CleanInsert,

    /// Delete all rows of every dataset table
    DeleteAll,

    /// Truncate every dataset table
    Truncate,
}

impl Operation {
    /// All operations
    pub const ALL: [Operation; 7] = [
        Operation::Insert,
        Operation::Update,
        Operation::Delete,
        Operation::Refresh,
        Operation::CleanInsert,
        Operation::DeleteAll,
        Operation::Truncate,
    ];

    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Insert => "INSERT",
            Operation::Update => "UPDATE",
            Operation::Delete => "DELETE",
            Operation::Refresh => "REFRESH",
            Operation::CleanInsert => "CLEAN_INSERT",
            Operation::DeleteAll => "DELETE_ALL",
            Operation::Truncate => "TRUNCATE",
        }
    }

    /// Whether rows are matched against existing rows by primary key
    pub fn requires_primary_key(&self) -> bool {
        matches!(self, Operation::Update | Operation::Delete | Operation::Refresh)
    }

    /// Whether the operation empties tables, which must happen children first
    pub fn empties_tables(&self) -> bool {
        matches!(self, Operation::CleanInsert | Operation::DeleteAll | Operation::Truncate)
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ToolboxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['-', ' '], "_").to_ascii_uppercase();
        Operation::ALL
            .iter()
            .copied()
            .find(|operation| operation.as_str() == normalized)
            .ok_or_else(|| ToolboxError::Config(format!("Unknown operation: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("INSERT", Operation::Insert)]
    #[case("clean_insert", Operation::CleanInsert)]
    #[case("clean-insert", Operation::CleanInsert)]
    #[case(" refresh ", Operation::Refresh)]
    #[case("DELETE_ALL", Operation::DeleteAll)]
    fn test_parse_operation(#[case] input: &str, #[case] expected: Operation) {
        assert_eq!(input.parse::<Operation>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_operation() {
        assert!("UPSERT".parse::<Operation>().is_err());
    }

    #[test]
    fn test_default_and_display() {
        assert_eq!(Operation::default(), Operation::Insert);
        assert_eq!(Operation::CleanInsert.to_string(), "CLEAN_INSERT");
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Operation::CleanInsert).unwrap();
        assert_eq!(json, "\"CLEAN_INSERT\"");

        let parsed: Operation = serde_json::from_str("\"REFRESH\"").unwrap();
        assert_eq!(parsed, Operation::Refresh);
    }

    #[test]
    fn test_operation_traits() {
        assert!(Operation::Refresh.requires_primary_key());
        assert!(!Operation::Insert.requires_primary_key());
        assert!(Operation::CleanInsert.empties_tables());
        assert!(!Operation::Delete.empties_tables());
    }
}
