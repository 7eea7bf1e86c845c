//! Row patterns
//!
//! A [`RowPattern`] names a table and a partial set of expected column values.
//! Columns it does not mention are wildcards. Patterns are assembled with a
//! [`RowPatternBuilder`] and are read-only once built; [`RowPattern::compile`]
//! turns one into a [`RowSelector`] that counts matching rows in a dataset.

use std::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

use crate::models::{CellValue, Dataset, Row};
use crate::xml::ROOT_ELEMENT;

/// Expected row in one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowPattern {
    /// Table the row is expected in
    table: String,

    /// Column constraints in the order they were added
    constraints: Vec<(String, CellValue)>,
}

/// Incremental builder for [`RowPattern`]
#[derive(Debug, Clone)]
pub struct RowPatternBuilder {
    table: String,
    constraints: Vec<(String, CellValue)>,
}

impl RowPatternBuilder {
    /// Expect `column` to hold `value`. Adding the same column twice keeps the
    /// last value.
    pub fn column(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.constraints.iter_mut().find(|(name, _)| *name == column) {
            Some(existing) => existing.1 = value,
            None => self.constraints.push((column, value)),
        }
        self
    }

    /// Expect `column` to be NULL
    pub fn null_column(self, column: impl Into<String>) -> Self {
        self.column(column, CellValue::Null)
    }

    /// Finish the pattern
    pub fn build(self) -> RowPattern {
        RowPattern {
            table: self.table,
            constraints: self.constraints,
        }
    }
}

impl RowPattern {
    /// Start building a pattern for `table`
    pub fn builder(table: impl Into<String>) -> RowPatternBuilder {
        RowPatternBuilder {
            table: table.into(),
            constraints: Vec::new(),
        }
    }

    /// Pattern matching every row of `table`
    pub fn any_row(table: impl Into<String>) -> Self {
        Self::builder(table).build()
    }

    /// Table the pattern applies to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column constraints
    pub fn constraints(&self) -> &[(String, CellValue)] {
        &self.constraints
    }

    /// Whether the pattern has no column constraints
    pub fn is_wildcard(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Compile the pattern into a structural selector
    pub fn compile(&self) -> RowSelector {
        RowSelector {
            table: self.table.clone(),
            constraints: self.constraints.clone(),
        }
    }
}

/// Compiled form of a [`RowPattern`]: a table name plus a conjunction of
/// `column = value` checks evaluated on a single row.
///
/// The table name is compared exactly as stored in the dataset, as are the
/// column names of the constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSelector {
    table: String,
    constraints: Vec<(String, CellValue)>,
}

impl RowSelector {
    /// Whether `row` satisfies every constraint
    pub fn matches(&self, row: &Row) -> bool {
        self.constraints.iter().all(|(column, expected)| {
            row.cells()
                .any(|(name, value)| name == column && value == expected)
        })
    }

    /// Number of rows of the selected table that satisfy every constraint.
    /// A table absent from the dataset yields 0.
    pub fn count(&self, dataset: &Dataset) -> usize {
        dataset
            .tables()
            .iter()
            .filter(|table| table.name() == self.table)
            .flat_map(|table| table.rows())
            .filter(|row| self.matches(row))
            .count()
    }
}

impl Display for RowSelector {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "/{}/{}", ROOT_ELEMENT, self.table)?;
        if self.constraints.is_empty() {
            return Ok(());
        }

        f.write_str("[")?;
        for (index, (column, value)) in self.constraints.iter().enumerate() {
            if index > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "@{}=\"{}\"", column, value.to_string().replace('"', "&quot;"))?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn users() -> Dataset {
        let mut dataset = Dataset::new();
        dataset.push_row("users", Row::new().with("id", "1").with("name", "Alice").with("age", "30"));
        dataset.push_row("users", Row::new().with("id", "2").with("name", "Bob").with("age", "30"));
        dataset.push_row(
            "users",
            Row::new().with("id", "3").with("name", "Carol").with("age", CellValue::Null),
        );
        dataset
    }

    #[rstest]
    #[case(RowPattern::builder("users").column("name", "Alice").column("age", "30").build(), 1)]
    #[case(RowPattern::builder("users").column("name", "Alice").column("status", "active").build(), 0)]
    #[case(RowPattern::builder("users").column("age", "30").build(), 2)]
    #[case(RowPattern::builder("users").null_column("age").build(), 1)]
    #[case(RowPattern::builder("users").column("name", "Alice").column("age", "31").build(), 0)]
    #[case(RowPattern::any_row("users"), 3)]
    #[case(RowPattern::any_row("orders"), 0)]
    #[case(RowPattern::any_row("USERS"), 0)]
    fn test_count(#[case] pattern: RowPattern, #[case] expected: usize) {
        assert_eq!(pattern.compile().count(&users()), expected);
    }

    #[test]
    fn test_constraints_must_hold_on_the_same_row() {
        // Alice is 30 and Bob is 30, but no row is both Bob and id 1
        let pattern = RowPattern::builder("users").column("name", "Bob").column("id", "1").build();
        assert_eq!(pattern.compile().count(&users()), 0);
    }

    #[test]
    fn test_builder_replaces_repeated_column() {
        let pattern = RowPattern::builder("users")
            .column("name", "Alice")
            .column("name", "Bob")
            .build();

        assert_eq!(pattern.constraints().len(), 1);
        assert_eq!(pattern.compile().count(&users()), 1);
        assert!(!pattern.is_wildcard());
    }

    #[test]
    fn test_selector_display() {
        let selector = RowPattern::builder("users")
            .column("name", "Alice")
            .column("age", "30")
            .build()
            .compile();
        assert_eq!(selector.to_string(), r#"/dataset/users[@name="Alice" and @age="30"]"#);

        assert_eq!(RowPattern::any_row("users").compile().to_string(), "/dataset/users");

        let selector = RowPattern::builder("notes")
            .column("body", "say \"hi\"")
            .null_column("deleted_at")
            .build()
            .compile();
        assert_eq!(
            selector.to_string(),
            r#"/dataset/notes[@body="say &quot;hi&quot;" and @deleted_at="[NULL]"]"#
        );
    }
}
