//! Cell values
//!
//! Values are always textual at this layer. The database is responsible for
//! converting text to the column's native type on write, so the only
//! distinction kept here is between text and an explicit NULL.

use std::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Serialize, Deserialize};

/// Token used in flat XML datasets for an explicit database NULL
pub const NULL_TOKEN: &str = "[NULL]";

/// Value of a single column in a row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellValue {
    /// Textual value, converted by the database on write
    Text(String),

    /// Database NULL
    Null,
}

impl CellValue {
    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }

    /// Whether the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Borrow the text, `None` for NULL
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(text) => Some(text),
            CellValue::Null => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            CellValue::Text(text) => f.write_str(text),
            CellValue::Null => f.write_str(NULL_TOKEN),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}
