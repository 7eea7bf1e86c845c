//! Flat XML dataset encoding

use std::borrow::Cow;
use std::fmt::Write as _;
use quick_xml::escape::escape;

use crate::error::{Result, ToolboxError};
use crate::models::{CellValue, Dataset, Row, NULL_TOKEN};
use super::{is_xml_name, ROOT_ELEMENT};

const PROLOG: &str = "<?xml version='1.0' encoding='UTF-8'?>";

// Literal text equal to the NULL token, with its first character escaped
const ESCAPED_NULL_TOKEN: &str = "&#91;NULL]";

/// Encode a dataset as flat XML.
///
/// Table and column names keep the case they have in the model. Tables
/// without rows are written as an empty element so they survive a round trip.
/// A table or column whose name is not a valid XML name (`order items`, say)
/// cannot be represented and fails with [`ToolboxError::Format`].
pub fn encode(dataset: &Dataset) -> Result<String> {
    let mut out = String::with_capacity(64 + dataset.row_count() * 64);
    out.push_str(PROLOG);
    out.push('\n');

    if dataset.is_empty() {
        let _ = writeln!(out, "<{}/>", ROOT_ELEMENT);
        return Ok(out);
    }

    let _ = writeln!(out, "<{}>", ROOT_ELEMENT);
    for table in dataset.tables() {
        check_name("table", table.name())?;
        if table.is_empty() {
            let _ = writeln!(out, "  <{}/>", table.name());
            continue;
        }
        for row in table.rows() {
            write_row(&mut out, table.name(), row)?;
        }
    }
    let _ = writeln!(out, "</{}>", ROOT_ELEMENT);

    Ok(out)
}

fn check_name(kind: &str, name: &str) -> Result<()> {
    if is_xml_name(name) {
        Ok(())
    } else {
        Err(ToolboxError::Format(format!(
            "{} name \"{}\" is not a valid XML name",
            kind, name
        )))
    }
}

fn write_row(out: &mut String, table_name: &str, row: &Row) -> Result<()> {
    out.push_str("  <");
    out.push_str(table_name);
    for (column, value) in row.cells() {
        check_name("column", column)?;
        out.push(' ');
        out.push_str(column);
        out.push_str("=\"");
        out.push_str(&attribute_value(value));
        out.push('"');
    }
    out.push_str("/>\n");
    Ok(())
}

fn attribute_value(value: &CellValue) -> Cow<'_, str> {
    match value {
        CellValue::Null => Cow::Borrowed(NULL_TOKEN),
        CellValue::Text(text) if text == NULL_TOKEN => Cow::Borrowed(ESCAPED_NULL_TOKEN),
        CellValue::Text(text) => escape_attribute(text),
    }
}

/// Escape markup characters plus the whitespace characters that XML
/// attribute normalisation would otherwise turn into spaces
fn escape_attribute(value: &str) -> Cow<'_, str> {
    let escaped = escape(value);
    if !escaped.contains(['\n', '\r', '\t']) {
        return escaped;
    }

    let mut out = String::with_capacity(escaped.len() + 8);
    for c in escaped.chars() {
        match c {
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            '\t' => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
