//! Flat XML dataset decoding

use std::io::Read;
use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{to_filesystem_error, to_format_error, Result, ToolboxError};
use crate::models::{CellValue, Dataset, Row, NULL_TOKEN};
use super::ROOT_ELEMENT;

/// Decode a flat XML dataset.
///
/// Each child of the `<dataset>` root is one row; its tag is the table name
/// and its attributes are the row's columns. An element without attributes
/// declares a table without adding a row. Table and column names are matched
/// case-insensitively, so `<USERS>` and `<users>` rows end up in one table.
pub fn decode(xml: &str) -> Result<Dataset> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut dataset = Dataset::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        let event = reader.read_event().map_err(|e| {
            to_format_error(format!("malformed XML at position {}: {}", reader.buffer_position(), e))
        })?;

        match event {
            Event::Start(element) => {
                if depth == 0 {
                    check_root(&element, saw_root)?;
                    saw_root = true;
                } else if depth == 1 {
                    read_row(&element, &mut dataset)?;
                }
                depth += 1;
            }
            Event::Empty(element) => {
                if depth == 0 {
                    check_root(&element, saw_root)?;
                    saw_root = true;
                } else if depth == 1 {
                    read_row(&element, &mut dataset)?;
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Text(text) if depth == 0 => {
                return Err(ToolboxError::Format(format!(
                    "unexpected text outside of <{}>: {}",
                    ROOT_ELEMENT,
                    String::from_utf8_lossy(&text)
                )));
            }
            Event::Eof => break,
            // Prolog, DOCTYPE, comments and processing instructions
            _ => {}
        }
    }

    if depth != 0 {
        return Err(ToolboxError::Format("unexpected end of document".to_string()));
    }
    if !saw_root {
        return Err(ToolboxError::Format(format!("missing <{}> root element", ROOT_ELEMENT)));
    }

    debug!(
        "Decoded dataset with {} tables and {} rows",
        dataset.len(),
        dataset.row_count()
    );

    Ok(dataset)
}

/// Decode a flat XML dataset from a stream
pub fn decode_reader<R: Read>(mut input: R) -> Result<Dataset> {
    let mut xml = String::new();
    input.read_to_string(&mut xml).map_err(to_filesystem_error)?;
    decode(&xml)
}

fn check_root(element: &BytesStart<'_>, saw_root: bool) -> Result<()> {
    if saw_root {
        return Err(ToolboxError::Format("more than one root element".to_string()));
    }

    let name = element_name(element)?;
    if name != ROOT_ELEMENT {
        return Err(ToolboxError::Format(format!(
            "unexpected root element <{}>, expected <{}>",
            name, ROOT_ELEMENT
        )));
    }

    Ok(())
}

fn read_row(element: &BytesStart<'_>, dataset: &mut Dataset) -> Result<()> {
    let table_name = element_name(element)?;

    let mut row = Row::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(to_format_error)?;
        let column = std::str::from_utf8(attribute.key.as_ref()).map_err(to_format_error)?;
        // Only the unescaped token means NULL; `&#91;NULL]` is the literal text
        let value = if attribute.value.as_ref() == NULL_TOKEN.as_bytes() {
            CellValue::Null
        } else {
            CellValue::Text(attribute.unescape_value().map_err(to_format_error)?.into_owned())
        };
        row.set(column, value);
    }

    let table = dataset.table_or_insert(&table_name);
    if !row.is_empty() {
        table.push(row);
    }

    Ok(())
}

fn element_name(element: &BytesStart<'_>) -> Result<String> {
    std::str::from_utf8(element.name().as_ref())
        .map(str::to_string)
        .map_err(to_format_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Table;

    #[test]
    fn test_decode_flat_dataset() {
        let xml = r#"<?xml version='1.0' encoding='UTF-8'?>
            <!DOCTYPE dataset SYSTEM "dataset.dtd">
            <dataset>
                <users id="1" name="Alice"/>
                <users id="2" name="Bob" email="bob@example.com"/>
                <orders id="10" user_id="1"/>
            </dataset>"#;

        let dataset = decode(xml).unwrap();

        assert_eq!(dataset.table_names(), vec!["users", "orders"]);
        let users = dataset.table("users").unwrap();
        assert_eq!(users.row_count(), 2);
        assert_eq!(users.rows()[1].get("email"), Some(&CellValue::text("bob@example.com")));
        assert_eq!(users.rows()[0].get("email"), None);
    }

    #[test]
    fn test_decode_is_case_insensitive_for_tables_and_columns() {
        let xml = r#"<dataset><Users ID="1"/><USERS id="2"/></dataset>"#;

        let dataset = decode(xml).unwrap();

        assert_eq!(dataset.len(), 1);
        let users = dataset.table("users").unwrap();
        assert_eq!(users.name(), "Users");
        assert_eq!(users.rows()[0].get("id"), Some(&CellValue::text("1")));
        assert_eq!(users.rows()[1].get("ID"), Some(&CellValue::text("2")));
    }

    #[test]
    fn test_decode_null_token_and_escapes() {
        let xml = r#"<dataset><notes id="1" body="a &lt;b&gt; &amp; &quot;c&quot;&#10;d" deleted_at="[NULL]"/></dataset>"#;

        let dataset = decode(xml).unwrap();
        let row = &dataset.table("notes").unwrap().rows()[0];

        assert_eq!(row.get("body"), Some(&CellValue::text("a <b> & \"c\"\nd")));
        assert_eq!(row.get("deleted_at"), Some(&CellValue::Null));
    }

    #[test]
    fn test_decode_escaped_null_token_is_text() {
        let xml = r#"<dataset><notes a="[NULL]" b="&#91;NULL]" c="&#x5B;NULL]" d=" [NULL]"/></dataset>"#;

        let dataset = decode(xml).unwrap();
        let row = &dataset.table("notes").unwrap().rows()[0];

        assert_eq!(row.get("a"), Some(&CellValue::Null));
        assert_eq!(row.get("b"), Some(&CellValue::text("[NULL]")));
        assert_eq!(row.get("c"), Some(&CellValue::text("[NULL]")));
        assert_eq!(row.get("d"), Some(&CellValue::text(" [NULL]")));
    }

    #[test]
    fn test_decode_empty_table_and_empty_dataset() {
        let dataset = decode("<dataset><audit_log/></dataset>").unwrap();
        assert_eq!(dataset.table("audit_log").map(Table::row_count), Some(0));

        let dataset = decode("<dataset/>").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_decode_rejects_wrong_root() {
        let err = decode("<data><users id=\"1\"/></data>").unwrap_err();
        match err {
            ToolboxError::Format(msg) => assert!(msg.contains("<data>")),
            other => panic!("Expected Format error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_malformed_xml() {
        assert!(matches!(decode("<dataset><users id=\"1\"></dataset>"), Err(ToolboxError::Format(_))));
        assert!(matches!(decode("<dataset><users id=\"1\"/>"), Err(ToolboxError::Format(_))));
        assert!(matches!(decode("<dataset><users id=\"1\" id=\"2\"/></dataset>"), Err(ToolboxError::Format(_))));
        assert!(matches!(decode(""), Err(ToolboxError::Format(_))));
        assert!(matches!(decode("<dataset/><dataset/>"), Err(ToolboxError::Format(_))));
    }

    #[test]
    fn test_decode_reader() {
        let xml = b"<dataset><users id=\"1\"/></dataset>";
        let dataset = decode_reader(&xml[..]).unwrap();
        assert_eq!(dataset.row_count(), 1);
    }
}
