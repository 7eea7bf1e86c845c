//! Structure descriptor for exported datasets
//!
//! A DTD-like document describing which tables a dataset holds and the
//! columns seen for each. It is written next to exported datasets as
//! documentation and is never read back or validated against.

use std::fmt::Write as _;

use crate::models::Dataset;
use super::ROOT_ELEMENT;

/// Derive the structure descriptor of a dataset
pub fn write_structure(dataset: &Dataset) -> String {
    let mut out = String::new();

    if dataset.is_empty() {
        let _ = writeln!(out, "<!ELEMENT {} EMPTY>", ROOT_ELEMENT);
        return out;
    }

    let _ = writeln!(out, "<!ELEMENT {} (", ROOT_ELEMENT);
    let names = dataset.table_names();
    for (index, name) in names.iter().enumerate() {
        let separator = if index + 1 == names.len() { ")>" } else { "," };
        let _ = writeln!(out, "    {}*{}", name, separator);
    }

    for table in dataset.tables() {
        out.push('\n');
        let _ = writeln!(out, "<!ELEMENT {} EMPTY>", table.name());
        let _ = writeln!(out, "<!ATTLIST {}", table.name());
        for column in table.columns() {
            let presence = if table.is_column_required(&column) {
                "#REQUIRED"
            } else {
                "#IMPLIED"
            };
            let _ = writeln!(out, "    {} CDATA {}", column, presence);
        }
        out.push_str(">\n");
    }

    out
}
