//! Flat XML dataset format
//!
//! The canonical serialization of a [`Dataset`](crate::models::Dataset):
//!
//! ```xml
//! <?xml version='1.0' encoding='UTF-8'?>
//! <dataset>
//!   <users id="1" name="Alice"/>
//!   <users id="2" name="Bob" deleted_at="[NULL]"/>
//! </dataset>
//! ```
//!
//! Every child of the root is one row, named after its table; every attribute
//! is one column. The `[NULL]` token marks a database NULL, as opposed to an
//! empty string.

pub mod dtd;
mod reader;
mod writer;

pub use dtd::write_structure;
pub use reader::{decode, decode_reader};
pub use writer::encode;

/// Name of the root element
pub const ROOT_ELEMENT: &str = "dataset";

/// Whether `name` can be used as an element or attribute name (XML 1.0 `Name`)
pub fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | '_' | 'A'..='Z' | 'a'..='z'
        | '\u{C0}'..='\u{D6}' | '\u{D8}'..='\u{F6}' | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}' | '\u{37F}'..='\u{1FFF}' | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}' | '\u{2C00}'..='\u{2FEF}' | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}' | '\u{FDF0}'..='\u{FFFD}' | '\u{10000}'..='\u{EFFFF}')
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}')
}
