//! SQL dialects
//!
//! Quoting, NULL and literal conventions differ between databases, so the
//! engine never hardcodes them. A [`SqlDialect`] supplies them, along with the
//! catalog queries used to discover primary and foreign keys.

use crate::models::CellValue;

/// Database specific SQL conventions
pub trait SqlDialect: Send + Sync {
    /// Dialect name, for logging
    fn name(&self) -> &'static str;

    /// Quote an identifier
    fn quote_identifier(&self, identifier: &str) -> String;

    /// Render a cell as a SQL literal
    fn literal(&self, value: &CellValue) -> String;

    /// Spelling of an identifier as stored in the system catalog
    fn catalog_name(&self, identifier: &str) -> String {
        identifier.to_string()
    }

    /// Fully qualified table name. A table name that already contains a
    /// schema (`schema.table`) is kept as is.
    fn qualified_table(&self, schema: &str, table: &str) -> String {
        match table.split_once('.') {
            Some((table_schema, table)) => format!(
                "{}.{}",
                self.quote_identifier(table_schema),
                self.quote_identifier(table)
            ),
            None => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(table)
            ),
        }
    }

    /// Query returning the full content of a table
    fn select_all(&self, schema: &str, table: &str) -> String {
        format!("SELECT * FROM {}", self.qualified_table(schema, table))
    }

    /// Statement restricting the connection to a schema
    fn set_schema(&self, schema: &str) -> String;

    /// Catalog query listing the primary key columns of table `$2` in schema
    /// `$1`, in key order
    fn primary_key_query(&self) -> &'static str;

    /// Catalog query listing `(table, column, referenced table, referenced
    /// column)` for every foreign key of schema `$1`
    fn foreign_key_query(&self) -> &'static str;
}

/// PostgreSQL conventions
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    // Plain identifiers are left unquoted and case-folded by the server
    fn quote_identifier(&self, identifier: &str) -> String {
        if is_plain_identifier(identifier) {
            identifier.to_string()
        } else {
            format!("\"{}\"", identifier.replace('"', "\"\""))
        }
    }

    fn catalog_name(&self, identifier: &str) -> String {
        if is_plain_identifier(identifier) {
            identifier.to_ascii_lowercase()
        } else {
            identifier.to_string()
        }
    }

    fn literal(&self, value: &CellValue) -> String {
        match value {
            CellValue::Null => "NULL".to_string(),
            // Untyped string literals are coerced to the column type
            CellValue::Text(text) => format!("'{}'", text.replace('\'', "''")),
        }
    }

    fn set_schema(&self, schema: &str) -> String {
        format!("SET search_path TO {}", self.quote_identifier(schema))
    }

    fn primary_key_query(&self) -> &'static str {
        "SELECT kcu.column_name::text \
         FROM information_schema.table_constraints tc \
         JOIN information_schema.key_column_usage kcu \
           ON tc.constraint_name = kcu.constraint_name \
          AND tc.table_schema = kcu.table_schema \
          AND tc.table_name = kcu.table_name \
         WHERE tc.constraint_type = 'PRIMARY KEY' \
           AND tc.table_schema::text = $1 \
           AND tc.table_name::text = $2 \
         ORDER BY kcu.ordinal_position"
    }

    fn foreign_key_query(&self) -> &'static str {
        "SELECT kcu.table_name::text, kcu.column_name::text, \
                ccu.table_name::text, ccu.column_name::text \
         FROM information_schema.table_constraints tc \
         JOIN information_schema.key_column_usage kcu \
           ON tc.constraint_name = kcu.constraint_name \
          AND tc.table_schema = kcu.table_schema \
         JOIN information_schema.constraint_column_usage ccu \
           ON tc.constraint_name = ccu.constraint_name \
          AND tc.constraint_schema = ccu.constraint_schema \
         WHERE tc.constraint_type = 'FOREIGN KEY' \
           AND tc.table_schema::text = $1"
    }
}

fn is_plain_identifier(identifier: &str) -> bool {
    identifier
        .chars()
        .next()
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '_')
        && identifier.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
