//! `SQLite` schema definitions for sdstock.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the cards table.
///
/// The checkout columns are NULL unless `status` is `checked_out`.
pub const CREATE_CARDS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS cards (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL UNIQUE,
    card_index INTEGER NOT NULL,
    status TEXT NOT NULL,
    capacity TEXT NOT NULL,
    checked_out_at TEXT,
    borrower TEXT,
    equipment TEXT,
    container TEXT NOT NULL,
    note TEXT
)
";

/// SQL statement to keep indexes unique within a container.
pub const CREATE_CONTAINER_INDEX: &str = r"
CREATE UNIQUE INDEX IF NOT EXISTS idx_cards_container_index ON cards(container, card_index)
";

/// SQL statement to create an index on `status` for filtering.
pub const CREATE_STATUS_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_cards_status ON cards(status)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_CARDS_TABLE,
    CREATE_CONTAINER_INDEX,
    CREATE_STATUS_INDEX,
    CREATE_METADATA_TABLE,
];

/// Columns selected whenever a full [`Card`](crate::card::Card) is read.
pub const CARD_COLUMNS: &str =
    "id, label, card_index, status, capacity, checked_out_at, borrower, equipment, container, note";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_statements_not_empty() {
        assert!(!SCHEMA_STATEMENTS.is_empty());
        for stmt in SCHEMA_STATEMENTS {
            assert!(!stmt.is_empty());
        }
    }

    #[test]
    fn test_create_cards_table_contains_required_columns() {
        assert!(CREATE_CARDS_TABLE.contains("id INTEGER PRIMARY KEY"));
        assert!(CREATE_CARDS_TABLE.contains("label TEXT NOT NULL UNIQUE"));
        assert!(CREATE_CARDS_TABLE.contains("card_index INTEGER NOT NULL"));
        assert!(CREATE_CARDS_TABLE.contains("status TEXT NOT NULL"));
        assert!(CREATE_CARDS_TABLE.contains("container TEXT NOT NULL"));
    }

    #[test]
    fn test_card_columns_match_table() {
        for column in CARD_COLUMNS.split(", ") {
            assert!(CREATE_CARDS_TABLE.contains(column), "missing {column}");
        }
    }
}
