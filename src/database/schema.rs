//! Database schema definitions for Cheese.
//!
//! Contains SQL statements for creating and managing database tables.

/// SQL statement to create the migrations tracking table.
pub const CREATE_MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// SQL statement to create the list entries table.
///
/// Each named list (e.g. "selfies") is the entries sharing a `list_key`,
/// ordered by `position`. Nothing is unique except the slot itself, so the
/// same image can be stored any number of times.
pub const CREATE_LIST_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS list_entries (
    list_key TEXT NOT NULL,
    position INTEGER NOT NULL,
    mime_type TEXT NOT NULL,
    data BLOB NOT NULL,
    captured_at TEXT NOT NULL,
    PRIMARY KEY (list_key, position)
);
"#;
