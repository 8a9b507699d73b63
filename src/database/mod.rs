//! Database module for Cheese.
//!
//! Provides SQLite database connection management and migrations.
//! The default database is stored at `~/.cheese/cheese.db`.

pub mod list_store;
pub mod migrations;
pub mod schema;

pub use list_store::SqliteListStore;

use rusqlite::Connection;
use std::path::{Path, PathBuf};

use crate::database::migrations::run_migrations;

/// Database error types.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to create database directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },
}

/// Returns the path to the default database file (~/.cheese/cheese.db).
pub fn get_database_path() -> PathBuf {
    crate::config::get_data_dir().join("cheese.db")
}

/// Ensures the directory holding `db_path` exists.
fn ensure_database_directory(db_path: &Path) -> Result<(), DatabaseError> {
    if let Some(dir) = db_path.parent() {
        if !dir.as_os_str().is_empty() && !dir.exists() {
            std::fs::create_dir_all(dir)?;
            tracing::info!("Created data directory at {:?}", dir);
        }
    }
    Ok(())
}

/// Opens a connection to the database at `db_path`.
///
/// Each call creates a new connection; callers open one per operation
/// rather than sharing a connection across threads.
pub fn open_connection_at(db_path: &Path) -> Result<Connection, DatabaseError> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

/// Initialises the database at `db_path`, creating the directory and
/// running migrations.
pub fn initialise_database_at(db_path: &Path) -> Result<(), DatabaseError> {
    tracing::info!("Initialising database at {:?}", db_path);

    ensure_database_directory(db_path)?;

    let mut conn = open_connection_at(db_path)?;
    run_migrations(&mut conn)?;

    tracing::info!("Database initialised successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_path_format() {
        let path = get_database_path();
        assert!(path.to_string_lossy().contains(".cheese"));
        assert!(path.to_string_lossy().ends_with("cheese.db"));
    }

    #[test]
    fn test_initialise_creates_parent_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("nested").join("cheese.db");

        initialise_database_at(&db_path).unwrap();
        assert!(db_path.exists());
    }
}
