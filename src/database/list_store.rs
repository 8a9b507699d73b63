//! SQLite-backed list store.
//!
//! Stores each named list as rows of `list_entries`, appended at the next
//! free position.

use chrono::{DateTime, Utc};
use rusqlite::params;
use std::path::{Path, PathBuf};

use crate::capture::{EncodedImage, PersistError};
use crate::database::{initialise_database_at, open_connection_at, DatabaseError};
use crate::gallery::ListStore;

/// List store in a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteListStore {
    db_path: PathBuf,
}

impl SqliteListStore {
    /// Opens (and migrates) the database at `db_path`
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let db_path = db_path.as_ref().to_path_buf();
        initialise_database_at(&db_path)?;
        Ok(Self { db_path })
    }

    /// Opens the default database (~/.cheese/cheese.db)
    pub fn open_default() -> Result<Self, DatabaseError> {
        Self::open(crate::database::get_database_path())
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Number of entries stored under `key`
    pub fn count(&self, key: &str) -> Result<u64, DatabaseError> {
        let conn = open_connection_at(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM list_entries WHERE list_key = ?1",
            [key],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

impl ListStore for SqliteListStore {
    fn append(&self, key: &str, image: &EncodedImage) -> Result<(), PersistError> {
        let mut conn = open_connection_at(&self.db_path)?;
        let tx = conn.transaction()?;

        let position: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM list_entries WHERE list_key = ?1",
            [key],
            |row| row.get(0),
        )?;

        tx.execute(
            r#"
            INSERT INTO list_entries (list_key, position, mime_type, data, captured_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                key,
                position,
                image.mime_type,
                image.data,
                image.captured_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;

        tracing::debug!("Stored list entry {}[{}]", key, position);
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Vec<EncodedImage>, PersistError> {
        let conn = open_connection_at(&self.db_path)?;
        let mut stmt = conn.prepare(
            r#"
            SELECT mime_type, data, captured_at
            FROM list_entries
            WHERE list_key = ?1
            ORDER BY position ASC
            "#,
        )?;

        let rows = stmt.query_map([key], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Vec<u8>>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut images = Vec::new();
        for row in rows {
            let (mime_type, data, captured_at) = row?;
            let captured_at = DateTime::parse_from_rfc3339(&captured_at)
                .map_err(|e| DatabaseError::CorruptRow {
                    table: "list_entries",
                    message: format!("invalid captured_at '{}': {}", captured_at, e),
                })?
                .with_timezone(&Utc);

            images.push(EncodedImage {
                mime_type,
                data,
                captured_at,
            });
        }

        Ok(images)
    }
}
