//! Repository pattern for marker storage.

use chrono::Utc;
use echoread_core::{Marker, MarkerSnapshot};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::store::error::StoreError;

type Result<T> = std::result::Result<T, StoreError>;

/// Repository for presence markers.
///
/// A marker is present when its key holds a non-empty value.
pub trait MarkerRepository {
    fn get_markers(&self) -> Result<MarkerSnapshot>;
    fn get_marker_value(&self, marker: Marker) -> Result<Option<String>>;
    fn set_marker(&self, marker: Marker, value: &str) -> Result<()>;
    fn clear_marker(&self, marker: Marker) -> Result<()>;
}

/// SQLite implementation of the marker repository.
pub struct SqliteMarkerStore {
    conn: Connection,
}

impl SqliteMarkerStore {
    /// Open database at path, creating if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(super::schema::SCHEMA)?;
        Ok(())
    }
}

impl MarkerRepository for SqliteMarkerStore {
    fn get_markers(&self) -> Result<MarkerSnapshot> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM local_markers WHERE value <> ''")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let markers = keys.iter().filter_map(|key| {
            let marker = Marker::from_key(key);
            if marker.is_none() {
                tracing::debug!(key = %key, "Ignoring unknown local marker");
            }
            marker
        });
        Ok(MarkerSnapshot::new(markers))
    }

    fn get_marker_value(&self, marker: Marker) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM local_markers WHERE key = ?1",
                params![marker.key()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    fn set_marker(&self, marker: Marker, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(StoreError::InvalidData(format!(
                "empty value for marker {}",
                marker.key()
            )));
        }
        self.conn.execute(
            "INSERT OR REPLACE INTO local_markers (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![marker.key(), value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn clear_marker(&self, marker: Marker) -> Result<()> {
        self.conn.execute(
            "DELETE FROM local_markers WHERE key = ?1",
            params![marker.key()],
        )?;
        Ok(())
    }
}
