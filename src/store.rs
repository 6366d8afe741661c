//! SQLite-backed mileage log.
//!
//! Records are append-only: inserted once after a successful read and
//! never updated.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MileageRecord {
    pub id: i64,
    pub mileage: f64,
    pub timestamp: DateTime<Utc>,
}

pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open or create the store at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.init_schema()?;
        log::info!("[STORE] Records table ready at {}", path.display());
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                mileage REAL NOT NULL,
                timestamp TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    pub fn insert(
        &self,
        mileage: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<MileageRecord, StoreError> {
        self.conn.execute(
            "INSERT INTO records (mileage, timestamp) VALUES (?1, ?2)",
            params![mileage, timestamp.to_rfc3339()],
        )?;
        let id = self.conn.last_insert_rowid();
        log::info!("[STORE] Mileage {} stored as id {}", mileage, id);

        Ok(MileageRecord {
            id,
            mileage,
            timestamp,
        })
    }

    /// Newest first, at most `limit` rows.
    pub fn recent(&self, limit: usize) -> Result<Vec<MileageRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, mileage, timestamp FROM records ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            let id: i64 = row.get(0)?;
            let mileage: f64 = row.get(1)?;
            let timestamp: String = row.get(2)?;
            Ok((id, mileage, timestamp))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, mileage, timestamp) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&timestamp)
                .map_err(|e| StoreError::CorruptTimestamp {
                    id,
                    reason: e.to_string(),
                })?
                .with_timezone(&Utc);
            records.push(MileageRecord {
                id,
                mileage,
                timestamp,
            });
        }
        Ok(records)
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Record {id} has an unreadable timestamp: {reason}")]
    CorruptTimestamp { id: i64, reason: String },

    #[error("Record store lock was poisoned")]
    Poisoned,
}
