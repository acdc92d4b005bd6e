//! rollcall-store — SQLite attendance log.
//!
//! The `attendance` table is dropped and recreated every time a session
//! opens the store; history is not carried across runs.

use rollcall_core::{AttendanceRecord, AttendanceSink, BoxError};
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;
use thiserror::Error;

const RESET_SCHEMA: &str = "
    DROP TABLE IF EXISTS attendance;
    CREATE TABLE attendance (name TEXT, subject TEXT, timing TEXT, date TEXT, timestamp TEXT);
";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create database directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("attendance database not found: {0}")]
    NotFound(String),
}

pub struct AttendanceStore {
    conn: Connection,
}

impl AttendanceStore {
    /// Open the database for a new session, resetting the attendance table.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch(RESET_SCHEMA)?;
        tracing::info!(path = %path.display(), "attendance table reset");
        Ok(Self { conn })
    }

    /// Open an existing database read-only, keeping its rows.
    pub fn open_existing(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(RESET_SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert one record in its own transaction.
    pub fn insert(&mut self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO attendance (name, subject, timing, date, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.name,
                record.subject,
                record.timing,
                record.date,
                record.timestamp
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    /// All rows in insertion order.
    pub fn records(&self) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT name, subject, timing, date, timestamp FROM attendance ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(AttendanceRecord {
                name: row.get(0)?,
                subject: row.get(1)?,
                timing: row.get(2)?,
                date: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?;
        let records = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Close the connection, surfacing any error SQLite reports on close.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, e)| StoreError::Sqlite(e))
    }
}

impl AttendanceSink for AttendanceStore {
    fn append(&mut self, record: &AttendanceRecord) -> Result<(), BoxError> {
        self.insert(record).map_err(|e| Box::new(e) as BoxError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, ts: &str) -> AttendanceRecord {
        AttendanceRecord {
            name: name.into(),
            subject: "Physics".into(),
            timing: "10:00 - 11:00".into(),
            date: "2024-03-04".into(),
            timestamp: ts.into(),
        }
    }

    #[test]
    fn test_insert_and_read_back_in_order() {
        let mut store = AttendanceStore::open_in_memory().unwrap();
        store.insert(&record("Bob", "10:01:00")).unwrap();
        store.insert(&record("Alice", "10:02:30")).unwrap();

        let rows = store.records().unwrap();
        assert_eq!(rows, vec![record("Bob", "10:01:00"), record("Alice", "10:02:30")]);
    }

    #[test]
    fn test_open_resets_previous_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attendance_db.sqlite");

        let mut first = AttendanceStore::open(&path).unwrap();
        first.insert(&record("Alice", "09:00:00")).unwrap();
        first.close().unwrap();

        let second = AttendanceStore::open(&path).unwrap();
        assert!(second.records().unwrap().is_empty());
    }

    #[test]
    fn test_open_existing_keeps_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/attendance.sqlite");

        let mut store = AttendanceStore::open(&path).unwrap();
        store.insert(&record("Alice", "09:00:00")).unwrap();
        drop(store);

        let reader = AttendanceStore::open_existing(&path).unwrap();
        assert_eq!(reader.records().unwrap(), vec![record("Alice", "09:00:00")]);
    }

    #[test]
    fn test_open_existing_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = AttendanceStore::open_existing(&dir.path().join("absent.sqlite"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_sink_surfaces_write_failure() {
        let mut store = AttendanceStore::open_in_memory().unwrap();
        store.conn.execute_batch("DROP TABLE attendance").unwrap();
        let err = store.append(&record("Alice", "09:00:00")).unwrap_err();
        assert!(err.to_string().contains("sqlite"));
    }
}
