//! SQLite-backed session history and key-value state.
//!
//! The `reading_sessions` table mirrors the hosted backend's schema (end
//! timestamp in unix seconds, duration in seconds), so local and remote
//! modes agree on what a session is. The `kv` table holds opaque blobs,
//! among them the durable timer state.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{CoreError, StoreError};
use crate::session::ReadingSession;
use crate::store::{SessionStore, StateStore};

use super::data_dir;

/// Window the session listing covers, matching the hosted API's query.
const LIST_WINDOW_SECS: i64 = 14 * 86_400;

/// SQLite database for session history and key-value state.
///
/// The connection sits behind a mutex so the database can serve as a
/// shared trait object; contention is a non-issue at one host per file.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open the database at `~/.config/readlog/readlog.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("readlog.db");
        Ok(Self::open_at(&path)?)
    }

    /// Open a database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and throwaway use).
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.migrate()?;
        Ok(db)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn().execute_batch(
            "CREATE TABLE IF NOT EXISTS reading_sessions (
                timestamp INTEGER NOT NULL,
                duration  INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reading_sessions_timestamp
                ON reading_sessions(timestamp);",
        )?;
        Ok(())
    }

    pub fn insert_session(&self, session: &ReadingSession) -> Result<(), StoreError> {
        self.conn().execute(
            "INSERT INTO reading_sessions (timestamp, duration) VALUES (?1, ?2)",
            params![session.timestamp, session.duration],
        )?;
        Ok(())
    }

    /// Sessions ending strictly after `cutoff_ts`, oldest first.
    pub fn sessions_since(&self, cutoff_ts: i64) -> Result<Vec<ReadingSession>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT timestamp, duration FROM reading_sessions
             WHERE timestamp > ?1 ORDER BY timestamp ASC",
        )?;
        let rows = stmt.query_map(params![cutoff_ts], |row| {
            Ok(ReadingSession {
                timestamp: row.get(0)?,
                duration: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    pub fn delete_session(&self, timestamp: i64) -> Result<(), StoreError> {
        self.conn().execute(
            "DELETE FROM reading_sessions WHERE timestamp = ?1",
            params![timestamp],
        )?;
        Ok(())
    }

    pub fn kv_get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.conn();
        let value = conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn().execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_remove(&self, key: &str) -> Result<(), StoreError> {
        self.conn()
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

impl StateStore for Database {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.kv_get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.kv_set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.kv_remove(key)
    }
}

#[async_trait]
impl SessionStore for Database {
    async fn create(&self, duration_secs: i64) -> Result<ReadingSession, StoreError> {
        // Local mode plays the server's role, so it also assigns the
        // end timestamp from its own clock.
        let session = ReadingSession {
            timestamp: Utc::now().timestamp(),
            duration: duration_secs,
        };
        self.insert_session(&session)?;
        Ok(session)
    }

    async fn list(&self) -> Result<Vec<ReadingSession>, StoreError> {
        self.sessions_since(Utc::now().timestamp() - LIST_WINDOW_SECS)
    }

    async fn delete(&self, timestamp: i64) -> Result<(), StoreError> {
        self.delete_session(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_round_trips_and_removes() {
        let db = Database::open_memory().unwrap();
        assert_eq!(db.kv_get("timer_state").unwrap(), None);

        db.kv_set("timer_state", "blob-1").unwrap();
        db.kv_set("timer_state", "blob-2").unwrap();
        assert_eq!(db.kv_get("timer_state").unwrap().as_deref(), Some("blob-2"));

        db.kv_remove("timer_state").unwrap();
        assert_eq!(db.kv_get("timer_state").unwrap(), None);
        // Removing again is a no-op.
        db.kv_remove("timer_state").unwrap();
    }

    #[test]
    fn sessions_since_filters_and_orders() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now().timestamp();
        for (offset, duration) in [(30 * 86_400, 100), (3 * 86_400, 200), (86_400, 300)] {
            db.insert_session(&ReadingSession {
                timestamp: now - offset,
                duration,
            })
            .unwrap();
        }

        let recent = db.sessions_since(now - LIST_WINDOW_SECS).unwrap();
        let durations: Vec<i64> = recent.iter().map(|s| s.duration).collect();
        assert_eq!(durations, vec![200, 300]);
    }

    #[tokio::test]
    async fn create_list_delete_as_session_store() {
        let db = Database::open_memory().unwrap();

        let session = db.create(420).await.unwrap();
        assert_eq!(session.duration, 420);

        let listed = db.list().await.unwrap();
        assert_eq!(listed, vec![session]);

        db.delete(session.timestamp).await.unwrap();
        assert!(db.list().await.unwrap().is_empty());
    }

    #[test]
    fn reopens_from_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readlog.db");

        {
            let db = Database::open_at(&path).unwrap();
            db.kv_set("timer_state", "persisted").unwrap();
        }

        let db = Database::open_at(&path).unwrap();
        assert_eq!(
            db.kv_get("timer_state").unwrap().as_deref(),
            Some("persisted")
        );
    }
}
