//! Storage traits the timer and analytics are written against.
//!
//! Hosts pick the implementations: [`crate::storage::Database`] covers
//! both traits locally, [`crate::remote::HttpSessionStore`] talks to the
//! hosted API, and the in-memory doubles here back tests and embedders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::clock::Clock;
use crate::error::StoreError;
use crate::session::ReadingSession;

/// Durable store for one opaque state blob per key.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    /// Removing an absent key is a no-op, not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Backing store for completed reading sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record a completed session. The store assigns the end timestamp.
    async fn create(&self, duration_secs: i64) -> Result<ReadingSession, StoreError>;

    /// Recent sessions (the trailing two weeks), in no particular order.
    async fn list(&self) -> Result<Vec<ReadingSession>, StoreError>;

    /// Delete the session that ended at `timestamp`.
    async fn delete(&self, timestamp: i64) -> Result<(), StoreError>;
}

/// In-memory [`StateStore`].
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(blobs.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        blobs.remove(key);
        Ok(())
    }
}

/// In-memory [`SessionStore`]. Timestamps come from the injected clock,
/// so tests control them.
pub struct MemorySessionStore {
    clock: Arc<dyn Clock>,
    sessions: Mutex<Vec<ReadingSession>>,
}

impl MemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            sessions: Mutex::new(Vec::new()),
        }
    }

    /// Seed the store with existing history.
    pub fn with_sessions(clock: Arc<dyn Clock>, sessions: Vec<ReadingSession>) -> Self {
        Self {
            clock,
            sessions: Mutex::new(sessions),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, duration_secs: i64) -> Result<ReadingSession, StoreError> {
        let session = ReadingSession {
            timestamp: self.clock.now().timestamp(),
            duration: duration_secs,
        };
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.push(session);
        Ok(session)
    }

    async fn list(&self) -> Result<Vec<ReadingSession>, StoreError> {
        let cutoff = self.clock.now().timestamp() - 14 * 86_400;
        let sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        Ok(sessions.iter().copied().filter(|s| s.timestamp > cutoff).collect())
    }

    async fn delete(&self, timestamp: i64) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.retain(|s| s.timestamp != timestamp);
        Ok(())
    }
}
