//! Wire format for the durable timer blob.
//!
//! The shape matches what the legacy web client kept in local storage
//! under the `"timer_state"` key, so an existing blob decodes unchanged:
//! `duration` carries accumulated milliseconds (legacy field name),
//! `start` and `now` are RFC 3339 instants or null, and `active` mirrors
//! `start`'s presence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Key the blob is stored under. A single fixed key; there is one timer.
pub const STATE_KEY: &str = "timer_state";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    /// Accumulated milliseconds. Named `duration` for compatibility.
    pub duration: i64,
    pub start: Option<DateTime<Utc>>,
    /// Last display sample. Ignored on decode; the clock is re-sampled.
    pub now: Option<DateTime<Utc>>,
    pub active: bool,
}

impl PersistedState {
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode and validate. A blob claiming `active` without a start
    /// instant, or with negative accumulated time, is corrupt.
    pub fn decode(raw: &str) -> Result<Self, StateError> {
        let state: PersistedState =
            serde_json::from_str(raw).map_err(|e| StateError::Corrupt(e.to_string()))?;
        if state.active && state.start.is_none() {
            return Err(StateError::Corrupt(
                "active with no start instant".to_string(),
            ));
        }
        if state.duration < 0 {
            return Err(StateError::Corrupt(
                "negative accumulated duration".to_string(),
            ));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips() {
        let state = PersistedState {
            duration: 61_000,
            start: Some("2024-03-01T12:00:00Z".parse().unwrap()),
            now: Some("2024-03-01T12:00:05Z".parse().unwrap()),
            active: true,
        };
        let decoded = PersistedState::decode(&state.encode().unwrap()).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn decodes_blob_written_by_the_web_client() {
        // JSON.stringify(new Date()) emits millisecond precision.
        let raw = r#"{"duration":0,"start":"2024-03-01T12:00:00.000Z","now":"2024-03-01T12:00:01.000Z","active":true}"#;
        let state = PersistedState::decode(raw).unwrap();
        assert!(state.active);
        assert_eq!(state.duration, 0);
        assert_eq!(state.start.unwrap().timestamp(), 1_709_294_400);
    }

    #[test]
    fn decodes_paused_blob_with_nulls() {
        let raw = r#"{"duration":90000,"start":null,"now":null,"active":false}"#;
        let state = PersistedState::decode(raw).unwrap();
        assert!(!state.active);
        assert_eq!(state.duration, 90_000);
        assert_eq!(state.start, None);
    }

    #[test]
    fn active_without_start_is_corrupt() {
        let raw = r#"{"duration":0,"start":null,"now":null,"active":true}"#;
        assert!(matches!(
            PersistedState::decode(raw),
            Err(StateError::Corrupt(_))
        ));
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(
            PersistedState::decode("{not json"),
            Err(StateError::Corrupt(_))
        ));
        assert!(matches!(
            PersistedState::decode(r#"{"duration":-5,"start":null,"now":null,"active":false}"#),
            Err(StateError::Corrupt(_))
        ));
    }
}
