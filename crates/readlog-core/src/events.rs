use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every timer transition produces an Event. Hosts poll for them or print
/// them; nothing in the core reacts to its own events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        at: DateTime<Utc>,
    },
    TimerPaused {
        accumulated_ms: i64,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        running: bool,
        elapsed_ms: i64,
        elapsed_secs: i64,
        can_submit: bool,
        at: DateTime<Utc>,
    },
}
