//! # Readlog Core Library
//!
//! Core business logic for Readlog, a reading-session tracker. It
//! implements a CLI-first philosophy where all operations are available
//! via a standalone CLI binary; any GUI would be a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Timer**: a wall-clock-based state machine that measures reading
//!   time across start/pause/reset/submit, persists itself after every
//!   mutation, and rehydrates across restarts
//! - **Stats**: pure aggregation over session history -- daily/weekly
//!   totals, advisory guidance, and per-day chart bins
//! - **Storage**: SQLite-based session history and TOML configuration
//! - **Remote**: HTTP client for the hosted reading API
//!
//! ## Key Components
//!
//! - [`TimerStateMachine`]: the session timer
//! - [`Analyzer`]: aggregates and guidance
//! - [`Database`]: local session and state persistence
//! - [`HttpSessionStore`]: hosted-API session store

pub mod clock;
pub mod error;
pub mod events;
pub mod remote;
pub mod session;
pub mod stats;
pub mod storage;
pub mod store;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, Result, StateError, StoreError};
pub use events::Event;
pub use remote::HttpSessionStore;
pub use session::ReadingSession;
pub use stats::{Analyzer, ChartDomain, DailyTotal, Guidance, Summary};
pub use storage::{Config, Database};
pub use store::{MemorySessionStore, MemoryStateStore, SessionStore, StateStore};
pub use timer::{Phase, TimerStateMachine, MIN_SUBMIT_SECS};
