//! The session timer state machine.
//!
//! Wall-clock based: `Running` holds the instant it started and elapsed
//! time is a subtraction, so the machine survives arbitrary gaps between
//! calls (process restarts included, via [`rehydrate`]).
//!
//! ## State transitions
//!
//! ```text
//! Idle -> Running -> Idle
//! ```
//!
//! There is no separate Paused phase: pausing folds the running span into
//! the accumulator and returns to `Idle`, which doubles as "fresh" and
//! "ready to resume".
//!
//! [`rehydrate`]: TimerStateMachine::rehydrate

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::clock::Clock;
use crate::error::{CoreError, StateError};
use crate::events::Event;
use crate::session::ReadingSession;
use crate::store::{SessionStore, StateStore};

use super::persist::{PersistedState, STATE_KEY};
use super::ticker::{TickFn, Ticker, TICK_INTERVAL};

/// Minimum whole seconds a session must reach before `submit` records it.
pub const MIN_SUBMIT_SECS: i64 = 5;

/// Timer phase. `Running` carrying its start instant makes the
/// "active implies a start instant" invariant structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running { started_at: DateTime<Utc> },
}

/// Owns elapsed-time accounting across start/pause/reset/submit.
///
/// Every collaborator is constructor-injected; the machine holds no
/// ambient state. State is written to the [`StateStore`] after every
/// mutation and removed on reset and submit, so a later instance can
/// [`rehydrate`](Self::rehydrate) exactly what this one last saw.
pub struct TimerStateMachine {
    phase: Phase,
    /// Milliseconds folded in by earlier running windows.
    accumulated_ms: i64,
    /// Display reference refreshed by `tick`; persisted as the legacy
    /// `now` field.
    last_sample: Option<DateTime<Utc>>,
    clock: Arc<dyn Clock>,
    state_store: Arc<dyn StateStore>,
    sessions: Arc<dyn SessionStore>,
    on_tick: Option<TickFn>,
    ticker: Option<Ticker>,
}

impl TimerStateMachine {
    pub fn new(
        clock: Arc<dyn Clock>,
        state_store: Arc<dyn StateStore>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            phase: Phase::Idle,
            accumulated_ms: 0,
            last_sample: None,
            clock,
            state_store,
            sessions,
            on_tick: None,
            ticker: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn accumulated_ms(&self) -> i64 {
        self.accumulated_ms
    }

    /// Accumulated time plus the current running span, in milliseconds.
    /// Monotonically non-decreasing while running.
    pub fn elapsed_ms(&self) -> i64 {
        let running_ms = match self.phase {
            Phase::Idle => 0,
            Phase::Running { started_at } => {
                (self.clock.now() - started_at).num_milliseconds().max(0)
            }
        };
        self.accumulated_ms + running_ms
    }

    /// Whole elapsed seconds, floored.
    pub fn elapsed_secs(&self) -> i64 {
        self.elapsed_ms() / 1000
    }

    /// Whether `submit` would currently be accepted. Hosts disable the
    /// submit action while this is false.
    pub fn can_submit(&self) -> bool {
        self.elapsed_secs() >= MIN_SUBMIT_SECS
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let elapsed_ms = self.elapsed_ms();
        Event::StateSnapshot {
            running: self.is_running(),
            elapsed_ms,
            elapsed_secs: elapsed_ms / 1000,
            can_submit: self.can_submit(),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin accruing time. No-op while already running.
    pub fn start(&mut self) -> Result<Option<Event>, CoreError> {
        if self.is_running() {
            return Ok(None);
        }
        let now = self.clock.now();
        self.phase = Phase::Running { started_at: now };
        self.last_sample = Some(now);
        self.spawn_ticker();
        self.persist()?;
        Ok(Some(Event::TimerStarted { at: now }))
    }

    /// Fold the running span into the accumulator and stop the tick.
    /// No-op while idle, so calling it twice changes nothing.
    pub fn pause(&mut self) -> Result<Option<Event>, CoreError> {
        let Phase::Running { started_at } = self.phase else {
            return Ok(None);
        };
        let now = self.clock.now();
        self.accumulated_ms += (now - started_at).num_milliseconds().max(0);
        self.phase = Phase::Idle;
        self.last_sample = None;
        self.cancel_ticker();
        self.persist()?;
        Ok(Some(Event::TimerPaused {
            accumulated_ms: self.accumulated_ms,
            at: now,
        }))
    }

    /// Drop all accumulated time and erase the durable blob entirely, so
    /// a later rehydration finds nothing.
    pub fn reset(&mut self) -> Result<Event, CoreError> {
        self.phase = Phase::Idle;
        self.accumulated_ms = 0;
        self.last_sample = None;
        self.cancel_ticker();
        self.state_store.remove(STATE_KEY)?;
        Ok(Event::TimerReset {
            at: self.clock.now(),
        })
    }

    /// Record the elapsed time as a completed session.
    ///
    /// Local state is cleared and the durable blob removed *before* the
    /// store call resolves; the machine never retains state waiting for
    /// acknowledgment, so a failed create loses the elapsed time locally.
    /// The create's `Result` is returned verbatim so hosts can report
    /// the failure.
    ///
    /// Rejected without side effects while under [`MIN_SUBMIT_SECS`].
    pub async fn submit(&mut self) -> Result<ReadingSession, CoreError> {
        let elapsed_secs = self.elapsed_secs();
        if elapsed_secs < MIN_SUBMIT_SECS {
            return Err(StateError::SubmitBelowMinimum {
                elapsed_secs,
                min_secs: MIN_SUBMIT_SECS,
            }
            .into());
        }
        self.phase = Phase::Idle;
        self.accumulated_ms = 0;
        self.last_sample = None;
        self.cancel_ticker();
        if let Err(err) = self.state_store.remove(STATE_KEY) {
            warn!(%err, "failed to clear persisted timer state on submit");
        }
        let session = self.sessions.create(elapsed_secs).await?;
        Ok(session)
    }

    /// Re-sample the display clock and return the current elapsed
    /// milliseconds. Never changes phase or accumulated time; calling it
    /// while idle is a no-op.
    pub fn tick(&mut self) -> i64 {
        if self.is_running() {
            self.last_sample = Some(self.clock.now());
        }
        self.elapsed_ms()
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Restore state persisted by an earlier instance. Call once, before
    /// the first transition.
    ///
    /// A blob that fails to decode is treated as absent (the machine
    /// stays Idle) and logged at WARN. An active blob keeps its persisted
    /// start instant, so time that passed while no instance was alive
    /// still counts; the tick restarts from a fresh clock sample.
    pub fn rehydrate(&mut self) -> Result<(), CoreError> {
        let Some(raw) = self.state_store.get(STATE_KEY)? else {
            return Ok(());
        };
        let state = match PersistedState::decode(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!(%err, "discarding undecodable timer state");
                return Ok(());
            }
        };
        self.accumulated_ms = state.duration;
        match (state.active, state.start) {
            (true, Some(started_at)) => {
                self.phase = Phase::Running { started_at };
                self.last_sample = Some(self.clock.now());
                self.spawn_ticker();
            }
            _ => {
                self.phase = Phase::Idle;
                self.last_sample = None;
            }
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), CoreError> {
        let (start, active) = match self.phase {
            Phase::Idle => (None, false),
            Phase::Running { started_at } => (Some(started_at), true),
        };
        let blob = PersistedState {
            duration: self.accumulated_ms,
            start,
            now: self.last_sample,
            active,
        };
        self.state_store.set(STATE_KEY, &blob.encode()?)?;
        Ok(())
    }

    // ── Tick scheduling ──────────────────────────────────────────────

    /// Register the per-second observer. The tick task only exists while
    /// the machine is running and an observer is registered, so one-shot
    /// hosts never need a runtime. Requires an ambient tokio runtime when
    /// the machine is already running.
    pub fn set_on_tick(&mut self, on_tick: TickFn) {
        self.on_tick = Some(on_tick);
        if self.is_running() {
            self.spawn_ticker();
        }
    }

    fn spawn_ticker(&mut self) {
        self.cancel_ticker();
        if let Some(on_tick) = &self.on_tick {
            self.ticker = Some(Ticker::spawn(TICK_INTERVAL, Arc::clone(on_tick)));
        }
    }

    /// Canceling an absent or already-canceled tick is a no-op.
    fn cancel_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::{MemorySessionStore, MemoryStateStore};
    use chrono::Duration;
    use proptest::prelude::*;

    struct Fixture {
        clock: Arc<ManualClock>,
        state_store: Arc<MemoryStateStore>,
        sessions: Arc<MemorySessionStore>,
    }

    impl Fixture {
        fn new() -> Self {
            let clock = Arc::new(ManualClock::epoch());
            Self {
                state_store: Arc::new(MemoryStateStore::new()),
                sessions: Arc::new(MemorySessionStore::new(clock.clone())),
                clock,
            }
        }

        fn machine(&self) -> TimerStateMachine {
            TimerStateMachine::new(
                self.clock.clone(),
                self.state_store.clone(),
                self.sessions.clone(),
            )
        }
    }

    #[test]
    fn start_wait_pause_accumulates() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        timer.start().unwrap();
        fx.clock.advance(Duration::seconds(3));
        timer.pause().unwrap();

        assert_eq!(timer.accumulated_ms(), 3_000);
        assert_eq!(timer.elapsed_ms(), 3_000);
        assert!(!timer.is_running());
    }

    #[test]
    fn start_while_running_is_a_noop() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        assert!(timer.start().unwrap().is_some());
        fx.clock.advance(Duration::seconds(2));
        assert!(timer.start().unwrap().is_none());
        // The original start instant is kept.
        fx.clock.advance(Duration::seconds(1));
        assert_eq!(timer.elapsed_ms(), 3_000);
    }

    #[test]
    fn pause_is_idempotent() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        timer.start().unwrap();
        fx.clock.advance(Duration::seconds(2));
        assert!(timer.pause().unwrap().is_some());
        let after_first = timer.accumulated_ms();

        fx.clock.advance(Duration::seconds(10));
        assert!(timer.pause().unwrap().is_none());
        assert_eq!(timer.accumulated_ms(), after_first);
    }

    #[test]
    fn elapsed_keeps_counting_while_running() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        timer.start().unwrap();
        fx.clock.advance(Duration::milliseconds(1_500));
        assert_eq!(timer.elapsed_ms(), 1_500);
        fx.clock.advance(Duration::milliseconds(500));
        assert_eq!(timer.elapsed_ms(), 2_000);
        assert_eq!(timer.elapsed_secs(), 2);
    }

    #[test]
    fn tick_does_not_mutate_state() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        timer.start().unwrap();
        fx.clock.advance(Duration::seconds(1));
        let phase = timer.phase();
        assert_eq!(timer.tick(), 1_000);
        assert_eq!(timer.phase(), phase);
        assert_eq!(timer.accumulated_ms(), 0);

        // Idle tick is a no-op.
        timer.pause().unwrap();
        assert_eq!(timer.tick(), 1_000);
    }

    #[test]
    fn reset_clears_state_and_storage() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        timer.start().unwrap();
        fx.clock.advance(Duration::seconds(30));
        timer.pause().unwrap();
        assert!(fx.state_store.get(STATE_KEY).unwrap().is_some());

        timer.reset().unwrap();
        assert_eq!(timer.accumulated_ms(), 0);
        assert!(!timer.is_running());
        assert!(fx.state_store.get(STATE_KEY).unwrap().is_none());

        // Rehydration after reset finds nothing.
        let mut fresh = fx.machine();
        fresh.rehydrate().unwrap();
        assert_eq!(fresh.elapsed_ms(), 0);
    }

    #[test]
    fn rehydrates_paused_state() {
        let fx = Fixture::new();
        let mut timer = fx.machine();
        timer.start().unwrap();
        fx.clock.advance(Duration::seconds(42));
        timer.pause().unwrap();

        let mut restored = fx.machine();
        restored.rehydrate().unwrap();
        assert!(!restored.is_running());
        assert_eq!(restored.accumulated_ms(), 42_000);
    }

    #[test]
    fn rehydrates_running_state_across_the_gap() {
        let fx = Fixture::new();
        let mut timer = fx.machine();
        timer.start().unwrap();
        fx.clock.advance(Duration::seconds(10));
        drop(timer);

        // Time kept passing while no instance was alive.
        fx.clock.advance(Duration::seconds(20));
        let mut restored = fx.machine();
        restored.rehydrate().unwrap();
        assert!(restored.is_running());
        assert_eq!(restored.elapsed_ms(), 30_000);
    }

    #[test]
    fn rehydrate_treats_corrupt_blob_as_absent() {
        let fx = Fixture::new();
        fx.state_store.set(STATE_KEY, "{not json").unwrap();

        let mut timer = fx.machine();
        timer.rehydrate().unwrap();
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_ms(), 0);
    }

    #[tokio::test]
    async fn submit_below_minimum_is_rejected_without_side_effects() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        timer.start().unwrap();
        fx.clock.advance(Duration::milliseconds(4_999));
        assert!(!timer.can_submit());

        let err = timer.submit().await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::State(StateError::SubmitBelowMinimum { elapsed_secs: 4, .. })
        ));
        // Still running, nothing recorded, blob still there.
        assert!(timer.is_running());
        assert!(fx.sessions.list().await.unwrap().is_empty());
        assert!(fx.state_store.get(STATE_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn submit_records_floored_seconds_and_clears() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        timer.start().unwrap();
        fx.clock.advance(Duration::milliseconds(7_900));
        assert!(timer.can_submit());

        let session = timer.submit().await.unwrap();
        assert_eq!(session.duration, 7);
        assert!(!timer.is_running());
        assert_eq!(timer.elapsed_ms(), 0);
        assert!(fx.state_store.get(STATE_KEY).unwrap().is_none());
        assert_eq!(fx.sessions.list().await.unwrap(), vec![session]);
    }

    #[tokio::test]
    async fn submit_counts_accumulated_plus_running_span() {
        let fx = Fixture::new();
        let mut timer = fx.machine();

        timer.start().unwrap();
        fx.clock.advance(Duration::seconds(4));
        timer.pause().unwrap();
        timer.start().unwrap();
        fx.clock.advance(Duration::seconds(4));

        // Still running at submit time: 4s folded + 4s live.
        let session = timer.submit().await.unwrap();
        assert_eq!(session.duration, 8);
    }

    proptest! {
        /// Any alternation of start/advance/pause accumulates exactly the
        /// advances that happened while running.
        #[test]
        fn accumulates_only_running_spans(spans in prop::collection::vec((0u32..600_000, any::<bool>()), 1..20)) {
            let fx = Fixture::new();
            let mut timer = fx.machine();
            let mut expected: i64 = 0;

            for (ms, run) in spans {
                if run {
                    timer.start().unwrap();
                    fx.clock.advance(Duration::milliseconds(ms as i64));
                    timer.pause().unwrap();
                    expected += ms as i64;
                } else {
                    fx.clock.advance(Duration::milliseconds(ms as i64));
                }
            }

            prop_assert_eq!(timer.elapsed_ms(), expected);
        }
    }
}
