//! The periodic tick task the timer owns while running.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Callback invoked once per tick, from the runtime's worker thread.
pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Display ticks fire once per second.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// A cancellable repeating timer.
///
/// Cancellation is unconditional and idempotent; dropping the handle
/// cancels too, so the owner can simply replace or discard it.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawn the tick task on the ambient tokio runtime. Panics outside
    /// a runtime, so callers only spawn when a host registered interest.
    pub fn spawn(interval: Duration, on_tick: TickFn) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            // The first interval tick completes immediately; swallow it so
            // callbacks only fire after a full period.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                on_tick();
            }
        });
        Self { handle }
    }

    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
