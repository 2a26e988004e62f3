mod machine;
mod persist;
mod ticker;

pub use machine::{Phase, TimerStateMachine, MIN_SUBMIT_SECS};
pub use persist::{PersistedState, STATE_KEY};
pub use ticker::{TickFn, Ticker, TICK_INTERVAL};
