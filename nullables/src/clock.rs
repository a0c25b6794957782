//! Nullable clock: deterministic time for testing and replay.

use agora_types::Timestamp;
use std::cell::Cell;

/// A deterministic clock.
///
/// Time only advances when you tell it to. The engine takes `now` as an
/// argument on every call; this clock is where tests and the replay tool
/// get that argument from.
#[derive(Debug, Default)]
pub struct NullClock {
    current: Cell<u64>,
}

impl NullClock {
    pub fn new(initial_secs: u64) -> Self {
        Self {
            current: Cell::new(initial_secs),
        }
    }

    /// Get the current time.
    pub fn now(&self) -> Timestamp {
        Timestamp::new(self.current.get())
    }

    /// Advance time by a number of seconds.
    pub fn advance(&self, secs: u64) {
        self.current.set(self.current.get().saturating_add(secs));
    }

    /// Set the time to a specific value.
    pub fn set(&self, secs: u64) {
        self.current.set(secs);
    }
}
