//! Monotonic time sources for the playback loop.

use std::cell::Cell;
use std::time::Instant;
use crate::core::time::Time;

/// Supplies the `now` passed to each tick (nanoseconds, monotonic)
pub trait Clock {
    fn now(&self) -> Time;
}

/// Wall clock measured from when it was created
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Time {
        self.origin.elapsed().as_nanos() as Time
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<Time>,
}

impl ManualClock {
    pub fn new(start: Time) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: Time) {
        self.now.set(now);
    }

    pub fn advance(&self, delta: Time) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Time {
        self.now.get()
    }
}
