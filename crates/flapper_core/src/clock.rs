//! Fixed-rate tick counter.

use std::time::Duration;

/// Counts ticks and knows how long one tick should take in paced mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickClock {
    tick: u64,
    interval: Duration,
}

impl TickClock {
    /// `fps` is clamped to at least 1.
    #[must_use]
    pub fn new(fps: u64) -> Self {
        Self {
            tick: 0,
            interval: Duration::from_nanos(1_000_000_000 / fps.max(1)),
        }
    }

    /// Moves to the next tick and returns its number (first tick is 1).
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }
}
