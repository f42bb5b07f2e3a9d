//! Per-attempt deadline growth.

use std::time::Duration;

/// Deadline handed to the next upstream attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    current: Duration,
}

impl Deadline {
    /// Start at the configured base deadline.
    pub fn new(base: Duration) -> Self {
        Self { current: base }
    }

    /// Deadline for the next attempt.
    pub fn current(&self) -> Duration {
        self.current
    }

    /// Double the deadline, saturating at `Duration::MAX`.
    pub fn double(&mut self) {
        self.current = self.current.saturating_mul(2);
    }
}
