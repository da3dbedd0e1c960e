//! Wall-clock source used by the task service.

use chrono::{DateTime, FixedOffset, Local};

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Reads the system clock in the local offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
