//! Time source for task transitions and elapsed-time accounting.
//!
//! Everything that needs "now" takes a [`Clock`] so tests can pin the instant.

use std::cell::Cell;

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Provides the current instant. All instants are UTC.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar day of [`Clock::now`] in UTC
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Host clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}
