//! Time source for the engine.
//!
//! Cancellation stamps and the "is this record in the past" rule both read the
//! current time through [`Clock`] so callers decide where time comes from.

use chrono::{DateTime, NaiveDate, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used for past/future decisions.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Noon UTC on the given date.
    pub fn on(date: NaiveDate) -> Self {
        Self(date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
