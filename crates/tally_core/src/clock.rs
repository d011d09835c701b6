//! Time sources.
//!
//! All stored timestamps are naive local wall-clock times. Components read
//! "now" through a [`Clock`] so open voice sessions and rolling windows can be
//! evaluated against a fixed instant in tests.

use chrono::{NaiveDateTime, TimeDelta};
use parking_lot::Mutex;
use std::sync::Arc;

/// Source of the current local time.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Current local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the operating system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Manually driven clock.
///
/// Clones share the same instant, so a test can hand one clone to the
/// storage handle and keep another to move time forward.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use tally_core::{Clock, FixedClock};
///
/// let start = NaiveDate::from_ymd_opt(2024, 3, 1)
///     .and_then(|d| d.and_hms_opt(12, 0, 0))
///     .unwrap();
/// let clock = FixedClock::new(start);
/// let handle = clock.clone();
/// clock.advance(TimeDelta::minutes(5));
/// assert_eq!(handle.now(), start + TimeDelta::minutes(5));
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl FixedClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// Jump to an absolute instant.
    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock() = now;
    }

    /// Move the clock forward (or backward, for negative deltas).
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock();
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock()
    }
}
