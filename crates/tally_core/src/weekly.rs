//! Weekly period anchoring.

use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, TimeDelta, Weekday};

/// Fixed weekday and time-of-day at which a weekly period ends.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use tally_core::WeeklyAnchor;
///
/// // Wednesday 2024-05-15 12:00
/// let now = NaiveDate::from_ymd_opt(2024, 5, 15)
///     .and_then(|d| d.and_hms_opt(12, 0, 0))
///     .unwrap();
/// let window = WeeklyAnchor::default().window_for(now);
///
/// // Ends the coming Sunday at 23:30 and spans exactly a week.
/// assert_eq!(window.end.to_string(), "2024-05-19 23:30:00");
/// assert_eq!(window.end - window.start, TimeDelta::weeks(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeeklyAnchor {
    weekday: Weekday,
    time: NaiveTime,
}

impl Default for WeeklyAnchor {
    fn default() -> Self {
        Self {
            weekday: Weekday::Sun,
            time: NaiveTime::from_hms_opt(23, 30, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl WeeklyAnchor {
    /// Anchor at the given weekday and local time.
    pub fn new(weekday: Weekday, time: NaiveTime) -> Self {
        Self { weekday, time }
    }

    /// Weekday the period ends on.
    pub fn weekday(&self) -> Weekday {
        self.weekday
    }

    /// Local time the period ends at.
    pub fn time(&self) -> NaiveTime {
        self.time
    }

    /// First anchor instant strictly after `now`.
    pub fn next_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.weekday().num_days_from_monday();
        let target = self.weekday.num_days_from_monday();
        let days_ahead = (7 + target - today) % 7;
        let candidate = (now.date() + Days::new(u64::from(days_ahead))).and_time(self.time);
        if candidate > now {
            candidate
        } else {
            candidate + TimeDelta::weeks(1)
        }
    }

    /// Seven-day window ending at the next anchor after `now`.
    pub fn window_for(&self, now: NaiveDateTime) -> crate::WeeklyWindow {
        let end = self.next_after(now);
        crate::WeeklyWindow {
            start: end - TimeDelta::weeks(1),
            end,
        }
    }
}
