//! Period selector for windowed queries.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tally_error::{ValidationError, ValidationErrorKind};

/// Fixed set of reporting windows.
///
/// Each selector defines a minimum-timestamp filter relative to "now". The
/// weekly voice leaderboard is the one query that may substitute the current
/// weekly period for the rolling seven days; see the aggregator.
///
/// # Examples
///
/// ```
/// use tally_core::Period;
///
/// let period = Period::parse("monthly").unwrap();
/// assert_eq!(period, Period::Monthly);
/// assert_eq!(Period::AllTime.to_string(), "all-time");
/// assert!(Period::parse("fortnightly").is_err());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Period {
    /// Last 24 hours.
    #[default]
    Daily,
    /// Last 7 days.
    Weekly,
    /// Last 30 days.
    Monthly,
    /// No lower bound.
    #[strum(to_string = "all-time", serialize = "alltime", serialize = "all")]
    AllTime,
}

impl Period {
    /// Parse a selector, reporting unknown names as a validation failure.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        value
            .trim()
            .parse()
            .map_err(|_| ValidationError::new(ValidationErrorKind::UnknownPeriod(value.to_string())))
    }

    /// Length of the rolling window, or `None` for all-time.
    pub fn lookback(&self) -> Option<TimeDelta> {
        match self {
            Period::Daily => Some(TimeDelta::days(1)),
            Period::Weekly => Some(TimeDelta::weeks(1)),
            Period::Monthly => Some(TimeDelta::days(30)),
            Period::AllTime => None,
        }
    }

    /// Earliest timestamp included in the window ending at `now`.
    pub fn window_start(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.lookback().map(|lookback| now - lookback)
    }
}
