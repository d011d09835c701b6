//! XP and level arithmetic.
//!
//! A level is a pure threshold function of cumulative XP: every
//! [`XP_PER_LEVEL`] points is one level. The stored level column is a cache of
//! [`level_for_xp`] and must always agree with it.

use serde::{Deserialize, Serialize};
use tally_error::{ValidationError, ValidationErrorKind};

/// XP needed per level.
pub const XP_PER_LEVEL: f64 = 100.0;
/// XP per message for guilds without an override.
pub const DEFAULT_XP_RATE: f64 = 10.0;
/// Smallest accepted XP per message.
pub const MIN_XP_RATE: f64 = 0.1;
/// Largest accepted XP per message.
pub const MAX_XP_RATE: f64 = 100.0;

/// Round XP to two decimal places.
pub fn round_xp(xp: f64) -> f64 {
    (xp * 100.0).round() / 100.0
}

/// Level reached with `xp` cumulative points.
///
/// # Examples
///
/// ```
/// use tally_core::level_for_xp;
///
/// assert_eq!(level_for_xp(0.0), 0);
/// assert_eq!(level_for_xp(99.99), 0);
/// assert_eq!(level_for_xp(100.0), 1);
/// assert_eq!(level_for_xp(250.5), 2);
/// ```
pub fn level_for_xp(xp: f64) -> i32 {
    if xp.is_finite() && xp > 0.0 {
        (xp / XP_PER_LEVEL).floor() as i32
    } else {
        0
    }
}

/// XP still missing before `level + 1` is reached.
pub fn xp_to_next_level(xp: f64, level: i32) -> f64 {
    round_xp((f64::from(level) + 1.0) * XP_PER_LEVEL - xp).max(0.0)
}

/// Validated XP-per-message rate.
///
/// # Examples
///
/// ```
/// use tally_core::XpRate;
///
/// assert!(XpRate::new(10.0).is_ok());
/// assert!(XpRate::new(0.05).is_err());
/// assert!(XpRate::new(150.0).is_err());
/// assert_eq!(XpRate::default().value(), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct XpRate(f64);

impl XpRate {
    /// Accepts rates in `[MIN_XP_RATE, MAX_XP_RATE]`; anything else, including
    /// NaN, is rejected rather than clamped.
    pub fn new(rate: f64) -> Result<Self, ValidationError> {
        if (MIN_XP_RATE..=MAX_XP_RATE).contains(&rate) {
            Ok(Self(rate))
        } else {
            Err(ValidationError::new(
                ValidationErrorKind::XpRateOutOfRange(rate),
            ))
        }
    }

    /// The rate as a plain number.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for XpRate {
    fn default() -> Self {
        Self(DEFAULT_XP_RATE)
    }
}

impl TryFrom<f64> for XpRate {
    type Error = ValidationError;

    fn try_from(rate: f64) -> Result<Self, Self::Error> {
        Self::new(rate)
    }
}

impl From<XpRate> for f64 {
    fn from(rate: XpRate) -> Self {
        rate.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_xp_two_decimals() {
        assert_eq!(round_xp(0.1 + 0.2), 0.3);
        assert_eq!(round_xp(10.005_1), 10.01);
        assert_eq!(round_xp(42.0), 42.0);
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(level_for_xp(99.99), 0);
        assert_eq!(level_for_xp(100.0), 1);
        assert_eq!(level_for_xp(1_099.5), 10);
        assert_eq!(level_for_xp(-5.0), 0);
        assert_eq!(level_for_xp(f64::NAN), 0);
    }

    #[test]
    fn test_repeated_small_rates_stay_consistent() {
        let mut xp = 0.0;
        for _ in 0..1_000 {
            xp = round_xp(xp + 0.1);
        }
        assert_eq!(xp, 100.0);
        assert_eq!(level_for_xp(xp), 1);
    }

    #[test]
    fn test_xp_to_next_level() {
        assert_eq!(xp_to_next_level(0.0, 0), 100.0);
        assert_eq!(xp_to_next_level(130.5, 1), 69.5);
    }

    #[test]
    fn test_rate_bounds_are_inclusive() {
        assert!(XpRate::new(MIN_XP_RATE).is_ok());
        assert!(XpRate::new(MAX_XP_RATE).is_ok());
        assert!(XpRate::new(f64::NAN).is_err());
        assert!(XpRate::new(100.01).is_err());
    }
}
