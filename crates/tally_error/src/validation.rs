//! Validation error types.
//!
//! Validation failures are raised before any write happens, so a rejected
//! request never leaves partial state behind.

/// Input validation failures.
#[derive(Debug, Clone, PartialEq, PartialOrd, derive_more::Display)]
pub enum ValidationErrorKind {
    /// XP per message outside of the accepted range.
    #[display("XP rate must be between 0.1 and 100, got {}", _0)]
    XpRateOutOfRange(f64),
    /// Activity graph window outside of the accepted range.
    #[display("Activity graph covers 1 to 30 days, got {}", _0)]
    GraphDaysOutOfRange(u32),
    /// Period that cannot be reset guild-wide.
    #[display("Only weekly and monthly periods can be reset, got '{}'", _0)]
    ResetPeriodNotAllowed(String),
    /// Unrecognized period selector.
    #[display("Unknown period '{}' (expected daily, weekly, monthly or all-time)", _0)]
    UnknownPeriod(String),
}

/// Validation error with source location tracking.
///
/// # Examples
///
/// ```
/// use tally_error::{ValidationError, ValidationErrorKind};
///
/// let err = ValidationError::new(ValidationErrorKind::XpRateOutOfRange(150.0));
/// assert!(format!("{}", err).contains("150"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Validation Error: {} at line {} in {}", kind, line, file)]
pub struct ValidationError {
    /// The kind of error that occurred
    pub kind: ValidationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ValidationError {
    /// Create a new ValidationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ValidationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
