//! Top-level error wrapper types.

use crate::{ConfigError, IoError, JsonError, SchedulerError, ValidationError};
#[cfg(feature = "database")]
use crate::DatabaseError;

/// Every error the tracker can surface to a caller.
///
/// # Examples
///
/// ```
/// use tally_error::{ConfigError, TallyError};
///
/// let err: TallyError = ConfigError::new("missing database_url").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum TallyErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Rejected input
    #[from(ValidationError)]
    Validation(ValidationError),
    /// Background task unreachable
    #[from(SchedulerError)]
    Scheduler(SchedulerError),
    /// JSON encoding or decoding
    #[from(JsonError)]
    Json(JsonError),
    /// Input or output stream
    #[from(IoError)]
    Io(IoError),
    /// Storage error
    #[cfg(feature = "database")]
    #[from(DatabaseError)]
    Database(DatabaseError),
}

/// Tally error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Tally Error: {}", _0)]
pub struct TallyError(Box<TallyErrorKind>);

impl TallyError {
    /// Create a new error from a kind.
    pub fn new(kind: TallyErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &TallyErrorKind {
        &self.0
    }
}

impl<T> From<T> for TallyError
where
    T: Into<TallyErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Tally operations.
pub type TallyResult<T> = std::result::Result<T, TallyError>;
