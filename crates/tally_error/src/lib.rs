//! Error types for the Tally activity tracker.
//!
//! # Error Hierarchy
//!
//! Errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - Constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use tally_error::{TallyResult, ValidationError, ValidationErrorKind};
//!
//! fn check_rate(rate: f64) -> TallyResult<f64> {
//!     if rate < 0.1 {
//!         Err(ValidationError::new(ValidationErrorKind::XpRateOutOfRange(rate)))?
//!     }
//!     Ok(rate)
//! }
//!
//! assert!(check_rate(0.05).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
#[cfg(feature = "database")]
mod database;
mod error;
mod io;
mod json;
mod scheduler;
mod validation;

pub use config::ConfigError;
#[cfg(feature = "database")]
pub use database::{DatabaseError, DatabaseErrorKind};
pub use error::{TallyError, TallyErrorKind, TallyResult};
pub use io::IoError;
pub use json::JsonError;
pub use scheduler::SchedulerError;
pub use validation::{ValidationError, ValidationErrorKind};
