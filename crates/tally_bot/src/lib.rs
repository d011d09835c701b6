//! Event ingestion and background scheduling for Tally.
//!
//! - [`EventIngestor`] turns gateway events into storage calls
//! - [`RotationScheduler`] rotates the weekly period on a timer
//! - [`TrackerConfig`] loads layered TOML configuration
//! - [`Tracker`] wires the storage components around one store

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod ingestion;
mod scheduler;
mod tracker;

pub use config::{LeaderboardConfig, LevelingConfig, RotationConfig, RotationPolicy, TrackerConfig};
pub use ingestion::{EventIngestor, InboundEvent, IngestOutcome};
pub use scheduler::{RotationBot, RotationHandle, RotationMessage, RotationScheduler};
pub use tracker::Tracker;
