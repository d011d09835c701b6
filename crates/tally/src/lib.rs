//! Tally - guild activity tracking
//!
//! Tally records what members of a chat guild do (messages, voice sessions,
//! reactions, role changes) and answers questions about it: leaderboards over
//! rolling windows, per-channel breakdowns, emoji popularity, XP levels and
//! all-time totals.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tally::{MessageReceivedBuilder, Period, SystemClock, Tracker, TrackerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TrackerConfig::load()?;
//!     let tracker = Tracker::open(&config, Arc::new(SystemClock))?;
//!
//!     let event = MessageReceivedBuilder::default()
//!         .user_id(1)
//!         .channel_id(2)
//!         .guild_id(3)
//!         .build()?;
//!     if let Some(up) = tracker.ingestor().on_message(&event).await? {
//!         println!("Level {}!", up.level);
//!     }
//!
//!     let board = tracker.stats().message_leaderboard(3, Period::Weekly, 10).await?;
//!     println!("{board:?}");
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `tally_error` - Error types
//! - `tally_core` - Events, records, periods, leveling math
//! - `tally_database` - SQLite storage components
//! - `tally_bot` - Ingestion, weekly rotation scheduler, configuration
//!
//! This crate re-exports everything for convenience.

#![forbid(unsafe_code)]

pub use tally_bot::*;
pub use tally_core::*;
pub use tally_database::*;
pub use tally_error::*;
