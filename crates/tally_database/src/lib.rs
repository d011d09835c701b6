//! SQLite storage for Tally.
//!
//! This crate owns the schema, the embedded migrations and the six storage
//! components that sit on one shared [`ActivityStore`]:
//!
//! - [`EventLog`] appends messages, reactions and role changes
//! - [`SessionReconciler`] pairs voice joins with leaves
//! - [`WindowedAggregator`] answers period-scoped statistics
//! - [`LevelingEngine`] awards XP and detects level-ups
//! - [`WeeklyPeriodManager`] keeps exactly one current weekly period
//! - [`PermanentStatsLedger`] keeps all-time counters and performs resets
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tally_core::{Period, SystemClock};
//! use tally_database::{ActivityStore, WindowedAggregator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ActivityStore::open("tally.db", Arc::new(SystemClock))?;
//! let stats = WindowedAggregator::new(store);
//! let board = stats.message_leaderboard(42, Period::Weekly, 10).await?;
//! # Ok(())
//! # }
//! ```

mod aggregator;
mod connection;
mod event_log;
mod ledger;
mod leveling;
mod models;
mod sessions;
mod store;
mod weekly_periods;

// Public modules for external access
pub mod schema;

pub use aggregator::{
    CHANNEL_TOP_USERS_LIMIT, EMOJI_STATS_LIMIT, MAX_GRAPH_DAYS, PEAK_HOURS_LIMIT,
    WindowedAggregator,
};
pub use connection::{IN_MEMORY_URL, connect, establish_connection, run_migrations};
pub use event_log::{EventLog, LogEntry};
pub use ledger::{PermanentStatsLedger, ResetSummary};
pub use leveling::LevelingEngine;
pub use models::{
    EmojiUsageRow, MessageRow, NewEmojiUsage, NewMessage, NewPermanentStats, NewRoleChange,
    NewUserLevel, NewVoiceSession, NewWeeklyPeriod, PermanentStatsRow, RoleChangeRow,
    UserLevelRow, VoiceSessionRow, WeeklyPeriodRow, XpRateRow,
};
pub use sessions::SessionReconciler;
pub use store::ActivityStore;
pub use weekly_periods::WeeklyPeriodManager;

use tally_error::DatabaseError;

/// Result type for database operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;
