//! Core data types for the Tally activity tracker.
//!
//! This crate holds everything the storage and ingestion layers agree on:
//! identifier aliases, the inbound event shapes, the period selector, the
//! result records handed to presentation code, and the small amount of pure
//! arithmetic (leveling thresholds, weekly anchors, session minutes) that
//! does not need a database.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod clock;
mod events;
mod leveling;
mod period;
mod records;
mod weekly;

pub use clock::{Clock, FixedClock, SystemClock};
pub use events::{
    MessageReceived, MessageReceivedBuilder, ReactionAdded, ReactionAddedBuilder, RoleAction,
    RolesChanged, RolesChangedBuilder, VoiceStateChanged, VoiceStateChangedBuilder,
};
pub use leveling::{
    DEFAULT_XP_RATE, MAX_XP_RATE, MIN_XP_RATE, XP_PER_LEVEL, XpRate, level_for_xp, round_xp,
    xp_to_next_level,
};
pub use period::Period;
pub use records::{
    ActivitySummary, ChannelStats, ClosedSession, DailyActivity, EmojiCount, LevelStanding,
    LevelUp, MessageLeaderboardEntry, PeakHour, PermanentStanding, RoleChangeRecord,
    UserProfile, VoiceLeaderboardEntry, WeeklyWindow, session_minutes,
};
pub use weekly::WeeklyAnchor;

/// Platform snowflake identifying a user.
pub type UserId = i64;
/// Platform snowflake identifying a guild (server).
pub type GuildId = i64;
/// Platform snowflake identifying a channel.
pub type ChannelId = i64;
/// Platform snowflake identifying a role.
pub type RoleId = i64;
