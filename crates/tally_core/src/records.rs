//! Plain result records returned by queries.
//!
//! Records carry numbers only; turning them into embeds or text is the
//! presentation layer's job.

use crate::{ChannelId, GuildId, Period, RoleAction, RoleId, UserId, xp_to_next_level};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Whole minutes between `join` and `leave`, truncated toward zero.
///
/// A leave stamped before its join (clock skew between event sources)
/// counts as zero rather than a negative duration.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use tally_core::session_minutes;
///
/// let join = NaiveDate::from_ymd_opt(2024, 1, 1)
///     .and_then(|d| d.and_hms_opt(10, 0, 0))
///     .unwrap();
/// assert_eq!(session_minutes(join, join + TimeDelta::seconds(119)), 1);
/// assert_eq!(session_minutes(join, join - TimeDelta::minutes(3)), 0);
/// ```
pub fn session_minutes(join: NaiveDateTime, leave: NaiveDateTime) -> i64 {
    (leave - join).num_minutes().max(0)
}

/// One row of a message-count ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageLeaderboardEntry {
    /// Ranked user.
    pub user_id: UserId,
    /// Messages in the window.
    pub message_count: i64,
}

/// One row of a voice-time ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceLeaderboardEntry {
    /// Ranked user.
    pub user_id: UserId,
    /// Whole voice minutes in the window.
    pub minutes: i64,
}

/// Message volume for one hour-of-day bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakHour {
    /// Hour of day, 0-23, local to the stored timestamps.
    pub hour: u32,
    /// Messages posted during that hour.
    pub message_count: i64,
}

/// Per-channel breakdown for one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Channel described.
    pub channel_id: ChannelId,
    /// Window the numbers cover.
    pub period: Period,
    /// Messages in the window.
    pub message_count: i64,
    /// Distinct authors in the window.
    pub active_users: i64,
    /// Busiest hours of day, busiest first.
    pub peak_hours: Vec<PeakHour>,
    /// Most active authors, most active first.
    pub top_users: Vec<MessageLeaderboardEntry>,
}

/// Usage count for one emoji name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiCount {
    /// Printable emoji name.
    pub emoji_name: String,
    /// Times used.
    pub count: i64,
}

/// Guild-wide message activity for one period.
///
/// # Examples
///
/// ```
/// use tally_core::{ActivitySummary, Period};
///
/// let quiet = ActivitySummary { period: Period::Daily, message_count: 0, active_users: 0 };
/// assert_eq!(quiet.messages_per_user(), None);
///
/// let busy = ActivitySummary { period: Period::Daily, message_count: 9, active_users: 2 };
/// assert_eq!(busy.messages_per_user(), Some(4.5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySummary {
    /// Window the numbers cover.
    pub period: Period,
    /// Messages in the window.
    pub message_count: i64,
    /// Distinct authors in the window.
    pub active_users: i64,
}

impl ActivitySummary {
    /// Average messages per active user; `None` means "no data".
    pub fn messages_per_user(&self) -> Option<f64> {
        if self.active_users > 0 {
            Some(self.message_count as f64 / self.active_users as f64)
        } else {
            None
        }
    }
}

/// Messages posted on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivity {
    /// Local calendar day.
    pub date: NaiveDate,
    /// Messages posted that day.
    pub message_count: i64,
}

/// A user's XP and level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelStanding {
    /// User described.
    pub user_id: UserId,
    /// Cumulative XP.
    pub xp: f64,
    /// Level derived from `xp`.
    pub level: i32,
}

impl LevelStanding {
    /// XP still missing before the next level.
    pub fn xp_to_next_level(&self) -> f64 {
        xp_to_next_level(self.xp, self.level)
    }
}

/// A level-up transition produced by a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelUp {
    /// User who levelled up.
    pub user_id: UserId,
    /// Guild the level belongs to.
    pub guild_id: GuildId,
    /// XP after the message.
    pub xp: f64,
    /// Newly reached level.
    pub level: i32,
}

/// Cumulative all-time counters for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentStanding {
    /// User described.
    pub user_id: UserId,
    /// Messages ever counted.
    pub total_messages: i64,
    /// Voice minutes ever counted.
    pub total_voice_minutes: i64,
}

impl PermanentStanding {
    /// Ranking key: messages plus voice minutes.
    pub fn score(&self) -> i64 {
        self.total_messages + self.total_voice_minutes
    }
}

/// Profile numbers for one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// User described.
    pub user_id: UserId,
    /// Guild described.
    pub guild_id: GuildId,
    /// Messages in the event log.
    pub message_count: i64,
    /// Voice minutes, open sessions counted through now.
    pub voice_minutes: i64,
    /// Cumulative XP.
    pub xp: f64,
    /// Current level.
    pub level: i32,
}

impl UserProfile {
    /// XP still missing before the next level.
    pub fn xp_to_next_level(&self) -> f64 {
        xp_to_next_level(self.xp, self.level)
    }
}

/// A voice session that was just closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosedSession {
    /// Row id of the session.
    pub session_id: i32,
    /// Member who left.
    pub user_id: UserId,
    /// Channel left.
    pub channel_id: ChannelId,
    /// Guild of the channel.
    pub guild_id: GuildId,
    /// When the member joined.
    pub join_time: NaiveDateTime,
    /// When the member left.
    pub leave_time: NaiveDateTime,
    /// Whole minutes spent in the session.
    pub minutes: i64,
}

/// Bounds of a weekly period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeeklyWindow {
    /// Inclusive start.
    pub start: NaiveDateTime,
    /// End anchor.
    pub end: NaiveDateTime,
}

/// One recorded role grant or revocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChangeRecord {
    /// Member affected.
    pub user_id: UserId,
    /// Guild of the role.
    pub guild_id: GuildId,
    /// Role granted or revoked.
    pub role_id: RoleId,
    /// Direction of the change.
    pub action: RoleAction,
    /// When the change was recorded.
    pub timestamp: NaiveDateTime,
}
