//! Row types for the activity tables.

use crate::schema::{
    emoji_usage, messages, permanent_stats, role_changes, user_levels, voice_sessions,
    weekly_periods, xp_rates,
};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use tally_core::{ChannelId, GuildId, PermanentStanding, UserId, WeeklyWindow};

/// Database row for the messages table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MessageRow {
    pub id: i32,
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub sent_at: NaiveDateTime,
}

/// Insertable message event.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessage {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub sent_at: NaiveDateTime,
}

/// Database row for the voice_sessions table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = voice_sessions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct VoiceSessionRow {
    pub id: i32,
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub join_time: NaiveDateTime,
    pub leave_time: Option<NaiveDateTime>,
}

impl VoiceSessionRow {
    /// True while the member has not left.
    pub fn is_open(&self) -> bool {
        self.leave_time.is_none()
    }
}

/// Insertable voice session, always opened without a leave time.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = voice_sessions)]
pub struct NewVoiceSession {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub join_time: NaiveDateTime,
}

/// Database row for the emoji_usage table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = emoji_usage)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct EmojiUsageRow {
    pub id: i32,
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub emoji_id: Option<String>,
    pub emoji_name: String,
    pub used_at: NaiveDateTime,
}

/// Insertable emoji usage event.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = emoji_usage)]
pub struct NewEmojiUsage {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub emoji_id: Option<String>,
    pub emoji_name: String,
    pub used_at: NaiveDateTime,
}

/// Database row for the role_changes table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = role_changes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct RoleChangeRow {
    pub id: i32,
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub role_id: i64,
    pub action: String,
    pub changed_at: NaiveDateTime,
}

/// Insertable role change event.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = role_changes)]
pub struct NewRoleChange {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub role_id: i64,
    pub action: String,
    pub changed_at: NaiveDateTime,
}

/// Database row for the user_levels table.
#[derive(Debug, Clone, PartialEq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = user_levels)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserLevelRow {
    pub id: i32,
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub xp: f64,
    pub level: i32,
    pub last_message_time: Option<NaiveDateTime>,
}

/// Insertable zeroed level record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_levels)]
pub struct NewUserLevel {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub xp: f64,
    pub level: i32,
}

/// Database row for the weekly_periods table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = weekly_periods)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct WeeklyPeriodRow {
    pub id: i32,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_current: bool,
}

impl From<&WeeklyPeriodRow> for WeeklyWindow {
    fn from(row: &WeeklyPeriodRow) -> Self {
        WeeklyWindow {
            start: row.start_time,
            end: row.end_time,
        }
    }
}

/// Insertable weekly period.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = weekly_periods)]
pub struct NewWeeklyPeriod {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub is_current: bool,
}

/// Database row for the permanent_stats table.
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = permanent_stats)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PermanentStatsRow {
    pub id: i32,
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub total_messages: i64,
    pub total_voice_minutes: i64,
    pub last_updated: NaiveDateTime,
}

impl From<PermanentStatsRow> for PermanentStanding {
    fn from(row: PermanentStatsRow) -> Self {
        PermanentStanding {
            user_id: row.user_id,
            total_messages: row.total_messages,
            total_voice_minutes: row.total_voice_minutes,
        }
    }
}

/// Insertable counter row carrying the first delta.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = permanent_stats)]
pub struct NewPermanentStats {
    pub user_id: UserId,
    pub guild_id: GuildId,
    pub total_messages: i64,
    pub total_voice_minutes: i64,
    pub last_updated: NaiveDateTime,
}

/// Per-guild XP override.
#[derive(Debug, Clone, PartialEq, Queryable, Insertable, Selectable)]
#[diesel(table_name = xp_rates)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct XpRateRow {
    pub guild_id: GuildId,
    pub xp_per_message: f64,
}
