//! Windowed read queries over the event log and voice sessions.
//!
//! Every query takes a [`Period`] and filters on `timestamp >= window start`,
//! where the start is derived from the store's clock. Rankings break ties on
//! the smaller id (or name, or hour) so results are deterministic.

use crate::models::RoleChangeRow;
use crate::schema::{emoji_usage, messages, role_changes, user_levels, voice_sessions, weekly_periods};
use crate::sessions::member_voice_minutes;
use crate::{ActivityStore, DatabaseResult};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use diesel::dsl::{count, count_star};
use diesel::expression_methods::AggregateExpressionMethods;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Date, Integer, Timestamp};
use std::collections::BTreeMap;
use tally_core::{
    ActivitySummary, ChannelId, ChannelStats, DailyActivity, EmojiCount, GuildId,
    MessageLeaderboardEntry, PeakHour, Period, RoleChangeRecord, UserId, UserProfile,
    VoiceLeaderboardEntry, session_minutes,
};
use tally_error::{
    DatabaseError, DatabaseErrorKind, TallyResult, ValidationError, ValidationErrorKind,
};
use tracing::instrument;

/// Hour buckets reported in channel stats.
pub const PEAK_HOURS_LIMIT: i64 = 5;
/// Authors reported in channel stats.
pub const CHANNEL_TOP_USERS_LIMIT: i64 = 5;
/// Emoji reported by [`WindowedAggregator::emoji_stats`] by default.
pub const EMOJI_STATS_LIMIT: i64 = 10;
/// Longest activity graph, in days.
pub const MAX_GRAPH_DAYS: u32 = 30;

#[derive(QueryableByName)]
struct HourBucket {
    #[diesel(sql_type = Integer)]
    hour: i32,
    #[diesel(sql_type = BigInt)]
    message_count: i64,
}

#[derive(QueryableByName)]
struct DayBucket {
    #[diesel(sql_type = Date)]
    day: NaiveDate,
    #[diesel(sql_type = BigInt)]
    message_count: i64,
}

/// Read-only statistics over a time window.
#[derive(Debug, Clone)]
pub struct WindowedAggregator {
    store: ActivityStore,
}

impl WindowedAggregator {
    /// Create an aggregator over a shared store.
    pub fn new(store: ActivityStore) -> Self {
        Self { store }
    }

    /// Lower bound for `period`; all-time maps to the epoch.
    fn since(&self, period: Period) -> NaiveDateTime {
        period
            .window_start(self.store.now())
            .unwrap_or_default()
    }

    /// Messages posted in the guild during the window.
    #[instrument(skip(self))]
    pub async fn message_count(&self, guild_id: GuildId, period: Period) -> DatabaseResult<i64> {
        let since = self.since(period);
        let mut conn = self.store.lock().await;

        messages::table
            .filter(messages::guild_id.eq(guild_id))
            .filter(messages::sent_at.ge(since))
            .count()
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Distinct authors in the guild during the window.
    #[instrument(skip(self))]
    pub async fn active_users(&self, guild_id: GuildId, period: Period) -> DatabaseResult<i64> {
        let since = self.since(period);
        let mut conn = self.store.lock().await;

        messages::table
            .filter(messages::guild_id.eq(guild_id))
            .filter(messages::sent_at.ge(since))
            .select(count(messages::user_id).aggregate_distinct())
            .first(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Messages a single member posted during the window.
    #[instrument(skip(self))]
    pub async fn user_message_count(
        &self,
        user_id: UserId,
        guild_id: GuildId,
        period: Period,
    ) -> DatabaseResult<i64> {
        let since = self.since(period);
        let mut conn = self.store.lock().await;

        messages::table
            .filter(messages::guild_id.eq(guild_id))
            .filter(messages::user_id.eq(user_id))
            .filter(messages::sent_at.ge(since))
            .count()
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Top `limit` authors by message count.
    #[instrument(skip(self))]
    pub async fn message_leaderboard(
        &self,
        guild_id: GuildId,
        period: Period,
        limit: i64,
    ) -> DatabaseResult<Vec<MessageLeaderboardEntry>> {
        let since = self.since(period);
        let mut conn = self.store.lock().await;
        top_authors(&mut *conn, guild_id, None, since, limit)
    }

    /// Top `limit` members by voice minutes.
    ///
    /// Sessions count when they started inside the window; open sessions run
    /// through now. The weekly board starts at the current weekly period when
    /// one exists and falls back to the rolling seven days otherwise.
    #[instrument(skip(self))]
    pub async fn voice_leaderboard(
        &self,
        guild_id: GuildId,
        period: Period,
        limit: i64,
    ) -> DatabaseResult<Vec<VoiceLeaderboardEntry>> {
        let now = self.store.now();
        let mut conn = self.store.lock().await;

        let since = if period == Period::Weekly {
            weekly_periods::table
                .filter(weekly_periods::is_current.eq(true))
                .order(weekly_periods::id.desc())
                .select(weekly_periods::start_time)
                .first::<NaiveDateTime>(&mut *conn)
                .optional()
                .map_err(DatabaseError::from)?
                .unwrap_or(now - TimeDelta::days(7))
        } else {
            period.window_start(now).unwrap_or_default()
        };

        let spans: Vec<(UserId, NaiveDateTime, Option<NaiveDateTime>)> = voice_sessions::table
            .filter(voice_sessions::guild_id.eq(guild_id))
            .filter(voice_sessions::join_time.ge(since))
            .select((
                voice_sessions::user_id,
                voice_sessions::join_time,
                voice_sessions::leave_time,
            ))
            .load(&mut *conn)
            .map_err(DatabaseError::from)?;

        let mut totals: BTreeMap<UserId, i64> = BTreeMap::new();
        for (user_id, join, leave) in spans {
            *totals.entry(user_id).or_default() += session_minutes(join, leave.unwrap_or(now));
        }

        let mut ranked: Vec<VoiceLeaderboardEntry> = totals
            .into_iter()
            .map(|(user_id, minutes)| VoiceLeaderboardEntry { user_id, minutes })
            .collect();
        ranked.sort_by(|a, b| b.minutes.cmp(&a.minutes).then(a.user_id.cmp(&b.user_id)));
        ranked.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(ranked)
    }

    /// Message volume, distinct authors, busiest hours and top authors for a channel.
    #[instrument(skip(self))]
    pub async fn channel_stats(
        &self,
        guild_id: GuildId,
        channel_id: ChannelId,
        period: Period,
    ) -> DatabaseResult<ChannelStats> {
        let since = self.since(period);
        let mut conn = self.store.lock().await;

        let message_count: i64 = messages::table
            .filter(messages::guild_id.eq(guild_id))
            .filter(messages::channel_id.eq(channel_id))
            .filter(messages::sent_at.ge(since))
            .count()
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)?;

        let active_users: i64 = messages::table
            .filter(messages::guild_id.eq(guild_id))
            .filter(messages::channel_id.eq(channel_id))
            .filter(messages::sent_at.ge(since))
            .select(count(messages::user_id).aggregate_distinct())
            .first(&mut *conn)
            .map_err(DatabaseError::from)?;

        let peak_hours = diesel::sql_query(
            "SELECT CAST(strftime('%H', sent_at) AS INTEGER) AS hour, COUNT(*) AS message_count \
             FROM messages \
             WHERE guild_id = ? AND channel_id = ? AND sent_at >= ? \
             GROUP BY hour \
             ORDER BY message_count DESC, hour ASC \
             LIMIT ?",
        )
        .bind::<BigInt, _>(guild_id)
        .bind::<BigInt, _>(channel_id)
        .bind::<Timestamp, _>(since)
        .bind::<BigInt, _>(PEAK_HOURS_LIMIT)
        .load::<HourBucket>(&mut *conn)
        .map_err(DatabaseError::from)?
        .into_iter()
        .map(|bucket| PeakHour {
            hour: u32::try_from(bucket.hour).unwrap_or_default(),
            message_count: bucket.message_count,
        })
        .collect();

        let top_users = top_authors(
            &mut *conn,
            guild_id,
            Some(channel_id),
            since,
            CHANNEL_TOP_USERS_LIMIT,
        )?;

        Ok(ChannelStats {
            channel_id,
            period,
            message_count,
            active_users,
            peak_hours,
            top_users,
        })
    }

    /// Most used emoji names in the guild, all time.
    #[instrument(skip(self))]
    pub async fn emoji_stats(&self, guild_id: GuildId, limit: i64) -> DatabaseResult<Vec<EmojiCount>> {
        let mut conn = self.store.lock().await;

        let rows: Vec<(String, i64)> = emoji_usage::table
            .filter(emoji_usage::guild_id.eq(guild_id))
            .group_by(emoji_usage::emoji_name)
            .select((emoji_usage::emoji_name, count_star()))
            .order((count_star().desc(), emoji_usage::emoji_name.asc()))
            .limit(limit)
            .load(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(rows
            .into_iter()
            .map(|(emoji_name, count)| EmojiCount { emoji_name, count })
            .collect())
    }

    /// Message volume and distinct authors for the whole guild.
    pub async fn activity_summary(
        &self,
        guild_id: GuildId,
        period: Period,
    ) -> DatabaseResult<ActivitySummary> {
        Ok(ActivitySummary {
            period,
            message_count: self.message_count(guild_id, period).await?,
            active_users: self.active_users(guild_id, period).await?,
        })
    }

    /// Messages per local calendar day, oldest first, covering the last `days` days.
    ///
    /// Today counts as one of the days. Days without messages are omitted.
    #[instrument(skip(self))]
    pub async fn daily_activity(
        &self,
        guild_id: GuildId,
        days: u32,
    ) -> TallyResult<Vec<DailyActivity>> {
        if !(1..=MAX_GRAPH_DAYS).contains(&days) {
            return Err(ValidationError::new(ValidationErrorKind::GraphDaysOutOfRange(days)).into());
        }

        let today = self.store.now().date();
        let since = (today - TimeDelta::days(i64::from(days - 1))).and_time(chrono::NaiveTime::MIN);
        let mut conn = self.store.lock().await;

        let buckets = diesel::sql_query(
            "SELECT date(sent_at) AS day, COUNT(*) AS message_count \
             FROM messages \
             WHERE guild_id = ? AND sent_at >= ? \
             GROUP BY day \
             ORDER BY day ASC",
        )
        .bind::<BigInt, _>(guild_id)
        .bind::<Timestamp, _>(since)
        .load::<DayBucket>(&mut *conn)
        .map_err(DatabaseError::from)?;

        Ok(buckets
            .into_iter()
            .map(|bucket| DailyActivity {
                date: bucket.day,
                message_count: bucket.message_count,
            })
            .collect())
    }

    /// Most recent role changes for a member, newest first.
    #[instrument(skip(self))]
    pub async fn role_history(
        &self,
        user_id: UserId,
        guild_id: GuildId,
        limit: i64,
    ) -> DatabaseResult<Vec<RoleChangeRecord>> {
        let mut conn = self.store.lock().await;

        let rows: Vec<RoleChangeRow> = role_changes::table
            .filter(role_changes::user_id.eq(user_id))
            .filter(role_changes::guild_id.eq(guild_id))
            .order((role_changes::changed_at.desc(), role_changes::id.desc()))
            .limit(limit)
            .select(RoleChangeRow::as_select())
            .load(&mut *conn)
            .map_err(DatabaseError::from)?;

        rows.into_iter()
            .map(|row| {
                let action = row.action.parse().map_err(|_| {
                    DatabaseError::new(DatabaseErrorKind::Query(format!(
                        "Unknown role action '{}' in row {}",
                        row.action, row.id
                    )))
                })?;
                Ok(RoleChangeRecord {
                    user_id: row.user_id,
                    guild_id: row.guild_id,
                    role_id: row.role_id,
                    action,
                    timestamp: row.changed_at,
                })
            })
            .collect()
    }

    /// Lifetime message count, voice minutes and level for one member.
    #[instrument(skip(self))]
    pub async fn user_profile(&self, user_id: UserId, guild_id: GuildId) -> DatabaseResult<UserProfile> {
        let now = self.store.now();
        let mut conn = self.store.lock().await;

        let message_count: i64 = messages::table
            .filter(messages::guild_id.eq(guild_id))
            .filter(messages::user_id.eq(user_id))
            .count()
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)?;

        let voice_minutes = member_voice_minutes(&mut *conn, user_id, guild_id, now)?;

        let (xp, level) = user_levels::table
            .filter(user_levels::user_id.eq(user_id))
            .filter(user_levels::guild_id.eq(guild_id))
            .select((user_levels::xp, user_levels::level))
            .first::<(f64, i32)>(&mut *conn)
            .optional()
            .map_err(DatabaseError::from)?
            .unwrap_or((0.0, 0));

        Ok(UserProfile {
            user_id,
            guild_id,
            message_count,
            voice_minutes,
            xp,
            level,
        })
    }
}

fn top_authors(
    conn: &mut SqliteConnection,
    guild_id: GuildId,
    channel_id: Option<ChannelId>,
    since: NaiveDateTime,
    limit: i64,
) -> DatabaseResult<Vec<MessageLeaderboardEntry>> {
    let in_window = messages::table
        .filter(messages::guild_id.eq(guild_id))
        .filter(messages::sent_at.ge(since));

    let rows: Vec<(UserId, i64)> = match channel_id {
        Some(channel_id) => in_window
            .filter(messages::channel_id.eq(channel_id))
            .group_by(messages::user_id)
            .select((messages::user_id, count_star()))
            .order((count_star().desc(), messages::user_id.asc()))
            .limit(limit)
            .load(conn),
        None => in_window
            .group_by(messages::user_id)
            .select((messages::user_id, count_star()))
            .order((count_star().desc(), messages::user_id.asc()))
            .limit(limit)
            .load(conn),
    }
    .map_err(DatabaseError::from)?;

    Ok(rows
        .into_iter()
        .map(|(user_id, message_count)| MessageLeaderboardEntry {
            user_id,
            message_count,
        })
        .collect())
}
