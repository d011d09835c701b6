//! Permanent all-time counters and resets.

use crate::models::{NewPermanentStats, PermanentStatsRow};
use crate::schema::{emoji_usage, messages, permanent_stats, user_levels, voice_sessions};
use crate::{ActivityStore, DatabaseResult};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::{GuildId, Period, PermanentStanding, UserId};
use tally_error::{DatabaseError, TallyResult, ValidationError, ValidationErrorKind};
use tracing::instrument;

/// Rows removed by a reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
    /// Message events deleted.
    pub messages: usize,
    /// Voice sessions deleted.
    pub voice_sessions: usize,
    /// Emoji usage events deleted.
    pub emoji: usize,
}

/// Monotonic per-member totals that survive period rotation.
///
/// Counters only move through [`increment`](Self::increment), which adds
/// non-negative deltas, and [`reset`](Self::reset), which zeroes them.
#[derive(Debug, Clone)]
pub struct PermanentStatsLedger {
    store: ActivityStore,
}

impl PermanentStatsLedger {
    /// Create a ledger over a shared store.
    pub fn new(store: ActivityStore) -> Self {
        Self { store }
    }

    /// Add to a member's totals, creating the row on first use.
    #[instrument(skip(self))]
    pub async fn increment(
        &self,
        user_id: UserId,
        guild_id: GuildId,
        messages: u32,
        voice_minutes: u32,
    ) -> DatabaseResult<PermanentStanding> {
        let now = self.store.now();
        let messages = i64::from(messages);
        let voice_minutes = i64::from(voice_minutes);
        let mut conn = self.store.lock().await;

        let row: PermanentStatsRow = diesel::insert_into(permanent_stats::table)
            .values(&NewPermanentStats {
                user_id,
                guild_id,
                total_messages: messages,
                total_voice_minutes: voice_minutes,
                last_updated: now,
            })
            .on_conflict((permanent_stats::user_id, permanent_stats::guild_id))
            .do_update()
            .set((
                permanent_stats::total_messages.eq(permanent_stats::total_messages + messages),
                permanent_stats::total_voice_minutes
                    .eq(permanent_stats::total_voice_minutes + voice_minutes),
                permanent_stats::last_updated.eq(now),
            ))
            .returning(PermanentStatsRow::as_returning())
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(row.into())
    }

    /// A member's totals, or `None` if nothing was ever counted.
    #[instrument(skip(self))]
    pub async fn get(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> DatabaseResult<Option<PermanentStanding>> {
        let mut conn = self.store.lock().await;

        permanent_stats::table
            .filter(permanent_stats::user_id.eq(user_id))
            .filter(permanent_stats::guild_id.eq(guild_id))
            .select(PermanentStatsRow::as_select())
            .first(&mut *conn)
            .optional()
            .map(|row| row.map(PermanentStanding::from))
            .map_err(DatabaseError::from)
    }

    /// Highest combined totals in a guild.
    #[instrument(skip(self))]
    pub async fn top(&self, guild_id: GuildId, limit: i64) -> DatabaseResult<Vec<PermanentStanding>> {
        let mut conn = self.store.lock().await;

        let rows: Vec<PermanentStatsRow> = permanent_stats::table
            .filter(permanent_stats::guild_id.eq(guild_id))
            .order((
                (permanent_stats::total_messages + permanent_stats::total_voice_minutes).desc(),
                permanent_stats::user_id.asc(),
            ))
            .limit(limit)
            .select(PermanentStatsRow::as_select())
            .load(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(rows.into_iter().map(PermanentStanding::from).collect())
    }

    /// Wipe a member's history in a guild.
    ///
    /// Deletes their messages, voice sessions and reactions, and zeroes their
    /// level and permanent totals. Role history is kept.
    #[instrument(skip(self))]
    pub async fn reset(&self, user_id: UserId, guild_id: GuildId) -> DatabaseResult<ResetSummary> {
        let now = self.store.now();
        let mut conn = self.store.lock().await;

        let summary = conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
            let messages = diesel::delete(
                messages::table
                    .filter(messages::user_id.eq(user_id))
                    .filter(messages::guild_id.eq(guild_id)),
            )
            .execute(conn)?;

            let voice_sessions = diesel::delete(
                voice_sessions::table
                    .filter(voice_sessions::user_id.eq(user_id))
                    .filter(voice_sessions::guild_id.eq(guild_id)),
            )
            .execute(conn)?;

            let emoji = diesel::delete(
                emoji_usage::table
                    .filter(emoji_usage::user_id.eq(user_id))
                    .filter(emoji_usage::guild_id.eq(guild_id)),
            )
            .execute(conn)?;

            diesel::update(
                user_levels::table
                    .filter(user_levels::user_id.eq(user_id))
                    .filter(user_levels::guild_id.eq(guild_id)),
            )
            .set((user_levels::xp.eq(0.0), user_levels::level.eq(0)))
            .execute(conn)?;

            diesel::update(
                permanent_stats::table
                    .filter(permanent_stats::user_id.eq(user_id))
                    .filter(permanent_stats::guild_id.eq(guild_id)),
            )
            .set((
                permanent_stats::total_messages.eq(0),
                permanent_stats::total_voice_minutes.eq(0),
                permanent_stats::last_updated.eq(now),
            ))
            .execute(conn)?;

            Ok(ResetSummary {
                messages,
                voice_sessions,
                emoji,
            })
        })?;

        tracing::info!(?summary, "Reset member statistics");
        Ok(summary)
    }

    /// Delete a guild's messages and voice sessions inside the period window.
    ///
    /// Only weekly and monthly windows are accepted; anything else is rejected
    /// without touching storage. Levels, permanent totals, reactions and role
    /// history are kept.
    #[instrument(skip(self))]
    pub async fn reset_period(&self, guild_id: GuildId, period: Period) -> TallyResult<ResetSummary> {
        let since = match period {
            Period::Weekly | Period::Monthly => period.window_start(self.store.now()),
            Period::Daily | Period::AllTime => None,
        }
        .ok_or_else(|| {
            ValidationError::new(ValidationErrorKind::ResetPeriodNotAllowed(period.to_string()))
        })?;
        let mut conn = self.store.lock().await;

        let summary = conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
            let messages = diesel::delete(
                messages::table
                    .filter(messages::guild_id.eq(guild_id))
                    .filter(messages::sent_at.ge(since)),
            )
            .execute(conn)?;

            let voice_sessions = diesel::delete(
                voice_sessions::table
                    .filter(voice_sessions::guild_id.eq(guild_id))
                    .filter(voice_sessions::join_time.ge(since)),
            )
            .execute(conn)?;

            Ok(ResetSummary {
                messages,
                voice_sessions,
                emoji: 0,
            })
        })?;

        tracing::info!(?summary, "Reset period statistics");
        Ok(summary)
    }
}
