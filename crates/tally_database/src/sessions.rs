//! Voice session reconciliation.
//!
//! Sessions are keyed by (user, channel, guild). Joining always opens a new
//! row; leaving closes the most recently opened row for the same key. A leave
//! with nothing to close is ignored, which covers members who were already
//! connected when the tracker started.

use crate::models::{NewVoiceSession, VoiceSessionRow};
use crate::schema::voice_sessions;
use crate::{ActivityStore, DatabaseResult};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use tally_core::{ChannelId, ClosedSession, GuildId, UserId, session_minutes};
use tally_error::DatabaseError;
use tracing::instrument;

/// Pairs voice joins with leaves.
#[derive(Debug, Clone)]
pub struct SessionReconciler {
    store: ActivityStore,
}

impl SessionReconciler {
    /// Create a reconciler over a shared store.
    pub fn new(store: ActivityStore) -> Self {
        Self { store }
    }

    /// Record a join and return the new session's id.
    ///
    /// Existing open sessions are left alone, so a duplicate join produces two
    /// open rows and the next leave closes the newer one.
    #[instrument(skip(self))]
    pub async fn open_session(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
        guild_id: GuildId,
        join_time: NaiveDateTime,
    ) -> DatabaseResult<i32> {
        let mut conn = self.store.lock().await;

        diesel::insert_into(voice_sessions::table)
            .values(&NewVoiceSession {
                user_id,
                channel_id,
                guild_id,
                join_time,
            })
            .returning(voice_sessions::id)
            .get_result(&mut *conn)
            .map_err(DatabaseError::from)
    }

    /// Close the newest open session for the key, if there is one.
    #[instrument(skip(self))]
    pub async fn close_session(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
        guild_id: GuildId,
        leave_time: NaiveDateTime,
    ) -> DatabaseResult<Option<ClosedSession>> {
        let mut conn = self.store.lock().await;

        let closed = conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
            let open = voice_sessions::table
                .filter(voice_sessions::user_id.eq(user_id))
                .filter(voice_sessions::channel_id.eq(channel_id))
                .filter(voice_sessions::guild_id.eq(guild_id))
                .filter(voice_sessions::leave_time.is_null())
                .order((voice_sessions::join_time.desc(), voice_sessions::id.desc()))
                .select(VoiceSessionRow::as_select())
                .first(conn)
                .optional()?;

            let Some(session) = open else {
                return Ok(None);
            };

            diesel::update(voice_sessions::table.find(session.id))
                .set(voice_sessions::leave_time.eq(Some(leave_time)))
                .execute(conn)?;

            Ok(Some(ClosedSession {
                session_id: session.id,
                user_id,
                channel_id,
                guild_id,
                join_time: session.join_time,
                leave_time,
                minutes: session_minutes(session.join_time, leave_time),
            }))
        })?;

        match &closed {
            Some(session) => tracing::debug!(minutes = session.minutes, "Closed voice session"),
            None => tracing::debug!("Leave without an open session ignored"),
        }
        Ok(closed)
    }

    /// Total voice minutes for a member, open sessions counted through now.
    pub async fn duration_minutes(&self, user_id: UserId, guild_id: GuildId) -> DatabaseResult<i64> {
        self.duration_minutes_as_of(user_id, guild_id, self.store.now())
            .await
    }

    /// Total voice minutes for a member, open sessions counted through `as_of`.
    ///
    /// Each session is truncated to whole minutes before summing.
    #[instrument(skip(self))]
    pub async fn duration_minutes_as_of(
        &self,
        user_id: UserId,
        guild_id: GuildId,
        as_of: NaiveDateTime,
    ) -> DatabaseResult<i64> {
        let mut conn = self.store.lock().await;
        member_voice_minutes(&mut *conn, user_id, guild_id, as_of)
    }

    /// Sessions still open for a member, oldest first.
    #[instrument(skip(self))]
    pub async fn open_sessions(
        &self,
        user_id: UserId,
        guild_id: GuildId,
    ) -> DatabaseResult<Vec<VoiceSessionRow>> {
        let mut conn = self.store.lock().await;

        voice_sessions::table
            .filter(voice_sessions::user_id.eq(user_id))
            .filter(voice_sessions::guild_id.eq(guild_id))
            .filter(voice_sessions::leave_time.is_null())
            .order((voice_sessions::join_time.asc(), voice_sessions::id.asc()))
            .select(VoiceSessionRow::as_select())
            .load(&mut *conn)
            .map_err(DatabaseError::from)
    }
}

/// Sum of per-session minutes for one member.
pub(crate) fn member_voice_minutes(
    conn: &mut SqliteConnection,
    user_id: UserId,
    guild_id: GuildId,
    as_of: NaiveDateTime,
) -> DatabaseResult<i64> {
    let spans: Vec<(NaiveDateTime, Option<NaiveDateTime>)> = voice_sessions::table
        .filter(voice_sessions::user_id.eq(user_id))
        .filter(voice_sessions::guild_id.eq(guild_id))
        .select((voice_sessions::join_time, voice_sessions::leave_time))
        .load(conn)
        .map_err(DatabaseError::from)?;

    Ok(spans
        .into_iter()
        .map(|(join, leave)| session_minutes(join, leave.unwrap_or(as_of)))
        .sum())
}
