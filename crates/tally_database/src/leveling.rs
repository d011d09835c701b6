//! XP accrual and level derivation.

use crate::models::{NewUserLevel, UserLevelRow, XpRateRow};
use crate::schema::{user_levels, xp_rates};
use crate::{ActivityStore, DatabaseResult};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use tally_core::{GuildId, LevelStanding, LevelUp, UserId, XpRate, level_for_xp, round_xp};
use tally_error::{DatabaseError, TallyResult};
use tracing::instrument;

/// Awards XP per message and tracks levels.
///
/// Level is always `floor(xp / 100)`; XP only grows between resets, so the
/// stored level never decreases either.
#[derive(Debug, Clone)]
pub struct LevelingEngine {
    store: ActivityStore,
    default_rate: XpRate,
}

impl LevelingEngine {
    /// Create a leveling engine over a shared store.
    pub fn new(store: ActivityStore) -> Self {
        Self::with_default_rate(store, XpRate::default())
    }

    /// Create a leveling engine whose guilds without an override earn `default_rate`.
    pub fn with_default_rate(store: ActivityStore, default_rate: XpRate) -> Self {
        Self {
            store,
            default_rate,
        }
    }

    /// Credit one message and report a level-up if the threshold was crossed.
    ///
    /// The member's record is created on first use. XP is rounded to two
    /// decimals after each award.
    #[instrument(skip(self))]
    pub async fn on_message(
        &self,
        user_id: UserId,
        guild_id: GuildId,
        at: NaiveDateTime,
    ) -> DatabaseResult<Option<LevelUp>> {
        let mut conn = self.store.lock().await;

        let level_up = conn.immediate_transaction::<_, DatabaseError, _>(|conn| {
            let rate = guild_rate(conn, guild_id, self.default_rate)?;

            diesel::insert_into(user_levels::table)
                .values(&NewUserLevel {
                    user_id,
                    guild_id,
                    xp: 0.0,
                    level: 0,
                })
                .on_conflict((user_levels::user_id, user_levels::guild_id))
                .do_nothing()
                .execute(conn)?;

            let current = user_levels::table
                .filter(user_levels::user_id.eq(user_id))
                .filter(user_levels::guild_id.eq(guild_id))
                .select(UserLevelRow::as_select())
                .first(conn)?;

            let xp = round_xp(current.xp + rate.value());
            let level = level_for_xp(xp).max(current.level);

            diesel::update(user_levels::table.find(current.id))
                .set((
                    user_levels::xp.eq(xp),
                    user_levels::level.eq(level),
                    user_levels::last_message_time.eq(Some(at)),
                ))
                .execute(conn)?;

            Ok((level > current.level).then_some(LevelUp {
                user_id,
                guild_id,
                xp,
                level,
            }))
        })?;

        if let Some(up) = &level_up {
            tracing::info!(level = up.level, xp = up.xp, "Member levelled up");
        }
        Ok(level_up)
    }

    /// XP awarded per message in a guild: its override, else the default rate.
    #[instrument(skip(self))]
    pub async fn xp_rate(&self, guild_id: GuildId) -> DatabaseResult<XpRate> {
        let mut conn = self.store.lock().await;
        guild_rate(&mut *conn, guild_id, self.default_rate)
    }

    /// Override the per-message XP for a guild.
    ///
    /// # Errors
    ///
    /// Rejects rates outside [`tally_core::MIN_XP_RATE`]..=[`tally_core::MAX_XP_RATE`]
    /// without touching storage.
    #[instrument(skip(self))]
    pub async fn set_xp_rate(&self, guild_id: GuildId, rate: f64) -> TallyResult<XpRate> {
        let rate = XpRate::new(rate)?;
        let mut conn = self.store.lock().await;

        diesel::insert_into(xp_rates::table)
            .values(&XpRateRow {
                guild_id,
                xp_per_message: rate.value(),
            })
            .on_conflict(xp_rates::guild_id)
            .do_update()
            .set(xp_rates::xp_per_message.eq(rate.value()))
            .execute(&mut *conn)
            .map_err(DatabaseError::from)?;

        tracing::info!(rate = rate.value(), "Updated guild XP rate");
        Ok(rate)
    }

    /// XP and level for a member; members never seen report zero.
    #[instrument(skip(self))]
    pub async fn level_of(&self, user_id: UserId, guild_id: GuildId) -> DatabaseResult<LevelStanding> {
        let mut conn = self.store.lock().await;

        let row = user_levels::table
            .filter(user_levels::user_id.eq(user_id))
            .filter(user_levels::guild_id.eq(guild_id))
            .select((user_levels::xp, user_levels::level))
            .first::<(f64, i32)>(&mut *conn)
            .optional()
            .map_err(DatabaseError::from)?;

        let (xp, level) = row.unwrap_or((0.0, 0));
        Ok(LevelStanding { user_id, xp, level })
    }

    /// Highest levels in a guild, ties broken by XP then user id.
    #[instrument(skip(self))]
    pub async fn level_leaderboard(
        &self,
        guild_id: GuildId,
        limit: i64,
    ) -> DatabaseResult<Vec<LevelStanding>> {
        let mut conn = self.store.lock().await;

        let rows: Vec<(UserId, f64, i32)> = user_levels::table
            .filter(user_levels::guild_id.eq(guild_id))
            .order((
                user_levels::level.desc(),
                user_levels::xp.desc(),
                user_levels::user_id.asc(),
            ))
            .limit(limit)
            .select((user_levels::user_id, user_levels::xp, user_levels::level))
            .load(&mut *conn)
            .map_err(DatabaseError::from)?;

        Ok(rows
            .into_iter()
            .map(|(user_id, xp, level)| LevelStanding { user_id, xp, level })
            .collect())
    }
}

fn guild_rate(
    conn: &mut SqliteConnection,
    guild_id: GuildId,
    default_rate: XpRate,
) -> DatabaseResult<XpRate> {
    let stored = xp_rates::table
        .find(guild_id)
        .select(xp_rates::xp_per_message)
        .first::<f64>(conn)
        .optional()
        .map_err(DatabaseError::from)?;

    // Out-of-range rows fall back to the default rate.
    Ok(stored
        .and_then(|rate| XpRate::new(rate).ok())
        .unwrap_or(default_rate))
}
