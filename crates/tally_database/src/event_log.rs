//! Append-only log of messages, reactions and role changes.

use crate::models::{NewEmojiUsage, NewMessage, NewRoleChange};
use crate::schema::{emoji_usage, messages, role_changes};
use crate::{ActivityStore, DatabaseResult};
use chrono::NaiveDateTime;
use diesel::prelude::*;
use tally_core::{ChannelId, GuildId, RoleAction, RoleId, UserId};
use tally_error::DatabaseError;
use tracing::instrument;

/// One event destined for the log.
#[derive(Debug, Clone, derive_more::From)]
pub enum LogEntry {
    /// A message was posted.
    Message(NewMessage),
    /// A reaction was added.
    EmojiUsage(NewEmojiUsage),
    /// A role was granted or revoked.
    RoleChange(NewRoleChange),
}

impl LogEntry {
    /// Message entry.
    pub fn message(
        user_id: UserId,
        channel_id: ChannelId,
        guild_id: GuildId,
        sent_at: NaiveDateTime,
    ) -> Self {
        Self::Message(NewMessage {
            user_id,
            channel_id,
            guild_id,
            sent_at,
        })
    }

    /// Reaction entry; `emoji_id` is absent for unicode emoji.
    pub fn emoji(
        user_id: UserId,
        guild_id: GuildId,
        emoji_id: Option<String>,
        emoji_name: impl Into<String>,
        used_at: NaiveDateTime,
    ) -> Self {
        Self::EmojiUsage(NewEmojiUsage {
            user_id,
            guild_id,
            emoji_id,
            emoji_name: emoji_name.into(),
            used_at,
        })
    }

    /// Role change entry.
    pub fn role_change(
        user_id: UserId,
        guild_id: GuildId,
        role_id: RoleId,
        action: RoleAction,
        changed_at: NaiveDateTime,
    ) -> Self {
        Self::RoleChange(NewRoleChange {
            user_id,
            guild_id,
            role_id,
            action: action.to_string(),
            changed_at,
        })
    }

    /// Name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Message(_) => "message",
            Self::EmojiUsage(_) => "emoji",
            Self::RoleChange(_) => "role_change",
        }
    }
}

/// Durable append of activity events.
///
/// Rows are never updated; only member and period resets delete them.
#[derive(Debug, Clone)]
pub struct EventLog {
    store: ActivityStore,
}

impl EventLog {
    /// Create an event log over a shared store.
    pub fn new(store: ActivityStore) -> Self {
        Self { store }
    }

    /// Append one event and return its row id.
    #[instrument(skip(self, entry), fields(kind = entry.kind()))]
    pub async fn append(&self, entry: LogEntry) -> DatabaseResult<i32> {
        let mut conn = self.store.lock().await;

        let id = match entry {
            LogEntry::Message(row) => diesel::insert_into(messages::table)
                .values(&row)
                .returning(messages::id)
                .get_result(&mut *conn),
            LogEntry::EmojiUsage(row) => diesel::insert_into(emoji_usage::table)
                .values(&row)
                .returning(emoji_usage::id)
                .get_result(&mut *conn),
            LogEntry::RoleChange(row) => diesel::insert_into(role_changes::table)
                .values(&row)
                .returning(role_changes::id)
                .get_result(&mut *conn),
        }
        .map_err(DatabaseError::from)?;

        tracing::trace!(id, "Appended event");
        Ok(id)
    }
}
