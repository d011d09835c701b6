//! Translation of platform events into storage calls.

use crate::Tracker;
use chrono::NaiveDateTime;
use tally_core::{
    ClosedSession, LevelUp, MessageReceived, ReactionAdded, RoleAction, RolesChanged,
    VoiceStateChanged,
};
use tally_database::{
    ActivityStore, EventLog, LevelingEngine, LogEntry, PermanentStatsLedger, SessionReconciler,
};
use serde::{Deserialize, Serialize};
use tally_error::TallyResult;
use tracing::{debug, instrument, trace};

/// Any event the ingestor accepts, tagged by `type` on the wire.
///
/// # Examples
///
/// ```
/// use tally_bot::InboundEvent;
///
/// let line = r#"{"type":"message","user_id":1,"channel_id":2,"guild_id":3}"#;
/// let event: InboundEvent = serde_json::from_str(line).unwrap();
/// assert!(matches!(event, InboundEvent::Message(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A message was posted.
    Message(MessageReceived),
    /// A voice channel was joined, left or switched.
    VoiceState(VoiceStateChanged),
    /// A reaction was added.
    Reaction(ReactionAdded),
    /// A member's roles changed.
    RolesChanged(RolesChanged),
}

/// What applying an event produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum IngestOutcome {
    /// Stored (or ignored) with nothing to report.
    Recorded,
    /// The message lifted its author to a new level.
    LevelUp(LevelUp),
    /// A voice session ended.
    SessionClosed(ClosedSession),
    /// Role changes logged.
    RolesLogged {
        /// Number of changes.
        count: usize,
    },
}

/// Applies gateway events to the tracker.
///
/// Bot-authored messages and reactions are dropped before anything is
/// written. Events without a delivery time are stamped with the store's clock.
#[derive(Debug, Clone)]
pub struct EventIngestor {
    store: ActivityStore,
    events: EventLog,
    sessions: SessionReconciler,
    leveling: LevelingEngine,
    ledger: PermanentStatsLedger,
}

impl EventIngestor {
    /// Create an ingestor over a tracker's components.
    pub fn new(tracker: &Tracker) -> Self {
        Self {
            store: tracker.store().clone(),
            events: tracker.events().clone(),
            sessions: tracker.sessions().clone(),
            leveling: tracker.leveling().clone(),
            ledger: tracker.ledger().clone(),
        }
    }

    /// Dispatch any inbound event.
    pub async fn apply(&self, event: &InboundEvent) -> TallyResult<IngestOutcome> {
        let outcome = match event {
            InboundEvent::Message(message) => self
                .on_message(message)
                .await?
                .map_or(IngestOutcome::Recorded, IngestOutcome::LevelUp),
            InboundEvent::VoiceState(voice) => self
                .on_voice_state(voice)
                .await?
                .map_or(IngestOutcome::Recorded, IngestOutcome::SessionClosed),
            InboundEvent::Reaction(reaction) => {
                self.on_reaction(reaction).await?;
                IngestOutcome::Recorded
            }
            InboundEvent::RolesChanged(roles) => IngestOutcome::RolesLogged {
                count: self.on_roles_changed(roles).await?,
            },
        };
        Ok(outcome)
    }

    fn stamp(&self, received_at: Option<NaiveDateTime>) -> NaiveDateTime {
        received_at.unwrap_or_else(|| self.store.now())
    }

    /// Log the message, count it, and award XP.
    ///
    /// Returns the level-up, if any, so the caller can announce it.
    #[instrument(skip(self, event), fields(user_id = event.user_id(), guild_id = event.guild_id()))]
    pub async fn on_message(&self, event: &MessageReceived) -> TallyResult<Option<LevelUp>> {
        if event.author_is_bot() {
            trace!("Ignoring bot message");
            return Ok(None);
        }

        let user_id = *event.user_id();
        let guild_id = *event.guild_id();
        let at = self.stamp(*event.received_at());

        self.events
            .append(LogEntry::message(user_id, *event.channel_id(), guild_id, at))
            .await?;
        self.ledger.increment(user_id, guild_id, 1, 0).await?;
        Ok(self.leveling.on_message(user_id, guild_id, at).await?)
    }

    /// Close the session in the channel left and open one in the channel joined.
    ///
    /// Only the closed session's own minutes are added to the permanent
    /// totals. Mute and deafen updates keep the same channel and are ignored.
    #[instrument(skip(self, event), fields(user_id = event.user_id(), guild_id = event.guild_id()))]
    pub async fn on_voice_state(
        &self,
        event: &VoiceStateChanged,
    ) -> TallyResult<Option<ClosedSession>> {
        if !event.is_channel_change() {
            trace!("Voice state change within the same channel");
            return Ok(None);
        }

        let user_id = *event.user_id();
        let guild_id = *event.guild_id();
        let at = self.stamp(*event.received_at());

        let mut closed = None;
        if let Some(channel_id) = *event.before_channel() {
            closed = self
                .sessions
                .close_session(user_id, channel_id, guild_id, at)
                .await?;

            if let Some(session) = &closed {
                let minutes = u32::try_from(session.minutes).unwrap_or(u32::MAX);
                if minutes > 0 {
                    self.ledger.increment(user_id, guild_id, 0, minutes).await?;
                }
            }
        }

        if let Some(channel_id) = *event.after_channel() {
            self.sessions
                .open_session(user_id, channel_id, guild_id, at)
                .await?;
        }

        Ok(closed)
    }

    /// Log a reaction.
    #[instrument(skip(self, event), fields(user_id = event.user_id(), guild_id = event.guild_id()))]
    pub async fn on_reaction(&self, event: &ReactionAdded) -> TallyResult<()> {
        if event.user_is_bot() {
            trace!("Ignoring bot reaction");
            return Ok(());
        }

        let at = self.stamp(*event.received_at());
        self.events
            .append(LogEntry::emoji(
                *event.user_id(),
                *event.guild_id(),
                event.emoji_id().clone(),
                event.emoji_name().as_str(),
                at,
            ))
            .await?;
        Ok(())
    }

    /// Log one role change per granted or revoked role; returns how many were logged.
    #[instrument(skip(self, event), fields(user_id = event.user_id(), guild_id = event.guild_id()))]
    pub async fn on_roles_changed(&self, event: &RolesChanged) -> TallyResult<usize> {
        let at = self.stamp(*event.received_at());
        let changes = event
            .added_roles()
            .into_iter()
            .map(|role| (role, RoleAction::Added))
            .chain(
                event
                    .removed_roles()
                    .into_iter()
                    .map(|role| (role, RoleAction::Removed)),
            )
            .collect::<Vec<_>>();

        for (role_id, action) in &changes {
            self.events
                .append(LogEntry::role_change(
                    *event.user_id(),
                    *event.guild_id(),
                    *role_id,
                    *action,
                    at,
                ))
                .await?;
        }

        debug!(count = changes.len(), "Logged role changes");
        Ok(changes.len())
    }
}
