//! Inbound platform events.
//!
//! The ingestion layer converts whatever the gateway SDK hands it into one of
//! these narrow, immutable shapes. Nothing downstream ever sees SDK types.
//! When `received_at` is left unset the ingestion service stamps the event
//! with its clock.

use crate::{ChannelId, GuildId, RoleId, UserId};
use chrono::NaiveDateTime;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// A message was posted in a guild channel.
///
/// # Examples
///
/// ```
/// use tally_core::MessageReceivedBuilder;
///
/// let event = MessageReceivedBuilder::default()
///     .user_id(1)
///     .channel_id(20)
///     .guild_id(300)
///     .build()
///     .unwrap();
/// assert_eq!(*event.guild_id(), 300);
/// assert!(!event.author_is_bot());
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
pub struct MessageReceived {
    /// Author of the message.
    user_id: UserId,
    /// Channel the message was posted in.
    channel_id: ChannelId,
    /// Guild the channel belongs to.
    guild_id: GuildId,
    /// Whether the author is a bot account.
    #[builder(default)]
    #[serde(default)]
    #[getter(skip)]
    author_is_bot: bool,
    /// Delivery time, if the gateway supplied one.
    #[builder(default)]
    #[serde(default)]
    received_at: Option<NaiveDateTime>,
}

impl MessageReceived {
    /// Whether the author is a bot account.
    pub fn author_is_bot(&self) -> bool {
        self.author_is_bot
    }
}

/// A member's voice channel changed.
///
/// `before_channel` is where they were, `after_channel` is where they are
/// now. Both set means a move between channels.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
pub struct VoiceStateChanged {
    /// Member whose voice state changed.
    user_id: UserId,
    /// Guild of the voice channels.
    guild_id: GuildId,
    /// Channel left, if any.
    #[builder(default)]
    #[serde(default)]
    before_channel: Option<ChannelId>,
    /// Channel joined, if any.
    #[builder(default)]
    #[serde(default)]
    after_channel: Option<ChannelId>,
    /// Delivery time, if the gateway supplied one.
    #[builder(default)]
    #[serde(default)]
    received_at: Option<NaiveDateTime>,
}

impl VoiceStateChanged {
    /// True when the member actually switched channels (mute/deafen toggles
    /// arrive with the same channel on both sides).
    pub fn is_channel_change(&self) -> bool {
        self.before_channel != self.after_channel
    }
}

/// A reaction was added to a message.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
#[builder(setter(into))]
pub struct ReactionAdded {
    /// Member who reacted.
    user_id: UserId,
    /// Guild of the reacted message.
    guild_id: GuildId,
    /// Custom emoji id; `None` for unicode emoji.
    #[builder(default)]
    #[serde(default)]
    emoji_id: Option<String>,
    /// Printable emoji name.
    emoji_name: String,
    /// Whether the reacting member is a bot account.
    #[builder(default)]
    #[serde(default)]
    #[getter(skip)]
    user_is_bot: bool,
    /// Delivery time, if the gateway supplied one.
    #[builder(default)]
    #[serde(default)]
    received_at: Option<NaiveDateTime>,
}

impl ReactionAdded {
    /// Whether the reacting member is a bot account.
    pub fn user_is_bot(&self) -> bool {
        self.user_is_bot
    }
}

/// Whether a role was granted or revoked.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RoleAction {
    /// Role granted.
    Added,
    /// Role revoked.
    Removed,
}

/// A member's role list changed.
///
/// # Examples
///
/// ```
/// use tally_core::RolesChangedBuilder;
///
/// let event = RolesChangedBuilder::default()
///     .user_id(1)
///     .guild_id(2)
///     .before_roles(vec![10, 11])
///     .after_roles(vec![11, 12, 13])
///     .build()
///     .unwrap();
/// assert_eq!(event.added_roles(), vec![12, 13]);
/// assert_eq!(event.removed_roles(), vec![10]);
/// ```
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
pub struct RolesChanged {
    /// Member whose roles changed.
    user_id: UserId,
    /// Guild the roles belong to.
    guild_id: GuildId,
    /// Roles held before the update.
    #[builder(default)]
    #[serde(default)]
    before_roles: Vec<RoleId>,
    /// Roles held after the update.
    #[builder(default)]
    #[serde(default)]
    after_roles: Vec<RoleId>,
    /// Delivery time, if the gateway supplied one.
    #[builder(default)]
    #[serde(default)]
    received_at: Option<NaiveDateTime>,
}

impl RolesChanged {
    /// Roles present after but not before, in `after_roles` order.
    pub fn added_roles(&self) -> Vec<RoleId> {
        self.after_roles
            .iter()
            .copied()
            .filter(|role| !self.before_roles.contains(role))
            .collect()
    }

    /// Roles present before but not after, in `before_roles` order.
    pub fn removed_roles(&self) -> Vec<RoleId> {
        self.before_roles
            .iter()
            .copied()
            .filter(|role| !self.after_roles.contains(role))
            .collect()
    }
}
