//! Host-side context passed explicitly into mirror operations.

use crate::entity::EntityRecord;
use crate::enums::EntityKind;
use crate::ids::EntityId;

/// The host's authenticated session as seen by the mirror.
///
/// Passed into operations that depend on host-wide state: `set_user`
/// compares against [`HostSession::user_id`] to refresh `user:me`, and
/// `set_message` applies [`HostSession::message_ttl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSession {
    /// Identifier of the host's own user.
    pub user_id: EntityId,
    /// Configured message cache lifetime in seconds. `None` or `0` disables
    /// expiry of mirrored messages.
    pub message_cache_lifetime: Option<u64>,
}

impl HostSession {
    /// Create a session for the given own-user identifier, with no message
    /// expiry.
    pub fn new(user_id: impl Into<EntityId>) -> Self {
        Self {
            user_id: user_id.into(),
            message_cache_lifetime: None,
        }
    }

    /// Set the message cache lifetime in seconds.
    #[must_use]
    pub const fn with_message_cache_lifetime(mut self, secs: Option<u64>) -> Self {
        self.message_cache_lifetime = secs;
        self
    }

    /// Whether `id` is the host's own user.
    pub fn is_self(&self, id: &EntityId) -> bool {
        self.user_id == *id
    }

    /// TTL to apply to mirrored messages, if any.
    pub fn message_ttl(&self) -> Option<u64> {
        self.message_cache_lifetime.filter(|secs| *secs > 0)
    }
}

/// Every entity the host knows about at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSnapshot {
    /// The host's own identity, mirrored to `user:me`.
    pub me: EntityRecord,
    /// Known users.
    pub users: Vec<EntityRecord>,
    /// Known guilds.
    pub guilds: Vec<EntityRecord>,
    /// Known emojis.
    pub emojis: Vec<EntityRecord>,
    /// Known channels.
    pub channels: Vec<EntityRecord>,
}

impl HostSnapshot {
    /// A snapshot containing only the host's own identity.
    pub const fn new(me: EntityRecord) -> Self {
        Self {
            me,
            users: Vec::new(),
            guilds: Vec::new(),
            emojis: Vec::new(),
            channels: Vec::new(),
        }
    }

    /// Replace the user collection.
    #[must_use]
    pub fn with_users(mut self, users: Vec<EntityRecord>) -> Self {
        self.users = users;
        self
    }

    /// Replace the guild collection.
    #[must_use]
    pub fn with_guilds(mut self, guilds: Vec<EntityRecord>) -> Self {
        self.guilds = guilds;
        self
    }

    /// Replace the emoji collection.
    #[must_use]
    pub fn with_emojis(mut self, emojis: Vec<EntityRecord>) -> Self {
        self.emojis = emojis;
        self
    }

    /// Replace the channel collection.
    #[must_use]
    pub fn with_channels(mut self, channels: Vec<EntityRecord>) -> Self {
        self.channels = channels;
        self
    }

    /// Entities of the given kind. Messages are never part of a snapshot.
    pub fn entities(&self, kind: EntityKind) -> &[EntityRecord] {
        match kind {
            EntityKind::User => &self.users,
            EntityKind::Guild => &self.guilds,
            EntityKind::Emoji => &self.emojis,
            EntityKind::Channel => &self.channels,
            EntityKind::Message => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_lifetime_means_no_ttl() {
        let session = HostSession::new("me1").with_message_cache_lifetime(Some(0));
        assert_eq!(session.message_ttl(), None);

        let session = session.with_message_cache_lifetime(Some(60));
        assert_eq!(session.message_ttl(), Some(60));

        assert_eq!(HostSession::new("me1").message_ttl(), None);
    }

    #[test]
    fn is_self_compares_ids() {
        let session = HostSession::new("me1");
        assert!(session.is_self(&EntityId::from("me1")));
        assert!(!session.is_self(&EntityId::from("u1")));
    }
}
