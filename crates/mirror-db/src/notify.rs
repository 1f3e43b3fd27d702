//! Mutation notifications.
//!
//! Every successful set or delete is announced on a channel named after the
//! entity kind and the action: `userSet`, `guildDelete`, ... The payload is
//! always the bare entity id; subscribers re-read the hash if they need the
//! fields.

use mirror_types::{EntityId, EntityKind};

/// What happened to a mirrored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// The record was written.
    Set,
    /// The record was removed.
    Delete,
}

impl Action {
    /// Both actions.
    pub const ALL: [Self; 2] = [Self::Set, Self::Delete];

    /// Channel name suffix.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Set => "Set",
            Self::Delete => "Delete",
        }
    }
}

/// One published mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Kind of the mutated entity.
    pub kind: EntityKind,
    /// Whether it was set or deleted.
    pub action: Action,
    /// Id of the mutated entity, sent as the payload.
    pub id: EntityId,
}

impl Notification {
    /// Notification for a written record.
    pub const fn set(kind: EntityKind, id: EntityId) -> Self {
        Self {
            kind,
            action: Action::Set,
            id,
        }
    }

    /// Notification for a removed record.
    pub const fn delete(kind: EntityKind, id: EntityId) -> Self {
        Self {
            kind,
            action: Action::Delete,
            id,
        }
    }

    /// Channel this notification is published on.
    pub fn channel(&self) -> String {
        channel_name(self.kind, self.action)
    }

    /// Message payload: the bare id.
    pub fn payload(&self) -> &str {
        self.id.as_str()
    }

    /// Decode a message received on `channel`. Returns `None` for channels
    /// the mirror does not publish on.
    pub fn parse(channel: &str, payload: &str) -> Option<Self> {
        Action::ALL.into_iter().find_map(|action| {
            let tag = channel.strip_suffix(action.suffix())?;
            let kind = EntityKind::from_tag(tag)?;
            Some(Self {
                kind,
                action,
                id: EntityId::from(payload),
            })
        })
    }
}

/// Channel name for `kind` and `action`, e.g. `messageDelete`.
pub fn channel_name(kind: EntityKind, action: Action) -> String {
    format!("{}{}", kind.tag(), action.suffix())
}

/// Every channel the mirror publishes on, for subscribers.
pub fn all_channels() -> Vec<String> {
    EntityKind::ALL
        .into_iter()
        .flat_map(|kind| Action::ALL.into_iter().map(move |action| channel_name(kind, action)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_follow_kind_and_action() {
        let n = Notification::set(EntityKind::User, EntityId::from("u1"));
        assert_eq!(n.channel(), "userSet");
        assert_eq!(n.payload(), "u1");

        let n = Notification::delete(EntityKind::Emoji, EntityId::from("e1"));
        assert_eq!(n.channel(), "emojiDelete");
    }

    #[test]
    fn parse_inverts_channel() {
        let parsed = Notification::parse("channelDelete", "c9");
        assert_eq!(
            parsed,
            Some(Notification::delete(EntityKind::Channel, EntityId::from("c9")))
        );
        assert_eq!(Notification::parse("roleSet", "r1"), None);
        assert_eq!(Notification::parse("user", "u1"), None);
    }

    #[test]
    fn ten_channels_in_total() {
        let channels = all_channels();
        assert_eq!(channels.len(), 10);
        assert!(channels.contains(&"guildSet".to_owned()));
        assert!(channels.contains(&"messageDelete".to_owned()));
    }
}
