//! Entity kinds mirrored into the store.

use serde::{Deserialize, Serialize};

use crate::ids::EntityId;

/// The type of a mirrored entity.
///
/// The lowercase tag returned by [`EntityKind::tag`] prefixes every store key
/// (`user:{id}`) and every notification channel (`userSet`, `userDelete`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A user account.
    User,
    /// A guild (server).
    Guild,
    /// A custom emoji.
    Emoji,
    /// A text or voice channel.
    Channel,
    /// A message. The only kind whose records may carry a TTL.
    Message,
}

impl EntityKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::User,
        Self::Guild,
        Self::Emoji,
        Self::Channel,
        Self::Message,
    ];

    /// Lowercase type tag used in keys and channel names.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Guild => "guild",
            Self::Emoji => "emoji",
            Self::Channel => "channel",
            Self::Message => "message",
        }
    }

    /// Resolve a type tag back to its kind.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Store key of the record mirroring entity `id`: `{tag}:{id}`.
    pub fn key(self, id: &EntityId) -> String {
        format!("{}:{id}", self.tag())
    }
}

impl core::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_use_lowercase_tag_and_colon() {
        let id = EntityId::from("42");
        assert_eq!(EntityKind::Guild.key(&id), "guild:42");
        assert_eq!(EntityKind::Message.key(&id), "message:42");
    }

    #[test]
    fn tags_resolve_back_to_kinds() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(EntityKind::from_tag("User"), None);
        assert_eq!(EntityKind::from_tag("role"), None);
    }
}
