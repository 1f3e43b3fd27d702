//! Startup snapshot loading.
//!
//! At boot the host hands over every user, guild, emoji and channel it
//! knows plus its own identity. All of them are queued as sanitized hash
//! writes in one transaction, `user:me` included, and applied together.
//! Nothing is published: this is a cold load, not a mutation stream.

use std::collections::BTreeMap;

use mirror_types::{EntityKind, HostSnapshot};

use crate::error::MirrorError;
use crate::mirror::SELF_USER_KEY;
use crate::sanitize::clean_entity;
use crate::store::{MirrorBatch, MirrorStore};

/// Kinds included in a snapshot, in queueing order.
const SNAPSHOT_KINDS: [EntityKind; 4] = [
    EntityKind::User,
    EntityKind::Guild,
    EntityKind::Emoji,
    EntityKind::Channel,
];

/// What a snapshot load wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitReport {
    /// Hashes written per kind, `user:me` excluded.
    pub per_kind: BTreeMap<EntityKind, usize>,
    /// Total hashes written, `user:me` included.
    pub total: usize,
}

impl InitReport {
    /// Hashes written for `kind`.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.per_kind.get(&kind).copied().unwrap_or_default()
    }
}

/// Write every entity in `snapshot` and `user:me` in one transaction.
///
/// The batch always contains at least `user:me`, so it executes even when
/// every collection is empty.
///
/// # Errors
///
/// Returns [`MirrorError`] if the transaction fails; in that case none of
/// the writes are guaranteed to have applied.
pub async fn init<S: MirrorStore>(
    store: &S,
    snapshot: &HostSnapshot,
) -> Result<InitReport, MirrorError> {
    let mut batch = store.transaction();
    let mut per_kind = BTreeMap::new();

    for kind in SNAPSHOT_KINDS {
        let entities = snapshot.entities(kind);
        for entity in entities {
            batch.hash_set(kind.key(entity.id()), clean_entity(entity));
        }
        per_kind.insert(kind, entities.len());
    }
    batch.hash_set(SELF_USER_KEY.to_owned(), clean_entity(&snapshot.me));

    let total = batch.execute().await?;
    let report = InitReport { per_kind, total };

    tracing::info!(
        users = report.count(EntityKind::User),
        guilds = report.count(EntityKind::Guild),
        emojis = report.count(EntityKind::Emoji),
        channels = report.count(EntityKind::Channel),
        total = report.total,
        "Loaded startup snapshot"
    );
    Ok(report)
}
