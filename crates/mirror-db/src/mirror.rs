//! Entity mutator: per-kind set and delete.
//!
//! A set sanitizes the entity, writes it to `{kind}:{id}`, then publishes
//! `{kind}Set` with the id. A delete removes `{kind}:{id}` then publishes
//! `{kind}Delete`. The write and the publish are two separate commands: the
//! publish is only attempted once the write has succeeded, and a crash in
//! between leaves the record updated with no notification.
//!
//! Two kinds carry extra behavior:
//!
//! - **message**: when the host has a positive message cache lifetime, the
//!   key gets that TTL after the write and before the publish.
//! - **user**: when the user is the host's own identity, `user:me` is
//!   refreshed by a detached task that runs independently of the main write.
//!   Its outcome is not part of the returned result; see [`UserSetOutcome`].

use mirror_types::{EntityId, EntityKind, EntityRecord, HostSession, HostSnapshot};
use tokio::task::JoinHandle;

use crate::error::MirrorError;
use crate::notify::Notification;
use crate::sanitize::{Record, clean_entity};
use crate::snapshot::{self, InitReport};
use crate::store::{MirrorStore, StoredHash};

/// Key of the record mirroring the host's own user.
pub const SELF_USER_KEY: &str = "user:me";

/// Result of [`Mirror::set_user`].
///
/// Dropping it is fine: the `user:me` refresh keeps running on its own.
#[derive(Debug)]
pub struct UserSetOutcome {
    self_copy: Option<JoinHandle<Result<(), MirrorError>>>,
}

impl UserSetOutcome {
    /// Whether the user was the host's own identity and a `user:me` refresh
    /// was started.
    pub const fn refreshed_self(&self) -> bool {
        self.self_copy.is_some()
    }

    /// Wait for the `user:me` refresh, if one was started.
    ///
    /// # Errors
    ///
    /// Returns the refresh's own store error, or [`MirrorError::Task`] if
    /// the task panicked or was cancelled.
    pub async fn wait_self_copy(self) -> Result<(), MirrorError> {
        match self.self_copy {
            Some(handle) => handle
                .await
                .map_err(|e| MirrorError::Task(e.to_string()))?,
            None => Ok(()),
        }
    }
}

/// Write-through mirror of host entities into a [`MirrorStore`].
#[derive(Clone)]
pub struct Mirror<S> {
    store: S,
}

impl<S: MirrorStore> Mirror<S> {
    /// Wrap a store connection.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Bulk-load the host's startup entity set. See [`snapshot::init`].
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the transaction fails.
    pub async fn init(&self, snapshot: &HostSnapshot) -> Result<InitReport, MirrorError> {
        snapshot::init(&self.store, snapshot).await
    }

    // =========================================================================
    // Generic set/delete
    // =========================================================================

    /// Sanitize and write `entity` under `kind`, then publish `{kind}Set`.
    ///
    /// Never sets a TTL and does not touch `user:me`; use
    /// [`Mirror::set_message`] and [`Mirror::set_user`] for those.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the write or the publish fails. Nothing is
    /// published when the write fails.
    pub async fn set(&self, kind: EntityKind, entity: &EntityRecord) -> Result<(), MirrorError> {
        self.write_and_publish(kind, entity, None).await
    }

    /// Write, expire (messages only), then publish.
    async fn write_and_publish(
        &self,
        kind: EntityKind,
        entity: &EntityRecord,
        ttl: Option<u64>,
    ) -> Result<(), MirrorError> {
        let key = kind.key(entity.id());
        let record = clean_entity(entity);
        self.store.hash_set(&key, &record).await?;

        let ttl = ttl.filter(|secs| *secs > 0 && kind == EntityKind::Message);
        if let Some(seconds) = ttl {
            self.store.expire(&key, seconds).await?;
        }

        tracing::debug!(
            key = key.as_str(),
            fields = record.len(),
            ttl_secs = ttl,
            "Mirrored entity"
        );
        self.publish(&Notification::set(kind, entity.id().clone()))
            .await
    }

    /// Remove the record of `id` under `kind`, then publish `{kind}Delete`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the delete or the publish fails. Nothing
    /// is published when the delete fails.
    pub async fn delete(
        &self,
        kind: EntityKind,
        id: impl Into<EntityId>,
    ) -> Result<(), MirrorError> {
        let id = id.into();
        let key = kind.key(&id);
        self.store.delete(&key).await?;
        tracing::debug!(key = key.as_str(), "Removed mirrored entity");
        self.publish(&Notification::delete(kind, id)).await
    }

    /// Read back the mirrored record of `id`, `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the read fails.
    pub async fn fetch(
        &self,
        kind: EntityKind,
        id: impl Into<EntityId>,
    ) -> Result<Option<StoredHash>, MirrorError> {
        self.store.hash_get_all(&kind.key(&id.into())).await
    }

    async fn publish(&self, notification: &Notification) -> Result<(), MirrorError> {
        self.store
            .publish(&notification.channel(), notification.payload())
            .await
    }

    // =========================================================================
    // Users -- user:{id}, user:me
    // =========================================================================

    /// Mirror a user. When `user` is the host's own identity, also refresh
    /// `user:me` in a detached task.
    ///
    /// The refresh is started before the main write and is not awaited: a
    /// successful return does not mean `user:me` has landed, and a failed
    /// main write does not cancel it. It is never published. Each call starts
    /// its own refresh, so two refreshes issued back to back may land in
    /// either order and leave the older copy in `user:me`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the `user:{id}` write or its publish fails.
    pub async fn set_user(
        &self,
        session: &HostSession,
        user: &EntityRecord,
    ) -> Result<UserSetOutcome, MirrorError> {
        let self_copy = session
            .is_self(user.id())
            .then(|| self.spawn_self_copy(clean_entity(user)));
        self.set(EntityKind::User, user).await?;
        Ok(UserSetOutcome { self_copy })
    }

    fn spawn_self_copy(&self, record: Record) -> JoinHandle<Result<(), MirrorError>> {
        let store = self.store.clone();
        tokio::spawn(async move {
            let result = store.hash_set(SELF_USER_KEY, &record).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Failed to refresh user:me");
            }
            result
        })
    }

    /// Remove a mirrored user.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the delete or the publish fails.
    pub async fn delete_user(&self, id: impl Into<EntityId>) -> Result<(), MirrorError> {
        self.delete(EntityKind::User, id).await
    }

    // =========================================================================
    // Guilds, emojis, channels
    // =========================================================================

    /// Mirror a guild.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the write or the publish fails.
    pub async fn set_guild(&self, guild: &EntityRecord) -> Result<(), MirrorError> {
        self.set(EntityKind::Guild, guild).await
    }

    /// Remove a mirrored guild.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the delete or the publish fails.
    pub async fn delete_guild(&self, id: impl Into<EntityId>) -> Result<(), MirrorError> {
        self.delete(EntityKind::Guild, id).await
    }

    /// Mirror an emoji.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the write or the publish fails.
    pub async fn set_emoji(&self, emoji: &EntityRecord) -> Result<(), MirrorError> {
        self.set(EntityKind::Emoji, emoji).await
    }

    /// Remove a mirrored emoji.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the delete or the publish fails.
    pub async fn delete_emoji(&self, id: impl Into<EntityId>) -> Result<(), MirrorError> {
        self.delete(EntityKind::Emoji, id).await
    }

    /// Mirror a channel.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the write or the publish fails.
    pub async fn set_channel(&self, channel: &EntityRecord) -> Result<(), MirrorError> {
        self.set(EntityKind::Channel, channel).await
    }

    /// Remove a mirrored channel.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the delete or the publish fails.
    pub async fn delete_channel(&self, id: impl Into<EntityId>) -> Result<(), MirrorError> {
        self.delete(EntityKind::Channel, id).await
    }

    // =========================================================================
    // Messages -- message:{id}, with TTL
    // =========================================================================

    /// Mirror a message, expiring it after the host's message cache lifetime
    /// when one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the write, the expire, or the publish
    /// fails.
    pub async fn set_message(
        &self,
        session: &HostSession,
        message: &EntityRecord,
    ) -> Result<(), MirrorError> {
        self.write_and_publish(EntityKind::Message, message, session.message_ttl())
            .await
    }

    /// Remove a mirrored message.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError`] if the delete or the publish fails.
    pub async fn delete_message(&self, id: impl Into<EntityId>) -> Result<(), MirrorError> {
        self.delete(EntityKind::Message, id).await
    }
}
