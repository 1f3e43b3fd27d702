//! Store connector abstraction.
//!
//! The mirror talks to the external key-value store through [`MirrorStore`]:
//! hash set/delete, expire, publish, reads for subscribers, and a batched
//! transaction for the startup snapshot. Every primitive is asynchronous and
//! fails with a [`MirrorError`]; none of them retry.
//!
//! Two implementations exist: [`DragonflyStore`](crate::DragonflyStore) over a
//! single `fred` client, and [`MemoryStore`](crate::MemoryStore) for running
//! without a server.

use std::collections::BTreeMap;
use std::future::Future;

use crate::error::MirrorError;
use crate::sanitize::Record;

/// A hash as read back from the store: field name to wire value.
pub type StoredHash = BTreeMap<String, String>;

/// Asynchronous primitives over one shared store connection.
///
/// Implementations are cheap handles (`Clone`) onto that connection so the
/// mirror can hand a copy to detached tasks.
pub trait MirrorStore: Clone + Send + Sync + 'static {
    /// Batched-write handle returned by [`MirrorStore::transaction`].
    type Batch: MirrorBatch;

    /// Write every field of `record` into the hash at `key`. Fields already
    /// present and absent from `record` are left untouched.
    fn hash_set(
        &self,
        key: &str,
        record: &Record,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    /// Remove `key` entirely.
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), MirrorError>> + Send;

    /// Set or refresh the TTL of `key`.
    fn expire(
        &self,
        key: &str,
        seconds: u64,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    /// Publish `message` on `channel`. No subscriber acknowledgment.
    fn publish(
        &self,
        channel: &str,
        message: &str,
    ) -> impl Future<Output = Result<(), MirrorError>> + Send;

    /// Read the hash at `key`, `None` if the key does not exist.
    fn hash_get_all(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<StoredHash>, MirrorError>> + Send;

    /// Remaining lifetime of `key` in seconds, `None` if the key has no TTL
    /// or does not exist.
    fn ttl(&self, key: &str) -> impl Future<Output = Result<Option<u64>, MirrorError>> + Send;

    /// Start a batch whose writes are applied together by
    /// [`MirrorBatch::execute`].
    fn transaction(&self) -> Self::Batch;
}

/// Queued hash writes applied as one atomic unit.
pub trait MirrorBatch: Send {
    /// Queue a hash write. Nothing reaches the store until `execute`.
    fn hash_set(&mut self, key: String, record: Record);

    /// Number of queued writes.
    fn len(&self) -> usize;

    /// Whether nothing has been queued.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply all queued writes in one transaction and return how many were
    /// applied.
    fn execute(self) -> impl Future<Output = Result<usize, MirrorError>> + Send;
}
