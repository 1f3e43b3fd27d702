//! In-process store with `Dragonfly` hash semantics.
//!
//! Used to run the mirror without a server and to observe what it does:
//! every publish is recorded, every command is logged, and faults can be
//! injected (a lost connection, a wrong-type key, or one rejected command)
//! to exercise the error paths. TTLs run on the tokio clock and
//! expired keys are purged lazily on access.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::MirrorError;
use crate::sanitize::Record;
use crate::store::{MirrorBatch, MirrorStore, StoredHash};

/// A message observed on a pub/sub channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    /// Channel name.
    pub channel: String,
    /// Message payload.
    pub message: String,
}

#[derive(Default)]
struct MemoryState {
    hashes: BTreeMap<String, StoredHash>,
    deadlines: BTreeMap<String, Instant>,
    /// Keys holding a non-hash value.
    foreign: BTreeSet<String>,
    published: Vec<Published>,
    commands: Vec<String>,
    /// Pending one-shot rejections per command name.
    rejections: BTreeMap<String, usize>,
    disconnected: bool,
}

impl MemoryState {
    fn check_connected(&self) -> Result<(), MirrorError> {
        if self.disconnected {
            return Err(MirrorError::Disconnected);
        }
        Ok(())
    }

    fn check_hash(&self, key: &str) -> Result<(), MirrorError> {
        if self.foreign.contains(key) {
            return Err(MirrorError::WrongType {
                key: key.to_owned(),
            });
        }
        Ok(())
    }

    fn check_rejection(&mut self, command: &str, key: &str) -> Result<(), MirrorError> {
        let Some(pending) = self.rejections.get_mut(command) else {
            return Ok(());
        };
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.rejections.remove(command);
        }
        Err(MirrorError::Rejected {
            command: command.to_owned(),
            key: key.to_owned(),
        })
    }

    fn purge_if_expired(&mut self, key: &str) {
        let expired = self
            .deadlines
            .get(key)
            .is_some_and(|deadline| *deadline <= Instant::now());
        if expired {
            self.deadlines.remove(key);
            self.hashes.remove(key);
        }
    }

    fn write(&mut self, key: &str, record: &Record) {
        self.hashes
            .entry(key.to_owned())
            .or_default()
            .extend(record.encode());
    }
}

/// Shared in-memory store. Clones observe the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty, connected store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing (`false`) or regaining (`true`) the connection.
    pub async fn set_connected(&self, connected: bool) {
        self.state.lock().await.disconnected = !connected;
    }

    /// Make `key` hold a plain string, so hash commands on it fail with
    /// [`MirrorError::WrongType`] until it is deleted.
    pub async fn occupy_with_string(&self, key: &str) {
        let mut state = self.state.lock().await;
        state.hashes.remove(key);
        state.foreign.insert(key.to_owned());
    }

    /// Reject the next call of `command` (`HSET`, `DEL`, `EXPIRE`, `PUBLISH`
    /// or `EXEC`) with [`MirrorError::Rejected`]. Calls stack: two calls
    /// reject the next two.
    pub async fn fail_next(&self, command: &str) {
        let mut state = self.state.lock().await;
        let pending = state.rejections.entry(command.to_owned()).or_default();
        *pending = pending.saturating_add(1);
    }

    /// Every message published so far, oldest first.
    pub async fn published(&self) -> Vec<Published> {
        self.state.lock().await.published.clone()
    }

    /// Command log, oldest first, e.g. `HSET user:1` or `EXPIRE message:9 60`.
    pub async fn commands(&self) -> Vec<String> {
        self.state.lock().await.commands.clone()
    }

    /// Names of all live keys, in order.
    pub async fn keys(&self) -> Vec<String> {
        let mut state = self.state.lock().await;
        let all: Vec<String> = state.hashes.keys().cloned().collect();
        for key in &all {
            state.purge_if_expired(key);
        }
        state
            .hashes
            .keys()
            .chain(state.foreign.iter())
            .cloned()
            .collect()
    }
}

impl MirrorStore for MemoryStore {
    type Batch = MemoryBatch;

    async fn hash_set(&self, key: &str, record: &Record) -> Result<(), MirrorError> {
        let mut state = self.state.lock().await;
        state.check_connected()?;
        state.commands.push(format!("HSET {key}"));
        state.check_rejection("HSET", key)?;
        state.check_hash(key)?;
        state.purge_if_expired(key);
        state.write(key, record);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), MirrorError> {
        let mut state = self.state.lock().await;
        state.check_connected()?;
        state.commands.push(format!("DEL {key}"));
        state.check_rejection("DEL", key)?;
        state.hashes.remove(key);
        state.deadlines.remove(key);
        state.foreign.remove(key);
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<(), MirrorError> {
        let mut state = self.state.lock().await;
        state.check_connected()?;
        state.commands.push(format!("EXPIRE {key} {seconds}"));
        state.check_rejection("EXPIRE", key)?;
        state.purge_if_expired(key);
        if state.hashes.contains_key(key) {
            let deadline = Instant::now()
                .checked_add(Duration::from_secs(seconds))
                .ok_or_else(|| MirrorError::Config(format!("TTL out of range for {key}")))?;
            state.deadlines.insert(key.to_owned(), deadline);
        }
        Ok(())
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<(), MirrorError> {
        let mut state = self.state.lock().await;
        state.check_connected()?;
        state.commands.push(format!("PUBLISH {channel}"));
        state.check_rejection("PUBLISH", channel)?;
        state.published.push(Published {
            channel: channel.to_owned(),
            message: message.to_owned(),
        });
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<Option<StoredHash>, MirrorError> {
        let mut state = self.state.lock().await;
        state.check_connected()?;
        state.check_hash(key)?;
        state.purge_if_expired(key);
        Ok(state.hashes.get(key).cloned())
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, MirrorError> {
        let mut state = self.state.lock().await;
        state.check_connected()?;
        state.purge_if_expired(key);
        Ok(state.deadlines.get(key).map(|deadline| {
            let remaining = deadline.saturating_duration_since(Instant::now());
            // Round up like the server does for partially elapsed seconds.
            if remaining.subsec_nanos() > 0 {
                remaining.as_secs().saturating_add(1)
            } else {
                remaining.as_secs()
            }
        }))
    }

    fn transaction(&self) -> MemoryBatch {
        MemoryBatch {
            store: self.clone(),
            writes: Vec::new(),
        }
    }
}

/// Batch against a [`MemoryStore`]. All writes apply or none do.
pub struct MemoryBatch {
    store: MemoryStore,
    writes: Vec<(String, Record)>,
}

impl MirrorBatch for MemoryBatch {
    fn hash_set(&mut self, key: String, record: Record) {
        self.writes.push((key, record));
    }

    fn len(&self) -> usize {
        self.writes.len()
    }

    async fn execute(self) -> Result<usize, MirrorError> {
        let mut state = self.store.state.lock().await;
        state.check_connected()?;
        state.commands.push("MULTI".to_owned());
        state.check_rejection("EXEC", "MULTI")?;
        for (key, _) in &self.writes {
            state.check_hash(key)?;
        }
        for (key, record) in &self.writes {
            state.commands.push(format!("HSET {key}"));
            state.purge_if_expired(key);
            state.write(key, record);
        }
        state.commands.push("EXEC".to_owned());
        Ok(self.writes.len())
    }
}
