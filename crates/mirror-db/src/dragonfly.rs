//! `Dragonfly` (Redis-compatible) store connector.
//!
//! One [`fred`] client carries every command the mirror issues. The client
//! multiplexes concurrent callers over its connection and the server
//! serializes commands per key, so no locking happens here.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `user:{id}` | Hash | Mirrored user |
//! | `user:me` | Hash | The host's own user |
//! | `guild:{id}` | Hash | Mirrored guild |
//! | `emoji:{id}` | Hash | Mirrored emoji |
//! | `channel:{id}` | Hash | Mirrored channel |
//! | `message:{id}` | Hash | Mirrored message, optionally with a TTL |

use std::collections::HashMap;

use fred::prelude::*;

use crate::config::StoreConfig;
use crate::error::MirrorError;
use crate::sanitize::Record;
use crate::store::{MirrorBatch, MirrorStore, StoredHash};

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
///
/// Wraps a [`fred::prelude::Client`]. Clones share the same connection.
#[derive(Clone)]
pub struct DragonflyStore {
    client: Client,
}

impl DragonflyStore {
    /// Connect to `Dragonfly` at the given URL with default settings.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] if the URL cannot be parsed.
    /// Returns [`MirrorError::Store`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, MirrorError> {
        Self::connect_with(&StoreConfig::new(url)).await
    }

    /// Connect using the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Config`] if the URL cannot be parsed.
    /// Returns [`MirrorError::Store`] if the connection fails.
    pub async fn connect_with(config: &StoreConfig) -> Result<Self, MirrorError> {
        let fred_config = Config::from_url(&config.url)
            .map_err(|e| MirrorError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let connect_timeout = config.connect_timeout();
        let mut builder = Builder::from_config(fred_config);
        builder.with_connection_config(|conn| {
            conn.connection_timeout = connect_timeout;
        });
        let client = builder.build()?;
        client.init().await?;

        tracing::info!(
            connect_timeout_ms = config.connect_timeout_ms,
            "Connected to Dragonfly"
        );
        Ok(Self { client })
    }

    /// Flush all keys from the `Dragonfly` instance.
    ///
    /// **WARNING:** This deletes all data. Only use for testing.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Store`] if the flush fails.
    pub async fn flush_all(&self) -> Result<(), MirrorError> {
        let _: () = self.client.flushall(false).await?;
        Ok(())
    }

    /// Close the connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Store`] if `QUIT` fails.
    pub async fn close(&self) -> Result<(), MirrorError> {
        self.client.quit().await?;
        tracing::info!("Dragonfly connection closed");
        Ok(())
    }

    /// Return a reference to the underlying [`Client`].
    pub const fn client(&self) -> &Client {
        &self.client
    }
}

fn wire_fields(record: &Record) -> HashMap<String, String> {
    record.encode().into_iter().collect()
}

impl MirrorStore for DragonflyStore {
    type Batch = DragonflyBatch;

    async fn hash_set(&self, key: &str, record: &Record) -> Result<(), MirrorError> {
        let _: i64 = self.client.hset(key, wire_fields(record)).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), MirrorError> {
        let _: i64 = self.client.del(key).await?;
        Ok(())
    }

    async fn expire(&self, key: &str, seconds: u64) -> Result<(), MirrorError> {
        let seconds = i64::try_from(seconds)
            .map_err(|e| MirrorError::Config(format!("TTL out of range for {key}: {e}")))?;
        let _: i64 = self.client.expire(key, seconds, None).await?;
        Ok(())
    }

    async fn publish(&self, channel: &str, message: &str) -> Result<(), MirrorError> {
        let _: i64 = self.client.publish(channel, message).await?;
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<Option<StoredHash>, MirrorError> {
        let hash: HashMap<String, String> = self.client.hgetall(key).await?;
        if hash.is_empty() {
            return Ok(None);
        }
        Ok(Some(hash.into_iter().collect()))
    }

    async fn ttl(&self, key: &str) -> Result<Option<u64>, MirrorError> {
        // -2: no such key, -1: no expiry.
        let ttl: i64 = self.client.ttl(key).await?;
        Ok(u64::try_from(ttl).ok())
    }

    fn transaction(&self) -> DragonflyBatch {
        DragonflyBatch {
            client: self.client.clone(),
            writes: Vec::new(),
        }
    }
}

/// Hash writes queued locally and sent as one `MULTI`/`EXEC` block.
pub struct DragonflyBatch {
    client: Client,
    writes: Vec<(String, Record)>,
}

impl MirrorBatch for DragonflyBatch {
    fn hash_set(&mut self, key: String, record: Record) {
        self.writes.push((key, record));
    }

    fn len(&self) -> usize {
        self.writes.len()
    }

    async fn execute(self) -> Result<usize, MirrorError> {
        let trx = self.client.multi();
        for (key, record) in &self.writes {
            let _: () = trx.hset(key.as_str(), wire_fields(record)).await?;
        }
        let _: Value = trx.exec(true).await?;
        Ok(self.writes.len())
    }
}
