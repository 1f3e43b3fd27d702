//! Write-through mirror of host entities into `Dragonfly` (Redis-compatible).
//!
//! The host owns users, guilds, emojis, channels and messages in memory.
//! This crate projects their flat state into hashes in the store and
//! announces every mutation over pub/sub so other processes can react
//! without polling.
//!
//! # Architecture
//!
//! ```text
//! Host startup ----> snapshot::init ---> one MULTI/EXEC of hashes (no publish)
//!
//! Host event ------> Mirror::set_*  ---> sanitize --> HSET {kind}:{id}
//!                                                       |-- EXPIRE (messages)
//!                                                       +-- PUBLISH {kind}Set id
//!                    Mirror::delete_* -> DEL {kind}:{id} --> PUBLISH {kind}Delete id
//! ```
//!
//! # Modules
//!
//! - [`sanitize`] -- Reduce an entity to its scalar fields
//! - [`store`] -- Store connector trait
//! - [`dragonfly`] -- `fred`-backed store connector
//! - [`memory`] -- In-process store connector
//! - [`mirror`] -- Per-kind set/delete operations
//! - [`notify`] -- Channel naming and notification decoding
//! - [`snapshot`] -- Startup bulk load
//! - [`config`] -- YAML configuration with environment overrides
//! - [`logging`] -- `tracing` subscriber setup
//! - [`error`] -- Shared error types

pub mod config;
pub mod dragonfly;
pub mod error;
pub mod logging;
pub mod memory;
pub mod mirror;
pub mod notify;
pub mod sanitize;
pub mod snapshot;
pub mod store;

// Re-export primary types for convenience.
pub use config::{ConfigError, LoggingConfig, MessageConfig, MirrorConfig, StoreConfig};
pub use dragonfly::{DragonflyBatch, DragonflyStore};
pub use error::MirrorError;
pub use logging::init_tracing;
pub use memory::{MemoryBatch, MemoryStore, Published};
pub use mirror::{Mirror, SELF_USER_KEY, UserSetOutcome};
pub use notify::{Action, Notification, all_channels, channel_name};
pub use sanitize::{Record, Scalar, clean, clean_entity};
pub use snapshot::{InitReport, init};
pub use store::{MirrorBatch, MirrorStore, StoredHash};
