//! Error types for the mirror layer.
//!
//! All errors are propagated via [`MirrorError`] which wraps the underlying
//! [`fred`] errors with additional context about which operation failed.
//! Nothing here is retried; a failed write leaves the mirror stale and the
//! caller decides what to do.

use mirror_types::TypesError;

/// Errors that can occur while mirroring entities.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// A `Dragonfly`/Redis command or connection failed.
    #[error("Dragonfly error: {0}")]
    Store(#[from] fred::error::Error),

    /// The store connection is down.
    #[error("store connection is not available")]
    Disconnected,

    /// The key holds a value that is not a hash.
    #[error("WRONGTYPE operation against key {key} holding the wrong kind of value")]
    WrongType {
        /// The offending key.
        key: String,
    },

    /// The store refused a single command.
    #[error("{command} on {key} was rejected by the store")]
    Rejected {
        /// Command name, e.g. `EXPIRE`.
        command: String,
        /// Key the command targeted.
        key: String,
    },

    /// A host entity could not be converted into a record.
    #[error("entity error: {0}")]
    Types(#[from] TypesError),

    /// A detached write task panicked or was cancelled.
    #[error("background write failed: {0}")]
    Task(String),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
