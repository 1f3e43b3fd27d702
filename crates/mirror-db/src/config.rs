//! Configuration for the mirror.
//!
//! Settings live in a YAML file with three sections, each optional:
//!
//! ```yaml
//! store:
//!   url: redis://localhost:6379
//!   connect_timeout_ms: 5000
//! messages:
//!   cache_lifetime_secs: 3600
//! logging:
//!   level: info
//!   json: false
//! ```
//!
//! `DRAGONFLY_URL` (or, failing that, `REDIS_URL`) overrides `store.url` so
//! deployments can point at a store without editing the file.

use std::path::Path;
use std::time::Duration;

use mirror_types::{EntityId, HostSession};
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The tracing subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    Logging(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level mirror configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MirrorConfig {
    /// Store connection settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Message mirroring settings.
    #[serde(default)]
    pub messages: MessageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MirrorConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.store.apply_env_overrides();
        Ok(config)
    }

    /// Host session for the given own-user id, carrying the configured
    /// message cache lifetime.
    pub fn session(&self, user_id: impl Into<EntityId>) -> HostSession {
        HostSession::new(user_id).with_message_cache_lifetime(self.messages.cache_lifetime_secs)
    }
}

/// Default connection timeout in milliseconds.
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;

/// Store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Redis-scheme URL of the `Dragonfly` instance.
    #[serde(default = "default_store_url")]
    pub url: String,

    /// How long to wait for the connection to come up.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl StoreConfig {
    /// Settings for `url` with the default timeout.
    pub fn new(url: &str) -> Self {
        Self {
            url: url.to_owned(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout_ms: u64) -> Self {
        self.connect_timeout_ms = timeout_ms;
        self
    }

    /// Connection timeout as a [`Duration`].
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Override the URL from `DRAGONFLY_URL` or `REDIS_URL` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DRAGONFLY_URL").or_else(|_| std::env::var("REDIS_URL")) {
            self.url = val;
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(&default_store_url())
    }
}

/// Message mirroring settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct MessageConfig {
    /// Lifetime of mirrored messages in seconds. Unset or `0` keeps them
    /// until deleted.
    #[serde(default)]
    pub cache_lifetime_secs: Option<u64>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_store_url() -> String {
    "redis://localhost:6379".to_owned()
}

const fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_owned()
}
