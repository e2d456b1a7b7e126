//! Configuration loading and typed config structures for the order feed.
//!
//! The canonical configuration lives in `orderfeed-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror
//! the YAML structure and a loader that reads the file. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.

use std::path::Path;
use std::time::Duration;

use orderfeed_store::{FactorySettings, DEFAULT_MAX_PRICE, DEFAULT_SEED_WINDOW_MS};
use serde::Deserialize;
use tracing::warn;

use crate::controller::DEFAULT_BROADCAST_CAPACITY;

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level feed configuration.
///
/// Mirrors the structure of `orderfeed-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FeedConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Data set and tick settings.
    #[serde(default)]
    pub feed: FeedSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where a loaded [`FeedConfig`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Read from the config file.
    File,
    /// The file was missing; built-in defaults were used.
    Defaults,
}

impl FeedConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values for the listener:
    /// - `ORDERFEED_HOST` overrides `server.host`
    /// - `ORDERFEED_PORT` overrides `server.port`
    /// - `ORDERFEED_ALLOWED_ORIGIN` overrides `server.allowed_origin`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Like [`from_file`](Self::from_file), but a missing file yields the
    /// defaults (with env overrides applied) instead of an error.
    ///
    /// Nothing is logged here, since this usually runs before logging is
    /// configured. The returned [`ConfigSource`] tells the caller which
    /// case applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for any failure other than "not found".
    pub fn load_or_default(path: &Path) -> Result<(Self, ConfigSource), ConfigError> {
        match Self::from_file(path) {
            Ok(config) => Ok((config, ConfigSource::File)),
            Err(ConfigError::Io { source }) if source.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.server.apply_env_overrides();
                Ok((config, ConfigSource::Defaults))
            }
            Err(e) => Err(e),
        }
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document has no mapping to deserialize.
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.server.apply_env_overrides();
        Ok(config)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Host name or address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origin. `*` allows any origin.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

impl ServerSettings {
    /// Override listener settings with environment variables when set.
    ///
    /// An unparseable `ORDERFEED_PORT` is ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("ORDERFEED_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("ORDERFEED_PORT") {
            match val.parse() {
                Ok(port) => self.port = port,
                Err(e) => warn!(value = %val, error = %e, "Ignoring invalid ORDERFEED_PORT"),
            }
        }
        if let Ok(val) = std::env::var("ORDERFEED_ALLOWED_ORIGIN") {
            self.allowed_origin = val;
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origin: default_allowed_origin(),
        }
    }
}

/// Data set and tick configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedSettings {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Orders generated at startup before traffic is accepted.
    #[serde(default = "default_seed_count")]
    pub seed_count: usize,

    /// Seeded orders are back-dated up to this many milliseconds.
    #[serde(default = "default_seed_window_ms")]
    pub seed_window_ms: u64,

    /// Generated prices fall in `[0, max_price)`.
    #[serde(default = "default_max_price")]
    pub max_price: f64,

    /// Fixed RNG seed for reproducible data. Omit for OS entropy.
    #[serde(default)]
    pub rng_seed: Option<u64>,

    /// Capacity of the `newOrder` broadcast channel.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl FeedSettings {
    /// The tick period as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Generator settings derived from this config.
    pub const fn factory_settings(&self) -> FactorySettings {
        FactorySettings {
            max_price: self.max_price,
            seed_window_ms: self.seed_window_ms,
            rng_seed: self.rng_seed,
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            seed_count: default_seed_count(),
            seed_window_ms: default_seed_window_ms(),
            max_price: default_max_price(),
            rng_seed: None,
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_host() -> String {
    "localhost".to_owned()
}

const fn default_port() -> u16 {
    8001
}

fn default_allowed_origin() -> String {
    "*".to_owned()
}

const fn default_tick_interval_ms() -> u64 {
    5_000
}

const fn default_seed_count() -> usize {
    100_000
}

const fn default_seed_window_ms() -> u64 {
    DEFAULT_SEED_WINDOW_MS
}

const fn default_max_price() -> f64 {
    DEFAULT_MAX_PRICE
}

const fn default_broadcast_capacity() -> usize {
    DEFAULT_BROADCAST_CAPACITY
}

fn default_log_level() -> String {
    "info".to_owned()
}
