//! Pinger configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::net::Transport;
use crate::ping::clock::TIMESTAMP_LEN;

use super::validation::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Default reply count (negative: run until timeout or interrupt).
pub const DEFAULT_COUNT: i64 = -1;

/// Default interval between echo requests (1 second).
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Default overall run timeout (effectively unbounded).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100_000);

/// Default receiver read timeout (100 milliseconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Default receiver-to-loop channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 5;

/// Default echo payload size: just the send timestamp.
pub const DEFAULT_PAYLOAD_SIZE: usize = TIMESTAMP_LEN;

fn default_count() -> i64 {
    DEFAULT_COUNT
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_read_timeout() -> Duration {
    DEFAULT_READ_TIMEOUT
}

fn default_channel_capacity() -> usize {
    DEFAULT_CHANNEL_CAPACITY
}

fn default_payload_size() -> usize {
    DEFAULT_PAYLOAD_SIZE
}

// =============================================================================
// Pinger Configuration
// =============================================================================

/// Engine configuration, fixed before [`Pinger::run`](crate::Pinger::run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PingerConfig {
    /// Replies to wait for; zero or negative means no limit (default: -1).
    #[serde(default = "default_count")]
    pub count: i64,

    /// Time between echo requests (default: 1s).
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Overall run time limit (default: 100000s).
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Use a raw ICMP socket instead of an unprivileged datagram one.
    #[serde(default)]
    pub privileged: bool,

    /// Receiver read timeout; bounds how quickly it notices termination.
    #[serde(default = "default_read_timeout", with = "humantime_serde")]
    pub read_timeout: Duration,

    /// Replies buffered between receiver and control loop (default: 5).
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Echo payload size in bytes, timestamp included (default: 8).
    #[serde(default = "default_payload_size")]
    pub payload_size: usize,
}

impl Default for PingerConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_COUNT,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            privileged: false,
            read_timeout: DEFAULT_READ_TIMEOUT,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            payload_size: DEFAULT_PAYLOAD_SIZE,
        }
    }
}

impl PingerConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed, or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::ValidationError` if any field is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "interval must be positive".to_string(),
            ));
        }

        if self.read_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "read_timeout must be positive".to_string(),
            ));
        }

        if self.channel_capacity == 0 {
            return Err(ConfigError::ValidationError(
                "channel_capacity must be positive".to_string(),
            ));
        }

        if self.payload_size < TIMESTAMP_LEN {
            return Err(ConfigError::ValidationError(format!(
                "payload_size must be at least {TIMESTAMP_LEN} bytes"
            )));
        }

        Ok(())
    }

    /// Socket transport selected by `privileged`.
    pub fn transport(&self) -> Transport {
        Transport::from_privileged(self.privileged)
    }

    /// Reply limit, or `None` when unbounded.
    pub fn reply_limit(&self) -> Option<u64> {
        u64::try_from(self.count).ok().filter(|&n| n > 0)
    }

    /// Set the reply count.
    pub fn with_count(mut self, count: i64) -> Self {
        self.count = count;
        self
    }

    /// Set the send interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the overall timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set privileged (raw socket) mode.
    pub fn with_privileged(mut self, privileged: bool) -> Self {
        self.privileged = privileged;
        self
    }

    /// Set the receiver read timeout.
    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Set the receiver channel capacity.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Set the echo payload size.
    pub fn with_payload_size(mut self, size: usize) -> Self {
        self.payload_size = size;
        self
    }
}
