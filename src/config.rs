//! Configuration module for the ying pinger.
//!
//! Provides YAML-based configuration loading and validation for the engine
//! settings (count, interval, timeout, transport, receiver tuning).

mod app;
mod validation;

pub use app::{
    DEFAULT_CHANNEL_CAPACITY, DEFAULT_COUNT, DEFAULT_INTERVAL, DEFAULT_PAYLOAD_SIZE,
    DEFAULT_READ_TIMEOUT, DEFAULT_TIMEOUT, PingerConfig,
};
pub use validation::{ConfigError, parse_duration};
