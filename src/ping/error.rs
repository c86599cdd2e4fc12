//! Engine error types.

use thiserror::Error;

/// Errors surfaced by the ping engine.
///
/// Only `Resolve`, `Connect`, `Config` and `AlreadyStarted` ever reach the
/// caller of [`Pinger::run`](crate::Pinger::run); `Send` is produced per tick
/// and absorbed by the control loop.
#[derive(Debug, Error)]
pub enum PingError {
    /// The target could not be resolved to an IPv4 address.
    #[error("failed to resolve '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    /// The packet connection could not be opened.
    #[error("failed to open ICMP connection: {0}")]
    Connect(#[source] std::io::Error),

    /// A non-transient transmit failure.
    #[error("failed to send echo request: {0}")]
    Send(#[source] std::io::Error),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// `run` was called on an engine that already left `Idle`.
    #[error("pinger has already been started")]
    AlreadyStarted,
}
