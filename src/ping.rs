//! ICMP echo engine.
//!
//! - [`clock`]: send-timestamp payload codec
//! - [`stats`]: RTT accumulation and the [`Statistics`] snapshot
//! - [`Pinger`]: the engine tying sender, receiver and control loop together

pub mod clock;
mod engine;
mod error;
mod receiver;
mod sender;
mod signal;
pub mod stats;

pub use engine::{EngineState, Pinger, Reply};
pub use error::PingError;
pub use signal::StopHandle;
pub use stats::{Accumulator, Statistics};
