//! Ying - ICMP echo latency probe
//!
//! This crate provides a concurrent ping engine that can be embedded in other
//! Rust projects, or run as a standalone binary with the `ying` executable.
//!
//! # Architecture
//!
//! - **Engine**: [`Pinger`] drives one control loop and one blocking receiver
//!   over a shared ICMP socket, stopping on count, timeout, or interrupt
//! - **Statistics**: single-writer RTT accumulation (min/avg/max/stddev/loss)
//! - **Network**: ICMPv4 echo codec and socket2-backed packet connections
//! - **Config**: YAML profiles with humantime durations
//!
//! # Example
//!
//! ```rust,no_run
//! use ying::{Pinger, PingerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ying::PingError> {
//!     let mut pinger = Pinger::new("example.com")
//!         .await?
//!         .with_config(PingerConfig::default().with_count(4));
//!
//!     pinger.on_reply(|r| println!("{} bytes from {}: icmp_seq={}", r.nbytes, r.ip_addr, r.seq));
//!     pinger.on_finish(|s| println!("{}% packet loss", s.packet_loss));
//!     pinger.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod net;
pub mod ping;

pub use config::{ConfigError, PingerConfig};
pub use net::{IcmpSocket, PacketConn, Transport};
pub use ping::{EngineState, PingError, Pinger, Reply, Statistics, StopHandle};
