//! Network plumbing: the ICMP echo codec, packet connections and target
//! resolution.
//!
//! - [`icmp`]: marshal echo requests, parse echo replies
//! - [`socket`]: [`PacketConn`] and the socket2-backed [`IcmpSocket`]
//! - [`resolve_host`]: hostname to IPv4 address

pub mod icmp;
mod resolve;
pub mod socket;

pub use resolve::resolve_host;
pub use socket::{IcmpSocket, PacketConn, Transport};
