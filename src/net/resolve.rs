//! Target resolution.

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Resolve `host` (IPv4 literal or hostname) to the first IPv4 address.
pub async fn resolve_host(host: &str) -> Result<Ipv4Addr, io::Error> {
    // First, try to parse as an IP address directly
    if let Ok(ip) = host.parse::<IpAddr>() {
        return match ip {
            IpAddr::V4(v4) => Ok(v4),
            IpAddr::V6(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "IPv6 targets are not supported",
            )),
        };
    }

    // Otherwise, resolve the hostname using tokio's DNS lookup
    let addrs = tokio::net::lookup_host(format!("{host}:0")).await?;
    addrs
        .into_iter()
        .find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(*v4.ip()),
            SocketAddr::V6(_) => None,
        })
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no IPv4 addresses found"))
}
