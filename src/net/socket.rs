//! Packet connections for ICMP echo traffic.
//!
//! [`PacketConn`] is the seam between the engine and the operating system: one
//! task writes through it while another reads, so implementations must allow
//! concurrent `send_to` and `recv_from` from different threads.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use socket2::{Domain, Protocol, Socket, Type};

/// Socket flavour used to carry ICMP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// `SOCK_DGRAM` ICMP socket; no privilege needed. Linux delivers bare
    /// ICMP, BSD kernels prepend the IPv4 header.
    Datagram,
    /// `SOCK_RAW` ICMP socket; needs elevated privilege, IP header on receive.
    Raw,
}

impl Transport {
    /// Pick the transport for the privileged flag.
    pub fn from_privileged(privileged: bool) -> Self {
        if privileged { Self::Raw } else { Self::Datagram }
    }

    /// Whether received datagrams always start with an IPv4 header.
    ///
    /// Datagram sockets may still carry one depending on the platform; see
    /// [`icmp::is_ipv4_datagram`](crate::net::icmp::is_ipv4_datagram).
    pub fn has_ip_header(self) -> bool {
        matches!(self, Self::Raw)
    }

    /// Whether the kernel may replace the echo identifier on the way out.
    ///
    /// Linux ping sockets overwrite it with the local port, so replies can
    /// only be matched on the identifier in raw mode.
    pub fn rewrites_ident(self) -> bool {
        matches!(self, Self::Datagram)
    }

    /// Destination address for `target` in this transport's addressing form.
    ///
    /// ICMP has no ports; both forms carry port 0 and differ only in the
    /// socket type they are handed to.
    pub fn destination(self, target: Ipv4Addr) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(target, 0))
    }

    fn socket_type(self) -> Type {
        match self {
            Self::Datagram => Type::DGRAM,
            Self::Raw => Type::RAW,
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Datagram => write!(f, "udp"),
            Self::Raw => write!(f, "ip4:icmp"),
        }
    }
}

/// An open packet connection.
///
/// Closing is dropping the last reference.
pub trait PacketConn: Send + Sync + 'static {
    /// Transmit one datagram to `dst`.
    fn send_to(&self, buf: &[u8], dst: SocketAddr) -> io::Result<usize>;

    /// Receive one datagram, waiting at most the configured read timeout.
    ///
    /// A timeout is reported as an error for which [`is_timeout`] holds.
    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    /// Bound every subsequent `recv_from`.
    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()>;
}

/// ICMPv4 socket bound to the wildcard address.
#[derive(Debug)]
pub struct IcmpSocket {
    inner: UdpSocket,
    transport: Transport,
}

impl IcmpSocket {
    /// Open an ICMPv4 socket of the given transport.
    ///
    /// Raw sockets fail with `PermissionDenied` without `CAP_NET_RAW`; datagram
    /// sockets fail the same way when `net.ipv4.ping_group_range` excludes the
    /// caller's group.
    pub fn open(transport: Transport) -> io::Result<Self> {
        let socket = Socket::new(
            Domain::IPV4,
            transport.socket_type(),
            Some(Protocol::ICMPV4),
        )?;
        let wildcard = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
        socket.bind(&wildcard.into())?;

        tracing::debug!(transport = %transport, "Opened ICMP socket");
        Ok(Self {
            // std's UdpSocket is a thin fd wrapper with safe recv_from; the
            // socket type underneath stays whatever socket2 created.
            inner: socket.into(),
            transport,
        })
    }

    /// Transport the socket was opened with.
    pub fn transport(&self) -> Transport {
        self.transport
    }
}

impl PacketConn for IcmpSocket {
    fn send_to(&self, buf: &[u8], dst: SocketAddr) -> io::Result<usize> {
        self.inner.send_to(buf, dst)
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.inner.recv_from(buf)
    }

    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        self.inner.set_read_timeout(Some(timeout))
    }
}

/// Whether a receive error only means the read timeout elapsed.
pub fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Whether a send error is the transient "no buffer space" condition.
pub fn is_transient_send_error(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENOBUFS)
}
