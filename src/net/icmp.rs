//! ICMPv4 echo message codec.
//!
//! Only the echo request/reply pair is understood. Everything else is a
//! [`ParseError`] and is expected to be dropped by the caller.

use pnet_packet::Packet;
use pnet_packet::icmp::echo_reply::EchoReplyPacket;
use pnet_packet::icmp::echo_request::{EchoRequestPacket, MutableEchoRequestPacket};
use pnet_packet::icmp::{self, IcmpCode, IcmpPacket, IcmpType, IcmpTypes};
use pnet_packet::ipv4::Ipv4Packet;
use thiserror::Error;

/// ICMP header size (type, code, checksum, identifier, sequence).
pub const ICMP_HEADER_LEN: usize = 8;

/// Minimum IPv4 header size.
pub const IPV4_MIN_HEADER_LEN: usize = 20;

/// Reasons a received buffer is not a usable echo message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Fewer bytes than an ICMP header.
    #[error("truncated ICMP message ({0} bytes)")]
    Truncated(usize),

    /// Not an IPv4 datagram, or its header length is inconsistent.
    #[error("malformed IPv4 header")]
    BadIpHeader,

    /// Valid ICMP, but not an echo message.
    #[error("not an echo message (type {kind}, code {code})")]
    NotEcho { kind: u8, code: u8 },

    /// An echo request where a reply was expected.
    #[error("echo request, not a reply")]
    UnexpectedRequest,
}

/// Echo direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoKind {
    Request,
    Reply,
}

impl EchoKind {
    fn icmp_type(self) -> IcmpType {
        match self {
            Self::Request => IcmpTypes::EchoRequest,
            Self::Reply => IcmpTypes::EchoReply,
        }
    }
}

/// An ICMP echo request or reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoMessage {
    pub kind: EchoKind,
    pub ident: u16,
    pub seq: u16,
    pub payload: Vec<u8>,
}

impl EchoMessage {
    /// Build an echo request.
    pub fn request(ident: u16, seq: u16, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: EchoKind::Request,
            ident,
            seq,
            payload: payload.into(),
        }
    }

    /// Build the reply a well-behaved peer would send for `self`.
    pub fn to_reply(&self) -> Self {
        Self {
            kind: EchoKind::Reply,
            ..self.clone()
        }
    }

    /// Serialize with a valid checksum.
    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = vec![0u8; ICMP_HEADER_LEN + self.payload.len()];

        // Request and reply share one layout; only the type differs. The
        // buffer always fits the header, so both views exist.
        if let Some(mut echo) = MutableEchoRequestPacket::new(&mut buf) {
            echo.set_icmp_type(self.kind.icmp_type());
            echo.set_icmp_code(IcmpCode::new(0));
            echo.set_identifier(self.ident);
            echo.set_sequence_number(self.seq);
            echo.set_payload(&self.payload);
        }
        let sum = IcmpPacket::new(&buf).map(|packet| icmp::checksum(&packet));
        if let (Some(sum), Some(mut echo)) = (sum, MutableEchoRequestPacket::new(&mut buf)) {
            echo.set_checksum(sum);
        }
        buf
    }

    /// Parse an ICMP message (no IP header).
    ///
    /// The checksum is not verified; the kernel already drops corrupt ICMP.
    pub fn parse(buf: &[u8]) -> Result<Self, ParseError> {
        let truncated = || ParseError::Truncated(buf.len());
        if buf.len() < ICMP_HEADER_LEN {
            return Err(truncated());
        }
        let packet = IcmpPacket::new(buf).ok_or_else(truncated)?;
        let (kind, code) = (packet.get_icmp_type(), packet.get_icmp_code());
        if code != IcmpCode::new(0) {
            return Err(ParseError::NotEcho {
                kind: kind.0,
                code: code.0,
            });
        }

        let (kind, ident, seq, payload) = if kind == IcmpTypes::EchoReply {
            let echo = EchoReplyPacket::new(buf).ok_or_else(truncated)?;
            let (ident, seq) = (echo.get_identifier(), echo.get_sequence_number());
            (EchoKind::Reply, ident, seq, echo.payload().to_vec())
        } else if kind == IcmpTypes::EchoRequest {
            let echo = EchoRequestPacket::new(buf).ok_or_else(truncated)?;
            let (ident, seq) = (echo.get_identifier(), echo.get_sequence_number());
            (EchoKind::Request, ident, seq, echo.payload().to_vec())
        } else {
            return Err(ParseError::NotEcho {
                kind: kind.0,
                code: code.0,
            });
        };

        Ok(Self {
            kind,
            ident,
            seq,
            payload,
        })
    }
}

/// Whether `buf` starts like an IPv4 datagram rather than an ICMP message.
///
/// ICMP types 64 through 79 are unassigned, so no echo message ever starts
/// with a version nibble of 4.
pub fn is_ipv4_datagram(buf: &[u8]) -> bool {
    buf.len() >= IPV4_MIN_HEADER_LEN && buf[0] >> 4 == 4
}

/// Strip the IPv4 header delivered in front of the ICMP message.
///
/// The header length field decides where ICMP starts; the total length field
/// is ignored since BSD kernels rewrite it on raw reads.
pub fn ipv4_payload(buf: &[u8]) -> Result<&[u8], ParseError> {
    let header = Ipv4Packet::new(buf).ok_or(ParseError::BadIpHeader)?;
    if header.get_version() != 4 {
        return Err(ParseError::BadIpHeader);
    }
    let header_len = usize::from(header.get_header_length()) * 4;
    if header_len < IPV4_MIN_HEADER_LEN || header_len > buf.len() {
        return Err(ParseError::BadIpHeader);
    }
    Ok(&buf[header_len..])
}
