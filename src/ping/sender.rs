//! Echo request transmission.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::net::PacketConn;
use crate::net::icmp::EchoMessage;
use crate::net::socket::is_transient_send_error;
use crate::ping::PingError;
use crate::ping::clock::{self, TIMESTAMP_LEN};
use crate::ping::stats::Accumulator;

/// Upper bound on immediate resends after `ENOBUFS`.
pub(crate) const SEND_RETRY_LIMIT: usize = 1024;

/// Requests remembered for matching replies; older ones are forgotten.
pub(crate) const OUTSTANDING_LIMIT: usize = 1024;

/// An echo request the kernel accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Issued {
    pub seq: u16,
    pub ident: u16,
}

/// Requests still waiting for their reply, keyed by sequence number.
#[derive(Debug, Default)]
pub(crate) struct Outstanding {
    idents: HashMap<u16, u16>,
    order: VecDeque<u16>,
}

impl Outstanding {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, issued: Issued) {
        if self.idents.insert(issued.seq, issued.ident).is_some() {
            // Sequence wrapped onto a request that never got its reply.
            self.order.retain(|&seq| seq != issued.seq);
        }
        self.order.push_back(issued.seq);
        while self.order.len() > OUTSTANDING_LIMIT {
            if let Some(oldest) = self.order.pop_front() {
                self.idents.remove(&oldest);
            }
        }
    }

    /// Consume the request a reply answers.
    ///
    /// `ident` is `None` when the identifier cannot be trusted. Returns false
    /// for unknown sequences, identifier mismatches, and duplicates.
    pub(crate) fn settle(&mut self, seq: u16, ident: Option<u16>) -> bool {
        let matches = self
            .idents
            .get(&seq)
            .is_some_and(|&issued| ident.is_none_or(|ident| ident == issued));
        if matches {
            self.idents.remove(&seq);
            self.order.retain(|&pending| pending != seq);
        }
        matches
    }

    pub(crate) fn len(&self) -> usize {
        self.idents.len()
    }
}

/// Builds and transmits one echo request per tick.
///
/// Owns the sequence counter; only the control loop calls [`Sender::send`].
pub(crate) struct Sender {
    conn: Arc<dyn PacketConn>,
    dst: SocketAddr,
    payload_size: usize,
    sequence: u16,
}

impl Sender {
    pub(crate) fn new(conn: Arc<dyn PacketConn>, dst: SocketAddr, payload_size: usize) -> Self {
        Self {
            conn,
            dst,
            payload_size: payload_size.max(TIMESTAMP_LEN),
            sequence: 0,
        }
    }

    /// Sequence number the next successful send will carry.
    pub(crate) fn next_sequence(&self) -> u16 {
        self.sequence
    }

    /// Send one echo request stamped with the current time.
    ///
    /// `ENOBUFS` is retried immediately, at most [`SEND_RETRY_LIMIT`] times
    /// and never past `deadline`. The sequence counter and the sent count
    /// only advance when the datagram is accepted by the kernel.
    pub(crate) fn send(
        &mut self,
        stats: &mut Accumulator,
        deadline: Instant,
    ) -> Result<Issued, PingError> {
        let seq = self.sequence;
        let ident = rand::random::<u16>();
        let bytes = EchoMessage::request(ident, seq, self.payload()).marshal();

        let mut attempts = 0;
        loop {
            attempts += 1;
            match self.conn.send_to(&bytes, self.dst) {
                Ok(_) => break,
                Err(e)
                    if is_transient_send_error(&e)
                        && attempts < SEND_RETRY_LIMIT
                        && Instant::now() < deadline =>
                {
                    tracing::trace!(seq, attempts, "Send buffer full, retrying");
                }
                Err(e) => return Err(PingError::Send(e)),
            }
        }

        self.sequence = self.sequence.wrapping_add(1);
        stats.record_sent();
        tracing::debug!(seq, ident, dst = %self.dst, bytes = bytes.len(), "Echo request sent");
        Ok(Issued { seq, ident })
    }

    fn payload(&self) -> Vec<u8> {
        let mut payload = vec![0u8; self.payload_size];
        payload[..TIMESTAMP_LEN].copy_from_slice(&clock::encode(SystemTime::now()));
        payload
    }
}
