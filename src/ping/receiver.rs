//! Echo reply reception.
//!
//! The receiver runs on a blocking thread for the whole run. Reads are bounded
//! by the connection's read timeout so the termination signal is observed
//! within one timeout interval without closing the socket underneath it.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::net::icmp::{self, EchoKind, EchoMessage, ParseError};
use crate::net::socket::is_timeout;
use crate::net::{PacketConn, Transport};
use crate::ping::signal::Termination;

/// Largest datagram read in one call.
const RECV_BUFFER_SIZE: usize = 1500;

/// An echo reply handed from the receiver to the control loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReceivedPacket {
    /// Bytes read from the socket, including any IP header.
    pub nbytes: usize,
    /// Sender of the reply.
    pub source: SocketAddr,
    /// Echo identifier.
    pub ident: u16,
    /// Echo sequence number.
    pub seq: u16,
    /// Echo payload as returned by the peer.
    pub payload: Vec<u8>,
}

pub(crate) struct Receiver {
    conn: Arc<dyn PacketConn>,
    transport: Transport,
    termination: Termination,
    tx: mpsc::Sender<ReceivedPacket>,
}

impl Receiver {
    pub(crate) fn new(
        conn: Arc<dyn PacketConn>,
        transport: Transport,
        termination: Termination,
        tx: mpsc::Sender<ReceivedPacket>,
    ) -> Self {
        Self {
            conn,
            transport,
            termination,
            tx,
        }
    }

    /// Start the receive loop on the blocking pool.
    ///
    /// The task resolves to the fatal read error that ended it, if any.
    pub(crate) fn spawn(self) -> JoinHandle<io::Result<()>> {
        tokio::task::spawn_blocking(move || self.run())
    }

    fn run(self) -> io::Result<()> {
        tracing::debug!(transport = %self.transport, "Receiver started");
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        while !self.termination.is_triggered() {
            let (n, source) = match self.conn.recv_from(&mut buf) {
                Ok(read) => read,
                Err(e) if is_timeout(&e) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "Receive failed, terminating");
                    self.termination.trigger();
                    return Err(e);
                }
            };

            let packet = match self.decode(&buf[..n], source) {
                Ok(packet) => packet,
                Err(e) => {
                    tracing::debug!(source = %source, nbytes = n, error = %e, "Dropping packet");
                    continue;
                }
            };

            // Closed only when the control loop is shutting down.
            if self.tx.blocking_send(packet).is_err() {
                break;
            }
        }

        tracing::debug!("Receiver stopped");
        Ok(())
    }

    fn decode(&self, datagram: &[u8], source: SocketAddr) -> Result<ReceivedPacket, ParseError> {
        let message = if self.transport.has_ip_header() || icmp::is_ipv4_datagram(datagram) {
            icmp::ipv4_payload(datagram)?
        } else {
            datagram
        };
        let echo = EchoMessage::parse(message)?;
        if echo.kind != EchoKind::Reply {
            return Err(ParseError::UnexpectedRequest);
        }

        Ok(ReceivedPacket {
            nbytes: datagram.len(),
            source,
            ident: echo.ident,
            seq: echo.seq,
            payload: echo.payload,
        })
    }
}
