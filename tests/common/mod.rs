//! In-memory loopback connection and callback recorders shared by the
//! engine tests.

#![allow(dead_code)]

use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use ying::net::icmp::EchoMessage;
use ying::{PacketConn, Pinger, PingerConfig, Reply, Statistics};

pub const TARGET: Ipv4Addr = Ipv4Addr::new(192, 0, 2, 10);
pub const BYSTANDER: Ipv4Addr = Ipv4Addr::new(198, 51, 100, 77);
pub const READ_TIMEOUT: Duration = Duration::from_millis(20);

/// How the fake peer answers.
#[derive(Clone, Copy)]
pub enum Peer {
    /// Echo every request back.
    Echo,
    /// Never answer.
    Silent,
    /// Truncate the payload of odd sequence numbers to 4 bytes.
    CorruptOdd,
    /// Reject each send `n` times with ENOBUFS before accepting it.
    BufferFull(usize),
    /// Echo, but fail reads with a hard error after `n` delivered replies.
    FailAfter(usize),
    /// Echo, surrounded by traffic meant for other pingers on the host: a
    /// reply from another address, a reply with a foreign identifier, then
    /// the real reply twice.
    Crosstalk,
    /// Only the traffic meant for other pingers, never the real reply.
    Bystander,
}

pub struct LoopbackConn {
    peer: Peer,
    ip_header: bool,
    replies_tx: Mutex<mpsc::Sender<(Vec<u8>, SocketAddr)>>,
    replies_rx: Mutex<mpsc::Receiver<(Vec<u8>, SocketAddr)>>,
    read_timeout: Mutex<Duration>,
    pending_failures: AtomicUsize,
    delivered: AtomicUsize,
}

impl LoopbackConn {
    pub fn new(peer: Peer) -> Arc<Self> {
        Self::build(peer, false)
    }

    pub fn with_ip_header(peer: Peer) -> Arc<Self> {
        Self::build(peer, true)
    }

    fn build(peer: Peer, ip_header: bool) -> Arc<Self> {
        let (tx, rx) = mpsc::channel();
        let failures = match peer {
            Peer::BufferFull(n) => n,
            _ => 0,
        };
        Arc::new(Self {
            peer,
            ip_header,
            replies_tx: Mutex::new(tx),
            replies_rx: Mutex::new(rx),
            read_timeout: Mutex::new(Duration::from_secs(1)),
            pending_failures: AtomicUsize::new(failures),
            delivered: AtomicUsize::new(0),
        })
    }

    fn frame(&self, icmp: Vec<u8>) -> Vec<u8> {
        if !self.ip_header {
            return icmp;
        }
        let mut datagram = vec![0u8; 20];
        datagram[0] = 0x45;
        datagram[8] = 64;
        datagram[9] = 1;
        datagram.extend_from_slice(&icmp);
        datagram
    }

    fn deliver(&self, reply: &EchoMessage, from: Ipv4Addr) {
        let datagram = self.frame(reply.marshal());
        self.replies_tx
            .lock()
            .unwrap()
            .send((datagram, SocketAddr::from((from, 0))))
            .expect("receiver half is owned by the connection");
    }

    fn deliver_crosstalk(&self, reply: &EchoMessage) {
        self.deliver(reply, BYSTANDER);
        let stranger = EchoMessage {
            ident: reply.ident.wrapping_add(1),
            ..reply.clone()
        };
        self.deliver(&stranger, TARGET);
    }
}

impl PacketConn for LoopbackConn {
    fn send_to(&self, buf: &[u8], dst: SocketAddr) -> io::Result<usize> {
        assert_eq!(dst.ip(), IpAddr::V4(TARGET));

        if let Peer::BufferFull(n) = self.peer {
            if self.pending_failures.load(Ordering::SeqCst) > 0 {
                self.pending_failures.fetch_sub(1, Ordering::SeqCst);
                return Err(io::Error::from_raw_os_error(libc::ENOBUFS));
            }
            self.pending_failures.store(n, Ordering::SeqCst);
        }

        let request = EchoMessage::parse(buf).expect("engine sends valid echo requests");
        let mut reply = request.to_reply();
        match self.peer {
            Peer::Silent => return Ok(buf.len()),
            Peer::CorruptOdd if reply.seq % 2 == 1 => reply.payload.truncate(4),
            Peer::Crosstalk => {
                self.deliver_crosstalk(&reply);
                self.deliver(&reply, TARGET);
            }
            Peer::Bystander => {
                self.deliver_crosstalk(&reply);
                return Ok(buf.len());
            }
            _ => {}
        }

        self.deliver(&reply, TARGET);
        Ok(buf.len())
    }

    fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        if let Peer::FailAfter(n) = self.peer {
            if self.delivered.load(Ordering::SeqCst) >= n {
                return Err(io::Error::from(io::ErrorKind::ConnectionReset));
            }
        }

        let timeout = *self.read_timeout.lock().unwrap();
        match self.replies_rx.lock().unwrap().recv_timeout(timeout) {
            Ok((datagram, source)) => {
                buf[..datagram.len()].copy_from_slice(&datagram);
                self.delivered.fetch_add(1, Ordering::SeqCst);
                Ok((datagram.len(), source))
            }
            Err(_) => Err(io::Error::from(io::ErrorKind::WouldBlock)),
        }
    }

    fn set_read_timeout(&self, timeout: Duration) -> io::Result<()> {
        *self.read_timeout.lock().unwrap() = timeout;
        Ok(())
    }
}

/// Everything the callbacks observed during one run.
#[derive(Default)]
pub struct Transcript {
    pub replies: Mutex<Vec<Reply>>,
    pub finished: Mutex<Vec<Statistics>>,
}

impl Transcript {
    pub fn attach(pinger: &mut Pinger) -> Arc<Self> {
        let transcript = Arc::new(Self::default());
        let sink = transcript.clone();
        pinger.on_reply(move |reply| sink.replies.lock().unwrap().push(reply.clone()));
        let sink = transcript.clone();
        pinger.on_finish(move |stats| sink.finished.lock().unwrap().push(stats.clone()));
        transcript
    }

    pub fn seqs(&self) -> Vec<u16> {
        self.replies.lock().unwrap().iter().map(|r| r.seq).collect()
    }

    pub fn finish_count(&self) -> usize {
        self.finished.lock().unwrap().len()
    }
}

pub fn config() -> PingerConfig {
    PingerConfig::default()
        .with_interval(Duration::from_millis(20))
        .with_timeout(Duration::from_secs(10))
        .with_read_timeout(READ_TIMEOUT)
}
