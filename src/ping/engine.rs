//! Ping engine: lifecycle, control loop, and notification callbacks.
//!
//! One control task owns the statistics and the sender; one blocking task
//! owns the read side of the connection. They talk over a bounded channel and
//! stop on a shared [`Termination`].

use std::fmt;
use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::PingerConfig;
use crate::net::{IcmpSocket, PacketConn, Transport, resolve_host};
use crate::ping::PingError;
use crate::ping::clock;
use crate::ping::receiver::{ReceivedPacket, Receiver};
use crate::ping::sender::{Outstanding, Sender};
use crate::ping::signal::{StopHandle, Termination};
use crate::ping::stats::{Accumulator, Statistics};

/// Longest run the deadline timer is armed for.
const MAX_RUN_TIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

type ReplyHandler = Box<dyn FnMut(&Reply) + Send>;
type FinishHandler = Box<dyn FnMut(&Statistics) + Send>;

/// Engine lifecycle. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Running,
    Terminating,
    Stopped,
}

/// A matched echo reply, as passed to the `on_reply` callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Bytes received, including the IP header in privileged mode.
    pub nbytes: usize,
    /// Source address of the reply.
    pub ip_addr: IpAddr,
    /// Echo sequence number.
    pub seq: u16,
    /// Round-trip time.
    pub rtt: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopReason {
    CountReached,
    Timeout,
    Interrupted,
    Stopped,
    ReceiverFailed,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::CountReached => "count reached",
            Self::Timeout => "timeout",
            Self::Interrupted => "interrupted",
            Self::Stopped => "stopped",
            Self::ReceiverFailed => "receive error",
        };
        f.write_str(reason)
    }
}

/// ICMP echo engine for a single IPv4 target.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use ying::{Pinger, PingerConfig};
///
/// # async fn demo() -> Result<(), ying::PingError> {
/// let mut pinger = Pinger::new("192.0.2.1")
///     .await?
///     .with_config(PingerConfig::default().with_count(3));
/// pinger.on_reply(|reply| println!("seq={} rtt={:?}", reply.seq, reply.rtt));
/// let stats = pinger.run().await?;
/// println!("loss: {}%", stats.packet_loss);
/// # Ok(())
/// # }
/// ```
pub struct Pinger {
    addr: String,
    ip_addr: Ipv4Addr,
    config: PingerConfig,
    state: EngineState,
    stats: Accumulator,
    outstanding: Outstanding,
    termination: Termination,
    on_reply: Option<ReplyHandler>,
    on_finish: Option<FinishHandler>,
}

impl Pinger {
    /// Resolve `host` and build an idle engine with default configuration.
    ///
    /// # Errors
    /// Returns `PingError::Resolve` if `host` has no IPv4 address.
    pub async fn new(host: &str) -> Result<Self, PingError> {
        let ip_addr = resolve_host(host)
            .await
            .map_err(|source| PingError::Resolve {
                host: host.to_string(),
                source,
            })?;
        Ok(Self::build(host.to_string(), ip_addr))
    }

    /// Build an idle engine for an already resolved address.
    pub fn with_addr(ip_addr: Ipv4Addr) -> Self {
        Self::build(ip_addr.to_string(), ip_addr)
    }

    fn build(addr: String, ip_addr: Ipv4Addr) -> Self {
        Self {
            addr,
            ip_addr,
            config: PingerConfig::default(),
            state: EngineState::Idle,
            stats: Accumulator::new(),
            outstanding: Outstanding::new(),
            termination: Termination::new(),
            on_reply: None,
            on_finish: None,
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: PingerConfig) -> Self {
        self.config = config;
        self
    }

    /// Resolve `host` and retarget the engine to it.
    ///
    /// # Errors
    /// Returns `PingError::Resolve` and leaves the target unchanged if `host`
    /// has no IPv4 address.
    pub async fn set_addr(&mut self, host: &str) -> Result<(), PingError> {
        self.ip_addr = resolve_host(host)
            .await
            .map_err(|source| PingError::Resolve {
                host: host.to_string(),
                source,
            })?;
        self.addr = host.to_string();
        Ok(())
    }

    /// Retarget an idle engine; `addr` becomes the address literal.
    pub fn set_ip_addr(&mut self, ip_addr: Ipv4Addr) {
        self.ip_addr = ip_addr;
        self.addr = ip_addr.to_string();
    }

    /// Target as given at construction.
    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn ip_addr(&self) -> Ipv4Addr {
        self.ip_addr
    }

    pub fn config(&self) -> &PingerConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Register the per-reply callback, replacing any earlier one.
    pub fn on_reply<F>(&mut self, handler: F)
    where
        F: FnMut(&Reply) + Send + 'static,
    {
        self.on_reply = Some(Box::new(handler));
    }

    /// Register the summary callback, invoked exactly once per run.
    pub fn on_finish<F>(&mut self, handler: F)
    where
        F: FnMut(&Statistics) + Send + 'static,
    {
        self.on_finish = Some(Box::new(handler));
    }

    /// Handle that stops this engine's run from another task.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(self.termination.clone())
    }

    /// Current statistics; final once the engine is `Stopped`.
    pub fn statistics(&self) -> Statistics {
        self.stats.snapshot()
    }

    /// Open an ICMP socket and ping until a stop condition is met.
    ///
    /// # Errors
    /// Returns `PingError::Connect` if the socket cannot be opened (the engine
    /// stays `Idle`), `PingError::Config` for an invalid configuration, or
    /// `PingError::AlreadyStarted` if the engine has already run.
    pub async fn run(&mut self) -> Result<Statistics, PingError> {
        self.ensure_idle()?;
        let socket = IcmpSocket::open(self.config.transport()).map_err(PingError::Connect)?;
        let transport = socket.transport();
        self.execute(Arc::new(socket), transport).await
    }

    /// Like [`Pinger::run`], over a caller-supplied connection.
    ///
    /// The connection must follow the framing of the configured transport:
    /// privileged mode expects an IPv4 header in front of every reply.
    pub async fn run_with(&mut self, conn: Arc<dyn PacketConn>) -> Result<Statistics, PingError> {
        self.ensure_idle()?;
        let transport = self.config.transport();
        self.execute(conn, transport).await
    }

    fn ensure_idle(&self) -> Result<(), PingError> {
        if self.state != EngineState::Idle {
            return Err(PingError::AlreadyStarted);
        }
        self.config
            .validate()
            .map_err(|e| PingError::Config(e.to_string()))
    }

    async fn execute(
        &mut self,
        conn: Arc<dyn PacketConn>,
        transport: Transport,
    ) -> Result<Statistics, PingError> {
        conn.set_read_timeout(self.config.read_timeout)
            .map_err(PingError::Connect)?;
        self.state = EngineState::Running;

        tracing::info!(
            host = %self.addr,
            ip = %self.ip_addr,
            transport = %transport,
            count = self.config.count,
            interval = ?self.config.interval,
            timeout = ?self.config.timeout,
            "Ping started"
        );

        let termination = self.termination.clone();
        let (tx, mut rx) = mpsc::channel(self.config.channel_capacity);
        let receiver = Receiver::new(conn.clone(), transport, termination.clone(), tx).spawn();
        let mut sender = Sender::new(
            conn.clone(),
            transport.destination(self.ip_addr),
            self.config.payload_size,
        );

        let start = Instant::now();
        let deadline = start + self.config.timeout.min(MAX_RUN_TIME);
        let interval = self.config.interval;

        self.send_one(&mut sender, deadline);

        let mut ticker = time::interval_at(start + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let expiry = time::sleep_until(deadline);
        let interrupt = interrupt_signal();
        let stopped = termination.triggered();
        tokio::pin!(expiry, interrupt, stopped);

        let reason = loop {
            tokio::select! {
                _ = &mut interrupt => break StopReason::Interrupted,
                _ = &mut expiry => break StopReason::Timeout,
                _ = &mut stopped => break StopReason::Stopped,
                _ = ticker.tick() => self.send_one(&mut sender, deadline),
                packet = rx.recv() => match packet {
                    Some(packet) => {
                        if self.process_packet(packet) {
                            break StopReason::CountReached;
                        }
                    }
                    None => break StopReason::ReceiverFailed,
                },
            }
        };

        self.state = EngineState::Terminating;
        termination.trigger();
        // Unblocks a receiver parked on a full channel.
        rx.close();
        let reason = settle_reason(reason, receiver.await);
        drop(sender);
        self.state = EngineState::Stopped;

        let stats = self.stats.snapshot();
        tracing::info!(
            host = %self.addr,
            %reason,
            sent = stats.packets_sent,
            received = stats.packets_recv,
            unanswered = self.outstanding.len(),
            "Ping finished"
        );
        if let Some(on_finish) = self.on_finish.as_mut() {
            on_finish(&stats);
        }
        drop(conn);
        Ok(stats)
    }

    fn send_one(&mut self, sender: &mut Sender, deadline: Instant) {
        match sender.send(&mut self.stats, deadline.into_std()) {
            Ok(issued) => self.outstanding.insert(issued),
            Err(e) => tracing::warn!(
                seq = sender.next_sequence(),
                ip = %self.ip_addr,
                error = %e,
                "Echo request not sent"
            ),
        }
    }

    /// Account for one reply. Returns `true` once the reply count is reached.
    ///
    /// Replies from other hosts, for requests this run never sent, or
    /// answering an already answered request are dropped.
    fn process_packet(&mut self, packet: ReceivedPacket) -> bool {
        if packet.source.ip() != IpAddr::V4(self.ip_addr) {
            tracing::debug!(
                source = %packet.source,
                seq = packet.seq,
                "Dropping reply from another host"
            );
            return false;
        }

        let Some(sent_at) = clock::decode_prefix(&packet.payload) else {
            tracing::debug!(
                seq = packet.seq,
                nbytes = packet.nbytes,
                "Dropping reply without timestamp"
            );
            return false;
        };

        let ident = (!self.config.transport().rewrites_ident()).then_some(packet.ident);
        if !self.outstanding.settle(packet.seq, ident) {
            tracing::debug!(
                seq = packet.seq,
                ident = packet.ident,
                "Dropping reply to an unknown request"
            );
            return false;
        }

        let rtt = clock::since(sent_at);
        self.stats.record_reply(rtt);

        let reply = Reply {
            nbytes: packet.nbytes,
            ip_addr: packet.source.ip(),
            seq: packet.seq,
            rtt,
        };
        if let Some(on_reply) = self.on_reply.as_mut() {
            on_reply(&reply);
        }

        self.config
            .reply_limit()
            .is_some_and(|limit| self.stats.received() >= limit)
    }
}

impl fmt::Debug for Pinger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pinger")
            .field("addr", &self.addr)
            .field("ip_addr", &self.ip_addr)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Final stop reason once the receiver task has been joined.
///
/// A fatal read error triggers termination before the control loop sees the
/// closed channel, so the loop alone reports it as an ordinary stop.
fn settle_reason(reason: StopReason, joined: Result<io::Result<()>, JoinError>) -> StopReason {
    let failed = match joined {
        Ok(Ok(())) => false,
        Ok(Err(_)) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Receiver task failed");
            true
        }
    };
    match reason {
        StopReason::Stopped if failed => StopReason::ReceiverFailed,
        // The channel also closes when a stop request ends the receiver.
        StopReason::ReceiverFailed if !failed => StopReason::Stopped,
        reason => reason,
    }
}

/// Resolve on SIGINT or SIGTERM.
async fn interrupt_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::SystemTime;

    use crate::net::icmp::EchoMessage;
    use crate::ping::sender::Issued;

    const IDENT: u16 = 0x5eed;

    /// Accepts sends and never replies.
    struct SilentConn {
        fail_timeout: bool,
    }

    impl PacketConn for SilentConn {
        fn send_to(&self, buf: &[u8], _dst: SocketAddr) -> io::Result<usize> {
            Ok(buf.len())
        }

        fn recv_from(&self, _buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            std::thread::sleep(Duration::from_millis(5));
            Err(io::Error::from(io::ErrorKind::WouldBlock))
        }

        fn set_read_timeout(&self, _timeout: Duration) -> io::Result<()> {
            if self.fail_timeout {
                Err(io::Error::from(io::ErrorKind::Unsupported))
            } else {
                Ok(())
            }
        }
    }

    fn target() -> Ipv4Addr {
        Ipv4Addr::new(192, 0, 2, 1)
    }

    fn quick_config() -> PingerConfig {
        PingerConfig::default()
            .with_interval(Duration::from_millis(20))
            .with_timeout(Duration::from_millis(60))
            .with_read_timeout(Duration::from_millis(5))
    }

    fn packet(seq: u16, payload: Vec<u8>) -> ReceivedPacket {
        ReceivedPacket {
            nbytes: 8 + payload.len(),
            source: SocketAddr::from((target(), 0)),
            ident: IDENT,
            seq,
            payload,
        }
    }

    fn stamp() -> Vec<u8> {
        clock::encode(SystemTime::now()).to_vec()
    }

    /// Pretend requests `seqs` went out with [`IDENT`].
    fn issue(pinger: &mut Pinger, seqs: impl IntoIterator<Item = u16>) {
        for seq in seqs {
            pinger.outstanding.insert(Issued { seq, ident: IDENT });
        }
    }

    #[test]
    fn test_with_addr() {
        let pinger = Pinger::with_addr(target());
        assert_eq!(pinger.addr(), "192.0.2.1");
        assert_eq!(pinger.ip_addr(), target());
        assert_eq!(pinger.state(), EngineState::Idle);
        assert_eq!(pinger.config(), &PingerConfig::default());
        assert_eq!(pinger.statistics(), Statistics::default());
    }

    #[test]
    fn test_set_ip_addr() {
        let mut pinger = Pinger::with_addr(target());
        pinger.set_ip_addr(Ipv4Addr::LOCALHOST);
        assert_eq!(pinger.addr(), "127.0.0.1");
        assert_eq!(pinger.ip_addr(), Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    async fn test_new_keeps_host_string() {
        let pinger = Pinger::new("127.0.0.1").await.unwrap();
        assert_eq!(pinger.addr(), "127.0.0.1");
        assert_eq!(pinger.ip_addr(), Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    async fn test_set_addr_keeps_target_on_failure() {
        let mut pinger = Pinger::with_addr(target());
        assert!(pinger.set_addr("::1").await.is_err());
        assert_eq!(pinger.addr(), "192.0.2.1");

        pinger.set_addr("127.0.0.1").await.unwrap();
        assert_eq!(pinger.ip_addr(), Ipv4Addr::LOCALHOST);
    }

    #[tokio::test]
    async fn test_new_rejects_ipv6() {
        let err = Pinger::new("::1").await.unwrap_err();
        assert!(matches!(err, PingError::Resolve { ref host, .. } if host == "::1"));
    }

    #[tokio::test]
    async fn test_invalid_config_stays_idle() {
        let mut pinger = Pinger::with_addr(target())
            .with_config(PingerConfig::default().with_interval(Duration::ZERO));
        let conn = Arc::new(SilentConn { fail_timeout: false });

        let err = pinger.run_with(conn).await.unwrap_err();
        assert!(matches!(err, PingError::Config(_)));
        assert_eq!(pinger.state(), EngineState::Idle);
    }

    #[tokio::test]
    async fn test_connection_setup_failure_stays_idle() {
        let mut pinger = Pinger::with_addr(target()).with_config(quick_config());
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();
        pinger.on_finish(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let conn = Arc::new(SilentConn { fail_timeout: true });
        let err = pinger.run_with(conn).await.unwrap_err();
        assert!(matches!(err, PingError::Connect(_)));
        assert_eq!(pinger.state(), EngineState::Idle);
        assert_eq!(finished.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_run_reaches_stopped_and_rejects_restart() {
        let mut pinger = Pinger::with_addr(target()).with_config(quick_config());
        let stats = pinger
            .run_with(Arc::new(SilentConn { fail_timeout: false }))
            .await
            .unwrap();

        assert_eq!(pinger.state(), EngineState::Stopped);
        assert!(stats.packets_sent >= 1);
        assert_eq!(stats.packets_recv, 0);
        assert_eq!(stats.packet_loss, 100.0);
        assert_eq!(pinger.statistics(), stats);

        let err = pinger
            .run_with(Arc::new(SilentConn { fail_timeout: false }))
            .await
            .unwrap_err();
        assert!(matches!(err, PingError::AlreadyStarted));
    }

    #[test]
    fn test_process_packet_reports_reply() {
        let mut pinger = Pinger::with_addr(target());
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = seen.clone();
        pinger.on_reply(move |reply| sink.lock().unwrap().push(reply.clone()));
        issue(&mut pinger, [7]);

        let sent_at = SystemTime::now() - Duration::from_millis(3);
        let reached = pinger.process_packet(packet(7, clock::encode(sent_at).to_vec()));

        assert!(!reached);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].seq, 7);
        assert_eq!(seen[0].nbytes, 16);
        assert_eq!(seen[0].ip_addr, IpAddr::V4(target()));
        assert!(seen[0].rtt >= Duration::from_millis(3));
        assert_eq!(pinger.statistics().packets_recv, 1);
    }

    #[test]
    fn test_process_packet_drops_short_payload() {
        let mut pinger = Pinger::with_addr(target());
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        pinger.on_reply(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        issue(&mut pinger, [0]);

        assert!(!pinger.process_packet(packet(0, vec![1, 2, 3])));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(pinger.statistics().packets_recv, 0);
    }

    #[test]
    fn test_process_packet_detects_count() {
        let mut pinger =
            Pinger::with_addr(target()).with_config(PingerConfig::default().with_count(2));
        issue(&mut pinger, [0, 1]);

        assert!(!pinger.process_packet(packet(0, stamp())));
        assert!(pinger.process_packet(packet(1, stamp())));
    }

    #[test]
    fn test_process_packet_drops_other_hosts() {
        let mut pinger = Pinger::with_addr(target());
        issue(&mut pinger, [0]);

        let mut foreign = packet(0, stamp());
        foreign.source = SocketAddr::from((Ipv4Addr::new(198, 51, 100, 77), 0));
        assert!(!pinger.process_packet(foreign));
        assert_eq!(pinger.statistics().packets_recv, 0);

        // The request is still waiting for the real reply.
        assert!(!pinger.process_packet(packet(0, stamp())));
        assert_eq!(pinger.statistics().packets_recv, 1);
    }

    #[test]
    fn test_process_packet_checks_ident_in_raw_mode() {
        let mut pinger = Pinger::with_addr(target())
            .with_config(PingerConfig::default().with_privileged(true));
        issue(&mut pinger, [4]);

        let mut stranger = packet(4, stamp());
        stranger.ident = IDENT.wrapping_add(1);
        pinger.process_packet(stranger);
        assert_eq!(pinger.statistics().packets_recv, 0);

        pinger.process_packet(packet(4, stamp()));
        assert_eq!(pinger.statistics().packets_recv, 1);
    }

    #[test]
    fn test_process_packet_ignores_ident_on_datagram_socket() {
        let mut pinger = Pinger::with_addr(target());
        issue(&mut pinger, [2]);

        let mut rewritten = packet(2, stamp());
        rewritten.ident = 40000;
        pinger.process_packet(rewritten);
        assert_eq!(pinger.statistics().packets_recv, 1);
    }

    #[test]
    fn test_process_packet_drops_unknown_and_duplicate_replies() {
        let mut pinger = Pinger::with_addr(target());
        issue(&mut pinger, [1]);

        pinger.process_packet(packet(9, stamp()));
        pinger.process_packet(packet(1, stamp()));
        pinger.process_packet(packet(1, stamp()));

        let stats = pinger.statistics();
        assert_eq!(stats.packets_recv, 1);
        assert_eq!(stats.rtts.len(), 1);
    }

    #[test]
    fn test_reply_payload_from_codec_is_accepted() {
        let request = EchoMessage::request(1, 3, clock::encode(SystemTime::now()).to_vec());
        let reply = EchoMessage::parse(&request.to_reply().marshal()).unwrap();
        let mut pinger = Pinger::with_addr(target());
        issue(&mut pinger, [3]);
        pinger.process_packet(packet(reply.seq, reply.payload));
        assert_eq!(pinger.statistics().packets_recv, 1);
    }

    #[test]
    fn test_stop_reason_display() {
        assert_eq!(StopReason::CountReached.to_string(), "count reached");
        assert_eq!(StopReason::Timeout.to_string(), "timeout");
        assert_eq!(StopReason::ReceiverFailed.to_string(), "receive error");
    }

    #[test]
    fn test_settle_reason_reports_receive_failure() {
        let fatal = || Ok(Err(io::Error::from(io::ErrorKind::ConnectionReset)));

        assert_eq!(
            settle_reason(StopReason::Stopped, fatal()),
            StopReason::ReceiverFailed
        );
        assert_eq!(
            settle_reason(StopReason::Stopped, Ok(Ok(()))),
            StopReason::Stopped
        );
        assert_eq!(
            settle_reason(StopReason::ReceiverFailed, Ok(Ok(()))),
            StopReason::Stopped
        );
        // A condition the loop saw first wins.
        assert_eq!(
            settle_reason(StopReason::CountReached, fatal()),
            StopReason::CountReached
        );
        assert_eq!(
            settle_reason(StopReason::Interrupted, Ok(Ok(()))),
            StopReason::Interrupted
        );
    }

    #[tokio::test]
    async fn test_settle_reason_treats_panicked_receiver_as_failure() {
        let joined = tokio::task::spawn_blocking(|| -> io::Result<()> { panic!("boom") }).await;
        assert_eq!(
            settle_reason(StopReason::Stopped, joined),
            StopReason::ReceiverFailed
        );
    }
}
