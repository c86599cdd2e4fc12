//! Running RTT statistics.
//!
//! [`Accumulator`] has a single writer (the engine's control loop), so it
//! carries no internal locking. [`Statistics`] is the read-only snapshot
//! handed to callers and to the finish callback.

use std::time::Duration;

/// Snapshot of a ping run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    /// Echo requests transmitted.
    pub packets_sent: u64,
    /// Echo replies matched.
    pub packets_recv: u64,
    /// Percentage of requests without a reply (0 when nothing was sent).
    pub packet_loss: f64,
    /// Every RTT sample, in arrival order.
    pub rtts: Vec<Duration>,
    /// Smallest RTT (zero without samples).
    pub min_rtt: Duration,
    /// Largest RTT (zero without samples).
    pub max_rtt: Duration,
    /// Mean RTT (zero without samples).
    pub avg_rtt: Duration,
    /// Population standard deviation of the RTTs (zero without samples).
    pub std_dev_rtt: Duration,
}

/// Single-writer aggregation of sent/received counts and RTT samples.
///
/// Mean and variance are tracked with Welford's update so the standard
/// deviation never needs a second pass over the samples.
#[derive(Debug, Default)]
pub struct Accumulator {
    sent: u64,
    rtts: Vec<Duration>,
    min: Duration,
    max: Duration,
    sum_nanos: u128,
    mean_nanos: f64,
    sq_dev_nanos: f64,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one transmitted echo request.
    pub fn record_sent(&mut self) {
        self.sent = self.sent.saturating_add(1);
    }

    /// Add one matched reply.
    pub fn record_reply(&mut self, rtt: Duration) {
        if self.rtts.is_empty() {
            self.min = rtt;
            self.max = rtt;
        } else {
            self.min = self.min.min(rtt);
            self.max = self.max.max(rtt);
        }
        self.rtts.push(rtt);
        self.sum_nanos += rtt.as_nanos();

        let x = rtt.as_nanos() as f64;
        let n = self.rtts.len() as f64;
        let delta = x - self.mean_nanos;
        self.mean_nanos += delta / n;
        self.sq_dev_nanos += delta * (x - self.mean_nanos);
    }

    /// Packets sent so far.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Replies received so far.
    pub fn received(&self) -> u64 {
        self.rtts.len() as u64
    }

    /// Compute loss and standard deviation and return a copy of everything.
    pub fn snapshot(&self) -> Statistics {
        let recv = self.received();
        let packet_loss = if self.sent == 0 {
            0.0
        } else {
            self.sent.saturating_sub(recv) as f64 / self.sent as f64 * 100.0
        };

        if recv == 0 {
            return Statistics {
                packets_sent: self.sent,
                packets_recv: 0,
                packet_loss,
                ..Statistics::default()
            };
        }

        let avg_nanos = self.sum_nanos / u128::from(recv);
        let std_dev_nanos = (self.sq_dev_nanos / recv as f64).max(0.0).sqrt();

        Statistics {
            packets_sent: self.sent,
            packets_recv: recv,
            packet_loss,
            rtts: self.rtts.clone(),
            min_rtt: self.min,
            max_rtt: self.max,
            avg_rtt: Duration::from_nanos(avg_nanos.min(u128::from(u64::MAX)) as u64),
            std_dev_rtt: Duration::from_nanos(std_dev_nanos.round() as u64),
        }
    }
}
