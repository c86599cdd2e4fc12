//! Ying Binary Entry Point
//!
//! Pings one host and prints a transcript in the usual `ping` format.
//! Core functionality is provided by the `ying` library crate.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use ying::{
    Pinger, Statistics,
    config::{ConfigError, PingerConfig, parse_duration},
};

/// Ying - send ICMP echo requests to a network host
#[derive(Parser, Debug)]
#[command(name = "ying", version, about, long_about = None)]
struct Cli {
    /// Target host (hostname or IPv4 address)
    host: String,

    /// Stop after this many replies (zero or negative: until timeout)
    #[arg(short, long, env = "YING_COUNT", allow_negative_numbers = true)]
    count: Option<i64>,

    /// Wait between echo requests (e.g. "1s", "200ms")
    #[arg(short, long, env = "YING_INTERVAL", value_parser = parse_duration)]
    interval: Option<Duration>,

    /// Stop after this long regardless of replies (e.g. "10s")
    #[arg(short, long, env = "YING_TIMEOUT", value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Use a raw ICMP socket (requires CAP_NET_RAW or root)
    #[arg(long, env = "YING_PRIVILEGED")]
    privileged: bool,

    /// Path to a YAML configuration file
    #[arg(long, env = "YING_CONFIG")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Layer CLI/env overrides on top of the config file (CLI > ENV > file > default).
    fn pinger_config(&self) -> Result<PingerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => PingerConfig::load(path)?,
            None => PingerConfig::default(),
        };

        if let Some(count) = self.count {
            config.count = count;
        }
        if let Some(interval) = self.interval {
            config.interval = interval;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if self.privileged {
            config.privileged = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the transcript.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,ying=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.pinger_config()?;
    let mut pinger = Pinger::new(&cli.host).await?.with_config(config);

    println!("PING {} ({})", pinger.addr(), pinger.ip_addr());

    pinger.on_reply(|reply| {
        println!(
            "{} bytes from {}: icmp_seq={} time={:?}",
            reply.nbytes, reply.ip_addr, reply.seq, reply.rtt
        );
    });
    let host = pinger.addr().to_string();
    pinger.on_finish(move |stats| print!("{}", summary(&host, stats)));

    pinger.run().await?;
    Ok(())
}

fn summary(host: &str, stats: &Statistics) -> String {
    format!(
        "\n--- {host} ping statistics ---\n\
         {} packets transmitted, {} packets received, {:.1}% packet loss\n\
         round-trip min/avg/max/stddev = {:?}/{:?}/{:?}/{:?}\n",
        stats.packets_sent,
        stats.packets_recv,
        stats.packet_loss,
        stats.min_rtt,
        stats.avg_rtt,
        stats.max_rtt,
        stats.std_dev_rtt,
    )
}
