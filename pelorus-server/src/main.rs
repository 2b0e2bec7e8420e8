//! # Pelorus Server
//!
//! Reads AIS `!AIVDM` sentences from a byte stream (stdin by default, a TCP
//! feed, or a timed replay of a recorded NMEA log), decodes them with
//! [`pelorus_core`] and maintains a bounded list of tracked vessels.
//! Decoded vessel reports go out as JSON lines on stdout, one at a time at
//! a steady cadence, ready for a telemetry link with its own bandwidth
//! constraints.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use pelorus_core::{AisConfig, LogOptions};
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};

mod feed;
mod runner;
mod telemetry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Clone, Debug)]
#[command(name = "pelorus-server", version, about)]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Read sentences from a TCP AIS feed (host:port) instead of stdin
    #[arg(short, long)]
    pub tcp: Option<String>,

    /// Replay a recorded NMEA log file, see below
    #[arg(short, long)]
    pub replay: Option<PathBuf>,

    /// Replay pacing in sentences per second (0 = no pacing)
    #[arg(long, default_value_t = 20)]
    pub replay_rate: u32,

    /// Maximum number of vessels to track at once
    #[arg(long, default_value_t = 25)]
    pub max_vessels: usize,

    /// Seconds without an update before a vessel is dropped from the list
    #[arg(long, default_value_t = 600)]
    pub timeout_secs: u32,

    /// Minimum interval between two reports of the same vessel
    #[arg(long, default_value_t = 5000)]
    pub report_interval_ms: u64,

    /// Log every accepted raw sentence
    #[arg(long, default_value_t = false)]
    pub log_raw: bool,

    /// Log raw payloads of unsupported message types
    #[arg(long, default_value_t = false)]
    pub log_unsupported: bool,

    /// Log every decoded vessel update
    #[arg(long, default_value_t = false)]
    pub log_decoded: bool,

    /// Write vessel reports to stdout as JSON lines
    #[arg(short, long, default_value_t = false)]
    pub output: bool,
}

impl Cli {
    fn ais_config(&self) -> AisConfig {
        let mut log_options = LogOptions::empty();
        log_options.set(LogOptions::RAW_ALL, self.log_raw);
        log_options.set(LogOptions::RAW_UNSUPPORTED, self.log_unsupported);
        log_options.set(LogOptions::DECODED, self.log_decoded);

        AisConfig {
            enabled: true,
            max_vessels: self.max_vessels,
            vessel_timeout_secs: self.timeout_secs,
            report_interval_ms: self.report_interval_ms,
            log_options,
        }
    }
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    log::info!("pelorus-server {}", VERSION);

    Toplevel::new(move |s| async move {
        s.start(SubsystemBuilder::new("Receiver", move |subsys| {
            runner::run(subsys, args)
        }));
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_millis(1000))
    .await
    .map_err(Into::into)
}
