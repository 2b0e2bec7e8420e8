//! The receiver subsystem: feed bytes in, tick the tracker, emit reports.
//!
//! Exactly one task owns the [`AisReceiver`]; byte decoding, eviction ticks
//! and report selection are serialized here through `select!`, which is all
//! the synchronization the core requires.

use std::time::{Duration, Instant};

use pelorus_core::{AisEvent, AisReceiver};
use tokio::time::MissedTickBehavior;
use tokio_graceful_shutdown::SubsystemHandle;

use crate::feed::FeedSource;
use crate::telemetry::TelemetryWriter;
use crate::Cli;

/// Tick cadence for eviction and report selection (the original receiver
/// hardware was polled at 20 Hz).
const TICK_INTERVAL: Duration = Duration::from_millis(50);

/// Ticks between periodic statistics log lines (one minute).
const STATS_LOG_TICKS: u64 = 1200;

pub async fn run(subsys: SubsystemHandle, args: Cli) -> anyhow::Result<()> {
    let mut receiver = AisReceiver::new(&args.ais_config());
    let mut feed = FeedSource::open(&args).await?;
    let mut telemetry = TelemetryWriter::new();

    let start = Instant::now();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks: u64 = 0;

    loop {
        tokio::select! {
            _ = subsys.on_shutdown_requested() => {
                log::debug!("receiver: shutdown");
                break;
            }
            chunk = feed.next_chunk() => {
                let now = start.elapsed().as_millis() as u64;
                match chunk? {
                    Some(bytes) => {
                        for event in receiver.push_bytes(&bytes, now) {
                            log_event(&event);
                        }
                    }
                    None => {
                        log::info!("feed closed, {} vessels tracked", receiver.vessel_count());
                        subsys.request_shutdown();
                        break;
                    }
                }
            }
            _ = ticker.tick() => {
                let now = start.elapsed().as_millis() as u64;
                receiver.tick(now);
                if args.output {
                    if let Some(vessel) = receiver.next_report(now) {
                        telemetry.write(&vessel)?;
                    }
                }
                ticks += 1;
                if ticks % STATS_LOG_TICKS == 0 {
                    log_stats(&receiver);
                }
            }
        }
    }

    log_stats(&receiver);
    Ok(())
}

fn log_event(event: &AisEvent) {
    match event {
        AisEvent::RawSentence { fragment } => {
            log::debug!(
                "raw AIVDM {}/{} id={:?} payload={:?}",
                fragment.num,
                fragment.total,
                fragment.id,
                fragment.payload
            );
        }
        AisEvent::Unsupported { msg_type, payload } => {
            log::debug!("unsupported type {} payload={:?}", msg_type, payload);
        }
        AisEvent::VesselUpdated { vessel } => {
            log::info!(
                "vessel {} {} lat={:?} lon={:?} sog={:?}",
                vessel.mmsi,
                vessel.name.as_deref().unwrap_or("-"),
                vessel.latitude,
                vessel.longitude,
                vessel.sog
            );
        }
        AisEvent::ListFull { mmsi } => {
            log::warn!("vessel list full, dropping sighting of {}", mmsi);
        }
    }
}

fn log_stats(receiver: &AisReceiver) {
    let stats = receiver.stats();
    log::info!(
        "{} vessels; {} sentences, {} framing / {} reassembly / {} decode errors, {} unsupported, {} capacity drops",
        receiver.vessel_count(),
        stats.sentences,
        stats.framing_errors,
        stats.reassembly_errors,
        stats.decode_errors,
        stats.unsupported,
        stats.capacity_drops,
    );
}
