//! The assembled AIS receiver.
//!
//! Composes the sentence decoder, fragment reassembler, message decoder and
//! vessel tracker behind the single entry point a host drives: one byte at a
//! time in, events out. The host owns all I/O; this type owns all state.
//!
//! No failure here propagates as an error. Malformed sentences, corrupted
//! fragments, undecodable payloads and capacity rejections are counted in
//! [`DecoderStats`] and processing resumes cleanly at the next sentence
//! boundary.

use crate::config::{AisConfig, LogPolicy};
use crate::error::PayloadError;
use crate::message;
use crate::reassembly::FragmentReassembler;
use crate::sentence::{AivdmFragment, PayloadBuf, SentenceDecoder};
use crate::tracker::VesselTracker;
use crate::vessel::VesselRecord;

/// Running counters over everything the receiver has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecoderStats {
    /// Valid AIVDM sentences accepted
    pub sentences: u64,
    /// Sentences discarded by the framing layer
    pub framing_errors: u64,
    /// Partial messages dropped during reassembly
    pub reassembly_errors: u64,
    /// Assembled payloads of a supported type that failed to decode
    pub decode_errors: u64,
    /// Assembled payloads of an unsupported message type
    pub unsupported: u64,
    /// Messages merged into the vessel list
    pub vessels_updated: u64,
    /// Sightings dropped because the vessel list was full
    pub capacity_drops: u64,
}

/// Events produced while consuming the byte stream, for the host's
/// logging and telemetry sinks. Fire-and-forget.
#[derive(Debug, Clone, PartialEq)]
pub enum AisEvent {
    /// An accepted AIVDM fragment, raw (emitted under `LogOptions::RAW_ALL`)
    RawSentence { fragment: AivdmFragment },
    /// An assembled payload of a type this decoder doesn't handle
    /// (emitted under `LogOptions::RAW_UNSUPPORTED`)
    Unsupported { msg_type: u8, payload: PayloadBuf },
    /// A vessel record was created or refreshed
    /// (emitted under `LogOptions::DECODED`)
    VesselUpdated { vessel: VesselRecord },
    /// A new identity was sighted but the vessel list is full
    ListFull { mmsi: u32 },
}

/// Byte-stream AIS receiver with a bounded vessel list.
#[derive(Debug)]
pub struct AisReceiver {
    enabled: bool,
    log: LogPolicy,
    sentence: SentenceDecoder,
    reassembler: FragmentReassembler,
    tracker: VesselTracker,
    stats: DecoderStats,
}

impl AisReceiver {
    pub fn new(config: &AisConfig) -> Self {
        AisReceiver {
            enabled: config.enabled,
            log: LogPolicy::from(config.log_options),
            sentence: SentenceDecoder::new(),
            reassembler: FragmentReassembler::new(),
            tracker: VesselTracker::new(
                config.max_vessels,
                config.vessel_timeout_secs,
                config.report_interval_ms,
            ),
            stats: DecoderStats::default(),
        }
    }

    /// Whether the receiver is processing input at all.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Consume one byte from the transport.
    ///
    /// Most calls return no events; a burst arrives when a byte closes a
    /// sentence. `now_ms` is the host's monotonic clock in milliseconds.
    pub fn push_byte(&mut self, byte: u8, now_ms: u64) -> Vec<AisEvent> {
        if !self.enabled {
            return Vec::new();
        }

        let fragment = match self.sentence.put(byte) {
            Ok(Some(fragment)) => fragment,
            Ok(None) => return Vec::new(),
            Err(_) => {
                self.stats.framing_errors += 1;
                return Vec::new();
            }
        };
        self.stats.sentences += 1;

        let mut events = Vec::new();
        if self.log.raw_all {
            events.push(AisEvent::RawSentence {
                fragment: fragment.clone(),
            });
        }

        let assembled = match self.reassembler.accept(fragment) {
            Ok(Some(assembled)) => assembled,
            Ok(None) => return events,
            Err(_) => {
                self.stats.reassembly_errors += 1;
                return events;
            }
        };

        match message::decode(assembled.payload.as_bytes(), assembled.fill_bits) {
            Ok(msg) => match self.tracker.apply(&msg, now_ms) {
                Ok(slot) => {
                    self.stats.vessels_updated += 1;
                    if self.log.decoded {
                        if let Some(vessel) = self.tracker.get(slot) {
                            events.push(AisEvent::VesselUpdated {
                                vessel: vessel.clone(),
                            });
                        }
                    }
                }
                Err(_) => {
                    self.stats.capacity_drops += 1;
                    events.push(AisEvent::ListFull { mmsi: msg.mmsi() });
                }
            },
            Err(PayloadError::UnsupportedType(msg_type)) => {
                self.stats.unsupported += 1;
                if self.log.raw_unsupported {
                    events.push(AisEvent::Unsupported {
                        msg_type,
                        payload: assembled.payload,
                    });
                }
            }
            Err(_) => {
                self.stats.decode_errors += 1;
            }
        }
        events
    }

    /// Consume a run of bytes; convenience over [`AisReceiver::push_byte`].
    pub fn push_bytes(&mut self, bytes: &[u8], now_ms: u64) -> Vec<AisEvent> {
        let mut events = Vec::new();
        for &byte in bytes {
            events.append(&mut self.push_byte(byte, now_ms));
        }
        events
    }

    /// Evict timed-out vessels. Call at a fixed external cadence.
    pub fn tick(&mut self, now_ms: u64) {
        if self.enabled {
            self.tracker.tick(now_ms);
        }
    }

    /// Next vessel due on the telemetry link, round-robin and rate-limited.
    pub fn next_report(&mut self, now_ms: u64) -> Option<VesselRecord> {
        if !self.enabled {
            return None;
        }
        self.tracker.next_report(now_ms)
    }

    /// Live vessel records.
    pub fn vessels(&self) -> impl Iterator<Item = &VesselRecord> {
        self.tracker.vessels()
    }

    /// Number of vessels currently tracked.
    pub fn vessel_count(&self) -> usize {
        self.tracker.len()
    }

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogOptions;

    const FIXTURE: &str = "!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5C\r\n";

    // Real two-fragment type 5 message (static & voyage data)
    const TYPE5_PART1: &str =
        "!AIVDM,2,1,1,A,55?MbV02;H;s<HtKR20EHE:0@T4@Dn2222222216L961O5Gf0NSQEp6ClRp8,0*1C\r\n";
    const TYPE5_PART2: &str = "!AIVDM,2,2,1,A,88888888880,2*25\r\n";

    fn receiver_with(options: LogOptions) -> AisReceiver {
        AisReceiver::new(&AisConfig {
            log_options: options,
            ..AisConfig::default()
        })
    }

    #[test]
    fn test_end_to_end_position_report() {
        let mut receiver = receiver_with(LogOptions::DECODED);
        let events = receiver.push_bytes(FIXTURE.as_bytes(), 1000);

        assert_eq!(events.len(), 1);
        let vessel = match &events[0] {
            AisEvent::VesselUpdated { vessel } => vessel,
            other => panic!("expected vessel update, got {:?}", other),
        };
        assert_eq!(vessel.mmsi, 366053209);
        assert!((vessel.latitude.unwrap() - 37.802118).abs() < 1e-4);
        assert!((vessel.longitude.unwrap() - -122.341618).abs() < 1e-4);
        assert_eq!(receiver.vessel_count(), 1);
        assert_eq!(receiver.stats().sentences, 1);
        assert_eq!(receiver.stats().vessels_updated, 1);
    }

    #[test]
    fn test_multi_fragment_static_data() {
        let mut receiver = receiver_with(LogOptions::empty());
        assert!(receiver.push_bytes(TYPE5_PART1.as_bytes(), 0).is_empty());
        receiver.push_bytes(TYPE5_PART2.as_bytes(), 0);

        assert_eq!(receiver.vessel_count(), 1);
        let vessel = receiver.vessels().next().unwrap();
        assert!(vessel.name.is_some());
        assert_eq!(receiver.stats().sentences, 2);
        assert_eq!(receiver.stats().vessels_updated, 1);
    }

    #[test]
    fn test_disabled_receiver_is_inert() {
        let mut receiver = AisReceiver::new(&AisConfig {
            enabled: false,
            ..AisConfig::default()
        });
        assert!(receiver.push_bytes(FIXTURE.as_bytes(), 0).is_empty());
        assert_eq!(receiver.vessel_count(), 0);
        assert_eq!(receiver.stats().sentences, 0);
        assert!(receiver.next_report(0).is_none());
    }

    #[test]
    fn test_raw_logging_events() {
        let mut receiver = receiver_with(LogOptions::RAW_ALL);
        let events = receiver.push_bytes(FIXTURE.as_bytes(), 0);
        assert!(matches!(events[0], AisEvent::RawSentence { .. }));
    }

    #[test]
    fn test_unsupported_type_event() {
        // Type 18 (class B position report), single fragment
        let body = "AIVDM,1,1,,B,B5NJ;PP005l4ot5Isbl03wsUkP06,0";
        let sentence = format!(
            "!{}*{:02X}\r\n",
            body,
            crate::sentence::nmea_checksum(body.as_bytes())
        );

        let mut receiver = receiver_with(LogOptions::RAW_UNSUPPORTED);
        let events = receiver.push_bytes(sentence.as_bytes(), 0);
        assert_eq!(events.len(), 1);
        match &events[0] {
            AisEvent::Unsupported { msg_type, .. } => assert_eq!(*msg_type, 18),
            other => panic!("expected unsupported event, got {:?}", other),
        }
        assert_eq!(receiver.stats().unsupported, 1);
        assert_eq!(receiver.vessel_count(), 0);
    }

    #[test]
    fn test_framing_error_counted_and_recovered() {
        let corrupted = FIXTURE.replace("5C", "00");
        let mut receiver = receiver_with(LogOptions::empty());
        receiver.push_bytes(corrupted.as_bytes(), 0);
        assert_eq!(receiver.stats().framing_errors, 1);

        // Next sentence decodes fine
        receiver.push_bytes(FIXTURE.as_bytes(), 0);
        assert_eq!(receiver.stats().sentences, 1);
        assert_eq!(receiver.vessel_count(), 1);
    }

    #[test]
    fn test_list_full_event() {
        let mut receiver = AisReceiver::new(&AisConfig {
            max_vessels: 0,
            ..AisConfig::default()
        });
        let events = receiver.push_bytes(FIXTURE.as_bytes(), 0);
        assert_eq!(
            events,
            vec![AisEvent::ListFull { mmsi: 366053209 }]
        );
        assert_eq!(receiver.stats().capacity_drops, 1);
    }

    #[test]
    fn test_report_round_trip() {
        let mut receiver = receiver_with(LogOptions::empty());
        receiver.push_bytes(FIXTURE.as_bytes(), 0);

        let report = receiver.next_report(1000).expect("one vessel due");
        assert_eq!(report.mmsi, 366053209);
        // Rate limited until the report interval elapses
        assert!(receiver.next_report(2000).is_none());
        assert!(receiver.next_report(7000).is_some());
    }
}
