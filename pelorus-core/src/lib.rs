//! # Pelorus Core
//!
//! Platform-independent AIS (Automatic Identification System) decoding and
//! vessel tracking.
//!
//! This crate contains pure parsing and protocol logic with **zero I/O
//! dependencies**: NMEA 0183 `!AIVDM` sentences go in one byte at a time,
//! decoded vessel records come out. All time is injected by the host as
//! milliseconds, so the same logic runs under a tokio server, a test
//! harness, or an embedded scheduler.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  pelorus-core (platform-independent, no tokio/async deps)    │
//! │  bytes ─► sentence    (NMEA framing + checksum)              │
//! │        ─► reassembly  (multi-fragment AIVDM FIFO)            │
//! │        ─► message     (bit-field decode, types 1-5)          │
//! │        ─► tracker     (bounded vessel list, round-robin)     │
//! │                                                              │
//! │  AisReceiver = the composed pipeline + AisEvent stream       │
//! └──────────────────────────────────────────────────────────────┘
//!                          ▲
//!             ┌────────────┴────────────┐
//!             │  pelorus-server         │
//!             │  (stdin / TCP / replay) │
//!             └─────────────────────────┘
//! ```
//!
//! ## Key Modules
//!
//! - [`sentence`] - character-driven NMEA sentence decoder
//! - [`reassembly`] - multi-fragment message reassembly
//! - [`sixbit`] - payload armor and bit-field extraction
//! - [`message`] - per-type field decoders (position, base station, voyage)
//! - [`tracker`] - bounded, time-evicted vessel list
//! - [`receiver`] - the composed [`AisReceiver`] entry point
//!
//! ## Example
//!
//! ```rust
//! use pelorus_core::{AisConfig, AisReceiver};
//!
//! let mut receiver = AisReceiver::new(&AisConfig::default());
//! let sentence = "!AIVDM,1,1,,B,15M67FC000G?ufbE`FepT@3n00Sa,0*5C\r\n";
//! receiver.push_bytes(sentence.as_bytes(), 0);
//!
//! let vessel = receiver.vessels().next().unwrap();
//! assert_eq!(vessel.mmsi, 366053209);
//! ```

pub mod config;
pub mod error;
pub mod message;
pub mod reassembly;
pub mod receiver;
pub mod sentence;
pub mod sixbit;
pub mod tracker;
pub mod vessel;

// Re-export commonly used types
pub use config::{AisConfig, LogOptions, LogPolicy};
pub use error::{CapacityError, FramingError, PayloadError, ReassemblyError};
pub use message::AisMessage;
pub use receiver::{AisEvent, AisReceiver, DecoderStats};
pub use sentence::{AivdmFragment, SentenceDecoder};
pub use tracker::VesselTracker;
pub use vessel::VesselRecord;
