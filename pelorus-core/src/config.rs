//! Receiver configuration.
//!
//! All values arrive from an external parameter store (CLI, config file,
//! host firmware parameters) as plain data; nothing here is mutated after
//! construction.

use bitflags::bitflags;

bitflags! {
    /// Logging-behavior bitmask as stored by the host's parameter system.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LogOptions: u8 {
        /// Log the raw armored sentence for every accepted fragment
        const RAW_ALL = 1 << 0;
        /// Log the raw payload of message types this decoder doesn't handle
        const RAW_UNSUPPORTED = 1 << 1;
        /// Log every decoded vessel record update
        const DECODED = 1 << 2;
    }
}

/// The logging bitmask resolved once into named capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogPolicy {
    pub raw_all: bool,
    pub raw_unsupported: bool,
    pub decoded: bool,
}

impl From<LogOptions> for LogPolicy {
    fn from(options: LogOptions) -> Self {
        LogPolicy {
            raw_all: options.contains(LogOptions::RAW_ALL),
            raw_unsupported: options.contains(LogOptions::RAW_UNSUPPORTED),
            decoded: options.contains(LogOptions::DECODED),
        }
    }
}

/// Receiver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AisConfig {
    /// Master enable; a disabled receiver consumes bytes without effect
    pub enabled: bool,
    /// Maximum number of vessels tracked at once
    pub max_vessels: usize,
    /// Seconds without an update before a vessel is dropped from the list
    pub vessel_timeout_secs: u32,
    /// Minimum interval between two telemetry reports of the same vessel
    pub report_interval_ms: u64,
    /// Logging-behavior bitmask
    pub log_options: LogOptions,
}

impl Default for AisConfig {
    fn default() -> Self {
        AisConfig {
            enabled: true,
            max_vessels: 25,
            vessel_timeout_secs: 600,
            report_interval_ms: 5000,
            log_options: LogOptions::empty(),
        }
    }
}
