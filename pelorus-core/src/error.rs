//! Error types for AIS decoding

use thiserror::Error;

/// Errors in the character-level NMEA framing layer.
///
/// A framing error invalidates the current sentence only; the decoder keeps
/// consuming bytes and resynchronizes on the next `'$'`/`'!'` start marker.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FramingError {
    /// Computed XOR checksum doesn't match the sentence suffix
    #[error("Checksum mismatch: computed {computed:02X}, sentence says {received:02X}")]
    ChecksumMismatch { computed: u8, received: u8 },

    /// Checksum suffix contains a non-hex character
    #[error("Invalid checksum digit: {0:#04X}")]
    ChecksumNotHex(u8),

    /// A term exceeded the fixed term buffer
    #[error("Term {index} too long (limit {limit} characters)")]
    TermOverflow { index: u8, limit: usize },

    /// A term failed its per-term validation (bad integer, out-of-range count)
    #[error("Invalid term {index}")]
    InvalidTerm { index: u8 },
}

/// Errors while correlating multi-fragment messages.
///
/// These drop the affected partial message only; unrelated in-flight
/// messages are unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReassemblyError {
    /// Multi-fragment sentence without a sequential message id
    #[error("Multi-fragment message without sequential id")]
    MissingId,

    /// Fragment arrived out of sequence; the partial is treated as corrupted
    #[error("Fragment {got} for message {id} out of sequence (expected {expected})")]
    OutOfOrder { id: u8, expected: u8, got: u8 },

    /// Concatenated payload exceeded the assembly buffer
    #[error("Assembled payload for message {id} too long")]
    MessageTooLong { id: u8 },
}

/// Errors while decoding an armored payload into fields.
///
/// These abandon the single message being decoded; the vessel list and any
/// buffered partial messages are unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PayloadError {
    /// Character outside the two valid armor bands
    #[error("Invalid armor character: {0:#04X}")]
    InvalidArmor(u8),

    /// Requested bit range extends past the payload
    #[error("Bit range [{low},{high}) out of range: payload has {available} bits")]
    OutOfRange {
        low: usize,
        high: usize,
        available: usize,
    },

    /// Payload too short for the dispatched message type
    #[error("Message type {msg_type} too short: expected {expected} bits, got {actual}")]
    TooShort {
        msg_type: u8,
        expected: usize,
        actual: usize,
    },

    /// Message type this decoder does not handle
    #[error("Unsupported message type: {0}")]
    UnsupportedType(u8),
}

/// The vessel list is full and the sighting was for a new identity.
///
/// Existing vessels are never evicted to make room; the sighting is dropped.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Vessel list full")]
pub struct CapacityError;
