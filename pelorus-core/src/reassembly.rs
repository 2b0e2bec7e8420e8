//! Multi-fragment AIVDM message reassembly.
//!
//! Long AIS messages (static & voyage data in particular) span several NMEA
//! sentences. Fragments of one logical message share a sequential message
//! id; this module buffers in-flight partial messages in a small FIFO and
//! emits the concatenated payload once all fragments have arrived in order.

use crate::error::ReassemblyError;
use crate::sentence::{AivdmFragment, PayloadBuf};

/// Number of in-flight partial messages retained.
///
/// When a new multi-part message begins and the buffer is full, the oldest
/// unresolved partial is evicted. A sufficiently slow or interrupted
/// multi-part message is therefore silently dropped; that bounds memory and
/// is an accepted trade-off.
pub const PARTIAL_BUFFER_SIZE: usize = 10;

/// A fully reassembled armored payload ready for field decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPayload {
    /// Concatenated armored text of all fragments
    pub payload: PayloadBuf,
    /// Fill bits of the final fragment; they apply only to the last 6-bit
    /// group of the whole message
    pub fill_bits: u8,
}

#[derive(Debug, Clone)]
struct Partial {
    id: u8,
    total: u8,
    received: u8,
    payload: PayloadBuf,
    /// Monotone arrival stamp; the smallest stamp is the FIFO eviction victim
    arrival: u64,
}

/// Fixed-capacity FIFO of in-flight multi-part messages.
#[derive(Debug, Default)]
pub struct FragmentReassembler {
    slots: [Option<Partial>; PARTIAL_BUFFER_SIZE],
    next_arrival: u64,
}

impl FragmentReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept one fragment; returns the assembled payload when it completes
    /// a logical message.
    ///
    /// Fragments of different in-flight messages are tracked independently
    /// by id. An out-of-sequence fragment discards its partial as corrupted;
    /// unrelated partials are unaffected.
    pub fn accept(
        &mut self,
        fragment: AivdmFragment,
    ) -> Result<Option<AssembledPayload>, ReassemblyError> {
        if fragment.total == 1 {
            // Single-fragment message; nothing to buffer
            return Ok(Some(AssembledPayload {
                payload: fragment.payload,
                fill_bits: fragment.fill_bits,
            }));
        }

        let id = fragment.id.ok_or(ReassemblyError::MissingId)?;

        if let Some(index) = self.find(id) {
            let partial = self.slots[index].as_mut().unwrap();
            let expected = partial.received + 1;
            if fragment.num != expected || fragment.total != partial.total {
                // Corrupted sequence; drop the whole partial
                self.slots[index] = None;
                return Err(ReassemblyError::OutOfOrder {
                    id,
                    expected,
                    got: fragment.num,
                });
            }
            if partial
                .payload
                .extend_from_slice(fragment.payload.as_bytes())
                .is_err()
            {
                self.slots[index] = None;
                return Err(ReassemblyError::MessageTooLong { id });
            }
            partial.received += 1;
            if partial.received == partial.total {
                let done = self.slots[index].take().unwrap();
                return Ok(Some(AssembledPayload {
                    payload: done.payload,
                    fill_bits: fragment.fill_bits,
                }));
            }
            return Ok(None);
        }

        // No partial with this id. Only the first fragment may open one; a
        // later fragment arriving first can never complete contiguously.
        if fragment.num != 1 {
            return Err(ReassemblyError::OutOfOrder {
                id,
                expected: 1,
                got: fragment.num,
            });
        }

        let slot = self.allocate();
        self.slots[slot] = Some(Partial {
            id,
            total: fragment.total,
            received: 1,
            payload: fragment.payload,
            arrival: self.next_arrival,
        });
        self.next_arrival += 1;
        Ok(None)
    }

    /// Number of partial messages currently buffered.
    pub fn in_flight(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    fn find(&self, id: u8) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|p| p.id == id))
    }

    /// Pick a free slot, evicting the oldest partial when the buffer is full.
    fn allocate(&mut self) -> usize {
        if let Some(free) = self.slots.iter().position(|s| s.is_none()) {
            return free;
        }
        let oldest = self
            .slots
            .iter()
            .enumerate()
            .min_by_key(|(_, s)| s.as_ref().map(|p| p.arrival).unwrap_or(0))
            .map(|(i, _)| i)
            .unwrap_or(0);
        self.slots[oldest] = None;
        oldest
    }
}
