//! Bounded vessel list lifecycle.
//!
//! Lookup-or-allocate by MMSI, slot reuse, time-based eviction and
//! round-robin selection for outbound reporting. Physically the list is a
//! growable arena of fixed slots capped at the configured maximum; slot
//! indices are stable for the lifetime of a record.

use crate::error::CapacityError;
use crate::message::AisMessage;
use crate::vessel::VesselRecord;

/// Merge tolerance for position-hint deduplication, degrees in both axes
/// (about 110 m of latitude). Applies only to unidentified records
/// (MMSI 0); see `get_or_create`.
pub const POSITION_MERGE_TOLERANCE_DEG: f64 = 0.001;

/// Bounded, time-evicted list of tracked vessels.
#[derive(Debug)]
pub struct VesselTracker {
    slots: Vec<Option<VesselRecord>>,
    max_vessels: usize,
    timeout_ms: u64,
    report_interval_ms: u64,
    /// Next slot to consider for outbound reporting
    report_cursor: usize,
}

impl VesselTracker {
    pub fn new(max_vessels: usize, vessel_timeout_secs: u32, report_interval_ms: u64) -> Self {
        VesselTracker {
            slots: Vec::new(),
            max_vessels,
            timeout_ms: vessel_timeout_secs as u64 * 1000,
            report_interval_ms,
            report_cursor: 0,
        }
    }

    /// Find the slot for `mmsi`, allocating one if the list has capacity.
    ///
    /// An unmatched sighting with a position hint may instead merge into an
    /// existing *unidentified* record (MMSI 0) within
    /// [`POSITION_MERGE_TOLERANCE_DEG`], adopting the new identity; this is
    /// best-effort deduplication of transponders that first appeared without
    /// a programmed MMSI. A full list never evicts a live vessel to make
    /// room; the sighting is dropped instead.
    pub fn get_or_create(
        &mut self,
        mmsi: u32,
        hint: Option<(f64, f64)>,
        now_ms: u64,
    ) -> Result<usize, CapacityError> {
        if let Some(index) = self.find(mmsi) {
            return Ok(index);
        }

        if let Some((lat, lon)) = hint {
            if let Some(index) = self.find_unidentified_near(lat, lon) {
                if let Some(record) = self.slots[index].as_mut() {
                    record.mmsi = mmsi;
                }
                return Ok(index);
            }
        }

        // Reuse a slot vacated by eviction before growing
        if let Some(free) = self.slots.iter().position(|s| s.is_none()) {
            self.slots[free] = Some(VesselRecord::new(mmsi, now_ms));
            return Ok(free);
        }
        if self.slots.len() < self.max_vessels {
            self.slots.push(Some(VesselRecord::new(mmsi, now_ms)));
            return Ok(self.slots.len() - 1);
        }
        Err(CapacityError)
    }

    /// Merge a decoded message into the list.
    ///
    /// Returns the slot index that was created or updated.
    pub fn apply(&mut self, message: &AisMessage, now_ms: u64) -> Result<usize, CapacityError> {
        match message {
            AisMessage::PositionReport(report) => {
                let hint = position_hint(report.latitude, report.longitude);
                let index = self.get_or_create(report.mmsi, hint, now_ms)?;
                if let Some(record) = self.slots[index].as_mut() {
                    record.update_position(report, now_ms);
                }
                Ok(index)
            }
            AisMessage::BaseStationReport(report) => {
                let hint = position_hint(report.latitude, report.longitude);
                let index = self.get_or_create(report.mmsi, hint, now_ms)?;
                if let Some(record) = self.slots[index].as_mut() {
                    record.update_base_station(report, now_ms);
                }
                Ok(index)
            }
            AisMessage::StaticAndVoyageData(data) => {
                let index = self.get_or_create(data.mmsi, None, now_ms)?;
                if let Some(record) = self.slots[index].as_mut() {
                    record.update_static_voyage(data, now_ms);
                }
                Ok(index)
            }
        }
    }

    /// Drop every record whose age exceeds the configured timeout.
    ///
    /// Expected to be called at a fixed external cadence.
    pub fn tick(&mut self, now_ms: u64) {
        for slot in self.slots.iter_mut() {
            if let Some(record) = slot {
                if now_ms.saturating_sub(record.last_update_ms) > self.timeout_ms {
                    *slot = None;
                }
            }
        }
    }

    /// Round-robin selection of the next vessel to send over the telemetry
    /// link, skipping records reported within the minimum report interval.
    ///
    /// Advances and wraps the selection cursor; stamps `last_report_ms` on
    /// the returned record.
    pub fn next_report(&mut self, now_ms: u64) -> Option<VesselRecord> {
        let len = self.slots.len();
        for offset in 0..len {
            let index = (self.report_cursor + offset) % len;
            if let Some(record) = self.slots[index].as_mut() {
                let due = record.last_report_ms == 0
                    || now_ms.saturating_sub(record.last_report_ms) >= self.report_interval_ms;
                if due {
                    record.last_report_ms = now_ms;
                    self.report_cursor = (index + 1) % len;
                    return Some(record.clone());
                }
            }
        }
        None
    }

    /// Access a record by slot index.
    pub fn get(&self, index: usize) -> Option<&VesselRecord> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over live records.
    pub fn vessels(&self) -> impl Iterator<Item = &VesselRecord> {
        self.slots.iter().filter_map(|s| s.as_ref())
    }

    fn find(&self, mmsi: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|r| r.mmsi == mmsi))
    }

    fn find_unidentified_near(&self, lat: f64, lon: f64) -> Option<usize> {
        // Only records that never reported an identity are candidates;
        // two distinct transponders can legitimately sit this close.
        self.slots.iter().position(|s| {
            s.as_ref().is_some_and(|r| {
                r.mmsi == 0
                    && r.latitude
                        .is_some_and(|v| (v - lat).abs() <= POSITION_MERGE_TOLERANCE_DEG)
                    && r.longitude
                        .is_some_and(|v| (v - lon).abs() <= POSITION_MERGE_TOLERANCE_DEG)
            })
        })
    }
}

/// Convert raw wire coordinates to a degree hint, unless either axis is the
/// "not available" sentinel.
fn position_hint(lat_raw: i32, lon_raw: i32) -> Option<(f64, f64)> {
    use crate::message::{LAT_NOT_AVAILABLE, LON_NOT_AVAILABLE};
    if lat_raw == LAT_NOT_AVAILABLE || lon_raw == LON_NOT_AVAILABLE {
        return None;
    }
    Some((lat_raw as f64 / 600_000.0, lon_raw as f64 / 600_000.0))
}
