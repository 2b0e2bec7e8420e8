//! JSON-lines telemetry output.
//!
//! One decoded vessel record per line on stdout, stamped with the UTC wall
//! clock at emission. Rate limiting happens upstream in the tracker's
//! round-robin selection; this writer is fire-and-forget.

use std::io::Write;

use chrono::{DateTime, Utc};
use pelorus_core::VesselRecord;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VesselReport<'a> {
    time: DateTime<Utc>,
    #[serde(flatten)]
    vessel: &'a VesselRecord,
}

pub struct TelemetryWriter {
    out: std::io::Stdout,
}

impl TelemetryWriter {
    pub fn new() -> Self {
        TelemetryWriter {
            out: std::io::stdout(),
        }
    }

    pub fn write(&mut self, vessel: &VesselRecord) -> anyhow::Result<()> {
        let report = VesselReport {
            time: Utc::now(),
            vessel,
        };
        let mut handle = self.out.lock();
        serde_json::to_writer(&mut handle, &report)?;
        handle.write_all(b"\n")?;
        handle.flush()?;
        Ok(())
    }
}
