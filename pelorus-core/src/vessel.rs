//! Tracked vessel state.
//!
//! A [`VesselRecord`] accumulates fields incrementally as different message
//! types arrive for the same MMSI: position reports refresh kinematics,
//! base-station reports contribute position only, static & voyage data fills
//! in identity and voyage metadata. Wire sentinels become `None` here and
//! raw units are scaled to degrees/knots.

use serde::{Deserialize, Serialize};

use crate::message::{
    BaseStationReport, PositionReport, StaticAndVoyageData, COG_NOT_AVAILABLE,
    HEADING_NOT_AVAILABLE, LAT_NOT_AVAILABLE, LON_NOT_AVAILABLE, ROT_NOT_AVAILABLE,
    SOG_NOT_AVAILABLE,
};

/// Wire coordinates are 1/10000 minute = 1/600000 degree.
const COORD_SCALE: f64 = 600_000.0;

/// One tracked vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VesselRecord {
    /// Maritime Mobile Service Identity
    pub mmsi: u32,
    /// Navigational status code; 15 = undefined
    pub nav_status: u8,
    /// Latitude in degrees, north positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    /// Longitude in degrees, east positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    /// Speed over ground in knots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sog: Option<f32>,
    /// Course over ground in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cog: Option<f32>,
    /// True heading in degrees
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<u16>,
    /// Rate of turn in degrees per minute, starboard positive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_of_turn: Option<f32>,
    pub position_accuracy: bool,
    pub raim: bool,
    /// UTC second of the last position fix; 60 = not available
    pub utc_second: u8,
    /// Vessel name from static data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_sign: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Vessel/cargo type code; 0 = not available
    pub ship_type: u8,
    /// Dimensions from the position reference point, metres
    pub dim_bow: u16,
    pub dim_stern: u16,
    pub dim_port: u8,
    pub dim_starboard: u8,
    /// Static draught in metres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draught: Option<f32>,
    /// ETA, zeros where not available
    pub eta_month: u8,
    pub eta_day: u8,
    pub eta_hour: u8,
    pub eta_minute: u8,
    /// Last time any message refreshed this record (host milliseconds)
    pub last_update_ms: u64,
    /// Last time this record went out over the telemetry link; 0 = never
    pub last_report_ms: u64,
}

impl VesselRecord {
    /// Create an empty record for a newly sighted identity.
    pub fn new(mmsi: u32, now_ms: u64) -> Self {
        VesselRecord {
            mmsi,
            nav_status: 15,
            latitude: None,
            longitude: None,
            sog: None,
            cog: None,
            heading: None,
            rate_of_turn: None,
            position_accuracy: false,
            raim: false,
            utc_second: 60,
            name: None,
            call_sign: None,
            destination: None,
            ship_type: 0,
            dim_bow: 0,
            dim_stern: 0,
            dim_port: 0,
            dim_starboard: 0,
            draught: None,
            eta_month: 0,
            eta_day: 0,
            eta_hour: 0,
            eta_minute: 0,
            last_update_ms: now_ms,
            last_report_ms: 0,
        }
    }

    /// Merge a position report (types 1/2/3) into this record.
    pub fn update_position(&mut self, report: &PositionReport, now_ms: u64) {
        self.nav_status = report.nav_status;
        self.latitude = scale_latitude(report.latitude);
        self.longitude = scale_longitude(report.longitude);
        self.sog = scale_sog(report.sog);
        self.cog = scale_cog(report.cog);
        self.heading = scale_heading(report.heading);
        self.rate_of_turn = scale_rate_of_turn(report.rate_of_turn);
        self.position_accuracy = report.position_accuracy;
        self.raim = report.raim;
        self.utc_second = report.utc_second;
        self.last_update_ms = now_ms;
    }

    /// Merge a base station report (type 4): a trackable entity with
    /// position but no voyage metadata.
    pub fn update_base_station(&mut self, report: &BaseStationReport, now_ms: u64) {
        self.latitude = scale_latitude(report.latitude);
        self.longitude = scale_longitude(report.longitude);
        self.position_accuracy = report.position_accuracy;
        self.utc_second = if report.second < 60 { report.second } else { 60 };
        self.last_update_ms = now_ms;
    }

    /// Merge static & voyage data (type 5).
    pub fn update_static_voyage(&mut self, data: &StaticAndVoyageData, now_ms: u64) {
        if !data.name.is_empty() {
            self.name = Some(data.name.clone());
        }
        if !data.call_sign.is_empty() {
            self.call_sign = Some(data.call_sign.clone());
        }
        if !data.destination.is_empty() {
            self.destination = Some(data.destination.clone());
        }
        self.ship_type = data.ship_type;
        self.dim_bow = data.dim_bow;
        self.dim_stern = data.dim_stern;
        self.dim_port = data.dim_port;
        self.dim_starboard = data.dim_starboard;
        if data.draught != 0 {
            self.draught = Some(data.draught as f32 / 10.0);
        }
        self.eta_month = data.eta_month;
        self.eta_day = data.eta_day;
        self.eta_hour = data.eta_hour;
        self.eta_minute = data.eta_minute;
        self.last_update_ms = now_ms;
    }
}

fn scale_latitude(raw: i32) -> Option<f64> {
    (raw != LAT_NOT_AVAILABLE).then(|| raw as f64 / COORD_SCALE)
}

fn scale_longitude(raw: i32) -> Option<f64> {
    (raw != LON_NOT_AVAILABLE).then(|| raw as f64 / COORD_SCALE)
}

fn scale_sog(raw: u16) -> Option<f32> {
    (raw != SOG_NOT_AVAILABLE).then(|| raw as f32 / 10.0)
}

fn scale_cog(raw: u16) -> Option<f32> {
    (raw != COG_NOT_AVAILABLE).then(|| raw as f32 / 10.0)
}

fn scale_heading(raw: u16) -> Option<u16> {
    (raw != HEADING_NOT_AVAILABLE).then_some(raw)
}

/// The wire field is `4.733 * sqrt(turn rate)` signed; invert it.
/// ±127 means "turning, no turn indicator"; -128 means not available.
fn scale_rate_of_turn(raw: i32) -> Option<f32> {
    if raw == ROT_NOT_AVAILABLE {
        return None;
    }
    let magnitude = (raw.unsigned_abs() as f32 / 4.733).powi(2);
    Some(if raw < 0 { -magnitude } else { magnitude })
}
