//! AIS message field decoders.
//!
//! Dispatches on the 6-bit message type at the head of an assembled payload
//! and extracts the per-type bit fields (offsets per ITU-R M.1371). Values
//! are kept in their raw wire units here, sentinels included; scaling to
//! degrees/knots happens when a message is merged into a vessel record.

use crate::error::PayloadError;
use crate::sixbit::{get_bits, get_bits_signed, get_string};

/// Longitude sentinel: 181 degrees in 1/10000 minute, "not available".
pub const LON_NOT_AVAILABLE: i32 = 108_600_000;
/// Latitude sentinel: 91 degrees in 1/10000 minute, "not available".
pub const LAT_NOT_AVAILABLE: i32 = 54_600_000;
/// Speed over ground sentinel (tenths of knots).
pub const SOG_NOT_AVAILABLE: u16 = 1023;
/// Course over ground sentinel (tenths of degrees).
pub const COG_NOT_AVAILABLE: u16 = 3600;
/// True heading sentinel (degrees).
pub const HEADING_NOT_AVAILABLE: u16 = 511;
/// Rate of turn sentinel (raw 8-bit field).
pub const ROT_NOT_AVAILABLE: i32 = -128;

/// Common position report, message types 1, 2 and 3.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    /// Which of the three position-report types carried this (1, 2 or 3)
    pub msg_type: u8,
    pub mmsi: u32,
    /// Navigational status code (0 = under way using engine, 15 = undefined)
    pub nav_status: u8,
    /// Raw rate-of-turn field, signed 8 bits; -128 = not available
    pub rate_of_turn: i32,
    /// Speed over ground in tenths of knots; 1023 = not available
    pub sog: u16,
    pub position_accuracy: bool,
    /// Longitude in 1/10000 minute, east positive
    pub longitude: i32,
    /// Latitude in 1/10000 minute, north positive
    pub latitude: i32,
    /// Course over ground in tenths of degrees; 3600 = not available
    pub cog: u16,
    /// True heading in degrees; 511 = not available
    pub heading: u16,
    /// UTC second of the position fix; 60 = not available
    pub utc_second: u8,
    pub raim: bool,
    /// Communication state (SOTDMA/ITDMA sync bits)
    pub radio_status: u32,
}

/// Base station report, message type 4.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseStationReport {
    pub mmsi: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub position_accuracy: bool,
    /// Longitude in 1/10000 minute, east positive
    pub longitude: i32,
    /// Latitude in 1/10000 minute, north positive
    pub latitude: i32,
}

/// Static and voyage related data, message type 5.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticAndVoyageData {
    pub mmsi: u32,
    pub call_sign: String,
    pub name: String,
    /// Vessel/cargo type code
    pub ship_type: u8,
    /// Distance from reference point to bow, metres
    pub dim_bow: u16,
    /// Distance from reference point to stern, metres
    pub dim_stern: u16,
    /// Distance from reference point to port side, metres
    pub dim_port: u8,
    /// Distance from reference point to starboard side, metres
    pub dim_starboard: u8,
    /// ETA, zeros where not available
    pub eta_month: u8,
    pub eta_day: u8,
    pub eta_hour: u8,
    pub eta_minute: u8,
    /// Maximum present static draught in tenths of metres
    pub draught: u8,
    pub destination: String,
}

/// One decoded AIS message of a supported type.
#[derive(Debug, Clone, PartialEq)]
pub enum AisMessage {
    PositionReport(PositionReport),
    BaseStationReport(BaseStationReport),
    StaticAndVoyageData(StaticAndVoyageData),
}

impl AisMessage {
    /// Maritime Mobile Service Identity of the subject vessel/station.
    pub fn mmsi(&self) -> u32 {
        match self {
            AisMessage::PositionReport(r) => r.mmsi,
            AisMessage::BaseStationReport(r) => r.mmsi,
            AisMessage::StaticAndVoyageData(r) => r.mmsi,
        }
    }
}

/// Decode an assembled armored payload.
///
/// `fill_bits` is the padding count of the final 6-bit group; the effective
/// message length is `6 * chars - fill_bits`. A failure here abandons this
/// single message only.
pub fn decode(payload: &[u8], fill_bits: u8) -> Result<AisMessage, PayloadError> {
    let bit_len = (payload.len() * 6).saturating_sub(fill_bits as usize);
    if bit_len < 6 {
        return Err(PayloadError::TooShort {
            msg_type: 0,
            expected: 6,
            actual: bit_len,
        });
    }
    let msg_type = get_bits(payload, 0, 6)? as u8;
    match msg_type {
        1..=3 => decode_position_report(payload, bit_len, msg_type),
        4 => decode_base_station_report(payload, bit_len),
        5 => decode_static_and_voyage_data(payload, bit_len),
        other => Err(PayloadError::UnsupportedType(other)),
    }
}

const POSITION_REPORT_BITS: usize = 168;
const BASE_STATION_REPORT_BITS: usize = 168;
const STATIC_VOYAGE_BITS: usize = 422;

fn require(msg_type: u8, expected: usize, actual: usize) -> Result<(), PayloadError> {
    if actual < expected {
        Err(PayloadError::TooShort {
            msg_type,
            expected,
            actual,
        })
    } else {
        Ok(())
    }
}

fn decode_position_report(
    payload: &[u8],
    bit_len: usize,
    msg_type: u8,
) -> Result<AisMessage, PayloadError> {
    require(msg_type, POSITION_REPORT_BITS, bit_len)?;
    Ok(AisMessage::PositionReport(PositionReport {
        msg_type,
        mmsi: get_bits(payload, 8, 38)?,
        nav_status: get_bits(payload, 38, 42)? as u8,
        rate_of_turn: get_bits_signed(payload, 42, 50)?,
        sog: get_bits(payload, 50, 60)? as u16,
        position_accuracy: get_bits(payload, 60, 61)? != 0,
        longitude: get_bits_signed(payload, 61, 89)?,
        latitude: get_bits_signed(payload, 89, 116)?,
        cog: get_bits(payload, 116, 128)? as u16,
        heading: get_bits(payload, 128, 137)? as u16,
        utc_second: get_bits(payload, 137, 143)? as u8,
        raim: get_bits(payload, 148, 149)? != 0,
        radio_status: get_bits(payload, 149, 168)?,
    }))
}

fn decode_base_station_report(payload: &[u8], bit_len: usize) -> Result<AisMessage, PayloadError> {
    require(4, BASE_STATION_REPORT_BITS, bit_len)?;
    Ok(AisMessage::BaseStationReport(BaseStationReport {
        mmsi: get_bits(payload, 8, 38)?,
        year: get_bits(payload, 38, 52)? as u16,
        month: get_bits(payload, 52, 56)? as u8,
        day: get_bits(payload, 56, 61)? as u8,
        hour: get_bits(payload, 61, 66)? as u8,
        minute: get_bits(payload, 66, 72)? as u8,
        second: get_bits(payload, 72, 78)? as u8,
        position_accuracy: get_bits(payload, 78, 79)? != 0,
        longitude: get_bits_signed(payload, 79, 107)?,
        latitude: get_bits_signed(payload, 107, 134)?,
    }))
}

fn decode_static_and_voyage_data(
    payload: &[u8],
    bit_len: usize,
) -> Result<AisMessage, PayloadError> {
    require(5, STATIC_VOYAGE_BITS, bit_len)?;
    Ok(AisMessage::StaticAndVoyageData(StaticAndVoyageData {
        mmsi: get_bits(payload, 8, 38)?,
        call_sign: get_string(payload, 70, 112)?,
        name: get_string(payload, 112, 232)?,
        ship_type: get_bits(payload, 232, 240)? as u8,
        dim_bow: get_bits(payload, 240, 249)? as u16,
        dim_stern: get_bits(payload, 249, 258)? as u16,
        dim_port: get_bits(payload, 258, 264)? as u8,
        dim_starboard: get_bits(payload, 264, 270)? as u8,
        eta_month: get_bits(payload, 274, 278)? as u8,
        eta_day: get_bits(payload, 278, 283)? as u8,
        eta_hour: get_bits(payload, 283, 288)? as u8,
        eta_minute: get_bits(payload, 288, 294)? as u8,
        draught: get_bits(payload, 294, 302)? as u8,
        destination: get_string(payload, 302, 422)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const POSITION_FIXTURE: &[u8] = b"15M67FC000G?ufbE`FepT@3n00Sa";

    #[test]
    fn test_decode_position_report() {
        let msg = decode(POSITION_FIXTURE, 0).unwrap();
        let r = match msg {
            AisMessage::PositionReport(r) => r,
            other => panic!("expected position report, got {:?}", other),
        };
        assert_eq!(r.msg_type, 1);
        assert_eq!(r.mmsi, 366053209);
        assert_eq!(r.nav_status, 3);
        assert_eq!(r.rate_of_turn, 0);
        assert_eq!(r.sog, 0);
        assert!(!r.position_accuracy);
        assert_eq!(r.longitude, -73_404_971);
        assert_eq!(r.latitude, 22_681_271);
        assert_eq!(r.cog, 2193);
        assert_eq!(r.heading, 1);
        assert_eq!(r.utc_second, 59);
        assert!(!r.raim);
    }

    #[test]
    fn test_decode_too_short_for_type() {
        // Valid armor, declares type 1, but only 12 characters = 72 bits
        let err = decode(b"15M67FC000G?", 0).unwrap_err();
        assert_eq!(
            err,
            PayloadError::TooShort {
                msg_type: 1,
                expected: 168,
                actual: 72
            }
        );
    }

    #[test]
    fn test_decode_invalid_armor_aborts_message() {
        let mut bad = POSITION_FIXTURE.to_vec();
        bad[10] = b'~';
        assert!(matches!(
            decode(&bad, 0),
            Err(PayloadError::InvalidArmor(b'~'))
        ));
    }

    #[test]
    fn test_unsupported_type_distinguished() {
        // First character 'B' = 18, message type 18 (class B position)
        let mut payload = vec![b'B'];
        payload.extend_from_slice(&[b'0'; 27]);
        assert_eq!(
            decode(&payload, 0).unwrap_err(),
            PayloadError::UnsupportedType(18)
        );
    }

    #[test]
    fn test_fill_bits_reduce_effective_length() {
        // 28 chars = 168 bits exactly; any fill bits make type 1 too short
        assert!(decode(POSITION_FIXTURE, 0).is_ok());
        assert!(matches!(
            decode(POSITION_FIXTURE, 2),
            Err(PayloadError::TooShort { .. })
        ));
    }

    /// Build an armored payload from a bit string (for synthetic frames).
    fn armor(bits: &str) -> Vec<u8> {
        assert_eq!(bits.len() % 6, 0);
        bits.as_bytes()
            .chunks(6)
            .map(|chunk| {
                let v = chunk
                    .iter()
                    .fold(0u8, |acc, b| (acc << 1) | (b - b'0'));
                if v < 40 {
                    v + 48
                } else {
                    v + 56
                }
            })
            .collect()
    }

    fn bitfield(value: u32, width: usize) -> String {
        format!("{:0width$b}", value, width = width)
    }

    #[test]
    fn test_decode_base_station_report() {
        // Synthesize a type 4 frame: station 003669702, 2007-05-14 19:57:39,
        // lon -76.35236, lat 36.883766 (raw units 1/10000 min)
        let mut bits = String::new();
        bits += &bitfield(4, 6); // type
        bits += &bitfield(0, 2); // repeat
        bits += &bitfield(3_669_702, 30); // mmsi
        bits += &bitfield(2007, 14); // year
        bits += &bitfield(5, 4); // month
        bits += &bitfield(14, 5); // day
        bits += &bitfield(19, 5); // hour
        bits += &bitfield(57, 6); // minute
        bits += &bitfield(39, 6); // second
        bits += &bitfield(1, 1); // accuracy
        bits += &bitfield((-45_811_416i32 as u32) & 0x0FFF_FFFF, 28); // lon
        bits += &bitfield(22_130_260 & 0x07FF_FFFF, 27); // lat
        bits += &bitfield(0, 34); // fix type, spare, raim, radio
        assert_eq!(bits.len(), 168);

        let payload = armor(&bits);
        let msg = decode(&payload, 0).unwrap();
        let r = match msg {
            AisMessage::BaseStationReport(r) => r,
            other => panic!("expected base station report, got {:?}", other),
        };
        assert_eq!(r.mmsi, 3_669_702);
        assert_eq!((r.year, r.month, r.day), (2007, 5, 14));
        assert_eq!((r.hour, r.minute, r.second), (19, 57, 39));
        assert!(r.position_accuracy);
        assert_eq!(r.longitude, -45_811_416);
        assert_eq!(r.latitude, 22_130_260);
    }

    #[test]
    fn test_decode_static_and_voyage_data() {
        // Synthesize a type 5 frame for MMSI 351759000, name "EVER DIADEM",
        // call sign "3FOF8", destination "NEW YORK", 6.1 m draught
        fn text(s: &str, chars: usize) -> String {
            let mut bits = String::new();
            for i in 0..chars {
                let c = s.as_bytes().get(i).copied().unwrap_or(b'@');
                let v = if c >= 64 { c - 64 } else { c };
                bits += &bitfield(v as u32, 6);
            }
            bits
        }

        let mut bits = String::new();
        bits += &bitfield(5, 6); // type
        bits += &bitfield(0, 2); // repeat
        bits += &bitfield(351_759_000, 30); // mmsi
        bits += &bitfield(0, 2); // ais version
        bits += &bitfield(9_134_270, 30); // imo
        bits += &text("3FOF8", 7); // call sign [70,112)
        bits += &text("EVER DIADEM", 20); // name [112,232)
        bits += &bitfield(70, 8); // ship type
        bits += &bitfield(225, 9); // dim bow
        bits += &bitfield(70, 9); // dim stern
        bits += &bitfield(1, 6); // dim port
        bits += &bitfield(31, 6); // dim starboard
        bits += &bitfield(1, 4); // fix type
        bits += &bitfield(5, 4); // eta month
        bits += &bitfield(15, 5); // eta day
        bits += &bitfield(14, 5); // eta hour
        bits += &bitfield(0, 6); // eta minute
        bits += &bitfield(61, 8); // draught, tenths of metres
        bits += &text("NEW YORK", 20); // destination [302,422)
        bits += &bitfield(0, 2); // dte + spare
        bits += "00"; // fill bits to the 6-bit boundary
        assert_eq!(bits.len(), 426);

        let payload = armor(&bits);
        let msg = decode(&payload, 2).unwrap();
        let r = match msg {
            AisMessage::StaticAndVoyageData(r) => r,
            other => panic!("expected static and voyage data, got {:?}", other),
        };
        assert_eq!(r.mmsi, 351_759_000);
        assert_eq!(r.call_sign, "3FOF8");
        assert_eq!(r.name, "EVER DIADEM");
        assert_eq!(r.ship_type, 70);
        assert_eq!((r.dim_bow, r.dim_stern), (225, 70));
        assert_eq!((r.dim_port, r.dim_starboard), (1, 31));
        assert_eq!((r.eta_month, r.eta_day), (5, 15));
        assert_eq!((r.eta_hour, r.eta_minute), (14, 0));
        assert_eq!(r.draught, 61);
        assert_eq!(r.destination, "NEW YORK");
    }
}
