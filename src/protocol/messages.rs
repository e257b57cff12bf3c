//! Typed message decoding from validated payloads.
//!
//! Each supported message is a fixed-offset little-endian layout. Decoding
//! dispatches on the message id through a static lookup table mapping
//! `id -> (minimum payload length, decode fn)`, so adding a message
//! type is a table entry plus a struct, not a rewrite. Ids without a table
//! entry classify as [`DecodeError::Unhandled`] — a no-op for the caller,
//! since the stream carries many message types the monitor does not track.
//!
//! Integer fields keep their native wire width and unit (centidegrees stay
//! centidegrees); unit conversions are accessor methods.

use serde::Serialize;

use crate::error::DecodeError;

/// ATTITUDE (id 30): body-frame orientation and rotation rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attitude {
    /// Milliseconds since autopilot boot.
    pub time_boot_ms: u32,
    /// Roll angle, radians.
    pub roll: f32,
    /// Pitch angle, radians.
    pub pitch: f32,
    /// Yaw angle, radians.
    pub yaw: f32,
    /// Roll rate, rad/s.
    pub rollspeed: f32,
    /// Pitch rate, rad/s.
    pub pitchspeed: f32,
    /// Yaw rate, rad/s.
    pub yawspeed: f32,
}

impl Attitude {
    pub const MSG_ID: u32 = 30;
    pub const WIRE_LEN: usize = 28;
}

/// GLOBAL_POSITION_INT (id 33): fused global position estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlobalPositionInt {
    /// Milliseconds since autopilot boot.
    pub time_boot_ms: u32,
    /// Latitude, degrees * 1e7.
    pub lat: i32,
    /// Longitude, degrees * 1e7.
    pub lon: i32,
    /// Altitude above MSL, millimeters.
    pub alt: i32,
    /// Altitude above home, millimeters.
    pub relative_alt: i32,
    /// Ground speed north, cm/s.
    pub vx: i16,
    /// Ground speed east, cm/s.
    pub vy: i16,
    /// Ground speed down, cm/s.
    pub vz: i16,
    /// Heading, centidegrees (0..36000, u16::MAX if unknown).
    pub hdg: u16,
}

impl GlobalPositionInt {
    pub const MSG_ID: u32 = 33;
    pub const WIRE_LEN: usize = 28;

    /// Latitude in degrees.
    pub fn lat_deg(&self) -> f64 {
        f64::from(self.lat) / 1e7
    }

    /// Longitude in degrees.
    pub fn lon_deg(&self) -> f64 {
        f64::from(self.lon) / 1e7
    }
}

/// NAV_CONTROLLER_OUTPUT (id 62): navigation controller state.
///
/// The monitor's tracked message: [`wp_dist`](Self::wp_dist) feeds the
/// sliding-window anomaly detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NavControllerOutput {
    /// Commanded roll, radians.
    pub nav_roll: f32,
    /// Commanded pitch, radians.
    pub nav_pitch: f32,
    /// Current desired heading, centidegrees.
    pub nav_bearing: i16,
    /// Bearing to the active waypoint, centidegrees.
    pub target_bearing: i16,
    /// Distance to the active waypoint, meters.
    pub wp_dist: u16,
    /// Altitude error, meters.
    pub alt_error: f32,
    /// Airspeed error, m/s.
    pub aspd_error: f32,
    /// Crosstrack error, meters.
    pub xtrack_error: f32,
}

impl NavControllerOutput {
    pub const MSG_ID: u32 = 62;
    pub const WIRE_LEN: usize = 26;

    /// Desired heading in degrees.
    pub fn nav_bearing_deg(&self) -> f32 {
        f32::from(self.nav_bearing) / 100.0
    }

    /// Waypoint bearing in degrees.
    pub fn target_bearing_deg(&self) -> f32 {
        f32::from(self.target_bearing) / 100.0
    }
}

/// VFR_HUD (id 74): the head-up-display basics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VfrHud {
    /// Indicated airspeed, m/s.
    pub airspeed: f32,
    /// Ground speed, m/s.
    pub groundspeed: f32,
    /// Heading, degrees (0..360).
    pub heading: i16,
    /// Throttle, percent.
    pub throttle: u16,
    /// Altitude above MSL, meters.
    pub alt: f32,
    /// Climb rate, m/s.
    pub climb: f32,
}

impl VfrHud {
    pub const MSG_ID: u32 = 74;
    pub const WIRE_LEN: usize = 20;
}

/// One decoded telemetry message, tagged by type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "message", rename_all = "snake_case")]
pub enum Decoded {
    Attitude(Attitude),
    GlobalPositionInt(GlobalPositionInt),
    NavControllerOutput(NavControllerOutput),
    VfrHud(VfrHud),
}

impl Decoded {
    /// Wire message id of this variant.
    pub fn msg_id(&self) -> u32 {
        match self {
            Decoded::Attitude(_) => Attitude::MSG_ID,
            Decoded::GlobalPositionInt(_) => GlobalPositionInt::MSG_ID,
            Decoded::NavControllerOutput(_) => NavControllerOutput::MSG_ID,
            Decoded::VfrHud(_) => VfrHud::MSG_ID,
        }
    }

    /// Wire message name of this variant.
    pub fn name(&self) -> &'static str {
        match self {
            Decoded::Attitude(_) => "ATTITUDE",
            Decoded::GlobalPositionInt(_) => "GLOBAL_POSITION_INT",
            Decoded::NavControllerOutput(_) => "NAV_CONTROLLER_OUTPUT",
            Decoded::VfrHud(_) => "VFR_HUD",
        }
    }
}

type DecodeFn = fn(&[u8]) -> Result<Decoded, DecodeError>;

struct MessageSpec {
    id: u32,
    min_len: usize,
    decode: DecodeFn,
}

/// Dispatch table, ordered by message id.
static MESSAGE_TABLE: &[MessageSpec] = &[
    MessageSpec {
        id: Attitude::MSG_ID,
        min_len: Attitude::WIRE_LEN,
        decode: decode_attitude,
    },
    MessageSpec {
        id: GlobalPositionInt::MSG_ID,
        min_len: GlobalPositionInt::WIRE_LEN,
        decode: decode_global_position_int,
    },
    MessageSpec {
        id: NavControllerOutput::MSG_ID,
        min_len: NavControllerOutput::WIRE_LEN,
        decode: decode_nav_controller_output,
    },
    MessageSpec {
        id: VfrHud::MSG_ID,
        min_len: VfrHud::WIRE_LEN,
        decode: decode_vfr_hud,
    },
];

fn spec_for(msg_id: u32) -> Option<&'static MessageSpec> {
    MESSAGE_TABLE.iter().find(|spec| spec.id == msg_id)
}

/// Whether a decoder is registered for this message id.
pub fn is_handled(msg_id: u32) -> bool {
    spec_for(msg_id).is_some()
}

/// Decode a validated payload into a typed message.
///
/// Pure function; no side effects, no retained state between calls.
///
/// # Errors
///
/// - [`DecodeError::Unhandled`] when no decoder is registered for `msg_id`
/// - [`DecodeError::PayloadTooSmall`] when the payload is shorter than the
///   message's wire length
pub fn decode(msg_id: u32, payload: &[u8]) -> Result<Decoded, DecodeError> {
    let spec = spec_for(msg_id).ok_or(DecodeError::Unhandled(msg_id))?;
    if payload.len() < spec.min_len {
        return Err(DecodeError::PayloadTooSmall { len: payload.len(), min: spec.min_len });
    }
    (spec.decode)(payload)
}

fn decode_attitude(payload: &[u8]) -> Result<Decoded, DecodeError> {
    Ok(Decoded::Attitude(Attitude {
        time_boot_ms: read_u32_le(payload, 0)?,
        roll: read_f32_le(payload, 4)?,
        pitch: read_f32_le(payload, 8)?,
        yaw: read_f32_le(payload, 12)?,
        rollspeed: read_f32_le(payload, 16)?,
        pitchspeed: read_f32_le(payload, 20)?,
        yawspeed: read_f32_le(payload, 24)?,
    }))
}

fn decode_global_position_int(payload: &[u8]) -> Result<Decoded, DecodeError> {
    Ok(Decoded::GlobalPositionInt(GlobalPositionInt {
        time_boot_ms: read_u32_le(payload, 0)?,
        lat: read_i32_le(payload, 4)?,
        lon: read_i32_le(payload, 8)?,
        alt: read_i32_le(payload, 12)?,
        relative_alt: read_i32_le(payload, 16)?,
        vx: read_i16_le(payload, 20)?,
        vy: read_i16_le(payload, 22)?,
        vz: read_i16_le(payload, 24)?,
        hdg: read_u16_le(payload, 26)?,
    }))
}

fn decode_nav_controller_output(payload: &[u8]) -> Result<Decoded, DecodeError> {
    Ok(Decoded::NavControllerOutput(NavControllerOutput {
        nav_roll: read_f32_le(payload, 0)?,
        nav_pitch: read_f32_le(payload, 4)?,
        nav_bearing: read_i16_le(payload, 8)?,
        target_bearing: read_i16_le(payload, 10)?,
        wp_dist: read_u16_le(payload, 12)?,
        alt_error: read_f32_le(payload, 14)?,
        aspd_error: read_f32_le(payload, 18)?,
        xtrack_error: read_f32_le(payload, 22)?,
    }))
}

fn decode_vfr_hud(payload: &[u8]) -> Result<Decoded, DecodeError> {
    Ok(Decoded::VfrHud(VfrHud {
        airspeed: read_f32_le(payload, 0)?,
        groundspeed: read_f32_le(payload, 4)?,
        heading: read_i16_le(payload, 8)?,
        throttle: read_u16_le(payload, 10)?,
        alt: read_f32_le(payload, 12)?,
        climb: read_f32_le(payload, 16)?,
    }))
}

// Bounds-checked little-endian field readers.

fn read_u16_le(payload: &[u8], offset: usize) -> Result<u16, DecodeError> {
    let bytes = payload
        .get(offset..offset + 2)
        .ok_or(DecodeError::PayloadTooSmall { len: payload.len(), min: offset + 2 })?;
    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_i16_le(payload: &[u8], offset: usize) -> Result<i16, DecodeError> {
    let bytes = payload
        .get(offset..offset + 2)
        .ok_or(DecodeError::PayloadTooSmall { len: payload.len(), min: offset + 2 })?;
    Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
}

fn read_u32_le(payload: &[u8], offset: usize) -> Result<u32, DecodeError> {
    let bytes = payload
        .get(offset..offset + 4)
        .ok_or(DecodeError::PayloadTooSmall { len: payload.len(), min: offset + 4 })?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_i32_le(payload: &[u8], offset: usize) -> Result<i32, DecodeError> {
    let bytes = payload
        .get(offset..offset + 4)
        .ok_or(DecodeError::PayloadTooSmall { len: payload.len(), min: offset + 4 })?;
    Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

fn read_f32_le(payload: &[u8], offset: usize) -> Result<f32, DecodeError> {
    let bytes = payload
        .get(offset..offset + 4)
        .ok_or(DecodeError::PayloadTooSmall { len: payload.len(), min: offset + 4 })?;
    Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
