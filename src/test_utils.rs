//! Test utilities for building synthetic MAVLink frames.
//!
//! Shared between unit tests and benchmarks; never compiled into release
//! builds.

#![cfg(any(test, feature = "benchmark"))]

use crate::protocol::{HEADER_LEN, MAGIC_V2, NavControllerOutput};

/// Wrap a payload in a v2 frame: marker, declared length, 24-bit
/// little-endian message id at bytes 6-8, payload at byte 12, two zero
/// bytes standing in for the (unverified) checksum.
pub fn encode_frame(msg_id: u32, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= u8::MAX as usize, "payload exceeds declared-length field");
    assert!(msg_id < 1 << 24, "message id exceeds 24 bits");

    let mut frame = vec![0u8; HEADER_LEN + payload.len() + 2];
    frame[0] = MAGIC_V2;
    frame[2] = payload.len() as u8;
    frame[6] = (msg_id & 0xFF) as u8;
    frame[7] = ((msg_id >> 8) & 0xFF) as u8;
    frame[8] = ((msg_id >> 16) & 0xFF) as u8;
    frame[HEADER_LEN..HEADER_LEN + payload.len()].copy_from_slice(payload);
    frame
}

/// Encode a NAV_CONTROLLER_OUTPUT record into its 26-byte wire payload.
pub fn encode_nav_controller_output(msg: &NavControllerOutput) -> Vec<u8> {
    let mut payload = vec![0u8; NavControllerOutput::WIRE_LEN];
    payload[0..4].copy_from_slice(&msg.nav_roll.to_le_bytes());
    payload[4..8].copy_from_slice(&msg.nav_pitch.to_le_bytes());
    payload[8..10].copy_from_slice(&msg.nav_bearing.to_le_bytes());
    payload[10..12].copy_from_slice(&msg.target_bearing.to_le_bytes());
    payload[12..14].copy_from_slice(&msg.wp_dist.to_le_bytes());
    payload[14..18].copy_from_slice(&msg.alt_error.to_le_bytes());
    payload[18..22].copy_from_slice(&msg.aspd_error.to_le_bytes());
    payload[22..26].copy_from_slice(&msg.xtrack_error.to_le_bytes());
    payload
}

/// A complete NAV_CONTROLLER_OUTPUT frame ready for the validator.
pub fn nav_frame(msg: &NavControllerOutput) -> Vec<u8> {
    encode_frame(NavControllerOutput::MSG_ID, &encode_nav_controller_output(msg))
}
