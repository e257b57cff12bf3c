//! Frame validation for the MAVLink v2 wire layout.
//!
//! A v2 frame starts with the `0xFD` marker, carries its payload length in
//! header byte 2 and a 24-bit little-endian message id in header bytes 6–8,
//! and places the payload at bytes `[12, 12 + len)`. Validation is a pure
//! function over the raw byte slice: header fields are read through a
//! borrowed view, never copied out, and a frame that fails any check is
//! rejected whole — no partial decode.
//!
//! The integrity checksum and optional signature trailing the payload are
//! not verified here. A deployment that needs full protocol conformance
//! must check them before trusting frame contents.

use crate::error::FrameError;

/// MAVLink v2 version marker, the first byte of every frame.
pub const MAGIC_V2: u8 = 0xFD;

/// Header bytes preceding the payload.
pub const HEADER_LEN: usize = 12;

/// Borrowed view over the fixed-size header of a raw frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameHeader<'a> {
    raw: &'a [u8],
}

impl<'a> FrameHeader<'a> {
    /// View the header of a raw frame.
    ///
    /// # Errors
    ///
    /// Fails with [`FrameError::TooShort`] when the buffer cannot hold a
    /// header plus at least one payload byte (length ≤ 12).
    pub fn parse(raw: &'a [u8]) -> Result<Self, FrameError> {
        if raw.len() <= HEADER_LEN {
            return Err(FrameError::TooShort { len: raw.len(), min: HEADER_LEN });
        }
        Ok(Self { raw })
    }

    /// Protocol version marker (byte 0).
    pub fn version_marker(&self) -> u8 {
        self.raw[0]
    }

    /// Declared payload length in bytes (byte 2, 0–255).
    pub fn payload_len(&self) -> usize {
        self.raw[2] as usize
    }

    /// Message identifier (bytes 6–8, 24-bit little-endian).
    pub fn msg_id(&self) -> u32 {
        u32::from(self.raw[6]) | u32::from(self.raw[7]) << 8 | u32::from(self.raw[8]) << 16
    }
}

/// A validated frame: the message id plus the payload slice it declares.
///
/// Borrows from the raw datagram; the frame is consumed by decoding and
/// holds no ownership beyond the processing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidFrame<'a> {
    pub msg_id: u32,
    pub payload: &'a [u8],
}

/// Validate a raw datagram as a MAVLink v2 frame.
///
/// Pure function over the input slice; no side effects, no retained state.
///
/// # Errors
///
/// - [`FrameError::TooShort`] when the buffer cannot hold a header plus at
///   least one payload byte (length ≤ 12)
/// - [`FrameError::BadVersionMarker`] when byte 0 is not `0xFD`
/// - [`FrameError::TruncatedPayload`] when the buffer is shorter than the
///   header plus the declared payload length
pub fn validate(raw: &[u8]) -> Result<ValidFrame<'_>, FrameError> {
    let header = FrameHeader::parse(raw)?;
    if header.version_marker() != MAGIC_V2 {
        return Err(FrameError::BadVersionMarker {
            found: header.version_marker(),
            expected: MAGIC_V2,
        });
    }

    let declared = header.payload_len();
    if raw.len() < HEADER_LEN + declared {
        return Err(FrameError::TruncatedPayload { len: raw.len(), declared });
    }

    Ok(ValidFrame { msg_id: header.msg_id(), payload: &raw[HEADER_LEN..HEADER_LEN + declared] })
}
