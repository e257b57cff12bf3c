//! MAVLink v2 wire format handling.
//!
//! [`frame`] validates raw datagrams and slices out payloads; [`messages`]
//! turns a payload plus message id into a typed record via a static
//! dispatch table.

mod frame;
mod messages;

pub use frame::{FrameHeader, HEADER_LEN, MAGIC_V2, ValidFrame, validate};
pub use messages::{
    Attitude, Decoded, GlobalPositionInt, NavControllerOutput, VfrHud, decode, is_handled,
};
