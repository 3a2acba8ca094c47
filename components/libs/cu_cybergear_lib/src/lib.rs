//! # CyberGear protocol library
//!
//! Codec for the Xiaomi CyberGear geared brushless actuator when it is driven
//! through a serial-to-CAN bridge speaking the ASCII `AT` framing.
//!
//! The crate is pure: it turns typed [`Request`]s into 17 byte frames and 17
//! byte frames into typed [`Response`]s. Opening ports, timeouts and retries
//! live in the `cu-cybergear` bridge.
//!
//! ## Layers
//!
//! | Module | Purpose |
//! | ------ | ------- |
//! | [`fixed_point`] | bounded real values to/from unsigned N-byte integers |
//! | [`bits`] | inclusive bit-range extraction |
//! | [`identifier`] | 29-bit extended CAN id packing plus the bridge marker |
//! | [`frame`] | the `AT ... \r\n` transport frame and a stream reader |
//! | [`register`] | device parameter table and per-register wire encoding |
//! | [`request`] / [`response`] | typed messages per command mode |
//!
//! ```
//! use cu_cybergear_lib::{decode_frame, encode_frame, Request, Response};
//!
//! let frame = encode_frame(&Request::Enable { target: 0x7F, host: 0xFD });
//! assert_eq!(&frame[..2], b"AT");
//!
//! let reply = [
//!     0x41, 0x54, 0x00, 0x03, 0xFF, 0xF4, 0x08, 1, 2, 3, 4, 5, 6, 7, 8, 0x0D, 0x0A,
//! ];
//! match decode_frame(&reply) {
//!     Ok(Response::Id(id)) => assert_eq!(id.mcu_uid, [1, 2, 3, 4, 5, 6, 7, 8]),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bits;
pub mod error;
pub mod fixed_point;
pub mod frame;
pub mod identifier;
pub mod message;
pub mod register;
pub mod request;
pub mod response;

pub use error::{CodecError, FrameError};
pub use frame::{FRAME_LEN, FrameReader, unwrap, wrap};
pub use message::{CommandMode, RawMessage};
pub use register::{ParamValue, Register, RunMode};
pub use request::{ControlTarget, Request};
pub use response::{
    FaultFlags, FaultResponse, IdResponse, ParamReadResponse, Response, RunPhase, StatusFlags,
    StatusResponse,
};

/// Encode a request straight to its wire frame.
pub fn encode_frame(request: &Request) -> [u8; FRAME_LEN] {
    wrap(&request.to_raw())
}

/// Decode an already unwrapped message.
pub fn decode_message(raw: &RawMessage) -> Result<Response, CodecError> {
    Response::decode(raw)
}

/// Unwrap a wire frame and decode the typed response it carries.
pub fn decode_frame(bytes: &[u8]) -> Result<Response, CodecError> {
    let raw = unwrap(bytes)?;
    Response::decode(&raw)
}
