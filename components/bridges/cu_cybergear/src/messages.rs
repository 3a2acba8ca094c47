//! Message types for the CyberGear bridge.
//!
//! A reply is whatever came back for a request. When the codec has a parser
//! for its command mode it arrives typed, otherwise the raw message is kept so
//! callers can still inspect it.

use cu_cybergear_lib::{CodecError, RawMessage, Response, decode_message};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Reply {
    Typed(Response),
    /// Modes without a parser (echoes, writes, control frames).
    Raw(RawMessage),
}

impl Reply {
    /// Typed when the mode has a parser, raw when it has none. Other decode
    /// failures are errors.
    pub fn from_raw(raw: RawMessage) -> Result<Self, CodecError> {
        match decode_message(&raw) {
            Ok(response) => Ok(Reply::Typed(response)),
            Err(CodecError::UnsupportedMode(_)) => Ok(Reply::Raw(raw)),
            Err(e) => Err(e),
        }
    }

    pub fn command_mode(&self) -> u8 {
        match self {
            Reply::Typed(response) => response.command_mode() as u8,
            Reply::Raw(raw) => raw.command_mode,
        }
    }

    pub fn response(&self) -> Option<&Response> {
        match self {
            Reply::Typed(response) => Some(response),
            Reply::Raw(_) => None,
        }
    }
}

/// Parse hex written with or without spaces (`"41 54 90 07"` or `"41549007"`).
pub fn parse_hex(text: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits: String = text.split_whitespace().collect();
    hex::decode(digits)
}
