//! Error types for the codec.
//!
//! Every decode error is terminal for the message it was raised on. There is
//! no retry logic here; that belongs to whoever owns the link.

use thiserror::Error;

/// Transport frame could not be unwrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Input was not exactly [`crate::FRAME_LEN`] bytes.
    #[error("frame must be 17 bytes, got {0}")]
    WrongLength(usize),
    /// Missing `AT` header or `\r\n` terminator.
    #[error("frame is missing its AT header or CRLF terminator")]
    BadHeader,
    /// Length byte is not `0x08`.
    #[error("frame length byte is {0:#04x}, expected 0x08")]
    BadLength(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error(transparent)]
    Frame(#[from] FrameError),
    /// The response failed its mode or node-id sentinel check.
    #[error("mode {mode} message from node {node_id:#04x} failed its mode or sentinel check")]
    ModeMismatch { mode: u8, node_id: u8 },
    #[error("unknown register index {0:#06x}")]
    UnknownRegister(u16),
    #[error("unknown register name")]
    UnknownRegisterName,
    /// No parser exists for this response mode, the raw message is all there is.
    #[error("no response parser for command mode {0}")]
    UnsupportedMode(u8),
    #[error("invalid run mode value {0}")]
    InvalidRunMode(u32),
    #[error("unknown run mode name")]
    UnknownRunModeName,
}
