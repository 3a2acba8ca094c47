//! The bridge's `AT` transport frame.
//!
//! ```text
//!  0   2           6     7                         15    17
//!  +---+-----------+-----+-------------------------+-----+
//!  |AT | id (BE32) | 0x08|        payload          |\r\n |
//!  +---+-----------+-----+-------------------------+-----+
//! ```
//!
//! There is no checksum. A corrupted frame that still has its header,
//! terminator and length byte decodes to the wrong values.

use crate::error::FrameError;
use crate::identifier;
use crate::message::RawMessage;

pub const FRAME_LEN: usize = 17;
pub const HEADER: [u8; 2] = *b"AT";
pub const TERMINATOR: [u8; 2] = *b"\r\n";
/// Payload length byte; every CyberGear frame is a full 8 byte CAN frame.
pub const DATA_LEN: u8 = 0x08;

/// Switches the bridge into AT framing. Sent once after opening the port.
pub const AT_MODE_COMMAND: &[u8] = b"AT+AT\r\n";

const ID_AT: usize = 2;
const LEN_AT: usize = 6;
const PAYLOAD_AT: usize = 7;
const TERMINATOR_AT: usize = 15;

/// Wrap a message in its 17 byte frame.
pub fn wrap(msg: &RawMessage) -> [u8; FRAME_LEN] {
    let mut out = [0u8; FRAME_LEN];
    out[..ID_AT].copy_from_slice(&HEADER);
    out[ID_AT..LEN_AT].copy_from_slice(&msg.identifier().to_be_bytes());
    out[LEN_AT] = DATA_LEN;
    out[PAYLOAD_AT..TERMINATOR_AT].copy_from_slice(&msg.payload);
    out[TERMINATOR_AT..].copy_from_slice(&TERMINATOR);
    out
}

/// Unwrap a 17 byte frame.
pub fn unwrap(data: &[u8]) -> Result<RawMessage, FrameError> {
    if data.len() != FRAME_LEN {
        return Err(FrameError::WrongLength(data.len()));
    }
    if data[..ID_AT] != HEADER || data[TERMINATOR_AT..] != TERMINATOR {
        return Err(FrameError::BadHeader);
    }
    if data[LEN_AT] != DATA_LEN {
        return Err(FrameError::BadLength(data[LEN_AT]));
    }

    let id = u32::from_be_bytes([data[2], data[3], data[4], data[5]]);
    let (command_mode, aux_field, node_id) = identifier::unpack(id);
    Ok(RawMessage::new(command_mode, aux_field, node_id)
        .with_payload(&data[PAYLOAD_AT..TERMINATOR_AT]))
}

/// Byte-at-a-time frame splitter for a serial stream.
///
/// Bytes before an `AT` header are skipped (bridge chatter such as `OK\r\n`,
/// or the tail of a broken frame). Once a header is seen the next 15 bytes are
/// buffered and the full frame is unwrapped.
#[derive(Debug, Default)]
pub struct FrameReader {
    buf: heapless::Vec<u8, FRAME_LEN>,
    skipped: usize,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte. Returns a result when a complete frame was collected.
    pub fn push(&mut self, byte: u8) -> Option<Result<RawMessage, FrameError>> {
        match self.buf.len() {
            0 if byte != HEADER[0] => {
                self.skipped += 1;
                return None;
            }
            1 if byte != HEADER[1] => {
                self.skipped += 1;
                self.buf.clear();
                if byte == HEADER[0] {
                    let _ = self.buf.push(byte);
                } else {
                    self.skipped += 1;
                }
                return None;
            }
            _ => {}
        }

        let _ = self.buf.push(byte);
        if self.buf.len() < FRAME_LEN {
            return None;
        }
        let frame = unwrap(&self.buf);
        self.buf.clear();
        Some(frame)
    }

    /// Feed a slice, stopping at the first complete frame.
    ///
    /// Returns how many bytes were consumed together with the frame, if any.
    /// Unconsumed bytes must be fed again on the next call.
    pub fn push_slice(
        &mut self,
        data: &[u8],
    ) -> (usize, Option<Result<RawMessage, FrameError>>) {
        for (i, &byte) in data.iter().enumerate() {
            if let Some(frame) = self.push(byte) {
                return (i + 1, Some(frame));
            }
        }
        (data.len(), None)
    }

    /// Bytes thrown away while looking for a header since the last reset.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// `true` while part of a frame is buffered.
    pub fn in_frame(&self) -> bool {
        !self.buf.is_empty()
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.skipped = 0;
    }
}
