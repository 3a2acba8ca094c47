//! The raw device message, before any per-mode interpretation.

/// Message kinds of the CyberGear private protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum CommandMode {
    /// Device id query, and its reply.
    GetId = 0,
    /// Operation control: torque, position, speed and gains in one frame.
    Control = 1,
    /// Status feedback sent by the motor.
    Feedback = 2,
    Enable = 3,
    Disable = 4,
    SetZero = 6,
    SetId = 7,
    ReadParam = 17,
    WriteParam = 18,
    /// Fault feedback sent by the motor.
    Fault = 21,
}

impl CommandMode {
    pub const fn from_u8(mode: u8) -> Option<Self> {
        Some(match mode {
            0 => Self::GetId,
            1 => Self::Control,
            2 => Self::Feedback,
            3 => Self::Enable,
            4 => Self::Disable,
            6 => Self::SetZero,
            7 => Self::SetId,
            17 => Self::ReadParam,
            18 => Self::WriteParam,
            21 => Self::Fault,
            _ => return None,
        })
    }
}

impl From<CommandMode> for u8 {
    fn from(mode: CommandMode) -> Self {
        mode as u8
    }
}

/// One device message: the three identifier sub-fields plus 8 payload bytes.
///
/// What `aux_field` and `node_id` hold depends on `command_mode`; the typed
/// [`crate::Request`] and [`crate::Response`] layers give them names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RawMessage {
    pub command_mode: u8,
    pub aux_field: u16,
    pub node_id: u8,
    pub payload: [u8; 8],
}

impl RawMessage {
    /// Message with an all-zero payload.
    pub const fn new(command_mode: u8, aux_field: u16, node_id: u8) -> Self {
        Self {
            command_mode,
            aux_field,
            node_id,
            payload: [0; 8],
        }
    }

    /// Copy `data` into the start of the payload, zero padding the rest.
    ///
    /// Anything past 8 bytes is dropped.
    pub fn with_payload(mut self, data: &[u8]) -> Self {
        let len = data.len().min(self.payload.len());
        self.payload = [0; 8];
        self.payload[..len].copy_from_slice(&data[..len]);
        self
    }

    #[inline]
    pub const fn mode(&self) -> Option<CommandMode> {
        CommandMode::from_u8(self.command_mode)
    }

    #[inline]
    pub fn identifier(&self) -> u32 {
        crate::identifier::pack(self.command_mode, self.aux_field, self.node_id)
    }

    pub(crate) fn payload_u16(&self, at: usize) -> u16 {
        u16::from_le_bytes([self.payload[at], self.payload[at + 1]])
    }

    pub(crate) fn payload_u32(&self, at: usize) -> u32 {
        u32::from_le_bytes([
            self.payload[at],
            self.payload[at + 1],
            self.payload[at + 2],
            self.payload[at + 3],
        ])
    }

    pub(crate) fn payload_word(&self, at: usize) -> [u8; 4] {
        [
            self.payload[at],
            self.payload[at + 1],
            self.payload[at + 2],
            self.payload[at + 3],
        ]
    }
}
