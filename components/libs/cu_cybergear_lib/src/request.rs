//! Host to motor messages.

use crate::fixed_point::{self, encode_u16};
use crate::message::{CommandMode, RawMessage};
use crate::register::{ParamValue, Register};

/// Set points of one operation control (mode 1) frame.
///
/// Every field is clamped to its range on the wire: torque ±12 N·m, angle
/// ±12.5 rad, speed ±30 rad/s, kp 0..500, kd 0..5.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ControlTarget {
    pub torque: f64,
    pub angle: f64,
    pub speed: f64,
    pub kp: f64,
    pub kd: f64,
}

/// Everything the host can send to a motor.
///
/// `target` is the motor's node id, `host` the requester's id. The host id
/// fills the low byte of the aux field.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Request {
    IdQuery {
        target: u8,
        host: u8,
    },
    /// Torque rides in the identifier; angle, speed and gains in the payload.
    Control {
        target: u8,
        set_point: ControlTarget,
    },
    Enable {
        target: u8,
        host: u8,
    },
    /// Stop the motor, optionally clearing latched faults.
    Disable {
        target: u8,
        host: u8,
        clear_fault: bool,
    },
    /// Make the current mechanical position the zero.
    SetZero {
        target: u8,
        host: u8,
    },
    /// Change the motor's node id to `new_target`.
    SetId {
        target: u8,
        host: u8,
        new_target: u8,
    },
    ReadParam {
        target: u8,
        host: u8,
        register: Register,
    },
    WriteParam {
        target: u8,
        host: u8,
        register: Register,
        value: ParamValue,
    },
}

#[inline]
const fn host_aux(host: u8) -> u16 {
    host as u16
}

impl Request {
    pub const fn command_mode(&self) -> CommandMode {
        match self {
            Request::IdQuery { .. } => CommandMode::GetId,
            Request::Control { .. } => CommandMode::Control,
            Request::Enable { .. } => CommandMode::Enable,
            Request::Disable { .. } => CommandMode::Disable,
            Request::SetZero { .. } => CommandMode::SetZero,
            Request::SetId { .. } => CommandMode::SetId,
            Request::ReadParam { .. } => CommandMode::ReadParam,
            Request::WriteParam { .. } => CommandMode::WriteParam,
        }
    }

    pub const fn target(&self) -> u8 {
        match *self {
            Request::IdQuery { target, .. }
            | Request::Control { target, .. }
            | Request::Enable { target, .. }
            | Request::Disable { target, .. }
            | Request::SetZero { target, .. }
            | Request::SetId { target, .. }
            | Request::ReadParam { target, .. }
            | Request::WriteParam { target, .. } => target,
        }
    }

    /// Build the raw message for this request.
    pub fn to_raw(&self) -> RawMessage {
        let mode = self.command_mode() as u8;
        match *self {
            Request::IdQuery { target, host }
            | Request::Enable { target, host } => RawMessage::new(mode, host_aux(host), target),
            Request::Control { target, set_point } => {
                let torque = encode_u16(set_point.torque, fixed_point::TORQUE);
                let mut payload = [0u8; 8];
                let fields = [
                    encode_u16(set_point.angle, fixed_point::POSITION),
                    encode_u16(set_point.speed, fixed_point::VELOCITY),
                    encode_u16(set_point.kp, fixed_point::KP),
                    encode_u16(set_point.kd, fixed_point::KD),
                ];
                for (chunk, field) in payload.chunks_exact_mut(2).zip(fields) {
                    chunk.copy_from_slice(&field.to_le_bytes());
                }
                RawMessage::new(mode, torque, target).with_payload(&payload)
            }
            Request::Disable {
                target,
                host,
                clear_fault,
            } => RawMessage::new(mode, host_aux(host), target).with_payload(&[clear_fault as u8]),
            Request::SetZero { target, host } => {
                RawMessage::new(mode, host_aux(host), target).with_payload(&[1])
            }
            Request::SetId {
                target,
                host,
                new_target,
            } => RawMessage::new(mode, (new_target as u16) << 8 | host_aux(host), target),
            Request::ReadParam {
                target,
                host,
                register,
            } => RawMessage::new(mode, host_aux(host), target)
                .with_payload(&register.index().to_le_bytes()),
            Request::WriteParam {
                target,
                host,
                register,
                value,
            } => {
                let mut payload = [0u8; 8];
                payload[..2].copy_from_slice(&register.index().to_le_bytes());
                payload[4..].copy_from_slice(&register.encode(value));
                RawMessage::new(mode, host_aux(host), target).with_payload(&payload)
            }
        }
    }
}

impl From<&Request> for RawMessage {
    fn from(request: &Request) -> Self {
        request.to_raw()
    }
}
