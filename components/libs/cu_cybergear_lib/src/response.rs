//! Motor to host messages.
//!
//! Only four modes carry a reply the host can interpret: id (0), status
//! feedback (2), parameter read (17) and fault feedback (21). Anything else is
//! reported as [`CodecError::UnsupportedMode`] and the caller keeps the raw
//! message.

use crate::bits::{bit, extract_bits};
use crate::error::CodecError;
use crate::fixed_point::{self, decode_temperature, decode_u16};
use crate::message::{CommandMode, RawMessage};
use crate::register::{ParamValue, Register};

/// Node id a motor puts in its id reply.
pub const SELF_ID_SENTINEL: u8 = 0xFE;

fn expect_mode(raw: &RawMessage, mode: CommandMode) -> Result<(), CodecError> {
    if raw.command_mode != mode as u8 {
        return Err(CodecError::ModeMismatch {
            mode: raw.command_mode,
            node_id: raw.node_id,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Response {
    Id(IdResponse),
    Status(StatusResponse),
    ParamRead(ParamReadResponse),
    Fault(FaultResponse),
}

impl Response {
    /// Decode a raw message according to its command mode.
    pub fn decode(raw: &RawMessage) -> Result<Self, CodecError> {
        match raw.mode() {
            Some(CommandMode::GetId) => IdResponse::decode(raw).map(Response::Id),
            Some(CommandMode::Feedback) => Ok(Response::Status(StatusResponse::decode(raw))),
            Some(CommandMode::ReadParam) => {
                ParamReadResponse::decode(raw).map(Response::ParamRead)
            }
            Some(CommandMode::Fault) => FaultResponse::decode(raw).map(Response::Fault),
            _ => Err(CodecError::UnsupportedMode(raw.command_mode)),
        }
    }

    pub const fn command_mode(&self) -> CommandMode {
        match self {
            Response::Id(_) => CommandMode::GetId,
            Response::Status(_) => CommandMode::Feedback,
            Response::ParamRead(_) => CommandMode::ReadParam,
            Response::Fault(_) => CommandMode::Fault,
        }
    }
}

/// Reply to an id query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct IdResponse {
    pub id: u16,
    /// 64-bit MCU unique identifier.
    pub mcu_uid: [u8; 8],
}

impl IdResponse {
    pub fn decode(raw: &RawMessage) -> Result<Self, CodecError> {
        if raw.command_mode != CommandMode::GetId as u8 || raw.node_id != SELF_ID_SENTINEL {
            return Err(CodecError::ModeMismatch {
                mode: raw.command_mode,
                node_id: raw.node_id,
            });
        }
        Ok(Self {
            id: raw.aux_field,
            mcu_uid: raw.payload,
        })
    }

    /// The motor's node id, the low byte of [`IdResponse::id`].
    pub const fn node_id(&self) -> u8 {
        (self.id & 0xFF) as u8
    }
}

/// Where the motor is in its start-up sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RunPhase {
    Reset,
    Calibrating,
    Running,
    Unknown,
}

impl RunPhase {
    pub const fn from_bits(bits: u32) -> Self {
        match bits {
            0 => RunPhase::Reset,
            1 => RunPhase::Calibrating,
            2 => RunPhase::Running,
            _ => RunPhase::Unknown,
        }
    }
}

/// Error bits carried in a status frame's aux field (bits 8..=13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatusFlags {
    pub undervoltage: bool,
    pub overcurrent: bool,
    pub overheat: bool,
    pub magnetic: bool,
    pub hall: bool,
    pub undefined: bool,
}

impl StatusFlags {
    pub const fn from_aux(aux: u16) -> Self {
        let aux = aux as u32;
        Self {
            undervoltage: bit(aux, 8),
            overcurrent: bit(aux, 9),
            overheat: bit(aux, 10),
            magnetic: bit(aux, 11),
            hall: bit(aux, 12),
            undefined: bit(aux, 13),
        }
    }

    pub const fn any(&self) -> bool {
        self.undervoltage
            || self.overcurrent
            || self.overheat
            || self.magnetic
            || self.hall
            || self.undefined
    }
}

/// Periodic motor feedback (mode 2).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StatusResponse {
    pub host_id: u8,
    pub target_id: u8,
    pub run_phase: RunPhase,
    pub error_flags: StatusFlags,
    /// rad
    pub angle: f32,
    /// rad/s
    pub speed: f32,
    /// N·m
    pub torque: f32,
    pub temperature_c: f32,
}

impl StatusResponse {
    /// Caller guarantees the mode; [`Response::decode`] dispatches on it.
    pub fn decode(raw: &RawMessage) -> Self {
        let aux = raw.aux_field as u32;
        Self {
            host_id: raw.node_id,
            target_id: extract_bits(aux, 0, 7) as u8,
            run_phase: RunPhase::from_bits(extract_bits(aux, 14, 15)),
            error_flags: StatusFlags::from_aux(raw.aux_field),
            angle: decode_u16(raw.payload_u16(0), fixed_point::POSITION) as f32,
            speed: decode_u16(raw.payload_u16(2), fixed_point::VELOCITY) as f32,
            torque: decode_u16(raw.payload_u16(4), fixed_point::TORQUE) as f32,
            temperature_c: decode_temperature(raw.payload_u16(6)) as f32,
        }
    }
}

/// Reply to a parameter read.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParamReadResponse {
    pub host_id: u8,
    pub target_id: u8,
    pub register: Register,
    pub value: ParamValue,
}

impl ParamReadResponse {
    pub fn decode(raw: &RawMessage) -> Result<Self, CodecError> {
        expect_mode(raw, CommandMode::ReadParam)?;
        let register = Register::from_index(raw.payload_u16(0))?;
        Ok(Self {
            host_id: raw.node_id,
            target_id: (raw.aux_field & 0xFF) as u8,
            register,
            value: register.decode(raw.payload_word(4)),
        })
    }
}

/// Latched fault bits of a fault frame's error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FaultFlags {
    pub phase_a_overcurrent: bool,
    pub phase_b_overcurrent: bool,
    pub phase_c_overcurrent: bool,
    pub encoder_uncalibrated: bool,
    /// Any of the overload bits 8..=13.
    pub overload: bool,
    pub overvoltage: bool,
    pub undervoltage: bool,
    pub driver_chip: bool,
    pub motor_overheat: bool,
}

impl FaultFlags {
    pub const fn from_code(code: u32) -> Self {
        Self {
            motor_overheat: bit(code, 0),
            driver_chip: bit(code, 1),
            undervoltage: bit(code, 2),
            overvoltage: bit(code, 3),
            encoder_uncalibrated: bit(code, 7),
            overload: extract_bits(code, 8, 13) != 0,
            phase_c_overcurrent: bit(code, 14),
            phase_b_overcurrent: bit(code, 15),
            phase_a_overcurrent: bit(code, 16),
        }
    }
}

/// Fault feedback (mode 21).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FaultResponse {
    pub target_id: u8,
    pub host_id: u8,
    pub has_fault: bool,
    pub error_code: u32,
    pub warning_code: u32,
    /// Present only when `has_fault`.
    pub fault_flags: Option<FaultFlags>,
}

impl FaultResponse {
    pub fn decode(raw: &RawMessage) -> Result<Self, CodecError> {
        expect_mode(raw, CommandMode::Fault)?;
        let error_code = raw.payload_u32(0);
        let has_fault = error_code != 0;
        Ok(Self {
            target_id: raw.node_id,
            host_id: (raw.aux_field & 0xFF) as u8,
            has_fault,
            error_code,
            warning_code: raw.payload_u32(4),
            fault_flags: has_fault.then(|| FaultFlags::from_code(error_code)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(aux: u16, payload: [u8; 8]) -> StatusResponse {
        let raw = RawMessage::new(2, aux, 0xFD).with_payload(&payload);
        match Response::decode(&raw) {
            Ok(Response::Status(s)) => s,
            other => panic!("expected status, got {other:?}"),
        }
    }

    #[test]
    fn id_reply_needs_sentinel() {
        let ok = RawMessage::new(0, 0x007F, 0xFE).with_payload(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let id = IdResponse::decode(&ok).unwrap();
        assert_eq!(id.id, 0x7F);
        assert_eq!(id.node_id(), 0x7F);
        assert_eq!(id.mcu_uid, [1, 2, 3, 4, 5, 6, 7, 8]);

        let echo = RawMessage::new(0, 0x00FD, 0x7F);
        assert_eq!(
            Response::decode(&echo),
            Err(CodecError::ModeMismatch {
                mode: 0,
                node_id: 0x7F
            })
        );
    }

    #[test]
    fn status_fields() {
        // target 0x7F, running, no errors; mid-scale angle/speed/torque, 25.3 C.
        let s = status(0x807F, [0xFF, 0x7F, 0xFF, 0xFF, 0x00, 0x00, 0xFD, 0x00]);
        assert_eq!(s.host_id, 0xFD);
        assert_eq!(s.target_id, 0x7F);
        assert_eq!(s.run_phase, RunPhase::Running);
        assert!(!s.error_flags.any());
        assert!(s.angle.abs() < 0.001);
        assert_eq!(s.speed, 30.0);
        assert_eq!(s.torque, -12.0);
        assert!((s.temperature_c - 25.3).abs() < 1e-4);
    }

    #[test]
    fn status_flags_are_exact() {
        let names = ["undervoltage", "overcurrent", "overheat", "magnetic", "hall", "undefined"];
        for (i, name) in names.iter().enumerate() {
            let flags = status(1 << (8 + i), [0; 8]).error_flags;
            let set = [
                flags.undervoltage,
                flags.overcurrent,
                flags.overheat,
                flags.magnetic,
                flags.hall,
                flags.undefined,
            ];
            for (j, on) in set.iter().enumerate() {
                assert_eq!(*on, i == j, "bit {} should only set {name}", 8 + i);
            }
        }

        let flags = status(0b0010_0101_0000_0001, [0; 8]).error_flags;
        assert_eq!(
            flags,
            StatusFlags {
                undervoltage: true,
                overheat: true,
                undefined: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn run_phases() {
        assert_eq!(status(0x0000, [0; 8]).run_phase, RunPhase::Reset);
        assert_eq!(status(0x4000, [0; 8]).run_phase, RunPhase::Calibrating);
        assert_eq!(status(0x8000, [0; 8]).run_phase, RunPhase::Running);
        assert_eq!(status(0xC000, [0; 8]).run_phase, RunPhase::Unknown);
    }

    #[test]
    fn param_read() {
        let mut payload = [0u8; 8];
        payload[..2].copy_from_slice(&0x701Cu16.to_le_bytes());
        payload[4..].copy_from_slice(&24.5f32.to_le_bytes());
        let raw = RawMessage::new(17, 0x007F, 0xFD).with_payload(&payload);

        match Response::decode(&raw) {
            Ok(Response::ParamRead(p)) => {
                assert_eq!(p.register, Register::Vbus);
                assert_eq!(p.value, ParamValue::Float(24.5));
                assert_eq!(p.host_id, 0xFD);
                assert_eq!(p.target_id, 0x7F);
            }
            other => panic!("expected param read, got {other:?}"),
        }
    }

    #[test]
    fn param_read_unknown_index() {
        let raw = RawMessage::new(17, 0x007F, 0xFD).with_payload(&[0x34, 0x12]);
        assert_eq!(
            Response::decode(&raw),
            Err(CodecError::UnknownRegister(0x1234))
        );
    }

    #[test]
    fn fault_without_error_has_no_flags() {
        let raw = RawMessage::new(21, 0x00FD, 0x7F).with_payload(&[0, 0, 0, 0, 9, 0, 0, 0]);
        let Ok(Response::Fault(f)) = Response::decode(&raw) else {
            panic!("expected fault");
        };
        assert!(!f.has_fault);
        assert_eq!(f.warning_code, 9);
        assert_eq!(f.fault_flags, None);
        assert_eq!(f.target_id, 0x7F);
        assert_eq!(f.host_id, 0xFD);
    }

    #[test]
    fn fault_flags_by_bit() {
        let code: u32 = 1 << 16 | 1 << 14 | 1 << 9 | 1 << 3 | 1;
        let raw = RawMessage::new(21, 0x00FD, 0x7F).with_payload(&code.to_le_bytes());
        let f = FaultResponse::decode(&raw).unwrap();
        assert!(f.has_fault);
        assert_eq!(
            f.fault_flags,
            Some(FaultFlags {
                phase_a_overcurrent: true,
                phase_c_overcurrent: true,
                overload: true,
                overvoltage: true,
                motor_overheat: true,
                ..Default::default()
            })
        );
    }

    #[test]
    fn phase_b_bit_is_not_overload() {
        let flags = FaultFlags::from_code(1 << 15);
        assert!(flags.phase_b_overcurrent);
        assert!(!flags.overload);
    }

    #[test]
    fn unsupported_modes() {
        for mode in [1u8, 3, 4, 6, 7, 18, 5, 31] {
            let raw = RawMessage::new(mode, 0, 0);
            assert_eq!(
                Response::decode(&raw),
                Err(CodecError::UnsupportedMode(mode))
            );
        }
    }

    #[test]
    fn direct_decoders_check_the_mode() {
        let status = RawMessage::new(2, 0x007F, 0xFD).with_payload(&[0x05, 0x70]);
        let mismatch = CodecError::ModeMismatch {
            mode: 2,
            node_id: 0xFD,
        };
        assert_eq!(ParamReadResponse::decode(&status), Err(mismatch));
        assert_eq!(FaultResponse::decode(&status), Err(mismatch));
    }
}
