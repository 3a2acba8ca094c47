//! Device parameter table.
//!
//! Parameters are read with mode 17 and written with mode 18. Each one has a
//! fixed wire index and a fixed representation inside the 4 value bytes of the
//! payload.

use crate::error::CodecError;
use crate::fixed_point::{self, Range};
use core::fmt;

/// How a register's value sits in its 4 payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Repr {
    /// One unsigned byte, then 3 bytes of zero padding.
    U8,
    /// Little-endian u16, then 2 bytes of zero padding.
    U16,
    /// Little-endian IEEE-754 single.
    F32,
}

impl Repr {
    pub fn decode(self, bytes: [u8; 4]) -> ParamValue {
        match self {
            Repr::U8 => ParamValue::Int(bytes[0] as u32),
            Repr::U16 => ParamValue::Int(u16::from_le_bytes([bytes[0], bytes[1]]) as u32),
            Repr::F32 => ParamValue::Float(f32::from_le_bytes(bytes)),
        }
    }

    /// Integers are truncated to the register width, floats narrowed to f32.
    pub fn encode(self, value: ParamValue) -> [u8; 4] {
        match self {
            Repr::U8 => [(value.as_u32() & 0xFF) as u8, 0, 0, 0],
            Repr::U16 => {
                let [lo, hi] = ((value.as_u32() & 0xFFFF) as u16).to_le_bytes();
                [lo, hi, 0, 0]
            }
            Repr::F32 => value.as_f32().to_le_bytes(),
        }
    }
}

/// A register value: integer registers carry `Int`, float registers `Float`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ParamValue {
    Int(u32),
    Float(f32),
}

impl ParamValue {
    /// Negative floats saturate to 0, as `as` casts do.
    pub fn as_u32(self) -> u32 {
        match self {
            ParamValue::Int(v) => v,
            ParamValue::Float(v) => v as u32,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            ParamValue::Int(v) => v as f32,
            ParamValue::Float(v) => v,
        }
    }
}

impl From<u32> for ParamValue {
    fn from(v: u32) -> Self {
        ParamValue::Int(v)
    }
}

impl From<f32> for ParamValue {
    fn from(v: f32) -> Self {
        ParamValue::Float(v)
    }
}

impl From<RunMode> for ParamValue {
    fn from(mode: RunMode) -> Self {
        ParamValue::Int(mode as u32)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Register {
    /// Active control loop, see [`RunMode`].
    RunMode,
    /// Current mode Iq command, A.
    IqRef,
    /// Speed mode speed command, rad/s.
    SpdRef,
    /// Torque limit, N·m.
    LimitTorque,
    /// Current loop Kp.
    CurKp,
    /// Current loop Ki.
    CurKi,
    /// Current filter gain.
    CurFiltGain,
    /// Position mode angle command, rad.
    LocRef,
    /// Position mode speed limit, rad/s.
    LimitSpd,
    /// Speed mode current limit, A.
    LimitCur,
    /// Load end mechanical angle, rad.
    MechPos,
    /// Filtered Iq, A.
    Iqf,
    /// Load end speed, rad/s.
    MechVel,
    /// Bus voltage, V.
    Vbus,
    /// Turn counter.
    RotationCount,
}

/// Every register in wire index order.
pub const REGISTERS: [Register; 15] = [
    Register::RunMode,
    Register::IqRef,
    Register::SpdRef,
    Register::LimitTorque,
    Register::CurKp,
    Register::CurKi,
    Register::CurFiltGain,
    Register::LocRef,
    Register::LimitSpd,
    Register::LimitCur,
    Register::MechPos,
    Register::Iqf,
    Register::MechVel,
    Register::Vbus,
    Register::RotationCount,
];

impl Register {
    pub const fn index(self) -> u16 {
        match self {
            Register::RunMode => 0x7005,
            Register::IqRef => 0x7006,
            Register::SpdRef => 0x700A,
            Register::LimitTorque => 0x700B,
            Register::CurKp => 0x7010,
            Register::CurKi => 0x7011,
            Register::CurFiltGain => 0x7014,
            Register::LocRef => 0x7016,
            Register::LimitSpd => 0x7017,
            Register::LimitCur => 0x7018,
            Register::MechPos => 0x7019,
            Register::Iqf => 0x701A,
            Register::MechVel => 0x701B,
            Register::Vbus => 0x701C,
            Register::RotationCount => 0x701D,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Register::RunMode => "run_mode",
            Register::IqRef => "iq_ref",
            Register::SpdRef => "spd_ref",
            Register::LimitTorque => "limit_torque",
            Register::CurKp => "cur_kp",
            Register::CurKi => "cur_ki",
            Register::CurFiltGain => "cur_filt_gain",
            Register::LocRef => "loc_ref",
            Register::LimitSpd => "limit_spd",
            Register::LimitCur => "limit_cur",
            Register::MechPos => "mech_pos",
            Register::Iqf => "iqf",
            Register::MechVel => "mech_vel",
            Register::Vbus => "vbus",
            Register::RotationCount => "rotation_count",
        }
    }

    pub const fn repr(self) -> Repr {
        match self {
            Register::RunMode => Repr::U8,
            Register::RotationCount => Repr::U16,
            _ => Repr::F32,
        }
    }

    /// Documented operating range, when the manual gives one.
    pub const fn limits(self) -> Option<Range> {
        match self {
            Register::IqRef => Some(fixed_point::CURRENT),
            Register::SpdRef | Register::MechVel => Some(fixed_point::VELOCITY),
            Register::LimitTorque => Some(Range::new(0.0, 12.0)),
            Register::CurFiltGain => Some(Range::new(0.0, 1.0)),
            Register::LimitSpd => Some(Range::new(0.0, 30.0)),
            Register::LimitCur => Some(Range::new(0.0, 23.0)),
            Register::Vbus => Some(Range::new(0.0, 60.0)),
            _ => None,
        }
    }

    pub fn from_index(index: u16) -> Result<Self, CodecError> {
        REGISTERS
            .iter()
            .copied()
            .find(|r| r.index() == index)
            .ok_or(CodecError::UnknownRegister(index))
    }

    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        REGISTERS
            .iter()
            .copied()
            .find(|r| r.name() == name)
            .ok_or(CodecError::UnknownRegisterName)
    }

    #[inline]
    pub fn decode(self, bytes: [u8; 4]) -> ParamValue {
        self.repr().decode(bytes)
    }

    #[inline]
    pub fn encode(self, value: ParamValue) -> [u8; 4] {
        self.repr().encode(value)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for Register {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register::from_name(s)
    }
}

/// Control loop selected through [`Register::RunMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[repr(u8)]
pub enum RunMode {
    /// Operation control, driven by mode 1 frames.
    Control = 0,
    Position = 1,
    Speed = 2,
    Current = 3,
}

impl RunMode {
    pub const ALL: [RunMode; 4] = [
        RunMode::Control,
        RunMode::Position,
        RunMode::Speed,
        RunMode::Current,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            RunMode::Control => "control",
            RunMode::Position => "position",
            RunMode::Speed => "speed",
            RunMode::Current => "current",
        }
    }
}

impl TryFrom<u32> for RunMode {
    type Error = CodecError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        RunMode::ALL
            .iter()
            .copied()
            .find(|m| *m as u32 == value)
            .ok_or(CodecError::InvalidRunMode(value))
    }
}

impl TryFrom<ParamValue> for RunMode {
    type Error = CodecError;

    fn try_from(value: ParamValue) -> Result<Self, Self::Error> {
        RunMode::try_from(value.as_u32())
    }
}

impl core::str::FromStr for RunMode {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RunMode::ALL
            .iter()
            .copied()
            .find(|m| m.name() == s)
            .ok_or(CodecError::UnknownRunModeName)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_are_unique_and_resolve() {
        for (i, reg) in REGISTERS.iter().enumerate() {
            assert_eq!(Register::from_index(reg.index()), Ok(*reg));
            assert_eq!(Register::from_name(reg.name()), Ok(*reg));
            assert!(REGISTERS[i + 1..].iter().all(|o| o.index() != reg.index()));
        }
    }

    #[test]
    fn unknown_lookups_fail() {
        assert_eq!(
            Register::from_index(0x7000),
            Err(CodecError::UnknownRegister(0x7000))
        );
        assert_eq!(
            "mechPos".parse::<Register>(),
            Err(CodecError::UnknownRegisterName)
        );
    }

    #[test]
    fn run_mode_is_one_padded_byte() {
        assert_eq!(Register::RunMode.encode(RunMode::Speed.into()), [2, 0, 0, 0]);
        assert_eq!(Register::RunMode.encode(ParamValue::Int(0x1FF)), [0xFF, 0, 0, 0]);
        assert_eq!(Register::RunMode.decode([3, 9, 9, 9]), ParamValue::Int(3));
    }

    #[test]
    fn floats_are_little_endian() {
        assert_eq!(
            Register::LimitCur.encode(ParamValue::Float(5.0)),
            5.0f32.to_le_bytes()
        );
        assert_eq!(
            Register::SpdRef.decode(1.0f32.to_le_bytes()),
            ParamValue::Float(1.0)
        );
        // integer input is widened to f32
        assert_eq!(
            Register::LocRef.encode(ParamValue::Int(2)),
            2.0f32.to_le_bytes()
        );
    }

    #[test]
    fn rotation_is_u16_le() {
        assert_eq!(
            Register::RotationCount.encode(ParamValue::Int(0x1234)),
            [0x34, 0x12, 0, 0]
        );
        assert_eq!(
            Register::RotationCount.decode([0x34, 0x12, 0xAA, 0xBB]),
            ParamValue::Int(0x1234)
        );
    }

    #[test]
    fn run_mode_values() {
        assert_eq!(RunMode::try_from(ParamValue::Int(1)), Ok(RunMode::Position));
        assert_eq!(RunMode::try_from(7u32), Err(CodecError::InvalidRunMode(7)));
        assert_eq!("current".parse::<RunMode>(), Ok(RunMode::Current));
    }

    #[test]
    fn limits_cover_documented_registers() {
        assert_eq!(Register::Vbus.limits(), Some(Range::new(0.0, 60.0)));
        assert!(Register::LimitCur.limits().is_some_and(|r| r.contains(5.0)));
        assert_eq!(Register::CurKp.limits(), None);
    }
}
