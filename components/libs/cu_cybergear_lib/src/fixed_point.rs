//! Linear quantisation of bounded real values onto unsigned integers.
//!
//! A value is clamped to its [`Range`], mapped onto `0..=2^(8*width)-1` and
//! truncated. Out of range input is not an error: the device tolerates it and
//! so does the encoder.

/// Inclusive `[lo, hi]` range of a physical quantity.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Range {
    pub lo: f64,
    pub hi: f64,
}

impl Range {
    pub const fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lo && value <= self.hi
    }

    /// Size of one quantisation step for the given width.
    #[inline]
    pub fn step(&self, width: u8) -> f64 {
        (self.hi - self.lo) / max_raw(width) as f64
    }
}

/// Mechanical position, rad (about ±4π).
pub const POSITION: Range = Range::new(-12.5, 12.5);
/// Mechanical velocity, rad/s.
pub const VELOCITY: Range = Range::new(-30.0, 30.0);
/// Torque, N·m.
pub const TORQUE: Range = Range::new(-12.0, 12.0);
/// Position gain.
pub const KP: Range = Range::new(0.0, 500.0);
/// Velocity gain.
pub const KD: Range = Range::new(0.0, 5.0);
/// Phase current, A.
pub const CURRENT: Range = Range::new(-23.0, 23.0);

/// Largest raw value representable in `width` bytes (1 to 4).
#[inline]
pub const fn max_raw(width: u8) -> u32 {
    match width {
        0 | 1 => u8::MAX as u32,
        2 => u16::MAX as u32,
        3 => 0x00FF_FFFF,
        _ => u32::MAX,
    }
}

/// Quantise `value` into `width` bytes over `range`.
pub fn encode(value: f64, range: Range, width: u8) -> u32 {
    debug_assert!((1..=4).contains(&width), "width must be 1..=4 bytes");
    // NaN fails both comparisons and lands on lo.
    let clamped = if value >= range.hi {
        range.hi
    } else if value > range.lo {
        value
    } else {
        range.lo
    };
    let ratio = (clamped - range.lo) / (range.hi - range.lo);
    (ratio * max_raw(width) as f64) as u32
}

/// Inverse of [`encode`].
pub fn decode(raw: u32, range: Range, width: u8) -> f64 {
    debug_assert!((1..=4).contains(&width), "width must be 1..=4 bytes");
    let ratio = raw as f64 / max_raw(width) as f64;
    ratio * (range.hi - range.lo) + range.lo
}

/// Two byte helpers, the width every control and status field uses.
#[inline]
pub fn encode_u16(value: f64, range: Range) -> u16 {
    encode(value, range, 2) as u16
}

#[inline]
pub fn decode_u16(raw: u16, range: Range) -> f64 {
    decode(raw as u32, range, 2)
}

/// Temperature is reported in tenths of a degree Celsius, no range.
#[inline]
pub fn decode_temperature(raw: u16) -> f64 {
    raw as f64 / 10.0
}
