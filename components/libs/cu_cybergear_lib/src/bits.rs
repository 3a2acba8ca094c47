//! Inclusive bit-range helpers. Bit 0 is the least significant bit.

/// Extract bits `lo..=hi` of `value`, shifted down to bit 0.
///
/// `hi` past bit 31 is clamped to 31. An empty range (`lo > hi`, or `lo`
/// past bit 31) yields 0.
#[inline]
pub const fn extract_bits(value: u32, lo: u8, hi: u8) -> u32 {
    let hi = if hi > 31 { 31 } else { hi };
    if lo > hi {
        return 0;
    }
    let width = (hi - lo + 1) as u32;
    let mask = if width >= 32 {
        u32::MAX
    } else {
        ((1u32 << width) - 1) << lo
    };
    (value & mask) >> lo
}

/// `true` when bit `n` of `value` is set.
#[inline]
pub const fn bit(value: u32, n: u8) -> bool {
    extract_bits(value, n, n) == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_middle_byte() {
        assert_eq!(extract_bits(0x1234_5678, 8, 15), 0x56);
    }

    #[test]
    fn extracts_single_bits() {
        assert_eq!(extract_bits(0b1111_0000, 4, 4), 1);
        assert_eq!(extract_bits(0b1111_0000, 3, 3), 0);
        assert!(bit(0b1111_0000, 7));
        assert!(!bit(0b1111_0000, 0));
    }

    #[test]
    fn full_width_range_is_identity() {
        assert_eq!(extract_bits(0xDEAD_BEEF, 0, 31), 0xDEAD_BEEF);
        assert_eq!(extract_bits(0x8000_0000, 31, 31), 1);
    }

    #[test]
    fn empty_or_oversized_ranges() {
        assert_eq!(extract_bits(0xFFFF_FFFF, 8, 4), 0);
        assert_eq!(extract_bits(0xFFFF_FFFF, 32, 40), 0);
        assert_eq!(extract_bits(0xF000_0000, 28, 40), 0xF);
        assert!(!bit(0xFFFF_FFFF, 32));
    }
}
