//! Extended CAN identifier as the AT bridge carries it.
//!
//! The 29-bit CAN id is `mode[28..24] | aux[23..8] | node[7..0]`. The bridge
//! shifts it up by 3 and reserves the low bits for its own flags, which are
//! always `0b100` (extended frame, data frame).

/// Bridge flag bits below the CAN id.
pub const BRIDGE_MARKER: u32 = 0b100;
const MARKER_BITS: u32 = 3;

/// Pack the identifier sub-fields into the 32-bit bridge value.
#[inline]
pub const fn pack(command_mode: u8, aux_field: u16, node_id: u8) -> u32 {
    let can_id = (command_mode as u32) << 24 | (aux_field as u32) << 8 | node_id as u32;
    can_id << MARKER_BITS | BRIDGE_MARKER
}

/// Split a bridge identifier into `(command_mode, aux_field, node_id)`.
///
/// The marker bits are discarded, not checked; see [`has_bridge_marker`].
#[inline]
pub const fn unpack(raw: u32) -> (u8, u16, u8) {
    let can_id = raw >> MARKER_BITS;
    (
        ((can_id >> 24) & 0xFF) as u8,
        ((can_id >> 8) & 0xFFFF) as u16,
        (can_id & 0xFF) as u8,
    )
}

#[inline]
pub const fn has_bridge_marker(raw: u32) -> bool {
    (raw & ((1 << MARKER_BITS) - 1)) == BRIDGE_MARKER
}
