//! Byte-level lookup table and bit-scan helpers used by [`ScanIter`](crate::ScanIter).
#![cfg(target_pointer_width = "64")]

/// Width of one slot in a packed entry of [`BIT_POSITIONS`].
pub const SLOT_LEN: u32 = 4;

const SLOT_MASK: u32 = (1 << SLOT_LEN) - 1;

/// Positions of set bits for every byte value.
///
/// `BIT_POSITIONS[b]` packs the positions of the set bits of `b` in ascending order,
/// one per 4-bit slot starting from the least significant slot.
/// Each slot stores a *one-based* position (i.e., `1..=8`) so that an all-zero
/// remainder always means that every position has been consumed.
///
/// # Examples
///
/// ```
/// use bitscan::broadword::{lowest_slot, pop_slot, BIT_POSITIONS};
///
/// let packed = BIT_POSITIONS[0b1010_0001];
/// assert_eq!(lowest_slot(packed), 1);
///
/// let packed = pop_slot(packed);
/// assert_eq!(lowest_slot(packed), 6);
///
/// let packed = pop_slot(packed);
/// assert_eq!(lowest_slot(packed), 8);
/// assert_eq!(pop_slot(packed), 0);
/// ```
pub static BIT_POSITIONS: [u32; 256] = build_bit_positions();

const fn build_bit_positions() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut byte = 1;
    while byte < 256 {
        let mut packed = 0u32;
        let mut slot = 0;
        let mut pos = 0;
        while pos < 8 {
            if (byte >> pos) & 1 == 1 {
                packed |= (pos as u32 + 1) << (slot * SLOT_LEN);
                slot += 1;
            }
            pos += 1;
        }
        table[byte] = packed;
        byte += 1;
    }
    table
}

/// Returns the lowest (one-based) slot value of a packed entry.
#[inline(always)]
pub const fn lowest_slot(packed: u32) -> usize {
    (packed & SLOT_MASK) as usize
}

/// Discards the lowest slot of a packed entry.
#[inline(always)]
pub const fn pop_slot(packed: u32) -> u32 {
    packed >> SLOT_LEN
}

/// Returns the shift that moves the lowest nonzero byte of `x` to the bottom,
/// i.e., a multiple of 8 in `0..=56`.
///
/// The byte is found by a binary search over halves of 32, 16 and 8 bits,
/// so it takes at most three comparisons.
///
/// # Arguments
///
/// - `x`: Nonzero word.
///
/// # Examples
///
/// ```
/// use bitscan::broadword::lowest_byte_shift;
///
/// assert_eq!(lowest_byte_shift(0b1), 0);
/// assert_eq!(lowest_byte_shift(0x100), 8);
/// assert_eq!(lowest_byte_shift(0x8000_0000_0000_0000), 56);
/// ```
#[inline(always)]
pub fn lowest_byte_shift(x: u64) -> usize {
    debug_assert_ne!(x, 0);
    #[cfg(feature = "intrinsics")]
    {
        crate::intrinsics::bsf64(x).map_or(0, |i| i & !7)
    }
    #[cfg(not(feature = "intrinsics"))]
    {
        let mut x = x;
        let mut shift = 0;
        if x & 0xFFFF_FFFF == 0 {
            x >>= 32;
            shift += 32;
        }
        if x & 0xFFFF == 0 {
            x >>= 16;
            shift += 16;
        }
        if x & 0xFF == 0 {
            shift += 8;
        }
        shift
    }
}
