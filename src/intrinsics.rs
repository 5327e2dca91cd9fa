#![cfg(target_pointer_width = "64")]
#![cfg(feature = "intrinsics")]

#[inline(always)]
pub const fn bsf64(mask: u64) -> Option<usize> {
    if mask != 0 {
        Some(mask.trailing_zeros() as usize)
    } else {
        None
    }
}
