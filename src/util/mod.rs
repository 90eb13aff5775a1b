//! Internal size arithmetic shared by the buffer and the pool.
//!
//! It is an implementation detail and not part of the public API.

/// Largest backing store a `Vec<u8>` can hold.
pub(crate) const MAX_CAPACITY: usize = isize::MAX as usize;

/// Rounds `n` up to a multiple of `granule`.
///
/// Returns `None` on overflow or when the result exceeds [`MAX_CAPACITY`].
pub(crate) fn round_up(n: usize, granule: usize) -> Option<usize> {
    debug_assert!(granule > 0);
    let rounded = n.div_ceil(granule).checked_mul(granule)?;
    (rounded <= MAX_CAPACITY).then_some(rounded)
}

/// Rounds `hint` up to the next power-of-two multiple of `granule`.
///
/// A hint of zero yields one granule.
pub(crate) fn round_up_pow2_multiple(hint: usize, granule: usize) -> Option<usize> {
    let multiple = hint.div_ceil(granule).max(1).checked_next_power_of_two()?;
    let rounded = multiple.checked_mul(granule)?;
    (rounded <= MAX_CAPACITY).then_some(rounded)
}
