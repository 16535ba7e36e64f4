//! Alignment helpers for the boundary-tag layout.
//!
//! Both functions here reproduce bit tricks from the reference allocator
//! rather than the more familiar "round up, unless already aligned" helper:
//! they always advance to the *next* 16-byte boundary, even when the input
//! is already aligned. Region layout depends on that unconditional advance
//! (see `heap::region::Region::create`), so do not "fix" it into an
//! idempotent rounding function.

/// Smallest multiple of 16 strictly greater than `size` once header and
/// footer overhead (32 bytes total) are folded in.
///
/// Used to translate a caller's byte request into a block footprint.
pub fn next16(size: usize) -> usize {
    16 + (size | 15) + 1
}

/// Smallest address strictly greater than `addr` that is congruent to 0
/// mod 16.
pub fn align16(addr: usize) -> usize {
    (addr | 15) + 1
}
