//! Shared address arithmetic.
//!
//! Pure functions over machine integers: alignment rounding and the
//! size/flag bit-packing used by every block header. Nothing here touches
//! memory; see `heap::block` for the header/footer codec built on top of it.

pub mod alignment;

pub use alignment::{align16, next16};

/// Size of a machine word (pointer width) on the target, in bytes.
pub const WORD: usize = std::mem::size_of::<usize>();

/// Combined size of a block's header and footer words.
pub const HEADER_FOOTER: usize = 2 * WORD;
