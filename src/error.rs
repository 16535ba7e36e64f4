//! Error types.
//!
//! The public four-call surface never returns a `Result`: allocation
//! failure is a null pointer, overflow in `resize_array` is a process-wide
//! errno-style slot (see [`last_error`]), and invariant violations abort
//! the process. [`MappingError`] exists for the internal plumbing below
//! that surface (region creation, unmapping, configuration loading), so
//! those helpers can compose with `?` instead of hand-rolled sentinels.

use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

/// Errors from the internal helpers beneath the public surface.
///
/// Never crosses the public four-call boundary itself.
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("kernel rejected a virtual memory mapping of {requested} bytes")]
    MapFailed { requested: usize },

    #[error("failed to unmap {size} bytes at {addr:#x}")]
    UnmapFailed { addr: usize, size: usize },

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, MappingError>;

/// The process-wide errno-style slot set by `resize_array` on overflow.
///
/// Mirrors the C original's convention of setting `errno = ENOMEM` on a
/// detected `count * elem_size` overflow. Single-threaded per the crate's
/// concurrency model, but kept atomic so the slot lives in a `static`
/// without extra synchronization machinery.
static LAST_ERROR: AtomicU8 = AtomicU8::new(0);

const ERROR_NONE: u8 = 0;
const ERROR_OVERFLOW: u8 = 1;

/// A condition observable through [`last_error`] after a public call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// `resize_array`'s `count * elem_size` overflowed.
    Overflow,
}

/// Reads the errno-style slot without clearing it.
pub fn last_error() -> Option<AllocError> {
    match LAST_ERROR.load(Ordering::Relaxed) {
        ERROR_OVERFLOW => Some(AllocError::Overflow),
        _ => None,
    }
}

pub(crate) fn set_overflow() {
    LAST_ERROR.store(ERROR_OVERFLOW, Ordering::Relaxed);
}

pub(crate) fn clear_last_error() {
    LAST_ERROR.store(ERROR_NONE, Ordering::Relaxed);
}
