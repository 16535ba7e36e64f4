//! A single-threaded, region-based boundary-tag heap allocator.
//!
//! Small requests are carved out of fixed-size, region-aligned `mmap`
//! mappings via an explicit per-region free list (first-fit, MRU-ordered,
//! eagerly coalesced). Large requests bypass the region machinery
//! entirely and get a standalone mapping each. See `heap` for the core
//! and `allocator::large` for the large path.
//!
//! The public surface is the conventional four calls plus their
//! zero-initializing and overflow-checked variants: [`allocate`],
//! [`free`], [`allocate_zeroed`], [`resize`], [`resize_array`]. They
//! route to one lazily-initialized, process-global [`heap::Heap`].
//! Constructing a `Heap` directly (as the test suite does) bypasses the
//! global instance entirely and gives full control over configuration.
//!
//! The core (`heap::Heap` and everything it calls) assumes single-threaded
//! use: no locks, no atomics, coalescing and region bookkeeping run
//! unsynchronized. The process-global instance behind the public surface
//! is still reachable from multiple threads in the narrow sense that a
//! `Mutex` serializes their calls rather than racing, but the crate makes
//! no attempt to reduce contention or offer per-thread pools. Treat the
//! public surface as single-threaded in spirit even where it happens to
//! be safe in practice.

pub mod allocator;
pub mod config;
pub mod error;
pub mod heap;
pub mod stats;
pub mod util;

pub use config::Config;
pub use error::{last_error, AllocError};
pub use heap::Heap;
pub use stats::Counters;

use std::sync::Mutex;

// Safety: `Heap` owns raw pointers into its own mapped regions and is not
// `Send` by default. The crate provides no multi-threaded safety for the
// heap's internal algorithms (see module docs), but wrapping the single
// process-global instance in a `Mutex` is a standard, sound way to expose
// *a* global singleton from safe Rust: the mutex gives exclusive access
// to whichever thread holds the lock, which is sufficient for `Heap`'s
// internals (built with no concurrency assumptions) to run correctly.
// Concurrent callers will simply serialize on the lock rather than
// overlap; this is a stronger guarantee than the crate promises, not a
// weaker one.
unsafe impl Send for Heap {}

static GLOBAL: Mutex<Option<Heap>> = Mutex::new(None);

fn with_heap<R>(f: impl FnOnce(&mut Heap) -> R) -> R {
    let mut slot = GLOBAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if slot.is_none() {
        let config = Config::from_env();
        log::debug!("initializing heap with {:?}", config);
        *slot = Some(Heap::new(config));
    }
    f(slot.as_mut().unwrap())
}

/// Allocates `n` bytes and returns a 16-byte-aligned payload pointer, or
/// null if `n` is zero or the request cannot be satisfied.
pub fn allocate(n: usize) -> *mut u8 {
    with_heap(|heap| heap.allocate(n))
}

/// Releases a pointer previously returned by [`allocate`], [`resize`], or
/// [`resize_array`]. A null pointer is a no-op.
pub fn free(p: *mut u8) {
    with_heap(|heap| heap.free(p))
}

/// Allocates space for `count` elements of `elem_size` bytes each and
/// zeroes it. Null if either argument is zero, `count * elem_size`
/// overflows, or the request cannot be satisfied.
pub fn allocate_zeroed(count: usize, elem_size: usize) -> *mut u8 {
    with_heap(|heap| heap.allocate_zeroed(count, elem_size))
}

/// Resizes the allocation at `p` to `n` bytes, preserving the first
/// `min(old_capacity, n)` bytes. A null `p` behaves like [`allocate`]; a
/// zero `n` behaves like [`free`] and returns null.
pub fn resize(p: *mut u8, n: usize) -> *mut u8 {
    with_heap(|heap| heap.resize(p, n))
}

/// Like [`resize`], but computes the new size as `count * elem_size` and
/// checks for overflow first. On overflow, returns null, leaves the
/// original allocation at `p` untouched, and records
/// [`AllocError::Overflow`] (see [`last_error`]).
pub fn resize_array(p: *mut u8, count: usize, elem_size: usize) -> *mut u8 {
    with_heap(|heap| heap.resize_array(p, count, elem_size))
}

/// A read-only snapshot of the process-global heap's counters.
pub fn counters() -> Counters {
    with_heap(|heap| heap.counters)
}
