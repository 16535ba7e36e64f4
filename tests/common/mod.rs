//! Shared fixtures for the integration test suite.

use std::collections::HashSet;
use tagalloc::{Config, Heap};

/// Region size small enough that a handful of allocations force more than
/// one region, without making every test pay for a megabyte mapping.
pub const SMALL_REGION_SIZE: usize = 8192;

/// A `Heap` with a shrunk-down configuration, for tests that want to
/// observe region creation/reclamation without huge allocation counts.
pub fn small_heap() -> Heap {
    Heap::new(Config {
        region_size: SMALL_REGION_SIZE,
        max_block_size: 2048,
        reserve_capacity: 0,
        min_split_size: 32,
        scribble_char: 0,
    })
}

/// A `Heap` with the compile-time default configuration.
pub fn default_heap() -> Heap {
    Heap::new(Config::default())
}

pub fn assert_all_pointers_unique(ptrs: &[*mut u8], context: &str) {
    let unique: HashSet<usize> = ptrs.iter().map(|p| *p as usize).collect();
    assert_eq!(
        unique.len(),
        ptrs.len(),
        "{}: expected {} unique pointers, got {}",
        context,
        ptrs.len(),
        unique.len()
    );
}

pub fn assert_aligned(ptr: *mut u8, align: usize, context: &str) {
    assert_eq!(
        (ptr as usize) % align,
        0,
        "{}: pointer {:#x} is not {}-byte aligned",
        context,
        ptr as usize,
        align
    );
}
