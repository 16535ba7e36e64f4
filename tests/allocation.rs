//! End-to-end allocation behavior exercised through the public surface.

mod common;

use common::{assert_aligned, assert_all_pointers_unique, default_heap, small_heap};

/// A freshly allocated block is non-null and 16-byte aligned.
///
/// **Invariant:** every payload pointer returned by `allocate` satisfies
/// the boundary-tag layout's 16-byte block alignment.
#[test]
fn allocation_returns_aligned_pointer() {
    let mut heap = default_heap();
    for &size in &[1, 7, 8, 15, 16, 31, 32, 64, 127, 128, 255, 256, 4096] {
        let p = heap.allocate(size);
        assert!(!p.is_null(), "allocation of {} bytes returned null", size);
        assert_aligned(p, 16, &format!("{}-byte allocation", size));
        heap.free(p);
    }
}

/// Sequential allocations never alias each other while they're all live.
#[test]
fn sequential_allocations_are_unique() {
    let mut heap = small_heap();
    let ptrs: Vec<*mut u8> = (0..200).map(|_| heap.allocate(48)).collect();
    assert_all_pointers_unique(&ptrs, "sequential allocations");
    for p in ptrs {
        heap.free(p);
    }
}

/// Interleaving small and large requests must not corrupt either path's
/// bookkeeping.
///
/// **Bug this would catch:** a shared header-recovery bug that assumes
/// every pointer came from the small path (or vice versa).
#[test]
fn interleaved_small_and_large_allocations_stay_independent() {
    let mut heap = small_heap();
    let mut ptrs = Vec::new();
    for i in 0..40 {
        let size = if i % 2 == 0 { 24 } else { 4096 };
        ptrs.push(heap.allocate(size));
    }
    assert_all_pointers_unique(&ptrs, "interleaved allocations");
    assert!(heap.counters.small_allocs > 0);
    assert!(heap.counters.large_allocs > 0);

    for p in ptrs {
        heap.free(p);
    }
    assert_eq!(heap.counters.small_allocs, heap.counters.small_frees);
    assert_eq!(heap.counters.large_allocs, heap.counters.large_frees);
}

/// Filling a region to capacity and freeing every block reclaims it,
/// and a subsequent allocation maps a fresh one rather than reusing
/// stale bookkeeping.
#[test]
fn region_lifecycle_survives_repeated_fill_and_drain() {
    let mut heap = small_heap();
    for _round in 0..5 {
        let ptrs: Vec<*mut u8> = (0..20).map(|_| heap.allocate(64)).collect();
        for p in ptrs {
            heap.free(p);
        }
    }
    assert_eq!(heap.counters.region_allocs, heap.counters.region_frees);
    assert_eq!(heap.counters.bytes_used, 0);
}

/// `allocate_zeroed` always hands back a zero-filled payload, even when
/// the backing block is one that previously held nonzero bytes.
#[test]
fn zeroed_allocation_is_zero_even_after_reusing_a_dirty_block() {
    let mut heap = small_heap();
    let p = heap.allocate(64);
    unsafe { std::ptr::write_bytes(p, 0xFF, 64) };
    heap.free(p);

    let q = heap.allocate_zeroed(8, 8);
    assert_eq!(p, q, "expected the freed block to be reused");
    let bytes = unsafe { std::slice::from_raw_parts(q, 64) };
    assert!(bytes.iter().all(|&b| b == 0));
    heap.free(q);
}

/// `resize_array` overflow returns null but leaves the original
/// allocation completely untouched: same memory, same content, not freed.
#[test]
fn resize_array_overflow_does_not_disturb_existing_allocation() {
    let mut heap = small_heap();
    let p = heap.allocate(64);
    unsafe { std::ptr::write_bytes(p, 0x42, 64) };

    let result = heap.resize_array(p, usize::MAX, 3);
    assert!(result.is_null());
    assert_eq!(
        tagalloc::last_error(),
        Some(tagalloc::AllocError::Overflow)
    );

    let bytes = unsafe { std::slice::from_raw_parts(p, 64) };
    assert!(bytes.iter().all(|&b| b == 0x42));
    heap.free(p);
}

/// A long chain of grow-resizes each preserves the previously written
/// prefix across however many relocations it took.
#[test]
fn chained_growth_preserves_content_across_relocations() {
    let mut heap = small_heap();
    let mut p = heap.allocate(16);
    unsafe { std::ptr::write_bytes(p, 0x99, 16) };

    for new_size in [64, 256, 1024, 4096] {
        p = heap.resize(p, new_size);
        assert!(!p.is_null());
        let bytes = unsafe { std::slice::from_raw_parts(p, 16) };
        assert!(bytes.iter().all(|&b| b == 0x99));
    }
    heap.free(p);
}
