//! The allocator core: a `Heap` value owning the region list, the
//! configuration, and the counters.
//!
//! This is the concrete form of the design spec's "re-architected"
//! suggestion: rather than mutable statics for `root`/`config`/`counters`,
//! a `Heap` is an explicit, independently constructible value (primarily
//! useful for tests, which each want their own isolated region list). The
//! crate root (`lib.rs`) owns exactly one process-global `Heap` behind a
//! lazily-initialized, reentrancy-guarded cell and routes the public
//! four-call surface to it.

pub mod block;
pub mod freelist;
pub mod mmap;
pub mod region;
pub mod splitmerge;

use crate::allocator::large;
use crate::config::Config;
use crate::heap::block::Block;
use crate::heap::region::Region;
use crate::stats::Counters;
use crate::util::next16;
use std::ptr::NonNull;

pub struct Heap {
    root: Option<NonNull<Region>>,
    pub config: Config,
    pub counters: Counters,
}

impl Heap {
    pub fn new(config: Config) -> Self {
        Heap {
            root: None,
            config,
            counters: Counters::default(),
        }
    }

    pub fn allocate(&mut self, n: usize) -> *mut u8 {
        if n == 0 {
            return std::ptr::null_mut();
        }
        if n > self.config.max_block_size {
            return self.allocate_large(n);
        }
        self.allocate_small(n)
    }

    pub fn free(&mut self, p: *mut u8) {
        if p.is_null() {
            return;
        }
        let header = unsafe { Block::from_data_ptr(p) };
        if header.is_large() {
            self.free_large(p);
            return;
        }
        self.free_small(header);
    }

    pub fn allocate_zeroed(&mut self, count: usize, elem_size: usize) -> *mut u8 {
        if count == 0 || elem_size == 0 {
            return std::ptr::null_mut();
        }
        let total = match count.checked_mul(elem_size) {
            Some(t) => t,
            None => return std::ptr::null_mut(),
        };
        let ptr = self.allocate(total);
        if !ptr.is_null() {
            unsafe { std::ptr::write_bytes(ptr, 0, total) };
        }
        ptr
    }

    pub fn resize(&mut self, p: *mut u8, n: usize) -> *mut u8 {
        if p.is_null() {
            return self.allocate(n);
        }
        if n == 0 {
            self.free(p);
            return std::ptr::null_mut();
        }

        // `capacity` uses the same `size - 16` formula for both paths: a
        // small block's size minus header+footer, or a large block's
        // total mapping size minus its 16 bytes of header slack.
        let header = unsafe { Block::from_data_ptr(p) };
        let capacity = header.size() - 16;
        let comfortably_small = header.is_large() && n + 32 < self.config.max_block_size;

        if capacity > n && !comfortably_small {
            return p;
        }
        self.relocate(p, n, capacity)
    }

    pub fn resize_array(&mut self, p: *mut u8, count: usize, elem_size: usize) -> *mut u8 {
        crate::error::clear_last_error();
        let total = match checked_array_size(count, elem_size) {
            Some(t) => t,
            None => {
                crate::error::set_overflow();
                return std::ptr::null_mut();
            }
        };
        self.resize(p, total)
    }

    fn relocate(&mut self, old: *mut u8, n: usize, old_payload: usize) -> *mut u8 {
        let new_ptr = self.allocate(n);
        if new_ptr.is_null() {
            return std::ptr::null_mut();
        }
        let copy_len = old_payload.min(n);
        unsafe { std::ptr::copy_nonoverlapping(old, new_ptr, copy_len) };
        self.free(old);
        new_ptr
    }

    // --- small path ---

    fn allocate_small(&mut self, n: usize) -> *mut u8 {
        let s = next16(n);

        let mut outcome = freelist::find_free(self.root, s);
        if outcome.found.is_none() {
            if !self.create_region() {
                self.counters.regions_scanned += outcome.regions_scanned;
                self.counters.free_list_probes += outcome.blocks_probed;
                return std::ptr::null_mut();
            }
            outcome = freelist::find_free(self.root, s);
        }
        self.counters.regions_scanned += outcome.regions_scanned;
        self.counters.free_list_probes += outcome.blocks_probed;

        let (region_ptr, mut blk) = match outcome.found {
            Some(pair) => pair,
            None => return std::ptr::null_mut(),
        };
        let region = unsafe { &mut *region_ptr.as_ptr() };

        freelist::remove(region, blk);
        region.n_free -= 1;

        if let Some(suffix) = splitmerge::try_split(
            blk,
            s,
            self.config.reserve_capacity,
            self.config.min_split_size,
        ) {
            freelist::push_front(region, suffix);
            region.n_free += 1;
        }

        blk.mark_used();
        region.n_used += 1;
        self.counters.on_small_alloc(blk.size());
        blk.scribble(self.config.scribble_char);

        blk.data_ptr()
    }

    fn free_small(&mut self, mut blk: Block) {
        debug_assert!(blk.is_used(), "double free or corruption: block already free");

        let region_ptr = region::to_region(blk.header_ptr(), self.config.region_size);
        let region = unsafe { &mut *region_ptr.as_ptr() };

        self.counters.on_small_free(blk.size());
        blk.mark_free();
        blk.set_free_next(None);
        blk.set_free_prev(None);
        region.n_free += 1;
        region.n_used -= 1;

        splitmerge::coalesce(region, blk);

        debug_assert_eq!(
            freelist::len(region),
            region.n_free,
            "free list length drifted from n_free"
        );

        if region.n_used == 0 {
            self.reclaim_region(region_ptr);
        }
    }

    fn create_region(&mut self) -> bool {
        match Region::create(self.config.region_size) {
            Ok(mut region_ptr) => {
                unsafe { region_ptr.as_mut() }.next = self.root;
                if let Some(mut old_root) = self.root {
                    unsafe { old_root.as_mut() }.prev = Some(region_ptr);
                }
                self.root = Some(region_ptr);
                self.counters.on_region_alloc(self.config.region_size);
                log::debug!("mapped a new region ({} bytes)", self.config.region_size);
                true
            }
            Err(err) => {
                log::warn!("region creation failed: {}", err);
                false
            }
        }
    }

    fn reclaim_region(&mut self, region_ptr: NonNull<Region>) {
        let region = unsafe { region_ptr.as_ref() };
        if let Some(mut prev) = region.prev {
            unsafe { prev.as_mut() }.next = region.next;
        }
        if let Some(mut next) = region.next {
            unsafe { next.as_mut() }.prev = region.prev;
        }
        if self.root == Some(region_ptr) {
            self.root = region.next;
        }

        match Region::destroy(region_ptr, self.config.region_size) {
            Ok(()) => {
                self.counters.on_region_free(self.config.region_size);
                log::debug!("reclaimed an empty region");
            }
            Err(err) => log::warn!("failed to unmap reclaimed region: {}", err),
        }
    }

    // --- large path ---

    fn allocate_large(&mut self, n: usize) -> *mut u8 {
        match large::allocate(n, self.config.scribble_char) {
            Ok((ptr, total)) => {
                self.counters.on_large_alloc(total);
                ptr
            }
            Err(err) => {
                log::warn!("large allocation of {} bytes failed: {}", n, err);
                std::ptr::null_mut()
            }
        }
    }

    fn free_large(&mut self, p: *mut u8) {
        match large::free(p) {
            Ok(total) => self.counters.on_large_free(total),
            Err(err) => log::warn!("failed to unmap large block: {}", err),
        }
    }
}

fn checked_array_size(count: usize, elem_size: usize) -> Option<usize> {
    let product = count.checked_mul(elem_size)?;
    if count != 0 && product / count != elem_size {
        return None;
    }
    Some(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            region_size: 4096,
            max_block_size: 2048,
            reserve_capacity: 0,
            min_split_size: 32,
            scribble_char: 0,
        }
    }

    // S1
    #[test]
    fn two_small_allocations_land_in_the_same_region_next16_apart() {
        let mut heap = Heap::new(test_config());
        let p1 = heap.allocate(24);
        let p2 = heap.allocate(24);
        assert!(!p1.is_null() && !p2.is_null());
        assert_ne!(p1, p2);
        assert_eq!((p2 as usize).abs_diff(p1 as usize), next16(24));
    }

    // S2
    #[test]
    fn freeing_then_reallocating_the_same_size_reuses_the_block() {
        let mut heap = Heap::new(test_config());
        let p1 = heap.allocate(24);
        heap.free(p1);
        let p2 = heap.allocate(24);
        assert_eq!(p1, p2);
    }

    // S3
    #[test]
    fn freeing_every_block_in_a_region_reclaims_it() {
        let mut heap = Heap::new(test_config());
        let p1 = heap.allocate(24);
        let p2 = heap.allocate(24);
        let p3 = heap.allocate(24);
        let frees_before = heap.counters.region_frees;

        heap.free(p2);
        heap.free(p1);
        heap.free(p3);

        assert_eq!(heap.counters.region_frees, frees_before + 1);
        assert_eq!(heap.root, None);
    }

    // S4
    #[test]
    fn large_requests_get_their_own_mapping() {
        let mut heap = Heap::new(test_config());
        let p = heap.allocate(8192);
        assert!(!p.is_null());
        assert_eq!(heap.counters.large_allocs, 1);

        let frees_before = heap.counters.large_frees;
        heap.free(p);
        assert_eq!(heap.counters.large_frees, frees_before + 1);
    }

    // S5
    #[test]
    fn shrinking_a_small_block_in_place_preserves_content() {
        let mut heap = Heap::new(test_config());
        let p = heap.allocate(100);
        unsafe { std::ptr::write_bytes(p, 0xAB, 100) };
        let q = heap.resize(p, 50);
        assert_eq!(p, q);
        let bytes = unsafe { std::slice::from_raw_parts(q, 50) };
        assert!(bytes.iter().all(|&b| b == 0xAB));
    }

    // S6
    #[test]
    fn resize_array_overflow_leaves_pointer_untouched_and_sets_error() {
        let mut heap = Heap::new(test_config());
        let result = heap.resize_array(std::ptr::null_mut(), usize::MAX, 2);
        assert!(result.is_null());
        assert_eq!(crate::error::last_error(), Some(crate::error::AllocError::Overflow));
    }

    #[test]
    fn resize_array_overflow_returns_null_but_does_not_free_the_original_block() {
        let mut heap = Heap::new(test_config());
        let p = heap.allocate(32);
        unsafe { std::ptr::write_bytes(p, 0x77, 32) };

        let result = heap.resize_array(p, usize::MAX, 2);

        assert!(result.is_null());
        assert_eq!(crate::error::last_error(), Some(crate::error::AllocError::Overflow));
        let bytes = unsafe { std::slice::from_raw_parts(p, 32) };
        assert!(bytes.iter().all(|&b| b == 0x77));
        heap.free(p);
    }

    #[test]
    fn zero_size_allocate_returns_null() {
        let mut heap = Heap::new(test_config());
        assert!(heap.allocate(0).is_null());
    }

    #[test]
    fn free_of_null_is_a_no_op() {
        let mut heap = Heap::new(test_config());
        heap.free(std::ptr::null_mut());
    }

    #[test]
    fn zero_allocate_zeroes_the_payload() {
        let mut heap = Heap::new(test_config());
        let p = heap.allocate(64);
        unsafe { std::ptr::write_bytes(p, 0xFF, 64) };
        heap.free(p);

        let q = heap.allocate_zeroed(8, 8);
        let bytes = unsafe { std::slice::from_raw_parts(q, 64) };
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn resize_of_null_pointer_allocates() {
        let mut heap = Heap::new(test_config());
        let p = heap.resize(std::ptr::null_mut(), 32);
        assert!(!p.is_null());
    }

    #[test]
    fn resize_to_zero_frees_and_returns_null() {
        let mut heap = Heap::new(test_config());
        let p = heap.allocate(32);
        let q = heap.resize(p, 0);
        assert!(q.is_null());
    }

    #[test]
    fn growing_past_capacity_relocates_and_copies() {
        let mut heap = Heap::new(test_config());
        let p = heap.allocate(16);
        unsafe { std::ptr::write_bytes(p, 0x7E, 16) };
        let q = heap.resize(p, 500);
        assert_ne!(p, q);
        let bytes = unsafe { std::slice::from_raw_parts(q, 16) };
        assert!(bytes.iter().all(|&b| b == 0x7E));
    }
}
