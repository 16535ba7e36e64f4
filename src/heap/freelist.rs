//! Per-region explicit free list.
//!
//! Threaded through free blocks' payload area (`next` at offset 0,
//! `prev` at offset one word), MRU-ordered: newly freed or newly split
//! blocks become the new head. First-fit search walks the global region
//! list starting at `root`.
//!
//! This module implements the clean contract of the design spec's
//! splitting/merging section directly, rather than porting the reference
//! allocator's `mergeRight`, which has two documented bugs (an
//! unconditional successor dereference before a null check, and a
//! hard-to-reach branch conflating "successor is this block" with
//! "successor is absent"). `remove` below is self-contained: it patches
//! a detached block's own stored neighbors, which is correct regardless
//! of whether the caller's block is itself currently linked into the
//! list.

use crate::heap::block::Block;
use crate::heap::region::Region;
use std::ptr::NonNull;

/// Pushes `blk` onto the front of `region`'s free list. Does not touch
/// `region.n_free`; callers account for that themselves since the same
/// primitive is used both for newly freed blocks and newly split
/// suffixes, which have different counter semantics.
pub fn push_front(region: &mut Region, mut blk: Block) {
    blk.set_free_prev(None);
    blk.set_free_next(region.block_list);
    if let Some(mut old_head) = region.block_list {
        old_head.set_free_prev(Some(blk));
    }
    region.block_list = Some(blk);
}

/// Detaches `blk` from whatever free list it is linked into, using its
/// own stored `next`/`prev` pointers. Safe to call even if `blk` is the
/// current head.
pub fn remove(region: &mut Region, blk: Block) {
    let prev = blk.free_prev();
    let next = blk.free_next();
    match prev {
        Some(mut p) => p.set_free_next(next),
        None => region.block_list = next,
    }
    if let Some(mut n) = next {
        n.set_free_prev(prev);
    }
}

/// Outcome of a first-fit search: the match, if any, plus how much work
/// it took, surfaced to the counters record.
pub struct FindFreeOutcome {
    pub found: Option<(NonNull<Region>, Block)>,
    pub regions_scanned: u64,
    pub blocks_probed: u64,
}

/// First-fit search across the global region list starting at `root`.
/// Returns the first free block whose size is at least `desired`,
/// together with the region that owns it.
pub fn find_free(root: Option<NonNull<Region>>, desired: usize) -> FindFreeOutcome {
    let mut regions_scanned = 0u64;
    let mut blocks_probed = 0u64;
    let mut cursor = root;
    while let Some(region_ptr) = cursor {
        regions_scanned += 1;
        let region = unsafe { region_ptr.as_ref() };
        if region.n_free > 0 {
            let mut blk_cursor = region.block_list;
            while let Some(blk) = blk_cursor {
                blocks_probed += 1;
                if blk.size() >= desired {
                    return FindFreeOutcome {
                        found: Some((region_ptr, blk)),
                        regions_scanned,
                        blocks_probed,
                    };
                }
                blk_cursor = blk.free_next();
            }
        }
        cursor = region.next;
    }
    FindFreeOutcome {
        found: None,
        regions_scanned,
        blocks_probed,
    }
}

/// Length of `region`'s free list, for invariant checking.
pub fn len(region: &Region) -> usize {
    let mut count = 0;
    let mut cursor = region.block_list;
    while let Some(blk) = cursor {
        count += 1;
        cursor = blk.free_next();
    }
    count
}
