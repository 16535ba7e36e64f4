//! Splitting a free block on allocation, and coalescing on free.

use crate::heap::block::{Block, MIN_BLOCK_SIZE};
use crate::heap::freelist;
use crate::heap::region::Region;

/// Attempts to carve `blk` (a chosen free block of at least `request_size`
/// bytes) into a used prefix of `request_size + reserve_capacity` bytes
/// and a free suffix holding whatever is left over.
///
/// Returns the free suffix on success; the caller installs it on the free
/// list and increments `n_free`. Returns `None` if there isn't enough
/// slack to justify a split (including when `request_size +
/// reserve_capacity` doesn't even fit in `blk`, which can happen because
/// free-list search only guarantees `size(blk) >= request_size`, not
/// `>= request_size + reserve_capacity`): in that case `blk` is left
/// completely untouched and the whole block is handed to the caller.
pub fn try_split(
    mut blk: Block,
    request_size: usize,
    reserve_capacity: usize,
    min_split_size: usize,
) -> Option<Block> {
    let total = request_size + reserve_capacity;
    let leftover = blk.size().checked_sub(total)?;
    if leftover < min_split_size {
        return None;
    }

    blk.write_header_footer(total, 0);
    let mut suffix = blk.next();
    suffix.write_header_footer(leftover, 0);
    suffix.set_free_next(None);
    suffix.set_free_prev(None);
    Some(suffix)
}

/// Absorbs free predecessors of `blk`, recursively, stopping at the first
/// used block (the leading sentinel is always used, bounding the walk).
/// Each absorbed predecessor is detached from the free list and
/// `region.n_free` is decremented once per absorption; `blk` itself is
/// assumed free but not yet linked into the list.
pub fn merge_left(region: &mut Region, blk: Block) -> Block {
    let prev = blk.prev();
    if prev.is_used() {
        return blk;
    }
    freelist::remove(region, prev);
    region.n_free -= 1;

    let mut merged = prev;
    let new_size = prev.size() + blk.size();
    merged.write_header_footer(new_size, 0);
    merge_left(region, merged)
}

/// Absorbs free successors of `blk`, recursively, stopping at the
/// trailing terminator (always used, size zero). `blk` may already be
/// linked into the free list at this point (see `coalesce`); the
/// absorbed successor is unlinked using its own stored neighbors, which
/// is correct regardless of whether one of those neighbors happens to be
/// `blk` itself.
pub fn merge_right(region: &mut Region, mut blk: Block) -> Block {
    let next = blk.next();
    if next.is_used() {
        return blk;
    }
    freelist::remove(region, next);
    region.n_free -= 1;

    let new_size = blk.size() + next.size();
    blk.write_header_footer(new_size, 0);
    merge_right(region, blk)
}

/// The canonical sequence run on every free: merge left, reinsert the
/// merged span at the list head, merge right. Returns the final merged
/// block, already linked into the free list.
pub fn coalesce(region: &mut Region, blk: Block) -> Block {
    let merged = merge_left(region, blk);
    freelist::push_front(region, merged);
    merge_right(region, merged)
}
