//! Region records and their lifecycle.
//!
//! A region is a region-aligned, region-sized mapping carved into a
//! leading sentinel, one large free block, and a trailing zero-sized
//! terminator at creation time. The region record itself lives in the
//! mapping's first bytes.

use crate::error::MappingError;
use crate::heap::block::Block;
use crate::heap::mmap;
use crate::util::{align16, WORD};
use std::mem;
use std::ptr::NonNull;

pub const USED_BIT: usize = 0b01;

#[repr(C)]
pub struct Region {
    /// The region's leading sentinel block.
    pub start: Block,
    /// Head of this region's free list (see `heap::freelist`).
    pub block_list: Option<Block>,
    pub n_free: usize,
    pub n_used: usize,
    pub next: Option<NonNull<Region>>,
    pub prev: Option<NonNull<Region>>,
}

impl Region {
    /// Maps a fresh, region-aligned region and lays out its sentinel,
    /// initial free block, and terminator. Does not link the region into
    /// any list; the caller threads it at `root`.
    pub fn create(region_size: usize) -> Result<NonNull<Region>, MappingError> {
        let base = mmap::map_region_aligned(region_size)?;
        let base_addr = base as usize;

        // The first real block's payload must start 16-byte aligned;
        // align16 always advances past an already-aligned input, which is
        // exactly what's needed here since the data pointer is computed
        // from a byte offset, not re-derived from a known-aligned base.
        let blk_data = align16(base_addr + mem::size_of::<Region>() + WORD);
        let next_data = align16(blk_data);
        let sentinel_size = next_data - blk_data;

        let mut sentinel = unsafe { Block::from_data_ptr(blk_data as *mut u8) };
        sentinel.write_header_footer(sentinel_size, USED_BIT);

        let mut free_blk = unsafe { Block::from_data_ptr(next_data as *mut u8) };
        let free_size = (base_addr + region_size) - next_data;
        free_blk.write_header_footer(free_size, 0);
        free_blk.set_free_next(None);
        free_blk.set_free_prev(None);

        let mut terminator = free_blk.next();
        terminator.write_terminator();

        let region_ptr = base as *mut Region;
        unsafe {
            region_ptr.write(Region {
                start: sentinel,
                block_list: Some(free_blk),
                n_free: 1,
                n_used: 0,
                next: None,
                prev: None,
            });
            Ok(NonNull::new_unchecked(region_ptr))
        }
    }

    /// Unmaps this region. The caller must have already unlinked it from
    /// every list it participated in.
    pub fn destroy(region: NonNull<Region>, region_size: usize) -> Result<(), MappingError> {
        mmap::unmap(region.as_ptr() as *mut u8, region_size)
    }
}

/// Recovers the owning region from any address inside it.
pub fn to_region(addr: *mut u8, region_size: usize) -> NonNull<Region> {
    let masked = (addr as usize) & !(region_size - 1);
    unsafe { NonNull::new_unchecked(masked as *mut Region) }
}
