//! Large-object allocation: one standalone mapping per request.
//!
//! Unlike the small path there is no free list and no reuse: every call
//! to `allocate` requests a fresh mapping from the kernel and every call
//! to `free` returns one to the kernel immediately. A mapping is laid out
//! as 16 bytes of header slack followed by the payload: the header word
//! sits at offset 8 (`total_mapping_size | LARGE_FLAG`), so it is exactly
//! one word behind the payload pointer (the same offset `heap::block`
//! uses for small blocks), which is why the public free/resize dispatch
//! can recover either kind of header the same way before branching on the
//! large flag.

use crate::error::MappingError;
use crate::heap::block::Block;
use crate::heap::mmap;
use crate::util::next16;

const LARGE_BIT: usize = 0b10;
const HEADER_SLACK: usize = 16;

/// Maps a fresh mapping sized to hold `size` payload bytes and returns the
/// payload pointer.
pub fn allocate(size: usize, scribble_char: u8) -> Result<(*mut u8, usize), MappingError> {
    let total = next16(size);
    let base = mmap::map_anonymous(total)?;

    // A large block has a header word only, no footer: writing both, as
    // `Block::write_header_footer` does for small blocks, would clobber
    // payload bytes at `total - WORD`. Write the raw header word instead.
    unsafe { (base.add(8) as *mut usize).write(total | LARGE_BIT) };

    let data_ptr = unsafe { base.add(HEADER_SLACK) };
    if scribble_char != 0 {
        unsafe { std::ptr::write_bytes(data_ptr, scribble_char, total - HEADER_SLACK) };
    }
    Ok((data_ptr, total))
}

/// Unmaps the mapping backing a large-block payload pointer. Returns the
/// total mapping size that was released, for counter bookkeeping.
pub fn free(data_ptr: *mut u8) -> Result<usize, MappingError> {
    let total = total_mapping_size(data_ptr);
    let base = unsafe { data_ptr.sub(HEADER_SLACK) };
    mmap::unmap(base, total)?;
    Ok(total)
}

/// Reads the total mapping size recorded in a large block's header.
pub fn total_mapping_size(data_ptr: *mut u8) -> usize {
    let header = unsafe { Block::from_data_ptr(data_ptr) };
    header.size()
}
