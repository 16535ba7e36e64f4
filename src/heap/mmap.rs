//! Raw anonymous virtual-memory mappings.
//!
//! Region creation needs to unmap an arbitrary sub-slice of an
//! over-sized mapping (the alignment-doubling trick in
//! `region::Region::create`), which `memmap2`'s owned `MmapMut` does not
//! support: it unmaps exactly the range it was handed at construction,
//! as a whole, on drop. So this module talks to the kernel directly
//! through `libc`, already a platform-specific mapping dependency
//! elsewhere in the crate.

use crate::error::MappingError;

/// Requests a fresh anonymous, zero-filled, read-write mapping of `size`
/// bytes. `size` should already be page-aligned; the kernel rounds up
/// otherwise.
pub fn map_anonymous(size: usize) -> Result<*mut u8, MappingError> {
    let ptr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            size,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return Err(MappingError::MapFailed { requested: size });
    }
    Ok(ptr as *mut u8)
}

/// Releases a mapping (or sub-slice of one) previously obtained from
/// `map_anonymous`.
pub fn unmap(addr: *mut u8, size: usize) -> Result<(), MappingError> {
    let rc = unsafe { libc::munmap(addr as *mut libc::c_void, size) };
    if rc != 0 {
        return Err(MappingError::UnmapFailed {
            addr: addr as usize,
            size,
        });
    }
    Ok(())
}

/// Requests a mapping of exactly `region_size` bytes, aligned to a
/// `region_size` boundary.
///
/// If the kernel's first answer is already aligned, keep it as-is. If
/// `region_size` spans more than one page the kernel offers no alignment
/// guarantee stronger than the page size, so on a misaligned answer the
/// mapping is released and re-requested at twice the size; doubling
/// guarantees the returned range contains at least one `region_size`
/// window aligned to `region_size`, and the unaligned prefix and trailing
/// suffix around that window are unmapped.
pub fn map_region_aligned(region_size: usize) -> Result<*mut u8, MappingError> {
    let first = map_anonymous(region_size)?;
    if (first as usize) % region_size == 0 {
        return Ok(first);
    }
    unmap(first, region_size)?;

    let double = map_anonymous(2 * region_size)?;
    let base = double as usize;
    let aligned = (base + region_size - 1) & !(region_size - 1);
    let prefix = aligned - base;
    let suffix = 2 * region_size - prefix - region_size;

    if prefix > 0 {
        unmap(double, prefix)?;
    }
    if suffix > 0 {
        unmap((aligned + region_size) as *mut u8, suffix)?;
    }
    Ok(aligned as *mut u8)
}
