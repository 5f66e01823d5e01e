//! Low-level primitives for buffer memory.
//!
//! Every `unsafe` operation on backing memory lives here, each with a
//! `// SAFETY:` comment. Allocations use a fixed alignment large enough for
//! every [`Element`] type, so typed slices over owned buffers are always
//! aligned. Element reads and writes are unaligned so that borrowed regions
//! of any alignment work too.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem::size_of;
use std::ptr::{self, NonNull};

use crate::element::Element;
use crate::error::EngineError;

/// Alignment of every engine-owned allocation.
pub(crate) const ALIGN: usize = 16;

fn layout(size: usize) -> Result<Layout, EngineError> {
    Layout::from_size_align(size, ALIGN).map_err(|_| EngineError::CapacityOverflow)
}

/// Allocate `size` zeroed bytes. `size` must be non-zero.
pub(crate) fn allocate_zeroed(size: usize) -> Result<NonNull<u8>, EngineError> {
    debug_assert!(size > 0);
    let layout = layout(size)?;
    // SAFETY: layout has non-zero size (checked by callers) and a valid
    // power-of-two alignment.
    let ptr = unsafe { alloc::alloc_zeroed(layout) };
    NonNull::new(ptr).ok_or(EngineError::AllocationFailed { requested: size })
}

/// Grow or shrink an allocation, preserving `min(old_size, new_size)` bytes
/// and zeroing any bytes added past `old_size`.
///
/// On failure the original allocation is untouched and still owned by the
/// caller.
///
/// # Safety
///
/// `ptr` must have been returned by [`allocate_zeroed`] or [`reallocate`]
/// with exactly `old_size` bytes, and not yet released.
pub(crate) unsafe fn reallocate(
    ptr: NonNull<u8>,
    old_size: usize,
    new_size: usize,
) -> Result<NonNull<u8>, EngineError> {
    debug_assert!(new_size > 0);
    // Validate the new layout before handing it to the allocator.
    layout(new_size)?;
    let old_layout = layout(old_size)?;
    // SAFETY: caller guarantees ptr/old_layout describe a live allocation;
    // new_size is non-zero and fits the alignment (validated above).
    let raw = unsafe { alloc::realloc(ptr.as_ptr(), old_layout, new_size) };
    let new_ptr = NonNull::new(raw).ok_or(EngineError::AllocationFailed {
        requested: new_size,
    })?;
    if new_size > old_size {
        // SAFETY: the region [old_size, new_size) lies inside the new
        // allocation.
        unsafe { ptr::write_bytes(new_ptr.as_ptr().add(old_size), 0, new_size - old_size) };
    }
    Ok(new_ptr)
}

/// Release an allocation.
///
/// # Safety
///
/// `ptr` must have been returned by [`allocate_zeroed`] or [`reallocate`]
/// with exactly `size` bytes, and must not be used afterwards.
pub(crate) unsafe fn release(ptr: NonNull<u8>, size: usize) {
    if let Ok(layout) = layout(size) {
        // SAFETY: caller guarantees ptr was allocated with this layout.
        unsafe { alloc::dealloc(ptr.as_ptr(), layout) };
    }
}

/// Copy `len` bytes between non-overlapping regions.
///
/// # Safety
///
/// `src` must be valid for `len` byte reads, `dst` for `len` byte writes,
/// and the regions must not overlap.
pub(crate) unsafe fn copy(src: *const u8, dst: *mut u8, len: usize) {
    // SAFETY: forwarded to the caller.
    unsafe { ptr::copy_nonoverlapping(src, dst, len) };
}

/// Read element `index` of type `T` from `base`.
///
/// # Safety
///
/// `base` must be valid for reads of `(index + 1) * size_of::<T>()` bytes.
pub(crate) unsafe fn read<T: Element>(base: *const u8, index: usize) -> T {
    // SAFETY: forwarded to the caller; every bit pattern is a valid `T`.
    unsafe { ptr::read_unaligned(base.add(index * size_of::<T>()).cast::<T>()) }
}

/// Write element `index` of type `T` to `base`.
///
/// # Safety
///
/// `base` must be valid for writes of `(index + 1) * size_of::<T>()` bytes.
pub(crate) unsafe fn write<T: Element>(base: *mut u8, index: usize, value: T) {
    // SAFETY: forwarded to the caller.
    unsafe { ptr::write_unaligned(base.add(index * size_of::<T>()).cast::<T>(), value) };
}
