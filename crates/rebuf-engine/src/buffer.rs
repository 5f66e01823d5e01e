//! The [`Buffer`] type: allocation, wrapping, resizing and element access.

use std::fmt;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;
use std::slice;

use rebuf_core::{ElemType, Scalar};

use crate::element::{with_repr, Element};
use crate::error::EngineError;
use crate::raw;

/// Who is responsible for releasing a buffer's backing memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ownership {
    /// Allocated by the engine and released when the buffer is dropped.
    Owned,
    /// A foreign region adopted by [`Buffer::wrap`]. Never released by the
    /// engine.
    Borrowed,
}

/// A growable byte region viewable as an array of any [`Element`] type.
///
/// `size` is the logical extent in bytes; `capacity` is the number of bytes
/// physically backing the buffer (`capacity >= size`). For borrowed buffers
/// the capacity is the extent of the wrapped region.
///
/// Not `Send` or `Sync`: callers that share a buffer across threads must
/// provide their own synchronisation.
pub struct Buffer {
    ptr: NonNull<u8>,
    size: usize,
    capacity: usize,
    ownership: Ownership,
    user: u32,
}

impl Buffer {
    /// A degenerate owned buffer with no backing memory.
    ///
    /// `size() == allocated() == 0`. The first [`resize`](Self::resize)
    /// performs a fresh allocation.
    pub fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            size: 0,
            capacity: 0,
            ownership: Ownership::Owned,
            user: 0,
        }
    }

    /// Allocate an owned buffer of exactly `size` bytes.
    ///
    /// Callers must not depend on the initial contents.
    pub fn allocate(size: usize) -> Result<Self, EngineError> {
        if size == 0 {
            return Err(EngineError::InvalidSize);
        }
        let ptr = raw::allocate_zeroed(size)?;
        Ok(Self {
            ptr,
            size,
            capacity: size,
            ownership: Ownership::Owned,
            user: 0,
        })
    }

    /// Allocate an owned buffer of `length * element_size` zeroed bytes.
    pub fn allocate_zeroed(length: usize, element_size: usize) -> Result<Self, EngineError> {
        if length == 0 || element_size == 0 {
            return Err(EngineError::InvalidSize);
        }
        let size = length
            .checked_mul(element_size)
            .ok_or(EngineError::CapacityOverflow)?;
        let ptr = raw::allocate_zeroed(size)?;
        Ok(Self {
            ptr,
            size,
            capacity: size,
            ownership: Ownership::Owned,
            user: 0,
        })
    }

    /// Allocate an owned buffer holding a copy of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        let mut buf = Self::allocate(bytes.len())?;
        buf.as_bytes_mut().copy_from_slice(bytes);
        Ok(buf)
    }

    /// Adopt a foreign region of `size` bytes without taking ownership.
    ///
    /// The buffer may shrink and regrow within the region, but never past
    /// it; see [`make_owned`](Self::make_owned) to move into engine-owned
    /// memory.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `size` bytes for the whole
    /// lifetime of the returned buffer, and must not be accessed through any
    /// other pointer while the buffer is in use.
    #[allow(unsafe_code)]
    pub unsafe fn wrap(ptr: *mut u8, size: usize) -> Result<Self, EngineError> {
        let ptr = NonNull::new(ptr).ok_or(EngineError::NullPointer)?;
        Ok(Self {
            ptr,
            size,
            capacity: size,
            ownership: Ownership::Borrowed,
            user: 0,
        })
    }

    /// Release the buffer. Owned memory is freed; borrowed memory is not.
    ///
    /// Equivalent to dropping the buffer.
    pub fn destroy(self) {
        drop(self);
    }

    // ── Resizing ────────────────────────────────────────────────

    /// Set the logical size to `new_size` bytes, preserving existing bytes.
    ///
    /// - If the capacity already covers `new_size`, only the size changes.
    ///   Bytes between the old and new size are unspecified.
    /// - An owned buffer with insufficient capacity is reallocated to exactly
    ///   `new_size` bytes.
    /// - An owned buffer with zero capacity gets its first allocation.
    /// - A borrowed buffer cannot grow past its wrapped region.
    ///
    /// On error the buffer is unchanged.
    #[allow(unsafe_code)]
    pub fn resize(&mut self, new_size: usize) -> Result<(), EngineError> {
        if new_size == 0 {
            return Err(EngineError::InvalidSize);
        }
        if self.capacity >= new_size {
            self.size = new_size;
            return Ok(());
        }
        let ptr = match self.ownership {
            Ownership::Borrowed => {
                return Err(EngineError::BorrowedRegion {
                    requested: new_size,
                    extent: self.capacity,
                })
            }
            Ownership::Owned if self.capacity > 0 => {
                // SAFETY: an owned buffer with non-zero capacity holds a live
                // allocation of exactly `capacity` bytes.
                unsafe { raw::reallocate(self.ptr, self.capacity, new_size)? }
            }
            Ownership::Owned => raw::allocate_zeroed(new_size)?,
        };
        self.ptr = ptr;
        self.size = new_size;
        self.capacity = new_size;
        Ok(())
    }

    /// Resize by `delta` bytes relative to the current size.
    ///
    /// A negative `delta` shrinks. Same contract as [`resize`](Self::resize).
    pub fn enlarge(&mut self, delta: isize) -> Result<(), EngineError> {
        let new_size = self.size.checked_add_signed(delta).ok_or(if delta < 0 {
            EngineError::InvalidSize
        } else {
            EngineError::CapacityOverflow
        })?;
        self.resize(new_size)
    }

    /// Copy a borrowed region into a fresh owned allocation.
    ///
    /// After this call the buffer no longer refers to the foreign region.
    /// No-op for owned buffers. The user tag is preserved.
    #[allow(unsafe_code)]
    pub fn make_owned(&mut self) -> Result<(), EngineError> {
        if self.ownership == Ownership::Owned {
            return Ok(());
        }
        if self.size == 0 {
            *self = Self {
                user: self.user,
                ..Self::empty()
            };
            return Ok(());
        }
        let ptr = raw::allocate_zeroed(self.size)?;
        // SAFETY: the borrowed region is valid for `size` bytes (wrap
        // contract) and the fresh allocation cannot overlap it.
        unsafe { raw::copy(self.ptr.as_ptr(), ptr.as_ptr(), self.size) };
        self.ptr = ptr;
        self.capacity = self.size;
        self.ownership = Ownership::Owned;
        Ok(())
    }

    // ── Raw accessors ───────────────────────────────────────────

    /// Logical size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Bytes allocated by the engine: the capacity for owned buffers, `0`
    /// for borrowed ones.
    pub fn allocated(&self) -> usize {
        match self.ownership {
            Ownership::Owned => self.capacity,
            Ownership::Borrowed => 0,
        }
    }

    /// Bytes usable without reallocation.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the engine owns the backing memory.
    pub fn ownership(&self) -> Ownership {
        self.ownership
    }

    /// Whether this buffer owns its memory.
    pub fn is_owned(&self) -> bool {
        self.ownership == Ownership::Owned
    }

    /// Pointer to the first byte.
    pub fn as_ptr(&self) -> *const u8 {
        self.ptr.as_ptr()
    }

    /// Mutable pointer to the first byte.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.ptr.as_ptr()
    }

    /// The caller-defined tag.
    pub fn user(&self) -> u32 {
        self.user
    }

    /// Replace the caller-defined tag.
    pub fn set_user(&mut self, user: u32) {
        self.user = user;
    }

    /// The logical bytes.
    #[allow(unsafe_code)]
    pub fn as_bytes(&self) -> &[u8] {
        // SAFETY: ptr is valid for `size` bytes (owned: live allocation that
        // was zero-initialised; borrowed: wrap contract). For size 0 the
        // dangling pointer is non-null and aligned.
        unsafe { slice::from_raw_parts(self.ptr.as_ptr(), self.size) }
    }

    /// The logical bytes, mutably.
    #[allow(unsafe_code)]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        // SAFETY: as for `as_bytes`; `&mut self` guarantees exclusivity.
        unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr(), self.size) }
    }

    // ── Typed views ─────────────────────────────────────────────

    /// Number of whole `T` elements in the buffer. Trailing bytes that do
    /// not fill an element are not addressable through typed access.
    pub fn len_of<T: Element>(&self) -> usize {
        self.size / size_of::<T>()
    }

    /// Number of whole elements of the runtime type `ty`.
    pub fn len_as(&self, ty: ElemType) -> usize {
        self.size / ty.width()
    }

    /// Pointer to the buffer as a `T` array, and its element count.
    ///
    /// No bounds checks are performed by anything that uses the pointer.
    /// The pointer may be unaligned for `T` when the buffer is borrowed.
    pub fn raw_view<T: Element>(&self) -> (*const T, usize) {
        (self.ptr.as_ptr().cast::<T>().cast_const(), self.len_of::<T>())
    }

    /// Mutable variant of [`raw_view`](Self::raw_view).
    pub fn raw_view_mut<T: Element>(&mut self) -> (*mut T, usize) {
        (self.ptr.as_ptr().cast::<T>(), self.len_of::<T>())
    }

    /// The buffer as a `T` slice, or `None` if the memory is not aligned
    /// for `T`. Owned buffers are always aligned.
    #[allow(unsafe_code)]
    pub fn view<T: Element>(&self) -> Option<&[T]> {
        if self.ptr.as_ptr() as usize % align_of::<T>() != 0 {
            return None;
        }
        // SAFETY: aligned (checked above), valid for `size` bytes, and every
        // bit pattern is a valid `T`.
        Some(unsafe { slice::from_raw_parts(self.ptr.as_ptr().cast::<T>(), self.len_of::<T>()) })
    }

    /// Mutable variant of [`view`](Self::view).
    #[allow(unsafe_code)]
    pub fn view_mut<T: Element>(&mut self) -> Option<&mut [T]> {
        if self.ptr.as_ptr() as usize % align_of::<T>() != 0 {
            return None;
        }
        let len = self.len_of::<T>();
        // SAFETY: as for `view`; `&mut self` guarantees exclusivity.
        Some(unsafe { slice::from_raw_parts_mut(self.ptr.as_ptr().cast::<T>(), len) })
    }

    // ── Element access ──────────────────────────────────────────

    /// Read element `index` of the `T` view without bounds checks.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len_of::<T>()`](Self::len_of).
    #[allow(unsafe_code)]
    pub unsafe fn get_unchecked<T: Element>(&self, index: usize) -> T {
        debug_assert!(index < self.len_of::<T>());
        // SAFETY: forwarded to the caller.
        unsafe { raw::read(self.ptr.as_ptr(), index) }
    }

    /// Write element `index` of the `T` view without bounds checks.
    ///
    /// # Safety
    ///
    /// `index` must be less than [`len_of::<T>()`](Self::len_of).
    #[allow(unsafe_code)]
    pub unsafe fn set_unchecked<T: Element>(&mut self, index: usize, value: T) {
        debug_assert!(index < self.len_of::<T>());
        // SAFETY: forwarded to the caller.
        unsafe { raw::write(self.ptr.as_ptr(), index, value) }
    }

    /// Read element `index` of the `T` view. `None` if out of range.
    #[allow(unsafe_code)]
    pub fn get<T: Element>(&self, index: usize) -> Option<T> {
        if index >= self.len_of::<T>() {
            return None;
        }
        // SAFETY: index checked above.
        Some(unsafe { self.get_unchecked(index) })
    }

    /// Write element `index` of the `T` view. Returns `false` (and writes
    /// nothing) if out of range.
    #[allow(unsafe_code)]
    pub fn set<T: Element>(&mut self, index: usize, value: T) -> bool {
        if index >= self.len_of::<T>() {
            return false;
        }
        // SAFETY: index checked above.
        unsafe { self.set_unchecked(index, value) };
        true
    }

    /// Read element `index` under the runtime type `ty`.
    pub fn read(&self, index: usize, ty: ElemType) -> Option<Scalar> {
        with_repr!(ty.repr(), T => self.get::<T>(index).map(Element::to_scalar))
    }

    /// Write `value` to element `index` under the runtime type `ty`,
    /// converting with `as` semantics. Returns `false` if out of range.
    pub fn write(&mut self, index: usize, ty: ElemType, value: Scalar) -> bool {
        with_repr!(ty.repr(), T => self.set::<T>(index, T::from_scalar(value)))
    }
}

impl Drop for Buffer {
    #[allow(unsafe_code)]
    fn drop(&mut self) {
        if self.ownership == Ownership::Owned && self.capacity > 0 {
            // SAFETY: owned buffers with non-zero capacity hold a live
            // allocation of exactly `capacity` bytes, released only here.
            unsafe { raw::release(self.ptr, self.capacity) };
        }
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("ptr", &self.ptr)
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .field("ownership", &self.ownership)
            .field("user", &format_args!("{:#x}", self.user))
            .finish()
    }
}
