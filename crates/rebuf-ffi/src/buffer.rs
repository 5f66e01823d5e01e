//! Buffer lifecycle and element access over the C ABI.
//!
//! Buffers live in a global handle table behind a `Mutex`. The lock only
//! makes the table itself sound; it does not make concurrent use of one
//! buffer from several threads meaningful.

use std::sync::{LazyLock, Mutex};

use rebuf_core::{Capabilities, ElemType, HostNumerics, Scalar};
use rebuf_engine::Buffer;

use crate::handle::HandleTable;
use crate::status::RebufStatus;

struct FfiBuffer(Buffer);

// SAFETY: a `Buffer` is `!Send` only because it holds a raw pointer. Owned
// buffers exclusively own their allocation; wrapped buffers point at memory
// the C caller has promised stays valid for the buffer's lifetime. Every
// access goes through the `BUFFERS` mutex.
#[allow(unsafe_code)]
unsafe impl Send for FfiBuffer {}

static BUFFERS: Mutex<HandleTable<FfiBuffer>> = Mutex::new(HandleTable::new());

/// Types a C caller may use. C callers exchange `int64_t` and `double`, so
/// every kind is available.
static CAPABILITIES: LazyLock<Capabilities> =
    LazyLock::new(|| Capabilities::new(HostNumerics::DEFAULT));

#[allow(unsafe_code)]
fn publish(buf: Buffer, out: *mut u64) -> i32 {
    let handle = ffi_lock!(BUFFERS).insert(FfiBuffer(buf));
    // SAFETY: out was checked for null by the caller and is valid per the
    // caller contract.
    unsafe { *out = handle };
    RebufStatus::Ok as i32
}

fn inspect(handle: u64, f: impl FnOnce(&Buffer) -> i32) -> i32 {
    let table = ffi_lock!(BUFFERS);
    match table.get(handle) {
        Some(buf) => f(&buf.0),
        None => RebufStatus::InvalidHandle as i32,
    }
}

fn with_buffer(handle: u64, f: impl FnOnce(&mut Buffer) -> i32) -> i32 {
    let mut table = ffi_lock!(BUFFERS);
    match table.get_mut(handle) {
        Some(buf) => f(&mut buf.0),
        None => RebufStatus::InvalidHandle as i32,
    }
}

fn elem_type(type_code: i32) -> Result<ElemType, RebufStatus> {
    CAPABILITIES
        .validate(i64::from(type_code))
        .map_err(|e| RebufStatus::from(&e))
}

// ── Lifecycle ───────────────────────────────────────────────────

/// Allocate a buffer of `size` bytes. Writes the handle to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_alloc(size: usize, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        match Buffer::allocate(size) {
            Ok(buf) => publish(buf, out),
            Err(e) => RebufStatus::from(&e) as i32,
        }
    })
}

/// Allocate a zero-filled buffer of `length * element_size` bytes. Writes
/// the handle to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_calloc(length: usize, element_size: usize, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        match Buffer::allocate_zeroed(length, element_size) {
            Ok(buf) => publish(buf, out),
            Err(e) => RebufStatus::from(&e) as i32,
        }
    })
}

/// Wrap `size` bytes at `ptr` without taking ownership. Writes the handle
/// to `out`.
///
/// The region must stay valid, and must not be freed, until the handle is
/// destroyed. The buffer never grows past `size` bytes unless converted
/// with [`rebuf_make_owned`].
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_wrap(ptr: *mut u8, size: usize, out: *mut u64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        // SAFETY: region validity is the caller's contract, stated above.
        match unsafe { Buffer::wrap(ptr, size) } {
            Ok(buf) => publish(buf, out),
            Err(e) => RebufStatus::from(&e) as i32,
        }
    })
}

/// Destroy a buffer. Owned memory is released; wrapped memory is not.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_destroy(handle: u64) -> i32 {
    ffi_guard!({
        match ffi_lock!(BUFFERS).remove(handle) {
            Some(_) => RebufStatus::Ok as i32,
            None => RebufStatus::InvalidHandle as i32,
        }
    })
}

/// Number of live buffers. Useful for leak checks.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_live_count(out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        let count = ffi_lock!(BUFFERS).len();
        // SAFETY: out is non-null and valid per caller contract.
        unsafe { *out = count };
        RebufStatus::Ok as i32
    })
}

// ── Resizing ────────────────────────────────────────────────────

/// Resize to `size` bytes, preserving contents. On error the buffer is
/// unchanged.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_resize(handle: u64, size: usize) -> i32 {
    ffi_guard!({
        with_buffer(handle, |buf| match buf.resize(size) {
            Ok(()) => RebufStatus::Ok as i32,
            Err(e) => RebufStatus::from(&e) as i32,
        })
    })
}

/// Resize by `delta` bytes relative to the current size.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_enlarge(handle: u64, delta: isize) -> i32 {
    ffi_guard!({
        with_buffer(handle, |buf| match buf.enlarge(delta) {
            Ok(()) => RebufStatus::Ok as i32,
            Err(e) => RebufStatus::from(&e) as i32,
        })
    })
}

/// Copy a wrapped region into engine-owned memory. No-op for owned buffers.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_make_owned(handle: u64) -> i32 {
    ffi_guard!({
        with_buffer(handle, |buf| match buf.make_owned() {
            Ok(()) => RebufStatus::Ok as i32,
            Err(e) => RebufStatus::from(&e) as i32,
        })
    })
}

// ── Accessors ───────────────────────────────────────────────────

/// Write the logical size in bytes to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_size(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        inspect(handle, |buf| {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = buf.size() };
            RebufStatus::Ok as i32
        })
    })
}

/// Write the number of engine-allocated bytes to `out`. Zero for wrapped
/// buffers.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_allocated_size(handle: u64, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        inspect(handle, |buf| {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = buf.allocated() };
            RebufStatus::Ok as i32
        })
    })
}

/// Write the address of the first byte to `out`.
///
/// The pointer is invalidated by any resize, `rebuf_make_owned` or
/// `rebuf_destroy` on the same handle.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_pointer(handle: u64, out: *mut *mut u8) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        with_buffer(handle, |buf| {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = buf.as_mut_ptr() };
            RebufStatus::Ok as i32
        })
    })
}

/// Write the caller-defined tag to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_get_user(handle: u64, out: *mut u32) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        inspect(handle, |buf| {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = buf.user() };
            RebufStatus::Ok as i32
        })
    })
}

/// Replace the caller-defined tag.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_set_user(handle: u64, user: u32) -> i32 {
    ffi_guard!({
        with_buffer(handle, |buf| {
            buf.set_user(user);
            RebufStatus::Ok as i32
        })
    })
}

// ── Typed access ────────────────────────────────────────────────

/// Returns 1 if `type_code` is a valid type code, 0 otherwise, or
/// `REBUF_STATUS_PANICKED` if a panic was caught.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_type_valid(type_code: i32) -> i32 {
    ffi_guard!({ i32::from(elem_type(type_code).is_ok()) })
}

/// Write the number of whole elements of `type_code` to `out`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_length(handle: u64, type_code: i32, out: *mut usize) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        let ty = match elem_type(type_code) {
            Ok(ty) => ty,
            Err(status) => return status as i32,
        };
        inspect(handle, |buf| {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = buf.len_as(ty) };
            RebufStatus::Ok as i32
        })
    })
}

fn read(handle: u64, index: usize, type_code: i32, f: impl FnOnce(Scalar)) -> i32 {
    let ty = match elem_type(type_code) {
        Ok(ty) => ty,
        Err(status) => return status as i32,
    };
    inspect(handle, |buf| match buf.read(index, ty) {
        Some(value) => {
            f(value);
            RebufStatus::Ok as i32
        }
        None => RebufStatus::IndexOutOfRange as i32,
    })
}

fn write(handle: u64, index: usize, type_code: i32, value: Scalar) -> i32 {
    let ty = match elem_type(type_code) {
        Ok(ty) => ty,
        Err(status) => return status as i32,
    };
    with_buffer(handle, |buf| {
        if buf.write(index, ty, value) {
            RebufStatus::Ok as i32
        } else {
            RebufStatus::IndexOutOfRange as i32
        }
    })
}

/// Read element `index` (0-based) as `type_code` and write it to `out` as
/// an `i64`. Unsigned 64-bit values wrap; floats truncate.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_get_i64(handle: u64, index: usize, type_code: i32, out: *mut i64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        read(handle, index, type_code, |value| {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = value.to_i64_wrapping() };
        })
    })
}

/// Read element `index` (0-based) as `type_code` and write it to `out` as
/// an `f64`.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_get_f64(handle: u64, index: usize, type_code: i32, out: *mut f64) -> i32 {
    ffi_guard!({
        if out.is_null() {
            return RebufStatus::InvalidArgument as i32;
        }
        read(handle, index, type_code, |value| {
            // SAFETY: out is non-null and valid per caller contract.
            unsafe { *out = value.to_f64() };
        })
    })
}

/// Store `value` at element `index` (0-based) as `type_code`, wrapping to
/// the element width.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_set_i64(handle: u64, index: usize, type_code: i32, value: i64) -> i32 {
    ffi_guard!({ write(handle, index, type_code, Scalar::Signed(value)) })
}

/// Store `value` at element `index` (0-based) as `type_code`. Integer
/// types saturate.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn rebuf_set_f64(handle: u64, index: usize, type_code: i32, value: f64) -> i32 {
    ffi_guard!({ write(handle, index, type_code, Scalar::Float(value)) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const OK: i32 = RebufStatus::Ok as i32;

    fn alloc(size: usize) -> u64 {
        let mut h = 0u64;
        assert_eq!(rebuf_alloc(size, &mut h), OK);
        h
    }

    fn size_of(h: u64) -> usize {
        let mut size = 0usize;
        assert_eq!(rebuf_size(h, &mut size), OK);
        size
    }

    #[test]
    fn alloc_and_destroy() {
        let h = alloc(16);
        assert_eq!(size_of(h), 16);
        let mut allocated = 0usize;
        assert_eq!(rebuf_allocated_size(h, &mut allocated), OK);
        assert_eq!(allocated, 16);
        assert_eq!(rebuf_destroy(h), OK);
        assert_eq!(rebuf_destroy(h), RebufStatus::InvalidHandle as i32);
        assert_eq!(rebuf_size(h, &mut allocated), RebufStatus::InvalidHandle as i32);
    }

    #[test]
    fn zero_size_rejected() {
        let mut h = 0u64;
        assert_eq!(rebuf_alloc(0, &mut h), RebufStatus::InvalidSize as i32);
        assert_eq!(rebuf_calloc(4, 0, &mut h), RebufStatus::InvalidSize as i32);
        assert_eq!(
            rebuf_calloc(usize::MAX, 2, &mut h),
            RebufStatus::CapacityOverflow as i32
        );
        assert_eq!(h, 0);
    }

    #[test]
    fn null_out_pointers_rejected() {
        assert_eq!(
            rebuf_alloc(4, std::ptr::null_mut()),
            RebufStatus::InvalidArgument as i32
        );
        let h = alloc(4);
        assert_eq!(
            rebuf_size(h, std::ptr::null_mut()),
            RebufStatus::InvalidArgument as i32
        );
        assert_eq!(rebuf_destroy(h), OK);
    }

    #[test]
    fn typed_round_trip() {
        let mut h = 0u64;
        assert_eq!(rebuf_calloc(4, 4, &mut h), OK);
        let int32 = 0x19;
        let float = 0x05;
        assert_eq!(rebuf_set_i64(h, 3, int32, -2), OK);
        let mut v = 0i64;
        assert_eq!(rebuf_get_i64(h, 3, int32, &mut v), OK);
        assert_eq!(v, -2);
        assert_eq!(rebuf_get_i64(h, 3, 0x09, &mut v), OK);
        assert_eq!(v, i64::from(u32::MAX - 1));

        assert_eq!(rebuf_set_f64(h, 0, float, 1.0), OK);
        let mut f = 0f64;
        assert_eq!(rebuf_get_f64(h, 0, float, &mut f), OK);
        assert_eq!(f, 1.0);
        assert_eq!(rebuf_get_i64(h, 0, 0x09, &mut v), OK);
        assert_eq!(v, 0x3f80_0000);

        assert_eq!(
            rebuf_set_i64(h, 4, int32, 1),
            RebufStatus::IndexOutOfRange as i32
        );
        assert_eq!(
            rebuf_get_i64(h, 0, 0x0b, &mut v),
            RebufStatus::InvalidType as i32
        );
        let mut len = 0usize;
        assert_eq!(rebuf_length(h, 0x06, &mut len), OK);
        assert_eq!(len, 2);
        assert_eq!(rebuf_destroy(h), OK);
    }

    #[test]
    fn wrap_respects_region() {
        let mut storage = [0u8; 8];
        let mut h = 0u64;
        assert_eq!(rebuf_wrap(storage.as_mut_ptr(), 8, &mut h), OK);
        let mut allocated = 1usize;
        assert_eq!(rebuf_allocated_size(h, &mut allocated), OK);
        assert_eq!(allocated, 0);
        assert_eq!(rebuf_set_i64(h, 0, 0x07, 0x7f), OK);
        assert_eq!(rebuf_enlarge(h, 1), RebufStatus::BorrowedRegion as i32);
        assert_eq!(rebuf_resize(h, 4), OK);
        assert_eq!(rebuf_make_owned(h), OK);
        assert_eq!(rebuf_enlarge(h, 12), OK);
        assert_eq!(size_of(h), 16);
        assert_eq!(rebuf_destroy(h), OK);
        assert_eq!(storage[0], 0x7f);
    }

    #[test]
    fn wrap_null_rejected() {
        let mut h = 0u64;
        assert_eq!(
            rebuf_wrap(std::ptr::null_mut(), 8, &mut h),
            RebufStatus::InvalidArgument as i32
        );
    }

    #[test]
    fn user_tag_and_pointer() {
        let h = alloc(8);
        assert_eq!(rebuf_set_user(h, 0xfeed), OK);
        let mut user = 0u32;
        assert_eq!(rebuf_get_user(h, &mut user), OK);
        assert_eq!(user, 0xfeed);
        let mut ptr = std::ptr::null_mut();
        assert_eq!(rebuf_pointer(h, &mut ptr), OK);
        assert!(!ptr.is_null());
        assert_eq!(rebuf_destroy(h), OK);
    }

    #[test]
    fn type_table_covers_every_kind() {
        for kind in rebuf_core::Kind::ALL {
            assert!(CAPABILITIES.is_available(kind), "{kind}");
            let code = i32::from(ElemType::signed(kind).code());
            assert_eq!(rebuf_type_valid(code), 1);
            assert_eq!(elem_type(code), Ok(ElemType::signed(kind)));
        }
    }

    #[test]
    fn type_validity() {
        assert_eq!(rebuf_type_valid(0x00), 1);
        assert_eq!(rebuf_type_valid(0x1a), 1);
        assert_eq!(rebuf_type_valid(0x0b), 0);
        assert_eq!(rebuf_type_valid(0x20), 0);
        assert_eq!(rebuf_type_valid(-1), 0);
    }

    #[test]
    fn live_count_tracks_handles() {
        let mut before = 0usize;
        assert_eq!(rebuf_live_count(&mut before), OK);
        let h = alloc(1);
        let mut during = 0usize;
        assert_eq!(rebuf_live_count(&mut during), OK);
        assert!(during >= 1);
        assert_eq!(rebuf_destroy(h), OK);
    }

    proptest! {
        #[test]
        fn size_follows_last_accepted_resize(sizes in prop::collection::vec(0usize..512, 1..16)) {
            let h = alloc(8);
            let mut expected = 8usize;
            for size in sizes {
                let status = rebuf_resize(h, size);
                if size == 0 {
                    prop_assert_eq!(status, RebufStatus::InvalidSize as i32);
                } else {
                    prop_assert_eq!(status, OK);
                    expected = size;
                }
                prop_assert_eq!(size_of(h), expected);
            }
            prop_assert_eq!(rebuf_destroy(h), OK);
        }

        #[test]
        fn destroyed_handles_stay_invalid(count in 1usize..8) {
            let handles: Vec<u64> = (0..count).map(|_| alloc(4)).collect();
            for &h in &handles {
                prop_assert_eq!(rebuf_destroy(h), OK);
            }
            let fresh = alloc(4);
            for &h in &handles {
                prop_assert_ne!(h, fresh);
                prop_assert_eq!(rebuf_set_user(h, 1), RebufStatus::InvalidHandle as i32);
            }
            prop_assert_eq!(rebuf_destroy(fresh), OK);
        }
    }
}
