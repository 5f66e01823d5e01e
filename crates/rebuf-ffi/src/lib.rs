//! C ABI for rebuf buffers.
//!
//! Buffers created here live in a global slot+generation handle table and
//! are addressed by opaque `u64` handles. The caller releases each buffer
//! explicitly with [`rebuf_destroy`]; stale and double destroys are
//! reported as [`RebufStatus::InvalidHandle`] instead of corrupting memory.
//!
//! Every function returns an `i32` status (`0` on success, negative on
//! error) and writes results through out-pointers. Panics never cross the
//! boundary: they are caught and reported as [`RebufStatus::Panicked`].
//!
//! The C header is generated into `include/rebuf.h` at build time.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run an FFI body, converting a panic into [`RebufStatus::Panicked`].
macro_rules! ffi_guard {
    ($body:block) => {
        match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| -> i32 { $body })) {
            Ok(code) => code,
            Err(_) => $crate::status::RebufStatus::Panicked as i32,
        }
    };
}

/// Lock a mutex, returning [`RebufStatus::InternalError`] from the enclosing
/// closure if it is poisoned.
macro_rules! ffi_lock {
    ($mutex:expr) => {
        match $mutex.lock() {
            Ok(guard) => guard,
            Err(_) => return $crate::status::RebufStatus::InternalError as i32,
        }
    };
}

pub mod buffer;
mod handle;
pub mod status;

pub use buffer::{
    rebuf_alloc, rebuf_allocated_size, rebuf_calloc, rebuf_destroy, rebuf_enlarge, rebuf_get_f64,
    rebuf_get_i64, rebuf_get_user, rebuf_length, rebuf_live_count, rebuf_make_owned,
    rebuf_pointer, rebuf_resize, rebuf_set_f64, rebuf_set_i64, rebuf_set_user, rebuf_size,
    rebuf_type_valid, rebuf_wrap,
};
pub use status::RebufStatus;
