//! Benchmark fixtures for rebuf.
//!
//! - [`ramp_buffer`]: an owned buffer of `u32` elements `0, 1, 2, ...`
//! - [`ramp_script_buffer`]: the same, created through the adapter
//! - [`ELEMENT_COUNT`]: the element count both benchmarks share

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rebuf_engine::Buffer;
use rebuf_script::{BufferRef, Library, Value};

/// Element count used by the reference benchmarks (64 KiB of `u32`).
pub const ELEMENT_COUNT: usize = 16 * 1024;

/// An owned buffer of `len` `u32` elements holding `0..len`.
pub fn ramp_buffer(len: usize) -> Buffer {
    let mut buf = Buffer::allocate_zeroed(len, 4).unwrap();
    for i in 0..len {
        buf.set::<u32>(i, i as u32);
    }
    buf
}

/// A buffer of `len` 32-bit elements created and filled through `lib`.
pub fn ramp_script_buffer(lib: &Library, len: usize) -> BufferRef {
    let buf = lib.calloc(len as i64, &Value::from("int32")).unwrap();
    for i in 0..len as i64 {
        let index = i + lib.config().index_base.offset();
        lib.set(&buf, index, &Value::Integer(i), &Value::Nil).unwrap();
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_buffers_agree() {
        let lib = Library::default();
        let script = ramp_script_buffer(&lib, 8);
        let engine = ramp_buffer(8);
        assert_eq!(script.borrow().as_bytes(), engine.as_bytes());
    }
}
