//! Python bindings for rebuf.
//!
//! The native extension is named `_rebuf`. It embeds the dynamic binding
//! adapter with a zero-based index convention, so `buf[0]` is the first
//! element and `len(buf)` is the length under the buffer's current type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

use pyo3::prelude::*;

mod buffer;
mod convert;
mod error;

/// The native `_rebuf` extension module.
#[pymodule]
fn _rebuf(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<buffer::PyBuffer>()?;
    m.add_class::<buffer::BufferIter>()?;

    m.add_function(wrap_pyfunction!(buffer::new_buffer, m)?)?;
    m.add_function(wrap_pyfunction!(buffer::calloc, m)?)?;

    m.add("types", buffer::types(m.py())?)?;
    Ok(())
}
