//! PyBuffer: Python wrapper around a shared adapter buffer.
//!
//! Buffers are reference-counted on the Rust side and not `Send`, so the
//! classes here are `unsendable` and the adapter library is kept per
//! thread.

use pyo3::exceptions::{PyIndexError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use rebuf_core::ConfigError;
use rebuf_engine::Buffer;
use rebuf_script::{AdapterConfig, BufferRef, Library, ScriptError, Value};

use crate::convert::{to_py, to_value, to_value_opt};
use crate::error::{config_err, to_py_err};

thread_local! {
    static LIBRARY: Result<Library, ConfigError> = Library::new(AdapterConfig::python());
}

fn with_library<R>(f: impl FnOnce(&Library) -> Result<R, ScriptError>) -> PyResult<R> {
    LIBRARY.with(|lib| match lib {
        Ok(lib) => f(lib).map_err(to_py_err),
        Err(e) => Err(config_err(e)),
    })
}

/// A growable byte buffer with a mutable element type.
///
/// Indexing reads and writes elements of the current type; `len()` is the
/// number of whole elements. Changing `type` reinterprets the same bytes.
#[pyclass(unsendable, name = "Buffer", module = "rebuf._rebuf")]
pub(crate) struct PyBuffer {
    pub(crate) inner: BufferRef,
}

/// Map a Python index (negative counts from the end) onto `0..len`.
fn element_index(len: i64, index: i64) -> Option<i64> {
    let index = if index < 0 { index.checked_add(len)? } else { index };
    (0..len).contains(&index).then_some(index)
}

/// `buf[index]`, or `None` when `index` is out of range.
fn get_item(lib: &Library, buf: &BufferRef, index: i64) -> Result<Option<Value>, ScriptError> {
    let Some(index) = element_index(lib.len(buf)?, index) else {
        return Ok(None);
    };
    let value = lib.index(buf, &Value::Integer(index))?;
    Ok((!value.is_nil()).then_some(value))
}

/// `buf[index] = value`. Returns whether `index` was in range.
fn set_item(
    lib: &Library,
    buf: &BufferRef,
    index: i64,
    value: &Value,
) -> Result<bool, ScriptError> {
    match element_index(lib.len(buf)?, index) {
        Some(index) => lib
            .new_index(buf, &Value::Integer(index), value)
            .map(|()| true),
        None => Ok(false),
    }
}

/// Control value that makes the first `iter` step land on element 0.
fn iter_start(lib: &Library) -> i64 {
    lib.config().index_base.offset() - 1
}

/// One iteration step: the next control value and element, or `None` when
/// iteration is done.
fn iter_step(
    lib: &Library,
    obj: &Value,
    control: i64,
) -> Result<Option<(i64, Value)>, ScriptError> {
    let mut step = lib.iter(obj, control)?.into_iter();
    match (step.next(), step.next()) {
        (Some(Value::Integer(next)), Some(value)) => Ok(Some((next, value))),
        _ => Ok(None),
    }
}

#[pymethods]
impl PyBuffer {
    /// Create a buffer of `size` bytes with type `unsigned char`.
    #[new]
    fn new(size: i64) -> PyResult<Self> {
        new_buffer(size)
    }

    /// Create a zero-filled buffer of `length` elements. See the module
    /// level `calloc`.
    #[staticmethod]
    #[pyo3(name = "calloc")]
    fn calloc_elements(length: i64, elem: &Bound<'_, PyAny>) -> PyResult<Self> {
        calloc(length, elem)
    }

    /// Create a buffer holding a copy of `data`.
    #[staticmethod]
    fn from_bytes(data: &[u8]) -> PyResult<Self> {
        if data.is_empty() {
            return Err(PyValueError::new_err("data must not be empty"));
        }
        let buf = Buffer::from_bytes(data).map_err(|e| to_py_err(e.into()))?;
        Ok(Self {
            inner: BufferRef::new(buf),
        })
    }

    /// Copy the buffer's bytes out.
    fn to_bytes<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, self.inner.borrow().as_bytes())
    }

    /// Size in bytes.
    #[getter]
    fn size(&self) -> PyResult<i64> {
        with_library(|lib| Ok(lib.get_size(&self.inner)))
    }

    #[setter]
    fn set_size(&self, size: i64) -> PyResult<()> {
        with_library(|lib| lib.set_size(&self.inner, size))
    }

    /// Number of whole elements of the current type.
    #[getter]
    fn length(&self) -> PyResult<i64> {
        with_library(|lib| lib.get_length(&self.inner, &Value::Nil))
    }

    #[setter]
    fn set_length(&self, length: i64) -> PyResult<()> {
        with_library(|lib| lib.set_length(&self.inner, length, &Value::Nil))
    }

    /// Current type code. Accepts a code or a type name.
    #[getter(r#type)]
    fn type_code(&self) -> PyResult<i64> {
        with_library(|lib| Ok(lib.get_type(&self.inner)))
    }

    #[setter(r#type)]
    fn set_type_code(&self, ty: &Bound<'_, PyAny>) -> PyResult<()> {
        let ty = to_value(ty)?;
        with_library(|lib| lib.set_type(&self.inner, &ty))
    }

    /// Number of whole elements of `type` (default: the current type).
    #[pyo3(signature = (r#type=None))]
    fn getlength(&self, r#type: Option<&Bound<'_, PyAny>>) -> PyResult<i64> {
        let ty = to_value_opt(r#type)?;
        with_library(|lib| lib.get_length(&self.inner, &ty))
    }

    /// Resize to `length` elements of `type` without changing the current
    /// type.
    #[pyo3(signature = (length, r#type=None))]
    fn setlength(&self, length: i64, r#type: Option<&Bound<'_, PyAny>>) -> PyResult<()> {
        let ty = to_value_opt(r#type)?;
        with_library(|lib| lib.set_length(&self.inner, length, &ty))
    }

    /// Element `index` read as `type`, or `None` when out of range.
    #[pyo3(signature = (index, r#type=None))]
    fn get(
        &self,
        py: Python<'_>,
        index: i64,
        r#type: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<Py<PyAny>> {
        let ty = to_value_opt(r#type)?;
        let value = with_library(|lib| lib.get(&self.inner, index, &ty))?;
        to_py(py, value)
    }

    /// Store `value` at element `index` as `type`. Out-of-range writes are
    /// ignored.
    #[pyo3(signature = (index, value, r#type=None))]
    fn set(
        &self,
        index: i64,
        value: &Bound<'_, PyAny>,
        r#type: Option<&Bound<'_, PyAny>>,
    ) -> PyResult<()> {
        let value = to_value(value)?;
        let ty = to_value_opt(r#type)?;
        with_library(|lib| lib.set(&self.inner, index, &value, &ty))
    }

    fn __len__(&self) -> PyResult<usize> {
        let len = with_library(|lib| lib.len(&self.inner))?;
        Ok(usize::try_from(len).unwrap_or(0))
    }

    fn __getitem__(&self, py: Python<'_>, index: i64) -> PyResult<Py<PyAny>> {
        match with_library(|lib| get_item(lib, &self.inner, index))? {
            Some(value) => to_py(py, value),
            None => Err(PyIndexError::new_err("buffer index out of range")),
        }
    }

    fn __setitem__(&self, index: i64, value: &Bound<'_, PyAny>) -> PyResult<()> {
        let value = to_value(value)?;
        let written = with_library(|lib| set_item(lib, &self.inner, index, &value))?;
        if written {
            Ok(())
        } else {
            Err(PyIndexError::new_err("buffer assignment index out of range"))
        }
    }

    fn __iter__(&self) -> PyResult<BufferIter> {
        let start = with_library(|lib| Ok(iter_start(lib)))?;
        Ok(BufferIter {
            obj: Value::Buffer(self.inner.clone()),
            control: start,
        })
    }

    fn __repr__(&self) -> String {
        let buf = self.inner.borrow();
        format!(
            "Buffer(size={}, type={:#04x})",
            buf.size(),
            rebuf_script::handle::type_code(&buf)
        )
    }
}

/// Iterator over a buffer's elements under its current type.
#[pyclass(unsendable, module = "rebuf._rebuf")]
pub(crate) struct BufferIter {
    obj: Value,
    control: i64,
}

#[pymethods]
impl BufferIter {
    fn __iter__(slf: PyRef<'_, Self>) -> PyRef<'_, Self> {
        slf
    }

    fn __next__(&mut self, py: Python<'_>) -> PyResult<Option<Py<PyAny>>> {
        match with_library(|lib| iter_step(lib, &self.obj, self.control))? {
            Some((next, value)) => {
                self.control = next;
                to_py(py, value).map(Some)
            }
            None => Ok(None),
        }
    }
}

/// Create a buffer of `size` bytes with type `unsigned char`.
#[pyfunction(name = "new")]
pub(crate) fn new_buffer(size: i64) -> PyResult<PyBuffer> {
    let inner = with_library(|lib| lib.create(size))?;
    Ok(PyBuffer { inner })
}

/// Create a zero-filled buffer of `length` elements.
///
/// `elem` is either an element size in bytes or a type (code or name),
/// which then becomes the buffer's type.
#[pyfunction]
pub(crate) fn calloc(length: i64, elem: &Bound<'_, PyAny>) -> PyResult<PyBuffer> {
    let elem = to_value(elem)?;
    let inner = with_library(|lib| lib.calloc(length, &elem))?;
    Ok(PyBuffer { inner })
}

/// The `types` mapping: every available type name to its code.
pub(crate) fn types(py: Python<'_>) -> PyResult<Py<PyAny>> {
    let table = with_library(|lib| Ok(lib.types().clone()))?;
    to_py(py, Value::Table(table))
}
