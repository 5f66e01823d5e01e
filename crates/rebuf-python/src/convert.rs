//! Conversions between Python objects and adapter values.

use pyo3::exceptions::PyTypeError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyDict, PyFloat, PyInt, PyString};
use pyo3::IntoPyObjectExt;

use rebuf_script::{Key, Value};

use crate::buffer::PyBuffer;

/// Convert a Python argument into a [`Value`].
///
/// `bool` is checked before `int` because it is an `int` subclass.
pub(crate) fn to_value(obj: &Bound<'_, PyAny>) -> PyResult<Value> {
    if obj.is_none() {
        return Ok(Value::Nil);
    }
    if obj.is_instance_of::<PyBool>() {
        return Ok(Value::Boolean(obj.extract()?));
    }
    if obj.is_instance_of::<PyInt>() {
        return Ok(Value::Integer(obj.extract()?));
    }
    if obj.is_instance_of::<PyFloat>() {
        return Ok(Value::Number(obj.extract()?));
    }
    if obj.is_instance_of::<PyString>() {
        return Ok(Value::Str(obj.extract()?));
    }
    if let Ok(buf) = obj.extract::<PyRef<'_, PyBuffer>>() {
        return Ok(Value::Buffer(buf.inner.clone()));
    }
    Err(PyTypeError::new_err(format!(
        "unsupported value of type '{}'",
        obj.get_type().name()?
    )))
}

/// Convert an optional Python argument, treating a missing one as `None`.
pub(crate) fn to_value_opt(obj: Option<&Bound<'_, PyAny>>) -> PyResult<Value> {
    obj.map_or(Ok(Value::Nil), to_value)
}

/// Convert a [`Value`] back into a Python object.
pub(crate) fn to_py(py: Python<'_>, value: Value) -> PyResult<Py<PyAny>> {
    match value {
        Value::Nil => Ok(py.None()),
        Value::Boolean(b) => b.into_py_any(py),
        Value::Integer(i) => i.into_py_any(py),
        Value::Number(n) => n.into_py_any(py),
        Value::Str(s) => s.into_py_any(py),
        Value::Buffer(inner) => PyBuffer { inner }.into_py_any(py),
        Value::Table(table) => {
            let dict = PyDict::new(py);
            for key in table.keys() {
                let value = to_py(py, table.get(&key))?;
                match key {
                    Key::Int(i) => dict.set_item(i, value)?,
                    Key::Str(s) => dict.set_item(s, value)?,
                }
            }
            dict.into_py_any(py)
        }
        Value::Function(f) => Err(PyTypeError::new_err(format!(
            "'{}' is a library function and has no Python value",
            f.name()
        ))),
    }
}
