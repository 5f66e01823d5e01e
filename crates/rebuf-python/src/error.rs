//! ScriptError -> Python exception mapping.

use pyo3::exceptions::{PyMemoryError, PyRuntimeError, PyTypeError, PyValueError};
use pyo3::PyErr;

use rebuf_core::ConfigError;
use rebuf_script::{ArgKind, ScriptError};

/// Python exception class an adapter error is raised as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExceptionClass {
    Type,
    Value,
    Memory,
    Runtime,
}

/// Argument errors are the caller's fault: a value of the wrong kind is a
/// `TypeError`, any other rejected argument a `ValueError`. Allocation
/// failures are a `MemoryError`; everything else is a `RuntimeError`.
pub(crate) fn exception_class(err: &ScriptError) -> ExceptionClass {
    match err.arg_kind() {
        Some(ArgKind::WrongType) => ExceptionClass::Type,
        Some(ArgKind::BadValue) => ExceptionClass::Value,
        None if err.is_allocation() => ExceptionClass::Memory,
        None => ExceptionClass::Runtime,
    }
}

/// Convert an adapter error into a typed Python exception.
pub(crate) fn to_py_err(err: ScriptError) -> PyErr {
    let msg = err.to_string();
    match exception_class(&err) {
        ExceptionClass::Type => PyTypeError::new_err(msg),
        ExceptionClass::Value => PyValueError::new_err(msg),
        ExceptionClass::Memory => PyMemoryError::new_err(msg),
        ExceptionClass::Runtime => PyRuntimeError::new_err(msg),
    }
}

/// The adapter configuration could not be built.
pub(crate) fn config_err(err: &ConfigError) -> PyErr {
    PyRuntimeError::new_err(format!("rebuf configuration error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use rebuf_engine::EngineError;
    use rebuf_script::{AdapterConfig, Library, Value};

    fn python_library() -> Library {
        Library::new(AdapterConfig::python()).unwrap()
    }

    #[test]
    fn wrong_kind_is_type_error() {
        let lib = python_library();
        let buf = lib.create(4).unwrap();
        let err = lib.set(&buf, 0, &Value::from("x"), &Value::Nil).unwrap_err();
        assert_eq!(exception_class(&err), ExceptionClass::Type);

        let err = lib.iter(&Value::Integer(3), -1).unwrap_err();
        assert_eq!(exception_class(&err), ExceptionClass::Type);
    }

    #[test]
    fn rejected_value_is_value_error() {
        let lib = python_library();
        let err = lib.create(0).unwrap_err();
        assert_eq!(exception_class(&err), ExceptionClass::Value);

        let buf = lib.create(4).unwrap();
        let err = lib.set(&buf, 0, &Value::Number(1.5), &Value::Nil).unwrap_err();
        assert_eq!(exception_class(&err), ExceptionClass::Value);
    }

    #[test]
    fn message_text_does_not_decide_the_class() {
        let err = ScriptError::Arg {
            function: "set",
            arg: 3,
            kind: ArgKind::BadValue,
            message: "number expected, got string".into(),
        };
        assert_eq!(exception_class(&err), ExceptionClass::Value);
    }

    #[test]
    fn allocation_failure_is_memory_error() {
        let err = ScriptError::from(EngineError::CapacityOverflow);
        assert!(err.is_allocation());
        assert_eq!(exception_class(&err), ExceptionClass::Memory);

        let err = ScriptError::from(EngineError::AllocationFailed { requested: 1 << 20 });
        assert_eq!(exception_class(&err), ExceptionClass::Memory);
    }

    #[test]
    fn other_failures_are_runtime_errors() {
        let err = ScriptError::Runtime {
            message: "error while resizing buffer",
            source: None,
        };
        assert_eq!(exception_class(&err), ExceptionClass::Runtime);
    }
}
