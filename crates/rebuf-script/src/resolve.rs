//! Argument validation and type resolution.

use rebuf_core::{Capabilities, ElemType};
use rebuf_engine::Buffer;

use crate::error::ScriptError;
use crate::handle::{current_type, BufferRef};
use crate::value::Value;

/// Positional arguments of one library call, named for error messages.
pub(crate) struct Args<'a> {
    function: &'static str,
    values: &'a [Value],
    nil: Value,
}

impl<'a> Args<'a> {
    pub(crate) fn new(function: &'static str, values: &'a [Value]) -> Self {
        Self {
            function,
            values,
            nil: Value::Nil,
        }
    }

    /// Argument `n` (1-based). Missing arguments are `Nil`.
    pub(crate) fn get(&self, n: usize) -> &Value {
        n.checked_sub(1)
            .and_then(|i| self.values.get(i))
            .unwrap_or(&self.nil)
    }

    pub(crate) fn buffer(&self, n: usize) -> Result<BufferRef, ScriptError> {
        check_buffer(self.function, n, self.get(n)).cloned()
    }

    pub(crate) fn integer(&self, n: usize) -> Result<i64, ScriptError> {
        check_integer(self.function, n, self.get(n))
    }
}

pub(crate) fn check_buffer<'v>(
    function: &'static str,
    arg: usize,
    value: &'v Value,
) -> Result<&'v BufferRef, ScriptError> {
    value
        .as_buffer()
        .ok_or_else(|| ScriptError::wrong_type(function, arg, "buffer", value.type_name()))
}

/// An integer argument. Floats are accepted when integral.
pub(crate) fn check_integer(
    function: &'static str,
    arg: usize,
    value: &Value,
) -> Result<i64, ScriptError> {
    match value {
        Value::Integer(v) => Ok(*v),
        Value::Number(_) => value.as_integer().ok_or_else(|| {
            ScriptError::arg(function, arg, "number has no integer representation")
        }),
        other => Err(ScriptError::wrong_type(
            function,
            arg,
            "number",
            other.type_name(),
        )),
    }
}

pub(crate) fn check_number(
    function: &'static str,
    arg: usize,
    value: &Value,
) -> Result<f64, ScriptError> {
    value
        .as_number()
        .ok_or_else(|| ScriptError::wrong_type(function, arg, "number", value.type_name()))
}

/// Resolve a type argument.
///
/// Integers (and integral floats) are type codes; strings are type names
/// with an optional `signed ` / `unsigned ` prefix; `Nil` means the
/// buffer's current type when a buffer is in context. Anything else, or a
/// type the host cannot use, is an argument error.
pub(crate) fn resolve_type(
    caps: &Capabilities,
    function: &'static str,
    arg: usize,
    value: &Value,
    buf: Option<&Buffer>,
) -> Result<ElemType, ScriptError> {
    let resolved = match (value, buf) {
        (Value::Str(name), _) => caps.resolve_name(name).ok(),
        (Value::Nil, Some(buf)) => Some(current_type(buf)),
        (other, _) => other.as_integer().and_then(|code| caps.validate(code).ok()),
    };
    resolved.ok_or_else(|| ScriptError::arg(function, arg, "must be a valid type"))
}
