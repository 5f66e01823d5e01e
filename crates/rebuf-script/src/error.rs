//! Adapter error types.

use std::error::Error;
use std::fmt;

use rebuf_engine::EngineError;

/// Why an argument was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArgKind {
    /// The argument has the wrong dynamic type, e.g. a string where a number
    /// was expected.
    WrongType,
    /// The argument has an acceptable type but an unusable value.
    BadValue,
}

/// Errors raised by adapter operations.
///
/// The two variants mirror the two error shapes a scripting host exposes:
/// a complaint about one argument of a named function, and a general
/// runtime failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScriptError {
    /// An argument failed validation.
    Arg {
        /// Name of the library function that rejected the argument.
        function: &'static str,
        /// 1-based position of the argument, counting the buffer.
        arg: usize,
        /// Whether the type or the value of the argument was wrong.
        kind: ArgKind,
        /// What was wrong with it.
        message: String,
    },
    /// The operation was well-formed but could not be carried out.
    Runtime {
        /// Host-facing description.
        message: &'static str,
        /// Engine failure behind this error, if any.
        source: Option<EngineError>,
    },
}

impl ScriptError {
    pub(crate) fn arg(function: &'static str, arg: usize, message: impl Into<String>) -> Self {
        Self::Arg {
            function,
            arg,
            kind: ArgKind::BadValue,
            message: message.into(),
        }
    }

    /// `expected` was wanted but a value of host type `got` was passed.
    pub(crate) fn wrong_type(
        function: &'static str,
        arg: usize,
        expected: &str,
        got: &str,
    ) -> Self {
        Self::Arg {
            function,
            arg,
            kind: ArgKind::WrongType,
            message: format!("{expected} expected, got {got}"),
        }
    }

    pub(crate) fn runtime(message: &'static str) -> Self {
        Self::Runtime {
            message,
            source: None,
        }
    }

    pub(crate) fn resize(source: EngineError) -> Self {
        Self::Runtime {
            message: "error while resizing buffer",
            source: Some(source),
        }
    }

    /// Whether this is an argument error.
    pub fn is_arg(&self) -> bool {
        matches!(self, Self::Arg { .. })
    }

    /// The argument kind, for argument errors.
    pub fn arg_kind(&self) -> Option<ArgKind> {
        match self {
            Self::Arg { kind, .. } => Some(*kind),
            Self::Runtime { .. } => None,
        }
    }

    /// Whether an engine allocation failure caused this error.
    pub fn is_allocation(&self) -> bool {
        matches!(
            self,
            Self::Runtime {
                source: Some(EngineError::AllocationFailed { .. } | EngineError::CapacityOverflow),
                ..
            }
        )
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arg {
                function,
                arg,
                message,
                ..
            } => write!(f, "bad argument #{arg} to '{function}' ({message})"),
            Self::Runtime { message, .. } => f.write_str(message),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Runtime {
                source: Some(err), ..
            } => Some(err),
            _ => None,
        }
    }
}

impl From<EngineError> for ScriptError {
    fn from(err: EngineError) -> Self {
        Self::Runtime {
            message: "failed to allocate buffer",
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_error_display() {
        let err = ScriptError::arg("new", 1, "size must be positive");
        assert_eq!(
            err.to_string(),
            "bad argument #1 to 'new' (size must be positive)"
        );
        assert!(err.is_arg());
        assert_eq!(err.arg_kind(), Some(ArgKind::BadValue));
        assert!(err.source().is_none());
    }

    #[test]
    fn wrong_type_is_structured() {
        let err = ScriptError::wrong_type("set", 3, "number", "string");
        assert_eq!(err.arg_kind(), Some(ArgKind::WrongType));
        assert_eq!(
            err.to_string(),
            "bad argument #3 to 'set' (number expected, got string)"
        );
        assert_eq!(ScriptError::runtime("x").arg_kind(), None);
    }

    #[test]
    fn engine_errors_become_runtime_errors() {
        let err = ScriptError::from(EngineError::AllocationFailed { requested: 8 });
        assert_eq!(err.to_string(), "failed to allocate buffer");
        assert!(err.is_allocation());
        assert!(err.source().is_some());

        let err = ScriptError::resize(EngineError::BorrowedRegion {
            requested: 9,
            extent: 8,
        });
        assert_eq!(err.to_string(), "error while resizing buffer");
        assert!(!err.is_allocation());
    }
}
