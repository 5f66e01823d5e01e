//! Type descriptor errors.

use std::error::Error;
use std::fmt;

/// Errors from validating or resolving a type descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// The code has stray high bits, an unassigned kind nibble, or names a
    /// kind the host cannot represent.
    InvalidTypeCode {
        /// The rejected code.
        code: i64,
    },
    /// The name matches no available kind.
    UnknownTypeName {
        /// The rejected name, as supplied.
        name: String,
    },
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTypeCode { code } => write!(f, "invalid type code {code:#x}"),
            Self::UnknownTypeName { name } => write!(f, "unknown type name '{name}'"),
        }
    }
}

impl Error for CoreError {}
