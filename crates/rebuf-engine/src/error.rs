//! Engine error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during buffer allocation and resizing.
///
/// A failed operation never mutates the buffer it was called on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineError {
    /// A size, length or element size of zero (or a resize below zero).
    InvalidSize,
    /// The requested byte count overflows `usize` or exceeds the largest
    /// allocation the platform allows.
    CapacityOverflow,
    /// The allocator could not satisfy the request.
    AllocationFailed {
        /// Number of bytes requested.
        requested: usize,
    },
    /// Attempted to grow a borrowed buffer beyond the wrapped region.
    BorrowedRegion {
        /// Number of bytes requested.
        requested: usize,
        /// Size of the wrapped region.
        extent: usize,
    },
    /// A null pointer was supplied where a region was required.
    NullPointer,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize => write!(f, "buffer size must be positive"),
            Self::CapacityOverflow => write!(f, "requested buffer size overflows"),
            Self::AllocationFailed { requested } => {
                write!(f, "failed to allocate {requested} bytes")
            }
            Self::BorrowedRegion { requested, extent } => {
                write!(
                    f,
                    "cannot grow borrowed buffer to {requested} bytes: wrapped region is {extent} bytes"
                )
            }
            Self::NullPointer => write!(f, "null pointer"),
        }
    }
}

impl Error for EngineError {}
