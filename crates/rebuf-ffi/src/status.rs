//! C-compatible status codes.

use rebuf_core::CoreError;
use rebuf_engine::EngineError;

/// Status code returned by every FFI function.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebufStatus {
    /// Success.
    Ok = 0,
    /// Handle is invalid or was already destroyed.
    InvalidHandle = -1,
    /// A pointer argument is null or otherwise unusable.
    InvalidArgument = -2,
    /// A size, length or element size of zero, or a shrink below zero.
    InvalidSize = -3,
    /// The allocator could not satisfy the request.
    AllocationFailed = -4,
    /// The requested byte count overflows.
    CapacityOverflow = -5,
    /// Attempted to grow a wrapped buffer past its region.
    BorrowedRegion = -6,
    /// Element index out of range for the requested type.
    IndexOutOfRange = -7,
    /// Type code is malformed or names an unknown kind.
    InvalidType = -8,
    /// Internal error (e.g. poisoned mutex after a prior panic).
    InternalError = -20,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&EngineError> for RebufStatus {
    fn from(e: &EngineError) -> Self {
        match e {
            EngineError::InvalidSize => RebufStatus::InvalidSize,
            EngineError::CapacityOverflow => RebufStatus::CapacityOverflow,
            EngineError::AllocationFailed { .. } => RebufStatus::AllocationFailed,
            EngineError::BorrowedRegion { .. } => RebufStatus::BorrowedRegion,
            EngineError::NullPointer => RebufStatus::InvalidArgument,
        }
    }
}

impl From<&CoreError> for RebufStatus {
    fn from(_e: &CoreError) -> Self {
        RebufStatus::InvalidType
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(RebufStatus::Ok as i32, 0);
        assert_eq!(RebufStatus::InvalidHandle as i32, -1);
        assert_eq!(RebufStatus::InvalidType as i32, -8);
        assert_eq!(RebufStatus::InternalError as i32, -20);
        assert_eq!(RebufStatus::Panicked as i32, -128);
    }

    #[test]
    fn engine_errors_map() {
        assert_eq!(
            RebufStatus::from(&EngineError::AllocationFailed { requested: 1 }),
            RebufStatus::AllocationFailed
        );
        assert_eq!(
            RebufStatus::from(&EngineError::NullPointer),
            RebufStatus::InvalidArgument
        );
        assert_eq!(
            RebufStatus::from(&CoreError::InvalidTypeCode { code: 99 }),
            RebufStatus::InvalidType
        );
    }
}
