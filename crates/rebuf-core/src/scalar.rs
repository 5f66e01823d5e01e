//! Runtime-typed element values.

/// One element value, as read from or written to a runtime-typed slot.
///
/// Reads produce the variant matching the slot's representation. Writes
/// accept any variant and convert with `as` semantics: integers truncate
/// to the element width, floats saturate when stored into integers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scalar {
    /// A signed integer element.
    Signed(i64),
    /// An unsigned integer element.
    Unsigned(u64),
    /// A floating-point element.
    Float(f64),
}

impl Scalar {
    /// The value as an `i64`. Unsigned values wrap; floats truncate.
    pub fn to_i64_wrapping(self) -> i64 {
        match self {
            Scalar::Signed(v) => v,
            Scalar::Unsigned(v) => v as i64,
            Scalar::Float(v) => v as i64,
        }
    }

    /// The value as an `f64`.
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Signed(v) => v as f64,
            Scalar::Unsigned(v) => v as f64,
            Scalar::Float(v) => v,
        }
    }

    /// Whether this is an integer variant.
    pub fn is_integer(self) -> bool {
        !matches!(self, Scalar::Float(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsigned_wraps_into_i64() {
        assert_eq!(Scalar::Unsigned(u64::MAX).to_i64_wrapping(), -1);
    }

    #[test]
    fn float_is_not_integer() {
        assert!(!Scalar::Float(1.0).is_integer());
        assert!(Scalar::Signed(1).is_integer());
        assert!(Scalar::Unsigned(1).is_integer());
    }
}
