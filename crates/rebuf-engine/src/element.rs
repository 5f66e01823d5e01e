//! The [`Element`] trait: primitive types a buffer can be viewed as.

use std::fmt::Debug;

use rebuf_core::{Repr, Scalar};

mod sealed {
    pub trait Sealed {}
}

/// A fixed-width numeric type that can be read from and written to a
/// buffer at any byte offset.
///
/// Sealed: implemented for `i8`, `u8`, `i16`, `u16`, `i32`, `u32`, `i64`,
/// `u64`, `f32` and `f64`. Every bit pattern of these types is a valid
/// value, which is what makes reinterpretation sound.
pub trait Element: sealed::Sealed + Copy + Default + PartialEq + Debug + 'static {
    /// The runtime representation matching this type.
    const REPR: Repr;

    /// Widen into a [`Scalar`].
    fn to_scalar(self) -> Scalar;

    /// Narrow from a [`Scalar`] with `as` semantics.
    fn from_scalar(value: Scalar) -> Self;
}

macro_rules! impl_element {
    ($($ty:ty => $repr:ident, $variant:ident as $wide:ty;)*) => {
        $(
            impl sealed::Sealed for $ty {}

            impl Element for $ty {
                const REPR: Repr = Repr::$repr;

                fn to_scalar(self) -> Scalar {
                    Scalar::$variant(self as $wide)
                }

                fn from_scalar(value: Scalar) -> Self {
                    match value {
                        Scalar::Signed(v) => v as $ty,
                        Scalar::Unsigned(v) => v as $ty,
                        Scalar::Float(v) => v as $ty,
                    }
                }
            }
        )*
    };
}

impl_element! {
    i8 => I8, Signed as i64;
    u8 => U8, Unsigned as u64;
    i16 => I16, Signed as i64;
    u16 => U16, Unsigned as u64;
    i32 => I32, Signed as i64;
    u32 => U32, Unsigned as u64;
    i64 => I64, Signed as i64;
    u64 => U64, Unsigned as u64;
    f32 => F32, Float as f64;
    f64 => F64, Float as f64;
}

/// Run `$body` with `$t` bound to the primitive type for `$repr`.
macro_rules! with_repr {
    ($repr:expr, $t:ident => $body:expr) => {
        match $repr {
            rebuf_core::Repr::I8 => {
                type $t = i8;
                $body
            }
            rebuf_core::Repr::U8 => {
                type $t = u8;
                $body
            }
            rebuf_core::Repr::I16 => {
                type $t = i16;
                $body
            }
            rebuf_core::Repr::U16 => {
                type $t = u16;
                $body
            }
            rebuf_core::Repr::I32 => {
                type $t = i32;
                $body
            }
            rebuf_core::Repr::U32 => {
                type $t = u32;
                $body
            }
            rebuf_core::Repr::I64 => {
                type $t = i64;
                $body
            }
            rebuf_core::Repr::U64 => {
                type $t = u64;
                $body
            }
            rebuf_core::Repr::F32 => {
                type $t = f32;
                $body
            }
            rebuf_core::Repr::F64 => {
                type $t = f64;
                $body
            }
        }
    };
}

pub(crate) use with_repr;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repr_width_matches_size_of() {
        fn check<T: Element>() {
            assert_eq!(T::REPR.width(), std::mem::size_of::<T>());
        }
        check::<i8>();
        check::<u8>();
        check::<i16>();
        check::<u16>();
        check::<i32>();
        check::<u32>();
        check::<i64>();
        check::<u64>();
        check::<f32>();
        check::<f64>();
    }

    #[test]
    fn narrowing_truncates() {
        assert_eq!(i16::from_scalar(Scalar::Signed(1 << 15)), i16::MIN);
        assert_eq!(u8::from_scalar(Scalar::Signed(-1)), 0xff);
        assert_eq!(u8::from_scalar(Scalar::Unsigned(0x1234)), 0x34);
    }

    #[test]
    fn float_widening() {
        assert_eq!(1.5f32.to_scalar(), Scalar::Float(1.5));
        assert_eq!(u32::MAX.to_scalar(), Scalar::Unsigned(u64::from(u32::MAX)));
        assert_eq!((-3i8).to_scalar(), Scalar::Signed(-3));
    }

    #[test]
    fn with_repr_binds_type() {
        let width = with_repr!(Repr::U16, T => std::mem::size_of::<T>());
        assert_eq!(width, 2);
    }
}
