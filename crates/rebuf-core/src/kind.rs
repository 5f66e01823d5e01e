//! Element kinds and the 5-bit type code.
//!
//! A type code packs a signedness bit (bit 4) and a kind nibble (bits 0–3):
//!
//! ```text
//!  4   3 2 1 0
//! [S] [ kind  ]
//! ```
//!
//! C-named kinds (`char`, `short`, `int`, `long`, `long long`) take their
//! width from the platform's C ABI; the numbered kinds are fixed-width.

use std::fmt;
use std::mem::size_of;
use std::os::raw::{c_char, c_int, c_long, c_longlong, c_short};

/// The family of an element type, independent of signedness.
///
/// Discriminants are the kind nibble stored in a type code and are ABI-stable.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
    /// C `char`.
    Char = 0x0,
    /// C `short`.
    Short = 0x1,
    /// C `int`.
    Int = 0x2,
    /// C `long`.
    Long = 0x3,
    /// C `long long`.
    LongLong = 0x4,
    /// IEEE-754 single precision.
    Float = 0x5,
    /// IEEE-754 double precision.
    Double = 0x6,
    /// Exactly 8 bits.
    Bits8 = 0x7,
    /// Exactly 16 bits.
    Bits16 = 0x8,
    /// Exactly 32 bits.
    Bits32 = 0x9,
    /// Exactly 64 bits.
    Bits64 = 0xa,
}

impl Kind {
    /// Every kind, in nibble order.
    pub const ALL: [Kind; 11] = [
        Kind::Char,
        Kind::Short,
        Kind::Int,
        Kind::Long,
        Kind::LongLong,
        Kind::Float,
        Kind::Double,
        Kind::Bits8,
        Kind::Bits16,
        Kind::Bits32,
        Kind::Bits64,
    ];

    /// The kind nibble of this kind.
    pub const fn nibble(self) -> u8 {
        self as u8
    }

    /// Decode a kind nibble. Returns `None` for unassigned nibbles.
    pub const fn from_nibble(nibble: u8) -> Option<Kind> {
        match nibble {
            0x0 => Some(Kind::Char),
            0x1 => Some(Kind::Short),
            0x2 => Some(Kind::Int),
            0x3 => Some(Kind::Long),
            0x4 => Some(Kind::LongLong),
            0x5 => Some(Kind::Float),
            0x6 => Some(Kind::Double),
            0x7 => Some(Kind::Bits8),
            0x8 => Some(Kind::Bits16),
            0x9 => Some(Kind::Bits32),
            0xa => Some(Kind::Bits64),
            _ => None,
        }
    }

    /// Width of one element of this kind, in bytes.
    pub const fn width(self) -> usize {
        match self {
            Kind::Char => size_of::<c_char>(),
            Kind::Short => size_of::<c_short>(),
            Kind::Int => size_of::<c_int>(),
            Kind::Long => size_of::<c_long>(),
            Kind::LongLong => size_of::<c_longlong>(),
            Kind::Float => 4,
            Kind::Double => 8,
            Kind::Bits8 => 1,
            Kind::Bits16 => 2,
            Kind::Bits32 => 4,
            Kind::Bits64 => 8,
        }
    }

    /// Whether this is a floating-point kind.
    ///
    /// Floating kinds have no signed/unsigned distinction: both forms share
    /// one representation.
    pub const fn is_float(self) -> bool {
        matches!(self, Kind::Float | Kind::Double)
    }

    /// Names accepted for this kind by name resolution.
    ///
    /// The first entry is the canonical name.
    pub const fn names(self) -> &'static [&'static str] {
        match self {
            Kind::Char => &["char"],
            Kind::Short => &["short"],
            Kind::Int => &["int"],
            Kind::Long => &["long"],
            Kind::LongLong => &["long long"],
            Kind::Float => &["float"],
            Kind::Double => &["double"],
            Kind::Bits8 => &["8", "int8"],
            Kind::Bits16 => &["16", "int16"],
            Kind::Bits32 => &["32", "int32"],
            Kind::Bits64 => &["64", "int64"],
        }
    }

    /// The canonical name of this kind.
    pub const fn name(self) -> &'static str {
        self.names()[0]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Concrete in-memory representation an element type maps to.
///
/// This is what typed accessors dispatch on: `(kind, signedness)` pairs
/// collapse onto one of ten primitive types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Repr {
    /// `i8`
    I8,
    /// `u8`
    U8,
    /// `i16`
    I16,
    /// `u16`
    U16,
    /// `i32`
    I32,
    /// `u32`
    U32,
    /// `i64`
    I64,
    /// `u64`
    U64,
    /// `f32`
    F32,
    /// `f64`
    F64,
}

impl Repr {
    /// Width in bytes.
    pub const fn width(self) -> usize {
        match self {
            Repr::I8 | Repr::U8 => 1,
            Repr::I16 | Repr::U16 => 2,
            Repr::I32 | Repr::U32 | Repr::F32 => 4,
            Repr::I64 | Repr::U64 | Repr::F64 => 8,
        }
    }

    /// Whether the representation is floating point.
    pub const fn is_float(self) -> bool {
        matches!(self, Repr::F32 | Repr::F64)
    }

    /// Integer representation of the given width and signedness.
    ///
    /// Returns `None` for widths other than 1, 2, 4 and 8.
    pub const fn integer(width: usize, signed: bool) -> Option<Repr> {
        let repr = match (width, signed) {
            (1, true) => Repr::I8,
            (1, false) => Repr::U8,
            (2, true) => Repr::I16,
            (2, false) => Repr::U16,
            (4, true) => Repr::I32,
            (4, false) => Repr::U32,
            (8, true) => Repr::I64,
            (8, false) => Repr::U64,
            _ => return None,
        };
        Some(repr)
    }
}

/// A runtime element type: a kind plus signedness.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElemType {
    /// Element kind.
    pub kind: Kind,
    /// Signedness flag. Ignored by floating kinds for representation, but
    /// preserved in the type code.
    pub signed: bool,
}

impl ElemType {
    /// Bit marking a signed type code.
    pub const SIGNED_BIT: u8 = 0x10;
    /// Mask selecting the kind nibble.
    pub const KIND_MASK: u8 = 0x0f;
    /// Mask selecting every bit a type code may use.
    pub const CODE_MASK: u8 = 0x1f;

    /// `unsigned char`, code 0. The type of a freshly created buffer.
    pub const UNSIGNED_CHAR: ElemType = ElemType::unsigned(Kind::Char);

    /// Signed variant of `kind`.
    pub const fn signed(kind: Kind) -> Self {
        Self { kind, signed: true }
    }

    /// Unsigned variant of `kind`.
    pub const fn unsigned(kind: Kind) -> Self {
        Self {
            kind,
            signed: false,
        }
    }

    /// The 5-bit type code.
    pub const fn code(self) -> u8 {
        if self.signed {
            self.kind.nibble() | Self::SIGNED_BIT
        } else {
            self.kind.nibble()
        }
    }

    /// Decode a type code without consulting host capabilities.
    ///
    /// Returns `None` if the code has bits outside [`Self::CODE_MASK`] or an
    /// unassigned kind nibble.
    pub fn from_code(code: i64) -> Option<Self> {
        if code < 0 || code > i64::from(Self::CODE_MASK) {
            return None;
        }
        let code = code as u8;
        let kind = Kind::from_nibble(code & Self::KIND_MASK)?;
        Some(Self {
            kind,
            signed: code & Self::SIGNED_BIT != 0,
        })
    }

    /// Width of one element, in bytes.
    pub const fn width(self) -> usize {
        self.kind.width()
    }

    /// The primitive representation this type reads and writes as.
    pub fn repr(self) -> Repr {
        match self.kind {
            Kind::Float => Repr::F32,
            Kind::Double => Repr::F64,
            // C integer widths are always one of 1/2/4/8 on supported targets.
            kind => Repr::integer(kind.width(), self.signed).unwrap_or(if self.signed {
                Repr::I64
            } else {
                Repr::U64
            }),
        }
    }
}

impl Default for ElemType {
    fn default() -> Self {
        Self::UNSIGNED_CHAR
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_float() {
            write!(f, "{}", self.kind)
        } else if self.signed {
            write!(f, "signed {}", self.kind)
        } else {
            write!(f, "unsigned {}", self.kind)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nibbles_are_stable() {
        assert_eq!(Kind::Char.nibble(), 0x0);
        assert_eq!(Kind::Short.nibble(), 0x1);
        assert_eq!(Kind::Int.nibble(), 0x2);
        assert_eq!(Kind::Long.nibble(), 0x3);
        assert_eq!(Kind::LongLong.nibble(), 0x4);
        assert_eq!(Kind::Float.nibble(), 0x5);
        assert_eq!(Kind::Double.nibble(), 0x6);
        assert_eq!(Kind::Bits8.nibble(), 0x7);
        assert_eq!(Kind::Bits16.nibble(), 0x8);
        assert_eq!(Kind::Bits32.nibble(), 0x9);
        assert_eq!(Kind::Bits64.nibble(), 0xa);
    }

    #[test]
    fn fixed_widths() {
        assert_eq!(Kind::Char.width(), 1);
        assert_eq!(Kind::Bits8.width(), 1);
        assert_eq!(Kind::Bits16.width(), 2);
        assert_eq!(Kind::Bits32.width(), 4);
        assert_eq!(Kind::Bits64.width(), 8);
        assert_eq!(Kind::Float.width(), 4);
        assert_eq!(Kind::Double.width(), 8);
    }

    #[test]
    fn signed_code_sets_bit_four() {
        assert_eq!(ElemType::signed(Kind::Int).code(), 0x12);
        assert_eq!(ElemType::unsigned(Kind::Int).code(), 0x02);
        assert_eq!(ElemType::UNSIGNED_CHAR.code(), 0);
    }

    #[test]
    fn from_code_rejects_stray_bits() {
        assert_eq!(ElemType::from_code(0x20), None);
        assert_eq!(ElemType::from_code(0x22), None);
        assert_eq!(ElemType::from_code(-1), None);
    }

    #[test]
    fn from_code_rejects_unassigned_nibbles() {
        for nibble in 0xb..=0xf {
            assert_eq!(ElemType::from_code(nibble), None);
            assert_eq!(ElemType::from_code(nibble | 0x10), None);
        }
    }

    #[test]
    fn float_kinds_share_representation() {
        assert_eq!(ElemType::signed(Kind::Float).repr(), Repr::F32);
        assert_eq!(ElemType::unsigned(Kind::Float).repr(), Repr::F32);
        assert_eq!(ElemType::signed(Kind::Double).repr(), Repr::F64);
    }

    #[test]
    fn char_signedness_is_explicit() {
        assert_eq!(ElemType::signed(Kind::Char).repr(), Repr::I8);
        assert_eq!(ElemType::unsigned(Kind::Char).repr(), Repr::U8);
    }

    #[test]
    fn display_names() {
        assert_eq!(ElemType::signed(Kind::LongLong).to_string(), "signed long long");
        assert_eq!(ElemType::unsigned(Kind::Bits16).to_string(), "unsigned 16");
        assert_eq!(ElemType::signed(Kind::Double).to_string(), "double");
    }

    proptest! {
        #[test]
        fn code_round_trips(nibble in 0u8..=0xa, signed in any::<bool>()) {
            let kind = Kind::from_nibble(nibble).unwrap();
            let ty = ElemType { kind, signed };
            prop_assert_eq!(ElemType::from_code(i64::from(ty.code())), Some(ty));
            prop_assert_eq!(ty.repr().width(), ty.width());
        }
    }
}
