//! The host capability table.
//!
//! Which kinds a host may use is decided once, when the table is built from
//! [`HostNumerics`]. Code validation, name resolution and the published
//! name → code mapping all read the same table, so they cannot disagree.

use indexmap::IndexMap;

use crate::config::HostNumerics;
use crate::error::CoreError;
use crate::kind::{ElemType, Kind};

/// One row of the capability table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KindEntry {
    /// The kind this row describes.
    pub kind: Kind,
    /// Element width in bytes.
    pub width: usize,
    /// Whether the host can use this kind.
    pub available: bool,
}

/// Static set of element kinds available to one host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Capabilities {
    numerics: HostNumerics,
    entries: [KindEntry; 11],
}

impl Capabilities {
    /// Build the table for a host.
    ///
    /// Integer kinds are available when their width fits the host integer;
    /// `char`, `8` and `float` are always available; `double` requires a
    /// double-precision host float.
    pub fn new(numerics: HostNumerics) -> Self {
        let entries = Kind::ALL.map(|kind| {
            let width = kind.width();
            let available = match kind {
                Kind::Char | Kind::Bits8 | Kind::Float => true,
                Kind::Double => numerics.float_bits >= 64,
                _ => width as u64 * 8 <= u64::from(numerics.integer_bits),
            };
            KindEntry {
                kind,
                width,
                available,
            }
        });
        Self { numerics, entries }
    }

    /// The host numerics the table was built from.
    pub fn numerics(&self) -> HostNumerics {
        self.numerics
    }

    /// All rows, available or not, in nibble order.
    pub fn entries(&self) -> &[KindEntry] {
        &self.entries
    }

    /// Whether `kind` is available to this host.
    pub fn is_available(&self, kind: Kind) -> bool {
        self.entries[kind.nibble() as usize].available
    }

    /// Available kinds in nibble order.
    pub fn kinds(&self) -> impl Iterator<Item = Kind> + '_ {
        self.entries
            .iter()
            .filter(|entry| entry.available)
            .map(|entry| entry.kind)
    }

    /// Whether `code` names a type this host may use.
    pub fn is_valid(&self, code: i64) -> bool {
        self.validate(code).is_ok()
    }

    /// Decode `code`, rejecting stray bits, unassigned nibbles and kinds the
    /// host cannot represent.
    pub fn validate(&self, code: i64) -> Result<ElemType, CoreError> {
        ElemType::from_code(code)
            .filter(|ty| self.is_available(ty.kind))
            .ok_or(CoreError::InvalidTypeCode { code })
    }

    /// Look up an available kind by one of its names. Case-sensitive.
    pub fn lookup(&self, name: &str) -> Option<Kind> {
        self.kinds().find(|kind| kind.names().contains(&name))
    }

    /// Resolve a type name such as `"int"`, `"signed short"` or
    /// `"unsigned 32"`.
    ///
    /// An optional `"signed "` or `"unsigned "` prefix selects signedness;
    /// without one the type is unsigned.
    pub fn resolve_name(&self, name: &str) -> Result<ElemType, CoreError> {
        let (signed, base) = if let Some(rest) = name.strip_prefix("signed ") {
            (true, rest)
        } else if let Some(rest) = name.strip_prefix("unsigned ") {
            (false, rest)
        } else {
            (false, name)
        };
        let kind = self.lookup(base).ok_or_else(|| CoreError::UnknownTypeName {
            name: name.to_string(),
        })?;
        self.validate(i64::from(ElemType { kind, signed }.code()))
    }

    /// Name → unsigned code mapping of every available kind, aliases
    /// included, in nibble order.
    pub fn type_names(&self) -> IndexMap<&'static str, u8> {
        self.kinds()
            .flat_map(|kind| kind.names().iter().map(move |name| (*name, kind.nibble())))
            .collect()
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::new(HostNumerics::DEFAULT)
    }
}
