//! Adapter configuration.

use rebuf_core::{ConfigError, HostNumerics};

/// Index of the first element as seen by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IndexBase {
    /// Zero-based indexing (Python and most C-family hosts).
    Zero,
    /// One-based indexing (Lua-style hosts).
    #[default]
    One,
}

impl IndexBase {
    /// The host index of element 0.
    pub const fn offset(self) -> i64 {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }

    /// Convert a host index to an element slot. `None` if the index lies
    /// below the base.
    pub fn slot(self, index: i64) -> Option<usize> {
        let slot = index.checked_sub(self.offset())?;
        usize::try_from(slot).ok()
    }
}

/// Configuration for a [`Library`](crate::Library).
///
/// # Examples
///
/// ```
/// use rebuf_script::{AdapterConfig, IndexBase};
///
/// let config = AdapterConfig::default();
/// assert_eq!(config.index_base, IndexBase::One);
/// assert_eq!(AdapterConfig::python().index_base, IndexBase::Zero);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Numeric limits of the host. Decides which element types exist and
    /// how element values are narrowed on the way out.
    pub numerics: HostNumerics,
    /// Index convention for element access and iteration.
    pub index_base: IndexBase,
}

impl AdapterConfig {
    /// Configuration for a 64-bit, zero-based host such as CPython.
    pub const fn python() -> Self {
        Self {
            numerics: HostNumerics::DEFAULT,
            index_base: IndexBase::Zero,
        }
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.numerics.validate()
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            numerics: HostNumerics::DEFAULT,
            index_base: IndexBase::One,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_based_slots() {
        assert_eq!(IndexBase::One.slot(1), Some(0));
        assert_eq!(IndexBase::One.slot(0), None);
        assert_eq!(IndexBase::One.slot(i64::MIN), None);
    }

    #[test]
    fn zero_based_slots() {
        assert_eq!(IndexBase::Zero.slot(0), Some(0));
        assert_eq!(IndexBase::Zero.slot(-1), None);
    }

    #[test]
    fn default_validates() {
        assert!(AdapterConfig::default().validate().is_ok());
        let bad = AdapterConfig {
            numerics: HostNumerics {
                integer_bits: 12,
                float_bits: 64,
            },
            ..AdapterConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
