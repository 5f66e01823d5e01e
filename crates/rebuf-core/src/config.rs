//! Host numeric configuration.

use std::error::Error;
use std::fmt;

/// Numeric representation of the host that consumes buffer elements.
///
/// A scripting host stores numbers in a fixed-width integer and a
/// fixed-width float. An element kind is only exposed to that host if its
/// values fit the host integer losslessly (or, for `double`, if the host
/// float is double precision). Validated with [`HostNumerics::validate`];
/// immutable once a capability table is built from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostNumerics {
    /// Width of the host's integer type in bits. One of 8, 16, 32, 64.
    pub integer_bits: u32,
    /// Width of the host's floating-point type in bits. Either 32 or 64.
    pub float_bits: u32,
}

impl HostNumerics {
    /// 64-bit integers and double-precision floats. Every kind is available.
    pub const DEFAULT: HostNumerics = HostNumerics {
        integer_bits: 64,
        float_bits: 64,
    };

    /// A host built with 32-bit integers and single-precision floats.
    pub const LUA_32BITS: HostNumerics = HostNumerics {
        integer_bits: 32,
        float_bits: 32,
    };

    /// Check that both widths are ones a host can actually have.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.integer_bits, 8 | 16 | 32 | 64) {
            return Err(ConfigError::IntegerBits {
                bits: self.integer_bits,
            });
        }
        if !matches!(self.float_bits, 32 | 64) {
            return Err(ConfigError::FloatBits {
                bits: self.float_bits,
            });
        }
        Ok(())
    }
}

impl Default for HostNumerics {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Invalid host numeric configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// Integer width is not 8, 16, 32 or 64 bits.
    IntegerBits {
        /// The rejected width.
        bits: u32,
    },
    /// Float width is not 32 or 64 bits.
    FloatBits {
        /// The rejected width.
        bits: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IntegerBits { bits } => {
                write!(f, "host integer width must be 8, 16, 32 or 64 bits, got {bits}")
            }
            Self::FloatBits { bits } => {
                write!(f, "host float width must be 32 or 64 bits, got {bits}")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        assert!(HostNumerics::DEFAULT.validate().is_ok());
        assert!(HostNumerics::LUA_32BITS.validate().is_ok());
    }

    #[test]
    fn odd_integer_width_rejected() {
        let numerics = HostNumerics {
            integer_bits: 48,
            float_bits: 64,
        };
        assert_eq!(
            numerics.validate(),
            Err(ConfigError::IntegerBits { bits: 48 })
        );
    }

    #[test]
    fn half_precision_host_rejected() {
        let numerics = HostNumerics {
            integer_bits: 64,
            float_bits: 16,
        };
        assert_eq!(numerics.validate(), Err(ConfigError::FloatBits { bits: 16 }));
    }
}
