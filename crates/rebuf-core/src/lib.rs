//! Core types for the rebuf reinterpretable buffer.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! runtime type descriptor model shared by the engine, the scripting
//! adapter and the C ABI: element kinds, the 5-bit type code, the host
//! numeric capability table, and the [`Scalar`] value exchanged by
//! runtime-typed accessors.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod capability;
pub mod config;
pub mod error;
pub mod kind;
pub mod scalar;

pub use capability::Capabilities;
pub use config::{ConfigError, HostNumerics};
pub use error::CoreError;
pub use kind::{ElemType, Kind, Repr};
pub use scalar::Scalar;
