//! Rebuf: growable byte buffers whose contents can be read and written as
//! any primitive numeric type, plus an adapter that exposes them to a
//! dynamically typed scripting host.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the rebuf sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use rebuf::prelude::*;
//!
//! // Typed access straight on the engine.
//! let mut buf = Buffer::allocate_zeroed(4, 4).unwrap();
//! assert!(buf.set::<i32>(0, -1));
//! assert_eq!(buf.get::<u32>(0), Some(u32::MAX));
//! assert_eq!(buf.get::<u32>(4), None);
//!
//! // The same through the scripting adapter, one-based.
//! let lib = Library::default();
//! let shorts = lib.calloc(3, &Value::from("short")).unwrap();
//! lib.set(&shorts, 1, &Value::Integer(-2), &Value::from("signed short"))
//!     .unwrap();
//! assert_eq!(lib.get(&shorts, 1, &Value::Nil).unwrap(), Value::Integer(65534));
//! assert_eq!(lib.len(&shorts).unwrap(), 3);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `rebuf-core` | Kinds, type codes, host capabilities |
//! | [`engine`] | `rebuf-engine` | The buffer and its typed views |
//! | [`script`] | `rebuf-script` | Dynamic values and the library table |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Element kinds, type codes and host capabilities (`rebuf-core`).
pub use rebuf_core as types;

/// Buffers and typed element access (`rebuf-engine`).
///
/// [`engine::Buffer`] owns or borrows a byte region; [`engine::Element`]
/// is the set of primitive types it can be viewed as.
pub use rebuf_engine as engine;

/// The dynamic binding adapter (`rebuf-script`).
///
/// [`script::Library`] is the function table a host registers;
/// [`script::Value`] is the value model it converts to and from.
pub use rebuf_script as script;

/// Common imports for typical rebuf usage.
pub mod prelude {
    // Core types
    pub use rebuf_core::{Capabilities, ElemType, HostNumerics, Kind, Scalar};

    // Engine
    pub use rebuf_engine::{Buffer, Element, EngineError, Ownership};

    // Adapter
    pub use rebuf_script::{AdapterConfig, BufferRef, IndexBase, Library, ScriptError, Value};
}
