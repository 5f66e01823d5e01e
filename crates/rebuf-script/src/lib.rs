//! Dynamic binding adapter for rebuf buffers.
//!
//! Projects the engine's [`Buffer`](rebuf_engine::Buffer) onto the object
//! model of a dynamically typed scripting host: buffers become shared
//! handles with a mutable current type, indexable by number and carrying
//! `size`, `length` and `type` properties. Every entry point validates its
//! arguments and reports failures as [`ScriptError`] values shaped like a
//! host's argument and runtime errors.
//!
//! The adapter is host-agnostic. A host embeds it by converting its own
//! values to and from [`Value`], then routing:
//!
//! - library calls through [`Library::call`] (or the typed methods),
//! - `obj[key]` / `obj[key] = v` through [`Library::index`] and
//!   [`Library::new_index`],
//! - `#obj` through [`Library::len`], iteration through [`Library::ipairs`].
//!
//! Buffers are reference-counted; dropping the last [`BufferRef`] releases
//! owned memory, which is how a host garbage collector's finalizer maps
//! onto the engine.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
mod dispatch;
pub mod error;
pub mod handle;
pub mod library;
mod resolve;
pub mod value;

pub use config::{AdapterConfig, IndexBase};
pub use error::{ArgKind, ScriptError};
pub use handle::BufferRef;
pub use library::Library;
pub use value::{Function, Key, Table, Value, Values};
