//! Growable byte buffers with typed, reinterpretable element views.
//!
//! A [`Buffer`] is a contiguous byte region plus bookkeeping (logical size,
//! capacity, ownership and a 32-bit user tag). Its bytes can be read and
//! written as any [`Element`] type, chosen per access: the same memory
//! written as `i32` can be read back as `f32`. All `unsafe` memory handling
//! is confined to the `raw` module plus the documented unchecked accessors.
//!
//! # Ownership
//!
//! ```text
//! Buffer
//! ├── Owned     allocated by the engine, released exactly once on drop
//! │   └── capacity == 0  degenerate/empty; first resize allocates
//! └── Borrowed  wrapped foreign region, never released by the engine
//! ```
//!
//! # Access paths
//!
//! - **Checked:** [`Buffer::get`], [`Buffer::set`], [`Buffer::read`],
//!   [`Buffer::write`]. Out-of-range indices yield `None` / `false`.
//! - **Unchecked:** [`Buffer::get_unchecked`], [`Buffer::set_unchecked`],
//!   [`Buffer::raw_view`]. The caller guarantees the index is in range.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod buffer;
pub mod element;
pub mod error;
mod raw;

pub use buffer::{Buffer, Ownership};
pub use element::Element;
pub use error::EngineError;
