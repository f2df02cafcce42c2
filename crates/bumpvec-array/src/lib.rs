//! Growable array of opaque fixed-size records.
//!
//! [`DynArray`] stores `len` records of `element_size` bytes each, backed
//! either by an owned heap buffer or by a region of a [`Pool`]. The pool
//! backend never frees individual regions, so the array works with the
//! pool's tail instead:
//!
//! - growth extends the storage in place while it is the pool's most
//!   recent allocation, and only copies to a fresh region otherwise;
//! - [`clear`](DynArray::clear) and [`release`](DynArray::release) rewind
//!   the pool over the storage (and a pool-charged header) when they are
//!   still the tail.
//!
//! # Lifecycle
//!
//! ```text
//! create / init_in_place ──► valid ──(reserve, push_*, pop_back, clear)──► valid
//!                              │
//!                              └──► release(self) ──► gone
//! ```
//!
//! Every mutating operation reports allocation failure as an
//! [`ArrayError`] and leaves `len` and `capacity` untouched.
//!
//! [`Pool`]: bumpvec_pool::Pool

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod array;
pub mod error;
pub mod slots;

pub use array::{DynArray, HeaderOrigin, HEADER_BYTES};
pub use error::ArrayError;
pub use slots::{Element, Slots, SlotsMut};
