//! bumpvec: growable arrays that cooperate with an append-only bump pool.
//!
//! This is the top-level facade crate that re-exports the public API from
//! the bumpvec sub-crates. For most users, adding `bumpvec` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::cell::RefCell;
//! use bumpvec::prelude::*;
//!
//! let pool = RefCell::new(BumpPool::new(PoolConfig::default()).unwrap());
//! let before = pool.borrow().tail();
//!
//! let mut arr = DynArray::create(Some(&pool), 2, 4).unwrap();
//! for v in 0u32..10 {
//!     arr.push_back(&v.to_le_bytes()).unwrap();
//! }
//! assert_eq!(arr.pop_back().unwrap().as_slice(), &9u32.to_le_bytes());
//!
//! // The array is still the pool's most recent allocation, so release
//! // hands every byte back.
//! arr.release();
//! assert_eq!(pool.borrow().tail(), before);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`array`] | `bumpvec-array` | `DynArray`, record views, `ArrayError` |
//! | [`pool`] | `bumpvec-pool` | `Pool` trait, `BumpPool`, spans and config |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// The dynamic array (`bumpvec-array`).
pub use bumpvec_array as array;

/// The pool collaborator (`bumpvec-pool`).
pub use bumpvec_pool as pool;

/// Common imports for working with bumpvec.
pub mod prelude {
    pub use bumpvec_array::{ArrayError, DynArray, Element, HeaderOrigin, Slots, SlotsMut};
    pub use bumpvec_pool::{BumpPool, Pool, PoolConfig, PoolCursor, PoolError, PoolSpan};
}
