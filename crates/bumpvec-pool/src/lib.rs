//! Append-only bump pool for bumpvec arrays.
//!
//! A [`BumpPool`] hands out monotonically growing regions of a chain of
//! fixed-size blocks and never frees individual allocations. The only way
//! to give memory back is to undo the most recent allocation (rewind the
//! tail) or to [`reset`](BumpPool::reset) the whole pool.
//!
//! # Architecture
//!
//! ```text
//! BumpPool
//! └── Block[] (Vec<u8> + cursor, chained when the current block is full)
//!       ├── PoolSpan   (block, offset, len) — a region handed out
//!       └── PoolCursor (block, offset)      — the tail / high-water mark
//! ```
//!
//! Consumers talk to the pool through the narrow [`Pool`] trait. Tail
//! extension and rewind are exposed as checked operations so that a caller
//! never touches the pool's internals directly.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bump;
pub mod config;
pub mod error;
pub mod pool;
pub mod span;

pub use bump::BumpPool;
pub use config::PoolConfig;
pub use error::PoolError;
pub use pool::Pool;
pub use span::{PoolCursor, PoolSpan};
