//! Reusable pool fixtures.
//!
//! - [`region`] — a shared single-block pool covering `[0, bytes)`.
//! - [`instrumented_region`] — the same, wrapped in [`InstrumentedPool`].
//! - [`advance_tail`] — simulate an unrelated allocation landing after an
//!   array's storage.

use std::cell::RefCell;

use bumpvec_pool::{BumpPool, Pool, PoolSpan};

use crate::InstrumentedPool;

/// A shared single-block pool covering `[0, bytes)`.
pub fn region(bytes: usize) -> RefCell<BumpPool> {
    RefCell::new(BumpPool::with_region(bytes).expect("non-zero region"))
}

/// A shared instrumented single-block pool covering `[0, bytes)`.
pub fn instrumented_region(bytes: usize) -> RefCell<InstrumentedPool> {
    RefCell::new(InstrumentedPool::with_region(bytes))
}

/// Allocate `bytes` from `pool` on behalf of some other owner, so that
/// whatever was the tail before no longer is.
pub fn advance_tail<P: Pool>(pool: &RefCell<P>, bytes: usize) -> PoolSpan {
    pool.borrow_mut()
        .allocate(bytes)
        .expect("fixture pool has room for the interloper")
}
