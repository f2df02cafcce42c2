//! Test utilities and pool doubles for bumpvec development.
//!
//! Provides [`InstrumentedPool`], a [`BumpPool`] wrapper that counts calls
//! and injects allocation failures, plus small [`fixtures`] for laying out
//! pools the way the array scenarios expect.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use bumpvec_pool::{BumpPool, Pool, PoolCursor, PoolError, PoolSpan};

/// A [`BumpPool`] that records how it is used and can be told to fail.
///
/// Every call to [`Pool::allocate`] (including those made through
/// [`Pool::zero_allocate`]) is counted. After
/// [`fail_after`](InstrumentedPool::fail_after) successful allocations,
/// further allocations return [`PoolError::CapacityExceeded`] without
/// touching the inner pool.
pub struct InstrumentedPool {
    inner: BumpPool,
    allocations: usize,
    failures: usize,
    extensions: usize,
    rewinds: usize,
    fail_after: Option<usize>,
}

impl InstrumentedPool {
    pub fn new(inner: BumpPool) -> Self {
        Self {
            inner,
            allocations: 0,
            failures: 0,
            extensions: 0,
            rewinds: 0,
            fail_after: None,
        }
    }

    /// Single-block pool covering `[0, bytes)`.
    pub fn with_region(bytes: usize) -> Self {
        Self::new(BumpPool::with_region(bytes).expect("non-zero region"))
    }

    /// Allow `n` more successful allocations, then fail every one after.
    pub fn fail_after(&mut self, n: usize) {
        self.fail_after = Some(self.allocations + n);
    }

    /// Stop injecting failures.
    pub fn heal(&mut self) {
        self.fail_after = None;
    }

    /// Successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Injected failures so far.
    pub fn failures(&self) -> usize {
        self.failures
    }

    /// Successful tail extensions so far.
    pub fn extensions(&self) -> usize {
        self.extensions
    }

    /// Successful tail rewinds so far.
    pub fn rewinds(&self) -> usize {
        self.rewinds
    }

    pub fn inner(&self) -> &BumpPool {
        &self.inner
    }
}

impl Pool for InstrumentedPool {
    fn allocate(&mut self, bytes: usize) -> Result<PoolSpan, PoolError> {
        if self.fail_after.is_some_and(|limit| self.allocations >= limit) {
            self.failures += 1;
            return Err(PoolError::CapacityExceeded {
                requested: bytes,
                capacity: self.inner.memory_bytes(),
            });
        }
        let span = self.inner.allocate(bytes)?;
        self.allocations += 1;
        Ok(span)
    }

    fn tail(&self) -> PoolCursor {
        self.inner.tail()
    }

    fn region_end(&self) -> usize {
        self.inner.region_end()
    }

    fn try_extend_tail(&mut self, bytes: usize) -> bool {
        let extended = self.inner.try_extend_tail(bytes);
        self.extensions += usize::from(extended);
        extended
    }

    fn try_rewind_tail(&mut self, bytes: usize) -> bool {
        let rewound = self.inner.try_rewind_tail(bytes);
        self.rewinds += usize::from(rewound);
        rewound
    }

    fn bytes(&self, span: PoolSpan) -> &[u8] {
        self.inner.bytes(span)
    }

    fn bytes_mut(&mut self, span: PoolSpan) -> &mut [u8] {
        self.inner.bytes_mut(span)
    }

    fn copy_span(&mut self, src: PoolSpan, dst: PoolSpan, len: usize) {
        self.inner.copy_span(src, dst, len)
    }
}
