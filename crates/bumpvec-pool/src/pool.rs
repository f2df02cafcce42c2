//! The narrow pool interface consumed by arrays.
//!
//! [`Pool`] is what an array sees of its allocator: allocate at the tail,
//! look at the tail, and move the tail forward or backward by a checked
//! amount. Arrays decide *whether* a region is the tail by comparing
//! [`PoolSpan::end`] with [`Pool::tail`]; the pool only enforces that the
//! tail stays inside the current block.

use crate::error::PoolError;
use crate::span::{PoolCursor, PoolSpan};

/// An append-only allocator with an observable, adjustable tail.
///
/// Implementations are single-threaded. Checking [`Pool::is_tail`] and then
/// calling [`Pool::try_extend_tail`] or [`Pool::try_rewind_tail`] is only
/// sound if no other allocation from the same pool happens in between.
pub trait Pool {
    /// Allocate `bytes` at the tail. Contents are unspecified: a region
    /// that was rewound and handed out again keeps its stale bytes.
    fn allocate(&mut self, bytes: usize) -> Result<PoolSpan, PoolError>;

    /// Allocate `bytes` at the tail, zero-filled.
    fn zero_allocate(&mut self, bytes: usize) -> Result<PoolSpan, PoolError> {
        let span = self.allocate(bytes)?;
        self.bytes_mut(span).fill(0);
        Ok(span)
    }

    /// Current high-water mark.
    fn tail(&self) -> PoolCursor;

    /// End offset of the block holding the tail.
    fn region_end(&self) -> usize;

    /// Move the tail forward by `bytes` within the current block.
    ///
    /// Returns `false` and leaves the pool unchanged if the block has no room.
    fn try_extend_tail(&mut self, bytes: usize) -> bool;

    /// Move the tail backward by `bytes` within the current block.
    ///
    /// Returns `false` and leaves the pool unchanged if that would cross the
    /// start of the block. Callers must only rewind a region they proved is
    /// the tail allocation. A chained pool whose block is emptied this way
    /// reports the end of its previous block as the new tail.
    fn try_rewind_tail(&mut self, bytes: usize) -> bool;

    /// View the bytes of a span.
    ///
    /// # Panics
    ///
    /// Panics if the span does not lie inside one of the pool's blocks.
    fn bytes(&self, span: PoolSpan) -> &[u8];

    /// Mutably view the bytes of a span.
    ///
    /// # Panics
    ///
    /// Panics if the span does not lie inside one of the pool's blocks.
    fn bytes_mut(&mut self, span: PoolSpan) -> &mut [u8];

    /// Copy the first `len` bytes of `src` into `dst`.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds either span.
    fn copy_span(&mut self, src: PoolSpan, dst: PoolSpan, len: usize) {
        let staged = self.bytes(src)[..len].to_vec();
        self.bytes_mut(dst)[..len].copy_from_slice(&staged);
    }

    /// Whether `span` is the most recent allocation, i.e. ends at the tail.
    fn is_tail(&self, span: PoolSpan) -> bool {
        span.end() == self.tail()
    }
}
