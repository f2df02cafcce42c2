//! Block-chained bump pool.
//!
//! A [`Block`] is a zero-initialised `Vec<u8>` with a cursor. A
//! [`BumpPool`] is a growable chain of blocks: allocations are served from
//! the current block and overflow into the next one when it is full.
//! Blocks are never freed during runtime, only reset or dropped with the
//! pool. Rewinding a chained block back to its start makes the previous
//! block's end the tail again.

use bytesize::ByteSize;
use log::{debug, trace, warn};

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::pool::Pool;
use crate::span::{PoolCursor, PoolSpan};

/// A single contiguous block with bump allocation.
struct Block {
    /// Backing storage. Allocated to full capacity at creation.
    data: Vec<u8>,
    /// Bump pointer: next free byte.
    cursor: usize,
}

impl Block {
    fn new(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            cursor: 0,
        }
    }

    /// Bump-allocate `len` bytes, returning the starting offset.
    fn alloc(&mut self, len: usize) -> Option<usize> {
        let new_cursor = self.cursor.checked_add(len)?;
        if new_cursor > self.data.len() {
            return None;
        }
        let offset = self.cursor;
        self.cursor = new_cursor;
        Some(offset)
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }
}

/// An append-only pool built from a chain of fixed-size blocks.
///
/// When the current block cannot satisfy a request, the pool moves to the
/// next block with room (reusing blocks left over from before a
/// [`reset`](BumpPool::reset)) or appends a new one, up to
/// [`PoolConfig::max_blocks`]. A request larger than
/// [`PoolConfig::block_size`] gets a dedicated block of exactly its size.
/// The skipped remainder of the previous block is wasted until reset.
pub struct BumpPool {
    blocks: Vec<Block>,
    block_size: usize,
    max_blocks: usize,
    /// Index of the block currently being filled.
    current: usize,
}

impl BumpPool {
    /// Create a pool with one pre-allocated block.
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let mut blocks = Vec::with_capacity(config.max_blocks.min(16));
        blocks.push(Block::new(config.block_size));
        Ok(Self {
            blocks,
            block_size: config.block_size,
            max_blocks: config.max_blocks,
            current: 0,
        })
    }

    /// Create a single-block pool of `bytes`. Handy for tests that need an
    /// exact region such as `[0, 100)`.
    pub fn with_region(bytes: usize) -> Result<Self, PoolError> {
        Self::new(PoolConfig::new(bytes).with_max_blocks(1))
    }

    /// Rewind every block without deallocating.
    ///
    /// All previously handed-out spans become invalid. The backing memory
    /// is NOT zeroed.
    pub fn reset(&mut self) {
        for block in &mut self.blocks {
            block.cursor = 0;
        }
        self.current = 0;
    }

    /// Bytes handed out across all blocks (including abandoned regions).
    pub fn used_bytes(&self) -> usize {
        self.blocks.iter().map(|b| b.cursor).sum()
    }

    /// Number of blocks currently in the chain.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Memory usage of the backing storage in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.blocks.iter().map(|b| b.capacity()).sum()
    }

    fn chain_block(&mut self, bytes: usize) -> Result<PoolSpan, PoolError> {
        // Reuse a block left over from before a reset.
        if let Some(index) = (self.current + 1..self.blocks.len())
            .find(|&i| self.blocks[i].remaining() >= bytes)
        {
            let offset = self.blocks[index]
                .alloc(bytes)
                .ok_or(PoolError::CapacityExceeded {
                    requested: bytes,
                    capacity: self.memory_bytes(),
                })?;
            self.current = index;
            trace!("pool moved to existing block {index}");
            return Ok(PoolSpan::new(index, offset, bytes));
        }

        if self.blocks.len() >= self.max_blocks {
            let capacity = self.memory_bytes();
            warn!(
                "pool exhausted: requested {}, chain holds {} in {} blocks",
                ByteSize::b(bytes as u64),
                ByteSize::b(capacity as u64),
                self.blocks.len()
            );
            return Err(PoolError::CapacityExceeded {
                requested: bytes,
                capacity,
            });
        }

        let mut block = Block::new(self.block_size.max(bytes));
        let offset = block.alloc(bytes).ok_or(PoolError::CapacityExceeded {
            requested: bytes,
            capacity: self.memory_bytes(),
        })?;
        self.blocks.push(block);
        self.current = self.blocks.len() - 1;
        debug!(
            "pool chained block {} ({})",
            self.current,
            ByteSize::b(self.blocks[self.current].capacity() as u64)
        );
        Ok(PoolSpan::new(self.current, offset, bytes))
    }
}

impl Pool for BumpPool {
    fn allocate(&mut self, bytes: usize) -> Result<PoolSpan, PoolError> {
        if let Some(offset) = self.blocks[self.current].alloc(bytes) {
            return Ok(PoolSpan::new(self.current, offset, bytes));
        }
        self.chain_block(bytes)
    }

    fn tail(&self) -> PoolCursor {
        PoolCursor {
            block: self.current,
            offset: self.blocks[self.current].cursor,
        }
    }

    fn region_end(&self) -> usize {
        self.blocks[self.current].capacity()
    }

    fn try_extend_tail(&mut self, bytes: usize) -> bool {
        self.blocks[self.current].alloc(bytes).is_some()
    }

    fn try_rewind_tail(&mut self, bytes: usize) -> bool {
        let block = &mut self.blocks[self.current];
        if bytes > block.cursor {
            return false;
        }
        block.cursor -= bytes;
        // An emptied chained block hands the tail back to the last block
        // still holding data. Blocks past `current` are always empty.
        while self.current > 0 && self.blocks[self.current].cursor == 0 {
            self.current -= 1;
            trace!("pool stepped back to block {}", self.current);
        }
        true
    }

    fn bytes(&self, span: PoolSpan) -> &[u8] {
        &self.blocks[span.block()].data[span.offset()..span.end().offset]
    }

    fn bytes_mut(&mut self, span: PoolSpan) -> &mut [u8] {
        &mut self.blocks[span.block()].data[span.offset()..span.end().offset]
    }

    fn copy_span(&mut self, src: PoolSpan, dst: PoolSpan, len: usize) {
        assert!(len <= src.len() && len <= dst.len(), "copy exceeds span");
        let (s, d) = (src.block(), dst.block());
        if s == d {
            self.blocks[s]
                .data
                .copy_within(src.offset()..src.offset() + len, dst.offset());
            return;
        }
        let (src_block, dst_block) = if s < d {
            let (lo, hi) = self.blocks.split_at_mut(d);
            (&lo[s], &mut hi[0])
        } else {
            let (lo, hi) = self.blocks.split_at_mut(s);
            (&hi[0], &mut lo[d])
        };
        dst_block.data[dst.offset()..dst.offset() + len]
            .copy_from_slice(&src_block.data[src.offset()..src.offset() + len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(block_size: usize, max_blocks: usize) -> BumpPool {
        BumpPool::new(PoolConfig::new(block_size).with_max_blocks(max_blocks)).unwrap()
    }

    #[test]
    fn sequential_allocs_are_adjacent() {
        let mut pool = pool(1024, 1);
        let a = pool.allocate(100).unwrap();
        let b = pool.allocate(200).unwrap();
        assert_eq!(a.offset(), 0);
        assert_eq!(b.offset(), 100);
        assert_eq!(a.end(), b.start());
        assert_eq!(pool.used_bytes(), 300);
    }

    #[test]
    fn zero_byte_alloc_is_empty_span_at_tail() {
        let mut pool = pool(64, 1);
        pool.allocate(10).unwrap();
        let span = pool.allocate(0).unwrap();
        assert!(span.is_empty());
        assert!(pool.is_tail(span));
        assert_eq!(pool.used_bytes(), 10);
    }

    #[test]
    fn alloc_fails_when_chain_full() {
        let mut pool = pool(100, 2);
        pool.allocate(100).unwrap();
        pool.allocate(100).unwrap();
        let result = pool.allocate(1);
        assert!(matches!(result, Err(PoolError::CapacityExceeded { .. })));
    }

    #[test]
    fn overflow_chains_to_next_block() {
        let mut pool = pool(100, 4);
        pool.allocate(80).unwrap();
        let span = pool.allocate(50).unwrap();
        assert_eq!(span.block(), 1);
        assert_eq!(span.offset(), 0);
        assert_eq!(pool.block_count(), 2);
        assert_eq!(pool.tail(), PoolCursor { block: 1, offset: 50 });
    }

    #[test]
    fn oversized_request_gets_dedicated_block() {
        let mut pool = pool(64, 4);
        let span = pool.allocate(500).unwrap();
        assert_eq!(span.len(), 500);
        assert_eq!(pool.region_end(), 500);
        assert_eq!(pool.memory_bytes(), 64 + 500);
    }

    #[test]
    fn extend_tail_respects_region_end() {
        let mut pool = BumpPool::with_region(100).unwrap();
        pool.allocate(96).unwrap();
        assert!(pool.try_extend_tail(4));
        assert_eq!(pool.tail().offset, 100);
        assert!(!pool.try_extend_tail(1));
        assert_eq!(pool.tail().offset, 100);
    }

    #[test]
    fn rewind_tail_cannot_cross_block_start() {
        let mut pool = BumpPool::with_region(100).unwrap();
        pool.allocate(12).unwrap();
        assert!(!pool.try_rewind_tail(13));
        assert!(pool.try_rewind_tail(12));
        assert_eq!(pool.tail().offset, 0);
    }

    #[test]
    fn emptied_chained_block_returns_tail_to_previous_block() {
        let mut pool = pool(100, 4);
        pool.allocate(80).unwrap();
        let chained = pool.allocate(50).unwrap();
        assert_eq!(chained.block(), 1);

        assert!(pool.try_rewind_tail(50));
        assert_eq!(pool.tail(), PoolCursor { block: 0, offset: 80 });
        assert_eq!(pool.region_end(), 100);
        assert!(pool.try_rewind_tail(80));
        assert_eq!(pool.tail(), PoolCursor { block: 0, offset: 0 });

        // The emptied block is reused once block 0 fills up again.
        pool.allocate(90).unwrap();
        let again = pool.allocate(20).unwrap();
        assert_eq!(again.block(), 1);
        assert_eq!(pool.block_count(), 2);
    }

    #[test]
    fn step_back_skips_blocks_left_empty_by_reuse() {
        let mut pool = pool(64, 4);
        pool.allocate(64).unwrap();
        pool.allocate(64).unwrap();
        pool.allocate(200).unwrap();
        pool.reset();
        pool.allocate(10).unwrap();
        // Too big for block 1, so block 2 is reused and block 1 stays empty.
        let big = pool.allocate(150).unwrap();
        assert_eq!(big.block(), 2);
        assert!(pool.try_rewind_tail(150));
        assert_eq!(pool.tail(), PoolCursor { block: 0, offset: 10 });
    }

    #[test]
    fn reset_reuses_existing_blocks() {
        let mut pool = pool(100, 4);
        pool.allocate(80).unwrap();
        pool.allocate(80).unwrap();
        assert_eq!(pool.block_count(), 2);
        pool.reset();
        assert_eq!(pool.used_bytes(), 0);
        pool.allocate(80).unwrap();
        let span = pool.allocate(80).unwrap();
        assert_eq!(span.block(), 1);
        assert_eq!(pool.block_count(), 2);
    }

    #[test]
    fn copy_span_within_one_block() {
        let mut pool = BumpPool::with_region(64).unwrap();
        let src = pool.zero_allocate(4).unwrap();
        pool.bytes_mut(src).copy_from_slice(&[9, 8, 7, 6]);
        let dst = pool.zero_allocate(8).unwrap();
        pool.copy_span(src, dst, 4);
        assert_eq!(pool.bytes(dst), &[9, 8, 7, 6, 0, 0, 0, 0]);
    }

    #[test]
    fn copy_span_across_blocks() {
        let mut pool = pool(16, 4);
        let src = pool.zero_allocate(12).unwrap();
        pool.bytes_mut(src).fill(0x5A);
        let dst = pool.zero_allocate(12).unwrap();
        assert_ne!(src.block(), dst.block());
        pool.copy_span(src, dst, 12);
        assert!(pool.bytes(dst).iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn zero_allocate_after_rewind_clears_stale_bytes() {
        let mut pool = BumpPool::with_region(32).unwrap();
        let span = pool.allocate(8).unwrap();
        pool.bytes_mut(span).fill(0xFF);
        assert!(pool.try_rewind_tail(8));
        let fresh = pool.zero_allocate(8).unwrap();
        assert_eq!(fresh, span);
        assert!(pool.bytes(fresh).iter().all(|&b| b == 0));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn used_bytes_equals_sum_of_single_block_allocs(
                sizes in proptest::collection::vec(0usize..32, 1..20),
            ) {
                let mut pool = BumpPool::with_region(1024).unwrap();
                for &size in &sizes {
                    pool.allocate(size).unwrap();
                }
                prop_assert_eq!(pool.used_bytes(), sizes.iter().sum::<usize>());
            }

            #[test]
            fn allocate_then_rewind_restores_tail(
                prefix in 0usize..64,
                size in 0usize..64,
            ) {
                let mut pool = BumpPool::with_region(128).unwrap();
                pool.allocate(prefix).unwrap();
                let before = pool.tail();
                let span = pool.allocate(size).unwrap();
                prop_assert!(pool.is_tail(span));
                prop_assert!(pool.try_rewind_tail(span.len()));
                prop_assert_eq!(pool.tail(), before);
            }

            #[test]
            fn lifo_rewinds_across_blocks_restore_every_tail(
                sizes in proptest::collection::vec(1usize..48, 1..24),
            ) {
                let mut pool = pool(64, 32);
                let mut stack = Vec::new();
                for &size in &sizes {
                    let before = pool.tail();
                    let span = pool.allocate(size).unwrap();
                    stack.push((before, span));
                }
                while let Some((before, span)) = stack.pop() {
                    prop_assert!(pool.is_tail(span));
                    prop_assert!(pool.try_rewind_tail(span.len()));
                    prop_assert_eq!(pool.tail(), before);
                    prop_assert_eq!(
                        pool.used_bytes(),
                        stack.iter().map(|(_, s)| s.len()).sum::<usize>()
                    );
                }
                prop_assert_eq!(pool.tail(), PoolCursor { block: 0, offset: 0 });
            }
        }
    }
}
