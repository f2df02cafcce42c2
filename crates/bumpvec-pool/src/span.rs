//! Offset-based positions inside a pool.
//!
//! Pools never hand out raw pointers. A [`PoolSpan`] names a region by
//! block index and byte offset, and a [`PoolCursor`] names a single
//! position (the tail, or the end of a span). Comparing a span's end with
//! the pool's tail is how callers recognise the most recent allocation.

/// A position inside one block of a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolCursor {
    /// Index of the block in the pool's chain.
    pub block: usize,
    /// Byte offset within the block.
    pub offset: usize,
}

/// A contiguous region handed out by a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolSpan {
    block: usize,
    offset: usize,
    len: usize,
}

impl PoolSpan {
    /// Create a span. Only pools should mint spans for live regions.
    pub fn new(block: usize, offset: usize, len: usize) -> Self {
        Self { block, offset, len }
    }

    /// Block index containing this span.
    pub fn block(&self) -> usize {
        self.block
    }

    /// Byte offset of the first byte within the block.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the span covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Cursor at the first byte.
    pub fn start(&self) -> PoolCursor {
        PoolCursor {
            block: self.block,
            offset: self.offset,
        }
    }

    /// Cursor one past the last byte.
    pub fn end(&self) -> PoolCursor {
        PoolCursor {
            block: self.block,
            offset: self.offset + self.len,
        }
    }

    /// The same region start with a different length.
    ///
    /// Used after the tail has been extended or rewound in place.
    pub fn with_len(self, len: usize) -> Self {
        Self { len, ..self }
    }
}
