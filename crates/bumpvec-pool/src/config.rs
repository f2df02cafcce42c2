//! Pool configuration parameters.

use crate::error::PoolError;

/// Configuration for a [`BumpPool`](crate::BumpPool).
///
/// Controls block sizing and the length of the block chain.
/// Validated at construction; all values are immutable after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Size of each block in bytes.
    ///
    /// Default: 65_536 (64 KiB). Requests larger than a block get a
    /// dedicated block of exactly the requested size.
    pub block_size: usize,

    /// Maximum number of blocks in the chain.
    ///
    /// Default: 64, i.e. 4 MiB at the default block size.
    pub max_blocks: usize,
}

impl PoolConfig {
    /// Default block size: 64 KiB.
    pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

    /// Default maximum block count.
    pub const DEFAULT_MAX_BLOCKS: usize = 64;

    /// Create a config with the given block size and the default block count.
    pub fn new(block_size: usize) -> Self {
        Self {
            block_size,
            max_blocks: Self::DEFAULT_MAX_BLOCKS,
        }
    }

    /// Replace the maximum block count.
    pub fn with_max_blocks(mut self, max_blocks: usize) -> Self {
        self.max_blocks = max_blocks;
        self
    }

    /// Nominal capacity of the full block chain in bytes.
    ///
    /// Oversized requests can push the real footprint above this figure.
    pub fn nominal_bytes(&self) -> usize {
        self.block_size.saturating_mul(self.max_blocks)
    }

    /// Check that the configuration describes a usable pool.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.block_size == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "block_size must be non-zero".into(),
            });
        }
        if self.max_blocks == 0 {
            return Err(PoolError::InvalidConfig {
                reason: "max_blocks must be non-zero".into(),
            });
        }
        Ok(())
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BLOCK_SIZE)
    }
}
