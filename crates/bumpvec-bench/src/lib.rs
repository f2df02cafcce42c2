//! Shared workloads for bumpvec benchmarks.

#![forbid(unsafe_code)]

use std::cell::RefCell;

use bumpvec_array::{ArrayError, DynArray};
use bumpvec_pool::{BumpPool, Pool, PoolConfig};

/// Record width used by the reference workloads.
pub const RECORD_BYTES: usize = 16;

/// A pool large enough for the reference workloads without chaining.
pub fn reference_pool() -> RefCell<BumpPool> {
    RefCell::new(
        BumpPool::new(PoolConfig::new(4 * 1024 * 1024).with_max_blocks(4))
            .expect("reference pool config is valid"),
    )
}

/// Push `count` records, then pop them all. Returns the sum of the first
/// byte of every popped record so the work cannot be optimised away.
pub fn push_pop<P: Pool>(arr: &mut DynArray<'_, P>, count: usize) -> Result<u64, ArrayError> {
    let mut record = [0u8; RECORD_BYTES];
    for i in 0..count {
        record[0] = i as u8;
        arr.push_back(&record)?;
    }
    let mut sum = 0u64;
    while let Some(popped) = arr.pop_back() {
        sum += u64::from(popped[0]);
    }
    Ok(sum)
}

/// Grow two arrays in lockstep so neither stays the pool's tail, forcing
/// the copy-and-abandon path on every growth.
pub fn interleaved_growth(pool: &RefCell<BumpPool>, count: usize) -> Result<usize, ArrayError> {
    let mut a = DynArray::create(Some(pool), 1, RECORD_BYTES)?;
    let mut b = DynArray::create(Some(pool), 1, RECORD_BYTES)?;
    let record = [0xA5u8; RECORD_BYTES];
    for _ in 0..count {
        a.push_back(&record)?;
        b.push_back(&record)?;
    }
    let total = a.len() + b.len();
    b.release();
    a.release();
    Ok(total)
}
