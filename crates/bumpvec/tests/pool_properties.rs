//! Property tests for arrays sharing one pool.

use std::cell::RefCell;

use bumpvec::prelude::*;
use proptest::prelude::*;

proptest! {
    #[test]
    fn lifo_release_empties_the_pool(
        pushes in proptest::collection::vec((0usize..3, any::<u16>()), 0..60),
    ) {
        // Small blocks, so the newest array keeps chaining as it grows.
        let pool = RefCell::new(BumpPool::new(PoolConfig::new(64).with_max_blocks(64)).unwrap());
        let empty = pool.borrow().tail();
        let mut arrays: Vec<DynArray<'_>> = Vec::new();
        for capacity in 0..3 {
            arrays.push(DynArray::create(Some(&pool), capacity, 2).unwrap());
        }
        for &(which, value) in &pushes {
            // only the newest array may grow; older ones stay within capacity
            let arr = &mut arrays[which];
            if arr.len() < arr.capacity() || which == 2 {
                arr.push_back(&value.to_le_bytes()).unwrap();
            }
        }
        while let Some(arr) = arrays.pop() {
            arr.release();
        }
        prop_assert_eq!(pool.borrow().tail(), empty);
    }

    #[test]
    fn clear_then_refill_round_trips(
        first in proptest::collection::vec(any::<u32>(), 0..20),
        second in proptest::collection::vec(any::<u32>(), 0..20),
    ) {
        let pool = RefCell::new(BumpPool::new(PoolConfig::default()).unwrap());
        let mut arr = DynArray::create(Some(&pool), 1, 4).unwrap();
        for v in &first {
            arr.push_back(&v.to_le_bytes()).unwrap();
        }
        arr.clear();
        prop_assert!(arr.is_empty());
        for v in &second {
            arr.push_back(&v.to_le_bytes()).unwrap();
        }
        let got: Vec<u32> = arr
            .to_vec()
            .iter()
            .map(|e| u32::from_le_bytes(e.as_slice().try_into().unwrap()))
            .collect();
        prop_assert_eq!(got, second);
    }
}
