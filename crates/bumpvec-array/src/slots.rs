//! Borrowed views of array records.
//!
//! A heap-backed array lends out plain slices. A pool-backed array's bytes
//! live inside a shared pool, so read views copy the records out and hold
//! no borrow of it; a record read from one array can be pushed straight
//! into another array on the same pool. Writable views of pool records
//! keep the pool mutably borrowed until they are dropped.

use std::cell::RefMut;
use std::fmt;
use std::ops::{Deref, DerefMut};

use smallvec::SmallVec;

/// An owned copy of one record, inline up to 16 bytes.
pub type Element = SmallVec<[u8; 16]>;

enum Shared<'a> {
    Heap(&'a [u8]),
    Copied(Element),
}

enum Exclusive<'a> {
    Heap(&'a mut [u8]),
    Pool(RefMut<'a, [u8]>),
}

/// Read-only view of one or more contiguous records.
pub struct Slots<'a>(Shared<'a>);

/// Writable view of one or more contiguous records.
///
/// Returned by the push operations for the caller to fill in.
pub struct SlotsMut<'a>(Exclusive<'a>);

impl<'a> Slots<'a> {
    pub(crate) fn heap(bytes: &'a [u8]) -> Self {
        Self(Shared::Heap(bytes))
    }

    pub(crate) fn copied(bytes: &[u8]) -> Self {
        Self(Shared::Copied(Element::from_slice(bytes)))
    }
}

impl<'a> SlotsMut<'a> {
    pub(crate) fn heap(bytes: &'a mut [u8]) -> Self {
        Self(Exclusive::Heap(bytes))
    }

    pub(crate) fn pool(bytes: RefMut<'a, [u8]>) -> Self {
        Self(Exclusive::Pool(bytes))
    }
}

impl Deref for Slots<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.0 {
            Shared::Heap(bytes) => bytes,
            Shared::Copied(bytes) => bytes,
        }
    }
}

impl Deref for SlotsMut<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match &self.0 {
            Exclusive::Heap(bytes) => bytes,
            Exclusive::Pool(bytes) => bytes,
        }
    }
}

impl DerefMut for SlotsMut<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match &mut self.0 {
            Exclusive::Heap(bytes) => bytes,
            Exclusive::Pool(bytes) => bytes,
        }
    }
}

impl fmt::Debug for Slots<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slots").field(&&**self).finish()
    }
}

impl fmt::Debug for SlotsMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SlotsMut").field(&&**self).finish()
    }
}
