//! The dynamic array and its storage management.
//!
//! [`DynArray`] owns `capacity * element_size` bytes of storage, of which
//! the first `len * element_size` hold valid records. The backend is chosen
//! at construction and fixed for the array's lifetime:
//!
//! - **Heap:** a `Vec<u8>` grown fallibly with `try_reserve_exact`.
//! - **Pool:** a [`PoolSpan`] inside a shared pool. Growth extends the
//!   span in place while it is the pool's tail allocation; otherwise a
//!   fresh span is allocated, the live records are copied over and the old
//!   region is abandoned to the pool. An abandoned region that was the
//!   tail when it was left behind is remembered, so that release can still
//!   walk the pool back over it.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::mem;
use std::ops::Range;

use bumpvec_pool::{BumpPool, Pool, PoolSpan};
use bytesize::ByteSize;
use log::{debug, trace, warn};
use smallvec::SmallVec;

use crate::error::ArrayError;
use crate::slots::{Element, Slots, SlotsMut};

/// Pool space charged for an array header created by [`DynArray::create`]:
/// four machine words (storage position, length, capacity, element size).
pub const HEADER_BYTES: usize = 4 * mem::size_of::<usize>();

/// Where an array's own header came from, which decides what release has
/// to give back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderOrigin {
    /// A standalone value returned by [`DynArray::create`] on the heap
    /// backend. Released together with the storage.
    Standalone,
    /// Written into caller-provided storage by [`DynArray::init_in_place`].
    /// Release never gives the header back, only the storage.
    Embedded,
    /// Charged to the pool by [`DynArray::create`]. Release rewinds the
    /// header region if it is still the pool's tail.
    Pool,
}

enum Storage<'p, P> {
    Heap(Vec<u8>),
    Pool {
        pool: &'p RefCell<P>,
        /// Always `capacity * element_size` bytes long.
        span: PoolSpan,
    },
}

/// A growable array of opaque `element_size`-byte records.
///
/// The array is single-threaded: the pool reference is a `RefCell`. Read
/// views of pool records are copies and borrow nothing, but the
/// [`SlotsMut`] handed out by the push operations and
/// [`get_mut`](DynArray::get_mut) keeps the pool mutably borrowed while
/// alive. During that time pushes, reserves and constructions on other
/// arrays sharing the pool fail with [`ArrayError::PoolBusy`], while
/// reads, [`clear`](DynArray::clear) and [`release`](DynArray::release)
/// panic the way [`RefCell::borrow`] does.
///
/// There is no implicit cleanup of pool space. Dropping a pool-backed array
/// simply abandons its region; [`release`](DynArray::release) is what
/// rewinds the pool when the region is still its tail.
pub struct DynArray<'p, P: Pool = BumpPool> {
    storage: Storage<'p, P>,
    /// Number of valid records.
    len: usize,
    /// Number of reserved record slots.
    capacity: usize,
    /// Width of each record in bytes. Non-zero, fixed at construction.
    element_size: usize,
    header: HeaderOrigin,
    /// Pool region charged for the header, until it is reclaimed.
    header_span: Option<PoolSpan>,
    /// Regions left behind by growth while they were the pool's tail,
    /// oldest first.
    left_behind: SmallVec<[PoolSpan; 2]>,
}

impl<'p, P: Pool> DynArray<'p, P> {
    /// Create an array with room for `capacity` records.
    ///
    /// With a pool, [`HEADER_BYTES`] are zero-allocated from the pool for the
    /// header before the storage, and the header region is rewound again if
    /// the storage allocation fails. Without a pool, the storage comes from
    /// the heap and the header is a standalone value.
    ///
    /// A zero `capacity` is legal; the first push grows it to one record.
    pub fn create(
        pool: Option<&'p RefCell<P>>,
        capacity: usize,
        element_size: usize,
    ) -> Result<Self, ArrayError> {
        if element_size == 0 {
            return Err(ArrayError::ZeroElementSize);
        }
        let Some(pool) = pool else {
            return Self::build(None, capacity, element_size, HeaderOrigin::Standalone, None);
        };

        let header_span = lock(pool)?
            .zero_allocate(HEADER_BYTES)
            .map_err(|err| {
                warn!("array header allocation failed: {err}");
                ArrayError::pool(HEADER_BYTES, err)
            })?;

        Self::build(
            Some(pool),
            capacity,
            element_size,
            HeaderOrigin::Pool,
            Some(header_span),
        )
        .inspect_err(|_| {
            if let Ok(mut pool) = pool.try_borrow_mut() {
                if pool.is_tail(header_span) {
                    pool.try_rewind_tail(header_span.len());
                }
            }
        })
    }

    /// Initialise an array inside caller-provided header storage.
    ///
    /// The array is written into `slot` (replacing, without releasing, any
    /// array already there) and marked [`HeaderOrigin::Embedded`], so
    /// release gives back only the storage. On failure `slot` is untouched.
    pub fn init_in_place<'s>(
        slot: &'s mut Option<Self>,
        pool: Option<&'p RefCell<P>>,
        capacity: usize,
        element_size: usize,
    ) -> Result<&'s mut Self, ArrayError> {
        if element_size == 0 {
            return Err(ArrayError::ZeroElementSize);
        }
        let array = Self::build(pool, capacity, element_size, HeaderOrigin::Embedded, None)?;
        Ok(slot.insert(array))
    }

    fn build(
        pool: Option<&'p RefCell<P>>,
        capacity: usize,
        element_size: usize,
        header: HeaderOrigin,
        header_span: Option<PoolSpan>,
    ) -> Result<Self, ArrayError> {
        let bytes = byte_len(capacity, element_size)?;
        let storage = match pool {
            None => {
                let mut buf = Vec::new();
                buf.try_reserve_exact(bytes).map_err(|err| {
                    warn!("array storage of {} failed: {err}", ByteSize::b(bytes as u64));
                    ArrayError::heap(bytes)
                })?;
                buf.resize(bytes, 0);
                Storage::Heap(buf)
            }
            Some(pool) => {
                let span = lock(pool)?.allocate(bytes).map_err(|err| {
                    warn!("array storage of {} failed: {err}", ByteSize::b(bytes as u64));
                    ArrayError::pool(bytes, err)
                })?;
                Storage::Pool { pool, span }
            }
        };
        Ok(Self {
            storage,
            len: 0,
            capacity,
            element_size,
            header,
            header_span,
            left_behind: SmallVec::new(),
        })
    }

    /// Number of valid records.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no records.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of reserved record slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Width of each record in bytes.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Whether storage comes from a pool rather than the heap.
    pub fn is_pool_backed(&self) -> bool {
        matches!(self.storage, Storage::Pool { .. })
    }

    /// How the header was obtained.
    pub fn header_origin(&self) -> HeaderOrigin {
        self.header
    }

    /// Whether the header is a standalone allocation that release frees.
    pub fn owns_header(&self) -> bool {
        self.header == HeaderOrigin::Standalone
    }

    /// The pool region currently backing the records, if pool-backed.
    pub fn storage_span(&self) -> Option<PoolSpan> {
        match &self.storage {
            Storage::Heap(_) => None,
            Storage::Pool { span, .. } => Some(*span),
        }
    }

    /// The pool region charged for the header, until it is reclaimed.
    pub fn header_span(&self) -> Option<PoolSpan> {
        self.header_span
    }

    /// Ensure room for at least `min_capacity` records.
    ///
    /// On the pool backend, if the storage is the pool's tail allocation and
    /// the current block has room, the storage is extended in place by whole
    /// slots up to `min_capacity`. This is one extension covering every
    /// missing slot rather than a single-slot bump per call; the pool ends
    /// up in the same state either way, and a partially extended region is
    /// never abandoned. Otherwise a fresh region of `min_capacity` records
    /// is allocated, the `len` live records (not the full old capacity) are
    /// copied over and the old region is abandoned.
    ///
    /// On failure nothing changes.
    pub fn reserve(&mut self, min_capacity: usize) -> Result<(), ArrayError> {
        if min_capacity <= self.capacity {
            return Ok(());
        }
        let new_bytes = byte_len(min_capacity, self.element_size)?;
        let live_bytes = self.len * self.element_size;

        match &mut self.storage {
            Storage::Heap(buf) => {
                if let Err(err) = buf.try_reserve_exact(new_bytes - buf.len()) {
                    warn!(
                        "array growth to {} failed: {err}",
                        ByteSize::b(new_bytes as u64)
                    );
                    return Err(ArrayError::heap(new_bytes));
                }
                buf.resize(new_bytes, 0);
            }
            Storage::Pool { pool, span } => {
                let mut pool = lock(*pool)?;
                let extra = new_bytes - span.len();
                let was_tail = pool.is_tail(*span);
                if was_tail && pool.try_extend_tail(extra) {
                    trace!(
                        "array extended in place: {} -> {} slots",
                        self.capacity,
                        min_capacity
                    );
                    *span = span.with_len(new_bytes);
                } else {
                    let fresh = pool.allocate(new_bytes).map_err(|err| {
                        warn!(
                            "array growth to {} failed: {err}",
                            ByteSize::b(new_bytes as u64)
                        );
                        ArrayError::pool(new_bytes, err)
                    })?;
                    pool.copy_span(*span, fresh, live_bytes);
                    if was_tail && !span.is_empty() {
                        self.left_behind.push(*span);
                    }
                    debug!(
                        "array moved: {} -> {} slots, {} abandoned",
                        self.capacity,
                        min_capacity,
                        ByteSize::b(span.len() as u64)
                    );
                    *span = fresh;
                }
            }
        }

        self.capacity = min_capacity;
        Ok(())
    }

    /// Append one uninitialised record and return it for the caller to fill.
    ///
    /// A full array doubles its capacity first (a zero-capacity array grows
    /// to one). On growth failure `len` is unchanged.
    ///
    /// Records left unwritten hold whatever bytes the backend had there:
    /// zeroes on the heap, possibly stale bytes in a pool.
    pub fn push_uninit(&mut self) -> Result<SlotsMut<'_>, ArrayError> {
        self.push_n(1)
    }

    /// Append `n` contiguous uninitialised records and return them.
    ///
    /// Grows to `max(2 * capacity, len + n)` when they do not fit, so one
    /// call always makes enough room.
    pub fn push_n(&mut self, n: usize) -> Result<SlotsMut<'_>, ArrayError> {
        let needed = self
            .len
            .checked_add(n)
            .ok_or(ArrayError::CapacityOverflow {
                count: usize::MAX,
                element_size: self.element_size,
            })?;
        if needed > self.capacity {
            let doubled = self.capacity.saturating_mul(2);
            self.reserve(doubled.max(needed).max(1))?;
        }
        let range = self.len * self.element_size..needed * self.element_size;
        let slots = match &mut self.storage {
            Storage::Heap(buf) => SlotsMut::heap(&mut buf[range]),
            Storage::Pool { pool, span } => {
                let span = *span;
                SlotsMut::pool(RefMut::map(lock(*pool)?, move |p| {
                    &mut p.bytes_mut(span)[range]
                }))
            }
        };
        self.len = needed;
        Ok(slots)
    }

    /// Append a copy of `value`.
    ///
    /// `value` may be a record read from another array on the same pool.
    ///
    /// # Panics
    ///
    /// Panics if `value.len()` differs from [`element_size`](Self::element_size).
    pub fn push_back(&mut self, value: &[u8]) -> Result<(), ArrayError> {
        assert_eq!(
            value.len(),
            self.element_size,
            "record width does not match element_size"
        );
        self.push_uninit()?.copy_from_slice(value);
        Ok(())
    }

    /// Remove the last record and return a copy of it.
    ///
    /// Returns `None` on an empty array.
    pub fn pop_back(&mut self) -> Option<Element> {
        let last = self.len.checked_sub(1)?;
        let start = last * self.element_size;
        let element = Element::from_slice(&self.slots(start..start + self.element_size));
        self.len = last;
        Some(element)
    }

    /// View record `index`.
    pub fn get(&self, index: usize) -> Option<Slots<'_>> {
        if index >= self.len {
            return None;
        }
        let start = index * self.element_size;
        Some(self.slots(start..start + self.element_size))
    }

    /// Mutably view record `index`.
    ///
    /// # Panics
    ///
    /// Panics if the pool is still borrowed by a [`SlotsMut`] from another
    /// array, like [`RefCell::borrow_mut`].
    pub fn get_mut(&mut self, index: usize) -> Option<SlotsMut<'_>> {
        if index >= self.len {
            return None;
        }
        let start = index * self.element_size;
        Some(self.slots_mut(start..start + self.element_size))
    }

    /// View all valid records as one byte slice.
    pub fn as_bytes(&self) -> Slots<'_> {
        self.slots(0..self.len * self.element_size)
    }

    /// Copy every valid record out.
    pub fn to_vec(&self) -> Vec<Element> {
        self.as_bytes()
            .chunks_exact(self.element_size)
            .map(Element::from_slice)
            .collect()
    }

    /// Drop every record.
    ///
    /// Heap storage is kept for reuse. Pool storage that is still the tail is
    /// rewound, then any regions growth left behind at the tail, then the
    /// header region if that is the tail by then. The array then starts
    /// from zero capacity and regrows on the next push.
    ///
    /// # Panics
    ///
    /// Panics if the pool is still borrowed by a [`SlotsMut`] from another
    /// array.
    pub fn clear(&mut self) {
        self.reclaim_tail();
        self.len = 0;
    }

    /// Give the array's memory back and consume it.
    ///
    /// Pool-backed: rewinds the storage region, the regions growth left
    /// behind at the tail, and then the header region, each only if it is
    /// the pool's tail at that moment. Regions that are not the tail stay
    /// with the pool until it is reset.
    ///
    /// # Panics
    ///
    /// Panics if the pool is still borrowed by a [`SlotsMut`] from another
    /// array.
    ///
    /// Heap-backed: the buffer is freed, and with it the header when the
    /// array [owns it](Self::owns_header).
    pub fn release(mut self) {
        match self.storage {
            Storage::Heap(ref buf) => debug!(
                "array released: {} heap storage freed, header {:?}",
                ByteSize::b(buf.len() as u64),
                self.header
            ),
            Storage::Pool { .. } => {
                let (storage, header) = self.reclaim_tail();
                debug!("array released: storage reclaimed {storage}, header reclaimed {header}");
            }
        }
    }

    /// Rewind the pool over this array's storage and header where they are
    /// the tail. Returns which of the two were reclaimed.
    fn reclaim_tail(&mut self) -> (bool, bool) {
        let Storage::Pool { pool, span } = &mut self.storage else {
            return (false, false);
        };
        let mut pool = pool.borrow_mut();

        let storage = pool.is_tail(*span) && pool.try_rewind_tail(span.len());
        if storage {
            trace!("array storage reclaimed: {}", ByteSize::b(span.len() as u64));
            *span = span.with_len(0);
            self.capacity = 0;
            while let Some(&region) = self.left_behind.last() {
                if !(pool.is_tail(region) && pool.try_rewind_tail(region.len())) {
                    break;
                }
                trace!(
                    "array left-behind region reclaimed: {}",
                    ByteSize::b(region.len() as u64)
                );
                self.left_behind.pop();
            }
        }

        let header = match self.header_span {
            Some(header) if pool.is_tail(header) && pool.try_rewind_tail(header.len()) => {
                trace!("array header reclaimed");
                self.header_span = None;
                true
            }
            _ => false,
        };

        (storage, header)
    }

    fn slots(&self, range: Range<usize>) -> Slots<'_> {
        debug_assert!(range.end <= self.len * self.element_size);
        match &self.storage {
            Storage::Heap(buf) => Slots::heap(&buf[range]),
            Storage::Pool { pool, span } => Slots::copied(&pool.borrow().bytes(*span)[range]),
        }
    }

    fn slots_mut(&mut self, range: Range<usize>) -> SlotsMut<'_> {
        debug_assert!(range.end <= self.len * self.element_size);
        match &mut self.storage {
            Storage::Heap(buf) => SlotsMut::heap(&mut buf[range]),
            Storage::Pool { pool, span } => {
                let span = *span;
                SlotsMut::pool(RefMut::map(pool.borrow_mut(), move |p| {
                    &mut p.bytes_mut(span)[range]
                }))
            }
        }
    }
}

impl<P: Pool> fmt::Debug for DynArray<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynArray")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("element_size", &self.element_size)
            .field("storage", &self.storage_span())
            .field("header", &self.header)
            .finish()
    }
}

fn lock<P>(pool: &RefCell<P>) -> Result<RefMut<'_, P>, ArrayError> {
    pool.try_borrow_mut().map_err(|_| {
        warn!("pool is borrowed by a live record view");
        ArrayError::PoolBusy
    })
}

fn byte_len(count: usize, element_size: usize) -> Result<usize, ArrayError> {
    count
        .checked_mul(element_size)
        .filter(|&bytes| bytes <= isize::MAX as usize)
        .ok_or(ArrayError::CapacityOverflow {
            count,
            element_size,
        })
}
