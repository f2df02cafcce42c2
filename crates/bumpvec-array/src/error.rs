//! Array error types.

use std::error::Error;
use std::fmt;

use bumpvec_pool::PoolError;

/// Errors from array construction and growth.
///
/// Apart from [`ZeroElementSize`](Self::ZeroElementSize) and
/// [`PoolBusy`](Self::PoolBusy), every variant means the array could not
/// obtain the storage it needed. The array is left exactly as it was
/// before the failing call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArrayError {
    /// The heap or pool backend refused an allocation.
    AllocationFailed {
        /// Number of bytes requested.
        requested: usize,
        /// The pool's reason, when the pool backend failed.
        source: Option<PoolError>,
    },
    /// `count * element_size` does not fit in `usize`.
    CapacityOverflow {
        /// Number of records requested.
        count: usize,
        /// Width of each record in bytes.
        element_size: usize,
    },
    /// Arrays of zero-width records are not supported.
    ZeroElementSize,
    /// The shared pool is still borrowed by a writable view handed out by
    /// another array, so it cannot be touched right now.
    PoolBusy,
}

impl ArrayError {
    pub(crate) fn heap(requested: usize) -> Self {
        Self::AllocationFailed {
            requested,
            source: None,
        }
    }

    pub(crate) fn pool(requested: usize, source: PoolError) -> Self {
        Self::AllocationFailed {
            requested,
            source: Some(source),
        }
    }

    /// Whether the failure came from running out of memory or address
    /// space, as opposed to a rejected argument.
    pub fn is_allocation_failure(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailed { .. } | Self::CapacityOverflow { .. }
        )
    }
}

impl fmt::Display for ArrayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllocationFailed {
                requested,
                source: None,
            } => write!(f, "heap allocation of {requested} bytes failed"),
            Self::AllocationFailed {
                requested,
                source: Some(_),
            } => write!(f, "pool allocation of {requested} bytes failed"),
            Self::CapacityOverflow {
                count,
                element_size,
            } => write!(
                f,
                "capacity overflow: {count} records of {element_size} bytes"
            ),
            Self::ZeroElementSize => write!(f, "element size must be non-zero"),
            Self::PoolBusy => write!(f, "pool is borrowed by a live record view"),
        }
    }
}

impl Error for ArrayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AllocationFailed {
                source: Some(source),
                ..
            } => Some(source),
            _ => None,
        }
    }
}
