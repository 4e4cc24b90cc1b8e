use core::fmt::{self, Display, Formatter};

use sparse_index::SparseIndex;

/// Indicates that an operation on a [`SparseVec`](crate::SparseVec) was rejected.
///
/// A failed operation never modifies the container.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SparseVecError<I: SparseIndex> {
    /// Attempted to insert at an index which already holds a value.
    ///
    /// Insertion never overwrites.
    DuplicateIndex {
        /// The occupied index.
        index: I,
    },
    /// The index is covered by the position table, but holds no value.
    NotFound {
        /// The vacant index.
        index: I,
    },
    /// The index is past the end of the position table,
    /// so it has never held a value.
    OutOfRange {
        /// The requested index.
        index: I,
        /// The length of the position table.
        len: usize,
    },
    /// The index is the reserved maximum value of its size type,
    /// which can never be stored.
    InvalidIndex {
        /// The rejected index.
        index: I,
    },
}
impl<I: SparseIndex> SparseVecError<I> {
    /// The index that caused the error.
    #[inline]
    pub fn index(&self) -> I {
        match *self {
            SparseVecError::DuplicateIndex { index }
            | SparseVecError::NotFound { index }
            | SparseVecError::OutOfRange { index, .. }
            | SparseVecError::InvalidIndex { index } => index,
        }
    }

    /// Check if this error came from a lookup of an index holding no value,
    /// either because it is vacant or because it is out of range.
    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(
            self,
            SparseVecError::NotFound { .. } | SparseVecError::OutOfRange { .. }
        )
    }

    /// Trigger a descriptive panic due to this error.
    ///
    /// This gives a better panic message than calling [`Result::unwrap`].
    ///
    /// # Panics
    /// Always.
    #[track_caller]
    #[cold]
    pub fn panic(self) -> ! {
        panic!("{self}")
    }
}
impl<I: SparseIndex> Display for SparseVecError<I> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SparseVecError::DuplicateIndex { index } => {
                write!(f, "A value already exists at index {index:?}")
            }
            SparseVecError::NotFound { index } => write!(f, "No value at index {index:?}"),
            SparseVecError::OutOfRange { index, len } => {
                write!(f, "Index {index:?} is out of range (position table length {len})")
            }
            SparseVecError::InvalidIndex { index } => {
                write!(f, "Index {index:?} is reserved and can never hold a value")
            }
        }
    }
}
#[rustversion::since(1.81)]
impl<I: SparseIndex> core::error::Error for SparseVecError<I> {}
