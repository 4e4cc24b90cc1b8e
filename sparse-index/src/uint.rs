//! Size types: the unsigned integers an index converts to.
//!
//! A sparse container stores its position table entries in the size type,
//! and reserves the maximum value, so an index equal to it can never be stored.
//! The helpers here are free functions,
//! so they never collide with inherent methods on the primitives.

use core::fmt::{self, Debug, Display, Formatter};
use core::hash::Hash;

use self::sealed::Sealed;

mod sealed;

/// An unsigned primitive integer,
/// usable as the [size type](crate::SparseIndex::Size) of an index.
///
/// This is sealed, and implemented for `u8` through `u128` and `usize`.
pub trait UnsignedPrimInt: Eq + Hash + Ord + Copy + Default + Debug + Display + Sealed {}

/// Widen a size to a [`usize`],
/// returning `None` if it does not fit (only possible for `u64` and `u128`).
#[inline]
pub fn to_usize_checked<T: UnsignedPrimInt>(val: T) -> Option<usize> {
    val.widen()
}

/// Narrow a [`usize`] to a size type,
/// returning `None` if it does not fit.
#[inline]
pub fn from_usize_checked<T: UnsignedPrimInt>(val: usize) -> Option<T> {
    T::narrow(val)
}

/// Narrow a [`usize`] to a size type, discarding the high bits.
///
/// Only use this when the value is already known to fit.
#[inline]
pub fn from_usize_wrapping<T: UnsignedPrimInt>(val: usize) -> T {
    T::truncate(val)
}

/// The value of the size type that containers reserve,
/// which is its maximum.
#[inline]
pub fn reserved<T: UnsignedPrimInt>() -> T {
    T::RESERVED
}

/// Check if a size is the [reserved](reserved) value.
///
/// ## Examples
/// ```
/// use sparse_index::uint::is_reserved;
/// assert!(is_reserved(u8::MAX));
/// assert!(!is_reserved(254u8));
/// ```
#[inline]
pub fn is_reserved<T: UnsignedPrimInt>(val: T) -> bool {
    val == reserved()
}

/// The longest position table a container indexed by this size type can have,
/// saturating at [`usize::MAX`].
///
/// Every index below this bound is storable, so it is also
/// the most values such a container can ever hold.
///
/// ## Examples
/// ```
/// use sparse_index::uint::max_table_len;
/// assert_eq!(max_table_len::<u8>(), 255);
/// assert_eq!(max_table_len::<u128>(), usize::MAX);
/// ```
#[inline]
pub fn max_table_len<T: UnsignedPrimInt>() -> usize {
    reserved::<T>().widen().unwrap_or(usize::MAX)
}

/// Describe a size for a panic message,
/// naming the reserved value instead of printing it.
///
/// ## Examples
/// ```
/// use sparse_index::uint::describe;
/// assert_eq!(describe(3u32).to_string(), "3");
/// assert_eq!(describe(u16::MAX).to_string(), "u16::MAX (reserved)");
/// ```
#[cold]
pub fn describe<T: UnsignedPrimInt>(val: T) -> Describe<T> {
    Describe(val)
}

/// The description returned by [`describe`].
#[derive(Copy, Clone)]
pub struct Describe<T: UnsignedPrimInt>(T);
impl<T: UnsignedPrimInt> Display for Describe<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if is_reserved(self.0) {
            write!(f, "{}::MAX (reserved)", T::NAME)
        } else {
            Display::fmt(&self.0, f)
        }
    }
}
impl<T: UnsignedPrimInt> Debug for Describe<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

/// Panic because a size does not correspond to any index.
///
/// Backs [`SparseIndex::from_size`](crate::SparseIndex::from_size).
#[inline(never)]
#[track_caller]
#[cold]
pub(crate) fn invalid_index<T: UnsignedPrimInt>(size: T) -> ! {
    panic!("Invalid index: {}", describe(size))
}
