//! Defines the [`SparseIndex`] trait, for types that can address a slot in a sparse container.
//!
//! A sparse container maps a caller-chosen index domain (usually small integers)
//! onto densely packed storage.
//! The index type decides two things:
//! 1. How an index converts to and from an unsigned integer, its [size type](SparseIndex::Size).
//! 2. How wide the offsets stored by the container are,
//!    since a container can never hold more values than its index type can address.
//!
//! The maximum value of the size type is reserved by containers as "no entry",
//! so it can never be used as an index.
//! See [`uint::is_reserved`].
//!
//! Newtype wrappers can implement the trait using [`define_newtype_index!`].
#![no_std]

use core::fmt::Debug;

#[macro_use]
mod macros;
mod impls;
pub mod uint;

pub use uint::UnsignedPrimInt;

/// An index which can be sensibly converted to/from an unsigned integer value.
///
/// The type should not carry any information beyond that of the integer,
/// and must be able to losslessly convert back and forth from [`Self::Size`].
/// It is possible that not all values of the size type are valid,
/// allowing [`core::num::NonZero`] and the `nonmax` types to implement this trait.
///
/// The value of the underlying integer must be consistent.
/// It cannot change over the course of the program's lifetime.
///
/// ## Safety
/// This trait is safe to implement and cannot be relied upon by memory safety,
/// with one exception.
///
/// If the implementation of [`SparseIndex::from_size_unchecked`] makes any sort of unsafe assumptions
/// about the validity of the input, then [`SparseIndex::to_size`] must be implemented correctly.
/// This means that implementations fall into two categories:
/// 1. Potentially incorrect implementations written entirely in safe code,
///    where `from_size_unchecked(x)` is equivalent to `from_size_checked(x).unwrap()`;
/// 2. Implementations where `from_size_unchecked` could trigger undefined behavior on an invalid value,
///    but where `to_size` can be trusted to only produce valid values.
///
/// In both cases, the following code is always safe:
/// ```no_run
/// # use sparse_index::SparseIndex;
/// fn roundtrip<T: SparseIndex>(x: T) -> T {
///     let y = x.to_size();
///     unsafe { T::from_size_unchecked(y) }
/// }
/// ```
/// Containers rely on this to rebuild indices from the slots they have occupied.
///
/// This type should not have interior mutability.
/// This is guaranteed by the `Copy` bound.
pub trait SparseIndex: Copy + Eq + Debug + 'static {
    /// The underlying unsigned integer type.
    ///
    /// Containers also use this type to store offsets into their dense storage,
    /// so a narrow type here means a compact position table.
    type Size: uint::UnsignedPrimInt;

    /// Create an index from the underlying integer value,
    /// panicking if the value is invalid.
    #[inline]
    #[track_caller]
    fn from_size(size: Self::Size) -> Self {
        match Self::from_size_checked(size) {
            Some(success) => success,
            None => uint::invalid_index(size),
        }
    }

    /// Create an index from the underlying integer value,
    /// returning `None` if the value is invalid.
    fn from_size_checked(size: Self::Size) -> Option<Self>;

    /// Create an index from the underlying integer value,
    /// triggering undefined behavior if the value is invalid.
    ///
    /// ## Safety
    /// If the corresponding [`Self::from_size_checked`] method would fail,
    /// this triggers undefined behavior.
    /// The default implementation just invokes [`Self::from_size`].
    #[inline]
    unsafe fn from_size_unchecked(size: Self::Size) -> Self {
        Self::from_size(size)
    }

    /// Convert this index into its underlying integer.
    ///
    /// This method can never fail,
    /// since valid instances of `Self` always correspond to valid instances of `Self::Size`.
    fn to_size(self) -> Self::Size;
}
