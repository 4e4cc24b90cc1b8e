//! Iterators over a [`SparseVec`](crate::SparseVec).
//!
//! The value iterators walk the dense array in storage order.
//! [`Entries`] and [`Indices`] walk the position table in index order.

use core::fmt::{self, Debug, Formatter};
use core::iter::FusedIterator;
use core::marker::PhantomData;

use memres::Allocator;
use sparse_index::{uint, SparseIndex};

use crate::storage;
use crate::vec::Slot;

macro_rules! impl_dense_iter {
    ($target:ident<$($l:lifetime,)? $vt:ident $(, $at:ident)?> => $item_ty:ty) => {
        impl<$($l,)* $vt $(, $at: Allocator)*> Iterator for $target<$($l,)* $vt $(, $at)*> {
            type Item = $item_ty;
            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                self.source.next()
            }
            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.source.size_hint()
            }
            #[inline]
            fn count(self) -> usize {
                self.source.len()
            }
        }
        impl<$($l,)* $vt $(, $at: Allocator)*> DoubleEndedIterator for $target<$($l,)* $vt $(, $at)*> {
            #[inline]
            fn next_back(&mut self) -> Option<Self::Item> {
                self.source.next_back()
            }
        }
        impl<$($l,)* $vt $(, $at: Allocator)*> ExactSizeIterator for $target<$($l,)* $vt $(, $at)*> {}
        impl<$($l,)* $vt $(, $at: Allocator)*> FusedIterator for $target<$($l,)* $vt $(, $at)*> {}
    };
}

/// An iterator over the values of a [`SparseVec`](crate::SparseVec), in storage order.
#[derive(Clone, Debug)]
pub struct Iter<'a, T> {
    source: core::slice::Iter<'a, T>,
}
impl<'a, T> Iter<'a, T> {
    #[inline]
    pub(crate) fn new(values: &'a [T]) -> Self {
        Iter {
            source: values.iter(),
        }
    }
}
impl_dense_iter!(Iter<'a, T> => &'a T);

/// A mutable iterator over the values of a [`SparseVec`](crate::SparseVec), in storage order.
#[derive(Debug)]
pub struct IterMut<'a, T> {
    source: core::slice::IterMut<'a, T>,
}
impl<'a, T> IterMut<'a, T> {
    #[inline]
    pub(crate) fn new(values: &'a mut [T]) -> Self {
        IterMut {
            source: values.iter_mut(),
        }
    }
}
impl_dense_iter!(IterMut<'a, T> => &'a mut T);

/// An iterator consuming the values of a [`SparseVec`](crate::SparseVec), in storage order.
pub struct IntoIter<T, A: Allocator> {
    source: storage::IntoIter<T, A>,
}
impl<T, A: Allocator> IntoIter<T, A> {
    #[inline]
    pub(crate) fn new(source: storage::IntoIter<T, A>) -> Self {
        IntoIter { source }
    }
}
impl_dense_iter!(IntoIter<T, A> => T);
impl<T: Debug, A: Allocator> Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter")
            .field(&self.source.as_slice())
            .finish()
    }
}

macro_rules! impl_table_iter {
    ($target:ident<$l:lifetime $(, $vt:ident)*; $it:ident> {
        fn map($self_:ident, $index:ident, $offset:ident) -> $item_ty:ty {
            $map:expr
        }
    }) => {
        impl<$l, $($vt,)* $it: SparseIndex> Iterator for $target<$l, $($vt,)* $it> {
            type Item = $item_ty;
            #[inline]
            fn next(&mut self) -> Option<Self::Item> {
                loop {
                    let (pos, slot) = self.source.next()?;
                    if let Some($offset) = slot.offset() {
                        // SAFETY: Slot is occupied => index was valid when inserted
                        let $index = unsafe { $it::from_size_unchecked(uint::from_usize_wrapping(pos)) };
                        self.len -= 1;
                        let $self_ = &*self;
                        return Some($map);
                    }
                }
            }
            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                (self.len, Some(self.len))
            }
        }
        impl<$l, $($vt,)* $it: SparseIndex> DoubleEndedIterator for $target<$l, $($vt,)* $it> {
            #[inline]
            fn next_back(&mut self) -> Option<Self::Item> {
                loop {
                    let (pos, slot) = self.source.next_back()?;
                    if let Some($offset) = slot.offset() {
                        // SAFETY: Slot is occupied => index was valid when inserted
                        let $index = unsafe { $it::from_size_unchecked(uint::from_usize_wrapping(pos)) };
                        self.len -= 1;
                        let $self_ = &*self;
                        return Some($map);
                    }
                }
            }
        }
        impl<$l, $($vt,)* $it: SparseIndex> ExactSizeIterator for $target<$l, $($vt,)* $it> {}
        impl<$l, $($vt,)* $it: SparseIndex> FusedIterator for $target<$l, $($vt,)* $it> {}
    };
}

/// An iterator over the index-value pairs of a [`SparseVec`](crate::SparseVec).
///
/// Guaranteed to be ordered by the integer value of the index.
pub struct Entries<'a, T, I: SparseIndex> {
    source: core::iter::Enumerate<core::slice::Iter<'a, Slot<I::Size>>>,
    values: &'a [T],
    /// The number of occupied slots not yet visited.
    len: usize,
}
impl<'a, T, I: SparseIndex> Entries<'a, T, I> {
    #[inline]
    pub(crate) fn new(position: &'a [Slot<I::Size>], values: &'a [T]) -> Self {
        Entries {
            source: position.iter().enumerate(),
            values,
            len: values.len(),
        }
    }
}
impl_table_iter!(Entries<'a, T; I> {
    fn map(this, index, offset) -> (I, &'a T) {
        (index, &this.values[offset])
    }
});
impl<T, I: SparseIndex> Clone for Entries<'_, T, I> {
    fn clone(&self) -> Self {
        Entries {
            source: self.source.clone(),
            values: self.values,
            len: self.len,
        }
    }
}

/// An iterator over the occupied indices of a [`SparseVec`](crate::SparseVec).
///
/// Guaranteed to be in increasing order.
pub struct Indices<'a, I: SparseIndex> {
    source: core::iter::Enumerate<core::slice::Iter<'a, Slot<I::Size>>>,
    len: usize,
    marker: PhantomData<I>,
}
impl<'a, I: SparseIndex> Indices<'a, I> {
    #[inline]
    pub(crate) fn new(position: &'a [Slot<I::Size>], len: usize) -> Self {
        Indices {
            source: position.iter().enumerate(),
            len,
            marker: PhantomData,
        }
    }
}
impl_table_iter!(Indices<'a; I> {
    fn map(_this, index, _offset) -> I {
        index
    }
});
impl<I: SparseIndex> Clone for Indices<'_, I> {
    fn clone(&self) -> Self {
        Indices {
            source: self.source.clone(),
            len: self.len,
            marker: PhantomData,
        }
    }
}
