//! Implements [`SparseVec`], a position table over densely packed values.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};

use memres::{Allocator, Global};
use sparse_index::uint::{self, UnsignedPrimInt};
use sparse_index::SparseIndex;

use crate::iter::{Entries, Indices, IntoIter, Iter, IterMut};
use crate::storage::AllocVec;
use crate::{oom_index, SparseVecError};

/// An entry in the position table.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Slot<S> {
    Vacant,
    /// Holds the offset of the value in the dense array.
    Occupied(S),
}
impl<S: UnsignedPrimInt> Slot<S> {
    #[inline]
    fn occupied(offset: usize) -> Self {
        // there are never more values than valid indices
        Slot::Occupied(uint::from_usize_checked(offset).unwrap_or_else(|| unreachable!()))
    }

    /// The offset of the value in the dense array,
    /// or `None` if vacant.
    #[inline]
    pub(crate) fn offset(self) -> Option<usize> {
        match self {
            Slot::Vacant => None,
            Slot::Occupied(stored) => {
                // stored offsets always originate from a usize
                Some(uint::to_usize_checked(stored).unwrap_or_else(|| unreachable!()))
            }
        }
    }
}

/// A container of values addressed by a sparse index,
/// whose values are stored contiguously.
///
/// Internally this is a position table mapping each index to an offset,
/// and a dense array of the values themselves.
/// Iterating over the values never visits a hole,
/// so it is as fast as iterating over a slice.
/// The order of iteration depends on the history of insertions and removals,
/// use [`Self::entries`] for index order.
///
/// The position table takes space proportional to the largest index ever inserted,
/// and its entries are as wide as the index's [size type](SparseIndex::Size).
/// The maximum value of the size type is reserved, and can never be inserted.
///
/// Both arrays are allocated by the [`Allocator`] given at construction.
/// See [`Clone`], [`Self::clone_in`] and [`Self::move_in`] for how it propagates.
///
/// ## Examples
/// ```
/// use sparsevec::SparseVec;
/// let mut v = SparseVec::<&str, u8>::new();
/// v.insert(3, "three").unwrap();
/// v.insert(1, "one").unwrap();
/// assert_eq!(v.len(), 2);
/// assert_eq!(v[1], "one");
/// assert!(v.insert(3, "again").is_err());
/// assert_eq!(v.erase(3), Ok("three"));
/// assert!(v.get(3).is_none());
/// ```
pub struct SparseVec<T, I: SparseIndex = usize, A: Allocator = Global> {
    /// Invariant: Every occupied slot refers to a distinct in-bounds offset of `dense`,
    /// and there are exactly `dense.len()` occupied slots.
    position: AllocVec<Slot<I::Size>, A>,
    dense: AllocVec<T, A>,
    marker: PhantomData<I>,
}
impl<T, I: SparseIndex> SparseVec<T, I, Global> {
    /// Create an empty container using the global heap.
    ///
    /// Does not allocate.
    #[inline]
    pub fn new() -> Self {
        Self::new_in(Global)
    }
}
impl<T, I: SparseIndex, A: Allocator + Default> Default for SparseVec<T, I, A> {
    #[inline]
    fn default() -> Self {
        Self::new_in(A::default())
    }
}
impl<T, I: SparseIndex, A: Allocator> SparseVec<T, I, A> {
    /// Create an empty container using the specified allocator.
    ///
    /// Does not allocate.
    #[inline]
    pub fn new_in(alloc: A) -> Self {
        SparseVec {
            position: AllocVec::new_in(alloc.clone()),
            dense: AllocVec::new_in(alloc),
            marker: PhantomData,
        }
    }

    /// Create an empty container using the specified allocator,
    /// with room for indices below `index_capacity` and for `data_capacity` values.
    #[inline]
    pub fn with_capacity_in(index_capacity: usize, data_capacity: usize, alloc: A) -> Self {
        SparseVec {
            position: AllocVec::with_capacity_in(index_capacity, alloc.clone()),
            dense: AllocVec::with_capacity_in(data_capacity, alloc),
            marker: PhantomData,
        }
    }

    /// The allocator used by this container.
    #[inline]
    pub fn allocator(&self) -> &A {
        self.dense.allocator()
    }

    /// The number of values in the container.
    #[inline]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    /// Check if the container holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dense.len() == 0
    }

    /// The length of the position table.
    ///
    /// This is one past the largest index ever inserted,
    /// and does not shrink when values are erased.
    #[inline]
    pub fn index_len(&self) -> usize {
        self.position.len()
    }

    /// Reserve room in the position table for `additional` more indices.
    ///
    /// Never reserves past the last index the size type can store.
    #[inline]
    pub fn reserve_index(&mut self, additional: usize) {
        let room = uint::max_table_len::<I::Size>().saturating_sub(self.position.len());
        self.position.reserve(additional.min(room));
    }

    /// Reserve room for `additional` more values.
    #[inline]
    pub fn reserve_data(&mut self, additional: usize) {
        self.dense.reserve(additional);
    }

    /// Remove all values, keeping the allocated memory.
    pub fn clear(&mut self) {
        self.position.clear();
        self.dense.clear();
    }

    /// Validate that a value can be inserted at the index,
    /// growing the position table to cover it.
    ///
    /// Returns the location of the slot in the table.
    fn prepare_insert(&mut self, index: I) -> Result<usize, SparseVecError<I>> {
        let size = index.to_size();
        if uint::is_reserved(size) {
            return Err(SparseVecError::InvalidIndex { index });
        }
        let pos = uint::to_usize_checked(size).unwrap_or_else(|| oom_index(size));
        match self.position.as_slice().get(pos) {
            Some(Slot::Occupied(_)) => Err(SparseVecError::DuplicateIndex { index }),
            Some(Slot::Vacant) => Ok(pos),
            None => {
                self.grow_position(pos);
                Ok(pos)
            }
        }
    }

    #[cold]
    fn grow_position(&mut self, pos: usize) {
        let new_len = pos.checked_add(1).unwrap_or_else(|| oom_index(pos));
        self.position.resize_with(new_len, || Slot::Vacant);
    }

    /// Insert a value at the specified index,
    /// returning a reference to it in its new location.
    ///
    /// Fails if the index already holds a value, which is never overwritten,
    /// or if the index is the reserved maximum.
    #[inline]
    pub fn insert(&mut self, index: I, value: T) -> Result<&mut T, SparseVecError<I>> {
        self.emplace(index, || value)
    }

    /// Insert a value constructed in place by the closure.
    ///
    /// The closure only runs if the index is valid and vacant,
    /// otherwise this fails exactly like [`Self::insert`].
    pub fn emplace(
        &mut self,
        index: I,
        make: impl FnOnce() -> T,
    ) -> Result<&mut T, SparseVecError<I>> {
        let pos = self.prepare_insert(index)?;
        self.dense.reserve(1);
        let value = make();
        let offset = self.dense.len();
        self.position.as_mut_slice()[pos] = Slot::occupied(offset);
        Ok(self.dense.push(value))
    }

    /// Locate the slot and dense offset of an index.
    #[inline]
    fn locate(&self, index: I) -> Result<(usize, usize), SparseVecError<I>> {
        let table = self.position.as_slice();
        let found = uint::to_usize_checked(index.to_size())
            .and_then(|pos| Some((pos, *table.get(pos)?)));
        match found {
            None => Err(SparseVecError::OutOfRange {
                index,
                len: table.len(),
            }),
            Some((pos, slot)) => match slot.offset() {
                Some(offset) => Ok((pos, offset)),
                None => Err(SparseVecError::NotFound { index }),
            },
        }
    }

    /// Remove the value at the specified index, returning it.
    ///
    /// The last value of the dense array takes the place of the removed one.
    /// Finding the slot that referred to it requires a scan of the position table,
    /// so this takes time proportional to [`Self::index_len`].
    pub fn erase(&mut self, index: I) -> Result<T, SparseVecError<I>> {
        let (pos, offset) = self.locate(index)?;
        let last = self.dense.len() - 1;
        if offset != last {
            let moved = self
                .position
                .as_mut_slice()
                .iter_mut()
                .find(|slot| slot.offset() == Some(last));
            match moved {
                Some(slot) => *slot = Slot::occupied(offset),
                None => unreachable!("no slot refers to the last value"),
            }
        }
        self.position.as_mut_slice()[pos] = Slot::Vacant;
        Ok(self.dense.swap_remove(offset))
    }

    /// Get the value at the specified index,
    /// distinguishing an index past the position table from a vacant one.
    #[inline]
    pub fn try_get(&self, index: I) -> Result<&T, SparseVecError<I>> {
        let (_, offset) = self.locate(index)?;
        Ok(&self.dense.as_slice()[offset])
    }

    /// Get a mutable reference to the value at the specified index.
    ///
    /// Fails in the same cases as [`Self::try_get`].
    #[inline]
    pub fn try_get_mut(&mut self, index: I) -> Result<&mut T, SparseVecError<I>> {
        let (_, offset) = self.locate(index)?;
        Ok(&mut self.dense.as_mut_slice()[offset])
    }

    /// Get the value at the specified index, or `None` if missing.
    #[inline]
    pub fn get(&self, index: I) -> Option<&T> {
        self.try_get(index).ok()
    }

    /// Get a mutable reference to the value at the specified index,
    /// or `None` if missing.
    #[inline]
    pub fn get_mut(&mut self, index: I) -> Option<&mut T> {
        self.try_get_mut(index).ok()
    }

    /// Check if the specified index holds a value.
    #[inline]
    pub fn contains(&self, index: I) -> bool {
        self.locate(index).is_ok()
    }

    /// Locate the dense offset of an index, without any checks.
    ///
    /// # Safety
    /// The index must hold a value.
    #[inline]
    unsafe fn offset_unchecked(&self, index: I) -> usize {
        debug_assert!(self.contains(index), "No value at index {index:?}");
        // SAFETY: An occupied index is in bounds of the table, so it fits in a usize
        let pos = unsafe { uint::to_usize_checked(index.to_size()).unwrap_unchecked() };
        // SAFETY: An occupied index is in bounds of the table
        let slot = unsafe { *self.position.as_slice().get_unchecked(pos) };
        match slot.offset() {
            Some(offset) => offset,
            // SAFETY: Guaranteed occupied by the caller
            None => unsafe { core::hint::unreachable_unchecked() },
        }
    }

    /// Get the value at the specified index, skipping all checks.
    ///
    /// With debug assertions enabled, a missing value still panics.
    ///
    /// # Safety
    /// The index must hold a value.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: I) -> &T {
        // SAFETY: Guaranteed by the caller
        let offset = unsafe { self.offset_unchecked(index) };
        // SAFETY: Offsets of occupied slots are in bounds of the dense array
        unsafe { self.dense.as_slice().get_unchecked(offset) }
    }

    /// Get a mutable reference to the value at the specified index,
    /// skipping all checks.
    ///
    /// # Safety
    /// The index must hold a value.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: I) -> &mut T {
        // SAFETY: Guaranteed by the caller
        let offset = unsafe { self.offset_unchecked(index) };
        // SAFETY: Offsets of occupied slots are in bounds of the dense array
        unsafe { self.dense.as_mut_slice().get_unchecked_mut(offset) }
    }

    /// The values, in storage order.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.dense.as_slice()
    }

    /// The values, in storage order.
    ///
    /// Values can be modified, but not added or removed.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.dense.as_mut_slice()
    }

    /// Iterate over the values in storage order.
    ///
    /// This order depends on the history of insertions and removals.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.dense.as_slice())
    }

    /// Mutably iterate over the values in storage order.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.dense.as_mut_slice())
    }

    /// Iterate over the index-value pairs.
    ///
    /// Guaranteed to be sorted by the integer value of the index.
    /// This scans the position table, so vacant slots are visited and skipped.
    #[inline]
    pub fn entries(&self) -> Entries<'_, T, I> {
        Entries::new(self.position.as_slice(), self.dense.as_slice())
    }

    /// Iterate over the occupied indices in increasing order.
    #[inline]
    pub fn indices(&self) -> Indices<'_, I> {
        Indices::new(self.position.as_slice(), self.dense.len())
    }

    /// Copy the contents into a new container using exactly the specified allocator.
    ///
    /// An empty container is copied without allocating.
    pub fn clone_in<B: Allocator>(&self, alloc: B) -> SparseVec<T, I, B>
    where
        T: Clone,
    {
        SparseVec {
            position: self.position.clone_in(alloc.clone()),
            dense: self.dense.clone_in(alloc),
            marker: PhantomData,
        }
    }

    /// Move the contents into a container using exactly the specified allocator.
    ///
    /// If the allocator is [equal](Allocator::is_equal) to the current one,
    /// the existing memory is kept.
    /// Otherwise the values are moved into memory from the new allocator,
    /// and the old memory is freed.
    pub fn move_in(mut self, alloc: A) -> Self {
        if self.allocator().is_equal(&alloc) {
            self.position.rebind(alloc.clone());
            self.dense.rebind(alloc);
            self
        } else {
            SparseVec {
                position: self.position.move_in(alloc.clone()),
                dense: self.dense.move_in(alloc),
                marker: PhantomData,
            }
        }
    }

    /// Move the contents of `source` into this container, leaving `source` empty.
    ///
    /// This container keeps its allocator, as with [`Self::move_in`].
    /// The previous contents are dropped.
    ///
    /// Both containers are borrowed mutably,
    /// so they can never be the same container.
    pub fn take_from(&mut self, source: &mut Self) {
        let empty = SparseVec::new_in(source.allocator().clone());
        let taken = core::mem::replace(source, empty);
        *self = taken.move_in(self.allocator().clone());
    }

    /// The position table without its trailing vacant slots.
    fn occupied_table(&self) -> &[Slot<I::Size>] {
        let table = self.position.as_slice();
        let end = table
            .iter()
            .rposition(|slot| *slot != Slot::Vacant)
            .map_or(0, |last| last + 1);
        &table[..end]
    }

    /// Compare the position tables slot by slot,
    /// then by the number of values.
    ///
    /// A vacant slot sorts after an occupied one.
    /// Trailing vacant slots are ignored,
    /// so erasing the highest index compares the same as never inserting it.
    fn compare_with<U, B: Allocator>(
        &self,
        other: &SparseVec<U, I, B>,
        mut compare_values: impl FnMut(&T, &U) -> Option<Ordering>,
    ) -> Option<Ordering> {
        let (dense, other_dense) = (self.dense.as_slice(), other.dense.as_slice());
        for (&slot, &other_slot) in self.occupied_table().iter().zip(other.occupied_table()) {
            match (slot.offset(), other_slot.offset()) {
                (None, None) => continue,
                (None, Some(_)) => return Some(Ordering::Greater),
                (Some(_), None) => return Some(Ordering::Less),
                (Some(offset), Some(other_offset)) => {
                    match compare_values(&dense[offset], &other_dense[other_offset]) {
                        Some(Ordering::Equal) => continue,
                        unequal => return unequal,
                    }
                }
            }
        }
        Some(self.len().cmp(&other.len()))
    }
}
impl<T: Clone, I: SparseIndex, A: Allocator> Clone for SparseVec<T, I, A> {
    /// Copy the container using the allocator chosen by [`Allocator::select_on_copy`].
    ///
    /// This may differ from the allocator of the original,
    /// use [`SparseVec::clone_in`] to keep it.
    #[inline]
    fn clone(&self) -> Self {
        self.clone_in(self.allocator().select_on_copy())
    }

    /// Replace the contents with a copy of `source`,
    /// keeping the allocator of `self`.
    ///
    /// If cloning a value panics, `self` is left unchanged.
    fn clone_from(&mut self, source: &Self) {
        let alloc = self.allocator().clone();
        // both arrays are built before either is replaced
        let dense = source.dense.clone_in(alloc.clone());
        let position = source.position.clone_in(alloc);
        self.position = position;
        self.dense = dense;
    }
}
impl<T, U, I, A, B> PartialEq<SparseVec<U, I, B>> for SparseVec<T, I, A>
where
    T: PartialEq<U>,
    I: SparseIndex,
    A: Allocator,
    B: Allocator,
{
    fn eq(&self, other: &SparseVec<U, I, B>) -> bool {
        self.len() == other.len()
            && self.compare_with(other, |a, b| {
                Some(if a == b {
                    Ordering::Equal
                } else {
                    Ordering::Less
                })
            }) == Some(Ordering::Equal)
    }
}
impl<T: Eq, I: SparseIndex, A: Allocator> Eq for SparseVec<T, I, A> {}
impl<T, I, A, B> PartialOrd<SparseVec<T, I, B>> for SparseVec<T, I, A>
where
    T: PartialOrd,
    I: SparseIndex,
    A: Allocator,
    B: Allocator,
{
    /// Compare slot by slot in index order.
    ///
    /// At the first index where the containers differ,
    /// a vacant slot sorts after a value and two values compare as themselves.
    /// If one position table is a prefix of the other
    /// (ignoring trailing vacant slots),
    /// the container holding fewer values is less.
    #[inline]
    fn partial_cmp(&self, other: &SparseVec<T, I, B>) -> Option<Ordering> {
        self.compare_with(other, T::partial_cmp)
    }
}
impl<T: Ord, I: SparseIndex, A: Allocator> Ord for SparseVec<T, I, A> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        match self.compare_with(other, |a, b| Some(a.cmp(b))) {
            Some(ordering) => ordering,
            None => unreachable!(),
        }
    }
}
impl<T, I: SparseIndex, A: Allocator> Index<I> for SparseVec<T, I, A> {
    type Output = T;

    #[inline]
    #[track_caller]
    fn index(&self, index: I) -> &Self::Output {
        self.try_get(index).unwrap_or_else(|err| err.panic())
    }
}
impl<T, I: SparseIndex, A: Allocator> IndexMut<I> for SparseVec<T, I, A> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        self.try_get_mut(index).unwrap_or_else(|err| err.panic())
    }
}
impl<T, I: SparseIndex, A: Allocator> Extend<(I, T)> for SparseVec<T, I, A> {
    /// Insert each pair, panicking if an index is already occupied.
    fn extend<It: IntoIterator<Item = (I, T)>>(&mut self, iter: It) {
        for (index, value) in iter {
            if let Err(err) = self.insert(index, value) {
                err.panic()
            }
        }
    }
}
impl<'a, T: Clone, I: SparseIndex, A: Allocator> Extend<(I, &'a T)> for SparseVec<T, I, A> {
    fn extend<It: IntoIterator<Item = (I, &'a T)>>(&mut self, iter: It) {
        self.extend(iter.into_iter().map(|(index, value)| (index, value.clone())));
    }
}
impl<T, I: SparseIndex, A: Allocator + Default> FromIterator<(I, T)> for SparseVec<T, I, A> {
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        let mut res = Self::default();
        res.extend(iter);
        res
    }
}
impl<T, I: SparseIndex, A: Allocator> IntoIterator for SparseVec<T, I, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    /// Consume the values in storage order.
    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.dense.into_iter())
    }
}
impl<'a, T, I: SparseIndex, A: Allocator> IntoIterator for &'a SparseVec<T, I, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
impl<'a, T, I: SparseIndex, A: Allocator> IntoIterator for &'a mut SparseVec<T, I, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
impl<T: Debug, I: SparseIndex, A: Allocator> Debug for SparseVec<T, I, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}
