//! Implements [`AllocVec`], a growable array that allocates through an [`Allocator`].
//!
//! Only the operations a sparse container needs are provided.

use core::alloc::Layout;
use core::marker::PhantomData;
use core::mem::ManuallyDrop;
use core::ptr::{self, NonNull};

use memres::Allocator;

use crate::capacity_overflow;

/// A contiguous growable array, storing its elements in memory from an [`Allocator`].
///
/// Zero-sized element types and zero capacities never allocate.
pub(crate) struct AllocVec<T, A: Allocator> {
    ptr: NonNull<T>,
    /// The number of elements that fit in the allocation.
    ///
    /// Zero means nothing is allocated.
    /// Always `usize::MAX` for zero-sized types.
    cap: usize,
    /// Invariant: `len <= cap` and the first `len` elements are initialized.
    len: usize,
    alloc: A,
    marker: PhantomData<T>,
}
// SAFETY: Owns its elements, exactly like a `Vec<T>`
unsafe impl<T: Send, A: Allocator + Send> Send for AllocVec<T, A> {}
// SAFETY: Shared access only hands out `&T` and `&A`
unsafe impl<T: Sync, A: Allocator + Sync> Sync for AllocVec<T, A> {}

impl<T, A: Allocator> AllocVec<T, A> {
    const IS_ZST: bool = core::mem::size_of::<T>() == 0;

    #[inline]
    pub fn new_in(alloc: A) -> Self {
        AllocVec {
            ptr: NonNull::dangling(),
            cap: if Self::IS_ZST { usize::MAX } else { 0 },
            len: 0,
            alloc,
            marker: PhantomData,
        }
    }

    /// Allocate room for exactly `capacity` elements.
    ///
    /// Does not allocate if the capacity is zero.
    #[inline]
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Self {
        let mut res = Self::new_in(alloc);
        if capacity > res.cap {
            res.grow_exact(capacity);
        }
        res
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: The first `len` elements are initialized, and the pointer is aligned
        unsafe { core::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: The first `len` elements are initialized, and we have unique access
        unsafe { core::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Ensure there is room for at least `additional` more elements.
    ///
    /// Growth is amortized.
    pub fn reserve(&mut self, additional: usize) {
        let required = self
            .len
            .checked_add(additional)
            .unwrap_or_else(|| capacity_overflow());
        if required > self.cap {
            let amortized = core::cmp::max(self.cap.saturating_mul(2), 4);
            self.grow_exact(core::cmp::max(required, amortized));
        }
    }

    /// Move the elements into a new allocation of exactly `new_cap` elements.
    #[cold]
    fn grow_exact(&mut self, new_cap: usize) {
        debug_assert!(!Self::IS_ZST);
        debug_assert!(new_cap > self.cap);
        let new_layout = array_layout::<T>(new_cap);
        let new_ptr = self
            .alloc
            .allocate(new_layout)
            .unwrap_or_else(|_| alloc::alloc::handle_alloc_error(new_layout))
            .cast::<T>();
        if self.cap != 0 {
            // SAFETY: Both regions are valid for `len` elements,
            // and a fresh allocation cannot overlap the old one
            unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), self.len) };
            // SAFETY: Allocated by an equal allocator with this layout
            unsafe {
                self.alloc
                    .deallocate(self.ptr.cast::<u8>(), array_layout::<T>(self.cap));
            }
        }
        self.ptr = new_ptr;
        self.cap = new_cap;
    }

    /// Append an element, returning a reference to it in its new location.
    #[inline]
    pub fn push(&mut self, value: T) -> &mut T {
        if self.len == self.cap {
            self.reserve(1);
        }
        // SAFETY: After reserving `len < cap`, so the offset is in bounds
        let slot = unsafe { self.ptr.as_ptr().add(self.len) };
        // SAFETY: In bounds and currently uninitialized
        unsafe { slot.write(value) };
        self.len += 1;
        // SAFETY: Just initialized, and borrowed for the lifetime of `&mut self`
        unsafe { &mut *slot }
    }

    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: The old `len - 1` is in bounds
        let slot = unsafe { self.ptr.as_ptr().add(self.len) };
        // SAFETY: Initialized, and now considered moved out
        Some(unsafe { slot.read() })
    }

    /// Remove the element at the specified offset,
    /// replacing it with the last element.
    ///
    /// Panics if the offset is out of bounds.
    #[inline]
    #[track_caller]
    pub fn swap_remove(&mut self, offset: usize) -> T {
        let last = self.len.checked_sub(1).unwrap_or_else(|| swap_remove_oob(offset, 0));
        if offset > last {
            swap_remove_oob(offset, self.len);
        }
        self.as_mut_slice().swap(offset, last);
        match self.pop() {
            Some(value) => value,
            None => unreachable!(),
        }
    }

    /// Grow to `new_len` elements, filling new slots by calling the closure.
    ///
    /// Does nothing if already at least that long.
    pub fn resize_with(&mut self, new_len: usize, mut func: impl FnMut() -> T) {
        if new_len > self.len {
            self.reserve(new_len - self.len);
            while self.len < new_len {
                self.push(func());
            }
        }
    }

    /// Drop all elements, keeping the allocation.
    pub fn clear(&mut self) {
        let elements: *mut [T] = self.as_mut_slice();
        // set first, so a panicking destructor cannot lead to a double drop
        self.len = 0;
        // SAFETY: The elements were initialized, and are no longer reachable
        unsafe { ptr::drop_in_place(elements) };
    }

    /// Replace the allocator with one that is [equal](Allocator::is_equal),
    /// keeping the current allocation.
    ///
    /// Panics if the two allocators are not interchangeable.
    #[inline]
    #[track_caller]
    pub fn rebind(&mut self, alloc: A) {
        assert!(
            self.alloc.is_equal(&alloc),
            "cannot keep memory from a different allocator"
        );
        self.alloc = alloc;
    }

    /// Move the elements into a new allocation from the specified allocator.
    ///
    /// The new allocation has exactly enough room for the elements.
    pub fn move_in<B: Allocator>(mut self, alloc: B) -> AllocVec<T, B> {
        let mut res = AllocVec::with_capacity_in(self.len, alloc);
        // SAFETY: Room for `len` elements was just allocated,
        // and a fresh allocation cannot overlap the old one
        unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), res.ptr.as_ptr(), self.len) };
        res.len = self.len;
        // the elements now belong to `res`, only free the old memory
        self.len = 0;
        res
    }

    /// Copy the elements into a new allocation from the specified allocator.
    pub fn clone_in<B: Allocator>(&self, alloc: B) -> AllocVec<T, B>
    where
        T: Clone,
    {
        let mut res = AllocVec::with_capacity_in(self.len, alloc);
        for value in self.as_slice() {
            res.push(value.clone());
        }
        res
    }
}
impl<T, A: Allocator> Drop for AllocVec<T, A> {
    fn drop(&mut self) {
        self.clear();
        if !Self::IS_ZST && self.cap != 0 {
            // SAFETY: Allocated by our allocator with this layout
            unsafe {
                self.alloc
                    .deallocate(self.ptr.cast::<u8>(), array_layout::<T>(self.cap));
            }
        }
    }
}
impl<T, A: Allocator> IntoIterator for AllocVec<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            vec: ManuallyDrop::new(self),
            head: 0,
        }
    }
}

/// Moves the elements out of an [`AllocVec`], front to back.
pub(crate) struct IntoIter<T, A: Allocator> {
    /// Elements before `head` and at or after `vec.len` have been moved out.
    vec: ManuallyDrop<AllocVec<T, A>>,
    head: usize,
}
impl<T, A: Allocator> IntoIter<T, A> {
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.vec.as_slice()[self.head..]
    }
}
impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.head == self.vec.len {
            return None;
        }
        // SAFETY: `head < len`, so the offset is in bounds
        let slot = unsafe { self.vec.ptr.as_ptr().add(self.head) };
        // SAFETY: Initialized and not yet moved out
        let value = unsafe { slot.read() };
        self.head += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.vec.len - self.head;
        (remaining, Some(remaining))
    }
}
impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.vec.len {
            None
        } else {
            self.vec.pop()
        }
    }
}
impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}
impl<T, A: Allocator> core::iter::FusedIterator for IntoIter<T, A> {}
impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remaining: *mut [T] = &mut self.vec.as_mut_slice()[self.head..];
        // the vector only frees its memory now
        self.vec.len = 0;
        // SAFETY: The remaining elements are initialized and never read again
        unsafe { ptr::drop_in_place(remaining) };
        // SAFETY: Never used again
        unsafe { ManuallyDrop::drop(&mut self.vec) };
    }
}

#[inline]
fn array_layout<T>(capacity: usize) -> Layout {
    Layout::array::<T>(capacity).unwrap_or_else(|_| capacity_overflow())
}

#[cold]
#[track_caller]
fn swap_remove_oob(offset: usize, len: usize) -> ! {
    panic!("swap_remove offset (is {offset}) should be < len (is {len})")
}
