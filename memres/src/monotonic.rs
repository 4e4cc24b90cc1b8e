//! Implements [`MonotonicBufferResource`], a bump allocator over a borrowed buffer.

use core::alloc::Layout;
use core::cell::Cell;
use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use crate::{AllocError, MemoryResource};

/// A [`MemoryResource`] that hands out consecutive pieces of a fixed buffer.
///
/// Deallocation does nothing; memory is only reclaimed all at once,
/// by [`Self::release`] or when the resource is dropped.
/// Requests that do not fit in the remaining space fail with [`AllocError`].
///
/// This makes a convenient upstream for bookkeeping resources in tests,
/// since it is cheap and can be shared between several of them.
pub struct MonotonicBufferResource<'b> {
    start: NonNull<u8>,
    capacity: usize,
    /// The offset of the first unused byte.
    ///
    /// Invariant: `offset <= capacity`
    offset: Cell<usize>,
    marker: PhantomData<&'b mut [MaybeUninit<u8>]>,
}
impl<'b> MonotonicBufferResource<'b> {
    /// Create a resource allocating from the specified buffer.
    #[inline]
    pub fn new(buffer: &'b mut [MaybeUninit<u8>]) -> Self {
        MonotonicBufferResource {
            capacity: buffer.len(),
            start: NonNull::from(buffer).cast::<u8>(),
            offset: Cell::new(0),
            marker: PhantomData,
        }
    }

    /// The number of bytes consumed so far, including alignment padding.
    #[inline]
    pub fn used(&self) -> usize {
        self.offset.get()
    }

    /// The number of bytes that have not yet been handed out.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.offset.get()
    }

    /// Reclaim the entire buffer.
    ///
    /// Requires unique access, so no memory handed out earlier can still be in use.
    #[inline]
    pub fn release(&mut self) {
        self.offset.set(0);
    }
}
impl MemoryResource for MonotonicBufferResource<'_> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let offset = self.offset.get();
        let next = self.start.as_ptr().wrapping_add(offset);
        // usize::MAX if alignment is impossible, which fails the bounds check below
        let padding = next.align_offset(layout.align());
        let begin = offset.checked_add(padding).ok_or(AllocError)?;
        let end = begin.checked_add(layout.size()).ok_or(AllocError)?;
        if end > self.capacity {
            return Err(AllocError);
        }
        self.offset.set(end);
        NonNull::new(self.start.as_ptr().wrapping_add(begin)).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {}
}
impl Debug for MonotonicBufferResource<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonotonicBufferResource")
            .field("start", &self.start)
            .field("capacity", &self.capacity)
            .field("used", &self.offset.get())
            .finish()
    }
}
