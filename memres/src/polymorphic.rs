//! Implements [`PolymorphicAllocator`], an [`Allocator`] handle over any [`MemoryResource`].

use core::alloc::Layout;
use core::fmt::{self, Debug, Formatter};
use core::ptr::NonNull;

use crate::{global_resource, AllocError, Allocator, MemoryResource};

/// An [`Allocator`] that routes every request to a borrowed [`MemoryResource`].
///
/// Two polymorphic allocators are equal if their resources are equal
/// (see [`MemoryResource::is_equal`]).
///
/// A copy of a container does *not* inherit the resource:
/// [`Allocator::select_on_copy`] returns an allocator over the [`global_resource`].
/// Pass the allocator explicitly to copy a container into the same resource.
#[derive(Copy, Clone)]
pub struct PolymorphicAllocator<'r> {
    resource: &'r dyn MemoryResource,
}
impl<'r> PolymorphicAllocator<'r> {
    /// Create an allocator drawing memory from the specified resource.
    #[inline]
    pub fn new(resource: &'r dyn MemoryResource) -> Self {
        PolymorphicAllocator { resource }
    }

    /// The resource this allocator draws memory from.
    #[inline]
    pub fn resource(&self) -> &'r dyn MemoryResource {
        self.resource
    }
}
impl Default for PolymorphicAllocator<'_> {
    /// An allocator over the [`global_resource`].
    #[inline]
    fn default() -> Self {
        PolymorphicAllocator::new(global_resource())
    }
}
impl<'r, R: MemoryResource> From<&'r R> for PolymorphicAllocator<'r> {
    #[inline]
    fn from(resource: &'r R) -> Self {
        PolymorphicAllocator::new(resource)
    }
}
impl PartialEq for PolymorphicAllocator<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(self.resource, other.resource) || self.resource.is_equal(other.resource)
    }
}
impl Debug for PolymorphicAllocator<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolymorphicAllocator")
            .field("resource", &core::ptr::from_ref(self.resource).cast::<()>())
            .finish()
    }
}

impl Allocator for PolymorphicAllocator<'_> {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        self.resource.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Equal allocators have equal resources, guaranteed by the caller
        unsafe { self.resource.deallocate(ptr, layout) }
    }

    #[inline]
    fn is_equal(&self, other: &Self) -> bool {
        self == other
    }

    #[inline]
    fn select_on_copy(&self) -> Self {
        PolymorphicAllocator::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MonotonicBufferResource;
    use core::mem::MaybeUninit;

    #[test]
    fn identity_equality() {
        let mut first_buf = [MaybeUninit::<u8>::uninit(); 16];
        let mut second_buf = [MaybeUninit::<u8>::uninit(); 16];
        let first = MonotonicBufferResource::new(&mut first_buf);
        let second = MonotonicBufferResource::new(&mut second_buf);
        let a = PolymorphicAllocator::from(&first);
        let b = PolymorphicAllocator::from(&second);
        assert_eq!(a, a);
        assert_eq!(a, PolymorphicAllocator::new(&first));
        assert_ne!(a, b);
    }

    #[test]
    fn copy_selects_global() {
        let mut buf = [MaybeUninit::<u8>::uninit(); 16];
        let local = MonotonicBufferResource::new(&mut buf);
        let alloc = PolymorphicAllocator::from(&local);
        let copied = alloc.select_on_copy();
        assert_ne!(copied, alloc);
        assert_eq!(copied, PolymorphicAllocator::default());
    }
}
