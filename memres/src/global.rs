//! The global heap, as a [`MemoryResource`] and as an [`Allocator`].

use core::alloc::Layout;
use core::ptr::NonNull;

use crate::{AllocError, Allocator, MemoryResource};

/// A [`MemoryResource`] that forwards to the global allocator.
///
/// Zero-sized requests never reach the global allocator,
/// they receive a dangling pointer with the requested alignment.
///
/// There is exactly one instance, returned by [`global_resource`].
#[derive(Debug)]
pub struct GlobalResource {
    // not zero-sized, so the single static has an address of its own
    _unique: u8,
}

static GLOBAL_RESOURCE: GlobalResource = GlobalResource { _unique: 0 };

/// The shared [`GlobalResource`] instance.
///
/// This is the default resource of a [`PolymorphicAllocator`](crate::PolymorphicAllocator),
/// and the resource a copied container falls back to.
#[inline]
pub fn global_resource() -> &'static dyn MemoryResource {
    &GLOBAL_RESOURCE
}

impl MemoryResource for GlobalResource {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }
        // SAFETY: Layout has a non-zero size
        let ptr = unsafe { alloc::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or(AllocError)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            // SAFETY: Caller guarantees the pointer came from `allocate` with this layout
            unsafe { alloc::alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }

    /// Equal only to the [shared instance](global_resource),
    /// which is the only instance.
    #[inline]
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        core::ptr::addr_eq(other, &GLOBAL_RESOURCE)
    }
}

/// A non-null pointer with the alignment of the layout,
/// which is never dereferenced.
#[inline]
fn dangling(layout: Layout) -> NonNull<u8> {
    let addr = core::ptr::null_mut::<u8>().wrapping_add(layout.align());
    // alignment is always non-zero
    NonNull::new(addr).unwrap_or_else(NonNull::dangling)
}

/// The global heap as an [`Allocator`].
///
/// All instances are interchangeable,
/// so a copy of a container also uses the global heap.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Global;

impl Allocator for Global {
    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        GLOBAL_RESOURCE.allocate(layout)
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: Guaranteed by the caller, all `Global` instances share the resource
        unsafe { GLOBAL_RESOURCE.deallocate(ptr, layout) }
    }

    #[inline]
    fn is_equal(&self, _other: &Self) -> bool {
        true
    }

    #[inline]
    fn select_on_copy(&self) -> Self {
        Global
    }
}
