//! Memory resources, and the allocator handles that containers are generic over.
//!
//! There are two layers:
//! - A [`MemoryResource`] is an object-safe source of raw memory.
//!   Resources are usually shared by reference (`&dyn MemoryResource`),
//!   and wrap one another (a bookkeeping resource forwarding to an upstream resource).
//! - An [`Allocator`] is the cheap handle a container stores.
//!   It decides which resource a *copy* of the container should use,
//!   via [`Allocator::select_on_copy`].
//!
//! Use [`Global`] for the plain global heap,
//! or [`PolymorphicAllocator`] to route a container's memory through any resource.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use core::alloc::Layout;
use core::fmt::{self, Display, Formatter};
use core::ptr::NonNull;

mod global;
mod monotonic;
mod polymorphic;

pub use self::global::{global_resource, Global, GlobalResource};
pub use self::monotonic::MonotonicBufferResource;
pub use self::polymorphic::PolymorphicAllocator;

/// An object-safe source of raw memory.
///
/// This is the capability that bookkeeping and arena resources implement.
/// Containers do not use it directly, they go through an [`Allocator`] handle
/// such as [`PolymorphicAllocator`].
pub trait MemoryResource {
    /// Allocate a block of memory fitting the specified layout.
    ///
    /// Returns an error if the request cannot be satisfied.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block of memory to this resource.
    ///
    /// # Safety
    /// The pointer must have been returned by [`MemoryResource::allocate`]
    /// on this resource (or one [equal](Self::is_equal) to it),
    /// using exactly the same `layout`,
    /// and it must not be used after this call.
    ///
    /// Resources that validate their input (like a bookkeeping resource)
    /// may panic instead of freeing a pointer that violates these rules.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Check if memory allocated from `self` can be freed through `other`, and vice versa.
    ///
    /// The default implementation is identity:
    /// two resources are equal only if they are the same object.
    fn is_equal(&self, other: &dyn MemoryResource) -> bool {
        core::ptr::addr_eq(self, other)
    }
}

/// The allocator capability a container is generic over.
///
/// Unlike a [`MemoryResource`] this is a small value,
/// stored by the container and cloned along with it.
/// A clone must be [equal](Self::is_equal) to the original.
pub trait Allocator: Clone {
    /// Allocate a block of memory fitting the specified layout.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Return a block of memory.
    ///
    /// # Safety
    /// The pointer must have been returned by [`Allocator::allocate`]
    /// on an allocator [equal](Self::is_equal) to this one,
    /// using exactly the same `layout`.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Check if the two allocators are interchangeable,
    /// meaning memory allocated by one can be freed by the other.
    fn is_equal(&self, other: &Self) -> bool;

    /// The allocator to use for a copy of a container,
    /// when no allocator is given explicitly.
    ///
    /// This does not need to be equal to `self`.
    fn select_on_copy(&self) -> Self;
}

/// Indicates that a memory resource could not satisfy an allocation request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AllocError;
impl Display for AllocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("memory allocation failed")
    }
}

#[rustversion::since(1.81)]
impl core::error::Error for AllocError {}

#[rustversion::before(1.81)]
#[cfg(feature = "std")]
impl std::error::Error for AllocError {}
