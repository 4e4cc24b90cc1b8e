//! A sparse container mapping caller-chosen indices to densely stored values.
//!
//! A [`SparseVec`] keeps two arrays:
//! a position table addressed by index, and a dense array of values.
//! Lookup by index is a pair of array accesses,
//! while iteration walks the dense array without ever visiting a hole.
//!
//! Both arrays are allocated through an [`Allocator`](memres::Allocator),
//! so a container can draw its memory from any [`memres::MemoryResource`].
#![deny(missing_docs)]
#![cfg_attr(not(doc), no_std)]

extern crate alloc;

mod error;
pub mod iter;
mod macros;
#[cfg(feature = "serde")]
mod serde;
mod storage;
mod vec;

pub use self::error::SparseVecError;
pub use self::vec::SparseVec;

pub extern crate memres;
pub extern crate sparse_index;

use sparse_index::uint::{self, UnsignedPrimInt};

/// Panic indicating that an index would exhaust available memory.
#[inline(never)]
#[track_caller]
#[cold]
fn oom_index(index: impl UnsignedPrimInt) -> ! {
    panic!(
        "Storing index would exhaust memory: {}",
        uint::describe(index),
    )
}

/// Panic indicating that a requested capacity cannot be represented.
#[inline(never)]
#[track_caller]
#[cold]
fn capacity_overflow() -> ! {
    panic!("capacity overflow")
}
