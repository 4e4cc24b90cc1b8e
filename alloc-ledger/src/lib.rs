//! A bookkeeping [`MemoryResource`] for testing allocator-aware code.
//!
//! An [`AllocationLedger`] forwards every request to an upstream resource,
//! and records each allocation until it is freed.
//! Every deallocation is checked against those records,
//! so freeing with the wrong size or alignment, freeing twice,
//! or freeing memory from somewhere else is reported instead of corrupting the heap.
//!
//! Dropping a ledger while allocations are still live is a fatal error.
//! With the `std` feature this prints the live allocations to stderr and aborts,
//! unless the thread is already panicking, in which case the dump is printed
//! and the original panic keeps unwinding.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::vec::Vec;
use core::alloc::Layout;
use core::cell::RefCell;
use core::fmt::{self, Debug, Formatter};
use core::ptr::NonNull;

use memres::{AllocError, MemoryResource};

mod error;

pub use self::error::DeallocError;

/// The record of a single allocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Allocation {
    /// The size of the allocation in bytes.
    pub size: usize,
    /// The alignment of the allocation.
    pub align: usize,
    /// The address returned by the upstream resource.
    pub address: NonNull<u8>,
}
impl Allocation {
    #[inline]
    fn new(address: NonNull<u8>, layout: Layout) -> Self {
        Allocation {
            size: layout.size(),
            align: layout.align(),
            address,
        }
    }
}

#[derive(Default)]
struct LedgerState {
    live: Vec<Allocation>,
    dead: Vec<Allocation>,
    /// The sum of the sizes in `live`.
    live_bytes: usize,
}

/// A [`MemoryResource`] that records every allocation,
/// and validates every deallocation against those records.
///
/// A ledger is equal only to itself,
/// so memory it hands out can never be freed through another resource.
/// Several ledgers can share one upstream.
///
/// The ledger must not have any live allocations when it is dropped.
/// See [`Self::close`].
///
/// ## Examples
/// ```
/// use alloc_ledger::AllocationLedger;
/// use core::alloc::Layout;
/// use memres::MemoryResource;
///
/// let ledger = AllocationLedger::default();
/// let layout = Layout::from_size_align(10, 2).unwrap();
/// let ptr = ledger.allocate(layout).unwrap();
/// assert_eq!(ledger.live_allocations(), 1);
/// assert!(ledger.try_deallocate(ptr, Layout::from_size_align(1, 2).unwrap()).is_err());
/// ledger.try_deallocate(ptr, layout).unwrap();
/// assert!(ledger.try_deallocate(ptr, layout).is_err());
/// ledger.close();
/// ```
pub struct AllocationLedger<'u> {
    upstream: &'u dyn MemoryResource,
    state: RefCell<LedgerState>,
}
impl<'u> AllocationLedger<'u> {
    /// Create a ledger that obtains its memory from the specified resource.
    #[inline]
    pub fn new(upstream: &'u dyn MemoryResource) -> Self {
        AllocationLedger {
            upstream,
            state: RefCell::new(LedgerState::default()),
        }
    }

    /// The resource this ledger forwards to.
    #[inline]
    pub fn upstream(&self) -> &'u dyn MemoryResource {
        self.upstream
    }

    /// Free an allocation, verifying it matches a live record.
    ///
    /// On success, the record is moved from the live set to the freed set,
    /// and the memory is returned to the upstream resource.
    /// On failure, nothing changes.
    ///
    /// This is safe to call with any pointer,
    /// since only memory matching a live record is ever freed.
    pub fn try_deallocate(&self, address: NonNull<u8>, layout: Layout) -> Result<(), DeallocError> {
        let requested = Allocation::new(address, layout);
        {
            let mut state = self.state.borrow_mut();
            if let Some(index) = state.live.iter().position(|live| *live == requested) {
                let record = state.live.remove(index);
                state.live_bytes -= record.size;
                state.dead.push(record);
            } else if let Some(existing) = state.live.iter().find(|live| live.address == address)
            {
                return Err(DeallocError::Mismatched {
                    address,
                    requested_size: layout.size(),
                    requested_align: layout.align(),
                    recorded_size: existing.size,
                    recorded_align: existing.align,
                });
            } else if state.dead.iter().any(|dead| dead.address == address) {
                return Err(DeallocError::DoubleFree { address });
            } else {
                return Err(DeallocError::ForeignPointer { address });
            }
        }
        // SAFETY: A live record means the upstream returned this address for this layout,
        // and it has not been freed since
        unsafe { self.upstream.deallocate(address, layout) };
        Ok(())
    }

    /// The number of allocations that have not been freed.
    #[inline]
    pub fn live_allocations(&self) -> usize {
        self.state.borrow().live.len()
    }

    /// The total size in bytes of the live allocations.
    #[inline]
    pub fn live_bytes(&self) -> usize {
        self.state.borrow().live_bytes
    }

    /// The number of successful deallocations.
    #[inline]
    pub fn deallocations(&self) -> usize {
        self.state.borrow().dead.len()
    }

    /// Check if this ledger has never allocated anything.
    #[inline]
    pub fn is_unused(&self) -> bool {
        let state = self.state.borrow();
        state.live.is_empty() && state.dead.is_empty()
    }

    /// Check if every allocation has been freed.
    #[inline]
    pub fn has_no_leak(&self) -> bool {
        self.state.borrow().live.is_empty()
    }

    /// A snapshot of the live allocations, in the order they were made.
    pub fn live_records(&self) -> Vec<Allocation> {
        self.state.borrow().live.clone()
    }

    /// Write a description of the live allocations to the specified sink.
    ///
    /// The first line gives the count and total size,
    /// followed by one indented line per allocation.
    pub fn write_live_allocations(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let state = self.state.borrow();
        writeln!(
            out,
            "There are {} live allocations, with a total of {} bytes allocated:",
            state.live.len(),
            state.live_bytes
        )?;
        for allocation in &state.live {
            writeln!(
                out,
                "  {:p}: {} bytes, alignment {}",
                allocation.address, allocation.size, allocation.align
            )?;
        }
        Ok(())
    }

    /// Drop the ledger, verifying that no allocations are live.
    ///
    /// This is equivalent to dropping it,
    /// but makes the end of its lifetime explicit.
    ///
    /// # Panics
    /// Leaking allocations is fatal,
    /// see the [type-level documentation](Self).
    #[inline]
    #[track_caller]
    pub fn close(self) {
        drop(self);
    }
}
impl Default for AllocationLedger<'_> {
    /// A ledger over the [global resource](memres::global_resource).
    #[inline]
    fn default() -> Self {
        AllocationLedger::new(memres::global_resource())
    }
}
impl Drop for AllocationLedger<'_> {
    fn drop(&mut self) {
        if !self.has_no_leak() {
            leak_detected(self);
        }
    }
}
impl MemoryResource for AllocationLedger<'_> {
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let address = self.upstream.allocate(layout)?;
        let mut state = self.state.borrow_mut();
        state.live.push(Allocation::new(address, layout));
        state.live_bytes += layout.size();
        Ok(address)
    }

    /// Free an allocation through [`AllocationLedger::try_deallocate`],
    /// panicking if it does not match a live record.
    #[track_caller]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if let Err(err) = self.try_deallocate(ptr, layout) {
            err.panic()
        }
    }
}
impl PartialEq for AllocationLedger<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        core::ptr::eq(self, other)
    }
}
impl Eq for AllocationLedger<'_> {}
impl Debug for AllocationLedger<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("AllocationLedger")
            .field("live_allocations", &state.live.len())
            .field("live_bytes", &state.live_bytes)
            .field("deallocations", &state.dead.len())
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "std")]
#[cold]
#[inline(never)]
fn leak_detected(ledger: &AllocationLedger<'_>) {
    let mut dump = alloc::string::String::new();
    // writing to a string never fails
    let _ = ledger.write_live_allocations(&mut dump);
    eprint!("Leaking memory resource!\n{dump}");
    // a panic already in flight is reported by its own unwinding
    if !std::thread::panicking() {
        std::process::abort()
    }
}

#[cfg(not(feature = "std"))]
#[cold]
#[inline(never)]
#[track_caller]
fn leak_detected(ledger: &AllocationLedger<'_>) -> ! {
    panic!(
        "Leaking memory resource! {} live allocations, with a total of {} bytes",
        ledger.live_allocations(),
        ledger.live_bytes()
    )
}
