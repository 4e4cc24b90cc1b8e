#![allow(missing_docs)]
extern crate alloc;

use alloc::vec::Vec;
use core::alloc::Layout;
use core::mem::MaybeUninit;
use core::ptr::NonNull;

use alloc_ledger::{AllocationLedger, DeallocError};
use memres::{AllocError, MemoryResource, MonotonicBufferResource};
use proptest::prelude::*;

fn layout(size: usize, align: usize) -> Layout {
    Layout::from_size_align(size, align).unwrap()
}

#[test]
fn bookkeeping() {
    let ledger = AllocationLedger::default();
    assert!(ledger.is_unused());
    assert!(ledger.has_no_leak());
    assert_eq!(ledger.live_allocations(), 0);
    assert_eq!(ledger.live_bytes(), 0);
    assert_eq!(ledger.deallocations(), 0);

    let foo = ledger.allocate(layout(10, 2)).unwrap();
    assert!(!ledger.is_unused());
    assert!(!ledger.has_no_leak());
    assert_eq!(ledger.live_allocations(), 1);
    assert_eq!(ledger.live_bytes(), 10);
    assert_eq!(ledger.deallocations(), 0);

    assert_eq!(
        ledger.try_deallocate(foo, layout(1, 2)),
        Err(DeallocError::Mismatched {
            address: foo,
            requested_size: 1,
            requested_align: 2,
            recorded_size: 10,
            recorded_align: 2,
        })
    );
    assert!(matches!(
        ledger.try_deallocate(foo, layout(10, 4)),
        Err(DeallocError::Mismatched {
            requested_align: 4,
            recorded_align: 2,
            ..
        })
    ));
    let local = foo;
    let foreign = NonNull::from(&local).cast::<u8>();
    assert_eq!(
        ledger.try_deallocate(foreign, layout(10, 2)),
        Err(DeallocError::ForeignPointer { address: foreign })
    );
    // failed deallocations change nothing
    assert_eq!(ledger.live_allocations(), 1);
    assert_eq!(ledger.deallocations(), 0);

    ledger.try_deallocate(foo, layout(10, 2)).unwrap();
    assert_eq!(
        ledger.try_deallocate(foo, layout(10, 2)),
        Err(DeallocError::DoubleFree { address: foo })
    );
    assert_eq!(ledger.live_allocations(), 0);
    assert_eq!(ledger.live_bytes(), 0);
    assert_eq!(ledger.deallocations(), 1);
    assert!(ledger.has_no_leak());

    let bar = ledger.allocate(layout(100, 4)).unwrap();
    assert_eq!(ledger.live_allocations(), 1);
    assert_eq!(ledger.deallocations(), 1);
    assert!(!ledger.has_no_leak());

    // SAFETY: Allocated above with the same layout
    unsafe { ledger.deallocate(bar, layout(100, 4)) };
    assert!(ledger.has_no_leak());
    assert!(!ledger.is_unused());
    ledger.close();
}

#[test]
fn upstream_failure_records_nothing() {
    let mut buf = [MaybeUninit::<u8>::uninit(); 64];
    let upstream = MonotonicBufferResource::new(&mut buf);
    let ledger = AllocationLedger::new(&upstream);
    assert_eq!(ledger.allocate(layout(128, 1)), Err(AllocError));
    assert!(ledger.is_unused());
    let ptr = ledger.allocate(layout(32, 8)).unwrap();
    assert_eq!(ledger.live_bytes(), 32);
    ledger.try_deallocate(ptr, layout(32, 8)).unwrap();
    ledger.close();
}

#[test]
fn shared_upstream() {
    let mut buf = [MaybeUninit::<u8>::uninit(); 256];
    let upstream = MonotonicBufferResource::new(&mut buf);
    let first = AllocationLedger::new(&upstream);
    let second = AllocationLedger::new(&upstream);
    let a = first.allocate(layout(16, 4)).unwrap();
    let b = second.allocate(layout(16, 4)).unwrap();
    assert_ne!(a, b);
    // each ledger only knows its own allocations
    assert_eq!(
        second.try_deallocate(a, layout(16, 4)),
        Err(DeallocError::ForeignPointer { address: a })
    );
    assert!(!first.is_equal(&second));
    assert!(first.upstream().is_equal(&upstream));
    assert!(second.upstream().is_equal(first.upstream()));
    first.try_deallocate(a, layout(16, 4)).unwrap();
    second.try_deallocate(b, layout(16, 4)).unwrap();
    assert!(upstream.used() >= 32);
    first.close();
    second.close();
}

#[test]
fn live_records_in_allocation_order() {
    let ledger = AllocationLedger::default();
    let small = ledger.allocate(layout(1, 1)).unwrap();
    let large = ledger.allocate(layout(64, 16)).unwrap();
    let records = ledger.live_records();
    assert_eq!(records.len(), 2);
    assert_eq!(
        (records[0].address, records[0].size, records[0].align),
        (small, 1, 1)
    );
    assert_eq!(
        (records[1].address, records[1].size, records[1].align),
        (large, 64, 16)
    );
    ledger.try_deallocate(small, layout(1, 1)).unwrap();
    ledger.try_deallocate(large, layout(64, 16)).unwrap();
}

#[test]
#[should_panic = "Double free of address"]
fn deallocate_panics_on_double_free() {
    let ledger = AllocationLedger::default();
    let ptr = ledger.allocate(layout(8, 8)).unwrap();
    ledger.try_deallocate(ptr, layout(8, 8)).unwrap();
    // SAFETY: The ledger validates the pointer before freeing anything
    unsafe { ledger.deallocate(ptr, layout(8, 8)) };
}

#[test]
#[cfg(not(feature = "std"))]
#[should_panic = "Leaking memory resource!"]
fn leak_is_fatal() {
    let ledger = AllocationLedger::default();
    let _ = ledger.allocate(layout(8, 8)).unwrap();
    ledger.close();
}

/// Aborting cannot be observed in-process,
/// so the test binary re-runs this test in a child that leaks.
#[test]
#[cfg(feature = "std")]
fn leak_aborts_with_dump() {
    const LEAKING_CHILD: &str = "ALLOC_LEDGER_LEAKING_CHILD";
    if std::env::var_os(LEAKING_CHILD).is_some() {
        let ledger = AllocationLedger::default();
        let _ = ledger.allocate(layout(8, 8)).unwrap();
        ledger.close();
        unreachable!("closing a leaking ledger returned");
    }
    let output = std::process::Command::new(std::env::current_exe().unwrap())
        .args(["leak_aborts_with_dump", "--exact", "--nocapture", "--test-threads=1"])
        .env(LEAKING_CHILD, "1")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Leaking memory resource!"), "{stderr}");
    assert!(
        stderr.contains("There are 1 live allocations, with a total of 8 bytes allocated:"),
        "{stderr}"
    );
}

#[test]
#[cfg(feature = "std")]
#[should_panic = "failed while holding memory"]
fn leak_while_panicking_keeps_unwinding() {
    let ledger = AllocationLedger::default();
    let _ = ledger.allocate(layout(8, 8)).unwrap();
    panic!("failed while holding memory");
}

#[derive(Debug, Clone)]
enum Op {
    Allocate { size: usize, align_shift: u32 },
    Free { which: usize },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..256, 0u32..6).prop_map(|(size, align_shift)| Op::Allocate { size, align_shift }),
        any::<usize>().prop_map(|which| Op::Free { which }),
    ]
}

proptest! {
    #[test]
    fn tracks_live_set(ops in proptest::collection::vec(op(), 0..64)) {
        let ledger = AllocationLedger::default();
        let mut model: Vec<(NonNull<u8>, Layout)> = Vec::new();
        let mut frees = 0;
        for op in ops {
            match op {
                Op::Allocate { size, align_shift } => {
                    let layout = layout(size, 1 << align_shift);
                    let ptr = ledger.allocate(layout).unwrap();
                    model.push((ptr, layout));
                }
                Op::Free { which } => {
                    if model.is_empty() {
                        continue;
                    }
                    let (ptr, layout) = model.swap_remove(which % model.len());
                    ledger.try_deallocate(ptr, layout).unwrap();
                    frees += 1;
                }
            }
            prop_assert_eq!(ledger.live_allocations(), model.len());
            prop_assert_eq!(ledger.live_bytes(), model.iter().map(|(_, l)| l.size()).sum::<usize>());
            prop_assert_eq!(ledger.deallocations(), frees);
        }
        for (ptr, layout) in model.drain(..) {
            ledger.try_deallocate(ptr, layout).unwrap();
        }
        prop_assert!(ledger.has_no_leak());
    }
}
