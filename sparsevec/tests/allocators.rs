#![allow(missing_docs)]
use core::mem::MaybeUninit;

use alloc_ledger::AllocationLedger;
use memres::{Allocator, MonotonicBufferResource, PolymorphicAllocator};
use sparsevec::SparseVec;

type PmrVec<'r, T> = SparseVec<T, usize, PolymorphicAllocator<'r>>;

fn populated<'r>(alloc: PolymorphicAllocator<'r>) -> PmrVec<'r, i32> {
    let mut v = SparseVec::new_in(alloc);
    v.insert(0, 1).unwrap();
    v.insert(5, 14).unwrap();
    v.insert(8, 3).unwrap();
    v
}

fn assert_populated(v: &PmrVec<'_, i32>) {
    assert_eq!(v.len(), 3);
    assert_eq!((v[0], v[5], v[8]), (1, 14, 3));
}

#[test]
fn construction_does_not_allocate() {
    let ledger = AllocationLedger::default();
    let alloc = PolymorphicAllocator::from(&ledger);
    let v1 = PmrVec::<i32>::new_in(alloc);
    let v2 = SparseVec::<i32, u8, _>::new_in(alloc);
    assert!(v1.is_empty() && v2.is_empty());
    assert!(ledger.is_unused());
    drop((v1, v2));
    ledger.close();
}

#[test]
fn values_live_in_the_resource() {
    let ledger = AllocationLedger::default();
    {
        let v = populated(PolymorphicAllocator::from(&ledger));
        assert_populated(&v);
        assert_eq!(ledger.live_allocations(), 2);
    }
    assert!(ledger.has_no_leak());
    ledger.close();
}

#[test]
fn copy_of_empty() {
    let first = AllocationLedger::default();
    let second = AllocationLedger::default();
    let alloc = PolymorphicAllocator::from(&first);
    let alloc2 = PolymorphicAllocator::from(&second);
    {
        let v = PmrVec::<i32>::new_in(alloc);
        let initial = first.live_allocations();

        let copied = v.clone();
        assert!(copied.is_empty());
        assert_ne!(*copied.allocator(), *v.allocator());
        assert_eq!(first.live_allocations(), initial);

        let same = v.clone_in(alloc);
        assert!(same.is_empty());
        assert_eq!(*same.allocator(), alloc);
        assert_eq!(first.live_allocations(), initial);

        let other = v.clone_in(alloc2);
        assert!(other.is_empty());
        assert_eq!(*other.allocator(), alloc2);
        assert!(second.is_unused());
    }
    first.close();
    second.close();
}

#[test]
fn copy_of_populated() {
    let first = AllocationLedger::default();
    let second = AllocationLedger::default();
    let alloc2 = PolymorphicAllocator::from(&second);
    {
        let v = populated(PolymorphicAllocator::from(&first));
        let initial = first.live_allocations();

        let copied = v.clone();
        assert_populated(&copied);
        assert_eq!(copied, v);
        assert_ne!(*copied.allocator(), *v.allocator());
        assert_eq!(first.live_allocations(), initial);

        let other = v.clone_in(alloc2);
        assert_populated(&other);
        assert_eq!(*other.allocator(), alloc2);
        assert_eq!(second.live_allocations(), 2);
        assert_eq!(first.live_allocations(), initial);
    }
    first.close();
    second.close();
}

#[test]
fn move_of_empty() {
    let first = AllocationLedger::default();
    let second = AllocationLedger::default();
    let alloc = PolymorphicAllocator::from(&first);
    let alloc2 = PolymorphicAllocator::from(&second);
    {
        let v = PmrVec::<i32>::new_in(alloc);
        let moved = v;
        assert!(moved.is_empty());
        assert_eq!(*moved.allocator(), alloc);

        let same = moved.move_in(alloc);
        assert_eq!(*same.allocator(), alloc);

        let other = same.move_in(alloc2);
        assert!(other.is_empty());
        assert_eq!(*other.allocator(), alloc2);
        assert!(second.is_unused());
    }
    assert!(first.is_unused());
    first.close();
    second.close();
}

#[test]
fn move_of_populated() {
    let mut buf = [MaybeUninit::<u8>::uninit(); 10 * 1024];
    let upstream = MonotonicBufferResource::new(&mut buf);
    let first = AllocationLedger::new(&upstream);
    let second = AllocationLedger::new(&upstream);
    let alloc = PolymorphicAllocator::from(&first);
    let alloc2 = PolymorphicAllocator::from(&second);
    {
        let v = populated(alloc);
        let initial = first.live_allocations();
        let freed = first.deallocations();

        // equal allocator: the memory is kept
        let kept = v.move_in(alloc);
        assert_populated(&kept);
        assert_eq!(*kept.allocator(), alloc);
        assert_eq!(first.live_allocations(), initial);
        assert_eq!(first.deallocations(), freed);

        // different allocator: the values move, the old memory is freed
        let other = kept.move_in(alloc2);
        assert_populated(&other);
        assert_eq!(*other.allocator(), alloc2);
        assert_eq!(second.live_allocations(), 2);
        assert_eq!(first.live_allocations(), 0);
    }
    first.close();
    second.close();
}

#[test]
fn copy_assignment_keeps_allocator() {
    let first = AllocationLedger::default();
    let second = AllocationLedger::default();
    let alloc = PolymorphicAllocator::from(&first);
    let alloc2 = PolymorphicAllocator::from(&second);
    {
        let source = populated(alloc2);
        let mut target = PmrVec::<i32>::new_in(alloc);
        assert!(target.is_empty());

        target.clone_from(&source);
        assert_eq!(target, source);
        assert_eq!(*target.allocator(), alloc);

        let mut empty = PmrVec::<i32>::new_in(alloc2);
        empty.clone_from(&PmrVec::new_in(alloc));
        target.clone_from(&empty);
        assert!(target.is_empty());
        assert_eq!(*target.allocator(), alloc);
        assert_eq!(*empty.allocator(), alloc2);
    }
    first.close();
    second.close();
}

#[test]
fn move_assignment_keeps_allocator() {
    let first = AllocationLedger::default();
    let second = AllocationLedger::default();
    let alloc = PolymorphicAllocator::from(&first);
    let alloc2 = PolymorphicAllocator::from(&second);
    {
        let mut target = PmrVec::<i32>::new_in(alloc);
        let mut source = PmrVec::new_in(alloc);
        source.insert(1, 4).unwrap();
        source.insert(8, 10).unwrap();

        target.take_from(&mut source);
        assert_eq!(target.len(), 2);
        assert_eq!((target[1], target[8]), (4, 10));
        assert_eq!(*target.allocator(), alloc);
        assert!(source.is_empty());

        let mut foreign = PmrVec::new_in(alloc2);
        foreign.insert(1, 4).unwrap();
        foreign.insert(8, 10).unwrap();
        target.take_from(&mut foreign);
        assert_eq!(target.len(), 2);
        assert_eq!((target[1], target[8]), (4, 10));
        assert_eq!(*target.allocator(), alloc);
        assert!(foreign.is_empty());
        assert_eq!(*foreign.allocator(), alloc2);
        assert!(second.has_no_leak());
    }
    first.close();
    second.close();
}

#[test]
fn equality_ignores_allocators() {
    let ledger = AllocationLedger::default();
    {
        let pmr = populated(PolymorphicAllocator::from(&ledger));
        let global: SparseVec<i32> = [(8, 3), (0, 1), (5, 14)].into_iter().collect();
        assert_eq!(pmr, global);
        assert_eq!(global, pmr);
        assert!(pmr <= global);
    }
    ledger.close();
}

#[test]
fn global_clone_is_equal_allocator() {
    let v = sparsevec::sparse_vec![3usize => "three"];
    let copied = v.clone();
    assert!(copied.allocator().is_equal(v.allocator()));
    assert_eq!(copied, v);
}

#[test]
fn index_reservation_stops_at_the_reserved_index() {
    let ledger = AllocationLedger::default();
    {
        let mut v = SparseVec::<i32, u8, _>::new_in(PolymorphicAllocator::from(&ledger));
        v.reserve_index(10_000);
        assert_eq!(ledger.live_allocations(), 1);
        // one slot per storable index, 0 through 254
        assert!(ledger.live_bytes() <= 2 * usize::from(u8::MAX));
        v.insert(254, 7).unwrap();
        assert_eq!(v.index_len(), 255);
        assert_eq!(v[254], 7);
    }
    ledger.close();
}
