use core::fmt::{self, Display, Formatter};
use core::ptr::NonNull;

/// Indicates that a deallocation did not match any live allocation of an
/// [`AllocationLedger`](crate::AllocationLedger).
///
/// Nothing is freed and no record changes when this error occurs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeallocError {
    /// The address is live, but was allocated with a different size or alignment.
    Mismatched {
        /// The address being freed.
        address: NonNull<u8>,
        /// The size given to the deallocation.
        requested_size: usize,
        /// The alignment given to the deallocation.
        requested_align: usize,
        /// The size the address was allocated with.
        recorded_size: usize,
        /// The alignment the address was allocated with.
        recorded_align: usize,
    },
    /// The address was already freed.
    DoubleFree {
        /// The address being freed.
        address: NonNull<u8>,
    },
    /// The address was never allocated by this ledger.
    ForeignPointer {
        /// The address being freed.
        address: NonNull<u8>,
    },
}
impl DeallocError {
    /// The address that failed to deallocate.
    #[inline]
    pub fn address(&self) -> NonNull<u8> {
        match *self {
            DeallocError::Mismatched { address, .. }
            | DeallocError::DoubleFree { address }
            | DeallocError::ForeignPointer { address } => address,
        }
    }

    /// Trigger a descriptive panic due to this error.
    ///
    /// This gives a better panic message than calling [`Result::unwrap`].
    ///
    /// # Panics
    /// Always.
    #[track_caller]
    #[cold]
    pub fn panic(self) -> ! {
        panic!("{self}")
    }
}
impl Display for DeallocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            DeallocError::Mismatched {
                address,
                requested_size,
                requested_align,
                recorded_size,
                recorded_align,
            } => write!(
                f,
                "Mismatched deallocation of {requested_size} bytes with alignment {requested_align} at address {address:p}: \
                existing allocation was of {recorded_size} bytes with alignment {recorded_align}"
            ),
            DeallocError::DoubleFree { address } => write!(f, "Double free of address {address:p}"),
            DeallocError::ForeignPointer { address } => write!(
                f,
                "Deallocation of address {address:p}, which was not allocated by this resource"
            ),
        }
    }
}

#[rustversion::since(1.81)]
impl core::error::Error for DeallocError {}

#[rustversion::before(1.81)]
#[cfg(feature = "std")]
impl std::error::Error for DeallocError {}
