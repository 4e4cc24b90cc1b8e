//! [`SparseIndex`](crate::SparseIndex) for the primitives and the integer wrappers.

/// Implements the trait for a wrapper around a size type,
/// given how to build it from a raw size (checked and unchecked) and how to unwrap it.
macro_rules! wrapper_index {
    ($(
        $index:ty => $size:ident {
            checked: |$c:ident| $checked:expr,
            unchecked: |$u:ident| $unchecked:expr,
            to_size: |$t:ident| $to_size:expr $(,)?
        }
    )+) => {$(
        impl crate::SparseIndex for $index {
            type Size = $size;
            #[inline]
            fn from_size_checked($c: $size) -> Option<Self> {
                $checked
            }
            #[inline]
            unsafe fn from_size_unchecked($u: $size) -> Self {
                $unchecked
            }
            #[inline]
            fn to_size(self) -> $size {
                let $t = self;
                $to_size
            }
        }
    )+};
}

macro_rules! primitive_index {
    ($($int:ident),+) => {
        wrapper_index! {$(
            $int => $int {
                checked: |size| Some(size),
                unchecked: |size| size,
                to_size: |this| this,
            }
        )+}
    };
}
primitive_index!(u8, u16, u32, u64, u128, usize);

// generic NonZero<T> needs Rust 1.79
macro_rules! nonzero_index {
    ($($wrapper:ident($int:ident)),+) => {
        wrapper_index! {$(
            core::num::$wrapper => $int {
                checked: |size| core::num::$wrapper::new(size),
                unchecked: |size| {
                    // SAFETY: The caller guarantees the size is non-zero
                    unsafe { core::num::$wrapper::new_unchecked(size) }
                },
                to_size: |this| this.get(),
            }
        )+}
    };
}
nonzero_index!(
    NonZeroU8(u8),
    NonZeroU16(u16),
    NonZeroU32(u32),
    NonZeroU64(u64),
    NonZeroU128(u128),
    NonZeroUsize(usize)
);

// The nonmax types can never name the reserved value,
// so containers indexed by them never reject an insertion as invalid.
#[cfg(feature = "nonmax")]
macro_rules! nonmax_index {
    ($($wrapper:ident($int:ident)),+) => {
        wrapper_index! {$(
            nonmax::$wrapper => $int {
                checked: |size| nonmax::$wrapper::new(size),
                unchecked: |size| {
                    // SAFETY: The caller guarantees the size is not the maximum
                    unsafe { nonmax::$wrapper::new_unchecked(size) }
                },
                to_size: |this| this.get(),
            }
        )+}
    };
}
#[cfg(feature = "nonmax")]
nonmax_index!(
    NonMaxU8(u8),
    NonMaxU16(u16),
    NonMaxU32(u32),
    NonMaxU64(u64),
    NonMaxU128(u128),
    NonMaxUsize(usize)
);
