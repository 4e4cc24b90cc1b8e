/// Operations on size types which are not part of the public API.
pub trait Sealed: Sized {
    /// The value containers reserve, always the maximum.
    const RESERVED: Self;
    /// The primitive's name, used in panic messages.
    const NAME: &'static str;
    fn widen(self) -> Option<usize>;
    fn narrow(val: usize) -> Option<Self>;
    fn truncate(val: usize) -> Self;
}

macro_rules! impl_size_type {
    ($($int:ident),+ $(,)?) => {$(
        impl super::UnsignedPrimInt for $int {}
        impl Sealed for $int {
            const RESERVED: $int = $int::MAX;
            const NAME: &'static str = stringify!($int);
            #[inline]
            fn widen(self) -> Option<usize> {
                usize::try_from(self).ok()
            }
            #[inline]
            fn narrow(val: usize) -> Option<$int> {
                $int::try_from(val).ok()
            }
            #[inline]
            #[allow(clippy::cast_possible_truncation)] // truncation is the point
            fn truncate(val: usize) -> $int {
                val as $int
            }
        }
    )+};
}
impl_size_type!(u8, u16, u32, u64, u128, usize);
