/// Declares a newtype index wrapping another [`SparseIndex`],
/// sharing its size type and its invalid values.
///
/// The generated struct derives [`Copy`], [`Clone`], [`PartialEq`], [`Eq`],
/// [`PartialOrd`], [`Ord`], [`Hash`] and [`Debug`].
/// Extra attributes (including more derives) are passed through.
///
/// ## Examples
/// ```
/// sparse_index::define_newtype_index! {
///     /// Identifies an entity in a scene.
///     pub struct EntityId(u16);
/// }
/// use sparse_index::SparseIndex;
/// assert_eq!(EntityId(7).to_size(), 7u16);
/// assert_eq!(EntityId::from_size(3), EntityId(3));
/// ```
///
/// [`SparseIndex`]: crate::SparseIndex
/// [`Hash`]: core::hash::Hash
/// [`Debug`]: core::fmt::Debug
#[macro_export]
macro_rules! define_newtype_index {
    (
        $(#[$attr:meta])*
        $vis:vis struct $name:ident($(#[$field_attr:meta])* $field_vis:vis $wrapped:ty);
    ) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
        #[repr(transparent)]
        $vis struct $name($(#[$field_attr])* $field_vis $wrapped);

        impl $crate::SparseIndex for $name {
            type Size = <$wrapped as $crate::SparseIndex>::Size;

            #[inline]
            #[track_caller]
            fn from_size(size: Self::Size) -> Self {
                $name($crate::SparseIndex::from_size(size))
            }

            #[inline]
            fn from_size_checked(size: Self::Size) -> Option<Self> {
                <$wrapped as $crate::SparseIndex>::from_size_checked(size).map($name)
            }

            #[inline]
            unsafe fn from_size_unchecked(size: Self::Size) -> Self {
                // SAFETY: The wrapped index has the same invalid sizes
                let inner = unsafe { <$wrapped as $crate::SparseIndex>::from_size_unchecked(size) };
                $name(inner)
            }

            #[inline]
            fn to_size(self) -> Self::Size {
                $crate::SparseIndex::to_size(self.0)
            }
        }
    };
}
