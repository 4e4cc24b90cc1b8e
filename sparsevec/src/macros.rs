/// Creates a [`SparseVec`](crate::SparseVec) from a set of index-value pairs,
/// using the global heap.
///
/// Panics if an index appears twice, or is the reserved maximum.
///
/// ## Examples
/// ```
/// let v = sparsevec::sparse_vec![0u8 => 1, 5 => 14, 8 => 3];
/// assert_eq!(v.len(), 3);
/// assert_eq!(v[5], 14);
/// ```
#[macro_export]
macro_rules! sparse_vec {
    () => ($crate::SparseVec::new());
    ($($index:expr => $value:expr),+ $(,)?) => ({
        let mut res = $crate::SparseVec::new();
        $(if let Err(err) = res.insert($index, $value) {
            err.panic()
        })*
        res
    });
}
