//! Enables serde serialization support for [`SparseVec`].
//!
//! A container is represented as a map from index to value, in index order.
use core::fmt::{self, Formatter};
use core::marker::PhantomData;

use memres::Allocator;
use serde::de::{Deserialize, Deserializer, Error as _, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use sparse_index::SparseIndex;

use crate::SparseVec;

struct SparseVecVisitor<T, I: SparseIndex, A: Allocator>(PhantomData<SparseVec<T, I, A>>);

impl<'de, T, I, A> Visitor<'de> for SparseVecVisitor<T, I, A>
where
    T: Deserialize<'de>,
    I: SparseIndex + Deserialize<'de>,
    A: Allocator + Default,
{
    type Value = SparseVec<T, I, A>;
    #[inline]
    fn expecting(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str("a SparseVec")
    }
    #[inline]
    fn visit_map<M>(self, mut access: M) -> Result<Self::Value, M::Error>
    where
        M: MapAccess<'de>,
    {
        let mut result = SparseVec::default();
        // never trust a size hint with a large allocation
        result.reserve_data(core::cmp::min(access.size_hint().unwrap_or(0), 1024));
        while let Some((index, value)) = access.next_entry()? {
            result.insert(index, value).map_err(M::Error::custom)?;
        }
        Ok(result)
    }
}
impl<'de, T, I, A> Deserialize<'de> for SparseVec<T, I, A>
where
    T: Deserialize<'de>,
    I: SparseIndex + Deserialize<'de>,
    A: Allocator + Default,
{
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SparseVecVisitor(PhantomData))
    }
}
impl<T, I, A> Serialize for SparseVec<T, I, A>
where
    T: Serialize,
    I: SparseIndex + Serialize,
    A: Allocator,
{
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (index, value) in self.entries() {
            map.serialize_entry(&index, value)?;
        }
        map.end()
    }
}
