#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

#[cfg(feature = "std")]
pub(crate) type KeySizeMap<K> = HashMap<K, u32>;
#[cfg(not(feature = "std"))]
pub(crate) type KeySizeMap<K> = BTreeMap<K, u32>;

#[cfg(feature = "std")]
pub trait SizeCacheKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<T: core::hash::Hash + Eq> SizeCacheKey for T {}

#[cfg(not(feature = "std"))]
pub trait SizeCacheKey: Ord {}
#[cfg(not(feature = "std"))]
impl<T: Ord> SizeCacheKey for T {}
