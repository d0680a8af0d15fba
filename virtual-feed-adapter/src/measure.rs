use alloc::sync::Arc;
use alloc::vec::Vec;

use virtual_feed::HeightSource;

use crate::key::{KeySizeMap, SizeCacheKey};

/// Measured item sizes, addressed by item key so they survive inserts at the front.
///
/// The cache never patches a position table. [`Self::snapshot`] produces a new height source
/// (a new identity), and the renderer rebuilds its table from it.
#[derive(Clone, Debug)]
pub struct MeasuredHeights<K> {
    sizes: KeySizeMap<K>,
}

impl<K: SizeCacheKey> Default for MeasuredHeights<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SizeCacheKey> MeasuredHeights<K> {
    pub fn new() -> Self {
        Self {
            sizes: KeySizeMap::<K>::new(),
        }
    }

    /// Records a measurement. Returns `true` if it differs from the cached value.
    pub fn record(&mut self, key: K, size: u32) -> bool {
        let prev = self.sizes.insert(key, size);
        prev != Some(size)
    }

    pub fn get(&self, key: &K) -> Option<u32> {
        self.sizes.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
    }

    /// Freezes the sizes of `keys` (in index order): measured where known, `fallback(index)`
    /// otherwise.
    pub fn snapshot(&self, keys: &[K], mut fallback: impl FnMut(usize) -> u32) -> HeightSource {
        let sizes: Vec<u32> = keys
            .iter()
            .enumerate()
            .map(|(i, key)| self.get(key).unwrap_or_else(|| fallback(i)))
            .collect();
        let sizes: Arc<[u32]> = sizes.into();
        HeightSource::Estimator(Arc::new(move |i: usize| {
            sizes
                .get(i)
                .copied()
                .unwrap_or(virtual_feed::DEFAULT_ITEM_HEIGHT)
        }))
    }
}
