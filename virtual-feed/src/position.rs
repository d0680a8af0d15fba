use alloc::vec::Vec;

use crate::{HeightSource, Placement, WindowRange};

/// Offsets and sizes of every item in a sequence.
///
/// `offset[0] = 0`, `offset[i + 1] = offset[i] + size[i] + gap`, and the total extent stops at
/// the end of the last item (no trailing gap).
///
/// The table is always rebuilt as a whole: a size change at index `i` shifts every later
/// offset, so there is no sound partial update.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionTable {
    offsets: Vec<u64>,
    sizes: Vec<u32>,
    gap: u32,
    total: u64,
}

impl PositionTable {
    pub fn build(count: usize, height: &HeightSource, gap: u32) -> Self {
        let mut offsets = Vec::with_capacity(count);
        let mut sizes = Vec::with_capacity(count);
        let gap64 = gap as u64;
        let mut offset = 0u64;
        for i in 0..count {
            let size = height.size_of(i);
            offsets.push(offset);
            sizes.push(size);
            offset = offset.saturating_add(size as u64);
            if i + 1 < count {
                offset = offset.saturating_add(gap64);
            }
        }
        vtrace!(count, gap, total = offset, "PositionTable::build");
        Self {
            offsets,
            sizes,
            gap,
            total: offset,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.len().checked_sub(1)
    }

    pub fn gap(&self) -> u32 {
        self.gap
    }

    pub fn total_extent(&self) -> u64 {
        self.total
    }

    pub fn offset(&self, index: usize) -> Option<u64> {
        self.offsets.get(index).copied()
    }

    pub fn size(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    pub fn placement(&self, index: usize) -> Option<Placement> {
        Some(Placement {
            index,
            offset: self.offset(index)?,
            size: self.size(index)?,
        })
    }

    /// The gap rendered after `index`; zero after the last item.
    pub fn trailing_gap(&self, index: usize) -> u32 {
        if index + 1 < self.len() { self.gap } else { 0 }
    }

    /// Maps an offset to the item covering it. Offsets inside a gap map to the preceding item;
    /// offsets past the end clamp to the last item.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let last = self.last_index()?;
        let after = self.offsets.partition_point(|&start| start <= offset);
        Some(after.saturating_sub(1).min(last))
    }

    /// Iterates over the placements of `range`, clamped to the table.
    pub fn placements(&self, range: WindowRange) -> impl Iterator<Item = Placement> + '_ {
        self.last_index()
            .map(|last| range.start..=range.end.min(last))
            .into_iter()
            .flatten()
            .filter_map(|i| self.placement(i))
    }
}
