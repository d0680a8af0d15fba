/// Identity of an item when the caller supplies no key mapping.
pub type ItemKey = u64;

/// Offset and size of one item in the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Placement {
    pub index: usize,
    /// Start offset from the top of the list.
    pub offset: u64,
    /// Size in the scroll axis (excludes `gap`).
    pub size: u32,
}

impl Placement {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size as u64)
    }
}

/// An inclusive index range `[start, end]`.
///
/// Unlike most Rust ranges the end is inclusive: a non-empty sequence always has at least
/// one rendered index, and an empty sequence has no range at all (`Option::None`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowRange {
    pub start: usize,
    pub end: usize,
}

impl WindowRange {
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start).saturating_add(1)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    pub fn indexes(&self) -> core::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// A render-ready item: placement plus the caller's key and the spacing that follows it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedItem<K> {
    pub key: K,
    pub index: usize,
    pub offset: u64,
    pub size: u32,
    /// Spacer rendered after the item; `0` after the last item.
    pub trailing_gap: u32,
}

impl<K> PlacedItem<K> {
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.size as u64)
    }
}

/// One rendered item together with the output of the caller's item renderer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rendered<K, V> {
    pub item: PlacedItem<K>,
    pub view: V,
}

/// Which edge of the render window a boundary marker tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    Top,
    Bottom,
}

/// The anchors the engine asks a host to observe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Marker {
    Top,
    Bottom,
    LoadMore,
}

impl From<Edge> for Marker {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Top => Self::Top,
            Edge::Bottom => Self::Bottom,
        }
    }
}

/// The scrolling area visibility is measured against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollRoot {
    /// The list's own fixed-height scroll container.
    #[default]
    Container,
    /// The page-level scrolling area ("seamless" mode).
    Document,
}

impl ScrollRoot {
    pub fn from_seamless(seamless: bool) -> Self {
        if seamless {
            Self::Document
        } else {
            Self::Container
        }
    }
}

/// Extra space added around the root before intersections are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootMargin {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl RootMargin {
    pub const fn uniform(v: u32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub const fn top(v: u32) -> Self {
        Self {
            top: v,
            right: 0,
            bottom: 0,
            left: 0,
        }
    }

    pub const fn bottom(v: u32) -> Self {
        Self {
            top: 0,
            right: 0,
            bottom: v,
            left: 0,
        }
    }
}

/// Where the markers currently sit, in list coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerLayout {
    pub top: u64,
    pub bottom: u64,
    /// `None` when no load-more callback is configured.
    pub load_more: Option<u64>,
}

impl MarkerLayout {
    pub fn position(&self, marker: Marker) -> Option<u64> {
        match marker {
            Marker::Top => Some(self.top),
            Marker::Bottom => Some(self.bottom),
            Marker::LoadMore => self.load_more,
        }
    }
}

/// Layout of the outer scroll container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContainerLayout {
    pub root: ScrollRoot,
    /// Height of the full-extent spacer that keeps native scrollbar proportions.
    pub spacer_extent: u64,
}

/// Everything a host needs to draw one frame, apart from the items themselves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrameLayout {
    pub container: ContainerLayout,
    pub markers: MarkerLayout,
    /// The materialized range; `None` for an empty sequence.
    pub range: Option<WindowRange>,
}

/// Per-mount lifecycle of a [`crate::WindowedRenderer`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Lifecycle {
    #[default]
    Initializing,
    Active,
    Unmounted,
}
