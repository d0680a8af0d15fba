use alloc::sync::Arc;

use crate::renderer::WindowedRenderer;
use crate::{DEFAULT_INITIAL_WINDOW_END, ItemKey, ScrollRoot, WindowPolicy};

/// Item height used when neither a fixed height nor an estimator is configured.
pub const DEFAULT_ITEM_HEIGHT: u32 = 180;
pub const DEFAULT_OVERSCAN: usize = 3;
pub const DEFAULT_GAP: u32 = 16;

/// Maps an index to its size in the scroll axis.
///
/// Must be pure for the lifetime of a given item sequence: offsets downstream depend on it.
pub type EstimateHeight = Arc<dyn Fn(usize) -> u32 + Send + Sync>;

/// The caller's "fetch next page" trigger. Fire-and-forget: the engine never awaits it.
pub type OnLoadMore = Arc<dyn Fn() + Send + Sync>;

/// A callback fired after the renderer committed a change (window or table).
pub type OnChangeCallback<K> = Arc<dyn Fn(&WindowedRenderer<K>) + Send + Sync>;

/// Where item sizes come from.
#[derive(Clone)]
pub enum HeightSource {
    Fixed(u32),
    Estimator(EstimateHeight),
}

impl HeightSource {
    pub fn estimator(f: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self::Estimator(Arc::new(f))
    }

    pub fn size_of(&self, index: usize) -> u32 {
        match self {
            Self::Fixed(size) => *size,
            Self::Estimator(f) => f(index),
        }
    }

    /// Identity comparison: equal constants, or the very same estimator allocation.
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) => a == b,
            (Self::Estimator(a), Self::Estimator(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl core::fmt::Debug for HeightSource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            Self::Estimator(_) => f.write_str("Estimator(..)"),
        }
    }
}

/// Configuration for [`crate::WindowedRenderer`].
///
/// Cheap to clone: closures live in `Arc`s, so hosts can tweak a field and call
/// `WindowedRenderer::set_options` without reallocating them.
pub struct ScrollerOptions<K = ItemKey> {
    /// Length of the caller's item sequence.
    pub count: usize,
    /// Constant size for every item. Takes precedence over `get_item_height`; `Some(0)` counts
    /// as unset.
    pub item_height: Option<u32>,
    pub get_item_height: Option<EstimateHeight>,
    pub get_item_key: Arc<dyn Fn(usize) -> K + Send + Sync>,

    /// Items added per visibility signal, also used as render padding around the window.
    pub overscan: usize,

    pub on_load_more: Option<OnLoadMore>,

    /// Share the page's scroll area instead of owning a scroll container.
    pub seamless: bool,

    /// Space between items.
    pub gap: u32,

    /// Last index of the window at mount time (clamped to the sequence).
    pub initial_window_end: usize,

    pub window_policy: WindowPolicy,

    pub on_change: Option<OnChangeCallback<K>>,
}

impl<K> Clone for ScrollerOptions<K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            item_height: self.item_height,
            get_item_height: self.get_item_height.clone(),
            get_item_key: Arc::clone(&self.get_item_key),
            overscan: self.overscan,
            on_load_more: self.on_load_more.clone(),
            seamless: self.seamless,
            gap: self.gap,
            initial_window_end: self.initial_window_end,
            window_policy: self.window_policy,
            on_change: self.on_change.clone(),
        }
    }
}

impl ScrollerOptions<ItemKey> {
    /// Creates options for a list keyed by index (`ItemKey = u64`) with default heights.
    pub fn new(count: usize) -> Self {
        Self::new_with_key(count, |i| i as u64)
    }
}

impl<K> ScrollerOptions<K> {
    /// Creates options with a custom key mapping.
    ///
    /// `get_item_key(i)` should return a stable identity for the item at index `i`; hosts use
    /// it to reconcile rendered output across passes.
    pub fn new_with_key(
        count: usize,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            item_height: None,
            get_item_height: None,
            get_item_key: Arc::new(get_item_key),
            overscan: DEFAULT_OVERSCAN,
            on_load_more: None,
            seamless: false,
            gap: DEFAULT_GAP,
            initial_window_end: DEFAULT_INITIAL_WINDOW_END,
            window_policy: WindowPolicy::GrowOnly,
            on_change: None,
        }
    }

    pub fn with_item_height(mut self, item_height: u32) -> Self {
        self.item_height = Some(item_height);
        self
    }

    pub fn with_get_item_height(
        mut self,
        get_item_height: impl Fn(usize) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.get_item_height = Some(Arc::new(get_item_height));
        self
    }

    /// Installs a height source, replacing both `item_height` and `get_item_height`.
    pub fn with_height_source(mut self, source: HeightSource) -> Self {
        match source {
            HeightSource::Fixed(size) => {
                self.item_height = Some(size);
                self.get_item_height = None;
            }
            HeightSource::Estimator(f) => {
                self.item_height = None;
                self.get_item_height = Some(f);
            }
        }
        self
    }

    pub fn with_get_item_key(
        mut self,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        self.get_item_key = Arc::new(get_item_key);
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_on_load_more(
        mut self,
        on_load_more: Option<impl Fn() + Send + Sync + 'static>,
    ) -> Self {
        self.on_load_more = on_load_more.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_seamless(mut self, seamless: bool) -> Self {
        self.seamless = seamless;
        self
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_initial_window_end(mut self, initial_window_end: usize) -> Self {
        self.initial_window_end = initial_window_end;
        self
    }

    pub fn with_window_policy(mut self, window_policy: WindowPolicy) -> Self {
        self.window_policy = window_policy;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&WindowedRenderer<K>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    /// Resolves the effective height source.
    ///
    /// Misconfiguration never fails: with no usable input every item gets
    /// [`DEFAULT_ITEM_HEIGHT`].
    pub fn height_source(&self) -> HeightSource {
        match (self.item_height.filter(|&h| h > 0), &self.get_item_height) {
            (Some(size), _) => HeightSource::Fixed(size),
            (None, Some(f)) => HeightSource::Estimator(Arc::clone(f)),
            (None, None) => HeightSource::Fixed(DEFAULT_ITEM_HEIGHT),
        }
    }

    pub fn root(&self) -> ScrollRoot {
        ScrollRoot::from_seamless(self.seamless)
    }

    pub(crate) fn warn_misconfiguration(&self) {
        match (self.item_height, self.get_item_height.is_some()) {
            (Some(h), true) if h > 0 => {
                vwarn!(
                    item_height = h,
                    "both item_height and get_item_height set; the fixed height wins"
                );
            }
            (Some(0), false) | (None, false) => {
                vdebug!(
                    default = DEFAULT_ITEM_HEIGHT,
                    "no item height configured; using the default"
                );
            }
            _ => {}
        }
    }
}

impl<K> core::fmt::Debug for ScrollerOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollerOptions")
            .field("count", &self.count)
            .field("item_height", &self.item_height)
            .field("has_get_item_height", &self.get_item_height.is_some())
            .field("overscan", &self.overscan)
            .field("has_on_load_more", &self.on_load_more.is_some())
            .field("seamless", &self.seamless)
            .field("gap", &self.gap)
            .field("initial_window_end", &self.initial_window_end)
            .field("window_policy", &self.window_policy)
            .finish_non_exhaustive()
    }
}
