use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use virtual_feed::{
    FrameLayout, HeightSource, ItemKey, Lifecycle, Rendered, ScrollRoot, ScrollerOptions,
    VisibilityEntry, VisibilityOutcome, WindowRange, WindowedRenderer,
};

use crate::{MeasuredHeights, ScrollProbe};

pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Upper bound on evaluate → grow → re-place rounds per host event.
const MAX_SETTLE_ROUNDS: usize = 64;

/// The caller's paginated data source.
///
/// Requests are fire-and-forget: the source answers later through
/// [`FeedController::complete_page`].
pub trait PageSource<T> {
    fn request_page(&mut self, after_index: usize, page_size: usize);
}

/// Extracts a value from an item (its key, or its estimated height).
pub type ItemFn<T, R> = Arc<dyn Fn(&T) -> R + Send + Sync>;

/// A framework-neutral controller for an infinite feed.
///
/// It owns the item sequence and wires a [`WindowedRenderer`] to a [`ScrollProbe`] and a
/// [`PageSource`]. The renderer's load-more callback only raises a flag; the controller owns
/// the in-flight / has-more bookkeeping and decides whether a page request actually starts.
///
/// Adapters drive it by calling:
/// - `on_scroll` / `on_viewport_size` when UI events occur
/// - `tick(now_ms)` each frame/timer tick (to flush throttled scroll evaluations)
/// - `complete_page` when the source answers
pub struct FeedController<T, S> {
    items: Vec<T>,
    renderer: WindowedRenderer,
    probe: ScrollProbe,
    source: S,
    base_height: HeightSource,
    estimate: Option<ItemFn<T, u32>>,
    key_of: Option<ItemFn<T, ItemKey>>,
    measured: MeasuredHeights<ItemKey>,
    load_more_fired: Arc<AtomicBool>,
    in_flight: bool,
    /// Size of the last page request; a smaller answer ends the feed.
    requested: usize,
    has_more: bool,
    page_size: usize,
    total_limit: Option<usize>,
}

impl<T, S: PageSource<T>> FeedController<T, S> {
    /// Creates a controller with an empty feed. `options.count` and `options.on_load_more` are
    /// managed by the controller and overwritten.
    pub fn new(options: ScrollerOptions, probe: ScrollProbe, source: S) -> Self {
        let load_more_fired = Arc::new(AtomicBool::new(false));
        let base_height = options.height_source();
        let flag = Arc::clone(&load_more_fired);
        let mut options = options.with_on_load_more(Some(move || {
            flag.store(true, Ordering::SeqCst);
        }));
        options.count = 0;
        Self {
            items: Vec::new(),
            renderer: WindowedRenderer::new(options),
            probe,
            source,
            base_height,
            estimate: None,
            key_of: None,
            measured: MeasuredHeights::new(),
            load_more_fired,
            in_flight: false,
            requested: 0,
            has_more: true,
            page_size: DEFAULT_PAGE_SIZE,
            total_limit: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Stops requesting pages once the feed holds `total_limit` items.
    pub fn with_total_limit(mut self, total_limit: usize) -> Self {
        self.total_limit = Some(total_limit);
        self
    }

    /// Estimates each item's height from its content. Without it, the height configured in the
    /// options is used.
    pub fn with_estimator(mut self, estimate: impl Fn(&T) -> u32 + Send + Sync + 'static) -> Self {
        self.estimate = Some(Arc::new(estimate));
        self
    }

    /// Stable identity per item. Without it, items are keyed by index.
    pub fn with_key(mut self, key_of: impl Fn(&T) -> ItemKey + Send + Sync + 'static) -> Self {
        self.key_of = Some(Arc::new(key_of));
        self
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn renderer(&self) -> &WindowedRenderer {
        &self.renderer
    }

    pub fn probe(&self) -> &ScrollProbe {
        &self.probe
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn layout(&self) -> FrameLayout {
        self.renderer.layout()
    }

    /// Indexes currently inside the viewport (without margins), from the probe's scroll
    /// position. `None` for an empty feed or a viewport entirely outside the list.
    pub fn visible_range(&self) -> Option<WindowRange> {
        let table = self.renderer.table();
        let list_offset = match self.renderer.options().root() {
            ScrollRoot::Container => 0,
            ScrollRoot::Document => self.probe.list_offset(),
        };
        let top = self.probe.scroll_offset();
        let bottom = top.saturating_add(self.probe.viewport_size() as u64);
        if bottom <= list_offset || bottom == top {
            return None;
        }
        let start = top.saturating_sub(list_offset);
        if start >= table.total_extent() {
            return None;
        }
        Some(WindowRange {
            start: table.index_at_offset(start)?,
            end: table.index_at_offset(bottom - list_offset - 1)?,
        })
    }

    pub fn key_at(&self, index: usize) -> ItemKey {
        self.items
            .get(index)
            .and_then(|item| self.key_of.as_ref().map(|f| f(item)))
            .unwrap_or(index as ItemKey)
    }

    /// Mounts the renderer on the probe and processes the initial visibility state. With an
    /// empty feed this requests the first page.
    ///
    /// Returns `true` if the host should re-render.
    pub fn mount(&mut self) -> bool {
        self.renderer.mount(&mut self.probe);
        let entries = self.probe.evaluate();
        self.settle(entries)
    }

    /// Releases every observation. The controller ignores later events.
    pub fn unmount(&mut self) {
        self.renderer.unmount(&mut self.probe);
    }

    /// Call this when the UI reports a scroll offset change.
    ///
    /// Returns `true` if the host should re-render.
    pub fn on_scroll(&mut self, scroll_offset: u64, now_ms: u64) -> bool {
        let entries = self.probe.on_scroll(scroll_offset, now_ms);
        self.settle(entries)
    }

    pub fn on_viewport_size(&mut self, viewport_size: u32) -> bool {
        self.probe.set_viewport_size(viewport_size);
        let entries = self.probe.evaluate();
        self.settle(entries)
    }

    /// Flushes throttled scroll evaluations.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let entries = self.probe.flush(now_ms);
        self.settle(entries)
    }

    /// Delivers the answer to the last page request.
    ///
    /// A failure only clears the in-flight state; the next approach of the load-more marker
    /// (or [`Self::retry`]) asks again.
    ///
    /// Returns `true` if the host should re-render.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn complete_page<E: fmt::Display>(&mut self, result: Result<Vec<T>, E>) -> bool {
        self.in_flight = false;
        let page = match result {
            Ok(page) => page,
            Err(error) => {
                vwarn!(%error, "page request failed");
                return false;
            }
        };

        let received = page.len();
        let room = self
            .total_limit
            .map_or(usize::MAX, |limit| limit.saturating_sub(self.items.len()));
        self.items.extend(page.into_iter().take(room));
        if received < self.requested || self.limit_reached() {
            self.has_more = false;
        }
        vdebug!(
            received,
            total = self.items.len(),
            has_more = self.has_more,
            "page landed"
        );
        if received == 0 {
            return false;
        }
        self.sync_renderer()
    }

    /// Requests the next page now if nothing is in flight and more data exists.
    pub fn retry(&mut self) -> bool {
        self.request_next_page()
    }

    /// Inserts a new item at the front of the feed (e.g. a freshly published post).
    ///
    /// Without [`Self::with_key`] items are keyed by index, so every index shifts and the
    /// recorded measurements are dropped.
    pub fn prepend(&mut self, item: T) -> bool {
        self.items.insert(0, item);
        if self.key_of.is_none() && !self.measured.is_empty() {
            vdebug!(
                dropped = self.measured.len(),
                "prepend shifted index keys; clearing measurements"
            );
            self.measured.clear();
        }
        self.sync_renderer()
    }

    /// Records the measured size of a rendered item. The table is rebuilt if it changed.
    ///
    /// Measurements are stored by item key (see [`Self::with_key`]).
    pub fn measure(&mut self, index: usize, size: u32) -> bool {
        if index >= self.items.len() {
            return false;
        }
        let key = self.key_at(index);
        if !self.measured.record(key, size) {
            return false;
        }
        self.sync_renderer()
    }

    pub fn render<V>(&self, render: impl FnMut(&T, usize) -> V) -> Vec<Rendered<ItemKey, V>> {
        self.renderer.render(&self.items, render)
    }

    fn limit_reached(&self) -> bool {
        self.total_limit
            .is_some_and(|limit| self.items.len() >= limit)
    }

    fn request_next_page(&mut self) -> bool {
        if self.renderer.lifecycle() == Lifecycle::Unmounted {
            vtrace!("load-more ignored: unmounted");
            return false;
        }
        if self.in_flight || !self.has_more || self.limit_reached() {
            vtrace!(
                in_flight = self.in_flight,
                has_more = self.has_more,
                "load-more ignored"
            );
            return false;
        }
        let len = self.items.len();
        let size = self
            .total_limit
            .map_or(self.page_size, |limit| self.page_size.min(limit - len));
        self.in_flight = true;
        self.requested = size;
        vdebug!(after_index = len, page_size = size, "requesting page");
        self.source.request_page(len, size);
        true
    }

    /// Pushes the current items (length, keys, heights) into the renderer.
    fn sync_renderer(&mut self) -> bool {
        let keys: Vec<ItemKey> = (0..self.items.len()).map(|i| self.key_at(i)).collect();
        let height = {
            let items = &self.items;
            let estimate = self.estimate.as_ref();
            let base = &self.base_height;
            self.measured.snapshot(&keys, |i| match (estimate, items.get(i)) {
                (Some(f), Some(item)) => f(item),
                _ => base.size_of(i),
            })
        };
        let keys: Arc<[ItemKey]> = keys.into();
        let count = self.items.len();
        self.renderer.update_options(&mut self.probe, |o| {
            o.count = count;
            o.item_height = None;
            o.get_item_height = match height {
                HeightSource::Estimator(f) => Some(f),
                HeightSource::Fixed(size) => Some(Arc::new(move |_: usize| size)),
            };
            o.get_item_key = Arc::new(move |i: usize| keys.get(i).copied().unwrap_or(i as ItemKey));
        });
        let entries = self.probe.evaluate();
        self.settle(entries);
        true
    }

    /// Feeds entries to the renderer until the markers stop moving, then starts a page request
    /// if the load-more marker fired.
    fn settle(&mut self, mut entries: Vec<VisibilityEntry>) -> bool {
        let mut changed = false;
        for _ in 0..MAX_SETTLE_ROUNDS {
            if entries.is_empty() {
                break;
            }
            for entry in entries.drain(..) {
                if self.renderer.handle_visibility(entry, &mut self.probe)
                    == VisibilityOutcome::WindowGrew
                {
                    changed = true;
                }
            }
            if self.probe.has_pending() {
                entries = self.probe.evaluate();
            }
        }
        if !entries.is_empty() {
            vwarn!(
                remaining = entries.len(),
                "markers did not settle; deferring to the next event"
            );
        }
        if self.load_more_fired.swap(false, Ordering::SeqCst) {
            self.request_next_page();
        }
        changed
    }
}

impl<T, S: fmt::Debug> fmt::Debug for FeedController<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedController")
            .field("items", &self.items.len())
            .field("renderer", &self.renderer)
            .field("probe", &self.probe)
            .field("source", &self.source)
            .field("in_flight", &self.in_flight)
            .field("has_more", &self.has_more)
            .field("page_size", &self.page_size)
            .field("total_limit", &self.total_limit)
            .finish_non_exhaustive()
    }
}
