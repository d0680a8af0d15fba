use alloc::vec::Vec;

use crate::load_more::LoadMoreTrigger;
use crate::position::PositionTable;
use crate::tracker::VisibilityTracker;
use crate::{
    ContainerLayout, FrameLayout, HeightSource, ItemKey, Lifecycle, Marker, MarkerLayout,
    PlacedItem, RenderWindow, Rendered, ScrollerOptions, VisibilityEntry, VisibilityHost,
    WindowRange,
};

/// What a visibility entry did to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VisibilityOutcome {
    /// Not mounted, or the entry belongs to a released observation.
    Ignored,
    /// A live entry that required no change.
    Unchanged,
    /// The render window grew; markers were repositioned. The host should re-render.
    WindowGrew,
    /// The caller's load-more callback was invoked.
    LoadRequested,
}

/// Windowed renderer for an unbounded, variable-height item sequence.
///
/// The renderer is headless:
/// - It never touches item data. Hosts pass their items to [`Self::render`] or read
///   [`PlacedItem`]s and draw them.
/// - It never scrolls. Position changes reach it only as [`VisibilityEntry`]s for the boundary
///   markers, delivered by a [`VisibilityHost`].
///
/// Lifecycle: [`Lifecycle::Initializing`] → [`Self::mount`] → [`Lifecycle::Active`] →
/// [`Self::unmount`] → [`Lifecycle::Unmounted`]. There is no way back; a reset means a new
/// renderer.
///
/// The window only grows by default ([`crate::WindowPolicy::GrowOnly`]). This trades memory in
/// long sessions for simplicity; [`crate::WindowPolicy::Sliding`] bounds it instead.
#[derive(Debug)]
pub struct WindowedRenderer<K = ItemKey> {
    options: ScrollerOptions<K>,
    height: HeightSource,
    table: PositionTable,
    window: Option<RenderWindow>,
    tracker: VisibilityTracker,
    trigger: LoadMoreTrigger,
    lifecycle: Lifecycle,
}

impl<K> WindowedRenderer<K> {
    pub fn new(options: ScrollerOptions<K>) -> Self {
        options.warn_misconfiguration();
        let height = options.height_source();
        let table = PositionTable::build(options.count, &height, options.gap);
        let window = table.last_index().map(|last| {
            RenderWindow::initial(options.initial_window_end, last, options.window_policy)
        });
        vdebug!(
            count = options.count,
            overscan = options.overscan,
            gap = options.gap,
            seamless = options.seamless,
            "WindowedRenderer::new"
        );
        Self {
            options,
            height,
            table,
            window,
            tracker: VisibilityTracker::new(),
            trigger: LoadMoreTrigger::new(),
            lifecycle: Lifecycle::Initializing,
        }
    }

    pub fn options(&self) -> &ScrollerOptions<K> {
        &self.options
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn table(&self) -> &PositionTable {
        &self.table
    }

    pub fn height_source(&self) -> &HeightSource {
        &self.height
    }

    pub fn total_extent(&self) -> u64 {
        self.table.total_extent()
    }

    pub fn key_for(&self, index: usize) -> K {
        (self.options.get_item_key)(index)
    }

    /// The render window before overscan padding; `None` for an empty sequence.
    pub fn window(&self) -> Option<WindowRange> {
        self.window.map(|w| w.range())
    }

    /// The range that is actually rendered: the window padded by `overscan`.
    pub fn rendered_range(&self) -> Option<WindowRange> {
        let last = self.table.last_index()?;
        Some(self.window?.padded(self.options.overscan, last))
    }

    /// Whether any observation is still registered with a host.
    pub fn is_observing(&self) -> bool {
        self.tracker.is_attached() || self.trigger.is_attached()
    }

    pub fn tracker(&self) -> &VisibilityTracker {
        &self.tracker
    }

    pub fn load_more_trigger(&self) -> &LoadMoreTrigger {
        &self.trigger
    }

    /// Registers the markers with `host` and places them. Moves to [`Lifecycle::Active`].
    ///
    /// Mounting an active renderer is a no-op; mounting an unmounted one is refused.
    pub fn mount(&mut self, host: &mut dyn VisibilityHost) {
        match self.lifecycle {
            Lifecycle::Active => return,
            Lifecycle::Unmounted => {
                vwarn!("mount called on an unmounted renderer; create a new one instead");
                return;
            }
            Lifecycle::Initializing => {}
        }
        self.attach_observers(host);
        self.lifecycle = Lifecycle::Active;
        host.place_markers(&self.markers());
        vdebug!(window = ?self.window(), "mounted");
        self.notify();
    }

    /// Releases every observation before returning. Later entries are ignored.
    pub fn unmount(&mut self, host: &mut dyn VisibilityHost) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }
        self.tracker.detach(host);
        self.trigger.detach(host);
        self.lifecycle = Lifecycle::Unmounted;
        vdebug!("unmounted");
    }

    /// Applies one visibility report from the host.
    ///
    /// Markers are repositioned (through [`VisibilityHost::place_markers`]) only after the
    /// window change is committed, so the next report never sees stale positions.
    pub fn handle_visibility(
        &mut self,
        entry: VisibilityEntry,
        host: &mut dyn VisibilityHost,
    ) -> VisibilityOutcome {
        if self.lifecycle != Lifecycle::Active {
            vtrace!(?entry, lifecycle = ?self.lifecycle, "dropping entry: not active");
            return VisibilityOutcome::Ignored;
        }

        if entry.marker == Marker::LoadMore {
            if self.trigger.handle() != Some(entry.handle) {
                return VisibilityOutcome::Ignored;
            }
            let Some(fetch_more) = self.options.on_load_more.clone() else {
                return VisibilityOutcome::Unchanged;
            };
            return if self.trigger.handle_entry(&entry, &fetch_more) {
                VisibilityOutcome::LoadRequested
            } else {
                VisibilityOutcome::Unchanged
            };
        }

        if self.tracker.edge_for(&entry).is_none() {
            vtrace!(?entry, "dropping entry: stale observation");
            return VisibilityOutcome::Ignored;
        }
        let (Some(last), Some(window)) = (self.table.last_index(), self.window.as_mut()) else {
            return VisibilityOutcome::Unchanged;
        };
        if !self
            .tracker
            .apply(&entry, window, self.options.overscan, last)
        {
            return VisibilityOutcome::Unchanged;
        }
        vtrace!(marker = ?entry.marker, window = ?window.range(), "window grew");
        self.commit(host);
        VisibilityOutcome::WindowGrew
    }

    /// Replaces the options and rebuilds whatever they invalidate.
    ///
    /// - count, height source identity or gap changed: the position table is rebuilt and the
    ///   window clamped (or created, if the sequence was empty).
    /// - count, overscan, seamless or the presence of `on_load_more` changed: observations are
    ///   re-registered, which also re-arms the load-more trigger.
    pub fn set_options(&mut self, options: ScrollerOptions<K>, host: &mut dyn VisibilityHost) {
        let prev_count = self.options.count;
        let prev_gap = self.options.gap;
        let prev_overscan = self.options.overscan;
        let prev_seamless = self.options.seamless;
        let prev_load_more = self.options.on_load_more.is_some();

        let next_height = options.height_source();
        let height_changed = !self.height.same_as(&next_height);
        self.options = options;
        self.options.warn_misconfiguration();
        vtrace!(
            count = self.options.count,
            overscan = self.options.overscan,
            "WindowedRenderer::set_options"
        );

        if let Some(window) = self.window.as_mut() {
            window.set_policy(self.options.window_policy);
        }

        let count_changed = self.options.count != prev_count;
        if count_changed || height_changed || self.options.gap != prev_gap {
            self.height = next_height;
            self.rebuild_table();
        }

        if self.lifecycle == Lifecycle::Active {
            if count_changed
                || self.options.overscan != prev_overscan
                || self.options.seamless != prev_seamless
                || self.options.on_load_more.is_some() != prev_load_more
            {
                self.attach_observers(host);
            }
            host.place_markers(&self.markers());
        }
        self.notify();
    }

    /// Clones the current options, applies `f`, then delegates to [`Self::set_options`].
    pub fn update_options(
        &mut self,
        host: &mut dyn VisibilityHost,
        f: impl FnOnce(&mut ScrollerOptions<K>),
    ) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next, host);
    }

    /// Call this when the caller replaced its item sequence with one of a different length.
    pub fn set_count(&mut self, count: usize, host: &mut dyn VisibilityHost) {
        if self.options.count == count {
            return;
        }
        self.update_options(host, |o| o.count = count);
    }

    pub fn set_height_source(&mut self, source: HeightSource, host: &mut dyn VisibilityHost) {
        self.update_options(host, |o| match source {
            HeightSource::Fixed(size) => {
                o.item_height = Some(size);
                o.get_item_height = None;
            }
            HeightSource::Estimator(f) => {
                o.item_height = None;
                o.get_item_height = Some(f);
            }
        });
    }

    pub fn set_gap(&mut self, gap: u32, host: &mut dyn VisibilityHost) {
        if self.options.gap == gap {
            return;
        }
        self.update_options(host, |o| o.gap = gap);
    }

    pub fn set_overscan(&mut self, overscan: usize, host: &mut dyn VisibilityHost) {
        if self.options.overscan == overscan {
            return;
        }
        self.update_options(host, |o| o.overscan = overscan);
    }

    /// Marker positions for the current materialized range.
    pub fn markers(&self) -> MarkerLayout {
        let total = self.table.total_extent();
        let load_more = self.options.on_load_more.as_ref().map(|_| total);
        let (Some(range), Some(last)) = (self.rendered_range(), self.table.last_index()) else {
            return MarkerLayout {
                top: 0,
                bottom: 0,
                load_more,
            };
        };
        let top = if range.start == 0 {
            0
        } else {
            self.table.offset(range.start).unwrap_or(0)
        };
        let bottom = if range.end == last {
            total
        } else {
            self.table
                .placement(range.end)
                .map_or(total, |p| p.end())
        };
        MarkerLayout {
            top,
            bottom,
            load_more,
        }
    }

    pub fn layout(&self) -> FrameLayout {
        FrameLayout {
            container: ContainerLayout {
                root: self.options.root(),
                spacer_extent: self.table.total_extent(),
            },
            markers: self.markers(),
            range: self.rendered_range(),
        }
    }

    /// Visits every rendered item in ascending index order, without allocating.
    pub fn for_each_placed_item(&self, mut f: impl FnMut(PlacedItem<K>)) {
        let Some(range) = self.rendered_range() else {
            return;
        };
        for placement in self.table.placements(range) {
            f(PlacedItem {
                key: self.key_for(placement.index),
                index: placement.index,
                offset: placement.offset,
                size: placement.size,
                trailing_gap: self.table.trailing_gap(placement.index),
            });
        }
    }

    /// Collects rendered items into `out` (clears `out` first).
    pub fn collect_placed_items(&self, out: &mut Vec<PlacedItem<K>>) {
        out.clear();
        self.for_each_placed_item(|item| out.push(item));
    }

    /// Renders the materialized range: `render` is called exactly once per rendered index.
    ///
    /// `items` should have `count` entries. A shorter slice renders only the indexes it has.
    pub fn render<T, V>(
        &self,
        items: &[T],
        mut render: impl FnMut(&T, usize) -> V,
    ) -> Vec<Rendered<K, V>> {
        if items.len() != self.options.count {
            vwarn!(
                items = items.len(),
                count = self.options.count,
                "item slice length differs from configured count"
            );
        }
        let mut out = Vec::with_capacity(self.rendered_range().map_or(0, |r| r.len()));
        self.for_each_placed_item(|item| {
            if let Some(data) = items.get(item.index) {
                let view = render(data, item.index);
                out.push(Rendered { item, view });
            }
        });
        out
    }

    fn attach_observers(&mut self, host: &mut dyn VisibilityHost) {
        let root = self.options.root();
        self.tracker.attach(host, root, self.options.overscan);
        if self.options.on_load_more.is_some() {
            self.trigger.attach(host, root);
        } else {
            self.trigger.detach(host);
        }
    }

    fn rebuild_table(&mut self) {
        self.table = PositionTable::build(self.options.count, &self.height, self.options.gap);
        self.window = match (self.window, self.table.last_index()) {
            (_, None) => None,
            (None, Some(last)) => Some(RenderWindow::initial(
                self.options.initial_window_end,
                last,
                self.options.window_policy,
            )),
            (Some(mut window), Some(last)) => {
                window.clamp(last);
                Some(window)
            }
        };
        vdebug!(
            count = self.options.count,
            total = self.table.total_extent(),
            window = ?self.window(),
            "rebuilt position table"
        );
    }

    fn commit(&self, host: &mut dyn VisibilityHost) {
        host.place_markers(&self.markers());
        self.notify();
    }

    fn notify(&self) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }
        if let Some(cb) = &self.options.on_change {
            cb(self);
        }
    }
}
