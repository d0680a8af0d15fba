use crate::{
    Edge, Marker, Observation, ObserverHandle, RenderWindow, RootMargin, ScrollRoot,
    VisibilityEntry, VisibilityHost,
};

/// Root margin per overscan item, so the window expands before a marker is on screen.
pub const MARGIN_PER_OVERSCAN_ITEM: u32 = 100;

/// Watches the two boundary markers and turns their visibility into window growth.
#[derive(Clone, Debug, Default)]
pub struct VisibilityTracker {
    top: Option<ObserverHandle>,
    bottom: Option<ObserverHandle>,
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observation(edge: Edge, root: ScrollRoot, overscan: usize) -> Observation {
        let margin = u32::try_from(overscan)
            .unwrap_or(u32::MAX)
            .saturating_mul(MARGIN_PER_OVERSCAN_ITEM);
        Observation {
            marker: edge.into(),
            root,
            margin: match edge {
                Edge::Top => RootMargin::top(margin),
                Edge::Bottom => RootMargin::bottom(margin),
            },
            threshold: 0.0,
        }
    }

    /// Registers both markers. Existing registrations are released first.
    pub fn attach(&mut self, host: &mut dyn VisibilityHost, root: ScrollRoot, overscan: usize) {
        self.detach(host);
        self.top = Some(host.observe(Self::observation(Edge::Top, root, overscan)));
        self.bottom = Some(host.observe(Self::observation(Edge::Bottom, root, overscan)));
        vtrace!(?root, overscan, "VisibilityTracker::attach");
    }

    pub fn detach(&mut self, host: &mut dyn VisibilityHost) {
        if let Some(handle) = self.top.take() {
            host.disconnect(handle);
        }
        if let Some(handle) = self.bottom.take() {
            host.disconnect(handle);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.top.is_some() || self.bottom.is_some()
    }

    pub fn handle(&self, edge: Edge) -> Option<ObserverHandle> {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }

    /// The edge an entry reports on, if it belongs to a live registration.
    pub fn edge_for(&self, entry: &VisibilityEntry) -> Option<Edge> {
        let edge = match entry.marker {
            Marker::Top => Edge::Top,
            Marker::Bottom => Edge::Bottom,
            Marker::LoadMore => return None,
        };
        (self.handle(edge) == Some(entry.handle)).then_some(edge)
    }

    /// Applies a visibility entry to `window`. Returns `true` if the window changed.
    ///
    /// Only intersecting entries grow the window; leaving the viewport is a no-op.
    pub fn apply(
        &self,
        entry: &VisibilityEntry,
        window: &mut RenderWindow,
        overscan: usize,
        last_index: usize,
    ) -> bool {
        if !entry.is_intersecting {
            return false;
        }
        let Some(edge) = self.edge_for(entry) else {
            return false;
        };
        window.grow(edge, overscan, last_index)
    }
}
