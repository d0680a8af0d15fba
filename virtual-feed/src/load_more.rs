use crate::{
    Marker, Observation, ObserverHandle, OnLoadMore, RootMargin, ScrollRoot, VisibilityEntry,
    VisibilityHost,
};

/// Fixed root margin for the load-more marker. Larger than the render-expansion margin since
/// fetching data is slower than rendering it.
pub const LOAD_MORE_MARGIN: u32 = 200;
pub const LOAD_MORE_THRESHOLD: f32 = 0.1;

/// Fires the caller's `fetch_more` once per approach of the end of the available content.
///
/// The trigger does not know whether a fetch is in flight. The callback owns that decision;
/// the trigger only guarantees one call per approach: a marker that keeps reporting
/// "intersecting" does not fire again until it left the viewport or the trigger was re-armed.
#[derive(Clone, Debug)]
pub struct LoadMoreTrigger {
    handle: Option<ObserverHandle>,
    armed: bool,
}

impl Default for LoadMoreTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadMoreTrigger {
    pub fn new() -> Self {
        Self {
            handle: None,
            armed: true,
        }
    }

    pub fn observation(root: ScrollRoot) -> Observation {
        Observation {
            marker: Marker::LoadMore,
            root,
            margin: RootMargin::uniform(LOAD_MORE_MARGIN),
            threshold: LOAD_MORE_THRESHOLD,
        }
    }

    /// Registers (or re-registers) the marker and re-arms the trigger.
    pub fn attach(&mut self, host: &mut dyn VisibilityHost, root: ScrollRoot) {
        self.detach(host);
        self.handle = Some(host.observe(Self::observation(root)));
        self.armed = true;
    }

    pub fn detach(&mut self, host: &mut dyn VisibilityHost) {
        if let Some(handle) = self.handle.take() {
            host.disconnect(handle);
        }
    }

    pub fn is_attached(&self) -> bool {
        self.handle.is_some()
    }

    pub fn handle(&self) -> Option<ObserverHandle> {
        self.handle
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Handles an entry for the load-more marker. Returns `true` if `fetch_more` was invoked.
    pub fn handle_entry(&mut self, entry: &VisibilityEntry, fetch_more: &OnLoadMore) -> bool {
        if entry.marker != Marker::LoadMore || self.handle != Some(entry.handle) {
            return false;
        }
        if !entry.is_intersecting {
            self.armed = true;
            return false;
        }
        if !self.armed {
            vtrace!("load-more marker still visible; not firing again");
            return false;
        }
        self.armed = false;
        vdebug!("load-more marker visible; requesting next page");
        fetch_more();
        true
    }
}
