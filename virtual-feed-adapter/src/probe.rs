use alloc::vec::Vec;

use virtual_feed::{
    Marker, MarkerLayout, Observation, ObserverHandle, ScrollRoot, VisibilityEntry,
    VisibilityHost,
};

/// Minimum time between two evaluations driven by scroll events (about one frame).
pub const DEFAULT_THROTTLE_MS: u64 = 16;

/// Markers are zero-size anchors; for intersection purposes they are one unit thick.
pub const MARKER_THICKNESS: u64 = 1;

#[derive(Clone, Copy, Debug)]
struct Registration {
    handle: ObserverHandle,
    observation: Observation,
    /// Last reported state; `None` until the first evaluation (or after the marker moved).
    last: Option<bool>,
}

/// A [`VisibilityHost`] for targets without an intersection primitive.
///
/// It compares the scroll position against the marker positions the renderer places, throttled
/// to at most one evaluation per `throttle_ms` of scroll events, and reports only transitions:
/// - the first evaluation of a registration always reports;
/// - a marker that moved is evaluated as if new, so a marker that is still visible after the
///   window grew reports again.
///
/// In [`ScrollRoot::Document`] mode the scroll offset is the page offset and `list_offset` is
/// where the list starts on the page.
#[derive(Clone, Debug)]
pub struct ScrollProbe {
    next_handle: u64,
    registrations: Vec<Registration>,
    markers: MarkerLayout,
    viewport_size: u32,
    scroll_offset: u64,
    list_offset: u64,
    throttle_ms: u64,
    last_eval_ms: Option<u64>,
    pending: bool,
}

impl ScrollProbe {
    pub fn new(viewport_size: u32) -> Self {
        Self {
            next_handle: 0,
            registrations: Vec::new(),
            markers: MarkerLayout::default(),
            viewport_size,
            scroll_offset: 0,
            list_offset: 0,
            throttle_ms: DEFAULT_THROTTLE_MS,
            last_eval_ms: None,
            pending: false,
        }
    }

    pub fn with_throttle_ms(mut self, throttle_ms: u64) -> Self {
        self.throttle_ms = throttle_ms;
        self
    }

    pub fn with_list_offset(mut self, list_offset: u64) -> Self {
        self.list_offset = list_offset;
        self
    }

    pub fn viewport_size(&self) -> u32 {
        self.viewport_size
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn list_offset(&self) -> u64 {
        self.list_offset
    }

    pub fn markers(&self) -> MarkerLayout {
        self.markers
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    pub fn set_viewport_size(&mut self, viewport_size: u32) {
        if self.viewport_size != viewport_size {
            self.viewport_size = viewport_size;
            self.pending = true;
        }
    }

    pub fn set_list_offset(&mut self, list_offset: u64) {
        if self.list_offset != list_offset {
            self.list_offset = list_offset;
            self.pending = true;
        }
    }

    /// Number of live registrations.
    pub fn active_observers(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_observing(&self, handle: ObserverHandle) -> bool {
        self.registrations.iter().any(|r| r.handle == handle)
    }

    /// Records a scroll position and evaluates if the throttle allows it.
    ///
    /// A throttled call leaves the work pending; call [`Self::flush`] on the next tick.
    pub fn on_scroll(&mut self, scroll_offset: u64, now_ms: u64) -> Vec<VisibilityEntry> {
        if self.scroll_offset != scroll_offset {
            self.scroll_offset = scroll_offset;
            self.pending = true;
        }
        if !self.pending {
            return Vec::new();
        }
        let throttled = self
            .last_eval_ms
            .is_some_and(|last| now_ms.saturating_sub(last) < self.throttle_ms);
        if throttled {
            vtrace!(scroll_offset, now_ms, "scroll evaluation throttled");
            return Vec::new();
        }
        self.last_eval_ms = Some(now_ms);
        self.evaluate()
    }

    /// Evaluates pending work once the throttle interval has passed.
    pub fn flush(&mut self, now_ms: u64) -> Vec<VisibilityEntry> {
        self.on_scroll(self.scroll_offset, now_ms)
    }

    /// Evaluates every registration now, ignoring the throttle.
    ///
    /// Returns one entry per registration whose state changed since it was last reported.
    pub fn evaluate(&mut self) -> Vec<VisibilityEntry> {
        self.pending = false;
        let mut out = Vec::new();
        for i in 0..self.registrations.len() {
            let reg = self.registrations[i];
            let Some(visible) = self.intersects(&reg.observation) else {
                continue;
            };
            if reg.last == Some(visible) {
                continue;
            }
            self.registrations[i].last = Some(visible);
            out.push(VisibilityEntry {
                handle: reg.handle,
                marker: reg.observation.marker,
                is_intersecting: visible,
            });
        }
        vtrace!(
            entries = out.len(),
            scroll_offset = self.scroll_offset,
            "evaluated markers"
        );
        out
    }

    /// Whether `observation`'s marker currently intersects its margin-extended root.
    ///
    /// `None` when the marker has no position (no load-more marker placed).
    pub fn intersects(&self, observation: &Observation) -> Option<bool> {
        let pos = self.markers.position(observation.marker)?;
        let start = match observation.root {
            ScrollRoot::Container => pos,
            ScrollRoot::Document => self.list_offset.saturating_add(pos),
        };
        let end = start.saturating_add(MARKER_THICKNESS);

        let margin = observation.margin;
        let root_start = self.scroll_offset.saturating_sub(margin.top as u64);
        let root_end = self
            .scroll_offset
            .saturating_add(self.viewport_size as u64)
            .saturating_add(margin.bottom as u64);

        if observation.threshold <= 0.0 {
            // Edge contact counts.
            return Some(start <= root_end && end >= root_start);
        }
        let overlap = end.min(root_end).saturating_sub(start.max(root_start));
        Some(overlap as f32 >= observation.threshold * MARKER_THICKNESS as f32)
    }
}

impl VisibilityHost for ScrollProbe {
    fn observe(&mut self, observation: Observation) -> ObserverHandle {
        self.next_handle = self.next_handle.wrapping_add(1);
        let handle = ObserverHandle(self.next_handle);
        self.registrations.push(Registration {
            handle,
            observation,
            last: None,
        });
        self.pending = true;
        vtrace!(?handle, marker = ?observation.marker, "observe");
        handle
    }

    fn disconnect(&mut self, handle: ObserverHandle) {
        self.registrations.retain(|r| r.handle != handle);
        vtrace!(?handle, "disconnect");
    }

    fn place_markers(&mut self, markers: &MarkerLayout) {
        for marker in [Marker::Top, Marker::Bottom, Marker::LoadMore] {
            if self.markers.position(marker) == markers.position(marker) {
                continue;
            }
            for reg in &mut self.registrations {
                if reg.observation.marker == marker {
                    reg.last = None;
                }
            }
            self.pending = true;
        }
        self.markers = *markers;
    }
}
