use crate::{Edge, WindowRange};

/// Last index of the window a fresh renderer starts with.
pub const DEFAULT_INITIAL_WINDOW_END: usize = 10;

/// How the render window reacts to growth at one edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindowPolicy {
    /// The window only ever grows. Memory for rendered items is bounded by how far the user
    /// scrolled, not by the viewport.
    #[default]
    GrowOnly,
    /// After growing at one edge, indexes more than `keep * overscan` away from that edge are
    /// dropped from the opposite side.
    ///
    /// Growth at the two edges no longer commutes under this policy.
    Sliding { keep: usize },
}

/// The contiguous index range currently materialized, before overscan padding.
///
/// Invariant: `0 <= start <= end <= last_index` for the sequence it was last clamped to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderWindow {
    range: WindowRange,
    policy: WindowPolicy,
}

impl RenderWindow {
    pub fn initial(initial_end: usize, last_index: usize, policy: WindowPolicy) -> Self {
        Self {
            range: WindowRange {
                start: 0,
                end: initial_end.min(last_index),
            },
            policy,
        }
    }

    pub fn range(&self) -> WindowRange {
        self.range
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn end(&self) -> usize {
        self.range.end
    }

    pub fn policy(&self) -> WindowPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: WindowPolicy) {
        self.policy = policy;
    }

    /// Grows the window by `overscan` at `edge`, clamped to `[0, last_index]`.
    ///
    /// Returns `true` if the range changed.
    pub fn grow(&mut self, edge: Edge, overscan: usize, last_index: usize) -> bool {
        let before = self.range;
        match edge {
            Edge::Top => {
                self.range.start = self.range.start.saturating_sub(overscan);
                if let WindowPolicy::Sliding { keep } = self.policy {
                    let span = keep.saturating_mul(overscan);
                    self.range.end = self.range.end.min(self.range.start.saturating_add(span));
                }
            }
            Edge::Bottom => {
                self.range.end = self.range.end.saturating_add(overscan).min(last_index);
                if let WindowPolicy::Sliding { keep } = self.policy {
                    let span = keep.saturating_mul(overscan);
                    self.range.start = self.range.start.max(self.range.end.saturating_sub(span));
                }
            }
        }
        self.clamp(last_index);
        self.range != before
    }

    /// Pulls the window back inside `[0, last_index]` after the sequence got shorter.
    pub fn clamp(&mut self, last_index: usize) -> bool {
        let before = self.range;
        self.range.end = self.range.end.min(last_index);
        self.range.start = self.range.start.min(self.range.end);
        self.range != before
    }

    /// The window padded by `overscan` on both sides: the range that is actually rendered.
    pub fn padded(&self, overscan: usize, last_index: usize) -> WindowRange {
        let end = self.range.end.saturating_add(overscan).min(last_index);
        WindowRange {
            start: self.range.start.saturating_sub(overscan).min(end),
            end,
        }
    }
}
