use crate::{Marker, MarkerLayout, RootMargin, ScrollRoot};

/// Opaque id of one registered observation, allocated by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserverHandle(pub u64);

/// A request to watch one marker against a scroll root.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Observation {
    pub marker: Marker,
    pub root: ScrollRoot,
    pub margin: RootMargin,
    /// Fraction of the marker that must be inside the (margin-extended) root, `0.0..=1.0`.
    /// `0.0` means any contact counts.
    pub threshold: f32,
}

/// A visibility report delivered by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibilityEntry {
    pub handle: ObserverHandle,
    pub marker: Marker,
    pub is_intersecting: bool,
}

/// The platform seam: whatever provides visibility/intersection callbacks.
///
/// A DOM host maps this onto `IntersectionObserver`; hosts without such a primitive can use a
/// scroll-position comparison instead (see the `virtual-feed-adapter` crate).
///
/// Contract:
/// - `observe` returns a handle that is unique among live observations.
/// - After `disconnect(handle)` the host must not deliver entries for `handle`. The engine
///   drops such entries, so a late delivery is harmless.
/// - Entries are delivered serially, never while the engine is inside one of its own methods.
pub trait VisibilityHost {
    fn observe(&mut self, observation: Observation) -> ObserverHandle;

    fn disconnect(&mut self, handle: ObserverHandle);

    /// Called after every committed render with the new marker positions.
    ///
    /// Hosts that position markers through their own rendering (e.g. CSS transforms) can
    /// ignore this.
    fn place_markers(&mut self, _markers: &MarkerLayout) {}
}

impl<H: VisibilityHost + ?Sized> VisibilityHost for &mut H {
    fn observe(&mut self, observation: Observation) -> ObserverHandle {
        (**self).observe(observation)
    }

    fn disconnect(&mut self, handle: ObserverHandle) {
        (**self).disconnect(handle)
    }

    fn place_markers(&mut self, markers: &MarkerLayout) {
        (**self).place_markers(markers)
    }
}
