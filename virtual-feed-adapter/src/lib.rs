//! Host-side helpers for the `virtual-feed` engine.
//!
//! `virtual-feed` is headless: it reacts to marker visibility and hands back placed items. This
//! crate provides the framework-neutral pieces most hosts end up writing:
//!
//! - [`ScrollProbe`]: a [`virtual_feed::VisibilityHost`] for targets without an intersection
//!   primitive (terminals, canvases, tests), driven by scroll offsets
//! - [`FeedController`]: owns the items and the paging state (in flight, has more, limit)
//! - [`ContentHeightEstimator`] and [`MeasuredHeights`]: height sources for feed cards
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod estimate;
mod feed;
mod key;
mod measure;
mod probe;

#[cfg(test)]
mod tests;

pub use estimate::ContentHeightEstimator;
pub use feed::{DEFAULT_PAGE_SIZE, FeedController, ItemFn, PageSource};
pub use key::SizeCacheKey;
pub use measure::MeasuredHeights;
pub use probe::{DEFAULT_THROTTLE_MS, MARKER_THICKNESS, ScrollProbe};
