//! A headless windowed virtual scrolling engine for infinite feeds.
//!
//! For host-side helpers (scroll probing, paging, height estimation), see the
//! `virtual-feed-adapter` crate.
//!
//! The engine displays an unbounded, variable-height item sequence while only materializing a
//! small contiguous window of it:
//! - a position table (offset/size of every item, including the inter-item gap)
//! - a render window that grows when boundary markers become visible
//! - a load-more trigger that asks the caller for the next page before the end is reached
//!
//! Scroll position is never polled. A host reports marker visibility through the
//! [`VisibilityHost`] seam (an intersection primitive, or a throttled scroll comparison) and
//! draws the placed items the renderer hands back.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod load_more;
mod observer;
mod options;
mod position;
mod renderer;
mod tracker;
mod types;
mod window;


pub use load_more::{LOAD_MORE_MARGIN, LOAD_MORE_THRESHOLD, LoadMoreTrigger};
pub use observer::{Observation, ObserverHandle, VisibilityEntry, VisibilityHost};
pub use options::{
    DEFAULT_GAP, DEFAULT_ITEM_HEIGHT, DEFAULT_OVERSCAN, EstimateHeight, HeightSource,
    OnChangeCallback, OnLoadMore, ScrollerOptions,
};
pub use position::PositionTable;
pub use renderer::{VisibilityOutcome, WindowedRenderer};
pub use tracker::{MARGIN_PER_OVERSCAN_ITEM, VisibilityTracker};
pub use types::{
    ContainerLayout, Edge, FrameLayout, ItemKey, Lifecycle, Marker, MarkerLayout, PlacedItem,
    Placement, Rendered, RootMargin, ScrollRoot, WindowRange,
};
pub use window::{DEFAULT_INITIAL_WINDOW_END, RenderWindow, WindowPolicy};
