use crate::*;

use alloc::vec::Vec;
use virtual_feed::{
    DEFAULT_ITEM_HEIGHT, Edge, HeightSource, LoadMoreTrigger, MarkerLayout, ScrollRoot,
    ScrollerOptions, VisibilityHost, VisibilityTracker, WindowRange,
};

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    fn gen_range_u64(&mut self, start: u64, end_exclusive: u64) -> u64 {
        debug_assert!(start < end_exclusive);
        start + (self.next_u64() % (end_exclusive - start))
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        self.gen_range_u64(start as u64, end_exclusive as u64) as usize
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Post {
    id: u64,
    body: &'static str,
}

fn posts(first_id: u64, n: usize) -> Vec<Post> {
    (0..n as u64)
        .map(|i| Post {
            id: first_id + i,
            body: "",
        })
        .collect()
}

#[derive(Debug, Default)]
struct RecordingSource {
    requests: Vec<(usize, usize)>,
}

impl<T> PageSource<T> for RecordingSource {
    fn request_page(&mut self, after_index: usize, page_size: usize) {
        self.requests.push((after_index, page_size));
    }
}

/// 100-unit items with the default 16-unit gap, 500-unit viewport, no throttle.
fn controller(page_size: usize) -> FeedController<Post, RecordingSource> {
    FeedController::new(
        ScrollerOptions::new(0).with_item_height(100),
        ScrollProbe::new(500).with_throttle_ms(0),
        RecordingSource::default(),
    )
    .with_page_size(page_size)
    .with_key(|p: &Post| p.id)
}

fn place(probe: &mut ScrollProbe, top: u64, bottom: u64, load_more: Option<u64>) {
    probe.place_markers(&MarkerLayout {
        top,
        bottom,
        load_more,
    });
}

#[test]
fn probe_reports_transitions_only() {
    let mut probe = ScrollProbe::new(500).with_throttle_ms(0);
    let handle = probe.observe(VisibilityTracker::observation(
        Edge::Bottom,
        ScrollRoot::Container,
        3,
    ));
    place(&mut probe, 0, 900, None);

    // First evaluation always reports.
    let entries = probe.evaluate();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].handle, handle);
    assert!(!entries[0].is_intersecting);
    assert!(probe.evaluate().is_empty());

    // 100 + 500 + 300 of margin reaches the marker exactly.
    let entries = probe.on_scroll(100, 0);
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_intersecting);
    assert!(probe.on_scroll(120, 1).is_empty());
}

#[test]
fn probe_throttles_scroll_evaluations() {
    let mut probe = ScrollProbe::new(500);
    probe.observe(VisibilityTracker::observation(
        Edge::Bottom,
        ScrollRoot::Container,
        3,
    ));
    place(&mut probe, 0, 2000, None);

    assert_eq!(probe.on_scroll(100, 0).len(), 1);
    assert!(probe.on_scroll(1500, 5).is_empty());
    assert!(probe.has_pending());
    assert!(probe.flush(10).is_empty());

    let entries = probe.flush(DEFAULT_THROTTLE_MS);
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_intersecting);
    assert!(!probe.has_pending());
}

#[test]
fn moved_marker_reports_again_while_visible() {
    let mut probe = ScrollProbe::new(500).with_throttle_ms(0);
    probe.observe(VisibilityTracker::observation(
        Edge::Bottom,
        ScrollRoot::Container,
        3,
    ));
    place(&mut probe, 0, 600, None);
    assert!(probe.evaluate()[0].is_intersecting);

    place(&mut probe, 0, 700, None);
    assert!(probe.has_pending());
    let entries = probe.evaluate();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_intersecting);

    // Same position: nothing new.
    place(&mut probe, 0, 700, None);
    assert!(probe.evaluate().is_empty());
}

#[test]
fn probe_disconnect_releases_registration() {
    let mut probe = ScrollProbe::new(500);
    let top = probe.observe(VisibilityTracker::observation(
        Edge::Top,
        ScrollRoot::Container,
        3,
    ));
    let bottom = probe.observe(VisibilityTracker::observation(
        Edge::Bottom,
        ScrollRoot::Container,
        3,
    ));
    assert_ne!(top, bottom);
    assert_eq!(probe.active_observers(), 2);

    probe.disconnect(top);
    assert_eq!(probe.active_observers(), 1);
    assert!(!probe.is_observing(top));
    assert!(probe.is_observing(bottom));

    place(&mut probe, 0, 0, None);
    let entries = probe.evaluate();
    assert!(entries.iter().all(|e| e.handle == bottom));
}

#[test]
fn document_root_adds_list_offset() {
    let mut probe = ScrollProbe::new(500).with_list_offset(1000);
    let observation = VisibilityTracker::observation(Edge::Bottom, ScrollRoot::Document, 3);
    place(&mut probe, 0, 0, None);

    assert_eq!(probe.intersects(&observation), Some(false));
    probe.on_scroll(200, 0);
    assert_eq!(probe.intersects(&observation), Some(true));

    // Without the offset the marker sits above the viewport.
    let container = VisibilityTracker::observation(Edge::Bottom, ScrollRoot::Container, 3);
    assert_eq!(probe.intersects(&container), Some(false));
}

#[test]
fn load_more_threshold_needs_overlap() {
    let mut probe = ScrollProbe::new(500);
    let observation = LoadMoreTrigger::observation(ScrollRoot::Container);

    place(&mut probe, 0, 0, None);
    assert_eq!(probe.intersects(&observation), None);

    // Root ends at 500 + 200 of margin; touching the edge is not 10% of the marker.
    place(&mut probe, 0, 0, Some(700));
    assert_eq!(probe.intersects(&observation), Some(false));
    place(&mut probe, 0, 0, Some(699));
    assert_eq!(probe.intersects(&observation), Some(true));
}

#[test]
fn feed_cards_estimate_from_content_length() {
    let est = ContentHeightEstimator::default();
    assert_eq!(est.estimate_text(""), 200);
    assert_eq!(est.estimate_chars(65), 224);
    assert_eq!(est.estimate_chars(66), 248);
    assert_eq!(est.estimate_chars(130), 248);
    assert_eq!(est.estimate_chars(10_000), 600);
    assert_eq!(est.estimate(None), 250);
    // Characters, not bytes.
    assert_eq!(est.estimate_text(&"é".repeat(65)), 224);
}

#[test]
fn measured_heights_snapshot_prefers_measurements() {
    let mut measured = MeasuredHeights::<u64>::new();
    assert!(measured.is_empty());
    assert!(measured.record(2, 500));
    assert!(!measured.record(2, 500));
    assert!(measured.record(2, 510));
    assert_eq!(measured.get(&2), Some(510));
    assert_eq!(measured.len(), 1);

    let source = measured.snapshot(&[1, 2, 3], |i| 100 + i as u32);
    assert_eq!(source.size_of(0), 100);
    assert_eq!(source.size_of(1), 510);
    assert_eq!(source.size_of(2), 102);
    assert_eq!(source.size_of(5), DEFAULT_ITEM_HEIGHT);

    // Every snapshot is a new identity, so the renderer always rebuilds from it.
    let again = measured.snapshot(&[1, 2, 3], |i| 100 + i as u32);
    assert!(!source.same_as(&again));
    assert!(!matches!(source, HeightSource::Fixed(_)));

    measured.clear();
    assert!(measured.is_empty());
}

#[test]
fn empty_feed_requests_first_page_on_mount() {
    let mut c = controller(50);
    assert!(!c.mount());
    assert_eq!(c.source().requests, [(0, 50)]);
    assert!(c.is_loading());
    assert_eq!(c.probe().active_observers(), 3);

    // In flight: no second request.
    assert!(!c.retry());
    assert_eq!(c.source().requests.len(), 1);
}

#[test]
fn feed_session_scrolls_pages_and_recovers_from_failure() {
    let mut c = controller(50);
    c.mount();
    assert!(c.complete_page(Ok::<_, &str>(posts(1000, 50))));
    assert!(!c.is_loading());
    assert!(c.has_more());

    let layout = c.layout();
    assert_eq!(layout.container.spacer_extent, 50 * 100 + 49 * 16);
    assert_eq!(layout.range, Some(WindowRange { start: 0, end: 13 }));
    assert_eq!(layout.markers.bottom, 13 * 116 + 100);
    assert_eq!(layout.markers.load_more, Some(5784));

    // The bottom marker enters the extended viewport: the window grows once.
    assert!(c.on_scroll(1000, 100));
    assert_eq!(c.layout().range, Some(WindowRange { start: 0, end: 16 }));
    assert_eq!(c.source().requests.len(), 1);

    // Jump near the end: the load-more marker fires.
    c.on_scroll(5400, 200);
    assert_eq!(c.source().requests, [(0, 50), (50, 50)]);

    assert!(!c.complete_page(Err::<Vec<Post>, _>("timeout")));
    assert!(!c.is_loading());
    assert_eq!(c.items().len(), 50);

    // The marker is still visible, so only an explicit retry asks again.
    c.on_scroll(5410, 300);
    assert_eq!(c.source().requests.len(), 2);
    assert!(c.retry());
    assert_eq!(c.source().requests[2], (50, 50));

    // A short page ends the feed.
    assert!(c.complete_page(Ok::<_, &str>(posts(1050, 20))));
    assert!(!c.has_more());
    assert_eq!(c.items().len(), 70);
    assert_eq!(c.layout().container.spacer_extent, 70 * 100 + 69 * 16);
    assert!(!c.retry());
    assert_eq!(c.source().requests.len(), 3);
}

#[test]
fn short_pages_keep_loading_while_the_marker_stays_visible() {
    let mut c = controller(3);
    c.mount();
    assert!(c.complete_page(Ok::<_, &str>(posts(1, 3))));

    // 3 items fill 332 units; the re-registered trigger fires again right away.
    assert_eq!(c.source().requests, [(0, 3), (3, 3)]);
    assert!(c.is_loading());
}

#[test]
fn total_limit_caps_the_feed() {
    let mut c = controller(50).with_total_limit(120);
    c.mount();
    c.complete_page(Ok::<_, &str>(posts(0, 50)));
    assert!(c.retry());
    c.complete_page(Ok::<_, &str>(posts(50, 50)));
    assert!(c.retry());
    // Only the 20 items left under the limit are asked for.
    assert_eq!(c.source().requests[2], (100, 20));
    c.complete_page(Ok::<_, &str>(posts(100, 20)));

    assert_eq!(c.items().len(), 120);
    assert!(!c.has_more());
    assert!(!c.retry());
    assert_eq!(c.source().requests.len(), 3);
}

#[test]
fn unmount_releases_every_observation() {
    let mut c = controller(50);
    c.mount();
    c.complete_page(Ok::<_, &str>(posts(0, 50)));
    assert_eq!(c.probe().active_observers(), 3);

    c.unmount();
    assert_eq!(c.probe().active_observers(), 0);
    assert!(!c.on_scroll(5400, 100));
    assert!(!c.retry());
    assert!(!c.is_loading());
    assert_eq!(c.source().requests.len(), 1);
}

#[test]
fn late_page_after_unmount_requests_nothing() {
    let mut c = controller(3);
    c.mount();
    c.unmount();

    // The first page was already in flight; it lands into a torn-down feed.
    c.complete_page(Ok::<_, &str>(posts(0, 3)));
    assert!(!c.retry());
    assert_eq!(c.source().requests, [(0, 3)]);
    assert_eq!(c.probe().active_observers(), 0);
}

#[test]
fn page_requests_honor_a_limit_below_page_size() {
    let mut c = controller(50).with_total_limit(30);
    c.mount();
    assert_eq!(c.source().requests, [(0, 30)]);
    c.complete_page(Ok::<_, &str>(posts(0, 30)));
    assert!(!c.has_more());
    assert_eq!(c.items().len(), 30);
}

#[test]
fn prepend_without_keys_drops_index_measurements() {
    let mut c = FeedController::new(
        ScrollerOptions::new(0).with_item_height(100),
        ScrollProbe::new(500).with_throttle_ms(0),
        RecordingSource::default(),
    )
    .with_page_size(5);
    c.mount();
    c.complete_page(Ok::<_, &str>(posts(10, 5)));
    assert!(c.measure(0, 300));
    assert_eq!(c.renderer().table().size(0), Some(300));

    c.prepend(Post { id: 99, body: "" });
    assert_eq!(c.key_at(0), 0);
    // Index 1 now holds the item measured at index 0; neither keeps a stale size.
    assert_eq!(c.renderer().table().size(0), Some(100));
    assert_eq!(c.renderer().table().size(1), Some(100));
    assert!(c.measure(1, 300));
    assert_eq!(c.renderer().table().size(1), Some(300));
}

#[test]
fn visible_range_follows_scroll_position() {
    let mut c = controller(50);
    assert_eq!(c.visible_range(), None);
    c.mount();
    c.complete_page(Ok::<_, &str>(posts(0, 50)));

    // Items are 116 apart: [0, 500) covers items 0..=4.
    assert_eq!(c.visible_range(), Some(WindowRange { start: 0, end: 4 }));

    // 1000 falls in item 8; 1499 in item 12.
    c.on_scroll(1000, 100);
    assert_eq!(c.visible_range(), Some(WindowRange { start: 8, end: 12 }));

    // Past the end of the list.
    c.on_scroll(10_000, 200);
    assert_eq!(c.visible_range(), None);
}

#[test]
fn visible_range_in_document_mode_subtracts_list_offset() {
    let mut c = FeedController::new(
        ScrollerOptions::new(0).with_item_height(100).with_seamless(true),
        ScrollProbe::new(500).with_throttle_ms(0).with_list_offset(600),
        RecordingSource::default(),
    );
    c.mount();
    c.complete_page(Ok::<_, &str>(posts(0, 50)));

    // The list starts below the fold.
    assert_eq!(c.visible_range(), None);

    // Page [700, 1200) is list [100, 600): items 0 (gap maps back) ..= 5.
    c.on_scroll(700, 100);
    assert_eq!(c.visible_range(), Some(WindowRange { start: 0, end: 5 }));
}

#[test]
fn measurements_follow_keys_across_prepend() {
    let mut c = controller(5);
    c.mount();
    c.complete_page(Ok::<_, &str>(posts(10, 5)));

    assert!(c.measure(0, 300));
    assert!(!c.measure(0, 300));
    assert!(!c.measure(99, 300));
    assert_eq!(c.renderer().table().offset(1), Some(316));

    assert!(c.prepend(Post {
        id: 99,
        body: "fresh",
    }));
    assert_eq!(c.key_at(0), 99);
    assert_eq!(c.key_at(1), 10);
    assert_eq!(c.renderer().key_for(0), 99);
    assert_eq!(c.renderer().table().size(0), Some(100));
    assert_eq!(c.renderer().table().size(1), Some(300));

    let rendered = c.render(|p, _| p.id);
    assert_eq!(rendered[0].item.key, 99);
    assert_eq!(rendered[0].view, 99);
    assert_eq!(rendered[1].view, 10);
}

#[test]
fn estimator_drives_item_heights() {
    let est = ContentHeightEstimator::default();
    let mut c = controller(2).with_estimator(move |p: &Post| est.estimate_text(p.body));
    c.mount();
    c.complete_page(Ok::<_, &str>(alloc::vec![
        Post { id: 1, body: "" },
        Post {
            id: 2,
            body: "a post body that still fits on one line of the card",
        },
    ]));
    assert_eq!(c.renderer().table().size(0), Some(200));
    assert_eq!(c.renderer().table().size(1), Some(224));
}

#[test]
fn random_session_keeps_one_request_in_flight() {
    let mut rng = Lcg::new(7);
    let mut c = controller(8);
    c.mount();

    let mut now = 0;
    let mut completed = 0;
    let mut prev_end = 0;
    for _ in 0..400 {
        now += rng.gen_range_u64(1, 40);
        match rng.gen_range_usize(0, 3) {
            0 => {
                let total = c.layout().container.spacer_extent;
                let offset = rng.gen_range_u64(0, total + 1);
                c.on_scroll(offset, now);
            }
            1 => {
                c.tick(now);
            }
            _ => {
                if c.is_loading() {
                    let n = rng.gen_range_usize(7, 9);
                    let first = c.items().len() as u64;
                    c.complete_page(Ok::<_, &str>(posts(first, n)));
                    completed += 1;
                }
            }
        }

        let requests = &c.source().requests;
        assert_eq!(requests.len(), completed + usize::from(c.is_loading()));
        if let Some(&(after, _)) = requests.last() {
            assert!(after <= c.items().len());
        }
        if let Some(range) = c.layout().range {
            assert_eq!(range.start, 0);
            assert!(range.end >= prev_end);
            prev_end = range.end;
        }
    }
}
