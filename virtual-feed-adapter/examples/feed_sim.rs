use std::collections::VecDeque;

use virtual_feed::ScrollerOptions;
use virtual_feed_adapter::{ContentHeightEstimator, FeedController, PageSource, ScrollProbe};

struct Post {
    id: u64,
    body: String,
}

/// Queues requests; the "network" answers them on a later tick.
#[derive(Default)]
struct QueuedSource {
    pending: VecDeque<(usize, usize)>,
}

impl PageSource<Post> for QueuedSource {
    fn request_page(&mut self, after_index: usize, page_size: usize) {
        println!("request_page(after={after_index}, size={page_size})");
        self.pending.push_back((after_index, page_size));
    }
}

fn fetch(after_index: usize, page_size: usize) -> Vec<Post> {
    (after_index..after_index + page_size)
        .map(|i| Post {
            id: i as u64,
            body: "lorem ipsum ".repeat(i % 20),
        })
        .collect()
}

fn main() {
    // Example: an adapter without an intersection primitive (e.g. a terminal UI).
    //
    // An adapter would:
    // - forward scroll offsets and viewport resizes to the controller
    // - call tick(now_ms) on a timer to flush throttled evaluations
    // - answer page requests with complete_page
    // - render controller.render(..) at the positions it returns
    let estimator = ContentHeightEstimator::default();
    let mut c = FeedController::new(
        ScrollerOptions::new(0),
        ScrollProbe::new(800),
        QueuedSource::default(),
    )
    .with_total_limit(300)
    .with_key(|p: &Post| p.id)
    .with_estimator(move |p: &Post| estimator.estimate_text(&p.body));

    c.mount();

    let mut now_ms = 0u64;
    let mut offset = 0u64;
    while now_ms < 20_000 {
        now_ms += 16;
        if let Some((after, size)) = c.source_mut().pending.pop_front() {
            c.complete_page(Ok::<_, String>(fetch(after, size)));
        }

        offset += 120;
        let total = c.layout().container.spacer_extent;
        if c.on_scroll(offset.min(total), now_ms) {
            let range = c.layout().range;
            println!("t={now_ms} offset={offset} items={} range={range:?}", c.items().len());
        }
        c.tick(now_ms);
        if !c.has_more() && offset >= total {
            break;
        }
    }

    let rendered = c.render(|post, _| post.id);
    println!(
        "done: items={} rendered={} has_more={}",
        c.items().len(),
        rendered.len(),
        c.has_more()
    );
}
