use virtual_feed::{
    Marker, Observation, ObserverHandle, ScrollerOptions, VisibilityEntry, VisibilityHost,
    WindowedRenderer,
};

/// The smallest possible host: hands out handles and remembers which marker each one watches.
#[derive(Default)]
struct Host {
    next: u64,
    live: Vec<(ObserverHandle, Marker)>,
}

impl VisibilityHost for Host {
    fn observe(&mut self, observation: Observation) -> ObserverHandle {
        self.next += 1;
        let handle = ObserverHandle(self.next);
        self.live.push((handle, observation.marker));
        handle
    }

    fn disconnect(&mut self, handle: ObserverHandle) {
        self.live.retain(|(h, _)| *h != handle);
    }
}

impl Host {
    fn entry(&self, marker: Marker) -> Option<VisibilityEntry> {
        let (handle, _) = self.live.iter().find(|(_, m)| *m == marker)?;
        Some(VisibilityEntry {
            handle: *handle,
            marker,
            is_intersecting: true,
        })
    }
}

fn main() {
    let posts: Vec<String> = (0..1_000).map(|i| format!("post #{i}")).collect();

    let mut host = Host::default();
    let mut r = WindowedRenderer::new(
        ScrollerOptions::new(posts.len())
            .with_get_item_height(|i| 180 + (i % 4) as u32 * 24)
            .with_on_load_more(Some(|| println!("load more requested"))),
    );
    r.mount(&mut host);

    println!("total_extent={}", r.total_extent());
    println!("layout={:?}", r.layout());

    // The host saw the bottom marker enter the viewport twice.
    for _ in 0..2 {
        if let Some(entry) = host.entry(Marker::Bottom) {
            let outcome = r.handle_visibility(entry, &mut host);
            println!("bottom visible: {outcome:?} window={:?}", r.window());
        }
    }

    let rendered = r.render(&posts, |post, _| post.clone());
    println!(
        "rendered {} items, last={:?}",
        rendered.len(),
        rendered.last().map(|x| (&x.view, x.item.offset))
    );

    r.unmount(&mut host);
    println!("after unmount: live observations={}", host.live.len());
}
