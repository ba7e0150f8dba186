/// Drive a feed detail view against the in-process repository, no terminal
///
/// Run with: cargo run --example headless
use meetup::api::{MockFeedRepository, MockOptions};
use meetup::clock::SystemClock;
use meetup::feed::{FeedConfig, FeedDetailViewModel, Phase};
use meetup_types::PostId;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = MockOptions {
        latency: Duration::from_millis(50),
        fail_pages_once: HashSet::from([2]),
        ..Default::default()
    };
    let viewer = options.viewer.clone();
    let clock = Arc::new(SystemClock);
    let repository = Arc::new(MockFeedRepository::new(options, clock.clone()));
    let mut vm = FeedDetailViewModel::new(PostId(1), repository, clock, viewer, FeedConfig::default());

    vm.load().await;
    if let Phase::Failed(err) = vm.phase() {
        anyhow::bail!("load failed: {}", err);
    }
    let post = vm.post().map(|p| (p.images.len(), p.comment_count)).unwrap_or_default();
    println!("Loaded post: {} images, {} comments", post.0, post.1);

    vm.next_image();
    vm.next_image();
    println!("Carousel at image {}/{}", vm.carousel().index() + 1, vm.carousel().image_count());

    while vm.pagination().has_more() {
        let page = vm.pagination().page();
        vm.load_more().await;
        match vm.last_error() {
            Some(err) => println!("Page {} failed: {}", page, err),
            None => println!("Page {} loaded, {} comments", page, vm.comments().len()),
        }
        vm.clear_error();
    }

    if let Some(comment) = vm.add_comment("Count me in!") {
        println!("Posted comment {} (pending: {})", comment.id, vm.is_pending(comment.id));
        vm.remove_comment(comment.id);
    }
    println!("Final comment count: {}", vm.comments().len());

    vm.teardown();
    Ok(())
}
