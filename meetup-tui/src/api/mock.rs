use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use meetup_types::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use super::{FeedError, FeedRepository, FeedResult};
use crate::clock::Clock;

const NICKNAMES: &[&str] = &["mina", "joon", "haru", "sora", "daniel", "yuna", "theo", "lea"];

const PHRASES: &[&str] = &[
    "Count me in!",
    "What time does it start?",
    "Is there parking nearby?",
    "Great photos, thanks for sharing",
    "I'll bring snacks",
    "Can I bring a friend?",
    "See you all there",
    "Last one was so much fun",
    "Running ten minutes late, save me a seat",
    "Where do we meet exactly?",
];

const POST_BODIES: &[&str] = &[
    "Saturday morning hike up the ridge trail. Beginners welcome!",
    "Board game night at the corner cafe, bring your favourites.",
    "Photo walk along the river this Sunday.",
    "Language exchange meetup: Korean / English / Japanese.",
];

/// Tuning knobs for the in-process repository
#[derive(Debug, Clone)]
pub struct MockOptions {
    pub seed: u64,
    /// Simulated round-trip time for every call
    pub latency: Duration,
    /// Comments per page, including the first page
    pub page_size: usize,
    /// Highest page number that exists; that page is terminal
    pub total_pages: u32,
    /// The viewer; comments by this author are marked as mine
    pub viewer: Author,
    /// Pages whose next request fails once with a network error
    pub fail_pages_once: HashSet<u32>,
    /// Posts that do not exist
    pub missing_posts: HashSet<PostId>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            latency: Duration::from_millis(400),
            page_size: 8,
            total_pages: 8,
            viewer: Author {
                id: Uuid::nil(),
                nickname: "me".to_string(),
                avatar: None,
            },
            fail_pages_once: HashSet::new(),
            missing_posts: HashSet::new(),
        }
    }
}

/// Repository that fabricates deterministic feed data in process
pub struct MockFeedRepository {
    options: MockOptions,
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
    fail_pages_once: Mutex<HashSet<u32>>,
    detail_calls: AtomicUsize,
    page_calls: AtomicUsize,
}

impl MockFeedRepository {
    pub fn new(options: MockOptions, clock: Arc<dyn Clock>) -> Self {
        let rng = StdRng::seed_from_u64(options.seed);
        let fail_pages_once = options.fail_pages_once.clone();
        Self {
            options,
            clock,
            rng: Mutex::new(rng),
            fail_pages_once: Mutex::new(fail_pages_once),
            detail_calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
        }
    }

    /// Number of `fetch_feed_detail` calls served so far
    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_comment_page` calls served so far
    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.options.latency.is_zero() {
            tokio::time::sleep(self.options.latency).await;
        }
    }

    fn author(&self, rng: &mut StdRng) -> Author {
        // Roughly one comment in five is the viewer's own
        if rng.gen_bool(0.2) {
            return self.options.viewer.clone();
        }
        let nickname = NICKNAMES.choose(rng).copied().unwrap_or("guest");
        Author {
            id: Uuid::from_u128(rng.gen()),
            nickname: nickname.to_string(),
            avatar: None,
        }
    }

    fn generate_page(&self, page: u32) -> CommentPage {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();
        let size = self.options.page_size;
        let first_id = u64::from(page) * size as u64 + 1;

        let entries = (0..size)
            .map(|offset| {
                let author = self.author(&mut rng);
                let is_mine = author.id == self.options.viewer.id;
                let body = PHRASES.choose(&mut *rng).copied().unwrap_or("+1");
                Comment {
                    id: CommentId(first_id + offset as u64),
                    author,
                    body: body.to_string(),
                    created_at: now - ChronoDuration::minutes(rng.gen_range(1..=600)),
                    is_mine,
                }
            })
            .collect();

        CommentPage {
            entries,
            is_terminal: page >= self.options.total_pages,
        }
    }

    fn generate_post(&self, post_id: PostId, comment_count: u32) -> Post {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        let image_count = rng.gen_range(0..=4);
        let images = (0..image_count)
            .map(|i| ImageRef {
                url: format!("https://img.meetup.example/posts/{}/{}.jpg", post_id, i + 1),
                alt: Some(format!("Photo {}", i + 1)),
            })
            .collect();
        let nickname = NICKNAMES.choose(&mut *rng).copied().unwrap_or("host");
        let content = POST_BODIES.choose(&mut *rng).copied().unwrap_or("");

        Post {
            id: post_id,
            author: Author {
                id: Uuid::from_u128(rng.gen()),
                nickname: nickname.to_string(),
                avatar: None,
            },
            content: content.to_string(),
            images,
            like_count: rng.gen_range(0..200),
            comment_count,
            is_mine: false,
            liked: rng.gen_bool(0.3),
            created_at: self.clock.now() - ChronoDuration::hours(rng.gen_range(1..=72)),
        }
    }
}

#[async_trait]
impl FeedRepository for MockFeedRepository {
    async fn fetch_feed_detail(&self, post_id: PostId) -> FeedResult<FeedDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.options.missing_posts.contains(&post_id) {
            log::info!("mock: post {} does not exist", post_id);
            return Err(FeedError::NotFound(format!("post {}", post_id)));
        }

        let first_page = self.generate_page(0);
        let post = self.generate_post(post_id, first_page.entries.len() as u32);
        Ok(FeedDetail { post, first_page })
    }

    async fn fetch_comment_page(&self, post_id: PostId, page: u32) -> FeedResult<CommentPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let injected = self
            .fail_pages_once
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&page);
        if injected {
            log::info!("mock: injecting failure for post {} page {}", post_id, page);
            return Err(FeedError::Network(format!("connection reset on page {}", page)));
        }

        if page > self.options.total_pages {
            return Ok(CommentPage {
                entries: Vec::new(),
                is_terminal: true,
            });
        }
        Ok(self.generate_page(page))
    }
}
