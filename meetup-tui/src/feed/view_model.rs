use meetup_types::{Author, Comment, CommentId, CommentPage, FeedDetail, Post, PostId};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use super::{
    Carousel, CommentLog, CursorPaginator, FeedConfig, PageOutcome, PageRequest,
    ProximityTrigger, SwipeTracker,
};
use crate::api::{FeedError, FeedRepository, FeedResult};
use crate::clock::Clock;
use crate::logging::LogConfig;

/// Lifecycle of a feed detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    Failed(FeedError),
}

/// Shared flag telling in-flight work whether its view-model still exists
#[derive(Debug, Clone)]
struct LiveToken(Arc<AtomicBool>);

impl LiveToken {
    fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    fn is_live(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn kill(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    fetch: impl Future<Output = FeedResult<T>>,
) -> FeedResult<T> {
    match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(FeedError::Network(format!(
            "request timed out after {} ms",
            timeout.as_millis()
        ))),
    }
}

/// The initial detail fetch, issued but not yet run
pub struct PendingLoad {
    instance: Uuid,
    attempt: u64,
    post_id: PostId,
    repository: Arc<dyn FeedRepository>,
    timeout: Duration,
    live: LiveToken,
}

impl PendingLoad {
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub async fn run(self) -> LoadCompletion {
        let result = with_timeout(self.timeout, self.repository.fetch_feed_detail(self.post_id)).await;
        LoadCompletion {
            instance: self.instance,
            attempt: self.attempt,
            result,
            live: self.live,
        }
    }
}

/// Outcome of a [`PendingLoad`], to be handed to [`FeedDetailViewModel::apply_load`]
pub struct LoadCompletion {
    instance: Uuid,
    attempt: u64,
    result: FeedResult<FeedDetail>,
    live: LiveToken,
}

impl LoadCompletion {
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    /// Whether the view-model that issued the load is still around
    pub fn is_live(&self) -> bool {
        self.live.is_live()
    }

    pub fn result(&self) -> &FeedResult<FeedDetail> {
        &self.result
    }
}

/// A comment page fetch, issued but not yet run
pub struct PendingPage {
    instance: Uuid,
    post_id: PostId,
    request: PageRequest,
    repository: Arc<dyn FeedRepository>,
    timeout: Duration,
    live: LiveToken,
}

impl PendingPage {
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub fn page(&self) -> u32 {
        self.request.page
    }

    pub async fn run(self) -> PageCompletion {
        let result = with_timeout(
            self.timeout,
            self.repository.fetch_comment_page(self.post_id, self.request.page),
        )
        .await;
        PageCompletion {
            instance: self.instance,
            request: self.request,
            result,
            live: self.live,
        }
    }
}

/// Outcome of a [`PendingPage`], to be handed to [`FeedDetailViewModel::apply_page`]
pub struct PageCompletion {
    instance: Uuid,
    request: PageRequest,
    result: FeedResult<CommentPage>,
    live: LiveToken,
}

impl PageCompletion {
    pub fn instance(&self) -> Uuid {
        self.instance
    }

    pub fn page(&self) -> u32 {
        self.request.page
    }

    pub fn is_live(&self) -> bool {
        self.live.is_live()
    }
}

/// State and operations behind the feed detail screen.
///
/// Carousel and comment operations are accepted only in [`Phase::Ready`];
/// in any other phase they do nothing. No method performs I/O: fetches are
/// returned as pending handles whose completions come back through
/// [`apply_load`](Self::apply_load) and [`apply_page`](Self::apply_page).
pub struct FeedDetailViewModel {
    instance: Uuid,
    post_id: PostId,
    repository: Arc<dyn FeedRepository>,
    clock: Arc<dyn Clock>,
    viewer: Author,
    config: FeedConfig,
    log_config: LogConfig,
    phase: Phase,
    post: Option<Post>,
    comments: CommentLog,
    paginator: CursorPaginator,
    carousel: Carousel,
    swipe: SwipeTracker,
    trigger: ProximityTrigger,
    last_error: Option<FeedError>,
    load_attempt: u64,
    live: LiveToken,
}

impl FeedDetailViewModel {
    pub fn new(
        post_id: PostId,
        repository: Arc<dyn FeedRepository>,
        clock: Arc<dyn Clock>,
        viewer: Author,
        config: FeedConfig,
    ) -> Self {
        Self {
            instance: Uuid::new_v4(),
            post_id,
            repository,
            clock,
            viewer,
            comments: CommentLog::new(config.max_comment_chars),
            paginator: CursorPaginator::new(config.page_ceiling),
            carousel: Carousel::default(),
            swipe: SwipeTracker::new(config.swipe_threshold),
            trigger: ProximityTrigger::new(config.proximity_threshold),
            config,
            log_config: LogConfig::disabled(),
            phase: Phase::Idle,
            post: None,
            last_error: None,
            load_attempt: 0,
            live: LiveToken::new(),
        }
    }

    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_ready(&self) -> bool {
        self.phase == Phase::Ready
    }

    pub fn is_live(&self) -> bool {
        self.live.is_live()
    }

    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        self.comments.entries()
    }

    pub fn is_pending(&self, id: CommentId) -> bool {
        self.comments.is_pending(id)
    }

    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    pub fn pagination(&self) -> &CursorPaginator {
        &self.paginator
    }

    pub fn trigger(&self) -> &ProximityTrigger {
        &self.trigger
    }

    /// Most recent non-blocking problem (pagination failure, rejected comment)
    pub fn last_error(&self) -> Option<&FeedError> {
        self.last_error.as_ref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    // Loading

    /// Issue the initial fetch. Only valid from `Idle`.
    pub fn begin_load(&mut self) -> Option<PendingLoad> {
        if self.phase != Phase::Idle || !self.is_live() {
            return None;
        }
        self.phase = Phase::Loading;
        self.load_attempt += 1;
        log::info!("Loading feed detail for post {}", self.post_id);
        Some(PendingLoad {
            instance: self.instance,
            attempt: self.load_attempt,
            post_id: self.post_id,
            repository: Arc::clone(&self.repository),
            timeout: self.config.fetch_timeout,
            live: self.live.clone(),
        })
    }

    /// Re-issue the initial fetch after a transient failure
    pub fn retry(&mut self) -> Option<PendingLoad> {
        match &self.phase {
            Phase::Failed(err) if err.is_transient() => {
                self.phase = Phase::Idle;
                self.begin_load()
            }
            _ => None,
        }
    }

    /// Apply the initial fetch result. Returns whether anything changed.
    pub fn apply_load(&mut self, completion: LoadCompletion) -> bool {
        if completion.instance != self.instance
            || !self.is_live()
            || self.phase != Phase::Loading
            || completion.attempt != self.load_attempt
        {
            log::debug!(
                "Discarding load completion for instance {} (current {})",
                completion.instance,
                self.instance
            );
            return false;
        }

        match completion.result {
            Ok(detail) => {
                let FeedDetail { mut post, first_page } = detail;
                let first_page_terminal = first_page.is_terminal;

                self.comments = CommentLog::with_entries(first_page.entries, self.config.max_comment_chars);
                post.comment_count = self.comments.len() as u32;

                self.paginator = CursorPaginator::new(self.config.page_ceiling);
                if first_page_terminal {
                    self.paginator.exhaust();
                }
                self.carousel = Carousel::new(post.images.len());
                self.swipe.cancel();
                self.trigger.rearm();

                log::info!(
                    "Post {} ready: {} images, {} comments, more={}",
                    post.id,
                    post.images.len(),
                    self.comments.len(),
                    self.paginator.has_more()
                );
                self.post = Some(post);
                self.phase = Phase::Ready;
            }
            Err(err) => {
                log::warn!("Failed to load post {}: {}", self.post_id, err);
                self.phase = Phase::Failed(err);
            }
        }
        true
    }

    /// Issue, run and apply the initial fetch
    pub async fn load(&mut self) {
        if let Some(pending) = self.begin_load() {
            let completion = pending.run().await;
            self.apply_load(completion);
        }
    }

    // Carousel

    pub fn next_image(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        let moved = self.carousel.next();
        log_carousel!(self.log_config, "next -> {}", self.carousel.index());
        moved
    }

    pub fn prev_image(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        let moved = self.carousel.prev();
        log_carousel!(self.log_config, "prev -> {}", self.carousel.index());
        moved
    }

    pub fn goto_image(&mut self, index: usize) -> bool {
        if !self.is_ready() {
            return false;
        }
        let moved = self.carousel.goto(index);
        log_carousel!(self.log_config, "goto {} -> {}", index, self.carousel.index());
        moved
    }

    /// Gesture start at horizontal position `x`
    pub fn swipe_start(&mut self, x: f32) {
        if self.is_ready() && self.carousel.is_navigable() {
            self.swipe.start(x);
        }
    }

    /// Gesture end at horizontal position `x`; returns whether the image changed
    pub fn swipe_end(&mut self, x: f32) -> bool {
        if !self.is_ready() {
            self.swipe.cancel();
            return false;
        }
        let outcome = self.swipe.end(x);
        let moved = self.carousel.apply(outcome);
        log_carousel!(self.log_config, "swipe {:?} -> {}", outcome, self.carousel.index());
        moved
    }

    // Post and comments

    pub fn toggle_like(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        let Some(post) = self.post.as_mut() else {
            return false;
        };
        post.liked = !post.liked;
        post.like_count = if post.liked {
            post.like_count.saturating_add(1)
        } else {
            post.like_count.saturating_sub(1)
        };
        true
    }

    /// Append a local comment by the viewer. Blank or overlong text is
    /// rejected and reported through [`last_error`](Self::last_error).
    pub fn add_comment(&mut self, text: &str) -> Option<Comment> {
        if !self.is_ready() {
            return None;
        }
        match self.comments.insert(text, self.viewer.clone(), self.clock.now()) {
            Ok(comment) => {
                if let Some(post) = self.post.as_mut() {
                    post.comment_count += 1;
                }
                log_mutation!(self.log_config, "inserted local comment {}", comment.id);
                self.last_error = None;
                self.debug_check_counts();
                Some(comment)
            }
            Err(err) => {
                log_mutation!(self.log_config, "rejected comment: {}", err);
                self.last_error = Some(err);
                None
            }
        }
    }

    pub fn remove_comment(&mut self, id: CommentId) -> bool {
        if !self.is_ready() {
            return false;
        }
        if self.comments.remove(id).is_none() {
            return false;
        }
        if let Some(post) = self.post.as_mut() {
            post.comment_count = post.comment_count.saturating_sub(1);
        }
        log_mutation!(self.log_config, "removed comment {}", id);
        self.debug_check_counts();
        true
    }

    /// Swap pending local comment `local_id` for the server's confirmed copy
    pub fn confirm_comment(&mut self, local_id: CommentId, confirmed: Comment) -> bool {
        if !self.is_ready() {
            return false;
        }
        let confirmed_id = confirmed.id;
        let replaced = self.comments.confirm(local_id, confirmed);
        if replaced {
            log_mutation!(self.log_config, "confirmed {} as {}", local_id, confirmed_id);
        }
        replaced
    }

    // Pagination

    /// The sentinel came into view: request the next page if allowed
    pub fn on_scroll_sentinel_visible(&mut self) -> Option<PendingPage> {
        if !self.is_ready() || !self.is_live() {
            return None;
        }
        let request = self.paginator.begin()?;
        log_pagination!(self.log_config, "requesting page {} of post {}", request.page, self.post_id);
        Some(PendingPage {
            instance: self.instance,
            post_id: self.post_id,
            request,
            repository: Arc::clone(&self.repository),
            timeout: self.config.fetch_timeout,
            live: self.live.clone(),
        })
    }

    /// Report the sentinel's visible fraction after a render
    pub fn on_sentinel_visibility(&mut self, visible_ratio: f32) -> Option<PendingPage> {
        if !self.is_ready() {
            return None;
        }
        if self.trigger.observe(visible_ratio) {
            self.on_scroll_sentinel_visible()
        } else {
            None
        }
    }

    pub fn rearm_sentinel(&mut self) {
        self.trigger.rearm();
    }

    /// Apply a comment page result. Returns whether anything changed.
    pub fn apply_page(&mut self, completion: PageCompletion) -> bool {
        if completion.instance != self.instance || !self.is_live() || !self.is_ready() {
            log::debug!(
                "Discarding page {} completion for instance {} (current {})",
                completion.request.page,
                completion.instance,
                self.instance
            );
            return false;
        }

        match self.paginator.finish(completion.request, completion.result) {
            PageOutcome::Appended(entries) => {
                let added = self.comments.append_page(entries);
                if let Some(post) = self.post.as_mut() {
                    post.comment_count += added as u32;
                }
                log_pagination!(
                    self.log_config,
                    "page {} appended {} comments, more={}",
                    completion.request.page,
                    added,
                    self.paginator.has_more()
                );
                if matches!(self.last_error, Some(FeedError::Network(_))) {
                    self.last_error = None;
                }
                self.debug_check_counts();
                true
            }
            PageOutcome::Failed(err) => {
                log::warn!(
                    "Loading page {} of post {} failed: {}",
                    completion.request.page,
                    self.post_id,
                    err
                );
                self.last_error = Some(err);
                true
            }
            PageOutcome::Stale => {
                log::debug!("Ignoring stale page {} completion", completion.request.page);
                false
            }
        }
    }

    /// Issue, run and apply the next page fetch, if one is allowed
    pub async fn load_more(&mut self) -> bool {
        match self.on_scroll_sentinel_visible() {
            Some(pending) => {
                let completion = pending.run().await;
                self.apply_page(completion)
            }
            None => false,
        }
    }

    // Teardown

    /// Detach from the view: stop observing and make every in-flight
    /// completion a no-op. Idempotent.
    pub fn teardown(&mut self) {
        if !self.is_live() {
            return;
        }
        self.live.kill();
        self.trigger.disconnect();
        self.swipe.cancel();
        log::debug!("Feed detail {} for post {} torn down", self.instance, self.post_id);
    }

    fn debug_check_counts(&self) {
        if let Some(post) = &self.post {
            debug_assert_eq!(post.comment_count as usize, self.comments.len());
        }
    }
}

impl Drop for FeedDetailViewModel {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use meetup_types::ImageRef;
    use proptest::prelude::*;
    use std::sync::atomic::AtomicUsize;

    fn start() -> DateTime<Utc> {
        "2024-05-01T10:00:00Z".parse().unwrap()
    }

    fn author(name: &str) -> Author {
        Author {
            id: Uuid::nil(),
            nickname: name.to_string(),
            avatar: None,
        }
    }

    fn comment(id: u64) -> Comment {
        Comment {
            id: CommentId(id),
            author: author("joon"),
            body: format!("comment {}", id),
            created_at: start(),
            is_mine: false,
        }
    }

    /// Serves a fixed detail and pages of two comments each
    struct StaticRepository {
        images: usize,
        first_page: usize,
        last_page: u32,
        page_calls: AtomicUsize,
    }

    impl StaticRepository {
        fn new(images: usize, first_page: usize) -> Self {
            Self {
                images,
                first_page,
                last_page: 100,
                page_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedRepository for StaticRepository {
        async fn fetch_feed_detail(&self, post_id: PostId) -> FeedResult<FeedDetail> {
            Ok(FeedDetail {
                post: Post {
                    id: post_id,
                    author: author("host"),
                    content: "Picnic".to_string(),
                    images: (0..self.images)
                        .map(|i| ImageRef::new(format!("img{}.jpg", i)))
                        .collect(),
                    like_count: 3,
                    comment_count: 999,
                    is_mine: false,
                    liked: false,
                    created_at: start(),
                },
                first_page: CommentPage {
                    entries: (1..=self.first_page as u64).map(comment).collect(),
                    is_terminal: false,
                },
            })
        }

        async fn fetch_comment_page(&self, _post_id: PostId, page: u32) -> FeedResult<CommentPage> {
            self.page_calls.fetch_add(1, Ordering::SeqCst);
            let base = 1000 * u64::from(page);
            Ok(CommentPage {
                entries: vec![comment(base + 1), comment(base + 2)],
                is_terminal: page >= self.last_page,
            })
        }
    }

    fn view_model(repo: StaticRepository) -> FeedDetailViewModel {
        FeedDetailViewModel::new(
            PostId(1),
            Arc::new(repo),
            Arc::new(ManualClock::new(start())),
            author("me"),
            FeedConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_load_normalizes_comment_count() {
        let mut vm = view_model(StaticRepository::new(3, 8));
        assert_eq!(vm.phase(), &Phase::Idle);
        vm.load().await;

        assert!(vm.is_ready());
        assert_eq!(vm.post().unwrap().comment_count, 8);
        assert_eq!(vm.carousel().image_count(), 3);
        assert!(vm.pagination().has_more());
    }

    #[tokio::test]
    async fn test_operations_are_ignored_before_ready() {
        let mut vm = view_model(StaticRepository::new(3, 8));
        assert!(!vm.next_image());
        assert!(vm.add_comment("hi").is_none());
        assert!(!vm.remove_comment(CommentId(1)));
        assert!(!vm.toggle_like());
        assert!(vm.on_scroll_sentinel_visible().is_none());

        let _pending = vm.begin_load().unwrap();
        assert_eq!(vm.phase(), &Phase::Loading);
        assert!(!vm.next_image());
        assert!(vm.add_comment("hi").is_none());
        assert!(vm.begin_load().is_none());
    }

    #[tokio::test]
    async fn test_add_then_remove_restores_count() {
        let mut vm = view_model(StaticRepository::new(3, 8));
        vm.load().await;

        let added = vm.add_comment("hi").unwrap();
        assert_eq!(vm.post().unwrap().comment_count, 9);
        assert_eq!(added.created_at, start());
        assert!(vm.is_pending(added.id));

        assert!(vm.remove_comment(added.id));
        assert_eq!(vm.post().unwrap().comment_count, 8);
        assert_eq!(vm.comments().len(), 8);
    }

    #[tokio::test]
    async fn test_blank_comment_sets_validation_error() {
        let mut vm = view_model(StaticRepository::new(0, 2));
        vm.load().await;

        assert!(vm.add_comment("").is_none());
        assert!(vm.add_comment("   ").is_none());
        assert_eq!(vm.comments().len(), 2);
        assert!(matches!(vm.last_error(), Some(FeedError::Validation(_))));
    }

    #[tokio::test]
    async fn test_toggle_like_round_trip() {
        let mut vm = view_model(StaticRepository::new(0, 0));
        vm.load().await;

        assert!(vm.toggle_like());
        assert!(vm.post().unwrap().liked);
        assert_eq!(vm.post().unwrap().like_count, 4);
        assert!(vm.toggle_like());
        assert_eq!(vm.post().unwrap().like_count, 3);
    }

    #[tokio::test]
    async fn test_sentinel_drives_paging_until_ceiling() {
        let mut vm = view_model(StaticRepository::new(1, 8));
        vm.load().await;

        for _ in 0..5 {
            vm.rearm_sentinel();
            let pending = vm.on_sentinel_visibility(1.0).expect("page request");
            let completion = pending.run().await;
            assert!(vm.apply_page(completion));
        }

        assert!(!vm.pagination().has_more());
        assert_eq!(vm.comments().len(), 8 + 5 * 2);
        assert_eq!(vm.post().unwrap().comment_count, 18);

        vm.rearm_sentinel();
        assert!(vm.on_sentinel_visibility(1.0).is_none());
        assert!(!vm.load_more().await);
    }

    #[tokio::test]
    async fn test_swipe_requires_ready_and_images() {
        let mut vm = view_model(StaticRepository::new(3, 0));
        vm.swipe_start(100.0);
        assert!(!vm.swipe_end(0.0));

        vm.load().await;
        vm.swipe_start(100.0);
        assert!(vm.swipe_end(40.0));
        assert_eq!(vm.carousel().index(), 1);
    }

    #[tokio::test]
    async fn test_drop_kills_pending_work() {
        let mut vm = view_model(StaticRepository::new(1, 1));
        vm.load().await;
        let pending = vm.on_scroll_sentinel_visible().unwrap();
        drop(vm);

        let completion = pending.run().await;
        assert!(!completion.is_live());
    }

    proptest! {
        #[test]
        fn prop_comment_count_tracks_live_comments(
            ops in proptest::collection::vec((0u8..3, 0u64..20), 0..40)
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            runtime.block_on(async {
                let mut vm = view_model(StaticRepository::new(2, 8));
                vm.load().await;
                for (op, arg) in ops {
                    match op {
                        0 => { vm.add_comment(&format!("note {}", arg)); }
                        1 => {
                            let target = vm.comments().get(arg as usize % vm.comments().len().max(1)).map(|c| c.id);
                            if let Some(id) = target {
                                vm.remove_comment(id);
                            }
                        }
                        _ => { vm.load_more().await; }
                    }
                    assert_eq!(vm.post().unwrap().comment_count as usize, vm.comments().len());
                }
            });
        }
    }
}
