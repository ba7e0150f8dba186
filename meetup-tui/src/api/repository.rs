use async_trait::async_trait;
use meetup_types::{CommentPage, FeedDetail, PostId};

use super::FeedResult;

/// Source of feed data consumed by the feed detail engine.
///
/// Implementations perform the actual I/O; the engine only decides when to
/// call them and how to apply what comes back.
#[async_trait]
pub trait FeedRepository: Send + Sync {
    /// Fetch a post together with its first page of comments.
    ///
    /// Fails with `NotFound` when the post does not exist and `Network` on
    /// transport problems.
    async fn fetch_feed_detail(&self, post_id: PostId) -> FeedResult<FeedDetail>;

    /// Fetch comment page `page` (1-based; page 0 arrives with the detail).
    async fn fetch_comment_page(&self, post_id: PostId, page: u32) -> FeedResult<CommentPage>;
}
