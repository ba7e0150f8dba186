//! Feed detail engine: one post, its image carousel, and an incrementally
//! loaded, locally mutable comment list.
//!
//! Nothing in here performs I/O. Fetches are described by pending handles
//! that the caller runs and whose completions it feeds back in.

pub mod carousel;
pub mod mutation;
pub mod paginator;
pub mod trigger;
pub mod view_model;

pub use carousel::{Carousel, SwipeOutcome, SwipeTracker};
pub use mutation::CommentLog;
pub use paginator::{CursorPaginator, PageOutcome, PageRequest};
pub use trigger::ProximityTrigger;
pub use view_model::{
    FeedDetailViewModel, LoadCompletion, PageCompletion, PendingLoad, PendingPage, Phase,
};

use std::time::Duration;

/// Tuning for one feed detail view
#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Highest comment page that will ever be requested
    pub page_ceiling: u32,
    pub max_comment_chars: usize,
    pub swipe_threshold: f32,
    pub proximity_threshold: f32,
    pub fetch_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_ceiling: 5,
            max_comment_chars: 280,
            swipe_threshold: 50.0,
            proximity_threshold: 0.1,
            fetch_timeout: Duration::from_secs(10),
        }
    }
}
