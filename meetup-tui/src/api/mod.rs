mod error;
mod mock;
mod repository;

pub use error::{FeedError, FeedResult};
pub use mock::{MockFeedRepository, MockOptions};
pub use repository::FeedRepository;
