use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl FeedError {
    /// Whether retrying the same request can succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::Network(_))
    }
}

pub type FeedResult<T> = Result<T, FeedError>;
