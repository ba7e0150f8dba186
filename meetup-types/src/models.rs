use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ids::{CommentId, PostId};

// Timestamps travel as RFC3339 strings
mod datetime_format {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&date.to_rfc3339())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<DateTime<Utc>>().map_err(serde::de::Error::custom)
    }
}

/// Reference to one image attached to a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            alt: None,
        }
    }

    /// Text shown in place of the image
    pub fn label(&self) -> &str {
        self.alt.as_deref().unwrap_or(&self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub nickname: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub author: Author,
    pub content: String,
    /// Images in display order, possibly empty
    #[serde(default)]
    pub images: Vec<ImageRef>,
    pub like_count: u32,
    /// Number of live comments; maintained locally after the initial load
    pub comment_count: u32,
    /// Whether the viewer wrote this post
    #[serde(default)]
    pub is_mine: bool,
    /// Whether the viewer has liked this post
    #[serde(default)]
    pub liked: bool,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub author: Author,
    pub body: String,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    /// Whether the viewer wrote this comment (gates the delete action)
    #[serde(default)]
    pub is_mine: bool,
}

/// One page of comments as returned by the feed collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentPage {
    pub entries: Vec<Comment>,
    /// No further pages exist after this one
    pub is_terminal: bool,
}

/// Result of the initial detail fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedDetail {
    pub post: Post,
    pub first_page: CommentPage,
}
