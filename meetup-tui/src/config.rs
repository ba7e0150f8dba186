use anyhow::Context;
use config::{Config, ConfigError, Environment, File};
use meetup_types::Author;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use crate::api::MockOptions;
use crate::feed::FeedConfig;

const CONFIG_FILE_NAME: &str = "meetup.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    /// Highest comment page the client will request
    pub page_ceiling: u32,
    pub max_comment_chars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CarouselSettings {
    /// Horizontal distance a drag must exceed to count as a swipe
    pub swipe_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScrollSettings {
    /// Visible fraction of the sentinel that counts as "visible"
    pub proximity_threshold: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchSettings {
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MockSettings {
    pub latency_ms: u64,
    pub page_size: usize,
    pub total_pages: u32,
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewerSettings {
    pub id: String,
    pub nickname: String,
}

/// Client settings.
///
/// Layered as: built-in defaults, then `meetup.toml` in the working
/// directory, then `~/.meetup/config.toml` (or an explicit path), then
/// `MEETUP_<SECTION>__<KEY>` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub feed: FeedSettings,
    pub carousel: CarouselSettings,
    pub scroll: ScrollSettings,
    pub fetch: FetchSettings,
    pub mock: MockSettings,
    pub viewer: ViewerSettings,
}

impl Settings {
    /// Load settings, optionally from an explicit file instead of the home config
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Self::with_defaults(Config::builder())?;

        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            builder = builder.add_source(File::from(local).required(false));
        }

        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()).required(true));
            }
            None => {
                if let Some(home) = home_config_path() {
                    builder = builder.add_source(File::from(home).required(false));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("MEETUP")
                .prefix_separator("_")
                .separator("__"),
        );

        builder.build()?.try_deserialize()
    }

    /// Load settings from exactly one file on top of the defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::with_defaults(Config::builder())?
            .add_source(File::from(path.to_path_buf()).required(true))
            .build()?
            .try_deserialize()
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("feed.page_ceiling", 5)?
            .set_default("feed.max_comment_chars", 280)?
            .set_default("carousel.swipe_threshold", 50.0)?
            .set_default("scroll.proximity_threshold", 0.1)?
            .set_default("fetch.timeout_ms", 10_000)?
            .set_default("mock.latency_ms", 400)?
            .set_default("mock.page_size", 8)?
            .set_default("mock.total_pages", 8)?
            .set_default("mock.seed", 42)?
            .set_default("viewer.id", Uuid::nil().to_string())?
            .set_default("viewer.nickname", "me")
    }

    /// Engine tuning derived from these settings
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            page_ceiling: self.feed.page_ceiling,
            max_comment_chars: self.feed.max_comment_chars,
            swipe_threshold: self.carousel.swipe_threshold,
            proximity_threshold: self.scroll.proximity_threshold,
            fetch_timeout: Duration::from_millis(self.fetch.timeout_ms),
        }
    }

    /// The signed-in user, as an author of comments
    pub fn viewer(&self) -> anyhow::Result<Author> {
        let id = Uuid::parse_str(&self.viewer.id)
            .with_context(|| format!("Invalid viewer.id '{}'", self.viewer.id))?;
        Ok(Author {
            id,
            nickname: self.viewer.nickname.clone(),
            avatar: None,
        })
    }

    /// Options for the in-process repository
    pub fn mock_options(&self) -> anyhow::Result<MockOptions> {
        Ok(MockOptions {
            seed: self.mock.seed,
            latency: Duration::from_millis(self.mock.latency_ms),
            page_size: self.mock.page_size,
            total_pages: self.mock.total_pages,
            viewer: self.viewer()?,
            ..Default::default()
        })
    }
}

/// `~/.meetup/config.toml`, if a home directory can be determined
pub fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".meetup").join("config.toml"))
}
