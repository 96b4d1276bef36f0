//! Widget configuration with layered loading.
//!
//! Loading precedence (highest wins):
//! 1. The first command-line argument, taken as the feed URL
//! 2. Environment variables (`WPC_BLOG_*`)
//! 3. TOML config file (if `WPC_BLOG_CONFIG_FILE` is set)
//! 4. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Display format of the post list.  Both formats currently render the same
/// article blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostFormat {
    List,
    #[default]
    Excerpt,
}

impl PostFormat {
    /// Parse a format name, falling back to the default for unknown values.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" => PostFormat::List,
            _ => PostFormat::Excerpt,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Posts endpoint; `per_page` is appended when a limit is set.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Site root that author profile links are built on.
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// `list` or `excerpt`; anything else means `excerpt`.
    #[serde(default)]
    pub format: String,

    /// Number of posts to show.  Missing or non-positive shows the whole page.
    #[serde(default)]
    pub limit: Option<i64>,

    /// Ticks before polling halts.  Missing or non-positive uses the default.
    #[serde(default)]
    pub poll_ceiling: Option<i64>,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Cached posts older than this are not used for the warm start.
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,

    /// File the widget markup is mirrored to.
    #[serde(default)]
    pub output_path: Option<PathBuf>,

    #[serde(default = "default_loading_delay_ms")]
    pub loading_delay_ms: u64,

    #[serde(default = "default_fade_ms")]
    pub fade_ms: u64,
}

fn default_feed_url() -> String {
    "https://wpcampus.org/wp-json/wp/v2/posts?get_meta=1".into()
}

fn default_site_url() -> String {
    "https://wpcampus.org".into()
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_request_timeout_secs() -> u64 {
    20
}

fn default_cache_path() -> PathBuf {
    PathBuf::from("./wpc-blog-cache.json")
}

fn default_cache_max_age_secs() -> u64 {
    3600
}

fn default_loading_delay_ms() -> u64 {
    200
}

fn default_fade_ms() -> u64 {
    300
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            site_url: default_site_url(),
            format: "excerpt".into(),
            limit: None,
            poll_ceiling: None,
            poll_interval_secs: default_poll_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            cache_path: default_cache_path(),
            cache_max_age_secs: default_cache_max_age_secs(),
            output_path: None,
            loading_delay_ms: default_loading_delay_ms(),
            fade_ms: default_fade_ms(),
        }
    }
}

impl WidgetConfig {
    /// Load configuration from defaults, the optional TOML file and the
    /// environment, then apply a feed URL given on the command line.
    pub fn load(feed_url_arg: Option<String>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WPC_BLOG_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(Env::prefixed("WPC_BLOG_").ignore(&["config_file"]));

        let mut config: Self = figment
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;

        if let Some(url) = feed_url_arg {
            config.feed_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.feed_url.trim().is_empty() {
            return Err(Error::Config("feed_url must not be empty".into()));
        }
        if self.poll_interval_secs == 0 {
            return Err(Error::Config("poll_interval_secs must be positive".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".into()));
        }
        Ok(())
    }

    pub fn format(&self) -> PostFormat {
        PostFormat::parse(&self.format)
    }

    /// Positive display limit, if any.
    pub fn display_limit(&self) -> Option<usize> {
        self.limit
            .filter(|&l| l > 0)
            .and_then(|l| usize::try_from(l).ok())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_secs)
    }

    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.loading_delay_ms)
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.fade_ms)
    }
}
