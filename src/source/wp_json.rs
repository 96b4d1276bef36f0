//! WordPress REST posts source.
//!
//! Fetches `wp/v2/posts` over HTTP and converts the wire records into
//! [`Item`]s.  The parsing half is a pure function ([`parse_items`]) so tests
//! and the cache fallback can use it without touching the network.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::{Author, FeedSource, Item};
use crate::error::{Error, Result};

/// Posts endpoint of a WordPress site.
pub struct WpJsonSource {
    /// Endpoint URL; may already carry query parameters.
    pub url: String,
    client: reqwest::Client,
}

impl WpJsonSource {
    /// Create a source for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl FeedSource for WpJsonSource {
    fn name(&self) -> &str {
        &self.url
    }

    async fn fetch(&self, per_page: Option<u32>) -> Result<String> {
        let mut request = self.client.get(&self.url);
        if let Some(limit) = per_page {
            request = request.query(&[("per_page", limit)]);
        }

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!(url = %self.url, bytes = body.len(), "Fetched posts page");
        Ok(body)
    }
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct WirePost {
    #[serde(default)]
    title: Option<Rendered>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    excerpt: Option<Basic>,
    #[serde(default)]
    date: Option<String>,
    /// Plain WordPress sends a numeric author id here; only the expanded
    /// array form carries names.
    #[serde(default)]
    author: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct Rendered {
    #[serde(default)]
    rendered: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Basic {
    #[serde(default)]
    basic: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireAuthor {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    path: Option<String>,
}

impl From<WirePost> for Item {
    fn from(post: WirePost) -> Self {
        let authors = match post.author {
            serde_json::Value::Array(entries) => entries
                .into_iter()
                .filter_map(|entry| serde_json::from_value::<WireAuthor>(entry).ok())
                .map(|a| Author {
                    display_name: a.display_name,
                    profile_path: a.path,
                })
                .collect(),
            _ => Vec::new(),
        };

        Item {
            title: post.title.and_then(|t| t.rendered),
            link: post.link,
            excerpt: post.excerpt.and_then(|e| e.basic),
            publish_date: post.date,
            authors,
        }
    }
}

/// Parse a posts response body into items, preserving feed order.
pub fn parse_items(payload: &str) -> Result<Vec<Item>> {
    if payload.trim().is_empty() {
        return Err(Error::EmptyResponse);
    }
    let posts: Vec<WirePost> = serde_json::from_str(payload)?;
    Ok(posts.into_iter().map(Item::from).collect())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
