//! Feed source abstraction layer.
//!
//! This module defines the [`FeedSource`] trait and the common [`Item`]
//! type.  The concrete network implementation lives in [`wp_json`].
//!
//! ## For contributors — adding a new source
//!
//! 1. Create a new file in this directory (e.g. `json_feed.rs`).
//! 2. Define a struct and implement [`FeedSource`] for it.  `fetch()` returns
//!    the raw payload; [`parse_items`] turns it into [`Item`]s.
//! 3. Add `mod json_feed;` below and re-export your struct.
//! 4. Construct an instance in `main.rs` instead of `WpJsonSource`.

mod feed_item;
mod wp_json;

pub use feed_item::{Author, Item};
pub(crate) use feed_item::present;
pub use wp_json::{parse_items, WpJsonSource};

use async_trait::async_trait;

use crate::error::Result;

/// The network collaborator: fetches one page of posts.
///
/// The scheduler calls [`fetch()`](FeedSource::fetch) once per tick and never
/// cancels it; timeouts are the implementation's business.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable label used in log lines.
    fn name(&self) -> &str;

    /// Request a page of posts, optionally bounded to `per_page` entries, and
    /// return the response body untouched.
    async fn fetch(&self, per_page: Option<u32>) -> Result<String>;
}
