//! The article record shared by the feed source, the cache and the renderer.
//!
//! `Item` is the normalised form of one post.  The feed source converts the
//! WordPress wire shape into it, the cache stores it as-is, and the template
//! generator reads it.
//!
//! ## For contributors
//!
//! The required fields (`title`, `link`, `excerpt`) are still `Option`s:
//! feeds do send posts without them, and deciding what to do about that is
//! the template generator's job, not the parser's.

use serde::{Deserialize, Serialize};

/// A single post, normalised from the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Rendered post title.
    pub title: Option<String>,

    /// Permalink to the full post.
    pub link: Option<String>,

    /// Pre-sanitized excerpt text.
    pub excerpt: Option<String>,

    /// Publish date as sent by the feed.
    #[serde(default)]
    pub publish_date: Option<String>,

    /// Post authors, in feed order.
    #[serde(default)]
    pub authors: Vec<Author>,
}

/// One author credit on a post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub display_name: Option<String>,

    /// Contributor slug used to build the profile link.
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// Treat empty strings the same as a missing field.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl Item {
    pub fn title(&self) -> Option<&str> {
        present(&self.title)
    }

    pub fn link(&self) -> Option<&str> {
        present(&self.link)
    }

    pub fn excerpt(&self) -> Option<&str> {
        present(&self.excerpt)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
