//! Per-article markup generation.
//!
//! [`TemplateGenerator::generate`] is a pure function of its input: the same
//! [`Item`] always produces byte-identical markup, which is what lets the
//! renderer detect changes by plain string comparison.

use crate::format::format_date;
use crate::source::{present, Author, Item};

/// Which required field a non-renderable item was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Title,
    Link,
}

/// Result of generating one article block.
///
/// `Empty` and `NonRenderable` are different on purpose: a post without an
/// excerpt is a well-formed record with nothing to show, while a post without
/// a title or link is not an article at all.  The renderer drops both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Markup(String),
    Empty,
    NonRenderable(Missing),
}

impl Fragment {
    /// The markup this fragment adds to the posts container, if any.
    pub fn markup(&self) -> Option<&str> {
        match self {
            Fragment::Markup(markup) if !markup.is_empty() => Some(markup),
            _ => None,
        }
    }
}

/// Builds the article block for one post.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    /// Site root that contributor profile paths hang off.
    site_url: String,
}

impl TemplateGenerator {
    pub fn new(site_url: impl Into<String>) -> Self {
        let site_url: String = site_url.into();
        Self {
            site_url: site_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn generate(&self, item: &Item) -> Fragment {
        let Some(title) = item.title() else {
            return Fragment::NonRenderable(Missing::Title);
        };
        let Some(link) = item.link() else {
            return Fragment::NonRenderable(Missing::Link);
        };
        let Some(excerpt) = item.excerpt() else {
            return Fragment::Empty;
        };

        let mut block = format!(
            r#"<h3 class="wpc-blog__title"><a href="{}">{title}</a></h3>"#,
            attr(link)
        );

        let mut meta = String::new();

        if let Some(date) = item.publish_date.as_deref() {
            let formatted = format_date(date);
            if !formatted.is_empty() {
                meta.push_str(&format!(
                    r#"<li class="wpc-meta__item wpc-meta__item--date">{formatted}</li>"#
                ));
            }
        }

        if !item.authors.is_empty() {
            let authors: String = item.authors.iter().map(|a| self.author(a)).collect();
            meta.push_str(&format!(
                r#"<li class="wpc-meta__item wpc-meta__item--author"><span class="wpc-meta__label">By</span><ul>{authors}</ul></li>"#
            ));
        }

        if !meta.is_empty() {
            block.push_str(&format!(
                r#"<ul class="wpc-meta wpc-article__meta wpc-blog__meta">{meta}</ul>"#
            ));
        }

        block.push_str(&format!(
            r#"<div class="wpc-blog__excerpt"><p>{excerpt}</p></div>"#
        ));

        Fragment::Markup(format!(r#"<div class="wpc-blog__post">{block}</div>"#))
    }

    fn author(&self, author: &Author) -> String {
        let name = present(&author.display_name).unwrap_or_default();
        match present(&author.profile_path) {
            Some(path) => format!(
                r#"<li><a href="{}/about/contributors/{}/">{name}</a></li>"#,
                self.site_url,
                attr(path)
            ),
            None if name.is_empty() => String::new(),
            None => format!("<li>{name}</li>"),
        }
    }
}

/// Keep attribute values from breaking out of their quotes.
fn attr(value: &str) -> String {
    value.replace('"', "&quot;")
}
