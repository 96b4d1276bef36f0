//! Content rendering and change detection.
//!
//! [`ContentRenderer`] owns what the hosting surface displays.  Each call to
//! [`render`](ContentRenderer::render) regenerates the posts markup and then
//! takes one of three paths:
//!
//! ```text
//!  surface empty ───────────────► paint directly (+ loading flash)   Painted
//!  posts markup identical ──────► leave the surface alone            Unchanged
//!  posts markup differs ────────► fade out, replace, fade in          Swapped
//! ```
//!
//! The renderer keeps the posts markup it last displayed and compares new
//! markup against that snapshot; the surface is never read back.  Renders on
//! one renderer are serialized by the mutex guarding the snapshot, so a second
//! caller waits for a pending fade to finish.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::shell::Shell;
use crate::source::Item;
use crate::surface::{Animator, Surface};
use crate::template::TemplateGenerator;

/// Class of the container holding the article blocks.
pub const POSTS_CLASS: &str = "wpc-blog__posts";

const ARIA_LABEL: &str = "Most recent blog post";

const ERROR_MESSAGE: &str =
    r#"<p class="wpc-component__error-message">There was a problem loading the blog posts.</p>"#;

/// How long the loading state stays on a freshly painted widget.
pub const DEFAULT_LOADING_DELAY: Duration = Duration::from_millis(200);

/// What a render call did to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// No item produced markup; the surface was not touched.
    Empty,
    /// The surface was empty and has been painted.
    Painted,
    /// The surface already showed exactly this content.
    Unchanged,
    /// Different content was swapped in behind a fade.
    Swapped,
}

impl RenderOutcome {
    /// Whether content is on display after the call.
    pub fn loaded(self) -> bool {
        !matches!(self, RenderOutcome::Empty)
    }

    /// Whether the displayed posts changed.
    pub fn changed(self) -> bool {
        matches!(self, RenderOutcome::Painted | RenderOutcome::Swapped)
    }
}

pub struct ContentRenderer {
    surface: Arc<dyn Surface>,
    animator: Arc<dyn Animator>,
    shell: Arc<dyn Shell>,
    templates: TemplateGenerator,
    limit: Option<usize>,
    loading_delay: Duration,
    /// Posts markup currently on display; `None` when the surface shows
    /// anything else.
    displayed: Mutex<Option<String>>,
}

impl ContentRenderer {
    pub fn new(
        surface: Arc<dyn Surface>,
        animator: Arc<dyn Animator>,
        shell: Arc<dyn Shell>,
        templates: TemplateGenerator,
    ) -> Self {
        Self {
            surface,
            animator,
            shell,
            templates,
            limit: None,
            loading_delay: DEFAULT_LOADING_DELAY,
            displayed: Mutex::new(None),
        }
    }

    /// Show at most `limit` posts.  `None` or zero shows the whole page.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit.filter(|&l| l > 0);
        self
    }

    pub fn with_loading_delay(mut self, delay: Duration) -> Self {
        self.loading_delay = delay;
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Prepare the host element before anything is rendered into it.
    pub fn attach(&self) {
        self.surface.set_attribute("aria-label", ARIA_LABEL);
    }

    /// Render `items` onto the surface.
    ///
    /// The loading state set on a first animated paint is cleared by a
    /// detached task after the loading delay.  The returned future does not
    /// wait for it.
    pub async fn render(&self, items: &[Item], animated: bool) -> Result<RenderOutcome> {
        if items.is_empty() {
            return Err(Error::NoContent);
        }

        let mut displayed = self.displayed.lock().await;

        let count = self.limit.map_or(items.len(), |l| l.min(items.len()));
        let content = self.compose(&items[..count]);
        if content.is_empty() {
            debug!(count, "No renderable posts");
            return Ok(RenderOutcome::Empty);
        }

        if self.surface.markup().is_empty() {
            let settled = self.markup(&content, false);
            if animated {
                let loading = self.markup(&content, true);
                self.surface.replace_markup(loading.clone());
                self.schedule_loading_removal(loading, settled);
            } else {
                self.surface.replace_markup(settled);
            }
            *displayed = Some(content);
            info!(posts = count, "Painted posts");
            return Ok(RenderOutcome::Painted);
        }

        if displayed.as_deref() == Some(content.as_str()) {
            debug!("Displayed posts unchanged");
            return Ok(RenderOutcome::Unchanged);
        }

        let markup = self.markup(&content, false);
        self.animator.fade_out(self.surface.as_ref()).await;
        self.surface.replace_markup(markup);
        *displayed = Some(content);
        self.animator.fade_in(self.surface.as_ref()).await;

        info!(posts = count, "Swapped in updated posts");
        Ok(RenderOutcome::Swapped)
    }

    /// Replace the content with the apology message and mark the error state.
    pub async fn show_error(&self) {
        let mut displayed = self.displayed.lock().await;
        *displayed = None;
        self.surface.add_host_class(&self.shell.error_class());
        let area = self.shell.wrap_area(ERROR_MESSAGE);
        self.surface
            .replace_markup(self.shell.wrap_component(&area, &[]));
    }

    fn compose(&self, items: &[Item]) -> String {
        items
            .iter()
            .filter_map(|item| {
                let fragment = self.templates.generate(item);
                match fragment.markup() {
                    Some(markup) => Some(markup.to_owned()),
                    None => {
                        debug!(skipped = ?fragment, link = ?item.link, "Skipping post");
                        None
                    }
                }
            })
            .collect()
    }

    fn markup(&self, content: &str, loading: bool) -> String {
        let posts = format!(r#"<div class="{POSTS_CLASS}">{content}</div>"#);
        let area = self.shell.wrap_area(&posts);
        if loading {
            let loading_class = self.shell.loading_class();
            self.shell.wrap_component(&area, &[loading_class.as_str()])
        } else {
            self.shell.wrap_component(&area, &[])
        }
    }

    /// Swap `loading` for `settled` after the loading delay, unless the
    /// surface has moved on in the meantime.
    fn schedule_loading_removal(&self, loading: String, settled: String) {
        let surface = Arc::clone(&self.surface);
        let delay = self.loading_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut settled = Some(settled);
            surface.edit_markup(&mut |markup: &mut String| {
                if *markup == loading {
                    if let Some(settled) = settled.take() {
                        *markup = settled;
                    }
                }
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    use crate::surface::HostSurface;
    use crate::test_support::{items, renderer, CountingAnimator};

    /// Titles of the posts inside the posts container, in display order.
    fn displayed_titles(markup: &str) -> Vec<String> {
        let html = Html::parse_fragment(markup);
        let selector = Selector::parse(".wpc-blog__posts .wpc-blog__title a").unwrap();
        html.select(&selector)
            .map(|a| a.text().collect::<String>())
            .collect()
    }

    #[tokio::test]
    async fn empty_items_are_no_content() {
        let (renderer, _, _) = renderer(None);
        assert!(matches!(
            renderer.render(&[], true).await,
            Err(Error::NoContent)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn first_paint_flashes_loading_state() {
        let (renderer, surface, animator) = renderer(None);

        let outcome = renderer.render(&items(2), true).await.unwrap();

        assert_eq!(outcome, RenderOutcome::Painted);
        assert!(surface.markup().contains("wpc-blog--loading"));
        assert_eq!(animator.total(), 0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(!surface.markup().contains("wpc-blog--loading"));
        assert!(surface.markup().contains("Post 1"));
    }

    #[tokio::test]
    async fn first_paint_without_animation_has_no_loading_state() {
        let (renderer, surface, _) = renderer(None);
        renderer.render(&items(1), false).await.unwrap();
        assert!(!surface.markup().contains("wpc-blog--loading"));
    }

    #[tokio::test(start_paused = true)]
    async fn rerendering_same_items_is_idempotent() {
        let (renderer, surface, animator) = renderer(None);
        renderer.render(&items(3), true).await.unwrap();
        tokio::time::sleep(Duration::from_millis(250)).await;
        let before = surface.markup();

        let outcome = renderer.render(&items(3), true).await.unwrap();

        assert_eq!(outcome, RenderOutcome::Unchanged);
        assert!(outcome.loaded());
        assert!(!outcome.changed());
        assert_eq!(animator.total(), 0);
        assert_eq!(surface.markup(), before);
    }

    #[tokio::test]
    async fn excerpts_with_stray_tags_still_compare_equal() {
        for excerpt in ["Notes on the <dive> into hosting", "before</div>after", "<divider>"] {
            let (renderer, _, animator) = renderer(None);
            let mut list = items(2);
            list[0].excerpt = Some(excerpt.into());

            assert_eq!(renderer.render(&list, false).await.unwrap(), RenderOutcome::Painted);
            assert_eq!(renderer.render(&list, false).await.unwrap(), RenderOutcome::Unchanged);
            assert_eq!(renderer.render(&list, true).await.unwrap(), RenderOutcome::Unchanged);
            assert_eq!(animator.total(), 0, "{excerpt}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn loading_state_is_not_restored_over_a_swap() {
        let (renderer, surface, _) = renderer(None);
        renderer.render(&items(1), true).await.unwrap();
        renderer.render(&items(2), true).await.unwrap();
        let swapped = surface.markup();

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(surface.markup(), swapped);
        assert!(!swapped.contains("wpc-blog--loading"));
        assert_eq!(displayed_titles(&swapped), vec!["Post 1", "Post 2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn changed_items_swap_behind_fade() {
        let (renderer, surface, animator) = renderer(None);
        renderer.render(&items(2), true).await.unwrap();

        let outcome = renderer.render(&items(3), true).await.unwrap();

        assert_eq!(outcome, RenderOutcome::Swapped);
        assert_eq!(animator.fade_outs(), 1);
        assert_eq!(animator.fade_ins(), 1);
        assert!(surface.markup().contains("Post 3"));
    }

    #[tokio::test]
    async fn limit_keeps_leading_items_in_order() {
        let (renderer, surface, _) = renderer(Some(3));

        renderer.render(&items(10), false).await.unwrap();

        assert_eq!(
            displayed_titles(&surface.markup()),
            vec!["Post 1", "Post 2", "Post 3"]
        );
    }

    #[tokio::test]
    async fn zero_limit_means_whole_page() {
        let (renderer, surface, _) = renderer(Some(0));
        assert_eq!(renderer.limit(), None);
        renderer.render(&items(5), false).await.unwrap();
        assert!(surface.markup().contains("Post 5<"));
    }

    #[tokio::test]
    async fn unrenderable_items_leave_surface_untouched() {
        let (renderer, surface, _) = renderer(None);
        let mut list = items(2);
        list[0].title = None;
        list[1].excerpt = None;

        let outcome = renderer.render(&list, true).await.unwrap();

        assert_eq!(outcome, RenderOutcome::Empty);
        assert!(!outcome.loaded());
        assert!(surface.markup().is_empty());
    }

    #[tokio::test]
    async fn skipped_items_do_not_reorder_the_rest() {
        let (renderer, surface, _) = renderer(None);
        let mut list = items(3);
        list[1].link = None;

        renderer.render(&list, false).await.unwrap();

        let markup = surface.markup();
        assert!(!markup.contains("Post 2<"));
        assert!(markup.find("Post 1<").unwrap() < markup.find("Post 3<").unwrap());
    }

    #[tokio::test]
    async fn error_state_then_recovery_swaps() {
        let surface = Arc::new(HostSurface::in_memory());
        let animator = Arc::new(CountingAnimator::default());
        let renderer = crate::test_support::renderer_on(surface.clone(), animator.clone(), None);

        renderer.attach();
        renderer.show_error().await;

        assert!(surface.has_class("wpc-blog--error"));
        assert!(surface.markup().contains("There was a problem loading the blog posts."));
        assert_eq!(
            surface.attribute("aria-label").as_deref(),
            Some("Most recent blog post")
        );

        let outcome = renderer.render(&items(1), true).await.unwrap();
        assert_eq!(outcome, RenderOutcome::Swapped);
        assert_eq!(animator.fade_outs(), 1);
    }

    #[tokio::test]
    async fn concurrent_renders_are_serialized() {
        let (renderer, _, animator) = renderer(None);
        let renderer = Arc::new(renderer);
        renderer.render(&items(1), false).await.unwrap();

        let a = {
            let r = Arc::clone(&renderer);
            tokio::spawn(async move { r.render(&items(2), false).await.unwrap() })
        };
        let b = {
            let r = Arc::clone(&renderer);
            tokio::spawn(async move { r.render(&items(2), false).await.unwrap() })
        };
        let mut outcomes = vec![a.await.unwrap(), b.await.unwrap()];
        outcomes.sort_by_key(|o| *o as u8);

        assert_eq!(outcomes, vec![RenderOutcome::Unchanged, RenderOutcome::Swapped]);
        assert_eq!(animator.fade_outs(), 1);
    }
}
