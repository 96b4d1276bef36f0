//! The hosting surface the widget draws into, and the fade animation
//! primitives that act on it.
//!
//! A surface is the element hosting the widget: its inner markup, its own
//! class list and attributes, and whether it is currently visible.  Only the
//! renderer writes to it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

/// The element that hosts the widget.
pub trait Surface: Send + Sync {
    /// Current inner markup; empty before the first paint.
    fn markup(&self) -> String;

    fn replace_markup(&self, markup: String);

    /// Edit the inner markup in place as one atomic step.
    fn edit_markup(&self, edit: &mut dyn FnMut(&mut String));

    fn set_attribute(&self, name: &str, value: &str);

    fn add_host_class(&self, class: &str);

    fn set_visible(&self, visible: bool);
}

#[derive(Debug, Clone)]
struct SurfaceState {
    markup: String,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    visible: bool,
}

/// In-memory surface, optionally mirrored to an HTML file on every change.
#[derive(Debug)]
pub struct HostSurface {
    state: Mutex<SurfaceState>,
    output: Option<PathBuf>,
}

impl HostSurface {
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(SurfaceState {
                markup: String::new(),
                classes: BTreeSet::new(),
                attributes: BTreeMap::new(),
                visible: true,
            }),
            output: None,
        }
    }

    /// A surface whose host element is rewritten to `path` after every change.
    pub fn with_output(path: impl Into<PathBuf>) -> Self {
        Self {
            output: Some(path.into()),
            ..Self::in_memory()
        }
    }

    #[cfg(test)]
    pub fn has_class(&self, class: &str) -> bool {
        self.lock().classes.contains(class)
    }

    #[cfg(test)]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.lock().attributes.get(name).cloned()
    }

    #[cfg(test)]
    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    /// The host element with its attributes and inner markup.
    #[cfg(test)]
    pub fn to_html(&self) -> String {
        render_host(&self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        // A poisoned lock only means a writer panicked mid-update; the state
        // itself is still a plain value.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, change: impl FnOnce(&mut SurfaceState)) {
        let mut state = self.lock();
        change(&mut state);
        if let Some(path) = &self.output {
            if let Err(e) = std::fs::write(path, render_host(&state)) {
                warn!(path = %path.display(), error = %e, "Failed to mirror surface to file");
            }
        }
    }
}

fn render_host(state: &SurfaceState) -> String {
    let mut open = String::from("<div");
    if !state.classes.is_empty() {
        let classes: Vec<&str> = state.classes.iter().map(String::as_str).collect();
        open.push_str(&format!(r#" class="{}""#, classes.join(" ")));
    }
    for (name, value) in &state.attributes {
        open.push_str(&format!(r#" {name}="{}""#, value.replace('"', "&quot;")));
    }
    if !state.visible {
        open.push_str(r#" style="opacity: 0""#);
    }
    format!("{open}>{}</div>\n", state.markup)
}

impl Surface for HostSurface {
    fn markup(&self) -> String {
        self.lock().markup.clone()
    }

    fn replace_markup(&self, markup: String) {
        self.update(|s| s.markup = markup);
    }

    fn edit_markup(&self, edit: &mut dyn FnMut(&mut String)) {
        self.update(|s| edit(&mut s.markup));
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.update(|s| {
            s.attributes.insert(name.to_string(), value.to_string());
        });
    }

    fn add_host_class(&self, class: &str) {
        self.update(|s| {
            s.classes.insert(class.to_string());
        });
    }

    fn set_visible(&self, visible: bool) {
        self.update(|s| s.visible = visible);
    }
}

// ---------------------------------------------------------------------------
// Animation
// ---------------------------------------------------------------------------

/// Fade primitives; each call resolves once its transition has finished.
#[async_trait]
pub trait Animator: Send + Sync {
    async fn fade_out(&self, surface: &dyn Surface);

    async fn fade_in(&self, surface: &dyn Surface);
}

/// Fades that take a fixed time and flip the surface's visibility.
#[derive(Debug, Clone)]
pub struct TimedFade {
    pub duration: Duration,
}

impl TimedFade {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

#[async_trait]
impl Animator for TimedFade {
    async fn fade_out(&self, surface: &dyn Surface) {
        tokio::time::sleep(self.duration).await;
        surface.set_visible(false);
    }

    async fn fade_in(&self, surface: &dyn Surface) {
        surface.set_visible(true);
        tokio::time::sleep(self.duration).await;
    }
}
