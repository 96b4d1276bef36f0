//! Throttled feed polling.
//!
//! [`UpdateScheduler`] runs one fetch cycle per timer tick: fetch, parse,
//! render, persist when the display changed, then re-arm the timer.  When the
//! feed is unreachable it renders the cached list instead.  After `ceiling`
//! ticks the timer is paused until [`reset`](UpdateScheduler::reset) is called
//! (user activity, see [`crate::input`]).
//!
//! ## For contributors
//!
//! Cycles never overlap: the timer is only re-armed at the very end of a
//! tick, and [`run`](UpdateScheduler::run) awaits each tick before waiting for
//! the next one.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::error::{Error, Result};
use crate::render::{ContentRenderer, RenderOutcome};
use crate::source::{parse_items, FeedSource, Item};

/// Ticks allowed before polling halts, when none is configured.
pub const DEFAULT_POLL_CEILING: u32 = 30;

/// Resolve the poll ceiling.  Missing, zero or negative values force the
/// default.
pub fn resolve_ceiling(configured: Option<i64>) -> u32 {
    configured
        .filter(|&c| c > 0)
        .and_then(|c| u32::try_from(c).ok())
        .unwrap_or(DEFAULT_POLL_CEILING)
}

/// The timer collaborator that paces ticks.
#[async_trait]
pub trait Timer: Send + Sync {
    /// Arm the timer for the next tick.
    fn set_update_timer(&self);

    /// Disarm the timer; no tick fires until it is armed again.
    fn pause_timer(&self);

    /// Resolve when an armed timer fires.
    async fn next_tick(&self);
}

/// Fires once per `interval` after being armed.
#[derive(Debug)]
pub struct IntervalTimer {
    interval: Duration,
    armed: AtomicBool,
    wake: Notify,
}

impl IntervalTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            armed: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Timer for IntervalTimer {
    fn set_update_timer(&self) {
        self.armed.store(true, Ordering::SeqCst);
        self.wake.notify_one();
    }

    fn pause_timer(&self) {
        self.armed.store(false, Ordering::SeqCst);
    }

    async fn next_tick(&self) {
        loop {
            let woken = self.wake.notified();
            if self.armed.swap(false, Ordering::SeqCst) {
                tokio::time::sleep(self.interval).await;
                return;
            }
            woken.await;
        }
    }
}

/// What one tick did.
#[derive(Debug)]
pub enum TickOutcome {
    /// The ceiling was exceeded; the timer is paused.
    Halted,
    /// Fresh posts were rendered; `persisted` tells whether they were cached.
    Rendered {
        outcome: RenderOutcome,
        persisted: bool,
    },
    /// The feed failed and the cached list was rendered, if there was one.
    CacheFallback(Option<RenderOutcome>),
    /// A parse, render or cache failure with no recovery action.
    Absorbed(Error),
}

impl TickOutcome {
    /// Whether the tick left posts on display.
    pub fn loaded(&self) -> bool {
        match self {
            TickOutcome::Rendered { outcome, .. } => outcome.loaded(),
            TickOutcome::CacheFallback(outcome) => outcome.is_some_and(RenderOutcome::loaded),
            TickOutcome::Halted | TickOutcome::Absorbed(_) => false,
        }
    }
}

pub struct UpdateScheduler {
    source: Arc<dyn FeedSource>,
    cache: Arc<dyn Cache>,
    timer: Arc<dyn Timer>,
    renderer: Arc<ContentRenderer>,
    count: AtomicU32,
    ceiling: u32,
}

impl UpdateScheduler {
    pub fn new(
        source: Arc<dyn FeedSource>,
        cache: Arc<dyn Cache>,
        timer: Arc<dyn Timer>,
        renderer: Arc<ContentRenderer>,
        ceiling: u32,
    ) -> Self {
        Self {
            source,
            cache,
            timer,
            renderer,
            count: AtomicU32::new(0),
            ceiling,
        }
    }

    /// Ticks issued since start or the last reset.
    #[cfg(test)]
    pub fn count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }

    /// Zero the tick count and re-arm the timer.  Resumes a halted scheduler.
    pub fn reset(&self) {
        let previous = self.count.swap(0, Ordering::SeqCst);
        debug!(previous, "Poll count reset");
        self.timer.set_update_timer();
    }

    /// Tick forever, one cycle per timer firing.
    pub async fn run(&self) {
        info!(source = %self.source.name(), ceiling = self.ceiling, "Update scheduler started");
        loop {
            self.timer.next_tick().await;
            match self.tick().await {
                TickOutcome::Halted => {}
                TickOutcome::Rendered { outcome, persisted } => {
                    debug!(?outcome, persisted, "Tick rendered feed posts");
                }
                TickOutcome::CacheFallback(outcome) => {
                    debug!(?outcome, "Tick rendered cached posts");
                }
                TickOutcome::Absorbed(error) => {
                    debug!(%error, "Tick ended without an update");
                }
            }
        }
    }

    /// Paint from a fresh cache, then run the first tick.  When neither put
    /// posts on display the widget switches to its error state.
    pub async fn start(&self, max_age: Duration) -> TickOutcome {
        let warm = self.load_cached(max_age).await;
        if let Some(outcome) = warm {
            info!(?outcome, "Painted cached posts");
        }

        let first = self.tick().await;
        if !warm.is_some_and(RenderOutcome::loaded) && !first.loaded() {
            warn!("No posts available at startup");
            self.renderer.show_error().await;
        }
        first
    }

    /// Run one fetch cycle.
    pub async fn tick(&self) -> TickOutcome {
        let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        if count > self.ceiling {
            info!(count, ceiling = self.ceiling, "Poll ceiling reached, pausing updates");
            self.timer.pause_timer();
            return TickOutcome::Halted;
        }

        let per_page = self.renderer.limit().and_then(|l| u32::try_from(l).ok());
        let outcome = match self.source.fetch(per_page).await {
            Ok(body) => self.load_from_response(&body).await,
            Err(e) => {
                warn!(source = %self.source.name(), error = %e, "Feed request failed, falling back to cache");
                TickOutcome::CacheFallback(self.load_from_cache().await)
            }
        };

        self.timer.set_update_timer();
        outcome
    }

    /// Render the cached list without animation, provided it is younger
    /// than `max_age`.  Used to paint something before the first fetch.
    pub async fn load_cached(&self, max_age: Duration) -> Option<RenderOutcome> {
        self.render_cached(Some(max_age), false).await
    }

    /// Forced cache load after a failed fetch: the record's age is ignored.
    async fn load_from_cache(&self) -> Option<RenderOutcome> {
        self.render_cached(None, true).await
    }

    async fn render_cached(&self, max_age: Option<Duration>, animated: bool) -> Option<RenderOutcome> {
        let record = match self.cache.retrieve().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!("Cache is empty");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read cache");
                return None;
            }
        };

        if let Some(max_age) = max_age {
            if !record.is_fresh(max_age, Utc::now()) {
                debug!(fetched_at = %record.fetched_at, "Cached posts are stale");
                return None;
            }
        }

        match self.renderer.render(&record.items, animated).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Failed to render cached posts");
                None
            }
        }
    }

    async fn load_from_response(&self, body: &str) -> TickOutcome {
        let items = match parse_items(body) {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "Discarding feed response");
                return TickOutcome::Absorbed(e);
            }
        };

        let outcome = match self.renderer.render(&items, true).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Failed to render feed posts");
                return TickOutcome::Absorbed(e);
            }
        };

        if !outcome.changed() {
            return TickOutcome::Rendered {
                outcome,
                persisted: false,
            };
        }

        match self.persist(&items).await {
            Ok(()) => TickOutcome::Rendered {
                outcome,
                persisted: true,
            },
            Err(e) => {
                warn!(error = %e, "Failed to store posts in cache");
                TickOutcome::Absorbed(e)
            }
        }
    }

    async fn persist(&self, items: &[Item]) -> Result<()> {
        self.cache.store(items, Utc::now()).await
    }
}
