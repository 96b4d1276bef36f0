//! In-memory collaborators and fixtures shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::cache::{Cache, CacheRecord};
use crate::error::{Error, Result};
use crate::poll::Timer;
use crate::render::ContentRenderer;
use crate::shell::ComponentShell;
use crate::source::{FeedSource, Item};
use crate::surface::{Animator, HostSurface, Surface};
use crate::template::TemplateGenerator;

/// `n` renderable posts titled "Post 1" .. "Post n".
pub fn items(n: usize) -> Vec<Item> {
    (1..=n)
        .map(|i| Item {
            title: Some(format!("Post {i}")),
            link: Some(format!("http://x/{i}")),
            excerpt: Some(format!("Excerpt {i}")),
            publish_date: Some("2021-05-03".into()),
            authors: Vec::new(),
        })
        .collect()
}

/// A posts response body carrying `n` posts in wire format.
pub fn payload(n: usize) -> String {
    let posts: Vec<serde_json::Value> = (1..=n)
        .map(|i| {
            serde_json::json!({
                "title": {"rendered": format!("Post {i}")},
                "link": format!("http://x/{i}"),
                "excerpt": {"basic": format!("Excerpt {i}")},
                "date": "2021-05-03",
                "author": []
            })
        })
        .collect();
    serde_json::Value::Array(posts).to_string()
}

pub fn renderer(limit: Option<usize>) -> (ContentRenderer, Arc<HostSurface>, Arc<CountingAnimator>) {
    let surface = Arc::new(HostSurface::in_memory());
    let animator = Arc::new(CountingAnimator::default());
    let renderer = renderer_on(surface.clone(), animator.clone(), limit);
    (renderer, surface, animator)
}

pub fn renderer_on(
    surface: Arc<HostSurface>,
    animator: Arc<CountingAnimator>,
    limit: Option<usize>,
) -> ContentRenderer {
    ContentRenderer::new(
        surface,
        animator,
        Arc::new(ComponentShell::default()),
        TemplateGenerator::new("https://wpcampus.org"),
    )
    .with_limit(limit)
    .with_loading_delay(Duration::from_millis(200))
}

// ============================================================================
// Animator
// ============================================================================

/// Completes fades immediately and counts them.
#[derive(Default)]
pub struct CountingAnimator {
    outs: AtomicUsize,
    ins: AtomicUsize,
}

impl CountingAnimator {
    pub fn fade_outs(&self) -> usize {
        self.outs.load(Ordering::SeqCst)
    }

    pub fn fade_ins(&self) -> usize {
        self.ins.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> usize {
        self.fade_outs() + self.fade_ins()
    }
}

#[async_trait]
impl Animator for CountingAnimator {
    async fn fade_out(&self, surface: &dyn Surface) {
        self.outs.fetch_add(1, Ordering::SeqCst);
        surface.set_visible(false);
        tokio::task::yield_now().await;
    }

    async fn fade_in(&self, surface: &dyn Surface) {
        self.ins.fetch_add(1, Ordering::SeqCst);
        surface.set_visible(true);
    }
}

// ============================================================================
// Feed source
// ============================================================================

/// Replays scripted responses in order; `None` scripts a network failure.
#[derive(Default)]
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Option<String>>>,
    requests: Mutex<Vec<Option<u32>>>,
}

impl ScriptedSource {
    pub fn new(responses: impl IntoIterator<Item = Option<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// `per_page` of every request made so far.
    pub fn requests(&self) -> Vec<Option<u32>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch(&self, per_page: Option<u32>) -> Result<String> {
        self.requests.lock().unwrap().push(per_page);
        let next = self.responses.lock().unwrap().pop_front().flatten();
        match next {
            Some(body) => Ok(body),
            None => Err(Error::Fetch(network_error().await)),
        }
    }
}

/// A real transport error: a request to a port nothing listens on.
async fn network_error() -> reqwest::Error {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    reqwest::get(format!("http://127.0.0.1:{port}/"))
        .await
        .unwrap_err()
}

// ============================================================================
// Cache
// ============================================================================

/// Keeps the record in memory; `failing` rejects every store.
#[derive(Default)]
pub struct MemoryCache {
    record: Mutex<Option<CacheRecord>>,
    stores: AtomicUsize,
    fail_stores: bool,
}

impl MemoryCache {
    pub fn with_record(items: Vec<Item>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            record: Mutex::new(Some(CacheRecord { items, fetched_at })),
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_stores: true,
            ..Self::default()
        }
    }

    pub fn stores(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }

    pub fn record(&self) -> Option<CacheRecord> {
        self.record.lock().unwrap().clone()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn store(&self, items: &[Item], fetched_at: DateTime<Utc>) -> Result<()> {
        self.stores.fetch_add(1, Ordering::SeqCst);
        if self.fail_stores {
            return Err(Error::CacheIo {
                path: "memory".into(),
                source: std::io::Error::other("disk full"),
            });
        }
        *self.record.lock().unwrap() = Some(CacheRecord {
            items: items.to_vec(),
            fetched_at,
        });
        Ok(())
    }

    async fn retrieve(&self) -> Result<Option<CacheRecord>> {
        Ok(self.record.lock().unwrap().clone())
    }
}

// ============================================================================
// Timer
// ============================================================================

/// Counts arm/pause calls; `next_tick` resolves immediately.
#[derive(Default)]
pub struct RecordingTimer {
    sets: AtomicUsize,
    pauses: AtomicUsize,
}

impl RecordingTimer {
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }

    pub fn pauses(&self) -> usize {
        self.pauses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Timer for RecordingTimer {
    fn set_update_timer(&self) {
        self.sets.fetch_add(1, Ordering::SeqCst);
    }

    fn pause_timer(&self) {
        self.pauses.fetch_add(1, Ordering::SeqCst);
    }

    async fn next_tick(&self) {
        tokio::task::yield_now().await;
    }
}
