//! wpc-blog — keeps a "most recent blog posts" widget in sync with a
//! WordPress feed.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────┐  body   ┌──────────┐  items  ┌───────────┐  markup  ┌────────────┐
//! │ source/  │ ──────► │  poll.rs │ ──────► │ render.rs │ ───────► │ surface.rs │
//! │ (fetch)  │         │ (ticks)  │         │ (diff)    │          │ (display)  │
//! └──────────┘         └──────────┘         └───────────┘          └────────────┘
//!                        ▲      │ changed        │ per item
//!            reset()     │      ▼                ▼
//!                  ┌──────────┐ ┌──────────┐ ┌─────────────┐
//!                  │ input.rs │ │ cache.rs │ │ template.rs │
//!                  └──────────┘ └──────────┘ └─────────────┘
//! ```
//!
//! * **`source/`** — the `FeedSource` trait, the `Item` record and the
//!   WordPress REST implementation.
//! * **`poll`** — the throttled update loop and its timer.
//! * **`render`** — turns items into markup and decides how to swap it in.
//! * **`template`** / **`format`** — per-article markup and dates.
//! * **`shell`** / **`surface`** — component wrapper markup, the hosting
//!   element and fade animations.
//! * **`cache`** — last-known-good posts for when the feed is down.
//! * **`input`** — stdin lines reset the poll count.
//! * **`main`** — wires everything together: load config, build the
//!   collaborators, paint from cache, and run the loop.

mod cache;
mod config;
mod error;
mod format;
mod input;
mod poll;
mod render;
mod shell;
mod source;
mod surface;
mod template;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cache::FileCache;
use config::WidgetConfig;
use poll::{resolve_ceiling, IntervalTimer, UpdateScheduler};
use render::ContentRenderer;
use shell::ComponentShell;
use source::WpJsonSource;
use surface::{HostSurface, TimedFade};
use template::TemplateGenerator;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // -- configuration -------------------------------------------------------
    let config = WidgetConfig::load(std::env::args().nth(1))?;
    info!(
        feed = %config.feed_url,
        format = ?config.format(),
        limit = ?config.display_limit(),
        "Starting blog widget"
    );

    // -- collaborators -------------------------------------------------------
    let surface = Arc::new(match &config.output_path {
        Some(path) => HostSurface::with_output(path),
        None => HostSurface::in_memory(),
    });

    let renderer = Arc::new(
        ContentRenderer::new(
            surface,
            Arc::new(TimedFade::new(config.fade_duration())),
            Arc::new(ComponentShell::default()),
            TemplateGenerator::new(config.site_url.as_str()),
        )
        .with_limit(config.display_limit())
        .with_loading_delay(config.loading_delay()),
    );

    let scheduler = UpdateScheduler::new(
        Arc::new(WpJsonSource::new(config.feed_url.as_str(), config.request_timeout())?),
        Arc::new(FileCache::new(config.cache_path.clone())),
        Arc::new(IntervalTimer::new(config.poll_interval())),
        Arc::clone(&renderer),
        resolve_ceiling(config.poll_ceiling),
    );

    // -- first paint ---------------------------------------------------------
    renderer.attach();
    scheduler.start(config.cache_max_age()).await;

    // -- update loop ---------------------------------------------------------
    // Runs until `q` on stdin or Ctrl-C.  stdin reaching EOF only stops
    // listening for activity; polling carries on.
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let activity = async {
        if !input::listen(stdin, &scheduler).await? {
            std::future::pending::<()>().await;
        }
        Ok::<_, std::io::Error>(())
    };

    tokio::select! {
        _ = scheduler.run() => {}
        result = activity => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
        }
    }

    Ok(())
}
