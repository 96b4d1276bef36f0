//! Last-known-good post list, used when the feed cannot be reached.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::source::Item;

/// The cached post list and when it was fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub items: Vec<Item>,
    #[serde(rename = "fetchedAt")]
    pub fetched_at: DateTime<Utc>,
}

impl CacheRecord {
    /// Whether the record is younger than `max_age` at `now`.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => now.signed_duration_since(self.fetched_at) <= max_age,
            Err(_) => true,
        }
    }
}

/// The local storage collaborator.
#[async_trait]
pub trait Cache: Send + Sync {
    async fn store(&self, items: &[Item], fetched_at: DateTime<Utc>) -> Result<()>;

    async fn retrieve(&self) -> Result<Option<CacheRecord>>;
}

/// Cache kept as a single JSON file.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> Error {
        Error::CacheIo {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl Cache for FileCache {
    async fn store(&self, items: &[Item], fetched_at: DateTime<Utc>) -> Result<()> {
        let record = CacheRecord {
            items: items.to_vec(),
            fetched_at,
        };
        let body = serde_json::to_vec(&record).map_err(Error::CacheFormat)?;
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|source| self.io_error(source))?;
        debug!(path = %self.path.display(), items = items.len(), "Stored posts in cache");
        Ok(())
    }

    async fn retrieve(&self) -> Result<Option<CacheRecord>> {
        let body = match tokio::fs::read(&self.path).await {
            Ok(body) => body,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(self.io_error(source)),
        };
        let record = serde_json::from_slice(&body).map_err(Error::CacheFormat)?;
        Ok(Some(record))
    }
}
