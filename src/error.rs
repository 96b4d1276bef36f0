//! Error types shared by every component of the widget.

use std::path::PathBuf;

/// Failures the synchronization engine can run into.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `render` was handed an empty item list.
    #[error("there is no content to display")]
    NoContent,

    /// The feed request failed at the transport level or returned an error status.
    #[error("feed request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The feed answered with an empty body.
    #[error("the request had no response")]
    EmptyResponse,

    /// The feed body was not a collection of post records.
    #[error("feed payload could not be parsed: {0}")]
    Parse(#[from] serde_json::Error),

    /// The cache file could not be read or written.
    #[error("cache file {} is not accessible: {source}", .path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cache record could not be encoded or decoded.
    #[error("cache record is malformed: {0}")]
    CacheFormat(#[source] serde_json::Error),

    /// Configuration could not be loaded or failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
