//! Error types for fetching and scraping.

use thiserror::Error;

/// Transport-level failure: the request never produced a status code.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl FetchError {
    pub fn transport(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        FetchError::Transport {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Failure of a detail or search request.
///
/// List requests never return this; their failures are absorbed per URL.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("error: status code {status} from {url}")]
    Status { url: String, status: u16 },
    #[error("could not extract content from {url}: {reason}")]
    Extract { url: String, reason: String },
    #[error("source {0} does not support search")]
    SearchUnsupported(String),
}
