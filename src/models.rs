//! Data models shared by the fetch pipeline, the cache and the HTTP layer.
//!
//! - [`Article`]: one scraped listing or detail page
//! - [`FetchResponse`]: raw body and status returned by a [`Fetch`](crate::fetch::Fetch)
//! - [`ArticlesResponse`]: the JSON envelope served to clients
//!
//! Field names on the wire follow the public API (`description`, `timestamp`)
//! rather than the Rust field names, hence the `serde(rename)` attributes.

use serde::{Deserialize, Serialize};

/// A single article as produced by a source extractor.
///
/// The pipeline never interprets these fields; it only moves articles between
/// the extractor, the cache and the caller. `url` is the canonical article URL
/// and doubles as the detail cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Article {
    /// Canonical URL of the article on the source site.
    pub url: String,
    /// Headline.
    pub title: String,
    /// Short description; list extractors put the source host here.
    #[serde(rename = "description", default)]
    pub short_desc: String,
    #[serde(default)]
    pub author: String,
    /// Publication date as displayed by the source, not normalized.
    #[serde(rename = "timestamp", default)]
    pub date: String,
    /// URL a reader should open to see the original page.
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub image_url: String,
    /// Article body as HTML. Empty for list items.
    #[serde(default)]
    pub content: String,
}

/// Raw result of a fetch: the body and the HTTP status it came with.
///
/// Non-2xx statuses are carried here rather than turned into errors; deciding
/// what counts as a failure is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

impl FetchResponse {
    /// Only an exact `200 OK` counts as usable content.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Envelope returned by every successful API call.
#[derive(Debug, Deserialize, Serialize)]
pub struct ArticlesResponse {
    pub status: String,
    pub count: usize,
    pub articles: Vec<Article>,
}

impl ArticlesResponse {
    pub fn success(articles: Vec<Article>) -> Self {
        Self {
            status: "Success".to_string(),
            count: articles.len(),
            articles,
        }
    }
}
