//! The fetch capability: turn a URL into a body and a status code.
//!
//! Everything above this module talks to the network only through the
//! [`Fetch`] trait, so tests can swap in a scripted implementation and the
//! aggregator never has to know about reqwest.

use crate::error::{FetchError, ScrapeError};
use crate::models::FetchResponse;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use scraper::Html;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Retrieve raw content for a URL.
///
/// A non-2xx status is a successful call; only transport failures (DNS,
/// connect, timeout, reading the body) are errors. Implementations must be
/// callable concurrently without sharing mutable state between calls.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// [`Fetch`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let t0 = Instant::now();
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(url, e))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::transport(url, e))?;

        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched URL"
        );
        Ok(FetchResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}

/// Fetch `url` and insist on a `200 OK`, returning the body.
pub async fn fetch_ok(fetcher: &dyn Fetch, url: &str) -> Result<String, ScrapeError> {
    let resp = fetcher.get(url).await?;
    if !resp.is_ok() {
        warn!(
            url = %resp.url,
            status = resp.status,
            body_preview = %truncate_for_log(&resp.body, 200),
            "Non-200 response"
        );
        return Err(ScrapeError::Status {
            url: resp.url,
            status: resp.status,
        });
    }
    Ok(resp.body)
}

/// Parse a response body into an HTML document.
///
/// html5ever accepts any input, so the only body we reject is one with nothing
/// in it; a blank page would otherwise extract into a blank article.
pub fn parse_document(url: &str, body: &str) -> Result<Html, ScrapeError> {
    if body.trim().is_empty() {
        return Err(ScrapeError::Extract {
            url: url.to_string(),
            reason: "empty document".to_string(),
        });
    }
    Ok(Html::parse_document(body))
}
