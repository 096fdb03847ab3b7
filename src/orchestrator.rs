//! Cache-through retrieval for popular listings, article details and search.
//!
//! Two cached modes share one shape: look up a source-qualified key, and on a
//! miss fetch, extract and store.
//!
//! | Mode | Key | On failure | Stored when |
//! |------|-----|------------|-------------|
//! | popular | `<source>:popular` | absorbed per URL | result is non-empty |
//! | detail | `<source>:<article url>` | returned to caller | always on success |
//!
//! Search is passed straight through without caching. Nothing here locks
//! beyond the cache itself, so two concurrent misses on the same key both
//! fetch.

use crate::aggregate::{fetch_and_extract, fetch_list};
use crate::cache::{Cache, Cached};
use crate::config::SourceDescriptor;
use crate::error::ScrapeError;
use crate::fetch::{Fetch, fetch_ok, parse_document};
use crate::models::Article;
use crate::scrapers::{DetailExtractor, ListExtractor};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Cache key for a source's popular listing.
pub fn popular_key(source: &str) -> String {
    format!("{source}:popular")
}

/// Cache key for one article of a source.
///
/// # Arguments
///
/// * `source` - Source name, e.g. `detik`
/// * `url` - The article's canonical URL
///
/// # Returns
///
/// `"<source>:<url>"`. Listing keys end in `popular`, which no article URL
/// does, so the two modes never collide.
pub fn detail_key(source: &str, url: &str) -> String {
    format!("{source}:{url}")
}

/// Cache-through front for every lookup the service answers.
///
/// Cheap to share behind an `Arc`; all state lives in the cache.
pub struct Orchestrator {
    fetcher: Arc<dyn Fetch>,
    cache: Arc<dyn Cache>,
    list_ttl: Duration,
    detail_ttl: Duration,
}

impl Orchestrator {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        cache: Arc<dyn Cache>,
        list_ttl: Duration,
        detail_ttl: Duration,
    ) -> Self {
        Self {
            fetcher,
            cache,
            list_ttl,
            detail_ttl,
        }
    }

    /// Popular articles across all of a source's seed URLs.
    ///
    /// Never fails: unreachable or broken pages just contribute nothing. An
    /// empty result is not cached, so the next call tries the network again.
    #[instrument(level = "info", skip(self, seed_urls, extract))]
    pub async fn get_aggregate(
        &self,
        source: &str,
        seed_urls: &[String],
        extract: ListExtractor,
    ) -> Vec<Article> {
        let key = popular_key(source);
        if let Some(Cached::Articles(articles)) = self.cache.get(&key) {
            info!(%key, count = articles.len(), "Serving popular articles from cache");
            return articles;
        }

        let articles = fetch_and_extract(self.fetcher.as_ref(), seed_urls, extract).await;
        if articles.is_empty() {
            warn!(%key, "No articles from any source URL; not caching");
        } else {
            self.cache
                .set(&key, Cached::Articles(articles.clone()), self.list_ttl);
        }
        articles
    }

    /// One article, fetched by `fetch_one` on a cache miss.
    ///
    /// Errors from `fetch_one` are returned as-is and leave the cache alone.
    #[instrument(level = "info", skip_all, fields(%source, %url))]
    pub async fn get_detail<F, Fut>(
        &self,
        source: &str,
        url: &str,
        fetch_one: F,
    ) -> Result<Article, ScrapeError>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<Article, ScrapeError>>,
    {
        let key = detail_key(source, url);
        if let Some(Cached::Article(article)) = self.cache.get(&key) {
            debug!(%key, "Serving article from cache");
            return Ok(article);
        }

        let article = fetch_one(url.to_string()).await?;
        self.cache
            .set(&key, Cached::Article(article.clone()), self.detail_ttl);
        Ok(article)
    }

    /// [`get_detail`](Self::get_detail) using this orchestrator's fetcher and
    /// a source's detail extractor.
    pub async fn detail(
        &self,
        source: &str,
        url: &str,
        extract: DetailExtractor,
    ) -> Result<Article, ScrapeError> {
        let fetcher = Arc::clone(&self.fetcher);
        self.get_detail(source, url, move |url| async move {
            fetch_detail(fetcher.as_ref(), &url, extract).await
        })
        .await
    }

    /// Run a source's search page through its list extractor. Uncached.
    #[instrument(level = "info", skip(self, source, extract), fields(source = %source.name))]
    pub async fn search(
        &self,
        source: &SourceDescriptor,
        keyword: &str,
        extract: ListExtractor,
    ) -> Result<Vec<Article>, ScrapeError> {
        let url = source
            .search_url_for(keyword)
            .ok_or_else(|| ScrapeError::SearchUnsupported(source.name.clone()))?;
        let articles = fetch_list(self.fetcher.as_ref(), &url, extract).await?;
        info!(count = articles.len(), "Search finished");
        Ok(articles)
    }
}

/// Fetch an article page and run the detail extractor over it.
pub async fn fetch_detail(
    fetcher: &dyn Fetch,
    url: &str,
    extract: DetailExtractor,
) -> Result<Article, ScrapeError> {
    let body = fetch_ok(fetcher, url).await?;
    extract_detail(url, &body, extract)
}

fn extract_detail(url: &str, body: &str, extract: DetailExtractor) -> Result<Article, ScrapeError> {
    let document = parse_document(url, body)?;
    Ok(extract(url, &document))
}
