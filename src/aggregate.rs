//! Fan-out/fan-in over a list of URLs.
//!
//! Every URL gets its own fetch-and-extract unit and all units run at once.
//! A unit that fails (transport error, non-200 status, unparsable body)
//! contributes nothing; the aggregate as a whole cannot fail. Results come back
//! in completion order, not input order.

use crate::error::ScrapeError;
use crate::fetch::{Fetch, fetch_ok, parse_document};
use crate::models::Article;
use crate::scrapers::ListExtractor;
use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

/// Fetch every URL concurrently, run `extract` on each page and merge the
/// results.
///
/// # Arguments
///
/// * `fetcher` - Network access shared by every unit
/// * `urls` - Listing pages to fetch; each becomes one unit
/// * `extract` - Turns a parsed listing page into articles
///
/// # Returns
///
/// The articles of every unit that succeeded, in completion order. Empty when
/// `urls` is empty or every unit failed.
#[instrument(level = "info", skip_all, fields(urls = urls.len()))]
pub async fn fetch_and_extract(
    fetcher: &dyn Fetch,
    urls: &[String],
    extract: ListExtractor,
) -> Vec<Article> {
    // One slot per URL: the fan-out is bounded only by the list itself.
    let width = urls.len().max(1);

    // Owned URLs keep each unit's future `Send`.
    let per_url: Vec<Vec<Article>> = stream::iter(urls.to_vec())
        .map(|url: String| async move {
            match fetch_list(fetcher, &url, extract).await {
                Ok(articles) => {
                    debug!(%url, count = articles.len(), "Extracted articles");
                    articles
                }
                Err(e) => {
                    warn!(%url, error = %e, "Source URL failed; skipping");
                    Vec::new()
                }
            }
        })
        .buffer_unordered(width)
        .collect()
        .await;

    let articles: Vec<Article> = per_url.into_iter().flatten().collect();
    info!(count = articles.len(), "Aggregated articles");
    articles
}

/// Fetch one listing page and extract its articles, surfacing any failure.
pub async fn fetch_list(
    fetcher: &dyn Fetch,
    url: &str,
    extract: ListExtractor,
) -> Result<Vec<Article>, ScrapeError> {
    let body = fetch_ok(fetcher, url).await?;
    extract_list(url, &body, extract)
}

fn extract_list(url: &str, body: &str, extract: ListExtractor) -> Result<Vec<Article>, ScrapeError> {
    let document = parse_document(url, body)?;
    Ok(extract(&document))
}
