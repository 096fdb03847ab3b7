//! # gober
//!
//! Aggregates popular article listings from news portals (detik.com,
//! kompas.com) and serves them, together with per-article detail pages,
//! behind a short-lived in-memory cache.
//!
//! ## Usage
//!
//! ```sh
//! gober serve --bind 0.0.0.0:8080
//! gober popular --source kompas
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetch**: [`fetch::Fetch`] turns a URL into a body and a status code
//! 2. **Aggregate**: every seed URL of a source is fetched concurrently and
//!    run through the source's extractor; failing URLs are skipped
//! 3. **Cache**: [`cache::TtlCache`] keeps listings and articles for a few
//!    minutes so repeated requests skip the network
//! 4. **Serve**: an axum API or a one-shot CLI command on top of
//!    [`orchestrator::Orchestrator`]

use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cache;
mod cli;
mod config;
mod error;
mod fetch;
mod models;
mod orchestrator;
mod scrapers;
mod server;
mod utils;

use cache::TtlCache;
use cli::{Cli, Command};
use config::Config;
use fetch::HttpFetcher;
use models::ArticlesResponse;
use orchestrator::Orchestrator;
use scrapers::{Catalog, Source};
use server::AppState;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("gober starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let config = Config::load(args.config.as_deref()).await?;

    // One cache and one HTTP client for the whole process.
    let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout())?;
    let cache = Arc::new(TtlCache::new());
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(fetcher),
        cache,
        config.list_ttl(),
        config.detail_ttl(),
    ));
    let catalog = Arc::new(Catalog::from_descriptors(&config.sources));

    match args.command {
        Command::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| config.bind.clone());
            server::serve(
                &bind,
                AppState {
                    orchestrator,
                    catalog,
                    static_dir: config.static_dir.clone(),
                },
            )
            .await?;
        }
        command => {
            let response = run_once(command, &orchestrator, &catalog).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}

fn lookup<'a>(catalog: &'a Catalog, name: &str) -> Result<&'a Source, Box<dyn Error>> {
    catalog
        .get(name)
        .ok_or_else(|| format!("scrape {name} not supported").into())
}

/// Run a single lookup command against the orchestrator.
async fn run_once(
    command: Command,
    orchestrator: &Orchestrator,
    catalog: &Catalog,
) -> Result<ArticlesResponse, Box<dyn Error>> {
    let articles = match command {
        Command::Popular { source } => {
            let source = lookup(catalog, &source)?;
            orchestrator
                .get_aggregate(
                    source.name(),
                    &source.descriptor.popular_urls,
                    source.extractors.list,
                )
                .await
        }
        Command::Detail { source, url } => {
            let source = lookup(catalog, &source)?;
            vec![
                orchestrator
                    .detail(source.name(), &url, source.extractors.detail)
                    .await?,
            ]
        }
        Command::Search { source, query } => {
            let source = lookup(catalog, &source)?;
            orchestrator
                .search(&source.descriptor, &query, source.extractors.list)
                .await?
        }
        Command::Serve { .. } => return Err("serve is not a one-shot command".into()),
    };
    Ok(ArticlesResponse::success(articles))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::ScriptedFetcher;
    use std::time::Duration;

    fn setup(fetcher: ScriptedFetcher) -> (Orchestrator, Catalog) {
        let mut config = Config::default();
        config.sources[1].popular_urls = vec!["https://kompas.test/terpopuler".to_string()];
        let orchestrator = Orchestrator::new(
            Arc::new(fetcher),
            Arc::new(TtlCache::new()),
            Duration::from_secs(60),
            Duration::from_secs(60),
        );
        (orchestrator, Catalog::from_descriptors(&config.sources))
    }

    #[tokio::test]
    async fn test_run_once_popular() {
        let fetcher = ScriptedFetcher::new().page(
            "https://kompas.test/terpopuler",
            200,
            r#"<div class="articleItem"><a class="article-link" href="https://a.kompas.com/read/2024/12/01/0630/x"><h2 class="articleTitle">X</h2></a></div>"#,
        );
        let (orchestrator, catalog) = setup(fetcher);

        let response = run_once(
            Command::Popular {
                source: "kompas".to_string(),
            },
            &orchestrator,
            &catalog,
        )
        .await
        .unwrap();
        assert_eq!(response.count, 1);
        assert_eq!(response.articles[0].title, "X");
    }

    #[tokio::test]
    async fn test_run_once_unknown_source() {
        let (orchestrator, catalog) = setup(ScriptedFetcher::new());
        let err = run_once(
            Command::Popular {
                source: "tempo".to_string(),
            },
            &orchestrator,
            &catalog,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "scrape tempo not supported");
    }

    #[tokio::test]
    async fn test_run_once_detail_error_propagates() {
        let fetcher = ScriptedFetcher::new().page("https://news.detik.com/x", 500, "");
        let (orchestrator, catalog) = setup(fetcher);
        let result = run_once(
            Command::Detail {
                source: "detik".to_string(),
                url: "https://news.detik.com/x".to_string(),
            },
            &orchestrator,
            &catalog,
        )
        .await;
        assert!(result.is_err());
    }
}
