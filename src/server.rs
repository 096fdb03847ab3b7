//! HTTP API over the orchestrator.
//!
//! | Route | Query | Returns |
//! |-------|-------|---------|
//! | `GET /articles/popular` | `source` | cached popular listing |
//! | `GET /articles` | `source`, `q` | search results |
//! | `GET /article` | `source`, `detailUrl` | one article |
//!
//! Files under the configured static directory are served at `/static/...`;
//! any other path gets the frontend's `index.html`, or `404 File not found`
//! when there is none.
//!
//! `source` defaults to `detik`. Listing URLs are rewritten to point at
//! `/article` on this host when the response is built, so cached entries
//! never depend on who asked first.

use crate::error::ScrapeError;
use crate::models::{Article, ArticlesResponse};
use crate::orchestrator::Orchestrator;
use crate::scrapers::{Catalog, Source};
use crate::utils::detail_link;
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument};

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub catalog: Arc<Catalog>,
    pub static_dir: PathBuf,
}

impl AppState {
    fn source(&self, name: &str) -> Result<&Source, ApiError> {
        self.catalog
            .get(name)
            .ok_or_else(|| ApiError::UnknownSource(name.to_string()))
    }
}

fn default_source() -> String {
    "detik".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
    #[serde(default = "default_source")]
    source: String,
    q: Option<String>,
    #[serde(rename = "detailUrl")]
    detail_url: Option<String>,
}

#[derive(Debug)]
enum ApiError {
    MissingParam(&'static str),
    UnknownSource(String),
    Upstream(ScrapeError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, desc) = match self {
            ApiError::MissingParam(name) => (
                StatusCode::BAD_REQUEST,
                format!("param {name} is not exists or is empty"),
            ),
            ApiError::UnknownSource(name) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("scrape {name} not supported"),
            ),
            ApiError::Upstream(e @ ScrapeError::SearchUnsupported(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
            }
            ApiError::Upstream(e) => {
                error!(error = %e, "Upstream request failed");
                (StatusCode::BAD_GATEWAY, e.to_string())
            }
        };
        (status, Json(json!({ "status": "Failed", "desc": desc }))).into_response()
    }
}

impl From<ScrapeError> for ApiError {
    fn from(e: ScrapeError) -> Self {
        ApiError::Upstream(e)
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::MissingParam(name))
}

/// `scheme://host` of the request as the client saw it.
fn request_origin(headers: &HeaderMap) -> String {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// Point each listing entry at this service's detail endpoint.
fn link_articles(mut articles: Vec<Article>, origin: &str, source: &str) -> Vec<Article> {
    for article in &mut articles {
        article.url = format!("{origin}{}", detail_link(source, &article.url));
    }
    articles
}

#[instrument(level = "info", skip(state, headers))]
async fn popular(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let source = state.source(&query.source)?;
    let articles = state
        .orchestrator
        .get_aggregate(
            source.name(),
            &source.descriptor.popular_urls,
            source.extractors.list,
        )
        .await;
    let articles = link_articles(articles, &request_origin(&headers), source.name());
    Ok(Json(ArticlesResponse::success(articles)))
}

#[instrument(level = "info", skip(state, headers))]
async fn search(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let keyword = required(query.q, "q")?;
    let source = state.source(&query.source)?;
    let articles = state
        .orchestrator
        .search(&source.descriptor, &keyword, source.extractors.list)
        .await?;
    let articles = link_articles(articles, &request_origin(&headers), source.name());
    Ok(Json(ArticlesResponse::success(articles)))
}

#[instrument(level = "info", skip(state))]
async fn detail(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ArticlesResponse>, ApiError> {
    let url = required(query.detail_url, "detailUrl")?;
    let source = state.source(&query.source)?;
    let article = state
        .orchestrator
        .detail(source.name(), &url, source.extractors.detail)
        .await?;
    Ok(Json(ArticlesResponse::success(vec![article])))
}

/// Unmatched paths fall through to the frontend's entry page.
async fn frontend(State(state): State<AppState>, request: Request) -> Response {
    let index = state.static_dir.join("index.html");
    if tokio::fs::metadata(&index).await.is_err() {
        debug!(path = %index.display(), "No frontend index");
        return (StatusCode::NOT_FOUND, "File not found").into_response();
    }
    let response: Result<_, Infallible> = ServeFile::new(index).oneshot(request).await;
    match response {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// Build the API router over `state`.
///
/// # Arguments
///
/// * `state` - Orchestrator, source catalog and frontend directory shared by
///   every handler
///
/// # Returns
///
/// A router with the three JSON routes, `/static` file serving, the frontend
/// fallback and request tracing.
pub fn router(state: AppState) -> Router {
    let assets = ServeDir::new(&state.static_dir);
    Router::new()
        .route("/articles/popular", get(popular))
        .route("/articles", get(search))
        .route("/article", get(detail))
        .nest_service("/static", assets)
        .fallback(frontend)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `bind` until Ctrl-C.
pub async fn serve(bind: &str, state: AppState) -> Result<(), Box<dyn Error>> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(addr = %listener.local_addr()?, "Server listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown requested");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TtlCache;
    use crate::config::SourceDescriptor;
    use crate::fetch::testing::ScriptedFetcher;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use std::path::Path;
    use std::time::Duration;

    const LISTING: &str = r#"
        <article class="list-content__item">
            <h3 class="media__title"><a href="https://news.detik.com/berita/d-1/satu">Satu</a></h3>
        </article>
        <article class="list-content__item">
            <h3 class="media__title"><a href="https://news.detik.com/berita/d-2/dua">Dua</a></h3>
        </article>"#;

    fn app(fetcher: ScriptedFetcher) -> Router {
        app_serving(fetcher, PathBuf::from("/nonexistent/gober-static"))
    }

    fn app_serving(fetcher: ScriptedFetcher, static_dir: PathBuf) -> Router {
        let catalog = Catalog::from_descriptors(&[
            SourceDescriptor {
                name: "detik".to_string(),
                popular_urls: vec![
                    "https://detik.test/terpopuler/news".to_string(),
                    "https://detik.test/terpopuler/down".to_string(),
                ],
                search_url: Some("https://detik.test/search?query={query}".to_string()),
            },
            SourceDescriptor {
                name: "kompas".to_string(),
                popular_urls: vec![],
                search_url: None,
            },
        ]);
        let orchestrator = Orchestrator::new(
            Arc::new(fetcher),
            Arc::new(TtlCache::new()),
            Duration::from_secs(300),
            Duration::from_secs(300),
        );
        router(AppState {
            orchestrator: Arc::new(orchestrator),
            catalog: Arc::new(catalog),
            static_dir,
        })
    }

    async fn call_text(app: Router, uri: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(uri)
            .header("host", "gober.test")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = call_text(app, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    /// A fresh frontend directory with an entry page and one asset.
    fn frontend_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gober-{}-{name}", std::process::id()));
        std::fs::create_dir_all(dir.join("js")).unwrap();
        std::fs::write(dir.join("index.html"), "<div id=\"app\"></div>").unwrap();
        std::fs::write(dir.join("js").join("app.js"), "createApp(App).mount('#app')").unwrap();
        dir
    }

    fn remove(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_popular_defaults_to_detik_and_links_back() {
        let fetcher = ScriptedFetcher::new()
            .page("https://detik.test/terpopuler/news", 200, LISTING)
            .unreachable("https://detik.test/terpopuler/down");

        let (status, body) = call(app(fetcher), "/articles/popular").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Success");
        assert_eq!(body["count"], 2);

        let urls: Vec<&str> = body["articles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["url"].as_str().unwrap())
            .collect();
        assert!(urls.contains(
            &"http://gober.test/article?source=detik&detailUrl=https%3A%2F%2Fnews.detik.com%2Fberita%2Fd-1%2Fsatu"
        ));
        let sources: Vec<&str> = body["articles"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["source_url"].as_str().unwrap())
            .collect();
        assert!(sources.contains(&"https://news.detik.com/berita/d-2/dua"));
    }

    #[tokio::test]
    async fn test_unknown_source_is_unprocessable() {
        let (status, body) = call(app(ScriptedFetcher::new()), "/articles/popular?source=tempo").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "Failed");
        assert_eq!(body["desc"], "scrape tempo not supported");
    }

    #[tokio::test]
    async fn test_detail_requires_detail_url() {
        let (status, body) = call(app(ScriptedFetcher::new()), "/article?source=detik&detailUrl=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["desc"], "param detailUrl is not exists or is empty");
    }

    #[tokio::test]
    async fn test_detail_returns_single_article() {
        let fetcher = ScriptedFetcher::new().page(
            "https://news.detik.com/berita/d-1/satu",
            200,
            r#"<h1 class="detail__title">Satu</h1>"#,
        );
        let (status, body) = call(
            app(fetcher),
            "/article?source=detik&detailUrl=https%3A%2F%2Fnews.detik.com%2Fberita%2Fd-1%2Fsatu",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["articles"][0]["title"], "Satu");
        assert_eq!(body["articles"][0]["url"], "https://news.detik.com/berita/d-1/satu");
    }

    #[tokio::test]
    async fn test_detail_upstream_failure_is_bad_gateway() {
        let fetcher = ScriptedFetcher::new().page("https://news.detik.com/x", 404, "");
        let (status, body) = call(
            app(fetcher),
            "/article?detailUrl=https%3A%2F%2Fnews.detik.com%2Fx",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["desc"], "error: status code 404 from https://news.detik.com/x");
    }

    #[tokio::test]
    async fn test_search() {
        let fetcher = ScriptedFetcher::new().page("https://detik.test/search?query=banjir", 200, LISTING);
        let (status, body) = call(app(fetcher), "/articles?q=banjir").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);

        let (status, _) = call(app(ScriptedFetcher::new()), "/articles?source=detik").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_unsupported_source() {
        let (status, body) = call(app(ScriptedFetcher::new()), "/articles?source=kompas&q=x").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["desc"], "source kompas does not support search");
    }

    #[tokio::test]
    async fn test_unknown_path_without_frontend_is_not_found() {
        let (status, body) = call_text(app(ScriptedFetcher::new()), "/berita/some-page").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "File not found");
    }

    #[tokio::test]
    async fn test_unknown_path_serves_frontend_index() {
        let dir = frontend_dir("index");
        let (status, body) = call_text(app_serving(ScriptedFetcher::new(), dir.clone()), "/detail/abc").await;
        remove(&dir);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<div id=\"app\"></div>");
    }

    #[tokio::test]
    async fn test_static_assets_are_served() {
        let dir = frontend_dir("assets");
        let app = app_serving(ScriptedFetcher::new(), dir.clone());
        let (status, body) = call_text(app.clone(), "/static/js/app.js").await;
        let (missing, _) = call_text(app, "/static/js/nope.js").await;
        remove(&dir);
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "createApp(App).mount('#app')");
        assert_eq!(missing, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_routes_win_over_frontend() {
        let dir = frontend_dir("api");
        let (status, body) = call(
            app_serving(ScriptedFetcher::new(), dir.clone()),
            "/articles/popular?source=tempo",
        )
        .await;
        remove(&dir);
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "Failed");
    }

    #[test]
    fn test_request_origin_honors_forwarded_proto() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "news.example".parse().unwrap());
        assert_eq!(request_origin(&headers), "http://news.example");
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        assert_eq!(request_origin(&headers), "https://news.example");
    }
}
