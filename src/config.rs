//! Runtime configuration loaded from an optional YAML file.
//!
//! Every field has a default, so a missing file or a partial one both work.
//! Without a file the service knows the two built-in sources, `detik` and
//! `kompas`, with their usual seed URLs.
//!
//! ```yaml
//! bind: 0.0.0.0:8080
//! list_ttl_secs: 300
//! detail_ttl_secs: 300
//! request_timeout_secs: 30
//! static_dir: ./static
//! sources:
//!   - name: detik
//!     popular_urls:
//!       - https://www.detik.com/terpopuler/news
//!     search_url: https://www.detik.com/search/searchall?query={query}
//! ```

use crate::scrapers::{detik, kompas};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, instrument};

/// A named source and the pages that make up its popular listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceDescriptor {
    pub name: String,
    #[serde(default)]
    pub popular_urls: Vec<String>,
    /// Search page URL with a `{query}` placeholder.
    #[serde(default)]
    pub search_url: Option<String>,
}

impl SourceDescriptor {
    /// The search URL for `keyword`, if this source supports search.
    pub fn search_url_for(&self, keyword: &str) -> Option<String> {
        self.search_url
            .as_ref()
            .map(|template| template.replace("{query}", &urlencoding::encode(keyword)))
    }
}

/// Service settings. Any field missing from the YAML keeps its default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP server listens on.
    pub bind: String,
    /// How long a popular listing stays cached.
    pub list_ttl_secs: u64,
    /// How long a single article stays cached.
    pub detail_ttl_secs: u64,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Web frontend assets: served under `/static`, with `index.html` as the
    /// answer to any unknown path.
    pub static_dir: PathBuf,
    pub sources: Vec<SourceDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            list_ttl_secs: 300,
            detail_ttl_secs: 300,
            request_timeout_secs: 30,
            user_agent: format!("gober/{}", env!("CARGO_PKG_VERSION")),
            static_dir: PathBuf::from("./static"),
            sources: default_sources(),
        }
    }
}

fn owned(urls: &[&str]) -> Vec<String> {
    urls.iter().map(|u| u.to_string()).collect()
}

fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor {
            name: detik::NAME.to_string(),
            popular_urls: owned(detik::POPULAR_URLS),
            search_url: Some(detik::SEARCH_URL.to_string()),
        },
        SourceDescriptor {
            name: kompas::NAME.to_string(),
            popular_urls: owned(kompas::POPULAR_URLS),
            search_url: None,
        },
    ]
}

impl Config {
    pub fn list_ttl(&self) -> Duration {
        Duration::from_secs(self.list_ttl_secs)
    }

    pub fn detail_ttl(&self) -> Duration {
        Duration::from_secs(self.detail_ttl_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load the file at `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let yaml = tokio::fs::read_to_string(path).await?;
        let config = Self::from_yaml(&yaml)?;
        info!(
            sources = config.sources.len(),
            list_ttl_secs = config.list_ttl_secs,
            detail_ttl_secs = config.detail_ttl_secs,
            "Loaded configuration"
        );
        Ok(config)
    }
}
