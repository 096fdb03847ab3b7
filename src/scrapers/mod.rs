//! Per-source extractors and the catalog that pairs them with configuration.
//!
//! Each source module exports a pair of pure functions over a parsed page:
//!
//! | Source | Module | Popular | Search |
//! |--------|--------|---------|--------|
//! | detik.com | [`detik`] | `terpopuler` sections | yes |
//! | kompas.com | [`kompas`] | `indeks.kompas.com` | no |
//!
//! Extractors never do I/O. A page with no matching markup yields an empty
//! list (or an article with empty fields), never an error.

pub mod detik;
pub mod kompas;

use crate::config::SourceDescriptor;
use crate::models::Article;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Listing page to articles.
pub type ListExtractor = fn(&Html) -> Vec<Article>;

/// Article page to article. The first argument is the page URL.
pub type DetailExtractor = fn(&str, &Html) -> Article;

/// The extraction functions for one source.
#[derive(Clone, Copy)]
pub struct Extractors {
    pub list: ListExtractor,
    pub detail: DetailExtractor,
}

/// Look up the extractors registered under a source name.
pub fn extractors_for(name: &str) -> Option<Extractors> {
    match name {
        detik::NAME => Some(detik::EXTRACTORS),
        kompas::NAME => Some(kompas::EXTRACTORS),
        _ => None,
    }
}

/// A configured source with its extraction rules.
#[derive(Clone)]
pub struct Source {
    pub descriptor: SourceDescriptor,
    pub extractors: Extractors,
}

impl Source {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// The sources this process can serve, keyed by name.
#[derive(Clone, Default)]
pub struct Catalog {
    sources: BTreeMap<String, Source>,
}

impl Catalog {
    /// Pair each descriptor with its extractors. Descriptors naming a source
    /// without extractors are skipped.
    pub fn from_descriptors(descriptors: &[SourceDescriptor]) -> Self {
        let mut sources = BTreeMap::new();
        for descriptor in descriptors {
            match extractors_for(&descriptor.name) {
                Some(extractors) => {
                    sources.insert(
                        descriptor.name.clone(),
                        Source {
                            descriptor: descriptor.clone(),
                            extractors,
                        },
                    );
                }
                None => warn!(source = %descriptor.name, "No extractors for source; skipping"),
            }
        }
        let catalog = Self { sources };
        info!(sources = ?catalog.names(), "Source catalog ready");
        catalog
    }

    pub fn get(&self, name: &str) -> Option<&Source> {
        self.sources.get(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }
}

/// Whitespace-normalized text of an element.
pub(crate) fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text of the first match of `selector` under `scope`, or empty.
pub(crate) fn first_text(scope: ElementRef<'_>, selector: &Selector) -> String {
    scope.select(selector).next().map(text_of).unwrap_or_default()
}

/// Attribute of the first match of `selector` under `scope`.
pub(crate) fn first_attr(scope: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    scope
        .select(selector)
        .next()
        .and_then(|e| e.value().attr(attr))
        .map(str::to_string)
}

/// Host part of a URL, or empty when it does not parse.
pub(crate) fn host_of(link: &str) -> String {
    url::Url::parse(link)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}
