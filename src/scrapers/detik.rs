//! detik.com extractors.
//!
//! Listing pages (`/terpopuler/<section>` and search results) share the
//! `article.list-content__item` card markup. Article pages keep the body in
//! `div.detail__body-text.itp_bodycontent`; links inside it are pointed back
//! at this service so readers stay on the text view.

use super::{Extractors, first_attr, first_text, host_of};
use crate::models::Article;
use crate::utils::{detail_link, escape_attr};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

pub const NAME: &str = "detik";

pub const EXTRACTORS: Extractors = Extractors {
    list: extract_list,
    detail: extract_detail,
};

/// Sections scraped for the popular listing.
pub const POPULAR_URLS: &[&str] = &[
    "https://www.detik.com/terpopuler/news",
    "https://www.detik.com/terpopuler/finance",
    "https://www.detik.com/terpopuler/hot",
    "https://www.detik.com/terpopuler/inet",
    "https://www.detik.com/terpopuler/sport",
    "https://www.detik.com/terpopuler/oto",
    "https://www.detik.com/terpopuler/travel",
    "https://www.detik.com/terpopuler/sepakbola",
    "https://www.detik.com/terpopuler/food",
    "https://www.detik.com/terpopuler/health",
    "https://www.detik.com/terpopuler/edu",
];

pub const SEARCH_URL: &str =
    "https://www.detik.com/search/searchall?query={query}&page=1&result_type=latest";

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static ITEM: Lazy<Selector> = Lazy::new(|| sel("article.list-content__item"));
static ITEM_LINK: Lazy<Selector> = Lazy::new(|| sel("h3.media__title a"));
static ITEM_IMAGE: Lazy<Selector> = Lazy::new(|| sel("div.media__image img"));
static ITEM_DATE: Lazy<Selector> = Lazy::new(|| sel("div.media__date span"));

static TITLE: Lazy<Selector> = Lazy::new(|| sel("h1.detail__title"));
static AUTHOR: Lazy<Selector> = Lazy::new(|| sel("div.detail__author"));
static DATE: Lazy<Selector> = Lazy::new(|| sel("div.detail__date"));
static MEDIA_IMAGE: Lazy<Selector> = Lazy::new(|| sel("div.detail__media img"));
static BODY: Lazy<Selector> = Lazy::new(|| sel("div.detail__body-text.itp_bodycontent"));
static ANCHOR: Lazy<Selector> = Lazy::new(|| sel("a[href]"));

/// Extract the article cards from a listing or search page.
pub fn extract_list(document: &Html) -> Vec<Article> {
    document
        .select(&ITEM)
        .map(|card| {
            let link = first_attr(card, &ITEM_LINK, "href").unwrap_or_default();
            Article {
                short_desc: host_of(&link),
                title: first_text(card, &ITEM_LINK),
                image_url: first_attr(card, &ITEM_IMAGE, "src").unwrap_or_default(),
                date: first_attr(card, &ITEM_DATE, "title").unwrap_or_else(|| "-".to_string()),
                source_url: link.clone(),
                url: link,
                ..Default::default()
            }
        })
        .collect()
}

/// Extract a full article page.
pub fn extract_detail(url: &str, document: &Html) -> Article {
    let root = document.root_element();
    let content = root
        .select(&BODY)
        .next()
        .map(|body| {
            let mut html = body.inner_html();
            for anchor in body.select(&ANCHOR) {
                let Some(href) = anchor.value().attr("href") else {
                    continue;
                };
                // Tag pages have no article body to show, and an empty href has
                // nothing to point the detail endpoint at.
                if href.is_empty() || href.contains("tag") {
                    continue;
                }
                html = html.replace(
                    &format!("href=\"{}\"", escape_attr(href)),
                    &format!("href=\"{}\"", escape_attr(&detail_link(NAME, href))),
                );
            }
            html
        })
        .unwrap_or_default();

    Article {
        url: url.to_string(),
        title: first_text(root, &TITLE),
        author: first_text(root, &AUTHOR),
        date: first_text(root, &DATE),
        image_url: first_attr(root, &MEDIA_IMAGE, "src").unwrap_or_default(),
        source_url: url.to_string(),
        content,
        ..Default::default()
    }
}
