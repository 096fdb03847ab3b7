//! kompas.com extractors.
//!
//! The index pages list `div.articleItem` cards. Card dates carry only the
//! day; the time of publication is encoded as `HHMM…` in the second-to-last
//! path segment of the article URL.

use super::{Extractors, first_attr, first_text, host_of};
use crate::models::Article;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

pub const NAME: &str = "kompas";

pub const EXTRACTORS: Extractors = Extractors {
    list: extract_list,
    detail: extract_detail,
};

pub const POPULAR_URLS: &[&str] = &[
    "https://indeks.kompas.com/terpopuler",
    "https://indeks.kompas.com/headline",
];

fn sel(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static ITEM: Lazy<Selector> = Lazy::new(|| sel("div.articleItem"));
static ITEM_LINK: Lazy<Selector> = Lazy::new(|| sel("a.article-link"));
static ITEM_TITLE: Lazy<Selector> = Lazy::new(|| sel("h2.articleTitle"));
static ITEM_IMAGE: Lazy<Selector> = Lazy::new(|| sel("div.articleItem-img img"));
static ITEM_DATE: Lazy<Selector> = Lazy::new(|| sel("div.articlePost-date"));

static TITLE: Lazy<Selector> = Lazy::new(|| sel("h1.read__title"));
static AUTHOR: Lazy<Selector> = Lazy::new(|| sel("div.credit-title"));
static DATE: Lazy<Selector> = Lazy::new(|| sel("div.read__time"));
static PHOTO: Lazy<Selector> = Lazy::new(|| sel("div.photo__wrap img"));
static BODY: Lazy<Selector> = Lazy::new(|| sel("div.read__content"));

static CLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{2})(\d{2})").unwrap());

/// `HH:MM` from a kompas article URL such as
/// `https://nasional.kompas.com/read/2024/12/01/06301231/judul`.
fn publication_time(link: &str) -> Option<String> {
    let parsed = url::Url::parse(link).ok()?;
    let segments: Vec<&str> = parsed.path_segments()?.collect();
    let segment = segments.len().checked_sub(2).map(|i| segments[i])?;
    let caps = CLOCK.captures(segment)?;
    Some(format!("{}:{}", &caps[1], &caps[2]))
}

/// Extract the article cards from the kompas "terpopuler" index.
///
/// # Arguments
///
/// * `document` - A parsed listing page
///
/// # Returns
///
/// One article per `div.articleItem`. `source_url` asks for the single-page
/// view (`?page=all`) and `date` carries the day plus the `HH:MM WIB` read
/// from the link when the URL has one.
pub fn extract_list(document: &Html) -> Vec<Article> {
    document
        .select(&ITEM)
        .map(|card| {
            let link = first_attr(card, &ITEM_LINK, "href").unwrap_or_default();
            let day = first_text(card, &ITEM_DATE);
            let date = match publication_time(&link) {
                Some(time) => format!("{day}, {time} WIB"),
                None => day,
            };
            Article {
                short_desc: host_of(&link),
                source_url: format!("{link}?page=all"),
                title: first_text(card, &ITEM_TITLE),
                image_url: first_attr(card, &ITEM_IMAGE, "src").unwrap_or_default(),
                date,
                url: link,
                ..Default::default()
            }
        })
        .collect()
}

/// Extract a full kompas article. The body is kept as HTML, links untouched.
pub fn extract_detail(url: &str, document: &Html) -> Article {
    let root = document.root_element();
    Article {
        url: url.to_string(),
        title: first_text(root, &TITLE),
        author: first_text(root, &AUTHOR),
        date: first_text(root, &DATE),
        image_url: first_attr(root, &PHOTO, "src").unwrap_or_default(),
        source_url: url.to_string(),
        content: root.select(&BODY).next().map(|b| b.inner_html()).unwrap_or_default(),
        ..Default::default()
    }
}
