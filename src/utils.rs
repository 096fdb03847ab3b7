//! Small string helpers used across the crate.
//!
//! - Log-friendly truncation of response bodies
//! - Links back into this service's detail endpoint
//! - Attribute escaping for rewriting serialized HTML

/// Truncate a string for logging purposes.
///
/// Long strings are cut at `max` bytes (moved back to a char boundary) with an
/// ellipsis and the number of dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Relative link to this service's detail endpoint for an article URL.
pub fn detail_link(source: &str, article_url: &str) -> String {
    format!(
        "/article?source={}&detailUrl={}",
        urlencoding::encode(source),
        urlencoding::encode(article_url)
    )
}

/// Escape a value the way html5ever serializes attribute values.
pub fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('\u{a0}', "&nbsp;")
        .replace('"', "&quot;")
}
