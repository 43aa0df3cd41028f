//! HTML parser for extracting outbound links
//!
//! Only `<a href="...">` anchors are considered. Each href is resolved
//! against the page URL and then filtered.
//!
//! **Excluded:**
//! - Empty hrefs and fragment-only hrefs (`#section`)
//! - `javascript:`, `mailto:`, `tel:`, `data:` links
//! - Anything that is not HTTP(S) after resolution
//!
//! Fragments are stripped from the resolved URL. Duplicates are kept; the
//! crawler decides what has already been seen.

use crate::url::normalize_link;
use scraper::{Html, Selector};
use url::Url;

/// Schemes that never point at a crawlable page
const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// Extracts all outbound links from a page, in document order
///
/// Malformed markup is tolerated; at worst the result is empty.
///
/// # Example
///
/// ```
/// use linksweep::crawler::extract_links;
/// use url::Url;
///
/// let page = Url::parse("https://example.com/docs/").unwrap();
/// let links = extract_links(&page, r#"<a href="intro">Intro</a>"#);
/// assert_eq!(links[0].as_str(), "https://example.com/docs/intro");
/// ```
pub fn extract_links(page_url: &Url, html: &str) -> Vec<Url> {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(href, page_url))
        .collect()
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme)) {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    match absolute_url.scheme() {
        "http" | "https" => Some(normalize_link(absolute_url)),
        _ => None,
    }
}
