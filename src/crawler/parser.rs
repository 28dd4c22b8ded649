//! HTML link extraction
//!
//! Extracts the absolute URLs referenced by `<a href>` elements of a page.
//! Parsing is lenient: malformed or truncated markup yields whatever links
//! the HTML5 parser recovers, and non-HTML bytes simply yield none.

use scraper::{Html, Selector};
use url::Url;

/// Capability to extract links from a fetched page
pub trait LinkExtractor: Send + Sync {
    /// Returns the absolute URLs referenced by the page, in document order
    fn extract(&self, html: &[u8], base_url: &Url) -> Vec<String>;
}

/// Link extractor built on `scraper`
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlLinkExtractor;

impl LinkExtractor for HtmlLinkExtractor {
    fn extract(&self, html: &[u8], base_url: &Url) -> Vec<String> {
        let html = String::from_utf8_lossy(html);
        extract_links(&html, base_url)
    }
}

/// Extracts all followable links from an HTML document
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">`, resolved against `base_url`
///
/// **Exclude:**
/// - Empty hrefs and fragment-only links (same page anchors)
/// - `javascript:`, `mailto:`, `tel:`, `data:` and every other non-HTTP(S) scheme
/// - Hrefs that cannot be resolved to a URL
///
/// # Example
///
/// ```
/// use sitewalk::crawler::extract_links;
/// use url::Url;
///
/// let html = r#"<a href="/page">Page</a><a href="mailto:me@example.com">Mail</a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// assert_eq!(extract_links(html, &base), vec!["https://example.com/page"]);
/// ```
pub fn extract_links(html: &str, base_url: &Url) -> Vec<String> {
    if html.trim().is_empty() {
        tracing::trace!("Empty HTML content for {}, no links", base_url);
        return Vec::new();
    }

    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.push(absolute_url);
                }
            }
        }
    }

    links
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.to_ascii_lowercase().starts_with("javascript:") {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) if matches!(absolute_url.scheme(), "http" | "https") => {
            Some(absolute_url.to_string())
        }
        Ok(absolute_url) => {
            tracing::trace!("Skipping URL with unsupported scheme: {}", absolute_url);
            None
        }
        Err(_) => None,
    }
}
