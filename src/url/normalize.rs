use crate::url::target::CrawlTarget;
use crate::UrlError;
use url::Url;

/// Schemes the crawler is willing to fetch
pub const SUPPORTED_SCHEMES: &[&str] = &["http", "https"];

/// Normalizes an absolute URL into a [`CrawlTarget`]
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or relative
/// 2. Reject schemes other than http and https
/// 3. Reject URLs without a host
/// 4. Lowercase the host and drop the scheme's default port (done by `url`)
/// 5. Normalize path:
///    - Remove dot segments (. and ..)
///    - Collapse repeated slashes
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 6. Remove fragment (everything after #)
/// 7. Keep the query string as-is, dropping only an empty trailing `?`
///
/// No domain check happens here; see [`crate::url::DomainScope`] for that.
///
/// # Examples
///
/// ```
/// use sitewalk::url::normalize_url;
///
/// let target = normalize_url("https://EXAMPLE.com:443/docs/?page=2#intro").unwrap();
/// assert_eq!(target.as_str(), "https://example.com/docs?page=2");
/// ```
pub fn normalize_url(url_str: &str) -> Result<CrawlTarget, UrlError> {
    let url_str = url_str.trim();
    let mut url = Url::parse(url_str).map_err(|e| match e {
        url::ParseError::RelativeUrlWithoutBase => UrlError::MissingProtocol(url_str.to_string()),
        other => UrlError::Parse(other.to_string()),
    })?;

    if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlError::MissingHost),
    }

    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    let request = url.clone();
    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    Ok(CrawlTarget::new(url, request))
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    if path.is_empty() {
        return "/".to_string();
    }

    let mut normalized_segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            // Skip empty segments (from multiple slashes) and current directory markers
            "" | "." => continue,
            ".." => {
                normalized_segments.pop();
            }
            _ => normalized_segments.push(segment),
        }
    }

    if normalized_segments.is_empty() {
        return "/".to_string();
    }

    // Joining without a trailing separator drops the trailing slash
    format!("/{}", normalized_segments.join("/"))
}
