use crate::url::normalize::{normalize_url, SUPPORTED_SCHEMES};
use crate::url::target::CrawlTarget;
use crate::UrlError;

/// Scheme assumed when the user omits one
pub const DEFAULT_SCHEME: &str = "https";

/// Parses user input into the seed target of a crawl
///
/// A missing protocol defaults to https (`example.com` becomes
/// `https://example.com/`). An explicit protocol other than http or https is
/// rejected before any parsing happens.
///
/// # Examples
///
/// ```
/// use sitewalk::url::parse_seed;
///
/// assert_eq!(parse_seed("example.com/docs/").unwrap().as_str(), "https://example.com/docs");
/// assert!(parse_seed("ftp://example.com").is_err());
/// ```
pub fn parse_seed(input: &str) -> Result<CrawlTarget, UrlError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let with_scheme = match input.split_once("://") {
        Some((scheme, _)) => {
            let scheme = scheme.to_lowercase();
            if !SUPPORTED_SCHEMES.contains(&scheme.as_str()) {
                return Err(UrlError::InvalidScheme(scheme));
            }
            input.to_string()
        }
        None => {
            let prefixed = format!("{}://{}", DEFAULT_SCHEME, input);
            tracing::info!("Added {} protocol to URL: {} -> {}", DEFAULT_SCHEME, input, prefixed);
            prefixed
        }
    };

    normalize_url(&with_scheme)
}
