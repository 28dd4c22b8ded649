use crate::url::normalize::normalize_url;
use crate::url::target::CrawlTarget;
use crate::UrlError;
use url::Url;

/// The host boundary of a crawl
///
/// A URL is in scope when its host matches the seed's host exactly
/// (subdomains are different hosts) and its explicit port, if any, matches the
/// seed's. Default ports are equivalent to no port. In-scope targets are
/// rewritten to the seed's scheme so `http://` and `https://` variants of one
/// page collapse into a single target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainScope {
    scheme: String,
    host: String,
    port: Option<u16>,
}

impl DomainScope {
    /// Builds the scope defined by a seed target
    pub fn from_target(seed: &CrawlTarget) -> Self {
        let url = seed.as_url();
        Self {
            scheme: url.scheme().to_string(),
            host: seed.host().to_string(),
            port: url.port(),
        }
    }

    /// Builds a scope for an explicit host, using https and the default port
    pub fn for_host(host: &str) -> Self {
        Self {
            scheme: "https".to_string(),
            host: host.to_lowercase(),
            port: None,
        }
    }

    /// The reference host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The scheme in-scope targets are rewritten to
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Returns true if the URL is an http(s) URL on exactly this host and port
    ///
    /// # Examples
    ///
    /// ```
    /// use sitewalk::url::{normalize_url, DomainScope};
    /// use url::Url;
    ///
    /// let scope = DomainScope::from_target(&normalize_url("https://example.com/").unwrap());
    /// assert!(scope.contains(&Url::parse("https://example.com:443/a").unwrap()));
    /// assert!(scope.contains(&Url::parse("http://example.com/a").unwrap()));
    /// assert!(!scope.contains(&Url::parse("https://blog.example.com/").unwrap()));
    /// ```
    pub fn contains(&self, url: &Url) -> bool {
        if url.scheme() != "http" && url.scheme() != "https" {
            return false;
        }

        match url.host_str() {
            Some(host) => host.eq_ignore_ascii_case(&self.host) && url.port() == self.port,
            None => false,
        }
    }

    /// Admits an already-normalized target into the scope
    ///
    /// Returns the target rewritten to the scope's scheme, or
    /// `UrlError::OutOfDomain` if it lives on another host.
    pub fn admit(&self, target: CrawlTarget) -> Result<CrawlTarget, UrlError> {
        if !self.contains(target.as_url()) {
            return Err(UrlError::OutOfDomain {
                url: target.to_string(),
                host: self.host.clone(),
            });
        }

        if target.as_url().scheme() == self.scheme {
            return Ok(target);
        }

        target
            .with_scheme(&self.scheme)
            .ok_or_else(|| UrlError::InvalidScheme(self.scheme.clone()))
    }

    /// Normalizes a URL string and rejects it unless it is in scope
    pub fn normalize(&self, url_str: &str) -> Result<CrawlTarget, UrlError> {
        self.admit(normalize_url(url_str)?)
    }

    /// Canonical form of a discovered link for reporting
    ///
    /// In-scope links get the scope's scheme; out-of-scope links are only
    /// normalized. Returns None for anything that is not a valid http(s) URL.
    pub fn canonicalize_link(&self, url_str: &str) -> Option<CrawlTarget> {
        let target = normalize_url(url_str).ok()?;
        if self.contains(target.as_url()) {
            self.admit(target).ok()
        } else {
            Some(target)
        }
    }
}
