use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use url::Url;

/// A normalized, absolute URL eligible for fetching
///
/// Instances are only produced by the normalization functions in this module,
/// so two targets that name the same resource compare equal and hash
/// identically: the fragment is gone, the trailing slash and default port are
/// canonical, and the query string is kept verbatim.
///
/// A target also remembers the URL it was discovered as. That one is what
/// gets requested, since servers may treat `/docs/` and `/docs` differently
/// and relative links resolve against the directory form. Equality, hashing,
/// ordering and serialization only look at the canonical form.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    canonical: Url,
    request: Url,
}

impl CrawlTarget {
    pub(crate) fn new(canonical: Url, request: Url) -> Self {
        Self { canonical, request }
    }

    pub fn as_str(&self) -> &str {
        self.canonical.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.canonical
    }

    /// The URL to send the request to
    pub fn request_url(&self) -> &Url {
        &self.request
    }

    /// The lowercase host of this target
    pub fn host(&self) -> &str {
        // Normalization rejects URLs without a host
        self.canonical.host_str().unwrap_or_default()
    }

    /// Rewrites both forms to `scheme`, or None if `url` refuses the change
    pub(crate) fn with_scheme(mut self, scheme: &str) -> Option<Self> {
        self.canonical.set_scheme(scheme).ok()?;
        self.request.set_scheme(scheme).ok()?;
        Some(self)
    }
}

impl PartialEq for CrawlTarget {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for CrawlTarget {}

impl Hash for CrawlTarget {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for CrawlTarget {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CrawlTarget {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl Serialize for CrawlTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.canonical.as_str())
    }
}

impl fmt::Display for CrawlTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical.as_str())
    }
}

impl AsRef<str> for CrawlTarget {
    fn as_ref(&self) -> &str {
        self.canonical.as_str()
    }
}
