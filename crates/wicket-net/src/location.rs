//! Absolute request locations.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{NetworkError, Result};

/// An absolute URL a request is sent to.
///
/// A location is built either from an absolute URL string or by resolving a
/// path against a base URL, the same way a browser resolves a relative link.
///
/// ```
/// use wicket_net::Location;
///
/// let location = Location::join("https://example.com/app/", "items?sort=asc").unwrap();
/// assert_eq!(location.absolute_url(), "https://example.com/app/items?sort=asc");
/// assert!(location.has_query());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Location {
    url: Url,
}

impl Location {
    /// Parse an absolute URL.
    pub fn parse(url: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(url.as_ref())?;
        Self::from_url(url)
    }

    /// Resolve `path` against `base`.
    pub fn join(base: impl AsRef<str>, path: impl AsRef<str>) -> Result<Self> {
        let url = Url::parse(base.as_ref())?.join(path.as_ref())?;
        Self::from_url(url)
    }

    /// Wrap an already parsed URL.
    ///
    /// Fails for URLs that cannot be fetched, such as `mailto:` or `data:` URLs.
    pub fn from_url(url: Url) -> Result<Self> {
        if url.cannot_be_a_base() {
            return Err(NetworkError::InvalidUrl(format!(
                "{url} is not a hierarchical URL"
            )));
        }
        Ok(Self { url })
    }

    /// The absolute URL as a string.
    pub fn absolute_url(&self) -> &str {
        self.url.as_str()
    }

    /// The parsed URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The path component.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Whether the URL already carries a query component (even an empty one).
    pub fn has_query(&self) -> bool {
        self.url.query().is_some()
    }
}

impl FromStr for Location {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<Url> for Location {
    type Error = NetworkError;

    fn try_from(url: Url) -> Result<Self> {
        Self::from_url(url)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.absolute_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_absolute() {
        let location: Location = "http://localhost:3000/items".parse().unwrap();
        assert_eq!(location.absolute_url(), "http://localhost:3000/items");
        assert_eq!(location.path(), "/items");
        assert!(!location.has_query());
    }

    #[test]
    fn test_join_absolute_path_replaces_base_path() {
        let location = Location::join("http://localhost:3000/app/page", "/items").unwrap();
        assert_eq!(location.absolute_url(), "http://localhost:3000/items");
    }

    #[test]
    fn test_empty_query_counts_as_query() {
        let location = Location::parse("http://localhost/items?").unwrap();
        assert!(location.has_query());
    }

    #[test]
    fn test_relative_without_base_fails() {
        assert!(matches!(
            Location::parse("/items"),
            Err(NetworkError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_opaque_url_rejected() {
        assert!(Location::parse("mailto:someone@example.com").is_err());
    }
}
