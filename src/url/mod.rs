//! URL handling module for linksweep
//!
//! This module provides start-URL normalization, link canonicalization,
//! domain scoping, and filesystem-safe naming for report directories.

mod domain;
mod normalize;

// Re-export main functions
pub use domain::{extract_domain, sanitize_for_filename, site_dir_name, DomainScope};
pub use normalize::{normalize_link, normalize_start_url};

use crate::{UrlError, UrlResult};
use url::Url;

/// A starting URL plus the domain scope derived from it
///
/// Created once per crawl invocation and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    start: Url,
    scope: DomainScope,
}

impl CrawlTarget {
    /// Parses user input into a crawl target
    ///
    /// # Examples
    ///
    /// ```
    /// use linksweep::url::CrawlTarget;
    ///
    /// let target = CrawlTarget::parse("example.com").unwrap();
    /// assert_eq!(target.start().as_str(), "https://example.com/");
    /// assert_eq!(target.scope().host(), "example.com");
    /// ```
    pub fn parse(input: &str) -> UrlResult<Self> {
        Self::from_url(normalize_start_url(input)?)
    }

    /// Builds a crawl target from an already parsed URL
    pub fn from_url(start: Url) -> UrlResult<Self> {
        let scope = DomainScope::from_url(&start).ok_or(UrlError::MissingDomain)?;
        Ok(Self { start, scope })
    }

    /// Returns the starting URL
    pub fn start(&self) -> &Url {
        &self.start
    }

    /// Returns the domain scope
    pub fn scope(&self) -> &DomainScope {
        &self.scope
    }

    /// Returns true if the URL is inside this target's domain scope
    pub fn in_scope(&self, url: &Url) -> bool {
        self.scope.contains(url)
    }
}
