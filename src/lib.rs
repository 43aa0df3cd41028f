//! linksweep: a same-domain broken link checker
//!
//! This crate crawls a web domain breadth-first (or the pages listed in its
//! XML sitemap), verifies every in-domain hyperlink it finds, and records the
//! links that fail with a not-found status or a network error.

pub mod config;
pub mod crawler;
pub mod output;
pub mod url;

use thiserror::Error;

/// Main error type for linksweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Sitemap index {url} could not be loaded: {message}")]
    SitemapFetch { url: String, message: String },

    #[error("Child sitemap {url} could not be loaded: {message}")]
    ChildSitemap { url: String, message: String },

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),
}

/// The crawl-level failure kinds callers can branch on
///
/// `NotFound` and `Network` are carried by [`output::LinkFailure`] records;
/// the sitemap kinds are carried by [`SweepError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Target answered with a not-found status (recorded, non-fatal)
    NotFound,
    /// Transport or protocol failure (recorded, non-fatal)
    Network,
    /// Top-level sitemap index unreachable or unparsable (fatal for the run)
    SitemapFetch,
    /// One child sitemap unreachable (skipped, siblings continue)
    ChildSitemap,
}

impl SweepError {
    /// Returns the crawl failure kind, or None for setup/infrastructure errors
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::SitemapFetch { .. } => Some(ErrorKind::SitemapFetch),
            Self::ChildSitemap { .. } => Some(ErrorKind::ChildSitemap),
            _ => None,
        }
    }

    /// Returns true if this error ends the whole run
    pub fn is_fatal(&self) -> bool {
        self.kind() != Some(ErrorKind::ChildSitemap)
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for linksweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, RunMode, RunSummary};
pub use output::{BrokenLinkRecord, CrawlObserver, LinkFailure, LogEvent, LogLevel};
pub use self::url::{CrawlTarget, DomainScope};
