//! Crawler module for fetching pages and verifying links
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and outcome classification
//! - HTML link extraction
//! - XML sitemap resolution
//! - The frontier and visited tracking
//! - Overall crawl coordination in full-crawl and sitemap modes

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod sitemap;
pub mod status;

pub use coordinator::{Coordinator, RunContext, RunMode};
pub use fetcher::{build_http_client, fetch_url, first_line, FetchedPage, PageOutcome};
pub use frontier::Frontier;
pub use parser::extract_links;
pub use sitemap::{
    default_sitemap_url, parse_sitemap, SitemapDocument, SitemapEntry, SitemapKind,
    SitemapResolver, DEFAULT_SITEMAP_PATH,
};
pub use status::{explain, StatusCategory};

pub use crate::output::RunSummary;

use crate::config::Config;
use crate::output::CrawlObserver;
use crate::url::{normalize_start_url, CrawlTarget};
use crate::Result;
use std::sync::Arc;

/// Runs a complete sweep from user input
///
/// This is the main entry point for a run. It will:
/// 1. Normalize the input URL (adding `https://` when no scheme is given)
/// 2. Build the HTTP client
/// 3. Crawl the domain, or process the sitemap, depending on `mode`
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run completed (possibly with broken links)
/// * `Err(SweepError)` - The input was unusable or the top-level sitemap failed
///
/// # Example
///
/// ```no_run
/// use linksweep::config::Config;
/// use linksweep::crawler::{sweep, RunMode};
/// use linksweep::output::NullObserver;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = sweep(Config::default(), "example.com", RunMode::FullCrawl, Arc::new(NullObserver)).await?;
/// println!("{} broken links", summary.broken_links);
/// # Ok(())
/// # }
/// ```
pub async fn sweep(
    config: Config,
    input: &str,
    mode: RunMode,
    observer: Arc<dyn CrawlObserver>,
) -> Result<RunSummary> {
    let url = normalize_start_url(input)?;
    let coordinator = Coordinator::new(config, observer)?;

    match mode {
        RunMode::FullCrawl => {
            let target = CrawlTarget::from_url(url)?;
            coordinator.crawl_site(&target).await
        }
        RunMode::SitemapPage => coordinator.crawl_sitemap(&url).await,
    }
}
