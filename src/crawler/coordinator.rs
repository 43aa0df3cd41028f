//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates:
//! - Creating the run's report directory
//! - Managing the frontier (full-crawl mode) or sitemap pages (sitemap mode)
//! - Fetching pages, extracting links, and verifying in-domain links
//! - Turning outcomes into log events and broken-link records
//!
//! Pages are processed one at a time. The links of one page are verified
//! concurrently but reported in the page's link order.

use crate::config::{validate, Config};
use crate::crawler::fetcher::{build_http_client, fetch_url};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::extract_links;
use crate::crawler::sitemap::{default_sitemap_url, SitemapEntry, SitemapResolver};
use crate::crawler::status::{explain, StatusCategory};
use crate::output::{
    create_run_dir, split_duration, BrokenLinkRecord, CrawlObserver, LinkFailure, LogEvent,
    LogLevel, OutputResult, RunOutput, RunSummary,
};
use crate::url::{CrawlTarget, DomainScope};
use crate::Result;
use chrono::Local;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Width of the separator written under each page header
const PAGE_SEPARATOR_WIDTH: usize = 50;

/// Width of the separator framing the completion message
const COMPLETION_SEPARATOR_WIDTH: usize = 60;

/// How a run treats the pages it processes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Breadth-first crawl; verified in-domain links are queued as pages
    FullCrawl,
    /// Each sitemap page is processed on its own; nothing is queued
    SitemapPage,
}

/// Everything one execution needs, fixed at start
#[derive(Debug)]
pub struct RunContext {
    pub target: CrawlTarget,
    pub mode: RunMode,
    pub output: RunOutput,
    pub started: Instant,
}

/// Mutable state of one run (or one child sitemap)
struct RunState {
    context: RunContext,
    frontier: Frontier,
    summary: RunSummary,
}

impl RunState {
    fn new(context: RunContext) -> Self {
        let summary = RunSummary {
            output_dir: context.output.dir().to_path_buf(),
            ..Default::default()
        };
        Self {
            context,
            frontier: Frontier::new(),
            summary,
        }
    }
}

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    client: Client,
    observer: Arc<dyn CrawlObserver>,
}

impl Coordinator {
    /// Creates a new coordinator with a shared HTTP client
    ///
    /// Fails with `SweepError::Config` when the configuration is invalid.
    ///
    /// # Arguments
    ///
    /// * `config` - The run configuration
    /// * `observer` - Receives every log event and broken-link record
    pub fn new(config: Config, observer: Arc<dyn CrawlObserver>) -> Result<Self> {
        validate(&config)?;
        let client = build_http_client(&config)?;
        Ok(Self {
            config,
            client,
            observer,
        })
    }

    /// Crawls a whole domain breadth-first starting at the target URL
    ///
    /// Every page reached through in-domain links is fetched once, and every
    /// distinct in-domain link is verified once. Page-level and link-level
    /// failures are reported and never abort the run.
    pub async fn crawl_site(&self, target: &CrawlTarget) -> Result<RunSummary> {
        let started = Instant::now();
        let dir = create_run_dir(self.output_root(), target.scope(), Local::now())?;
        let output = RunOutput::open(dir)?;

        tracing::info!(
            "Starting crawl of {} (reports in {})",
            target.start(),
            output.dir().display()
        );

        let mut state = RunState::new(RunContext {
            target: target.clone(),
            mode: RunMode::FullCrawl,
            output,
            started,
        });

        self.emit(
            &state.context.output,
            LogLevel::Info,
            format!("Starting crawl of {}", target.start()),
        );
        state.frontier.enqueue(target.start().clone());

        while let Some(page) = state.frontier.dequeue() {
            if self.page_limit_reached(state.summary.pages_visited) {
                let remaining = state.frontier.len() + 1;
                self.stop_at_page_limit(&mut state, remaining);
                break;
            }
            self.process_page(&mut state, page).await;
        }

        self.complete(&state.context.output, target.scope(), started);
        state.summary.elapsed = started.elapsed();

        tracing::info!(
            "Crawl finished: {} pages, {} links checked, {} broken",
            state.summary.pages_visited,
            state.summary.links_checked,
            state.summary.broken_links
        );
        Ok(state.summary)
    }

    /// Verifies the pages listed by a sitemap index (or a single sitemap)
    ///
    /// Each child sitemap gets its own report directory below the run's
    /// timestamp directory and its own visited set. A child that cannot be
    /// loaded is reported and skipped. Only a failure to load the top-level
    /// document ends the run with an error.
    pub async fn crawl_sitemap(&self, sitemap_url: &Url) -> Result<RunSummary> {
        let started = Instant::now();
        let index_url = default_sitemap_url(sitemap_url.clone());
        let target = CrawlTarget::from_url(index_url.clone())?;

        let dir = create_run_dir(self.output_root(), target.scope(), Local::now())?;
        let index_output = RunOutput::open(dir)?;

        tracing::info!(
            "Starting sitemap run for {} (reports in {})",
            index_url,
            index_output.dir().display()
        );
        self.emit(
            &index_output,
            LogLevel::Info,
            format!("Loading sitemap {}", index_url),
        );

        let resolver = SitemapResolver::new(self.client.clone());
        let entries = match resolver.resolve_index(&index_url).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!("{}", e);
                self.emit(&index_output, LogLevel::Error, e.to_string());
                return Err(e);
            }
        };

        let mut summary = RunSummary {
            output_dir: index_output.dir().to_path_buf(),
            ..Default::default()
        };

        for entry in &entries {
            if self.page_limit_reached(summary.pages_visited) {
                self.emit(
                    &index_output,
                    LogLevel::Warning,
                    format!(
                        "Page limit reached; sitemap {} and the ones after it were not processed",
                        entry.url
                    ),
                );
                summary.truncated = true;
                break;
            }

            let child = self
                .process_child_sitemap(&resolver, &index_output, &target, entry, &summary)
                .await;
            summary.absorb(&child);
        }

        self.complete(&index_output, target.scope(), started);
        summary.elapsed = started.elapsed();

        tracing::info!(
            "Sitemap run finished: {} sitemaps, {} pages, {} broken links, {} failed sitemaps",
            entries.len(),
            summary.pages_visited,
            summary.broken_links,
            summary.failed_sitemaps
        );
        Ok(summary)
    }

    /// Processes every page listed by one child sitemap
    ///
    /// Failures are reported into the index output and counted in the
    /// returned summary; they never propagate.
    async fn process_child_sitemap(
        &self,
        resolver: &SitemapResolver,
        index_output: &RunOutput,
        target: &CrawlTarget,
        entry: &SitemapEntry,
        so_far: &RunSummary,
    ) -> RunSummary {
        let failed = RunSummary {
            failed_sitemaps: 1,
            ..Default::default()
        };

        let output = match index_output.open_child(&entry.dir_name()) {
            Ok(output) => output,
            Err(e) => {
                self.emit(
                    index_output,
                    LogLevel::Error,
                    format!("Could not create report directory for {}: {}", entry.url, e),
                );
                return failed;
            }
        };

        self.emit(
            index_output,
            LogLevel::Info,
            format!(
                "Processing sitemap {} (reports in {})",
                entry.url,
                output.dir().display()
            ),
        );

        let pages = match resolver.resolve_pages(&entry.url).await {
            Ok(pages) => pages,
            Err(e) => {
                tracing::warn!("Skipping child sitemap: {}", e);
                let message = format!("Skipping sitemap: {}", e);
                self.emit(index_output, LogLevel::Error, message.clone());
                self.emit(&output, LogLevel::Error, message);
                return RunSummary {
                    output_dir: output.dir().to_path_buf(),
                    ..failed
                };
            }
        };

        let started = Instant::now();
        let mut state = RunState::new(RunContext {
            target: target.clone(),
            mode: RunMode::SitemapPage,
            output,
            started,
        });

        self.emit(
            &state.context.output,
            LogLevel::Info,
            format!("Sitemap {} lists {} page(s)", entry.url, pages.len()),
        );

        for (index, page) in pages.iter().enumerate() {
            if !target.in_scope(page) {
                self.emit(
                    &state.context.output,
                    LogLevel::Warning,
                    format!("Skipping page outside {}: {}", target.scope(), page),
                );
                continue;
            }
            if state.frontier.is_visited(page) {
                tracing::debug!("Page {} listed twice, skipping", page);
                continue;
            }
            if self.page_limit_reached(so_far.pages_visited + state.summary.pages_visited) {
                self.stop_at_page_limit(&mut state, pages.len() - index);
                break;
            }
            self.process_page(&mut state, page.clone()).await;
        }

        self.complete(&state.context.output, target.scope(), started);
        state.summary.elapsed = started.elapsed();
        state.summary
    }

    /// Fetches one page, reports on it, and verifies its in-domain links
    async fn process_page(&self, state: &mut RunState, page_url: Url) {
        // Sitemap pages are not claimed up front; a page fetched here never
        // needs verifying as a link afterwards
        state.frontier.claim(&page_url);
        state.frontier.mark_visited(&page_url);
        state.summary.pages_visited += 1;

        let output = &state.context.output;
        self.emit(output, LogLevel::Info, format!("🔎 Current page: {}", page_url));
        self.write(output.append_raw(&"=".repeat(PAGE_SEPARATOR_WIDTH)));

        tracing::debug!("Fetching page {}", page_url);
        let page = match fetch_url(&self.client, &page_url, true).await.into_page() {
            Ok(page) => page,
            Err(LinkFailure::NotFound { status_code }) => {
                self.emit(
                    output,
                    LogLevel::Error,
                    format!("Problem on page {} - Code: {}", page_url, status_code),
                );
                return;
            }
            Err(LinkFailure::Network { message }) => {
                self.emit(
                    output,
                    LogLevel::Error,
                    format!("Error accessing page {}: {}", page_url, message),
                );
                return;
            }
        };

        self.emit(output, LogLevel::Ok, format!("Accessing: {}", page_url));
        if page.is_error_status() {
            self.emit(
                output,
                LogLevel::Warning,
                format!(
                    "Page {} answered with code {} {}",
                    page_url,
                    page.status_code,
                    explain(StatusCategory::from_code(page.status_code))
                ),
            );
        }

        let Some(body) = page.body.as_deref() else {
            self.emit(
                output,
                LogLevel::Info,
                format!(
                    "No links extracted from {} (content type {})",
                    page_url,
                    page.content_type.as_deref().unwrap_or("unknown")
                ),
            );
            return;
        };

        let candidates: Vec<Url> = extract_links(&page.final_url, body)
            .into_iter()
            .filter(|link| {
                let in_scope = state.context.target.in_scope(link);
                if !in_scope {
                    tracing::trace!("Ignoring off-domain link {}", link);
                }
                in_scope
            })
            .filter(|link| state.frontier.claim(link))
            .collect();

        tracing::debug!("Verifying {} new link(s) from {}", candidates.len(), page_url);
        self.verify_links(state, &page_url, candidates).await;
    }

    /// Verifies already-claimed links with bounded concurrency, in order
    async fn verify_links(&self, state: &mut RunState, page_url: &Url, links: Vec<Url>) {
        let client = &self.client;
        let mut results = stream::iter(links)
            .map(|link| async move {
                let outcome = fetch_url(client, &link, false).await;
                (link, outcome)
            })
            .buffered(self.config.crawler.max_concurrent_checks as usize);

        while let Some((link, outcome)) = results.next().await {
            state.summary.links_checked += 1;
            let output = &state.context.output;

            match outcome.into_page() {
                Ok(checked) if checked.is_error_status() => {
                    self.emit(
                        output,
                        LogLevel::Warning,
                        format!(
                            "Link {} answered with code {} {}",
                            link,
                            checked.status_code,
                            explain(StatusCategory::from_code(checked.status_code))
                        ),
                    );
                }
                Ok(_) => {
                    self.emit(output, LogLevel::Ok, format!("Link OK: {}", link));
                }
                Err(failure) => {
                    self.record_broken(state, page_url, &link, failure);
                }
            }

            if state.context.mode == RunMode::FullCrawl {
                state.frontier.push_claimed(link);
            }
        }
    }

    fn record_broken(&self, state: &mut RunState, source: &Url, target: &Url, failure: LinkFailure) {
        let record = BrokenLinkRecord::new(source, target, failure);
        let output = &state.context.output;

        tracing::debug!("Broken link {} on {}: {}", target, source, record.explanation);
        self.emit(
            output,
            LogLevel::Error,
            format!("Broken link found on page {}: {}", source, target),
        );
        self.write(output.append_raw(&record.to_string()));
        self.write(output.append_broken_link(&record));
        self.observer.on_broken_link(&record);

        state.summary.broken_links += 1;
    }

    fn stop_at_page_limit(&self, state: &mut RunState, remaining: usize) {
        let limit = self.config.crawler.max_pages.unwrap_or_default();
        tracing::warn!("Page limit of {} reached", limit);
        self.emit(
            &state.context.output,
            LogLevel::Warning,
            format!(
                "Page limit of {} reached; {} page(s) left unvisited",
                limit, remaining
            ),
        );
        state.summary.truncated = true;
    }

    /// Writes the completion message with the elapsed duration
    fn complete(&self, output: &RunOutput, scope: &DomainScope, started: Instant) {
        let (hours, minutes, seconds) = split_duration(started.elapsed());
        let separator = "=".repeat(COMPLETION_SEPARATOR_WIDTH);

        self.write(output.append_raw(&separator));
        self.emit(
            output,
            LogLevel::Info,
            format!(
                "🎉 All pages within '{}' have been checked. Total duration: {} hours, {} minutes and {} seconds.",
                scope, hours, minutes, seconds
            ),
        );
        self.write(output.append_raw(&separator));
    }

    fn page_limit_reached(&self, visited: u64) -> bool {
        self.config
            .crawler
            .max_pages
            .is_some_and(|max| visited >= u64::from(max))
    }

    fn output_root(&self) -> &Path {
        Path::new(&self.config.output.root_dir)
    }

    /// Sends an event to the observer and appends it to the raw log
    fn emit(&self, output: &RunOutput, level: LogLevel, message: impl Into<String>) {
        let event = LogEvent::now(level, message);
        self.observer.on_log_event(&event);
        self.write(output.append_event(&event));
    }

    fn write(&self, result: OutputResult<()>) {
        if let Err(e) = result {
            tracing::error!("Failed to write report file: {}", e);
        }
    }
}
