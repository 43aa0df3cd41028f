//! linksweep main entry point
//!
//! This is the command-line interface for the linksweep broken link checker.

use anyhow::{Context, Result};
use clap::Parser;
use linksweep::config::{load_config_with_hash, validate, Config};
use linksweep::crawler::{default_sitemap_url, sweep, RunMode};
use linksweep::output::{print_summary, ConsoleObserver};
use linksweep::url::{normalize_start_url, CrawlTarget};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// linksweep: find broken links within one web domain
///
/// linksweep crawls every page reachable from the start URL without leaving
/// its domain (or every page listed in a sitemap), checks each in-domain
/// link, and writes a raw log plus a broken-links report per run.
#[derive(Parser, Debug)]
#[command(name = "linksweep")]
#[command(version)]
#[command(about = "Same-domain broken link checker", long_about = None)]
struct Cli {
    /// Start URL, or sitemap URL with --sitemap (https:// is added if missing)
    #[arg(value_name = "URL")]
    url: String,

    /// Treat URL as a sitemap index (or sitemap) and check only listed pages
    #[arg(long)]
    sitemap: bool,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory under which report folders are created
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Stop after visiting this many pages
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Maximum link checks in flight per page
    #[arg(long, value_name = "N")]
    concurrency: Option<u32>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Validate config and show what would be checked without fetching anything
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;
    let mode = if cli.sitemap {
        RunMode::SitemapPage
    } else {
        RunMode::FullCrawl
    };

    if cli.dry_run {
        return handle_dry_run(&config, &cli.url, mode);
    }

    let observer = Arc::new(ConsoleObserver::new(cli.quiet));
    match sweep(config, &cli.url, mode, observer).await {
        Ok(summary) => {
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e).with_context(|| format!("linksweep could not finish checking {}", cli.url))
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linksweep=info,warn"),
            1 => EnvFilter::new("linksweep=debug,info"),
            2 => EnvFilter::new("linksweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file (if any), applies CLI overrides, and validates
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(output) = &cli.output {
        config.output.root_dir = output.to_string_lossy().into_owned();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = Some(max_pages);
    }
    if let Some(concurrency) = cli.concurrency {
        config.crawler.max_concurrent_checks = concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout = timeout;
    }

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: validates input and shows what would be checked
fn handle_dry_run(config: &Config, input: &str, mode: RunMode) -> Result<()> {
    println!("=== linksweep Dry Run ===\n");

    println!("Crawler Configuration:");
    match config.crawler.max_pages {
        Some(max) => println!("  Max pages: {}", max),
        None => println!("  Max pages: unlimited"),
    }
    println!(
        "  Max concurrent checks: {}",
        config.crawler.max_concurrent_checks
    );
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!("  Connect timeout: {}s", config.crawler.connect_timeout);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.user_agent_string());

    println!("\nOutput:");
    println!("  Root directory: {}", config.output.root_dir);

    let url = normalize_start_url(input).context("invalid URL")?;
    match mode {
        RunMode::FullCrawl => {
            let target = CrawlTarget::from_url(url).context("invalid URL")?;
            println!("\nTarget:");
            println!("  Start URL: {}", target.start());
            println!("  Domain scope: {}", target.scope());
            println!(
                "  Reports under: {}",
                PathBuf::from(&config.output.root_dir)
                    .join(target.scope().site_dir_name())
                    .display()
            );
        }
        RunMode::SitemapPage => {
            let sitemap = default_sitemap_url(url);
            println!("\nSitemap:");
            println!("  Sitemap URL: {}", sitemap);
        }
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}
