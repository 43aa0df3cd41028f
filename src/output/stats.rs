//! Run summary returned to the caller and printed at the end of a run

use colored::Colorize;
use std::path::PathBuf;
use std::time::Duration;

/// What a finished run produced
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Directory holding this run's report files
    pub output_dir: PathBuf,

    /// Pages fetched as pages (dequeued or listed in a sitemap)
    pub pages_visited: u64,

    /// Distinct in-domain links verified
    pub links_checked: u64,

    /// Broken-link records written
    pub broken_links: u64,

    /// Child sitemaps that could not be loaded (sitemap mode only)
    pub failed_sitemaps: u64,

    /// True if the page limit stopped the run before the frontier emptied
    pub truncated: bool,

    /// Wall-clock duration
    pub elapsed: Duration,
}

impl RunSummary {
    /// Folds a child sitemap's summary into this one
    pub fn absorb(&mut self, child: &RunSummary) {
        self.pages_visited += child.pages_visited;
        self.links_checked += child.links_checked;
        self.broken_links += child.broken_links;
        self.failed_sitemaps += child.failed_sitemaps;
        self.truncated |= child.truncated;
    }

    /// Percentage of verified links that were not broken
    pub fn healthy_rate(&self) -> f64 {
        if self.links_checked == 0 {
            return 100.0;
        }
        let healthy = self.links_checked.saturating_sub(self.broken_links);
        (healthy as f64 / self.links_checked as f64) * 100.0
    }
}

/// Splits a duration into whole hours, minutes, and seconds
pub fn split_duration(elapsed: Duration) -> (u64, u64, u64) {
    let total = elapsed.as_secs();
    (total / 3600, (total % 3600) / 60, total % 60)
}

/// Prints a summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    let (hours, minutes, seconds) = split_duration(summary.elapsed);

    println!("\n=== Run Summary ===\n");
    println!("  Pages visited:   {}", summary.pages_visited);
    println!("  Links checked:   {}", summary.links_checked);

    let broken = format!("  Broken links:    {}", summary.broken_links);
    if summary.broken_links > 0 {
        println!("{}", broken.red().bold());
    } else {
        println!("{}", broken.green());
    }

    if summary.failed_sitemaps > 0 {
        println!(
            "{}",
            format!("  Failed sitemaps: {}", summary.failed_sitemaps).yellow()
        );
    }
    if summary.truncated {
        println!("{}", "  Stopped early: page limit reached".yellow());
    }

    println!("  Healthy links:   {:.1}%", summary.healthy_rate());
    println!("  Duration:        {}h {}m {}s", hours, minutes, seconds);
    println!("  Reports:         {}", summary.output_dir.display());
}
