//! Colorized terminal observer

use crate::output::traits::{BrokenLinkRecord, CrawlObserver, LogEvent, LogLevel};
use colored::Colorize;

/// Prints crawl events to stdout with colors
///
/// In quiet mode only warnings, errors, and broken links are shown.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver {
    quiet: bool,
}

impl ConsoleObserver {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl CrawlObserver for ConsoleObserver {
    fn on_log_event(&self, event: &LogEvent) {
        let line = event.to_string();
        match event.level {
            LogLevel::Info if !self.quiet => println!("{}", line.cyan()),
            LogLevel::Ok if !self.quiet => println!("{}", line.green()),
            LogLevel::Warning => println!("{}", line.yellow()),
            LogLevel::Error => println!("{}", line.red()),
            _ => {}
        }
    }

    fn on_broken_link(&self, record: &BrokenLinkRecord) {
        println!("{}", record.to_string().red().bold());
    }
}
