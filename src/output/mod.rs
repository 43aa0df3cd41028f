//! Output module for crawl events and reports
//!
//! This module handles:
//! - The observer trait the crawler reports through
//! - Writing the per-run raw log and broken-links files
//! - Console and in-memory observers
//! - The end-of-run summary

mod console;
mod event_log;
mod sink;
pub mod stats;
mod traits;

pub use console::ConsoleObserver;
pub use event_log::{EventLog, RecordedEvent};
pub use sink::{
    create_run_dir, unique_child, RunOutput, BROKEN_LINKS_FILE, RAW_LOG_FILE, RUN_DIR_FORMAT,
};
pub use stats::{print_summary, split_duration, RunSummary};
pub use traits::{
    BrokenLinkRecord, CrawlObserver, LinkFailure, LogEvent, LogLevel, NullObserver, OutputError,
    OutputResult, TIMESTAMP_FORMAT,
};
