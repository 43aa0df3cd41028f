//! Observer trait and the event types the crawler emits
//!
//! The crawler never reads reporting state back; it only pushes log events
//! and broken-link records through [`CrawlObserver`].

use crate::crawler::status::{explain, StatusCategory};
use crate::ErrorKind;
use chrono::{DateTime, Local};
use std::fmt;
use thiserror::Error;
use url::Url;

/// Timestamp format used in log lines
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Severity of a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Info,
    Ok,
    Warning,
    Error,
}

impl LogLevel {
    /// Glyph printed at the start of the line (empty for info)
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Info => "",
            Self::Ok => "🟢 ",
            Self::Warning => "⚠️  ",
            Self::Error => "❌ ",
        }
    }

    /// Severity tag printed after the timestamp (None for info)
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Info => None,
            Self::Ok => Some("OK"),
            Self::Warning => Some("WARNING"),
            Self::Error => Some("ERROR"),
        }
    }
}

/// One informational, ok, warning, or error line
#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub level: LogLevel,
    pub timestamp: DateTime<Local>,
    pub message: String,
}

impl LogEvent {
    /// Creates an event stamped with the current local time
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            timestamp: Local::now(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self.timestamp.format(TIMESTAMP_FORMAT);
        match self.level.tag() {
            Some(tag) => write!(f, "{}[{}] [{}] {}", self.level.glyph(), ts, tag, self.message),
            None => write!(f, "[{}] {}", ts, self.message),
        }
    }
}

/// Why a link failed verification
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkFailure {
    /// The target answered with a not-found status
    NotFound { status_code: u16 },
    /// The request failed before a response arrived
    Network { message: String },
}

impl LinkFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Network { .. } => ErrorKind::Network,
        }
    }

    /// Short human explanation written into the broken-links file
    pub fn explanation(&self) -> String {
        match self {
            Self::NotFound { status_code } => format!(
                "Code {} {}",
                status_code,
                explain(StatusCategory::from_code(*status_code))
            ),
            Self::Network { message } if message.trim().is_empty() => {
                "unknown network error".to_string()
            }
            Self::Network { message } => message.clone(),
        }
    }
}

/// A failed link verification: which page linked where, and why it failed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BrokenLinkRecord {
    pub source: String,
    pub target: String,
    pub failure: LinkFailure,
    pub explanation: String,
}

impl BrokenLinkRecord {
    pub fn new(source: &Url, target: &Url, failure: LinkFailure) -> Self {
        let explanation = failure.explanation();
        Self {
            source: source.to_string(),
            target: target.to_string(),
            failure,
            explanation,
        }
    }
}

impl fmt::Display for BrokenLinkRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "❌ {{\n  page: {},\n  broken_link: {},\n  error: {}\n}}",
            self.source, self.target, self.explanation
        )
    }
}

/// Receives everything the crawler reports
///
/// Implementations must be cheap and must not block for long; they are
/// called inline from the crawl loop.
pub trait CrawlObserver: Send + Sync {
    /// Called for every informational, ok, warning, or error line
    fn on_log_event(&self, event: &LogEvent);

    /// Called once per broken link discovered
    fn on_broken_link(&self, record: &BrokenLinkRecord);
}

/// Observer that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl CrawlObserver for NullObserver {
    fn on_log_event(&self, _event: &LogEvent) {}

    fn on_broken_link(&self, _record: &BrokenLinkRecord) {}
}
