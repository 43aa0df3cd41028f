//! In-memory, ordered accumulator of crawl events
//!
//! Owned by whoever presents the results (a UI, a test); the crawler only
//! pushes into it through [`CrawlObserver`].

use crate::output::traits::{BrokenLinkRecord, CrawlObserver, LogEvent, LogLevel};
use std::sync::{Mutex, MutexGuard};

/// One event as it was received
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedEvent {
    Log(LogEvent),
    BrokenLink(BrokenLinkRecord),
}

/// Ordered list of every event received
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<RecordedEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<RecordedEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns a snapshot of all events in arrival order
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.lock().clone()
    }

    /// Returns all broken-link records in arrival order
    pub fn broken_links(&self) -> Vec<BrokenLinkRecord> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::BrokenLink(record) => Some(record.clone()),
                RecordedEvent::Log(_) => None,
            })
            .collect()
    }

    /// Returns the messages of all log events with the given level
    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                RecordedEvent::Log(e) if e.level == level => Some(e.message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl CrawlObserver for EventLog {
    fn on_log_event(&self, event: &LogEvent) {
        self.lock().push(RecordedEvent::Log(event.clone()));
    }

    fn on_broken_link(&self, record: &BrokenLinkRecord) {
        self.lock().push(RecordedEvent::BrokenLink(record.clone()));
    }
}
