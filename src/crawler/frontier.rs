//! Frontier and visited tracking for one run
//!
//! This module handles:
//! - FIFO queue of pages still to fetch (breadth-first by construction)
//! - The claim set: every URL that has been enqueued or verified
//! - The set of pages actually fetched as pages
//!
//! Claiming is a single check-and-insert, so a URL can be claimed at most
//! once per run no matter how many pages link to it.

use std::collections::{HashSet, VecDeque};
use url::Url;

/// Pending pages plus the de-duplication sets
#[derive(Debug, Default)]
pub struct Frontier {
    /// Pages waiting to be fetched, oldest first
    queue: VecDeque<Url>,

    /// URLs already enqueued or verified
    claimed: HashSet<String>,

    /// URLs fetched as pages
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the URL and queues it; returns false if it was already claimed
    pub fn enqueue(&mut self, url: Url) -> bool {
        if !self.claim(&url) {
            return false;
        }
        self.queue.push_back(url);
        true
    }

    /// Queues a URL the caller has already claimed
    ///
    /// Used after a link has been claimed and verified, so the check and
    /// the push can be split around the verification.
    pub fn push_claimed(&mut self, url: Url) {
        debug_assert!(self.claimed.contains(url.as_str()));
        self.queue.push_back(url);
    }

    /// Returns the oldest queued URL
    pub fn dequeue(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Records that the URL was fetched as a page; idempotent
    pub fn mark_visited(&mut self, url: &Url) {
        self.visited.insert(url.as_str().to_string());
    }

    /// Checks-and-inserts into the claim set; true if newly claimed
    pub fn claim(&mut self, url: &Url) -> bool {
        self.claimed.insert(url.as_str().to_string())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(url.as_str())
    }

    /// Returns the number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether the queue is empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
