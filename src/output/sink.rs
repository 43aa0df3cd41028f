//! Per-run report directory and its two text files
//!
//! Layout:
//!
//! ```text
//! <root>/<site-name>/<YYYY-MM-DD_HHH-MMM>/log_raw.txt
//! <root>/<site-name>/<YYYY-MM-DD_HHH-MMM>/broken_links.txt
//! ```
//!
//! Sitemap runs nest one directory per child sitemap below the timestamp
//! directory. Every write opens the file in append mode and closes it again.

use crate::output::traits::{BrokenLinkRecord, LogEvent, OutputResult};
use crate::url::DomainScope;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the chronological raw log
pub const RAW_LOG_FILE: &str = "log_raw.txt";

/// File name of the broken-links report
pub const BROKEN_LINKS_FILE: &str = "broken_links.txt";

/// Directory name format for one run
pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d_H%H-M%M";

/// Creates `<root>/<site-name>/<timestamp>` and returns it
///
/// When a run directory for the same minute already exists a numeric suffix
/// is appended so runs never share files.
pub fn create_run_dir(
    root: &Path,
    scope: &DomainScope,
    started: DateTime<Local>,
) -> OutputResult<PathBuf> {
    let site_dir = root.join(scope.site_dir_name());
    fs::create_dir_all(&site_dir)?;

    let stamp = started.format(RUN_DIR_FORMAT).to_string();
    let dir = unique_child(&site_dir, &stamp);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Returns `parent/name`, or `parent/name_N` for the first N that is free
pub fn unique_child(parent: &Path, name: &str) -> PathBuf {
    let candidate = parent.join(name);
    if !candidate.exists() {
        return candidate;
    }
    (2..)
        .map(|n| parent.join(format!("{}_{}", name, n)))
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Output destination for one crawl (or one child sitemap)
#[derive(Debug, Clone)]
pub struct RunOutput {
    dir: PathBuf,
    raw_log: PathBuf,
    broken_links: PathBuf,
}

impl RunOutput {
    /// Creates the directory and both (empty) files
    pub fn open(dir: PathBuf) -> OutputResult<Self> {
        fs::create_dir_all(&dir)?;
        let raw_log = dir.join(RAW_LOG_FILE);
        let broken_links = dir.join(BROKEN_LINKS_FILE);

        for path in [&raw_log, &broken_links] {
            OpenOptions::new().create(true).append(true).open(path)?;
        }

        Ok(Self {
            dir,
            raw_log,
            broken_links,
        })
    }

    /// Opens a nested output for a child sitemap
    pub fn open_child(&self, name: &str) -> OutputResult<Self> {
        Self::open(unique_child(&self.dir, name))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn raw_log_path(&self) -> &Path {
        &self.raw_log
    }

    pub fn broken_links_path(&self) -> &Path {
        &self.broken_links
    }

    /// Appends one event line to the raw log
    pub fn append_event(&self, event: &LogEvent) -> OutputResult<()> {
        append_line(&self.raw_log, &event.to_string())
    }

    /// Appends free text (separators, multi-line blocks) to the raw log
    pub fn append_raw(&self, text: &str) -> OutputResult<()> {
        append_line(&self.raw_log, text)
    }

    /// Appends a broken-link block to the broken-links file
    pub fn append_broken_link(&self, record: &BrokenLinkRecord) -> OutputResult<()> {
        append_line(&self.broken_links, &record.to_string())
    }
}

fn append_line(path: &Path, text: &str) -> OutputResult<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{}", text)?;
    Ok(())
}
