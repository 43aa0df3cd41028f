//! Configuration module for linksweep
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All sections have defaults, so a configuration file is optional.
//!
//! # Example
//!
//! ```no_run
//! use linksweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linksweep.toml")).unwrap();
//! println!("Checks in flight per page: {}", config.crawler.max_concurrent_checks);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
