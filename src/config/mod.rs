//! Configuration module for Article-Linkcheck
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use article_linkcheck::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkcheck.toml")).unwrap();
//! println!("Gathering articles from: {}", config.target.root_page);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, OutputConfig, RequestConfig, ScanConfig, TargetConfig,
    DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_TIMEOUT_SECS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
