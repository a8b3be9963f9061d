//! Article-Linkcheck: a link rot detector for article-based sites
//!
//! This crate gathers the articles listed on an index page, extracts the links
//! embedded in each article through configurable HTML levels, normalizes and
//! deduplicates them, then verifies every link concurrently and correlates the
//! outcome back to the articles that referenced it.

pub mod config;
pub mod crawler;
pub mod links;
pub mod output;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Article-Linkcheck operations
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("The target {url} is not valid: {reason}")]
    InvalidTarget { url: String, reason: String },

    #[error("The parent level {level} does not appear to be found in the page")]
    InvalidParentLevel { level: String },

    #[error("Duplicate scan level found, already scanning {level}")]
    DuplicateLevel { level: String },

    #[error("No scan levels registered, add at least one level before collecting links")]
    NoLinksInScanLevel,

    #[error("Invalid link table entry for '{key}': {reason}")]
    InvalidLinkEntry { key: String, reason: String },

    #[error("No classification entry for {0}")]
    UnknownDictEntry(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Article-Linkcheck operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Gatherer, Level, Scanner};
pub use links::{normalize, LinkEntry, LinkTable};
pub use state::{Outcome, ScanResult, ScanStatus};
