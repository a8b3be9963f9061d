use crate::crawler::Level;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Default per-request timeout, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 3;

/// Default number of verification requests in flight at once
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 32;

/// Main configuration structure for Article-Linkcheck
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub target: TargetConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub request: RequestConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// The index page to gather articles from
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// Domain the articles live on (e.g. "pybit.es" or "127.0.0.1:8999")
    pub domain: String,

    /// URL of the page listing every article
    #[serde(rename = "root-page")]
    pub root_page: String,

    /// Whether TLS certificates must verify
    #[serde(rename = "verify-tls", default = "default_true")]
    pub verify_tls: bool,

    /// Log per-article progress
    #[serde(default)]
    pub verbose: bool,

    /// HTML element containing the article anchors
    #[serde(rename = "parent-level")]
    pub parent_level: Level,
}

/// Extraction and verification settings
#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Upper bound on verification requests in flight
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: usize,

    /// Levels searched for links inside every article
    #[serde(default)]
    pub levels: Vec<Level>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            levels: Vec::new(),
        }
    }
}

/// Outbound request identity
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestConfig {
    /// Overrides the default browser user agent
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,

    /// Extra headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

/// Report destinations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Where to write a markdown report
    #[serde(rename = "markdown-path")]
    pub markdown_path: Option<String>,

    /// SQLite database that keeps the results of every run
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_concurrent_requests() -> usize {
    DEFAULT_MAX_CONCURRENT_REQUESTS
}
