//! Crawler module for article gathering, link extraction and verification
//!
//! This module contains the core pipeline, including:
//! - HTTP fetching with manual redirect handling
//! - The HTML query adapter used to locate levels and anchors
//! - The gather phase (index page -> articles)
//! - The scan phase (articles -> links -> verified results)

mod fetcher;
mod gatherer;
mod parser;
mod scanner;

pub use fetcher::{
    build_http_client, classify_transport_error, fetch_page, follow_redirects, host_header,
    FetchError, FollowedResponse, RedirectHop, RequestSettings, DEFAULT_USER_AGENT,
    MAX_REDIRECTS,
};
pub use gatherer::{ArticleEntry, GatherSettings, Gatherer};
pub use parser::{Anchor, Frame, Level, PageDocument};
pub use scanner::{ExtractionTally, Scanner, DEFAULT_TIMEOUT};

use crate::config::Config;
use crate::output::ScanReport;
use std::fmt;

/// Logs progress at info level when verbose, debug level otherwise
pub(crate) fn progress(verbose: bool, message: fmt::Arguments<'_>) {
    if verbose {
        tracing::info!("{}", message);
    } else {
        tracing::debug!("{}", message);
    }
}

/// Runs the whole pipeline described by a configuration
///
/// This is the main entry point for a scan. It will:
/// 1. Gather the articles listed on the root page
/// 2. Register the configured levels
/// 3. Extract and normalize the links of every article
/// 4. Verify every link concurrently
///
/// # Returns
///
/// * `Ok(Scanner)` - The finished scanner, holding every result
/// * `Err(ScanError)` - A fatal error stopped the pipeline
pub async fn run_scan(config: &Config) -> crate::Result<Scanner> {
    let gatherer = Gatherer::new(GatherSettings::from_config(config)).await?;
    let mut scanner = Scanner::from_config(&gatherer, &config.scan)?;
    scanner.collect_links().await?;
    scanner.scan_links().await?;
    Ok(scanner)
}

/// Runs the pipeline and returns only its report
pub async fn scan_report(config: &Config) -> crate::Result<ScanReport> {
    Ok(run_scan(config).await?.report())
}
