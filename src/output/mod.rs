//! Output module for scan reports
//!
//! This module handles:
//! - Grouping scan results into a per-article report
//! - Rendering the report as text, JSON or markdown

mod markdown;
mod report;

pub use markdown::{format_markdown_report, generate_markdown_report, RunInfo};
pub use report::{format_basic_report, ArticleReport, LinkReport, ScanReport};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Renders the report as pretty-printed JSON
pub fn format_json_report(report: &ScanReport) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
