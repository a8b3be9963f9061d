//! Markdown report generation
//!
//! Writes a human-readable summary of a scan: run information, counts per
//! outcome, and a table of links per article.

use crate::output::report::ScanReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run metadata shown at the top of the markdown report
#[derive(Debug, Clone, Default)]
pub struct RunInfo {
    pub root_page: String,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
}

/// Writes a markdown report to a file
///
/// # Arguments
///
/// * `report` - The scan report
/// * `run` - Metadata of the run that produced it
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(OutputError)` - Failed to write the report
pub fn generate_markdown_report(
    report: &ScanReport,
    run: &RunInfo,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_report(report, run);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    tracing::info!("Wrote markdown report to {}", output_path.display());
    Ok(())
}

/// Formats a scan report as markdown
pub fn format_markdown_report(report: &ScanReport, run: &RunInfo) -> String {
    let mut md = String::new();

    md.push_str("# Link Check Report\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Root Page**: {}\n", run.root_page));
    md.push_str(&format!("- **Started**: {}\n", run.started_at));
    if let Some(finished) = &run.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    md.push_str(&format!("- **Config Hash**: {}\n\n", run.config_hash));

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Articles**: {}\n", report.articles.len()));
    md.push_str(&format!("- **Links**: {}\n", report.total_links()));
    md.push_str(&format!("- **Broken Links**: {}\n", report.broken_links()));
    md.push_str(&format!("- **Pending**: {}\n", report.pending_links()));
    md.push_str(&format!("- **Not Checked**: {}\n\n", report.unchecked_links()));

    md.push_str("## Outcome Breakdown\n\n");
    md.push_str("| Outcome | Count |\n");
    md.push_str("|---------|-------|\n");
    for (outcome, count) in report.outcome_counts() {
        md.push_str(&format!("| {} | {} |\n", outcome, count));
    }
    md.push('\n');

    if report.has_critical() {
        md.push_str("> **Warning**: at least one server answered 429 Too Many Requests.\n\n");
    }

    md.push_str("## Articles\n\n");
    for article in &report.articles {
        md.push_str(&format!("### [{}]({})\n\n", escape_cell(&article.text), article.link));

        if article.links.is_empty() {
            md.push_str("No links found.\n\n");
            continue;
        }

        md.push_str("| Link | Status | Message |\n");
        md.push_str("|------|--------|---------|\n");
        for link in &article.links {
            let status = link
                .status_code
                .map(|code| code.to_string())
                .unwrap_or_else(|| "-".to_string());
            let message = if link.checked {
                escape_cell(&link.message)
            } else {
                "not checked".to_string()
            };
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                escape_cell(&link.link),
                status,
                message
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
