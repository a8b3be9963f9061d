//! Per-article scan report
//!
//! Groups scan results under the article they were found in, keeping the
//! gatherer's article order and each article's extraction order.

use crate::crawler::ArticleEntry;
use crate::links::correlation_key;
use crate::state::{Outcome, ScanResult, ScanStatus};
use serde::Serialize;
use std::collections::HashSet;

/// One link of one article, as reported
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub link: String,
    pub status: ScanStatus,
    pub outcome: Option<Outcome>,
    pub status_code: Option<u16>,
    pub message: String,
    pub final_url: Option<String>,
    pub critical: bool,
    /// False when normalization dropped the link, so it was never requested
    pub checked: bool,
}

impl LinkReport {
    fn new(result: &ScanResult, checked: bool) -> Self {
        Self {
            link: result.scanned_link.clone(),
            status: result.status,
            outcome: result.outcome,
            status_code: result.status_code,
            message: result.message.clone(),
            final_url: result.final_url.clone(),
            critical: result.critical,
            checked,
        }
    }

    /// Returns true for a link that was sent for verification and has not completed
    pub fn is_pending(&self) -> bool {
        self.checked && self.status == ScanStatus::Pending
    }
}

/// An article and the links found in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleReport {
    pub text: String,
    pub link: String,
    pub links: Vec<LinkReport>,
}

impl ArticleReport {
    /// Returns the links whose outcome marks them broken
    pub fn broken_links(&self) -> impl Iterator<Item = &LinkReport> {
        self.links
            .iter()
            .filter(|link| link.outcome.map(|o| o.is_error()).unwrap_or(false))
    }
}

/// Report of a whole scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub articles: Vec<ArticleReport>,
}

impl ScanReport {
    /// Builds a report from the gathered articles and their scan results
    ///
    /// Every article appears, including those with no links. Results are
    /// matched to articles by their position in the article list, so two
    /// entries pointing at the same page each keep their own links.
    /// `normalized` is the list of links sent for verification; any other
    /// link is reported as not checked.
    pub fn from_results(
        articles: &[ArticleEntry],
        results: &[ScanResult],
        normalized: &[String],
    ) -> Self {
        let requested: HashSet<String> = normalized.iter().map(|l| correlation_key(l)).collect();

        let mut articles: Vec<ArticleReport> = articles
            .iter()
            .map(|article| ArticleReport {
                text: article.text.clone(),
                link: article.link.clone(),
                links: Vec::new(),
            })
            .collect();

        for result in results {
            let checked = requested.contains(&correlation_key(&result.scanned_link));
            match articles.get_mut(result.article_index) {
                Some(article) => article.links.push(LinkReport::new(result, checked)),
                None => tracing::warn!(
                    "Dropping result for {}: no article at position {}",
                    result.scanned_link,
                    result.article_index
                ),
            }
        }

        Self { articles }
    }

    pub fn total_links(&self) -> usize {
        self.articles.iter().map(|a| a.links.len()).sum()
    }

    /// Number of requested links still waiting for verification
    pub fn pending_links(&self) -> usize {
        self.links().filter(|link| link.is_pending()).count()
    }

    /// Number of links normalization dropped before verification
    pub fn unchecked_links(&self) -> usize {
        self.links().filter(|link| !link.checked).count()
    }

    /// Number of verified links per outcome, in report order
    pub fn outcome_counts(&self) -> Vec<(Outcome, usize)> {
        Outcome::all()
            .into_iter()
            .map(|outcome| {
                let count = self
                    .links()
                    .filter(|link| link.outcome == Some(outcome))
                    .count();
                (outcome, count)
            })
            .collect()
    }

    pub fn broken_links(&self) -> usize {
        self.articles.iter().map(|a| a.broken_links().count()).sum()
    }

    /// Returns true if any link was answered with a critical status
    pub fn has_critical(&self) -> bool {
        self.links().any(|link| link.critical)
    }

    fn links(&self) -> impl Iterator<Item = &LinkReport> {
        self.articles.iter().flat_map(|a| a.links.iter())
    }
}

/// Renders the report as plain text, one block per article
///
/// # Arguments
///
/// * `report` - The report to render
///
/// # Returns
///
/// The rendered report, ending with a one-line total
pub fn format_basic_report(report: &ScanReport) -> String {
    let mut out = String::new();

    for article in &report.articles {
        out.push_str(&format!("{} @ {}\n", article.text, article.link));
        if article.links.is_empty() {
            out.push_str("    (no links)\n");
        }
        for link in &article.links {
            let message = if !link.checked {
                "not checked"
            } else if link.status == ScanStatus::Pending {
                "PENDING"
            } else {
                link.message.as_str()
            };
            out.push_str(&format!("    {} -> {}\n", link.link, message));
        }
        out.push('\n');
    }

    out.push_str(&format!(
        "{} articles, {} links, {} broken, {} pending, {} not checked\n",
        report.articles.len(),
        report.total_links(),
        report.broken_links(),
        report.pending_links(),
        report.unchecked_links()
    ));

    out
}
