//! Per-link scan result tracking
//!
//! A result is created `Pending` when its link is extracted and moves to
//! `Done` exactly once, when the link's verification completes.
use crate::state::classify::{Classification, Outcome};
use serde::Serialize;
use std::fmt;

/// Lifecycle of a scan result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanStatus {
    Pending,
    Done,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// One link found in one article, and what happened when it was requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Position of the article in the gathered article list
    pub article_index: usize,
    pub article_text: String,
    pub article_link: String,
    pub scanned_link: String,
    pub status: ScanStatus,
    pub status_code: Option<u16>,
    pub outcome: Option<Outcome>,
    pub message: String,
    pub final_url: Option<String>,
    pub critical: bool,
}

impl ScanResult {
    /// Creates a pending result for a link extracted from an article
    pub fn pending(
        article_text: impl Into<String>,
        article_link: impl Into<String>,
        scanned_link: impl Into<String>,
    ) -> Self {
        Self {
            article_index: 0,
            article_text: article_text.into(),
            article_link: article_link.into(),
            scanned_link: scanned_link.into(),
            status: ScanStatus::Pending,
            status_code: None,
            outcome: None,
            message: String::new(),
            final_url: None,
            critical: false,
        }
    }

    /// Attributes the result to the article at `index` in the article list
    pub fn at_article(mut self, index: usize) -> Self {
        self.article_index = index;
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == ScanStatus::Done
    }

    /// Applies a classification, moving the result to `Done`
    ///
    /// Returns false, leaving the result untouched, if it was already done.
    pub fn complete(&mut self, classification: &Classification) -> bool {
        if self.is_done() {
            return false;
        }

        self.status = ScanStatus::Done;
        self.status_code = classification.status_code;
        self.outcome = Some(classification.outcome);
        self.message = classification.message.clone();
        self.final_url = classification.final_url.clone();
        self.critical = classification.critical;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::classify::{classify_failure, classify_status, FailureKind};

    #[test]
    fn test_pending_result() {
        let result = ScanResult::pending("Post", "https://blog/post", "https://x/a");
        assert_eq!(result.status, ScanStatus::Pending);
        assert!(result.outcome.is_none());
        assert!(result.message.is_empty());
    }

    #[test]
    fn test_complete_is_one_shot() {
        let mut result = ScanResult::pending("Post", "https://blog/post", "https://x/a");

        assert!(result.complete(&classify_status(404, "https://x/a").unwrap()));
        assert!(result.is_done());
        assert_eq!(result.status_code, Some(404));
        assert_eq!(result.outcome, Some(Outcome::ClientError));

        assert!(!result.complete(&classify_failure(FailureKind::Connect)));
        assert_eq!(result.message, "ERR: Not Found");
    }
}
