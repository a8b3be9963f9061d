//! Scan phase: extract links from every article, then verify them
//!
//! Extraction is sequential, one article at a time, so links are attributed
//! to their articles in a fixed order. Verification fires every normalized
//! link as one concurrent batch and correlates each completion back to the
//! scan results that referenced the link.

use crate::config::{ScanConfig, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_TIMEOUT_SECS};
use crate::crawler::fetcher::{
    build_http_client, fetch_page, follow_redirects, FetchError, FollowedResponse,
};
use crate::crawler::gatherer::{ArticleEntry, Gatherer};
use crate::crawler::parser::{Level, PageDocument};
use crate::crawler::progress;
use crate::links::{decode_link, normalize, resolve_href, trim_href, LinkTable};
use crate::output::ScanReport;
use crate::state::{
    classify_failure, classify_status, Classification, ResultStore, ScanResult,
};
use crate::ScanError;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Per-request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(DEFAULT_TIMEOUT_SECS);

/// Counters for a single extraction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionTally {
    /// Articles fetched and searched
    pub articles_scanned: usize,
    /// Articles that could not be fetched
    pub articles_skipped: usize,
    /// (article, level) pairs that matched no element
    pub frames_dropped: usize,
    /// Anchors seen inside matched frames
    pub anchors_seen: usize,
    /// Anchors with an href, recorded as scan results
    pub links_kept: usize,
}

/// Extracts and verifies the links of gathered articles
pub struct Scanner {
    client: Client,
    articles: Vec<ArticleEntry>,
    verbose: bool,
    timeout: Duration,
    max_concurrent_requests: usize,
    levels: Vec<Level>,
    link_table: LinkTable,
    normalized: Vec<String>,
    store: ResultStore,
}

impl Scanner {
    /// Creates a scanner over the gatherer's articles
    ///
    /// The scanner reuses the gatherer's request settings with its own
    /// per-request timeout.
    pub fn new(gatherer: &Gatherer, timeout: Duration) -> crate::Result<Self> {
        let settings = gatherer.settings();
        let client = build_http_client(&settings.request, timeout)?;

        Ok(Self {
            client,
            articles: gatherer.articles().to_vec(),
            verbose: settings.verbose,
            timeout,
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            levels: Vec::new(),
            link_table: LinkTable::new(),
            normalized: Vec::new(),
            store: ResultStore::new(),
        })
    }

    /// Creates a scanner with the configured timeout, concurrency and levels
    pub fn from_config(gatherer: &Gatherer, config: &ScanConfig) -> crate::Result<Self> {
        let mut scanner = Self::new(gatherer, Duration::from_secs(config.timeout_secs))?
            .with_max_concurrent_requests(config.max_concurrent_requests);
        for level in &config.levels {
            scanner.add_level(level.clone())?;
        }
        Ok(scanner)
    }

    /// Sets how many verification requests may be in flight at once
    pub fn with_max_concurrent_requests(mut self, max: usize) -> Self {
        self.max_concurrent_requests = max.max(1);
        self
    }

    /// Registers a level to search for links in every article
    ///
    /// # Errors
    ///
    /// [`ScanError::DuplicateLevel`] if an equal level is already registered.
    pub fn add_level(&mut self, level: Level) -> crate::Result<()> {
        if self.levels.contains(&level) {
            return Err(ScanError::DuplicateLevel {
                level: level.to_string(),
            });
        }
        self.levels.push(level);
        Ok(())
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches every article and extracts links from each registered level
    ///
    /// Articles that cannot be fetched and levels that match nothing are
    /// logged and skipped. Results from a previous pass are discarded.
    ///
    /// # Errors
    ///
    /// [`ScanError::NoLinksInScanLevel`] if no level was registered.
    pub async fn collect_links(&mut self) -> crate::Result<ExtractionTally> {
        if self.levels.is_empty() {
            return Err(ScanError::NoLinksInScanLevel);
        }

        self.link_table = LinkTable::new();
        self.normalized.clear();
        self.store.clear();

        let mut tally = ExtractionTally::default();
        for (index, article) in self.articles.iter().enumerate() {
            progress(
                self.verbose,
                format_args!("Getting links for article: {}", article),
            );

            let body = match fetch_page(&self.client, &article.link).await {
                Ok((status_code, body)) if (200..300).contains(&status_code) => body,
                Ok((status_code, _)) => {
                    tracing::warn!("Skipping {}: HTTP {}", article, status_code);
                    tally.articles_skipped += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", article, e);
                    tally.articles_skipped += 1;
                    continue;
                }
            };

            extract_article(
                index,
                article,
                &body,
                &self.levels,
                &mut self.link_table,
                &self.store,
                self.verbose,
                &mut tally,
            );
            tally.articles_scanned += 1;
        }

        self.normalized = normalize(&self.link_table);
        tracing::info!(
            "Normalized {} extracted links to {} links to verify ({} articles scanned, {} skipped)",
            tally.links_kept,
            self.normalized.len(),
            tally.articles_scanned,
            tally.articles_skipped
        );

        Ok(tally)
    }

    /// Verifies every normalized link concurrently
    ///
    /// Returns once every request has completed or failed. Transport
    /// failures become results; only a status code or failure that the
    /// classification tables do not cover is an error.
    ///
    /// # Errors
    ///
    /// [`ScanError::UnknownDictEntry`] for an unclassifiable completion. The
    /// remaining requests are still awaited and applied.
    pub async fn scan_links(&self) -> crate::Result<()> {
        if self.normalized.is_empty() {
            tracing::info!("No links to verify");
            return Ok(());
        }

        tracing::info!(
            "Firing {} requests and waiting for them to come back",
            self.normalized.len()
        );

        let client = &self.client;
        let mut completions = stream::iter(self.normalized.iter())
            .map(|link| async move { (link, follow_redirects(client, link).await) })
            .buffer_unordered(self.max_concurrent_requests);

        let mut fault = None;
        while let Some((link, response)) = completions.next().await {
            match classify_response(link, response) {
                Ok(classification) => {
                    let updated = self.store.apply(link, &classification);
                    tracing::debug!(
                        "{} -> {} ({} results updated)",
                        link,
                        classification.message,
                        updated
                    );
                }
                Err(e) => {
                    tracing::error!("Cannot classify {}: {}", link, e);
                    fault.get_or_insert(e);
                }
            }
        }

        match fault {
            Some(e) => Err(e),
            None => {
                tracing::info!("Verified {} links", self.normalized.len());
                Ok(())
            }
        }
    }

    /// The deduplicated links selected for verification
    pub fn normalized_links(&self) -> &[String] {
        &self.normalized
    }

    /// Every link extracted, grouped by article text
    pub fn link_table(&self) -> &LinkTable {
        &self.link_table
    }

    /// Snapshot of every scan result, in extraction order
    pub fn results(&self) -> Vec<ScanResult> {
        self.store.results()
    }

    /// Scan results that referenced a link
    pub fn results_for(&self, link: &str) -> Vec<ScanResult> {
        self.store.results_for(link)
    }

    /// Message recorded for a resolved URL, trying a trailing slash too
    pub fn status_of(&self, url: &str) -> Option<String> {
        self.store.status_of(url)
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Per-article report of the current results
    pub fn report(&self) -> ScanReport {
        ScanReport::from_results(&self.articles, &self.store.results(), &self.normalized)
    }
}

/// Searches one article for links in every level
fn extract_article(
    article_index: usize,
    article: &ArticleEntry,
    body: &str,
    levels: &[Level],
    link_table: &mut LinkTable,
    store: &ResultStore,
    verbose: bool,
    tally: &mut ExtractionTally,
) {
    let base = Url::parse(&article.link).ok();
    let document = PageDocument::parse(body);

    for level in levels {
        let frames = document.find_all(level);
        if frames.is_empty() {
            progress(
                verbose,
                format_args!("Dropping {} at {} because it contains no links", article.text, level),
            );
            tally.frames_dropped += 1;
            continue;
        }

        for frame in &frames {
            let anchors = document.anchors_of(frame);
            tally.anchors_seen += anchors.len();
            tracing::debug!("Found {} links in {} at {}", anchors.len(), article.text, level);

            for anchor in anchors {
                let Some(href) = anchor.href else {
                    continue;
                };

                let trimmed = trim_href(&href);
                let link = match &base {
                    Some(base) => resolve_href(&trimmed, base),
                    None => trimmed,
                };

                store.push(
                    ScanResult::pending(article.text.clone(), article.link.clone(), link.clone())
                        .at_article(article_index),
                );
                link_table.insert(&article.text, link);
                tally.links_kept += 1;
            }
        }
    }
}

/// Turns a completed request into a classification
///
/// A redirected link is classified by its first hop's status code, with the
/// final URL as context.
fn classify_response(
    link: &str,
    response: Result<FollowedResponse, FetchError>,
) -> crate::Result<Classification> {
    match response {
        Ok(followed) => {
            let target = decode_link(&followed.final_url);
            let status_code = followed
                .redirects
                .first()
                .map(|hop| hop.status_code)
                .unwrap_or(followed.status_code);

            let mut classification = classify_status(status_code, &target)?;
            if followed.was_redirected() {
                classification.final_url = Some(target);
            }
            Ok(classification)
        }
        Err(e) => match e.failure_kind() {
            Some(kind) => Ok(classify_failure(kind)),
            None => Err(ScanError::UnknownDictEntry(format!(
                "transport failure for {}: {}",
                link, e
            ))),
        },
    }
}
