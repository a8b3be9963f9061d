//! Result store shared by concurrent verification completions
//!
//! Every correlation (find all results for a link, then update them) happens
//! under one lock acquisition, so completions touching the same link never
//! interleave.

use crate::links::correlation_key;
use crate::state::classify::Classification;
use crate::state::scan_result::ScanResult;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct StoreInner {
    results: Vec<ScanResult>,
    /// correlation key -> indices into `results`
    by_link: HashMap<String, Vec<usize>>,
    /// resolved URL -> message
    status_map: HashMap<String, String>,
}

/// Holds every scan result and the resolved-URL status map
#[derive(Debug, Default)]
pub struct ResultStore {
    inner: Mutex<StoreInner>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Adds a pending result
    pub fn push(&self, result: ScanResult) {
        let mut inner = self.lock();
        let index = inner.results.len();
        inner
            .by_link
            .entry(correlation_key(&result.scanned_link))
            .or_default()
            .push(index);
        inner.results.push(result);
    }

    /// Applies a classification to every result that scanned `requested_link`
    ///
    /// The message is also recorded in the status map, under the resolved URL
    /// when the link redirected and under `requested_link` otherwise.
    /// Returns the number of results that moved to `Done`.
    pub fn apply(&self, requested_link: &str, classification: &Classification) -> usize {
        let mut inner = self.lock();

        let resolved = classification
            .final_url
            .clone()
            .unwrap_or_else(|| requested_link.to_string());
        inner
            .status_map
            .insert(resolved, classification.message.clone());

        let indices = inner
            .by_link
            .get(&correlation_key(requested_link))
            .cloned()
            .unwrap_or_default();

        indices
            .into_iter()
            .filter(|&index| inner.results[index].complete(classification))
            .count()
    }

    /// Looks up a message in the status map
    ///
    /// Falls back to the URL with a trailing slash appended.
    pub fn status_of(&self, url: &str) -> Option<String> {
        let inner = self.lock();
        inner
            .status_map
            .get(url)
            .or_else(|| inner.status_map.get(&format!("{}/", url)))
            .cloned()
    }

    /// Returns every result that scanned the given link
    pub fn results_for(&self, link: &str) -> Vec<ScanResult> {
        let inner = self.lock();
        inner
            .by_link
            .get(&correlation_key(link))
            .map(|indices| indices.iter().map(|&i| inner.results[i].clone()).collect())
            .unwrap_or_default()
    }

    /// Snapshot of every result, in extraction order
    pub fn results(&self) -> Vec<ScanResult> {
        self.lock().results.clone()
    }

    /// Snapshot of the resolved-URL status map
    pub fn status_map(&self) -> HashMap<String, String> {
        self.lock().status_map.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of results still waiting for verification
    pub fn pending_count(&self) -> usize {
        self.lock().results.iter().filter(|r| !r.is_done()).count()
    }

    /// Drops every result and status entry
    pub fn clear(&self) {
        *self.lock() = StoreInner::default();
    }
}
