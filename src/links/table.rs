//! Ordered article -> links table
//!
//! Keys keep the order in which articles were first seen. A key holds a
//! single link until a second one arrives; from then on it holds a list.

use crate::ScanError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;

/// The links recorded for one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LinkEntry {
    Single(String),
    Many(Vec<String>),
}

impl LinkEntry {
    /// Every link in the entry, in insertion order
    pub fn links(&self) -> &[String] {
        match self {
            Self::Single(link) => std::slice::from_ref(link),
            Self::Many(links) => links,
        }
    }

    pub fn len(&self) -> usize {
        self.links().len()
    }

    pub fn is_empty(&self) -> bool {
        self.links().is_empty()
    }

    /// Adds a link, promoting a single link to a list
    fn push(&mut self, link: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Many(vec![first, link]);
            }
            Self::Many(links) => links.push(link),
        }
    }
}

/// Mapping from article display text to the links extracted from it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkTable {
    entries: Vec<(String, LinkEntry)>,
    index: HashMap<String, usize>,
}

impl LinkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a link under an article
    pub fn insert(&mut self, article: &str, link: impl Into<String>) {
        let link = link.into();
        match self.index.get(article) {
            Some(&position) => self.entries[position].1.push(link),
            None => {
                self.index.insert(article.to_string(), self.entries.len());
                self.entries
                    .push((article.to_string(), LinkEntry::Single(link)));
            }
        }
    }

    pub fn get(&self, article: &str) -> Option<&LinkEntry> {
        self.index.get(article).map(|&position| &self.entries[position].1)
    }

    /// Iterates `(article, entry)` pairs in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &LinkEntry)> {
        self.entries
            .iter()
            .map(|(article, entry)| (article.as_str(), entry))
    }

    /// Number of articles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of links across every article, duplicates included
    pub fn total_links(&self) -> usize {
        self.entries.iter().map(|(_, entry)| entry.len()).sum()
    }

    /// Parses a table from a JSON object of string or string-array values
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::try_from(value)
    }
}

impl TryFrom<Value> for LinkTable {
    type Error = ScanError;

    /// Any value that is neither a string nor a list of strings is rejected
    /// with [`ScanError::InvalidLinkEntry`].
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ScanError::InvalidLinkEntry {
                key: String::new(),
                reason: "link table must be an object".to_string(),
            });
        };

        let mut table = LinkTable::new();
        for (key, value) in map {
            match value {
                Value::String(link) => table.insert(&key, link),
                Value::Array(items) => {
                    for item in items {
                        match item {
                            Value::String(link) => table.insert(&key, link),
                            other => {
                                return Err(ScanError::InvalidLinkEntry {
                                    key,
                                    reason: format!("list holds a non-string value {}", other),
                                })
                            }
                        }
                    }
                }
                other => {
                    return Err(ScanError::InvalidLinkEntry {
                        key,
                        reason: format!("expected a string or a list, got {}", other),
                    })
                }
            }
        }

        Ok(table)
    }
}

impl Serialize for LinkTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (article, entry) in &self.entries {
            map.serialize_entry(article, entry)?;
        }
        map.end()
    }
}
