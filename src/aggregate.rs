// src/aggregate.rs
//! Digest assembly: dedupe by link, order by recency, stamp the run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One classified feed item. Field order matches the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    pub source: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
    /// Never empty; the classifier falls back to the default label.
    pub categories: Vec<String>,
}

/// Per-source fetch outcome, in registry order. `count` is the number of
/// items that survived filtering for that source, before cross-source
/// deduplication; a failed fetch reports 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub name: String,
    pub url: String,
    pub count: usize,
}

/// The run's single output artifact. Replaced wholesale on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub sources: Vec<SourceSummary>,
    pub items: Vec<NewsItem>,
}

/// Drop items whose exact link was already seen, keeping the first
/// occurrence in input order. No link normalization.
pub fn dedupe_by_link(items: Vec<NewsItem>) -> Vec<NewsItem> {
    let mut seen: HashSet<String> = HashSet::with_capacity(items.len());
    let mut unique = Vec::with_capacity(items.len());
    for item in items {
        if !seen.insert(item.link.clone()) {
            continue;
        }
        unique.push(item);
    }
    unique
}

/// Dedupe, sort newest-first (undated items land at the end, ties keep input
/// order), and stamp `generated_at` with the completion time of the run.
pub fn build_digest(items: Vec<NewsItem>, sources: Vec<SourceSummary>) -> Digest {
    let mut items = dedupe_by_link(items);
    // Option orders None < Some, so the reversed comparison puts undated
    // items last. Vec::sort_by is stable.
    items.sort_by(|a, b| b.published.cmp(&a.published));
    Digest {
        generated_at: Utc::now(),
        sources,
        items,
    }
}
