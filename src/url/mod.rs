//! URL handling module for Korzina
//!
//! Provides href resolution, deduplication keys, detail-URL shape matching,
//! and the deduplicated URL set used during discovery.

mod matcher;
mod normalize;

pub use matcher::DetailUrlMatcher;
pub use normalize::{dedup_key, resolve_href};

use std::collections::HashSet;
use url::Url;

/// An insertion-ordered set of product-detail URLs
///
/// Uniqueness is keyed on the normalized form (scheme + host + path), so two
/// hrefs that resolve to the same absolute path occupy one slot. The set grows
/// monotonically during a category walk and is then moved, whole, to the
/// pipeline.
#[derive(Debug, Default)]
pub struct UrlSet {
    seen: HashSet<String>,
    urls: Vec<Url>,
}

impl UrlSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a URL; returns true if it was not already present
    pub fn insert(&mut self, url: Url) -> bool {
        if self.seen.insert(dedup_key(&url)) {
            self.urls.push(url);
            true
        } else {
            false
        }
    }

    /// Returns true if the normalized form of `url` is already present
    pub fn contains(&self, url: &Url) -> bool {
        self.seen.contains(&dedup_key(url))
    }

    /// Moves every URL of `other` into this set
    pub fn merge(&mut self, other: UrlSet) {
        for url in other.urls {
            self.insert(url);
        }
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Iterates URLs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.urls.iter()
    }

    /// Consumes the set, yielding URLs in insertion order
    pub fn into_vec(self) -> Vec<Url> {
        self.urls
    }
}
