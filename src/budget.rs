//! Per-document link budget state.
//!
//! One `LinkBudget` lives for exactly one document-rewrite call. It is an
//! owned, non-shared state object passed into each segment-processing
//! step, which keeps "first match wins" deterministic and multi-document
//! concurrency trivial. Independent calls never share budget state.
//!
//! Reservations must happen in document order, segment by segment, so
//! earlier-appearing terms win ties for a shared URL or alias set.

use fxhash::FxHashSet;
use url::Url;

/// Tracks which terms and target URLs have been used and how many link
/// slots remain.
#[derive(Debug, Clone)]
pub struct LinkBudget {
    used_terms: FxHashSet<String>,
    used_urls: FxHashSet<String>,
    remaining: usize,
}

impl LinkBudget {
    /// Create a budget for one document. `remaining` starts at
    /// `max_links - existing_links` (saturating at zero). A configured
    /// current-page URL is treated as permanently reserved so the engine
    /// never links a page to itself.
    pub fn new(max_links: usize, existing_links: usize, current_page_url: Option<&str>) -> Self {
        let mut used_urls = FxHashSet::default();
        if let Some(current) = current_page_url {
            used_urls.insert(url_key(current));
        }
        Self {
            used_terms: FxHashSet::default(),
            used_urls,
            remaining: max_links.saturating_sub(existing_links),
        }
    }

    /// Remaining link slots. Once zero, no further matches are accepted
    /// anywhere in the document.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether a candidate could still be reserved. Used by the matcher
    /// to avoid scanning for terms that can no longer be linked.
    pub fn is_open(&self, term: &str, url: &str) -> bool {
        self.remaining > 0
            && !self.used_terms.contains(term)
            && !self.used_urls.contains(&url_key(url))
    }

    /// Reserve one link slot for `(term, url)`. Returns false (no-op) if
    /// the URL or term is already used or no slots remain.
    pub fn try_reserve(&mut self, term: &str, url: &str) -> bool {
        if self.remaining == 0 || self.used_terms.contains(term) {
            return false;
        }
        let key = url_key(url);
        if self.used_urls.contains(&key) {
            return false;
        }
        self.used_terms.insert(term.to_string());
        self.used_urls.insert(key);
        self.remaining -= 1;
        true
    }
}

/// Normalized uniqueness key for a target URL: scheme, host, port, and
/// path with any trailing slash trimmed. Relative references fall back to
/// plain trailing-slash trimming.
pub(crate) fn url_key(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let mut key = format!(
                "{}://{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or_default()
            );
            if let Some(port) = parsed.port() {
                key.push_str(&format!(":{port}"));
            }
            key.push_str(parsed.path().trim_end_matches('/'));
            key
        }
        Err(_) => url.trim_end_matches('/').to_string(),
    }
}
