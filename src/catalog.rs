//! Catalog entries and term candidate construction.
//!
//! A catalog entry is either a bare target URL (terms are derived from its
//! path segments) or an explicit glossary record (term + aliases map
//! directly). Construction is pure: entries arrive as in-memory
//! structures, and the output is an ordered candidate list with
//! first-registered-URL-wins semantics over the catalog's insertion order.

use std::collections::BTreeMap;

use fxhash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::lemma::Lemmatizer;
use crate::normalize::normalize_term;

/// One catalog record. `url` is required; a present `term` switches the
/// entry to explicit-glossary mode and disables URL derivation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub url: String,
    #[serde(default)]
    pub term: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CatalogEntry {
    /// A bare-URL entry; terms will be derived from the URL path.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            term: None,
            aliases: Vec::new(),
            category: None,
        }
    }
}

/// A term or phrase mapped to its target URL, prepared for matching.
///
/// Aliases become separate candidates sharing a `url`; the budget tracker
/// guarantees at most one of them is ultimately used per document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermCandidate {
    /// Normalized surface form (map key; also the uniqueness key for
    /// "one link per term").
    pub surface: String,
    /// Lemma sequence for the surface. Never empty.
    pub lemmas: Vec<String>,
    /// Target URL. Never empty.
    pub url: String,
    pub category: Option<String>,
}

/// Summary statistics over a catalog, for diagnostics endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogStats {
    pub total_entries: usize,
    pub total_aliases: usize,
    pub unique_urls: usize,
    pub categories: BTreeMap<String, usize>,
}

/// Compute summary statistics for a catalog.
pub fn catalog_stats(entries: &[CatalogEntry]) -> CatalogStats {
    let mut urls: FxHashSet<&str> = FxHashSet::default();
    let mut categories: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_aliases = 0;
    for entry in entries {
        if !entry.url.trim().is_empty() {
            urls.insert(entry.url.as_str());
        }
        total_aliases += entry.aliases.len();
        if let Some(cat) = &entry.category {
            *categories.entry(cat.clone()).or_insert(0) += 1;
        }
    }
    CatalogStats {
        total_entries: entries.len(),
        total_aliases,
        unique_urls: urls.len(),
        categories,
    }
}

/// Build the prepared candidate list for one document-processing call.
///
/// Surfaces are normalized and lemmatized once here; candidates whose
/// lemmatization yields no tokens are dropped. The result is sorted
/// longest-lemma-sequence first (stable, so registration order breaks
/// ties), which is the evaluation order the matcher relies on.
pub(crate) fn build_candidates<L: Lemmatizer>(
    entries: &[CatalogEntry],
    cfg: &LinkConfig,
    lemmatizer: &L,
) -> Result<Vec<TermCandidate>, LinkError> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut candidates: Vec<TermCandidate> = Vec::new();

    let register = |surface: String,
                    url: &str,
                    category: &Option<String>,
                    seen: &mut FxHashSet<String>,
                    candidates: &mut Vec<TermCandidate>|
     -> Result<(), LinkError> {
        if surface.is_empty() || !seen.insert(surface.clone()) {
            // First-registered URL wins for a colliding term string.
            return Ok(());
        }
        let lemmas: Vec<String> = lemmatizer
            .tokenize_and_lemmatize(&surface)?
            .into_iter()
            .map(|t| t.lemma)
            .collect();
        if lemmas.is_empty() {
            return Ok(());
        }
        candidates.push(TermCandidate {
            surface,
            lemmas,
            url: url.to_string(),
            category: category.clone(),
        });
        Ok(())
    };

    for entry in entries {
        let url = entry.url.trim();
        if url.is_empty() {
            warn!(?entry.term, "skipping catalog entry with empty url");
            continue;
        }
        if let Some(term) = &entry.term {
            // Explicit-glossary mode: term and aliases map directly.
            register(normalize_term(term), url, &entry.category, &mut seen, &mut candidates)?;
            for alias in &entry.aliases {
                register(normalize_term(alias), url, &entry.category, &mut seen, &mut candidates)?;
            }
        } else {
            let Some(path) = url_path(url) else {
                warn!(url, "skipping catalog entry with unparsable url");
                continue;
            };
            for term in derive_terms_from_path(&path, cfg) {
                register(term, url, &entry.category, &mut seen, &mut candidates)?;
            }
        }
    }

    // Longest phrases first so multi-word candidates are evaluated before
    // their constituent words; stable sort keeps registration order within
    // a length class.
    candidates.sort_by(|a, b| b.lemmas.len().cmp(&a.lemmas.len()));
    Ok(candidates)
}

/// Extract the path component of a target URL. Accepts absolute URLs and
/// falls back to treating a relative reference as a bare path.
fn url_path(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => Some(parsed.path().to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            Some(url[..end].to_string())
        }
        Err(_) => None,
    }
}

/// Derive term candidates from a URL path, in deterministic order: for
/// each non-stoplisted segment, the de-hyphenated full phrase (when 2..=N
/// words), then every contiguous 1..=N word n-gram.
fn derive_terms_from_path(path: &str, cfg: &LinkConfig) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let path = path.to_lowercase();

    for segment in path.split('/') {
        if segment.is_empty() || cfg.stop_segments.contains(segment) {
            continue;
        }
        let cleaned = strip_suffix_once(segment, cfg);
        if cleaned.is_empty() {
            continue;
        }

        if cleaned.contains(['-', '_']) {
            let phrase = cleaned.replace(['-', '_'], " ");
            let word_count = phrase.split_whitespace().count();
            if (2..=cfg.max_phrase_words).contains(&word_count) && seen.insert(phrase.clone()) {
                terms.push(phrase);
            }
        }

        let words: Vec<&str> = cleaned.split(['-', '_']).filter(|w| !w.is_empty()).collect();
        for n in 1..=cfg.max_phrase_words.min(words.len()) {
            for window in words.windows(n) {
                let ngram = window.join(" ");
                if keep_ngram(&ngram, cfg) && seen.insert(ngram.clone()) {
                    terms.push(ngram);
                }
            }
        }
    }
    terms
}

/// Strip one configured trailing suffix at a hyphen boundary.
fn strip_suffix_once<'a>(segment: &'a str, cfg: &LinkConfig) -> &'a str {
    for suffix in &cfg.strip_suffixes {
        if let Some(stem) = segment.strip_suffix(suffix.as_str()) {
            if let Some(stem) = stem.strip_suffix('-') {
                if !stem.is_empty() {
                    return stem;
                }
            }
        }
    }
    segment
}

/// The asymmetric short-term rule: n-grams longer than 3 characters are
/// kept unless stop-listed; n-grams of <= 3 characters are kept only if
/// whitelisted. Short common words are noise, but short domain acronyms
/// ("etf", "ipo") are high-value link targets.
fn keep_ngram(ngram: &str, cfg: &LinkConfig) -> bool {
    if ngram.chars().count() <= 3 {
        cfg.short_term_whitelist.contains(ngram)
    } else {
        !cfg.stop_words.contains(ngram)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lemma::DefaultLemmatizer;

    fn derive(url: &str) -> Vec<String> {
        let cfg = LinkConfig::default();
        derive_terms_from_path(&url_path(url).expect("path"), &cfg)
    }

    #[test]
    fn derives_phrase_and_ngrams() {
        let terms = derive("https://capital.com/en-int/learn/glossary/index-funds-definition");
        assert!(terms.contains(&"index funds".to_string()));
        assert!(terms.contains(&"index".to_string()));
        assert!(terms.contains(&"funds".to_string()));
    }

    #[test]
    fn stoplisted_segments_skipped() {
        let terms = derive("https://capital.com/en-int/learn/glossary/portfolio-definition");
        assert_eq!(terms, vec!["portfolio".to_string()]);
    }

    #[test]
    fn short_terms_need_whitelist() {
        // "etf" (3 chars) survives only because it is whitelisted; a
        // 3-char word outside the whitelist is dropped.
        let terms = derive("https://x.com/etf-definition");
        assert!(terms.contains(&"etf".to_string()));
        let terms = derive("https://x.com/dog-definition");
        assert!(!terms.contains(&"dog".to_string()));
    }

    #[test]
    fn stop_words_suppress_long_ngrams() {
        let terms = derive("https://x.com/what-is-the-spread");
        assert!(terms.contains(&"spread".to_string()));
        assert!(!terms.contains(&"what".to_string()));
    }

    #[test]
    fn relative_urls_accepted() {
        let terms = derive("/learn/glossary/stop-loss-definition");
        assert!(terms.contains(&"stop loss".to_string()));
    }

    #[test]
    fn first_registered_url_wins() {
        let cfg = LinkConfig::default();
        let entries = vec![
            CatalogEntry {
                url: "https://x/first".into(),
                term: Some("spread".into()),
                aliases: vec![],
                category: None,
            },
            CatalogEntry {
                url: "https://x/second".into(),
                term: Some("Spread".into()),
                aliases: vec![],
                category: None,
            },
        ];
        let candidates = build_candidates(&entries, &cfg, &DefaultLemmatizer).expect("build");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://x/first");
    }

    #[test]
    fn aliases_map_to_same_url() {
        let cfg = LinkConfig::default();
        let entries = vec![CatalogEntry {
            url: "https://x/etf".into(),
            term: Some("etf".into()),
            aliases: vec!["ETFs".into(), "exchange-traded fund".into()],
            category: Some("funds".into()),
        }];
        let candidates = build_candidates(&entries, &cfg, &DefaultLemmatizer).expect("build");
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| c.url == "https://x/etf"));
        // Longest lemma sequence sorts first.
        assert_eq!(candidates[0].surface, "exchange-traded fund");
    }

    #[test]
    fn empty_and_unparsable_urls_skipped() {
        let cfg = LinkConfig::default();
        let entries = vec![
            CatalogEntry::from_url(""),
            CatalogEntry::from_url("https://x.com/margin-definition"),
        ];
        let candidates = build_candidates(&entries, &cfg, &DefaultLemmatizer).expect("build");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].surface, "margin");
    }

    #[test]
    fn stats_count_categories_and_urls() {
        let entries = vec![
            CatalogEntry {
                url: "https://x/a".into(),
                term: Some("alpha".into()),
                aliases: vec!["first".into()],
                category: Some("greek".into()),
            },
            CatalogEntry {
                url: "https://x/b".into(),
                term: Some("beta".into()),
                aliases: vec![],
                category: Some("greek".into()),
            },
            CatalogEntry::from_url("https://x/a"),
        ];
        let stats = catalog_stats(&entries);
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.total_aliases, 1);
        assert_eq!(stats.unique_urls, 2);
        assert_eq!(stats.categories.get("greek"), Some(&2));
    }
}
