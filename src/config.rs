//! YAML configuration file support for the link engine.
//!
//! All tuning knobs (the link budget, the URL-derivation stoplists, the
//! short-term whitelist, and the excluded-element set) live in
//! [`LinkConfig`], which can be built in code or loaded from a YAML file.
//!
//! ## Example YAML configuration
//!
//! ```yaml
//! version: 1
//! max_links: 12
//! stop_segments: ["en-int", "learn", "glossary", "market-guides"]
//! strip_suffixes: ["definition", "guide", "trading"]
//! stop_words: ["the", "and", "with"]
//! short_term_whitelist: ["etf", "ipo", "gdp"]
//! excluded_elements: ["h1", "h2", "a", "script", "nav"]
//! max_phrase_words: 4
//! ```

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a YAML configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Configuration for term derivation and link insertion.
///
/// Cheap to clone and serde-friendly. The default sets reproduce the
/// production glossary-linking rules for financial content; callers with
/// a different domain swap the word lists, not the code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct LinkConfig {
    /// Configuration schema version. Must be >= 1; version 0 is reserved.
    pub version: u32,

    /// Maximum total links per document, counting pre-existing anchors.
    #[serde(default = "LinkConfig::default_max_links")]
    pub max_links: usize,

    /// URL path segments that never yield terms (locale and section
    /// markers like "learn" or "glossary").
    #[serde(default)]
    pub stop_segments: BTreeSet<String>,

    /// Trailing suffixes stripped from a path segment before term
    /// derivation ("portfolio-definition" → "portfolio"). Matched at a
    /// hyphen boundary, in declaration order, applied once.
    #[serde(default)]
    pub strip_suffixes: Vec<String>,

    /// Common words suppressed as standalone term candidates. Applies to
    /// derived n-grams longer than 3 characters.
    #[serde(default)]
    pub stop_words: BTreeSet<String>,

    /// Short terms (<= 3 characters) that are kept despite their length:
    /// acronyms and tickers that are high-value link targets. This is the
    /// only path by which a short n-gram survives derivation.
    #[serde(default)]
    pub short_term_whitelist: BTreeSet<String>,

    /// Element names whose subtrees are ineligible for link insertion.
    #[serde(default = "LinkConfig::default_excluded_elements")]
    pub excluded_elements: BTreeSet<String>,

    /// Maximum words in a derived phrase or n-gram.
    #[serde(default = "LinkConfig::default_max_phrase_words")]
    pub max_phrase_words: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            version: 1,
            max_links: Self::default_max_links(),
            stop_segments: to_set(&["en-int", "learn", "glossary", "market-guides"]),
            strip_suffixes: [
                "definition", "trading", "market", "guide", "funds", "fund", "what", "the",
                "is", "of", "an", "a",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            stop_words: to_set(&[
                "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he",
                "in", "is", "it", "its", "of", "on", "that", "the", "to", "was", "will",
                "with", "or", "but", "not", "what", "when", "where", "why", "how", "any",
                "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor",
                "only", "own", "same", "so", "than", "too", "very", "can", "just", "should",
                "now",
            ]),
            short_term_whitelist: to_set(&[
                "etf", "ipo", "cfd", "mt4", "mt5", "api", "otc", "dax", "gtd", "pip", "net",
                "gdp", "g20", "g10", "bbb", "ccc", "sec", "roe", "npl", "peg", "imf", "bep",
                "ism", "emv", "xpo", "amm", "dma", "ddu", "grs", "irs", "vix", "dow", "vif",
                "xva", "etp", "fis", "tsx", "cac", "sse", "jse", "lbs", "omx", "del", "cum",
                "mix", "put", "buy", "out", "low", "mid", "tax", "all", "off", "tri", "non",
                "per", "bar", "kse", "pse", "ups", "a50", "100", "225", "200", "500", "web",
                "app", "key", "top", "usd", "eur", "aud", "jpy", "cad", "gbp", "chf", "nzd",
                "amd", "tui", "arm", "sui", "neo", "inu", "lot", "oil", "nio", "fee", "day",
                "sar", "esg", "ppp",
            ]),
            excluded_elements: Self::default_excluded_elements(),
            max_phrase_words: Self::default_max_phrase_words(),
        }
    }
}

impl LinkConfig {
    pub(crate) fn default_max_links() -> usize {
        12
    }

    pub(crate) fn default_max_phrase_words() -> usize {
        4
    }

    fn default_excluded_elements() -> BTreeSet<String> {
        to_set(&[
            "h1", "h2", "h3", "h4", "h5", "h6", "a", "script", "style", "nav", "header",
            "footer", "aside",
        ])
    }

    /// Load a configuration from a YAML file and validate it.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigLoadError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse a configuration from a YAML string and validate it.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigLoadError> {
        let cfg: LinkConfig = serde_yaml::from_str(yaml)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate structural constraints.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.version == 0 {
            return Err(ConfigLoadError::Validation(
                "config version must be >= 1".into(),
            ));
        }
        if self.max_phrase_words == 0 {
            return Err(ConfigLoadError::Validation(
                "max_phrase_words must be >= 1".into(),
            ));
        }
        Ok(())
    }

    /// Terms listed in both `stop_words` and `short_term_whitelist`.
    ///
    /// The two sets are plain configuration data with explicit precedence
    /// (the whitelist is consulted only for n-grams of <= 3 characters),
    /// so an overlap is not fatal, but it usually means the operator
    /// edited one list and forgot the other, so the engine logs each one
    /// at construction.
    pub fn overlap_warnings(&self) -> Vec<String> {
        self.stop_words
            .intersection(&self.short_term_whitelist)
            .map(|term| {
                format!(
                    "term '{term}' is in both stop_words and short_term_whitelist; \
                     the whitelist wins only for terms of <= 3 characters"
                )
            })
            .collect()
    }
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}
