//! The injected linguistic capability.
//!
//! Matching operates over lemma token streams, not raw characters. The
//! engine never assumes a particular lemmatization algorithm, only the
//! contract captured by [`Lemmatizer`]: deterministic output and byte
//! offsets into the exact input string. A conservative built-in
//! implementation, [`DefaultLemmatizer`], covers English plurals and
//! possessives without any model dependency.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::LemmaError;

/// A lemmatized token with byte offsets into the original input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LemmaToken {
    /// Lowercased base form used for matching (e.g. "funds" → "fund").
    pub lemma: String,
    /// Byte offset (inclusive) of the token in the input text.
    pub start: usize,
    /// Byte offset (exclusive) of the token in the input text.
    pub end: usize,
}

/// Tokenization + lemmatization contract.
///
/// Implementations must be deterministic for identical input and must
/// preserve byte offsets into the exact input string given. Offsets are
/// what ties a lemma-level match back to the author's original characters,
/// so an implementation that rewrites or re-flows text before tokenizing
/// breaks the engine.
pub trait Lemmatizer {
    fn tokenize_and_lemmatize(&self, text: &str) -> Result<Vec<LemmaToken>, LemmaError>;
}

/// Built-in offset-preserving lemmatizer.
///
/// Pipeline: UAX#29 word boundaries → strip possessive `'s` → drop
/// non-alphanumeric characters → lowercase → plural folding. Purely
/// rule-based and infallible; the `Result` exists for the trait contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLemmatizer;

impl Lemmatizer for DefaultLemmatizer {
    fn tokenize_and_lemmatize(&self, text: &str) -> Result<Vec<LemmaToken>, LemmaError> {
        let mut tokens = Vec::new();
        for (start, word) in text.split_word_bound_indices() {
            if !word.chars().any(|c| c.is_alphanumeric()) {
                continue;
            }
            let lemma = lemmatize_word(word);
            if lemma.is_empty() {
                continue;
            }
            tokens.push(LemmaToken {
                lemma,
                start,
                end: start + word.len(),
            });
        }
        Ok(tokens)
    }
}

/// Strip English possessive suffix (`'s` / `\u{2019}s`).
fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("\u{2019}s"))
        .unwrap_or(word)
}

/// Lowercase a single word, drop punctuation inside it, and fold common
/// English plural forms to the singular.
fn lemmatize_word(word: &str) -> String {
    let cleaned: String = strip_possessive(word)
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();
    fold_plural(&cleaned)
}

/// Conservative plural folding. Words ending in "ss", "us", or "is" are
/// left alone ("class", "bonus", "analysis"); "-ies" becomes "-y" for
/// words long enough that the rule is safe ("policies" → "policy" but
/// "ties" → "tie" is wrong, so require length >= 5).
fn fold_plural(word: &str) -> String {
    let len = word.chars().count();
    if len >= 5 {
        if let Some(stem) = word.strip_suffix("ies") {
            return format!("{stem}y");
        }
    }
    if word.ends_with("ss") || word.ends_with("us") || word.ends_with("is") {
        return word.to_string();
    }
    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if len >= 4 {
            if let Some(stem) = word.strip_suffix(suffix) {
                // "boxes" → "box", "indexes" → "index"
                return format!("{stem}{}", &suffix[..suffix.len() - 2]);
            }
        }
    }
    if len >= 3 {
        if let Some(stem) = word.strip_suffix('s') {
            return stem.to_string();
        }
    }
    word.to_string()
}
