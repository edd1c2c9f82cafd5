//! Term surface normalization.
//!
//! Candidate surfaces are normalized once at term-map build time: Unicode
//! NFKC, locale-free lowercasing, and whitespace collapsing. Segment text
//! is deliberately *not* normalized before matching: lemma token offsets
//! must address the exact original text so anchors wrap the author's
//! characters (case and punctuation intact).

use unicode_normalization::UnicodeNormalization;

/// Collapses repeated whitespace, trims edges, and normalizes newlines to
/// single spaces. Deterministic; returns an empty string for
/// whitespace-only input.
pub fn collapse_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    for segment in text.split_whitespace() {
        if !normalized.is_empty() {
            normalized.push(' ');
        }
        normalized.push_str(segment);
    }
    normalized
}

/// Normalizes a term surface for map keys and comparison: NFKC, then
/// lowercase, then whitespace collapse.
pub fn normalize_term(text: &str) -> String {
    let composed: String = text.nfkc().collect();
    collapse_whitespace(&composed.to_lowercase())
}
