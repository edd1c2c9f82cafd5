//! Phrase matching over lemma token streams.
//!
//! For each still-open candidate, longest first, find the first window of
//! tokens whose lemma sequence equals the candidate's: exact ordered
//! equality over a contiguous window, no fuzzy or partial matching. A
//! window only counts if its character span sits on word boundaries in
//! the original text, so "net" never matches inside "internet".

use crate::catalog::TermCandidate;
use crate::lemma::LemmaToken;

/// An occurrence of a candidate within one text segment. Offsets are byte
/// positions in the original (un-normalized) segment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MatchCandidate {
    /// Index into the prepared candidate list.
    pub candidate: usize,
    pub start: usize,
    pub end: usize,
    pub token_len: usize,
}

/// Scan one segment for candidate occurrences.
///
/// `candidates` must be pre-sorted longest-lemma-sequence first (see
/// `catalog::build_candidates`); evaluating multi-word phrases before
/// their constituent words minimizes accidental phrase splitting. At most
/// one occurrence per candidate is reported, the earliest by start token
/// index. Later occurrences in the same segment are never reported; if
/// the term stays unused it can still match in a following segment.
pub(crate) fn find_phrase_matches<F>(
    text: &str,
    tokens: &[LemmaToken],
    candidates: &[TermCandidate],
    is_open: F,
) -> Vec<MatchCandidate>
where
    F: Fn(&TermCandidate) -> bool,
{
    let mut matches = Vec::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        let n = candidate.lemmas.len();
        if n == 0 || n > tokens.len() || !is_open(candidate) {
            continue;
        }
        for window in 0..=(tokens.len() - n) {
            if !window_equals(&tokens[window..window + n], &candidate.lemmas) {
                continue;
            }
            let start = tokens[window].start;
            let end = tokens[window + n - 1].end;
            if !on_word_boundary(text, start, end) {
                continue;
            }
            matches.push(MatchCandidate {
                candidate: idx,
                start,
                end,
                token_len: n,
            });
            break;
        }
    }
    matches
}

fn window_equals(tokens: &[LemmaToken], lemmas: &[String]) -> bool {
    tokens
        .iter()
        .zip(lemmas)
        .all(|(token, lemma)| token.lemma == *lemma)
}

/// A match is rejected if the character immediately before or after it is
/// alphanumeric relative to the source text.
fn on_word_boundary(text: &str, start: usize, end: usize) -> bool {
    let before_ok = text[..start]
        .chars()
        .next_back()
        .is_none_or(|c| !c.is_alphanumeric());
    let after_ok = text[end..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric());
    before_ok && after_ok
}
