//! Overlap resolution for candidate matches within one text segment.
//!
//! Greedy longest-first selection: a 3-word phrase match is never
//! fragmented by a shorter single-word match sharing a token. This is
//! deliberately not globally optimal in total match count; editorial
//! policy favors fewer, richer links over many short ones.

use crate::matcher::MatchCandidate;

/// Pick a maximal non-overlapping subset of `matches`.
///
/// Sort order is `(-token_len, start)`: longest phrases first, ties
/// broken by earliest position. Accepted matches are returned re-sorted
/// by start offset ascending, ready for splicing.
pub(crate) fn select_non_overlapping(mut matches: Vec<MatchCandidate>) -> Vec<MatchCandidate> {
    matches.sort_by(|a, b| {
        b.token_len
            .cmp(&a.token_len)
            .then(a.start.cmp(&b.start))
    });

    let mut selected: Vec<MatchCandidate> = Vec::new();
    for m in matches {
        let overlaps = selected
            .iter()
            .any(|s| m.start < s.end && m.end > s.start);
        if !overlaps {
            selected.push(m);
        }
    }

    selected.sort_by_key(|m| m.start);
    selected
}
