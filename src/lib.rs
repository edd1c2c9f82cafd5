//! Internal link insertion for HTML articles.
//!
//! Given an article (full document or fragment) and a catalog of target
//! pages, this crate finds the first natural-language occurrence of each
//! target's term inside eligible body text and wraps it in an anchor.
//!
//! ## What we do
//!
//! - Derive linkable terms from catalog URLs (or take them verbatim)
//! - Match terms against body text at the lemma level, longest phrase first
//! - Link each term and each target URL at most once per document
//! - Cap total links (existing anchors count against the cap)
//! - Never touch headings, existing anchors, scripts, styles, or nav chrome
//!
//! ## Determinism guarantee
//!
//! No I/O, no clock calls, no randomness. Same markup + same catalog +
//! same config = byte-identical output on any machine. When nothing can be
//! inserted the input markup is returned untouched, byte for byte.
//!
//! ## Quick start
//!
//! ```
//! use interlink::{rewrite, CatalogEntry, RewriteRequest};
//!
//! let req = RewriteRequest {
//!     html: "<p>ETFs are popular with new investors.</p>".into(),
//!     catalog: vec![CatalogEntry {
//!         url: "https://example.com/glossary/etf".into(),
//!         term: Some("etf".into()),
//!         aliases: vec!["etfs".into()],
//!         category: None,
//!     }],
//!     current_page_url: None,
//!     max_links: None,
//! };
//! let out = rewrite(&req).unwrap();
//! assert_eq!(out.inserted.len(), 1);
//! assert!(out.html.contains("<a href=\"https://example.com/glossary/etf\">ETFs</a>"));
//! ```

mod budget;
mod catalog;
mod config;
mod error;
mod lemma;
mod matcher;
mod normalize;
mod rewrite;
mod select;

pub use crate::budget::LinkBudget;
pub use crate::catalog::{catalog_stats, CatalogEntry, CatalogStats, TermCandidate};
pub use crate::config::{ConfigLoadError, LinkConfig};
pub use crate::error::{LemmaError, LinkError};
pub use crate::lemma::{DefaultLemmatizer, LemmaToken, Lemmatizer};
pub use crate::normalize::{collapse_whitespace, normalize_term};
pub use crate::rewrite::{
    LinkEngine, LinkPlacement, RewriteRequest, RewriteWarning, Rewritten,
};

/// Rewrite a document with the default configuration and lemmatizer.
pub fn rewrite(req: &RewriteRequest) -> Result<Rewritten, LinkError> {
    LinkEngine::new(LinkConfig::default())?.rewrite(req)
}

/// Report the placements [`rewrite`] would make, without producing markup.
pub fn analyze(req: &RewriteRequest) -> Result<Vec<LinkPlacement>, LinkError> {
    LinkEngine::new(LinkConfig::default())?.analyze(req)
}
