//! Document rewriting: walk eligible text nodes in source order, run the
//! match → select → reserve pipeline per node, and splice accepted
//! matches into alternating text/anchor fragments.
//!
//! All non-text markup is left untouched. Text inside headings, existing
//! anchors, scripts/styles, and navigation chrome is never eligible, at
//! any ancestor depth. Exact original characters (case, punctuation) are
//! preserved inside each accepted span; only the wrapping anchor element
//! is added.

use ego_tree::NodeId;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, Namespace, QualName};
use scraper::node::{Element, Text};
use scraper::{Html, Node};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::budget::LinkBudget;
use crate::catalog::{build_candidates, CatalogEntry, TermCandidate};
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::lemma::{DefaultLemmatizer, Lemmatizer};
use crate::matcher::{find_phrase_matches, MatchCandidate};
use crate::select::select_non_overlapping;

#[cfg(test)]
mod tests;

/// One document-processing request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RewriteRequest {
    /// Article markup: a full document or a fragment.
    pub html: String,
    /// Target pages; see [`CatalogEntry`] for the two entry modes.
    pub catalog: Vec<CatalogEntry>,
    /// URL of the page being processed. Its target is permanently
    /// reserved so the page never links to itself.
    #[serde(default)]
    pub current_page_url: Option<String>,
    /// Per-request budget override; `None` uses the configured default.
    #[serde(default)]
    pub max_links: Option<usize>,
}

/// An inserted (or previewed) link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkPlacement {
    /// Normalized surface form of the matched term.
    pub term: String,
    pub url: String,
    pub category: Option<String>,
    /// Byte offset of the match within its owning text segment.
    pub position: usize,
}

/// Non-fatal conditions under which the document is returned unmodified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RewriteWarning {
    /// The catalog yielded zero usable terms.
    NoUsableTerms,
    /// Pre-existing links already meet or exceed the budget.
    BudgetExhausted,
}

/// Result of a rewrite call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rewritten {
    pub html: String,
    /// Accepted links in document order.
    pub inserted: Vec<LinkPlacement>,
    /// Anchors already present in the input.
    pub existing_links: usize,
    pub warning: Option<RewriteWarning>,
}

/// The link-insertion engine.
///
/// Holds configuration and the injected linguistic capability; all
/// per-document state (term candidates, budget) is built fresh inside
/// each call, so one engine can serve many documents, including from
/// multiple threads when `L: Sync`.
#[derive(Debug)]
pub struct LinkEngine<L = DefaultLemmatizer> {
    cfg: LinkConfig,
    lemmatizer: L,
}

impl LinkEngine<DefaultLemmatizer> {
    /// Construct an engine with the built-in lemmatizer.
    pub fn new(cfg: LinkConfig) -> Result<Self, LinkError> {
        Self::with_lemmatizer(cfg, DefaultLemmatizer)
    }
}

impl<L: Lemmatizer> LinkEngine<L> {
    /// Construct an engine with an injected linguistic capability.
    pub fn with_lemmatizer(cfg: LinkConfig, lemmatizer: L) -> Result<Self, LinkError> {
        cfg.validate()
            .map_err(|e| LinkError::InvalidConfig(e.to_string()))?;
        for warning in cfg.overlap_warnings() {
            warn!(%warning, "configuration overlap");
        }
        Ok(Self { cfg, lemmatizer })
    }

    pub fn config(&self) -> &LinkConfig {
        &self.cfg
    }

    /// Rewrite a document, inserting links for matched terms.
    pub fn rewrite(&self, req: &RewriteRequest) -> Result<Rewritten, LinkError> {
        self.run(req, true)
    }

    /// Analysis-only variant: the same pipeline and budget accounting,
    /// but no mutation. Returns the placements `rewrite` would insert.
    pub fn analyze(&self, req: &RewriteRequest) -> Result<Vec<LinkPlacement>, LinkError> {
        Ok(self.run(req, false)?.inserted)
    }

    fn run(&self, req: &RewriteRequest, mutate: bool) -> Result<Rewritten, LinkError> {
        let candidates = build_candidates(&req.catalog, &self.cfg, &self.lemmatizer)?;

        let fragment = !looks_like_document(&req.html);
        let mut doc = if fragment {
            Html::parse_fragment(&req.html)
        } else {
            Html::parse_document(&req.html)
        };
        let existing_links = count_anchors(&doc);

        if candidates.is_empty() {
            warn!("catalog produced no usable terms; document returned unmodified");
            return Ok(Rewritten {
                html: req.html.clone(),
                inserted: Vec::new(),
                existing_links,
                warning: Some(RewriteWarning::NoUsableTerms),
            });
        }

        let max_links = req.max_links.unwrap_or(self.cfg.max_links);
        let mut budget = LinkBudget::new(max_links, existing_links, req.current_page_url.as_deref());
        if budget.remaining() == 0 {
            info!(
                existing_links,
                max_links, "link budget already exhausted; document returned unmodified"
            );
            return Ok(Rewritten {
                html: req.html.clone(),
                inserted: Vec::new(),
                existing_links,
                warning: Some(RewriteWarning::BudgetExhausted),
            });
        }

        let mut inserted: Vec<LinkPlacement> = Vec::new();
        for node_id in eligible_text_nodes(&doc, &self.cfg) {
            if budget.remaining() == 0 {
                break;
            }
            let Some(text) = segment_text(&doc, node_id) else {
                continue;
            };
            if text.trim().is_empty() {
                continue;
            }

            let tokens = self.lemmatizer.tokenize_and_lemmatize(&text)?;
            let found = find_phrase_matches(&text, &tokens, &candidates, |c| {
                budget.is_open(&c.surface, &c.url)
            });
            if found.is_empty() {
                continue;
            }

            // Reserve in position order so earlier-appearing terms win
            // ties for a shared URL.
            let mut accepted: Vec<MatchCandidate> = Vec::new();
            for m in select_non_overlapping(found) {
                let candidate = &candidates[m.candidate];
                if budget.try_reserve(&candidate.surface, &candidate.url) {
                    inserted.push(LinkPlacement {
                        term: candidate.surface.clone(),
                        url: candidate.url.clone(),
                        category: candidate.category.clone(),
                        position: m.start,
                    });
                    accepted.push(m);
                }
            }
            debug!(
                segment_bytes = text.len(),
                accepted = accepted.len(),
                "processed text segment"
            );
            if mutate && !accepted.is_empty() {
                splice(&mut doc, node_id, &text, &accepted, &candidates);
            }
        }

        let html = if !mutate || inserted.is_empty() {
            // Nothing changed: hand back the input byte-identical rather
            // than a parse round-trip of it.
            req.html.clone()
        } else if fragment {
            doc.root_element().inner_html()
        } else {
            doc.html()
        };

        info!(
            existing_links,
            inserted = inserted.len(),
            "document processing complete"
        );
        Ok(Rewritten {
            html,
            inserted,
            existing_links,
            warning: None,
        })
    }
}

/// Fragment inputs are parsed and serialized differently from full
/// documents; the `<html` marker is what distinguishes them.
fn looks_like_document(html: &str) -> bool {
    html.to_ascii_lowercase().contains("<html")
}

fn count_anchors(doc: &Html) -> usize {
    doc.tree
        .root()
        .descendants()
        .filter(|node| {
            node.value()
                .as_element()
                .is_some_and(|el| el.name() == "a")
        })
        .count()
}

/// Text nodes eligible for link insertion, in document (depth-first,
/// pre-order) order. A node is excluded when any markup ancestor, at any
/// depth, is in the configured excluded-element set.
fn eligible_text_nodes(doc: &Html, cfg: &LinkConfig) -> Vec<NodeId> {
    doc.tree
        .root()
        .descendants()
        .filter(|node| {
            node.value().is_text()
                && !node.ancestors().any(|anc| {
                    anc.value()
                        .as_element()
                        .is_some_and(|el| cfg.excluded_elements.contains(el.name()))
                })
        })
        .map(|node| node.id())
        .collect()
}

fn segment_text(doc: &Html, node_id: NodeId) -> Option<String> {
    doc.tree
        .get(node_id)
        .and_then(|node| node.value().as_text())
        .map(|text| text.text.to_string())
}

/// Replace one text node with the alternating plain-text/anchor sequence
/// for its accepted matches. `accepted` must be sorted by start offset
/// and pairwise disjoint.
fn splice(
    doc: &mut Html,
    node_id: NodeId,
    text: &str,
    accepted: &[MatchCandidate],
    candidates: &[TermCandidate],
) {
    let Some(mut node) = doc.tree.get_mut(node_id) else {
        return;
    };
    let mut cursor = 0usize;
    for m in accepted {
        if m.start > cursor {
            node.insert_before(text_node(&text[cursor..m.start]));
        }
        let mut anchor = node.insert_before(Node::Element(anchor_element(
            &candidates[m.candidate].url,
        )));
        anchor.append(text_node(&text[m.start..m.end]));
        cursor = m.end;
    }
    if cursor < text.len() {
        node.insert_before(text_node(&text[cursor..]));
    }
    node.detach();
}

fn text_node(content: &str) -> Node {
    Node::Text(Text {
        text: StrTendril::from(content),
    })
}

fn anchor_element(href: &str) -> Element {
    let name = QualName::new(
        None,
        Namespace::from("http://www.w3.org/1999/xhtml"),
        LocalName::from("a"),
    );
    let href_attr = Attribute {
        name: QualName::new(None, Namespace::from(""), LocalName::from("href")),
        value: StrTendril::from(href),
    };
    Element::new(name, vec![href_attr])
}
