use super::*;
use crate::error::LemmaError;

fn engine() -> LinkEngine {
    LinkEngine::new(LinkConfig::default()).expect("default engine")
}

fn glossary_entry(term: &str, aliases: &[&str], url: &str) -> CatalogEntry {
    CatalogEntry {
        url: url.into(),
        term: Some(term.into()),
        aliases: aliases.iter().map(|s| s.to_string()).collect(),
        category: None,
    }
}

fn request(html: &str, catalog: Vec<CatalogEntry>) -> RewriteRequest {
    RewriteRequest {
        html: html.into(),
        catalog,
        current_page_url: None,
        max_links: None,
    }
}

fn count_anchors_in(html: &str) -> usize {
    let doc = Html::parse_fragment(html);
    count_anchors(&doc)
}

#[test]
fn etf_first_occurrence_only() {
    let req = request(
        "<p>ETFs are popular. ETFs offer diversification.</p>",
        vec![glossary_entry("etf", &["etfs"], "https://x/etf")],
    );
    let out = engine().rewrite(&req).expect("rewrite");
    assert_eq!(out.inserted.len(), 1);
    assert_eq!(
        out.html,
        "<p><a href=\"https://x/etf\">ETFs</a> are popular. ETFs offer diversification.</p>"
    );
}

#[test]
fn longest_match_preferred_over_constituent() {
    let req = request(
        "<p>index funds are popular</p>",
        vec![
            CatalogEntry::from_url("https://x.com/glossary/index-funds-definition"),
            CatalogEntry::from_url("https://x.com/glossary/index-definition"),
        ],
    );
    let out = engine().rewrite(&req).expect("rewrite");
    assert_eq!(out.inserted.len(), 1);
    assert_eq!(out.inserted[0].term, "index funds");
    assert!(out
        .html
        .contains("<a href=\"https://x.com/glossary/index-funds-definition\">index funds</a>"));
    // "index" alone is never linked once the phrase is taken.
    assert!(!out.html.contains(">index</a>"));
}

#[test]
fn excluded_regions_never_linked() {
    let html = "<h2>The spread</h2>\
                <nav><p>spread in nav</p></nav>\
                <p>The <a href=\"https://other\">spread</a> here is taken.</p>\
                <p>A second spread mention.</p>";
    let req = request(html, vec![glossary_entry("spread", &[], "https://x/spread")]);
    let out = engine().rewrite(&req).expect("rewrite");
    assert_eq!(out.inserted.len(), 1);
    // The only new anchor wraps the occurrence in the last paragraph.
    assert!(out
        .html
        .contains("<p>A second <a href=\"https://x/spread\">spread</a> mention.</p>"));
    assert!(out.html.contains("<h2>The spread</h2>"));
    assert!(out.html.contains("<nav><p>spread in nav</p></nav>"));
}

#[test]
fn word_boundaries_respected() {
    let req = request(
        "<p>internet service networks</p>",
        vec![glossary_entry("net", &[], "https://x/net")],
    );
    let out = engine().rewrite(&req).expect("rewrite");
    assert!(out.inserted.is_empty());
    assert_eq!(out.html, "<p>internet service networks</p>");
}

#[test]
fn budget_counts_existing_links() {
    let html = "<p><a href=\"https://a\">one</a> and spread and margin</p>";
    let mut req = request(
        html,
        vec![
            glossary_entry("spread", &[], "https://x/spread"),
            glossary_entry("margin", &[], "https://x/margin"),
        ],
    );
    req.max_links = Some(2);
    let out = engine().rewrite(&req).expect("rewrite");
    assert_eq!(out.existing_links, 1);
    assert_eq!(out.inserted.len(), 1);
    assert_eq!(count_anchors_in(&out.html), 2);
}

#[test]
fn exhausted_budget_returns_input_byte_identical() {
    let html = "<p>spread <a href=\"https://a\">existing</a></p>";
    let mut req = request(html, vec![glossary_entry("spread", &[], "https://x/spread")]);
    req.max_links = Some(1);
    let out = engine().rewrite(&req).expect("rewrite");
    assert_eq!(out.html, html);
    assert!(out.inserted.is_empty());
    assert_eq!(out.warning, Some(RewriteWarning::BudgetExhausted));
}

#[test]
fn no_usable_terms_returns_input_byte_identical() {
    let html = "<p>nothing to do here</p>";
    let req = request(html, vec![CatalogEntry::from_url("")]);
    let out = engine().rewrite(&req).expect("rewrite");
    assert_eq!(out.html, html);
    assert_eq!(out.warning, Some(RewriteWarning::NoUsableTerms));
}

#[test]
fn self_link_suppressed() {
    let mut req = request(
        "<p>All about spread here.</p>",
        vec![glossary_entry("spread", &[], "https://x/spread")],
    );
    req.current_page_url = Some("https://x/spread/".into());
    let out = engine().rewrite(&req).expect("rewrite");
    assert!(out.inserted.is_empty());
    assert_eq!(out.html, "<p>All about spread here.</p>");
}

#[test]
fn one_link_per_url_across_aliases() {
    let req = request(
        "<p>An ETF is a fund.</p><p>Many ETFs exist.</p>",
        vec![glossary_entry("etf", &["etfs"], "https://x/etf")],
    );
    let out = engine().rewrite(&req).expect("rewrite");
    assert_eq!(out.inserted.len(), 1);
    // The earlier segment wins the shared URL.
    assert!(out.html.contains("<p>An <a href=\"https://x/etf\">ETF</a> is a fund.</p>"));
    assert!(out.html.contains("<p>Many ETFs exist.</p>"));
}

#[test]
fn splice_preserves_surrounding_markup() {
    let req = request(
        "<div><p>Buy the <em>spread</em> today, spread risk tomorrow.</p></div>",
        vec![glossary_entry("spread", &[], "https://x/spread")],
    );
    let out = engine().rewrite(&req).expect("rewrite");
    assert_eq!(out.inserted.len(), 1);
    // The <em> text node comes first in document order and gets the link;
    // the surrounding markup survives untouched.
    assert!(out.html.contains("<em><a href=\"https://x/spread\">spread</a></em>"));
    assert!(out.html.starts_with("<div><p>"));
    assert!(out.html.ends_with("</p></div>"));
}

#[test]
fn full_documents_keep_structure() {
    let html = "<html><head><title>T</title></head>\
                <body><h1>Spread</h1><p>About the spread.</p></body></html>";
    let req = request(html, vec![glossary_entry("spread", &[], "https://x/spread")]);
    let out = engine().rewrite(&req).expect("rewrite");
    assert!(out.html.contains("<title>T</title>"));
    assert!(out.html.contains("<h1>Spread</h1>"));
    assert!(out.html.contains("<p>About the <a href=\"https://x/spread\">spread</a>.</p>"));
}

#[test]
fn analyze_reports_without_mutating() {
    let req = request(
        "<p>ETFs and bonds.</p>",
        vec![
            glossary_entry("etf", &["etfs"], "https://x/etf"),
            glossary_entry("bond", &["bonds"], "https://x/bond"),
        ],
    );
    let placements = engine().analyze(&req).expect("analyze");
    assert_eq!(placements.len(), 2);
    assert_eq!(placements[0].url, "https://x/etf");
    assert_eq!(placements[0].position, 0);
    assert_eq!(placements[1].url, "https://x/bond");
}

#[test]
fn invalid_config_rejected_at_construction() {
    let cfg = LinkConfig {
        version: 0,
        ..Default::default()
    };
    assert!(matches!(
        LinkEngine::new(cfg),
        Err(LinkError::InvalidConfig(_))
    ));
}

struct FailingLemmatizer;

impl Lemmatizer for FailingLemmatizer {
    fn tokenize_and_lemmatize(
        &self,
        _text: &str,
    ) -> Result<Vec<crate::lemma::LemmaToken>, LemmaError> {
        Err(LemmaError::Unavailable("model not loaded".into()))
    }
}

#[test]
fn lemmatizer_failure_is_fatal() {
    let engine = LinkEngine::with_lemmatizer(LinkConfig::default(), FailingLemmatizer)
        .expect("construction");
    let req = request(
        "<p>spread</p>",
        vec![glossary_entry("spread", &[], "https://x/spread")],
    );
    assert!(matches!(
        engine.rewrite(&req),
        Err(LinkError::Lemmatizer(_))
    ));
}
