#![cfg(test)]

use core::error::Error;
use css_audit::{
    AnalysisReport, AnalyzerConfig, CrawledState, CssAnalyzer, DomSnapshot, NodeKey, QueryError,
    QueryMatch, SelectorQuery, SnapshotQuery, StateId,
};

const SITE_CSS: &str = "\
p { color: red; margin-top: 1px; margin-right: 2px; margin-bottom: 3px; margin-left: 4px }
.intro { color: blue }
.unused { color: green }
a:hover { color: purple }
";

/// `<html><body><p class=intro></p><a href=/></a></body></html>`
fn page() -> DomSnapshot {
    let mut dom = DomSnapshot::new();
    let html = dom.append_element(NodeKey::ROOT, "html", &[]);
    let body = dom.append_element(html, "body", &[]);
    dom.append_element(body, "p", &[("class", "intro")]);
    dom.append_element(body, "a", &[("href", "/")]);
    dom
}

fn analyze(config: AnalyzerConfig) -> Result<AnalysisReport, Box<dyn Error>> {
    let mut analyzer = CssAnalyzer::new(config, SnapshotQuery)?;
    analyzer.add_stylesheet("site.css", 0, SITE_CSS);
    analyzer.ingest_state(&CrawledState::new(StateId(0), page()).with_file("site.css"));
    Ok(analyzer.finish())
}

/// Overridden declarations and unmatched rules disappear, longhands are merged.
///
/// # Errors
/// Returns an error if the analysis fails or the output differs.
#[test]
fn end_to_end() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let report = analyze(AnalyzerConfig::default())?;
    let rendered = report
        .render_file("site.css")
        .ok_or("site.css missing from the report")?;
    let expected = "\
p {
  margin: 1px 2px 3px 4px;
}
.intro {
  color: blue;
}
a:hover {
  color: purple;
}
";
    if rendered != expected {
        return Err(format!("unexpected output:\n{rendered}").into());
    }

    let summary = report.summary;
    if summary.states != 1 || summary.matched_elements != 2 {
        return Err(format!("unexpected counts: {summary}").into());
    }
    if summary.rules_before != 4 || summary.rules_after != 3 {
        return Err(format!("unexpected rule counts: {summary}").into());
    }
    if summary.passes.shorthands_created != 1 || summary.size_saved() == 0 {
        return Err(format!("shorthand pass did not run: {summary}").into());
    }
    if !report.warnings.is_empty() {
        return Err("no merge warnings expected".into());
    }
    Ok(())
}

/// Without the shorthand pass the surviving longhands stay as authored.
///
/// # Errors
/// Returns an error if the analysis fails or the output differs.
#[test]
fn shorthand_pass_can_be_disabled() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let report = analyze(AnalyzerConfig::new(None, true, false, true))?;
    let rendered = report.render_file("site.css").unwrap_or_default();
    if !rendered.starts_with("p {\n  margin-top: 1px;\n  margin-right: 2px;") {
        return Err(format!("unexpected output:\n{rendered}").into());
    }
    if report.summary.passes.shorthands_created != 0 {
        return Err("no shorthand should be created".into());
    }
    Ok(())
}

/// Sequential and parallel querying produce the same result.
///
/// # Errors
/// Returns an error if the analysis fails or the outputs differ.
#[test]
fn parallel_matches_sequential() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let parallel = analyze(AnalyzerConfig::new(Some(4), true, true, true))?;
    let sequential = analyze(AnalyzerConfig::new(None, false, true, true))?;
    if parallel.render_file("site.css") != sequential.render_file("site.css")
        || parallel.summary != sequential.summary
    {
        return Err("parallel and sequential analyses differ".into());
    }
    Ok(())
}

/// A later-loaded file wins over a more specific selector, and a state can
/// override the load order of the files it loaded.
///
/// # Errors
/// Returns an error if the analysis fails or the output differs.
#[test]
fn load_order_per_state() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let setup = || -> Result<CssAnalyzer<SnapshotQuery>, Box<dyn Error>> {
        let mut analyzer = CssAnalyzer::new(AnalyzerConfig::default(), SnapshotQuery)?;
        analyzer.add_stylesheet("base.css", 0, ".intro { color: red }");
        analyzer.add_stylesheet("theme.css", 1, "p { color: blue }");
        Ok(analyzer)
    };

    let mut analyzer = setup()?;
    analyzer.ingest_state(
        &CrawledState::new(StateId(0), page())
            .with_file("base.css")
            .with_file("theme.css"),
    );
    let report = analyzer.finish();
    if report.render_file("base.css").as_deref() != Some("") {
        return Err("base.css should lose everything to the later file".into());
    }

    let mut analyzer = setup()?;
    analyzer.ingest_state(
        &CrawledState::new(StateId(0), page())
            .with_file("base.css")
            .with_file("theme.css"),
    );
    analyzer.ingest_state(
        &CrawledState::new(StateId(1), page())
            .with_file_at("base.css", 2)
            .with_file("theme.css"),
    );
    let report = analyzer.finish();
    if report.render_file("base.css").as_deref() != Some(".intro {\n  color: red;\n}\n") {
        return Err("base.css wins in the second state and must survive".into());
    }
    if report.summary.matched_elements != 2 {
        return Err(format!("expected one <p> per state: {}", report.summary).into());
    }
    Ok(())
}

/// Elements that cannot be in the key pseudo-class state are not recorded.
///
/// # Errors
/// Returns an error if the analysis fails or the counts differ.
#[test]
fn pseudo_class_compatibility() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut dom = DomSnapshot::new();
    let body = dom.append_element(NodeKey::ROOT, "body", &[]);
    dom.append_element(body, "input", &[("type", "text")]);
    dom.append_element(body, "input", &[("type", "checkbox")]);
    let state = CrawledState::new(StateId(0), dom).with_file("form.css");
    let css = "input:checked { outline: none }\n:focus { color: red }\n:hover { color: blue }";

    let mut analyzer = CssAnalyzer::new(AnalyzerConfig::default(), SnapshotQuery)?;
    analyzer.add_stylesheet("form.css", 0, css);
    let stats = analyzer.ingest_state(&state);
    // The text input cannot be checked, the document cannot be focused.
    if stats.incompatible != 2 || stats.matches_recorded != 1 || stats.document_matches != 1 {
        return Err(format!("unexpected ingest counts: {stats:?}").into());
    }
    if !analyzer.sheets().selectors.get(2).is_some_and(|sel| sel.matched) {
        return Err("`:hover` matched the document and counts as matched".into());
    }

    let mut analyzer = CssAnalyzer::new(AnalyzerConfig::new(None, true, true, false), SnapshotQuery)?;
    analyzer.add_stylesheet("form.css", 0, css);
    let stats = analyzer.ingest_state(&state);
    if stats.incompatible != 0 || stats.matches_recorded != 2 {
        return Err(format!("check disabled, both inputs expected: {stats:?}").into());
    }
    Ok(())
}

/// Query engine that fails on selectors mentioning `.broken`.
struct FlakyQuery;

impl SelectorQuery for FlakyQuery {
    type Document = DomSnapshot;

    fn query_all(
        &self,
        document: &DomSnapshot,
        selector: &str,
    ) -> Result<Vec<QueryMatch>, QueryError> {
        if selector.contains(".broken") {
            return Err(QueryError::Engine("query crashed".to_owned()));
        }
        SnapshotQuery.query_all(document, selector)
    }
}

/// A failing query counts as no match and the run continues.
///
/// # Errors
/// Returns an error if the analysis fails or the output differs.
#[test]
fn query_failures_are_unmatched() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut analyzer = CssAnalyzer::new(AnalyzerConfig::default(), FlakyQuery)?;
    analyzer.add_stylesheet("site.css", 0, ".broken p { color: red }\np { color: blue }");
    let stats = analyzer.ingest_state(&CrawledState::new(StateId(0), page()).with_file("site.css"));
    if stats.query_failures != 1 || stats.matches_recorded != 1 {
        return Err(format!("unexpected ingest counts: {stats:?}").into());
    }
    let report = analyzer.finish();
    if report.render_file("site.css").as_deref() != Some("p {\n  color: blue;\n}\n") {
        return Err("only the queryable rule survives".into());
    }
    Ok(())
}

/// Files a state never loaded are not queried for it.
#[test]
fn unknown_and_unloaded_files() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut analyzer = CssAnalyzer::new(AnalyzerConfig::default(), SnapshotQuery)?;
    analyzer.add_stylesheet("site.css", 0, "p { color: blue }");
    analyzer.add_stylesheet("print.css", 0, "p { color: black }");
    let stats = analyzer.ingest_state(
        &CrawledState::new(StateId(0), page())
            .with_file("site.css")
            .with_file("missing.css"),
    );
    assert_eq!(stats.files, 1);
    assert_eq!(stats.selectors_queried, 1);
    let report = analyzer.finish();
    assert_eq!(report.render_file("print.css").as_deref(), Some(""));
    assert_eq!(report.render_file("missing.css"), None);
    Ok(())
}

/// Ignored selectors keep their longhands and add no effective declarations.
///
/// # Errors
/// Returns an error if the analysis fails or the output differs.
#[test]
fn ignored_selectors_are_not_merged() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut analyzer = CssAnalyzer::new(AnalyzerConfig::default(), SnapshotQuery)?;
    analyzer.add_stylesheet(
        "site.css",
        0,
        "p, p:not(.x) { margin-top: 1px; margin-right: 2px; margin-bottom: 3px; margin-left: 4px }",
    );
    analyzer.ingest_state(&CrawledState::new(StateId(0), page()).with_file("site.css"));
    let report = analyzer.finish();
    let rendered = report.render_file("site.css").unwrap_or_default();
    let expected = "\
p {
  margin: 1px 2px 3px 4px;
}
p:not(.x) {
  margin-top: 1px;
  margin-right: 2px;
  margin-bottom: 3px;
  margin-left: 4px;
}
";
    if rendered != expected {
        return Err(format!("unexpected output:\n{rendered}").into());
    }
    let summary = report.summary;
    if summary.passes.shorthands_created != 1 || summary.effective_declarations != 1 {
        return Err(format!("only `p` is merged: {summary}").into());
    }
    Ok(())
}

/// Media-scoped rules are wrapped in their `@media` blocks.
///
/// # Errors
/// Returns an error if the analysis fails or the output differs.
#[test]
fn media_rules_are_wrapped() -> Result<(), Box<dyn Error>> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut analyzer = CssAnalyzer::new(AnalyzerConfig::default(), SnapshotQuery)?;
    analyzer.add_stylesheet("print.css", 0, "@media print { .intro { color: black } }");
    analyzer.ingest_state(&CrawledState::new(StateId(0), page()).with_file("print.css"));
    let report = analyzer.finish();
    let rendered = report.render_file("print.css").unwrap_or_default();
    if rendered != "@media print {\n.intro {\n  color: black;\n}\n}\n" {
        return Err(format!("unexpected output:\n{rendered}").into());
    }
    Ok(())
}
