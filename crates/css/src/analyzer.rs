//! The analysis driver: ingest stylesheets and crawled states, then run the passes.

use crate::ingest::{IngestTarget, QueryRuntime, ingest_state};
use crate::passes::{
    CascadePass, DeadRuleFilterPass, PassContext, PassStats, ShorthandPass, StylesheetPass,
};
use crate::{AnalysisReport, AnalysisSummary, AnalyzerConfig, CrawledState, IngestStats};
use anyhow::Result;
use css_cascade::MatchRegistry;
use css_orchestrator::{FileId, SelectorQuery, StyleSheetSet};
use css_syntax::{Stylesheet, parse_stylesheet};

/// Collects stylesheets and the elements their selectors match across
/// crawled states, and reduces the stylesheets to what takes effect.
pub struct CssAnalyzer<Q: SelectorQuery> {
    config: AnalyzerConfig,
    query: Q,
    runtime: QueryRuntime,
    sheets: StyleSheetSet,
    registry: MatchRegistry,
    states: usize,
}

impl<Q: SelectorQuery> CssAnalyzer<Q> {
    /// Create an analyzer that evaluates selectors with `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the selector query thread pool cannot be created.
    pub fn new(config: AnalyzerConfig, query: Q) -> Result<Self> {
        let runtime = QueryRuntime::new(&config)?;
        Ok(Self {
            config,
            query,
            runtime,
            sheets: StyleSheetSet::new(),
            registry: MatchRegistry::new(),
            states: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Parse `text` and add it as the file `name`.
    pub fn add_stylesheet(&mut self, name: &str, load_order: u32, text: &str) -> FileId {
        let sheet = parse_stylesheet(text);
        self.add_parsed(name, load_order, &sheet)
    }

    /// Add an already parsed stylesheet as the file `name`.
    pub fn add_parsed(&mut self, name: &str, load_order: u32, sheet: &Stylesheet) -> FileId {
        if self.sheets.file_id(name).is_some() {
            log::warn!("Stylesheet {name:?} added twice; states will query the first one");
        }
        self.sheets.add_stylesheet(name, load_order, sheet)
    }

    /// Query the selectors of every file `state` loaded and record the elements they match.
    pub fn ingest_state(&mut self, state: &CrawledState<Q::Document>) -> IngestStats {
        self.states = self.states.saturating_add(1);
        ingest_state(
            &self.runtime,
            &self.query,
            &self.config,
            state,
            IngestTarget {
                sheets: &mut self.sheets,
                registry: &mut self.registry,
            },
        )
    }

    #[inline]
    pub fn sheets(&self) -> &StyleSheetSet {
        &self.sheets
    }

    #[inline]
    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    /// Run the passes over everything ingested and return what survived.
    pub fn finish(self) -> AnalysisReport {
        let Self {
            config,
            mut sheets,
            registry,
            states,
            ..
        } = self;
        let rules_before = sheets.rule_count();
        let selectors_before = sheets.selector_count();
        let size_before = sheets.size_bytes();

        let mut warnings = Vec::new();
        let mut totals = PassStats::new();
        let mut context = PassContext {
            sheets: &mut sheets,
            registry: &registry,
            warnings: &mut warnings,
        };
        for pass in pipeline(&config) {
            log::debug!("Running {} pass", pass.name());
            totals = totals.add(&pass.run(&mut context));
        }

        let summary = AnalysisSummary {
            states,
            matched_elements: registry.len(),
            rules_before,
            rules_after: sheets.rule_count(),
            selectors_before,
            selectors_after: sheets.selector_count(),
            effective_declarations: sheets.effective_declaration_count(),
            size_before,
            size_after: sheets.size_bytes(),
            passes: totals,
        };
        log::info!("Analysis finished: {summary}");
        AnalysisReport {
            sheets,
            warnings,
            summary,
        }
    }
}

/// Passes in the order they run.
fn pipeline(config: &AnalyzerConfig) -> Vec<Box<dyn StylesheetPass>> {
    let mut passes: Vec<Box<dyn StylesheetPass>> =
        vec![Box::new(CascadePass), Box::new(DeadRuleFilterPass)];
    if config.merge_shorthands {
        passes.push(Box::new(ShorthandPass));
    }
    passes
}
