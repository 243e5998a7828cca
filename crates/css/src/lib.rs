//! Stylesheet audit across crawled page states.
//!
//! Stylesheets are added to a [`CssAnalyzer`], then every crawled state is
//! ingested: the selectors of the files the state loaded are evaluated against
//! its document and the matched elements recorded. [`CssAnalyzer::finish`]
//! resolves the cascade for every matched element, removes rules and
//! declarations that never took effect, and merges longhands into shorthands.

mod analyzer;
mod config;
mod ingest;
pub mod passes;
mod report;
mod state;

pub use analyzer::CssAnalyzer;
pub use config::AnalyzerConfig;
pub use ingest::IngestStats;
pub use passes::{
    CascadePass, DeadRuleFilterPass, PassContext, PassStats, ShorthandPass, StylesheetPass,
};
pub use report::{AnalysisReport, AnalysisSummary};
pub use state::{CrawledState, LoadedFile};

pub use css_orchestrator::{
    Declaration, DomSnapshot, ElementRef, MatchedElement, NodeKey, QueryError, QueryMatch,
    SelectorQuery, SnapshotQuery, StateId, StyleSheetSet,
};
pub use css_shorthand::MergeWarning;
