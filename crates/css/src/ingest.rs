//! Querying the selectors of a state's stylesheets and recording what matched.
//!
//! Queries of one state are independent and may run on a rayon pool. Their
//! results are collected in selector order and recorded sequentially, so the
//! registry sees the same insertion order whether or not queries ran in
//! parallel.

use crate::{AnalyzerConfig, CrawledState};
use anyhow::{Context as _, Result};
use css_cascade::MatchRegistry;
use css_orchestrator::{
    ElementRef, QueryError, QueryMatch, SelectorId, SelectorQuery, StyleSheetSet,
};
use rayon::prelude::*;

/// Tag the compatibility check sees when a selector matches the document itself.
const DOCUMENT_TAG: &str = "#document";

/// Counters reported by [`crate::CssAnalyzer::ingest_state`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Loaded files found among the analysed stylesheets.
    pub files: usize,
    pub selectors_queried: usize,
    /// Queries that failed and were treated as matching nothing.
    pub query_failures: usize,
    /// New (element, selector) entries in the match registry.
    pub matches_recorded: usize,
    /// Matches on the document rather than an element.
    pub document_matches: usize,
    /// Matches dropped because the element cannot enter the key pseudo-class state.
    pub incompatible: usize,
}

/// One selector to query.
#[derive(Clone, Debug)]
struct QueryJob {
    selector: SelectorId,
    load_order: u32,
    /// Filtered selector text handed to the query engine.
    text: String,
}

type QueryResult = Result<Vec<QueryMatch>, QueryError>;

/// Runs selector queries, on a dedicated thread pool when parallel querying is enabled.
pub(crate) struct QueryRuntime {
    pool: Option<rayon::ThreadPool>,
}

impl QueryRuntime {
    /// Create the runtime for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread pool cannot be created.
    pub(crate) fn new(config: &AnalyzerConfig) -> Result<Self> {
        if !config.parallel {
            return Ok(Self { pool: None });
        }
        let mut builder =
            rayon::ThreadPoolBuilder::new().thread_name(|index| format!("css-audit-query-{index}"));
        if let Some(num) = config.threads {
            builder = builder.num_threads(num);
        }
        let pool = builder
            .build()
            .context("Failed to build the selector query thread pool")?;
        log::debug!(
            "Selector queries run on {} threads",
            pool.current_num_threads()
        );
        Ok(Self { pool: Some(pool) })
    }

    /// Query every job against `document`; results are in job order.
    fn run<Q: SelectorQuery>(
        &self,
        query: &Q,
        document: &Q::Document,
        jobs: &[QueryJob],
    ) -> Vec<QueryResult> {
        let execute = |job: &QueryJob| query.query_all(document, &job.text);
        match &self.pool {
            Some(pool) => pool.install(|| jobs.par_iter().map(execute).collect()),
            None => jobs.iter().map(execute).collect(),
        }
    }
}

/// Everything one state's ingestion writes to.
pub(crate) struct IngestTarget<'target> {
    pub sheets: &'target mut StyleSheetSet,
    pub registry: &'target mut MatchRegistry,
}

/// Query the selectors of every file `state` loaded and record the matches.
pub(crate) fn ingest_state<Q: SelectorQuery>(
    runtime: &QueryRuntime,
    query: &Q,
    config: &AnalyzerConfig,
    state: &CrawledState<Q::Document>,
    target: IngestTarget<'_>,
) -> IngestStats {
    let IngestTarget { sheets, registry } = target;
    let mut stats = IngestStats::default();
    let jobs = collect_jobs(state, sheets, &mut stats);
    stats.selectors_queried = jobs.len();

    let results = runtime.run(query, &state.document, &jobs);
    for (job, result) in jobs.iter().zip(results) {
        match result {
            Ok(found) => {
                for entry in found {
                    record_match(config, state, job, entry, sheets, registry, &mut stats);
                }
            }
            Err(err) => {
                log::warn!("State {}: {err}; treating it as unmatched", state.id.0);
                stats.query_failures = stats.query_failures.saturating_add(1);
            }
        }
    }

    log::info!(
        "State {}: queried {} selectors from {} files, recorded {} matches ({} failed queries, {} incompatible)",
        state.id.0,
        stats.selectors_queried,
        stats.files,
        stats.matches_recorded,
        stats.query_failures,
        stats.incompatible
    );
    stats
}

/// Non-ignored selectors of the files `state` loaded, in file then source order.
fn collect_jobs<D>(
    state: &CrawledState<D>,
    sheets: &StyleSheetSet,
    stats: &mut IngestStats,
) -> Vec<QueryJob> {
    let mut jobs = Vec::new();
    for loaded in &state.loaded {
        let Some(file_id) = sheets.file_id(&loaded.name) else {
            log::warn!(
                "State {} loaded unknown stylesheet {:?}",
                state.id.0,
                loaded.name
            );
            continue;
        };
        let Some(file) = sheets.file(file_id) else {
            continue;
        };
        let load_order = loaded.load_order.unwrap_or(file.load_order);
        stats.files = stats.files.saturating_add(1);
        for id in sheets.selector_ids_of_file(file_id) {
            let Some(selector) = sheets.selector(id) else {
                continue;
            };
            if selector.is_ignored() {
                continue;
            }
            jobs.push(QueryJob {
                selector: id,
                load_order,
                text: selector.descriptor.filtered_text.clone(),
            });
        }
    }
    jobs
}

fn record_match<D>(
    config: &AnalyzerConfig,
    state: &CrawledState<D>,
    job: &QueryJob,
    found: QueryMatch,
    sheets: &mut StyleSheetSet,
    registry: &mut MatchRegistry,
    stats: &mut IngestStats,
) {
    let Some(selector) = sheets.selector(job.selector) else {
        return;
    };
    match found {
        QueryMatch::Document => {
            if config.pseudo_compat
                && !selector
                    .descriptor
                    .check_pseudo_compatibility(DOCUMENT_TAG, |_| None)
            {
                stats.incompatible = stats.incompatible.saturating_add(1);
                return;
            }
            log::warn!(
                "State {}: {:?} matches the whole document",
                state.id.0,
                selector.descriptor.raw_text
            );
            if let Some(matched) = sheets.selector_mut(job.selector) {
                matched.matched = true;
            }
            stats.document_matches = stats.document_matches.saturating_add(1);
        }
        QueryMatch::Element(element) => {
            if config.pseudo_compat
                && !selector
                    .descriptor
                    .check_pseudo_compatibility(&element.tag, |name| element.attribute(name))
            {
                log::trace!(
                    "<{}> cannot be {:?}",
                    element.tag,
                    selector.descriptor.key_pseudo_class
                );
                stats.incompatible = stats.incompatible.saturating_add(1);
                return;
            }
            let element_ref = ElementRef::new(state.id, element.node);
            if registry.record(sheets, element_ref, job.selector, job.load_order) {
                stats.matches_recorded = stats.matches_recorded.saturating_add(1);
            }
        }
    }
}
