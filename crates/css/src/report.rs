//! Result of an analysis.

use crate::PassStats;
use core::fmt;
use css_orchestrator::StyleSheetSet;
use css_shorthand::MergeWarning;

/// Counts describing what the analysis found and removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub states: usize,
    /// Distinct elements matched by at least one selector.
    pub matched_elements: usize,
    pub rules_before: usize,
    pub rules_after: usize,
    pub selectors_before: usize,
    pub selectors_after: usize,
    /// Declarations still present and effective after every pass.
    pub effective_declarations: usize,
    /// Approximate size in bytes of the stylesheets before the passes.
    pub size_before: usize,
    pub size_after: usize,
    /// Totals over every pass that ran.
    pub passes: PassStats,
}

impl AnalysisSummary {
    /// Bytes removed by the passes.
    #[inline]
    pub const fn size_saved(&self) -> usize {
        self.size_before.saturating_sub(self.size_after)
    }
}

impl fmt::Display for AnalysisSummary {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{} states, {} elements; rules {} -> {}, selectors {} -> {}, {} effective declarations, {} -> {} bytes",
            self.states,
            self.matched_elements,
            self.rules_before,
            self.rules_after,
            self.selectors_before,
            self.selectors_after,
            self.effective_declarations,
            self.size_before,
            self.size_after
        )
    }
}

/// The surviving stylesheets, the warnings raised on the way, and a summary.
#[derive(Clone, Debug)]
pub struct AnalysisReport {
    pub sheets: StyleSheetSet,
    pub warnings: Vec<MergeWarning>,
    pub summary: AnalysisSummary,
}

impl AnalysisReport {
    /// Render what survived of the file `name` as CSS text.
    ///
    /// Selectors of a rule that kept the same declarations share one block.
    /// Rules scoped by media queries are wrapped in nested `@media` blocks.
    pub fn render_file(&self, name: &str) -> Option<String> {
        let file = self.sheets.file(self.sheets.file_id(name)?)?;
        let mut out = String::new();
        for rule in &file.rules {
            let mut blocks: Vec<(Vec<&str>, String)> = Vec::new();
            let mut media = None;
            for &id in &rule.selectors {
                let Some(selector) = self.sheets.selector(id) else {
                    continue;
                };
                if media.is_none() {
                    media = Some(&selector.descriptor.media);
                }
                let body: String = self
                    .sheets
                    .declarations_of(id)
                    .map(|decl| format!("  {decl}\n"))
                    .collect();
                match blocks.iter_mut().find(|(_, existing)| *existing == body) {
                    Some((selectors, _)) => selectors.push(selector.descriptor.raw_text.as_str()),
                    None => blocks.push((vec![selector.descriptor.raw_text.as_str()], body)),
                }
            }

            let queries: Vec<&str> = media.map(|scope| scope.iter().collect()).unwrap_or_default();
            for query in &queries {
                out.push_str(&format!("@media {query} {{\n"));
            }
            for (selectors, body) in blocks {
                out.push_str(&format!("{} {{\n{body}}}\n", selectors.join(", ")));
            }
            for _ in &queries {
                out.push_str("}\n");
            }
        }
        Some(out)
    }
}
