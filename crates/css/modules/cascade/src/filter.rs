//! Removal of rules, selectors and declarations that never took effect.

use css_orchestrator::{SelectorId, StyleSheetSet};

/// Counters reported by [`filter_dead_rules`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FilterStats {
    pub rules_before: usize,
    pub rules_after: usize,
    pub selectors_dropped: usize,
    pub declarations_dropped: usize,
}

/// Drop everything the cascade left without effect.
///
/// Unmatched selectors are dropped. Matched selectors keep only their effective
/// declarations and are dropped when none remain. Ignored selectors stay in a
/// rule that survives through another selector. A rule without surviving
/// selectors is dropped. Running the filter again changes nothing.
pub fn filter_dead_rules(sheets: &mut StyleSheetSet) -> FilterStats {
    let mut stats = FilterStats {
        rules_before: sheets.rule_count(),
        ..FilterStats::default()
    };
    let StyleSheetSet {
        files,
        selectors,
        declarations,
    } = sheets;

    for file in files.iter_mut() {
        let before = file.rules.len();
        file.rules.retain_mut(|rule| {
            let mut effective = false;
            let mut kept: Vec<SelectorId> = Vec::with_capacity(rule.selectors.len());
            for &id in &rule.selectors {
                let Some(selector) = selectors.get_mut(id.0) else {
                    continue;
                };
                if selector.is_ignored() {
                    kept.push(id);
                    continue;
                }
                let has_effective = selector.matched
                    && selector
                        .declarations
                        .iter()
                        .any(|decl| declarations.get(*decl).is_some_and(|found| found.effective));
                if !has_effective {
                    log::trace!("Dropping selector {:?}", selector.descriptor.raw_text);
                    stats.selectors_dropped = stats.selectors_dropped.saturating_add(1);
                    continue;
                }
                let count = selector.declarations.len();
                selector
                    .declarations
                    .retain(|decl| declarations.get(*decl).is_some_and(|found| found.effective));
                stats.declarations_dropped = stats
                    .declarations_dropped
                    .saturating_add(count.saturating_sub(selector.declarations.len()));
                effective = true;
                kept.push(id);
            }
            if effective {
                rule.selectors = kept;
            } else {
                stats.selectors_dropped = stats
                    .selectors_dropped
                    .saturating_add(kept.len());
            }
            effective
        });
        log::debug!(
            "{}: kept {} of {before} rules",
            file.name,
            file.rules.len()
        );
    }

    stats.rules_after = sheets.rule_count();
    log::info!(
        "Dead-rule filter kept {} of {} rules, dropped {} selectors and {} declarations",
        stats.rules_after,
        stats.rules_before,
        stats.selectors_dropped,
        stats.declarations_dropped
    );
    stats
}
