//! Passes run over the stylesheets once every state has been ingested.
//!
//! The default pipeline is:
//! - Cascade: decide which declarations take effect on some element
//! - Dead-rule filter: drop whatever never took effect
//! - Shorthand merge: fold the surviving longhands into shorthands

use css_cascade::{MatchRegistry, filter_dead_rules, resolve_cascade};
use css_orchestrator::{Declaration, SelectorId, StyleSheetSet};
use css_shorthand::{MergeWarning, merge_shorthands};

/// Statistics collected by a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    /// Declarations that lost on at least one element.
    pub declarations_overridden: usize,
    /// Declarations that lost to a weaker `!important` declaration.
    pub important_inversions: usize,
    pub rules_removed: usize,
    pub selectors_removed: usize,
    pub declarations_removed: usize,
    /// Shorthand declarations synthesized from longhands.
    pub shorthands_created: usize,
}

impl PassStats {
    /// Create empty pass statistics.
    #[inline]
    pub const fn new() -> Self {
        Self {
            declarations_overridden: 0,
            important_inversions: 0,
            rules_removed: 0,
            selectors_removed: 0,
            declarations_removed: 0,
            shorthands_created: 0,
        }
    }

    /// Add another set of statistics to this one.
    #[inline]
    #[must_use]
    pub const fn add(&self, other: &Self) -> Self {
        Self {
            declarations_overridden: self
                .declarations_overridden
                .saturating_add(other.declarations_overridden),
            important_inversions: self
                .important_inversions
                .saturating_add(other.important_inversions),
            rules_removed: self.rules_removed.saturating_add(other.rules_removed),
            selectors_removed: self.selectors_removed.saturating_add(other.selectors_removed),
            declarations_removed: self
                .declarations_removed
                .saturating_add(other.declarations_removed),
            shorthands_created: self.shorthands_created.saturating_add(other.shorthands_created),
        }
    }
}

impl Default for PassStats {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// State a pass operates on.
pub struct PassContext<'ctx> {
    pub sheets: &'ctx mut StyleSheetSet,
    pub registry: &'ctx MatchRegistry,
    /// Recoverable problems reported by passes.
    pub warnings: &'ctx mut Vec<MergeWarning>,
}

/// A transformation of the analysed stylesheets.
pub trait StylesheetPass {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Apply this pass.
    fn run(&self, context: &mut PassContext<'_>) -> PassStats;
}

/// Decides declaration effectiveness for every matched element.
pub struct CascadePass;

impl StylesheetPass for CascadePass {
    fn name(&self) -> &'static str {
        "cascade"
    }

    fn run(&self, context: &mut PassContext<'_>) -> PassStats {
        let resolved = resolve_cascade(context.registry, context.sheets);
        PassStats {
            declarations_overridden: resolved.overridden,
            important_inversions: resolved.important_inversions,
            ..PassStats::new()
        }
    }
}

/// Removes rules, selectors and declarations without effect.
pub struct DeadRuleFilterPass;

impl StylesheetPass for DeadRuleFilterPass {
    fn name(&self) -> &'static str {
        "dead-rule filter"
    }

    fn run(&self, context: &mut PassContext<'_>) -> PassStats {
        let filtered = filter_dead_rules(context.sheets);
        PassStats {
            rules_removed: filtered.rules_before.saturating_sub(filtered.rules_after),
            selectors_removed: filtered.selectors_dropped,
            declarations_removed: filtered.declarations_dropped,
            ..PassStats::new()
        }
    }
}

/// Replaces longhand declarations of every surviving selector by shorthands.
/// Ignored selectors keep their declarations as authored.
pub struct ShorthandPass;

impl StylesheetPass for ShorthandPass {
    fn name(&self) -> &'static str {
        "shorthand merge"
    }

    fn run(&self, context: &mut PassContext<'_>) -> PassStats {
        let mut stats = PassStats::new();
        let ids: Vec<SelectorId> = context.sheets.live_selectors().map(|(id, _)| id).collect();
        for id in ids {
            let Some(selector) = context.sheets.selector(id) else {
                continue;
            };
            if selector.is_ignored() {
                continue;
            }
            let label = selector.descriptor.raw_text.clone();
            let before: Vec<Declaration> = context.sheets.declarations_of(id).cloned().collect();
            let outcome = merge_shorthands(&label, before.clone());
            context.warnings.extend(outcome.warnings);
            if outcome.declarations == before {
                continue;
            }

            let created = outcome
                .declarations
                .iter()
                .filter(|decl| !before.contains(decl))
                .count();
            stats.shorthands_created = stats.shorthands_created.saturating_add(created);
            stats.declarations_removed = stats.declarations_removed.saturating_add(
                before
                    .len()
                    .saturating_sub(outcome.declarations.len().saturating_sub(created)),
            );
            let merged_ids = outcome
                .declarations
                .into_iter()
                .map(|decl| context.sheets.declarations.alloc(decl))
                .collect();
            if let Some(target) = context.sheets.selector_mut(id) {
                target.declarations = merged_ids;
            }
        }
        log::info!(
            "Merged longhands into {} shorthands, replacing {} declarations",
            stats.shorthands_created,
            stats.declarations_removed
        );
        stats
    }
}
