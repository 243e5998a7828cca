//! Precedence of the selectors matched by one element.

use core::cmp::Ordering;
use css_orchestrator::Selector;
use css_selectors::Specificity;

/// Priority tuple used to order the candidates of an element.
/// Spec: Section 6.1 — Cascade sorting order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CandidatePriority {
    /// Load order of the selector's file in the state the match was observed in.
    /// Spec: Section 6.1 — Order of appearance across stylesheets
    pub load_order: u32,
    /// Spec: Section 6.1 — Specificity
    pub specificity: Specificity,
    /// Index of the rule within its file.
    /// Spec: Section 6.1 — Order of appearance as final tie-breaker
    pub source_position: u32,
}

impl CandidatePriority {
    #[inline]
    pub const fn new(load_order: u32, specificity: Specificity, source_position: u32) -> Self {
        Self {
            load_order,
            specificity,
            source_position,
        }
    }

    /// Priority of `selector` when loaded at `load_order`.
    #[inline]
    pub fn of(selector: &Selector, load_order: u32) -> Self {
        Self::new(
            load_order,
            selector.descriptor.specificity,
            selector.source_position,
        )
    }
}

/// Compare two priorities; `Ordering::Greater` means `left` takes precedence over `right`.
pub fn compare_priority(left: &CandidatePriority, right: &CandidatePriority) -> Ordering {
    // Later-loaded files win.
    if left.load_order != right.load_order {
        return left.load_order.cmp(&right.load_order);
    }

    // Specificity: higher wins
    if left.specificity != right.specificity {
        return left.specificity.cmp(&right.specificity);
    }

    // Source order: later wins
    left.source_position.cmp(&right.source_position)
}
