//! Override resolution.
//!
//! For every matched element the candidates are walked from highest to lowest
//! precedence. Each declaration of a candidate that has not lost on this element
//! becomes effective and overrides the same property in every weaker candidate
//! that applies under the same conditions, unless the weaker one is
//! `!important`. Declarations that failed to parse take no part.

use crate::MatchRegistry;
use css_orchestrator::{DeclarationId, ElementRef, SelectorId, StyleSheetSet};
use css_selectors::SelectorDescriptor;
use std::collections::HashSet;

/// Counters reported by [`resolve_cascade`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Elements resolved.
    pub elements: usize,
    /// Declaration comparisons between a winner and a weaker candidate.
    pub comparisons: usize,
    /// Declarations overridden on some element.
    pub overridden: usize,
    /// Declarations that lost to a weaker `!important` declaration.
    pub important_inversions: usize,
}

/// How a declaration of the winner relates to a weaker candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Comparison {
    /// The candidates never apply together; move on to the next one.
    Skip,
    /// The winner targets a pseudo-element and overrides nothing.
    Stop,
    /// Same property name overrides.
    ByName,
    /// Only the same property name with the same value overrides.
    ByNameAndValue,
}

/// Decide how `winner` is compared against the weaker `other`.
fn comparison(winner: &SelectorDescriptor, other: &SelectorDescriptor) -> Comparison {
    if winner.is_media_overwrite(other) || !winner.has_equal_media(other) {
        return Comparison::Skip;
    }
    if winner.has_pseudo_element() {
        return Comparison::Stop;
    }
    if other.has_pseudo_element() {
        return Comparison::Skip;
    }
    // Different key states can hold at the same time, so only identical
    // declarations make the weaker one redundant.
    if (winner.is_non_structural_pseudo() || other.is_non_structural_pseudo())
        && !winner.compare_key_pseudo_class(other)
    {
        return Comparison::ByNameAndValue;
    }
    Comparison::ByName
}

/// Resolve every element recorded in `registry`, updating declaration
/// effectiveness in `sheets`.
pub fn resolve_cascade(registry: &MatchRegistry, sheets: &mut StyleSheetSet) -> ResolveStats {
    let mut stats = ResolveStats::default();
    for &element in registry.elements() {
        let candidates = registry.sorted_candidates(element, sheets);
        log::trace!("Resolving {element}: {} candidates", candidates.len());
        resolve_element(element, &candidates, sheets, &mut stats);
        stats.elements = stats.elements.saturating_add(1);
    }
    log::info!(
        "Cascade resolved {} elements: {} comparisons, {} overrides, {} !important inversions",
        stats.elements,
        stats.comparisons,
        stats.overridden,
        stats.important_inversions
    );
    stats
}

/// Resolve the candidates of one element, highest precedence first.
fn resolve_element(
    element: ElementRef,
    candidates: &[SelectorId],
    sheets: &mut StyleSheetSet,
    stats: &mut ResolveStats,
) {
    // Declarations that lost on this element only.
    let mut overridden: HashSet<DeclarationId> = HashSet::new();

    for (index, &winner_id) in candidates.iter().enumerate() {
        let Some(winner) = sheets.selector(winner_id) else {
            continue;
        };
        let winner_declarations = winner.declarations.clone();
        let weaker = candidates.get(index.saturating_add(1)..).unwrap_or_default();

        for decl_id in winner_declarations {
            let Some(decl) = sheets.declarations.get_mut(decl_id) else {
                continue;
            };
            if decl.parse_error.is_some() || decl.is_overridden() || overridden.contains(&decl_id)
            {
                continue;
            }
            // Effective through an earlier element: a weaker !important can no longer take over.
            let already_effective = decl.effective;
            decl.effective = true;

            for &other_id in weaker {
                let (Some(winner), Some(other)) =
                    (sheets.selector(winner_id), sheets.selector(other_id))
                else {
                    continue;
                };
                let by_value = match comparison(&winner.descriptor, &other.descriptor) {
                    Comparison::Skip => continue,
                    Comparison::Stop => break,
                    Comparison::ByName => false,
                    Comparison::ByNameAndValue => true,
                };
                let other_declarations = other.declarations.clone();
                compare_declarations(
                    sheets,
                    decl_id,
                    &other_declarations,
                    by_value,
                    already_effective,
                    &mut overridden,
                    stats,
                );
            }
        }
    }

    if !overridden.is_empty() {
        log::trace!("{element}: {} declarations overridden", overridden.len());
    }
    stats.overridden = stats.overridden.saturating_add(overridden.len());
}

/// Compare one winning declaration against every declaration of a weaker candidate.
fn compare_declarations(
    sheets: &mut StyleSheetSet,
    decl_id: DeclarationId,
    other_declarations: &[DeclarationId],
    by_value: bool,
    already_effective: bool,
    overridden: &mut HashSet<DeclarationId>,
    stats: &mut ResolveStats,
) {
    for &next_id in other_declarations {
        let (Some(decl), Some(next)) = (
            sheets.declarations.get(decl_id),
            sheets.declarations.get(next_id),
        ) else {
            continue;
        };
        // Invalid declarations are dropped by the browser and override nothing.
        if next.parse_error.is_some() {
            continue;
        }
        let same_property = if by_value {
            decl.same_name_and_value(next)
        } else {
            decl.name == next.name
        };
        if !same_property {
            continue;
        }
        stats.comparisons = stats.comparisons.saturating_add(1);

        if !already_effective && next.important && !decl.important {
            log::trace!(
                "{:?} loses to weaker !important {:?}",
                decl.to_string(),
                next.to_string()
            );
            if let Some(loser) = sheets.declarations.get_mut(decl_id) {
                loser.mark_overridden();
            }
            stats.important_inversions = stats.important_inversions.saturating_add(1);
        } else {
            overridden.insert(next_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css_media_queries::MediaScope;

    fn describe(raw: &str) -> SelectorDescriptor {
        SelectorDescriptor::new(raw, MediaScope::unscoped())
    }

    #[test]
    fn comparison_modes() {
        let plain = describe("p");
        assert_eq!(comparison(&describe("#a"), &plain), Comparison::ByName);
        assert_eq!(comparison(&describe("p::after"), &plain), Comparison::Stop);
        assert_eq!(comparison(&plain, &describe("p::after")), Comparison::Skip);
        assert_eq!(
            comparison(&describe("p:hover"), &plain),
            Comparison::ByNameAndValue
        );
        assert_eq!(
            comparison(&describe("p:hover"), &describe(".x p:hover")),
            Comparison::ByName
        );
        let print = SelectorDescriptor::new("p", MediaScope::from_preludes(["print"]));
        assert_eq!(comparison(&print, &plain), Comparison::Skip);
        assert_eq!(comparison(&plain, &print), Comparison::Skip);
    }
}
