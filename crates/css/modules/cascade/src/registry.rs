//! Cross-state index of which selectors matched which element.

use crate::priority::{CandidatePriority, compare_priority};
use css_orchestrator::{ElementRef, SelectorId, StyleSheetSet};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

/// For every matched element, the selectors that matched it grouped by the
/// load order of their file. Insertion order within a group is kept.
#[derive(Clone, Debug, Default)]
pub struct MatchRegistry {
    /// Load order → selectors, per element.
    buckets: HashMap<ElementRef, BTreeMap<u32, Vec<SelectorId>>>,
    /// Elements in the order they were first recorded.
    elements: Vec<ElementRef>,
}

impl MatchRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that selector `id`, loaded at `load_order`, matched `element`.
    ///
    /// Marks the selector matched and remembers the element on it. Ignored
    /// selectors are never recorded. Returns whether a new registry entry was
    /// added.
    pub fn record(
        &mut self,
        sheets: &mut StyleSheetSet,
        element: ElementRef,
        id: SelectorId,
        load_order: u32,
    ) -> bool {
        let Some(selector) = sheets.selector_mut(id) else {
            log::warn!("Cannot record unknown selector {id:?}");
            return false;
        };
        if selector.is_ignored() {
            log::trace!(
                "Not recording ignored selector {:?}",
                selector.descriptor.raw_text
            );
            return false;
        }
        selector.matched = true;
        if !selector.matched_elements.contains(&element) {
            selector.matched_elements.push(element);
        }

        let by_order = match self.buckets.entry(element) {
            Entry::Occupied(occupied) => occupied.into_mut(),
            Entry::Vacant(vacant) => {
                self.elements.push(element);
                vacant.insert(BTreeMap::new())
            }
        };
        let bucket = by_order.entry(load_order).or_default();
        if bucket.contains(&id) {
            return false;
        }
        bucket.push(id);
        true
    }

    /// Elements with at least one match, in first-recorded order.
    #[inline]
    pub fn elements(&self) -> &[ElementRef] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// `(load_order, selector)` pairs recorded for `element`, lowest load order first.
    pub fn candidates(&self, element: ElementRef) -> Vec<(u32, SelectorId)> {
        self.buckets
            .get(&element)
            .map(|by_order| {
                by_order
                    .iter()
                    .flat_map(|(order, ids)| ids.iter().map(|id| (*order, *id)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every selector that matched `element`, highest precedence first.
    ///
    /// Ordered by load order, then specificity, then rule position, all
    /// descending. Candidates equal on all three keep their recording order.
    pub fn sorted_candidates(&self, element: ElementRef, sheets: &StyleSheetSet) -> Vec<SelectorId> {
        let mut ranked: Vec<(CandidatePriority, SelectorId)> = self
            .candidates(element)
            .into_iter()
            .filter_map(|(order, id)| {
                sheets
                    .selector(id)
                    .map(|selector| (CandidatePriority::of(selector, order), id))
            })
            .collect();
        ranked.sort_by(|left, right| compare_priority(&right.0, &left.0));
        ranked.into_iter().map(|(_, id)| id).collect()
    }
}
