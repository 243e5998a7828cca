//! Pseudo-class classification and extraction.
//! Spec: <https://www.w3.org/TR/selectors-3/#pseudo-classes>

use crate::tree::SelectorVisitor;
use crate::{CompoundSelector, PseudoClass, SimpleSelector};

/// Whether a pseudo-class depends on element state or only on document structure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PseudoClassKind {
    /// Depends on user interaction or element state (`:hover`, `:checked`, ...).
    /// A static DOM snapshot cannot evaluate these.
    NonStructural,
    /// Depends only on the document tree (`:first-child`, `:nth-of-type()`, ...).
    Structural,
}

/// State-dependent pseudo-classes. Matching is by name; functional ones carry an argument.
const NON_STRUCTURAL: &[&str] = &[
    "link",
    "visited",
    "hover",
    "active",
    "focus",
    "focus-within",
    "focus-visible",
    "target",
    "checked",
    "enabled",
    "disabled",
    "indeterminate",
    "default",
    "valid",
    "invalid",
    "required",
    "optional",
    "in-range",
    "out-of-range",
    "read-only",
    "read-write",
    "placeholder-shown",
    "lang",
    "dir",
];

/// Pseudo-elements that may be written with a single colon.
/// Spec: Section 7 — Pseudo-elements
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["before", "after", "first-line", "first-letter"];

/// Classify a pseudo-class by its lowercased name.
///
/// Unknown pseudo-classes are treated as structural so they stay in the
/// selector text handed to the query engine.
pub fn classify_pseudo_class(name: &str) -> PseudoClassKind {
    if NON_STRUCTURAL.contains(&name) {
        PseudoClassKind::NonStructural
    } else {
        PseudoClassKind::Structural
    }
}

/// True for pseudo-elements that keep their legacy single-colon syntax.
pub fn is_pseudo_element(name: &str) -> bool {
    LEGACY_PSEUDO_ELEMENTS.contains(&name)
}

/// A pseudo-class found while walking a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PseudoClassEntry {
    /// The compound the pseudo-class is attached to, without its pseudo parts (e.g. `a.nav`).
    pub owner: String,
    /// Distance from the key compound; 0 is the key compound itself.
    pub depth: usize,
    /// The pseudo-class itself.
    pub pseudo: PseudoClass,
}

/// Pseudo-class metadata collected from one selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PseudoSummary {
    /// Token of the last non-structural pseudo-class on the key compound, e.g. `:hover`.
    pub key_pseudo_class: Option<String>,
    /// Non-structural pseudo-classes, key compound first.
    pub non_structural: Vec<PseudoClassEntry>,
    /// Structural pseudo-classes, key compound first.
    pub structural: Vec<PseudoClassEntry>,
    /// Name of the pseudo-element, if any.
    pub pseudo_element: Option<String>,
}

impl SelectorVisitor for PseudoSummary {
    fn visit_compound(&mut self, compound: &CompoundSelector, depth: usize) {
        for simple in &compound.simples {
            let SimpleSelector::PseudoClass(pseudo) = simple else {
                continue;
            };
            let entry = PseudoClassEntry {
                owner: compound.base_text(),
                depth,
                pseudo: pseudo.clone(),
            };
            match classify_pseudo_class(&pseudo.name) {
                PseudoClassKind::NonStructural => {
                    if depth == 0 {
                        self.key_pseudo_class = Some(pseudo.token());
                    }
                    self.non_structural.push(entry);
                }
                PseudoClassKind::Structural => self.structural.push(entry),
            }
        }
    }

    fn visit_pseudo_element(&mut self, name: &str, _depth: usize) {
        self.pseudo_element = Some(name.to_owned());
    }
}
