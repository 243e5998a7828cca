//! CSS selector specificity calculation.
//! Spec: <https://www.w3.org/TR/selectors-3/#specificity>

use crate::{ComplexSelector, CompoundSelector, SimpleSelector, parse_complex_selector};
use core::fmt;

/// Upper bound (exclusive) of every specificity component. Components saturate
/// at `SPECIFICITY_BASE - 1` and never carry into the next one.
pub const SPECIFICITY_BASE: u16 = 100;

/// Specificity tuple (inline, ids, classes/attributes/pseudo-classes, types/pseudo-elements).
/// Spec: Section 13 — Calculating a selector's specificity
///
/// Ordering is lexicographic, most significant component first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Specificity(pub u16, pub u16, pub u16, pub u16);

impl Specificity {
    /// Clamp every component below [`SPECIFICITY_BASE`].
    #[must_use]
    pub fn bounded(self) -> Self {
        let max = SPECIFICITY_BASE.saturating_sub(1);
        Self(self.0.min(max), self.1.min(max), self.2.min(max), self.3.min(max))
    }

    /// The tuple packed into one number in base [`SPECIFICITY_BASE`].
    pub fn value(self) -> u64 {
        let base = u64::from(SPECIFICITY_BASE);
        let bounded = self.bounded();
        [bounded.0, bounded.1, bounded.2, bounded.3]
            .into_iter()
            .fold(0u64, |acc, component| {
                acc.saturating_mul(base).saturating_add(u64::from(component))
            })
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "({},{},{},{})", self.0, self.1, self.2, self.3)
    }
}

/// Compute the specificity of a compound selector.
/// Spec: Section 13 — Specificity
///
/// Pseudo-classes and pseudo-elements are not counted here; callers that strip
/// them from the selector text supply them to [`compute_specificity`] instead.
pub fn specificity_of_compound(compound: &CompoundSelector) -> Specificity {
    let mut id_count = 0u16;
    let mut class_attr_count = 0u16;
    let mut type_count = 0u16;
    for simple in &compound.simples {
        match simple {
            SimpleSelector::IdSelector(_) => {
                id_count = id_count.saturating_add(1);
            }
            SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => {
                class_attr_count = class_attr_count.saturating_add(1);
            }
            SimpleSelector::Type(_) => {
                type_count = type_count.saturating_add(1);
            }
            SimpleSelector::Universal
            | SimpleSelector::PseudoClass(_)
            | SimpleSelector::PseudoElement(_)
            | SimpleSelector::Negation(_) => {}
        }
    }
    Specificity(0, id_count, class_attr_count, type_count)
}

/// Compute the specificity of a complex selector (sum of its compounds).
/// Spec: Section 13 — Specificity accumulation
pub fn specificity_of_complex(sel: &ComplexSelector) -> Specificity {
    sel.compounds()
        .map(specificity_of_compound)
        .fold(Specificity::default(), |total, add| {
            Specificity(
                total.0.saturating_add(add.0),
                total.1.saturating_add(add.1),
                total.2.saturating_add(add.2),
                total.3.saturating_add(add.3),
            )
        })
}

/// Remove universal selectors (`*`) outside attribute brackets and strings.
pub fn strip_universal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_brackets = false;
    let mut quote: Option<char> = None;
    for character in text.chars() {
        match (quote, character) {
            (Some(open), _) if open == character => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(character),
            (None, '[') => in_brackets = true,
            (None, ']') => in_brackets = false,
            (None, '*') if !in_brackets => continue,
            _ => {}
        }
        out.push(character);
    }
    out
}

/// Specificity from pseudo-class-free selector text.
///
/// `pseudo_class_count` is added to the class component and a pseudo-element
/// adds one to the type component. Text that cannot be parsed contributes
/// nothing beyond those counts.
pub fn compute_specificity(
    filtered_text: &str,
    pseudo_class_count: usize,
    has_pseudo_element: bool,
) -> Specificity {
    let stripped = strip_universal(filtered_text);
    let structural = match parse_complex_selector(&stripped) {
        Ok(sel) => specificity_of_complex(&sel),
        Err(err) => {
            log::debug!("Specificity of unparsable selector {filtered_text:?}: {err}");
            Specificity::default()
        }
    };
    let pseudo_classes = u16::try_from(pseudo_class_count).unwrap_or(u16::MAX);
    Specificity(
        structural.0,
        structural.1,
        structural.2.saturating_add(pseudo_classes),
        structural.3.saturating_add(u16::from(has_pseudo_element)),
    )
    .bounded()
}
