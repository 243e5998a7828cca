//! CSS selector matching engine.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! Matching runs right to left. Descendant and general-sibling combinators
//! backtrack, so `a b > c` finds every valid `a` ancestor rather than only the
//! nearest one.

use crate::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, ElementAdapter, PseudoClass,
    SelectorList, SimpleSelector,
};

/// Structural pseudo-classes the matcher can evaluate.
const SUPPORTED_PSEUDO_CLASSES: &[&str] = &[
    "root",
    "first-child",
    "last-child",
    "only-child",
    "first-of-type",
    "last-of-type",
    "only-of-type",
    "nth-child",
    "nth-last-child",
];

/// Match a selector list against an element.
/// Spec: Section 3, 4
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element.
/// Spec: Section 3, 11 — Right-to-left matching strategy
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    let compounds: Vec<&CompoundSelector> = sel.compounds().collect();
    let combinators: Vec<Combinator> = sel.rest.iter().map(|pair| pair.0).collect();
    matches_from(adapter, element, &compounds, &combinators)
}

/// Match `compounds[..=last]` with `element` as the subject of the last compound.
fn matches_from<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compounds: &[&CompoundSelector],
    combinators: &[Combinator],
) -> bool {
    let Some((key, left_compounds)) = compounds.split_last() else {
        return false;
    };
    if !matches_compound(adapter, element, key) {
        return false;
    }
    let Some((combinator, left_combinators)) = combinators.split_last() else {
        return true;
    };
    let recurse = |candidate: A::Handle| {
        matches_from(adapter, candidate, left_compounds, left_combinators)
    };
    match combinator {
        Combinator::Descendant => {
            let mut current_parent = adapter.parent(element);
            while let Some(ancestor_element) = current_parent {
                if recurse(ancestor_element) {
                    return true;
                }
                current_parent = adapter.parent(ancestor_element);
            }
            false
        }
        Combinator::Child => adapter.parent(element).is_some_and(recurse),
        Combinator::AdjacentSibling => adapter.previous_sibling_element(element).is_some_and(recurse),
        Combinator::GeneralSibling => {
            let mut current_sibling = adapter.previous_sibling_element(element);
            while let Some(sibling_element) = current_sibling {
                if recurse(sibling_element) {
                    return true;
                }
                current_sibling = adapter.previous_sibling_element(sibling_element);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
/// Spec: Section 5–8
///
/// A pseudo-element matches its host element. Pseudo-classes outside the
/// structural set and negations never match; see [`unsupported_component`].
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound.simples.iter().all(|simple| match simple {
        SimpleSelector::Universal | SimpleSelector::PseudoElement(_) => true,
        SimpleSelector::Type(type_name) => {
            type_name.is_empty() || adapter.tag_name(element).eq_ignore_ascii_case(type_name)
        }
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name),
        SimpleSelector::IdSelector(id_value) => adapter
            .element_id(element)
            .is_some_and(|value| value == id_value),
        SimpleSelector::Attribute {
            name,
            operator,
            value,
        } => adapter
            .attr(element, name)
            .is_some_and(|actual| attribute_matches(*operator, actual, value)),
        SimpleSelector::PseudoClass(pseudo) => matches_pseudo_class(adapter, element, pseudo),
        SimpleSelector::Negation(_) => false,
    })
}

/// Return the first component the matcher cannot evaluate, rendered as selector text.
pub fn unsupported_component(sel: &ComplexSelector) -> Option<String> {
    sel.compounds()
        .flat_map(|compound| compound.simples.iter())
        .find(|simple| match simple {
            SimpleSelector::PseudoClass(pseudo) => {
                !SUPPORTED_PSEUDO_CLASSES.contains(&pseudo.name.as_str())
                    || (pseudo.name.starts_with("nth-")
                        && pseudo.argument.as_deref().and_then(parse_nth).is_none())
            }
            SimpleSelector::Negation(_) => true,
            _ => false,
        })
        .map(ToString::to_string)
}

/// Spec: Section 6.3.1, 6.3.2 — Attribute presence and substring matching
fn attribute_matches(operator: AttrOperator, actual: &str, expected: &str) -> bool {
    match operator {
        AttrOperator::Exists => true,
        AttrOperator::Equals => actual == expected,
        AttrOperator::Includes => {
            !expected.is_empty() && actual.split_ascii_whitespace().any(|word| word == expected)
        }
        AttrOperator::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|tail| tail.starts_with('-'))
        }
        AttrOperator::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOperator::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOperator::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

/// Spec: Section 6.6.5 — Structural pseudo-classes
fn matches_pseudo_class<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    pseudo: &PseudoClass,
) -> bool {
    let tag = adapter.tag_name(element);
    let same_tag = |other: A::Handle| adapter.tag_name(other).eq_ignore_ascii_case(tag);
    let before = |filter: &dyn Fn(A::Handle) -> bool| {
        count_siblings(element, |handle| adapter.previous_sibling_element(handle), filter)
    };
    let after = |filter: &dyn Fn(A::Handle) -> bool| {
        count_siblings(element, |handle| adapter.next_sibling_element(handle), filter)
    };
    let any = |_: A::Handle| true;
    match pseudo.name.as_str() {
        "root" => adapter.parent(element).is_none(),
        "first-child" => before(&any) == 0,
        "last-child" => after(&any) == 0,
        "only-child" => before(&any) == 0 && after(&any) == 0,
        "first-of-type" => before(&same_tag) == 0,
        "last-of-type" => after(&same_tag) == 0,
        "only-of-type" => before(&same_tag) == 0 && after(&same_tag) == 0,
        "nth-child" | "nth-last-child" => {
            let Some((step, offset)) = pseudo.argument.as_deref().and_then(parse_nth) else {
                return false;
            };
            let preceding = if pseudo.name == "nth-child" {
                before(&any)
            } else {
                after(&any)
            };
            nth_matches(step, offset, preceding.saturating_add(1))
        }
        _ => false,
    }
}

/// Count siblings reached by repeatedly applying `step` that satisfy `filter`.
fn count_siblings<H: Copy>(
    element: H,
    step: impl Fn(H) -> Option<H>,
    filter: &dyn Fn(H) -> bool,
) -> usize {
    let mut count = 0usize;
    let mut current = step(element);
    while let Some(handle) = current {
        if filter(handle) {
            count = count.saturating_add(1);
        }
        current = step(handle);
    }
    count
}

/// Parse an `an+b` expression (also `odd`, `even`, plain integers).
/// Spec: Section 6.6.5.2 — :nth-child() pseudo-class
pub(crate) fn parse_nth(argument: &str) -> Option<(i64, i64)> {
    let compact: String = argument
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();
    match compact.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        _ => {}
    }
    let Some(n_index) = compact.find('n') else {
        return compact.parse::<i64>().ok().map(|offset| (0, offset));
    };
    let (step_text, rest) = compact.split_at(n_index);
    let step = match step_text {
        "" | "+" => 1,
        "-" => -1,
        other => other.parse::<i64>().ok()?,
    };
    let offset_text = rest.get(1..).unwrap_or("");
    let offset = if offset_text.is_empty() {
        0
    } else {
        let digits = offset_text.strip_prefix('+').unwrap_or(offset_text);
        digits.parse::<i64>().ok()?
    };
    Some((step, offset))
}

/// True when `index` (1-based) equals `step * n + offset` for some `n >= 0`.
fn nth_matches(step: i64, offset: i64, index: usize) -> bool {
    let Ok(index) = i64::try_from(index) else {
        return false;
    };
    let distance = index.saturating_sub(offset);
    if step == 0 {
        return distance == 0;
    }
    distance % step == 0 && distance / step >= 0
}
