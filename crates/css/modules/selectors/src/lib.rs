//! Selectors Level 3 — Selector structure, specificity and element matching.
//! Spec: <https://www.w3.org/TR/selectors-3/>
//!
//! This module implements the subset needed to reason about authored rules
//! without a browser:
//! - Type, universal, class, id and attribute selectors
//! - Pseudo-classes (classified as structural or state-dependent), pseudo-elements, negation
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - A recursive selector tree used to walk compounds from the key selector outward
//! - Specificity calculation
//! - Per-selector descriptors with pseudo-class metadata and a filtered selector text
//! - Element matching over an abstract DOM adapter
//!
//! Each function includes a reference to its corresponding section in the spec.

mod descriptor;
mod matcher;
mod parser;
mod pseudo;
mod specificity;
mod tree;

use core::fmt;

// Re-export public API
pub use descriptor::SelectorDescriptor;
pub use matcher::{
    matches_complex, matches_compound, matches_selector_list, unsupported_component,
};
pub use parser::{
    SelectorParseError, parse_complex_selector, parse_selector_list, split_selector_list,
};
pub use pseudo::{
    PseudoClassEntry, PseudoClassKind, PseudoSummary, classify_pseudo_class, is_pseudo_element,
};
pub use specificity::{
    SPECIFICITY_BASE, Specificity, compute_specificity, specificity_of_complex,
    specificity_of_compound, strip_universal,
};
pub use tree::{SelectorNode, SelectorVisitor};

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
///
/// Spec references:
/// - Section 3: Selectors overview and element matching
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any. The root element has no parent.
    /// Spec: Section 11 — Combinators (for tree relationships)
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element (skip non-elements if your DOM has mixed nodes).
    /// Spec: Section 11 — Sibling combinators
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Next sibling element.
    /// Spec: Section 6.6.5 — Structural pseudo-classes
    fn next_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name in ASCII lowercase (per HTML parsing conventions).
    /// Spec: Section 5 — Type selectors
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns Some(id) if the element has an id attribute, else None.
    /// Spec: Section 7 — ID selectors
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element has the given class token.
    /// Spec: Section 6 — Class selectors
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present.
    /// Spec: Section 8 — Attribute selectors
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;
}

/// Attribute selector operators.
/// Spec: Section 6.3 — Attribute selectors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrOperator {
    /// `[name]`
    Exists,
    /// `[name=value]`
    Equals,
    /// `[name~=value]`
    Includes,
    /// `[name|=value]`
    DashMatch,
    /// `[name^=value]`
    Prefix,
    /// `[name$=value]`
    Suffix,
    /// `[name*=value]`
    Substring,
}

impl AttrOperator {
    /// Operator text as written in a selector.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exists => "",
            Self::Equals => "=",
            Self::Includes => "~=",
            Self::DashMatch => "|=",
            Self::Prefix => "^=",
            Self::Suffix => "$=",
            Self::Substring => "*=",
        }
    }
}

/// A pseudo-class with its optional functional argument.
/// Spec: Section 6.6 — Pseudo-classes
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PseudoClass {
    /// Lowercased name without the leading colon.
    pub name: String,
    /// Raw argument text for functional pseudo-classes like `:nth-child(2n)`.
    pub argument: Option<String>,
}

impl PseudoClass {
    /// The pseudo-class as it appears in selector text, e.g. `:lang(en)`.
    pub fn token(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.argument {
            Some(argument) => write!(formatter, ":{}({argument})", self.name),
            None => write!(formatter, ":{}", self.name),
        }
    }
}

/// Simple selectors (subset).
/// Spec: Section 5, 6, 7, 8
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Spec: Section 5 — Type selectors
    Type(String),
    /// Spec: Section 6 — Class selectors
    Class(String),
    /// Spec: Section 7 — ID selectors
    IdSelector(String),
    /// Spec: Section 8 — Attribute selectors
    Attribute {
        name: String,
        operator: AttrOperator,
        value: String,
    },
    /// Universal selector '*'. Parsed but contributes nothing to matching or specificity.
    /// Spec: Section 5 — Universal selector
    Universal,
    /// Spec: Section 6.6 — Pseudo-classes
    PseudoClass(PseudoClass),
    /// Spec: Section 7 — Pseudo-elements (name without colons)
    PseudoElement(String),
    /// Spec: Section 6.6.7 — Negation pseudo-class, raw argument text
    Negation(String),
}

impl fmt::Display for SimpleSelector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(name) => formatter.write_str(name),
            Self::Class(name) => write!(formatter, ".{name}"),
            Self::IdSelector(name) => write!(formatter, "#{name}"),
            Self::Attribute {
                name,
                operator: AttrOperator::Exists,
                ..
            } => write!(formatter, "[{name}]"),
            Self::Attribute {
                name,
                operator,
                value,
            } => write!(formatter, "[{name}{}\"{value}\"]", operator.as_str()),
            Self::Universal => formatter.write_str("*"),
            Self::PseudoClass(pseudo) => write!(formatter, "{pseudo}"),
            Self::PseudoElement(name) => write!(formatter, "::{name}"),
            Self::Negation(argument) => write!(formatter, ":not({argument})"),
        }
    }
}

/// A compound selector is a sequence of simple selectors (no combinators).
/// Spec: Section 5 — Simple selector sequences
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

impl CompoundSelector {
    /// The compound without its pseudo-classes, pseudo-elements and negations,
    /// rendered as selector text. Used to name the owner of a pseudo-class.
    pub fn base_text(&self) -> String {
        self.simples
            .iter()
            .filter(|simple| {
                !matches!(
                    simple,
                    SimpleSelector::PseudoClass(_)
                        | SimpleSelector::PseudoElement(_)
                        | SimpleSelector::Negation(_)
                )
            })
            .map(ToString::to_string)
            .collect()
    }
}

impl fmt::Display for CompoundSelector {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        for simple in &self.simples {
            write!(formatter, "{simple}")?;
        }
        Ok(())
    }
}

/// Combinators between compounds.
/// Spec: Section 11 — Combinators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector is one or more compounds separated by combinators.
/// Spec: Section 3, 11
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// The right-most (key) compound.
    pub fn key(&self) -> &CompoundSelector {
        self.rest.last().map_or(&self.first, |pair| &pair.1)
    }

    /// Every compound is non-empty, i.e. no dangling combinators.
    pub fn is_well_formed(&self) -> bool {
        !self.first.simples.is_empty()
            && self.rest.iter().all(|pair| !pair.1.simples.is_empty())
    }

    /// Iterate all compounds from left to right.
    pub fn compounds(&self) -> impl Iterator<Item = &CompoundSelector> {
        core::iter::once(&self.first).chain(self.rest.iter().map(|pair| &pair.1))
    }
}

/// A selector list separated by commas.
/// Spec: Section 4 — Groups of selectors
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}
