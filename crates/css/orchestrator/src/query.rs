//! Contract for the engine that evaluates selector text against a DOM document.
//!
//! The analysis never matches selectors itself. It hands the filtered selector
//! text of every selector to a [`SelectorQuery`] and records what comes back.

use crate::NodeKey;
use core::fmt;

/// An element returned by a selector query, with what the pseudo-class
/// compatibility check needs to know about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchedElement {
    pub node: NodeKey,
    /// Lowercased tag name.
    pub tag: String,
    /// Attributes in source order, names lowercased.
    pub attributes: Vec<(String, String)>,
}

impl MatchedElement {
    /// Value of the attribute `name`, if present.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// One result of a selector query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryMatch {
    /// The selector matched the document itself rather than an element.
    Document,
    Element(MatchedElement),
}

/// Why a selector could not be evaluated. Callers treat every variant as "no match".
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// The selector text could not be parsed.
    Malformed { selector: String, reason: String },
    /// The selector uses a component the engine cannot evaluate.
    Unsupported { selector: String, component: String },
    /// Any other failure inside the engine.
    Engine(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { selector, reason } => {
                write!(formatter, "Malformed selector {selector:?}: {reason}")
            }
            Self::Unsupported {
                selector,
                component,
            } => write!(
                formatter,
                "Unsupported component {component} in selector {selector:?}"
            ),
            Self::Engine(msg) => write!(formatter, "Query engine error: {msg}"),
        }
    }
}

impl core::error::Error for QueryError {}

/// A selector engine over some document type.
///
/// Implementations must be shareable across threads: selectors of one state
/// are queried in parallel.
pub trait SelectorQuery: Sync {
    type Document: Sync;

    /// Return every node of `document` matched by `selector`, in document order.
    ///
    /// # Errors
    /// Returns a [`QueryError`] when the selector cannot be evaluated.
    fn query_all(
        &self,
        document: &Self::Document,
        selector: &str,
    ) -> Result<Vec<QueryMatch>, QueryError>;
}
