//! In-memory DOM snapshot of one crawled state and a selector engine over it.

use crate::query::{MatchedElement, QueryError, QueryMatch, SelectorQuery};
use crate::NodeKey;
use css_selectors::{
    ElementAdapter, matches_selector_list, parse_selector_list, unsupported_component,
};
use std::collections::HashMap;

/// One element of a [`DomSnapshot`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotElement {
    /// Lowercased tag name.
    pub tag: String,
    /// Attributes in source order, names lowercased.
    pub attributes: Vec<(String, String)>,
    /// Class tokens split from the `class` attribute.
    pub classes: Vec<String>,
}

/// A static element tree. [`NodeKey::ROOT`] is the document node; every other
/// key is an element.
#[derive(Clone, Debug)]
pub struct DomSnapshot {
    /// Element data by key.
    elements: HashMap<NodeKey, SnapshotElement>,
    /// Parent of each element (`NodeKey::ROOT` for top-level elements).
    parent_by_key: HashMap<NodeKey, NodeKey>,
    /// Ordered children of each node, including the document node.
    children_by_parent: HashMap<NodeKey, Vec<NodeKey>>,
    /// Next key handed out by [`DomSnapshot::append_element`].
    next_key: u64,
}

impl Default for DomSnapshot {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DomSnapshot {
    #[inline]
    pub fn new() -> Self {
        Self {
            elements: HashMap::new(),
            parent_by_key: HashMap::new(),
            children_by_parent: HashMap::new(),
            next_key: 1,
        }
    }

    /// Append an element as the last child of `parent` and return its key.
    pub fn append_element(
        &mut self,
        parent: NodeKey,
        tag: &str,
        attributes: &[(&str, &str)],
    ) -> NodeKey {
        let key = NodeKey(self.next_key);
        self.next_key = self.next_key.saturating_add(1);
        let attributes: Vec<(String, String)> = attributes
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), (*value).to_owned()))
            .collect();
        let classes = attributes
            .iter()
            .find(|(name, _)| name == "class")
            .map(|(_, value)| value.split_ascii_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
        self.elements.insert(
            key,
            SnapshotElement {
                tag: tag.to_ascii_lowercase(),
                attributes,
                classes,
            },
        );
        self.parent_by_key.insert(key, parent);
        self.children_by_parent.entry(parent).or_default().push(key);
        key
    }

    #[inline]
    pub fn element(&self, key: NodeKey) -> Option<&SnapshotElement> {
        self.elements.get(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All elements in document (pre-)order.
    pub fn elements_in_order(&self) -> Vec<NodeKey> {
        fn walk(snapshot: &DomSnapshot, node: NodeKey, out: &mut Vec<NodeKey>) {
            if let Some(children) = snapshot.children_by_parent.get(&node) {
                for child in children {
                    out.push(*child);
                    walk(snapshot, *child, out);
                }
            }
        }
        let mut out = Vec::with_capacity(self.elements.len());
        walk(self, NodeKey::ROOT, &mut out);
        out
    }

    /// Sibling list containing `element` and its position in it.
    fn sibling_position(&self, element: NodeKey) -> Option<(&[NodeKey], usize)> {
        let parent = self.parent_by_key.get(&element)?;
        let siblings = self.children_by_parent.get(parent)?;
        let position = siblings.iter().position(|&sibling| sibling == element)?;
        Some((siblings.as_slice(), position))
    }

    /// The data a query reports for a matched element.
    fn matched(&self, key: NodeKey) -> MatchedElement {
        let element = self.elements.get(&key);
        MatchedElement {
            node: key,
            tag: element.map(|el| el.tag.clone()).unwrap_or_default(),
            attributes: element.map(|el| el.attributes.clone()).unwrap_or_default(),
        }
    }
}

impl ElementAdapter for DomSnapshot {
    type Handle = NodeKey;

    #[inline]
    fn parent(&self, element: NodeKey) -> Option<NodeKey> {
        self.parent_by_key
            .get(&element)
            .copied()
            .filter(|&parent| parent != NodeKey::ROOT)
    }

    fn previous_sibling_element(&self, element: NodeKey) -> Option<NodeKey> {
        let (siblings, position) = self.sibling_position(element)?;
        position
            .checked_sub(1)
            .and_then(|prev| siblings.get(prev).copied())
    }

    fn next_sibling_element(&self, element: NodeKey) -> Option<NodeKey> {
        let (siblings, position) = self.sibling_position(element)?;
        siblings.get(position.saturating_add(1)).copied()
    }

    #[inline]
    fn tag_name(&self, element: NodeKey) -> &str {
        self.elements
            .get(&element)
            .map_or("", |el| el.tag.as_str())
    }

    #[inline]
    fn element_id(&self, element: NodeKey) -> Option<&str> {
        self.attr(element, "id")
    }

    #[inline]
    fn has_class(&self, element: NodeKey, class: &str) -> bool {
        self.elements
            .get(&element)
            .is_some_and(|el| el.classes.iter().any(|token| token == class))
    }

    fn attr(&self, element: NodeKey, name: &str) -> Option<&str> {
        self.elements.get(&element).and_then(|el| {
            el.attributes
                .iter()
                .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }
}

/// Selector engine over [`DomSnapshot`] documents.
///
/// Evaluates type, universal, class, id and attribute selectors, all four
/// combinators and the structural pseudo-classes. State-dependent
/// pseudo-classes are reported as unsupported; callers strip them first.
#[derive(Clone, Copy, Debug, Default)]
pub struct SnapshotQuery;

impl SelectorQuery for SnapshotQuery {
    type Document = DomSnapshot;

    fn query_all(
        &self,
        document: &DomSnapshot,
        selector: &str,
    ) -> Result<Vec<QueryMatch>, QueryError> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Ok(vec![QueryMatch::Document]);
        }
        let list = parse_selector_list(trimmed).map_err(|err| QueryError::Malformed {
            selector: trimmed.to_owned(),
            reason: err.to_string(),
        })?;
        if list.selectors.is_empty() {
            return Err(QueryError::Malformed {
                selector: trimmed.to_owned(),
                reason: "empty selector list".to_owned(),
            });
        }
        for sel in &list.selectors {
            if !sel.is_well_formed() {
                return Err(QueryError::Malformed {
                    selector: trimmed.to_owned(),
                    reason: "dangling combinator".to_owned(),
                });
            }
            if let Some(component) = unsupported_component(sel) {
                return Err(QueryError::Unsupported {
                    selector: trimmed.to_owned(),
                    component,
                });
            }
        }
        Ok(document
            .elements_in_order()
            .into_iter()
            .filter(|&node| matches_selector_list(document, node, &list))
            .map(|node| QueryMatch::Element(document.matched(node)))
            .collect())
    }
}
