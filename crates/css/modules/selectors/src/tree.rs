//! Recursive selector tree.
//!
//! A complex selector is folded left-deep into nodes so that walking from the
//! root node visits the key compound first and then each compound further to
//! the left, one depth level per combinator.

use crate::{Combinator, ComplexSelector, CompoundSelector, SimpleSelector};

/// A node of the selector tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectorNode {
    /// A compound with no pseudo-element.
    Simple(CompoundSelector),
    /// A compound carrying a pseudo-element; `host` is the compound without it.
    PseudoElement {
        host: CompoundSelector,
        name: String,
    },
    /// `ancestor key` or `ancestor > key` when `child` is set.
    Descendant {
        ancestor: Box<SelectorNode>,
        key: Box<SelectorNode>,
        child: bool,
    },
    /// `previous + key` when `adjacent` is set, `previous ~ key` otherwise.
    Sibling {
        previous: Box<SelectorNode>,
        key: Box<SelectorNode>,
        adjacent: bool,
    },
}

/// Callbacks invoked while walking a [`SelectorNode`].
pub trait SelectorVisitor {
    /// Called for every compound, `depth` being 0 for the key compound.
    fn visit_compound(&mut self, compound: &CompoundSelector, depth: usize);

    /// Called for a pseudo-element attached to the compound at `depth`.
    fn visit_pseudo_element(&mut self, name: &str, depth: usize);
}

impl SelectorNode {
    /// Build the tree for a complex selector.
    pub fn from_complex(selector: &ComplexSelector) -> Self {
        let mut node = Self::leaf(&selector.first);
        for (combinator, compound) in &selector.rest {
            let key = Box::new(Self::leaf(compound));
            let left = Box::new(node);
            node = match combinator {
                Combinator::Descendant | Combinator::Child => Self::Descendant {
                    ancestor: left,
                    key,
                    child: *combinator == Combinator::Child,
                },
                Combinator::AdjacentSibling | Combinator::GeneralSibling => Self::Sibling {
                    previous: left,
                    key,
                    adjacent: *combinator == Combinator::AdjacentSibling,
                },
            };
        }
        node
    }

    /// Leaf node for one compound.
    fn leaf(compound: &CompoundSelector) -> Self {
        let mut host = CompoundSelector::default();
        let mut pseudo_element = None;
        for simple in &compound.simples {
            if let SimpleSelector::PseudoElement(name) = simple {
                pseudo_element = Some(name.clone());
            } else {
                host.simples.push(simple.clone());
            }
        }
        match pseudo_element {
            Some(name) => Self::PseudoElement { host, name },
            None => Self::Simple(host),
        }
    }

    /// Walk the tree from the key compound outward.
    pub fn accept<V: SelectorVisitor>(&self, visitor: &mut V, depth: usize) {
        match self {
            Self::Simple(compound) => visitor.visit_compound(compound, depth),
            Self::PseudoElement { host, name } => {
                visitor.visit_pseudo_element(name, depth);
                visitor.visit_compound(host, depth);
            }
            Self::Descendant { ancestor, key, .. } => {
                key.accept(visitor, depth);
                ancestor.accept(visitor, depth.saturating_add(1));
            }
            Self::Sibling { previous, key, .. } => {
                key.accept(visitor, depth);
                previous.accept(visitor, depth.saturating_add(1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_complex_selector;

    #[derive(Default)]
    struct Depths(Vec<(String, usize)>);

    impl SelectorVisitor for Depths {
        fn visit_compound(&mut self, compound: &CompoundSelector, depth: usize) {
            self.0.push((compound.to_string(), depth));
        }

        fn visit_pseudo_element(&mut self, name: &str, depth: usize) {
            self.0.push((format!("::{name}"), depth));
        }
    }

    #[test]
    fn walks_key_first() {
        let Ok(sel) = parse_complex_selector("ul > li + li a::after") else {
            panic!("selector should parse");
        };
        let tree = SelectorNode::from_complex(&sel);
        let mut depths = Depths::default();
        tree.accept(&mut depths, 0);
        assert_eq!(
            depths.0,
            vec![
                ("::after".to_owned(), 0),
                ("a".to_owned(), 0),
                ("li".to_owned(), 1),
                ("li".to_owned(), 2),
                ("ul".to_owned(), 3),
            ]
        );
        assert!(matches!(tree, SelectorNode::Descendant { child: false, .. }));
    }
}
