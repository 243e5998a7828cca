//! Element identities across crawled states.

use core::fmt;

/// A 64-bit stable key for DOM nodes within one snapshot.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct NodeKey(pub u64);

impl NodeKey {
    /// The document node (always present, never an element).
    pub const ROOT: Self = Self(0);
}

/// Index of a crawled application state.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct StateId(pub u32);

/// Identity of one element in one crawled state.
///
/// The same node key in two states names two different elements.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ElementRef {
    pub state: StateId,
    pub node: NodeKey,
}

impl ElementRef {
    #[inline]
    pub const fn new(state: StateId, node: NodeKey) -> Self {
        Self { state, node }
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "state {} node {}", self.state.0, self.node.0)
    }
}
