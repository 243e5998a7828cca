//! Data model of the stylesheet analysis.
//!
//! Holds the analysed files, their rules, selectors and declarations, the
//! identities of matched elements, and the contract of the selector-query
//! engine together with a snapshot-based implementation of it.

mod element;
pub mod query;
pub mod snapshot;
pub mod types;

pub use element::{ElementRef, NodeKey, StateId};
pub use query::{MatchedElement, QueryError, QueryMatch, SelectorQuery};
pub use snapshot::{DomSnapshot, SnapshotElement, SnapshotQuery};
pub use types::{
    CssFile, Declaration, DeclarationArena, DeclarationId, DeclarationStatus, FileId, Rule,
    Selector, SelectorId, StyleSheetSet,
};
