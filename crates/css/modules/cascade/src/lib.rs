//! CSS Cascading and Inheritance Level 4 — override resolution over observed matches.
//! Spec: <https://www.w3.org/TR/css-cascade-4/>
//!
//! Selectors matched against crawled DOM states are collected per element in a
//! [`MatchRegistry`]. [`resolve_cascade`] then decides, element by element,
//! which declarations take effect, and [`filter_dead_rules`] removes whatever
//! never did.

#![forbid(unsafe_code)]

mod filter;
mod priority;
mod registry;
mod resolver;

pub use filter::{FilterStats, filter_dead_rules};
pub use priority::{CandidatePriority, compare_priority};
pub use registry::MatchRegistry;
pub use resolver::{ResolveStats, resolve_cascade};
