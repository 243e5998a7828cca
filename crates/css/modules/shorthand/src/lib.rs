//! Merging of longhand declarations into their shorthand properties.
//! Spec: <https://www.w3.org/TR/css-cascade-5/#shorthand-property>

mod components;
mod family;
mod merger;

pub use components::{minimize_sides, split_components};
pub use family::{Family, Side, classify};
pub use merger::{MergeOutcome, MergeWarning, merge_shorthands};
