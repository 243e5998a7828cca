//! Media Queries Level 4 — activation scope of style rules.
//! Spec: <https://www.w3.org/TR/mediaqueries-4/>
//!
//! A rule nested in one or more `@media` blocks is only active when every
//! enclosing condition holds. This crate models that scope as a set of
//! normalized media-query preludes. Scopes are compared structurally only:
//! no attempt is made to evaluate or simplify the conditions themselves.

#![forbid(unsafe_code)]

use core::fmt;
use std::collections::BTreeSet;

/// The set of `@media` preludes a rule is nested in.
/// An empty scope means the rule is unconditionally active.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MediaScope {
    /// Normalized preludes, one per enclosing `@media` block.
    queries: BTreeSet<String>,
}

impl MediaScope {
    /// The unconditional scope (no enclosing `@media`).
    #[inline]
    pub const fn unscoped() -> Self {
        Self {
            queries: BTreeSet::new(),
        }
    }

    /// Build a scope from raw `@media` preludes, normalizing each one.
    /// Empty preludes are ignored.
    pub fn from_preludes<I, S>(preludes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let queries = preludes
            .into_iter()
            .map(|prelude| normalize_media_query(prelude.as_ref()))
            .filter(|query| !query.is_empty())
            .collect();
        Self { queries }
    }

    /// Whether the rule is active without any media condition.
    #[inline]
    pub fn is_unscoped(&self) -> bool {
        self.queries.is_empty()
    }

    /// Number of enclosing media conditions.
    #[inline]
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the scope has no conditions. Same as [`Self::is_unscoped`].
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Iterate the normalized preludes in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queries.iter().map(String::as_str)
    }

    /// Two scopes activate under the same conditions.
    ///
    /// Only structurally identical scopes are considered equal.
    #[inline]
    pub fn same_scope(&self, other: &Self) -> bool {
        self.queries == other.queries
    }

    /// `self` is nested under every condition of `other` plus at least one more,
    /// so it only applies to a strict subset of the situations `other` applies to.
    pub fn is_overwrite_of(&self, other: &Self) -> bool {
        self.queries.len() > other.queries.len() && self.queries.is_superset(&other.queries)
    }
}

impl fmt::Display for MediaScope {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for query in &self.queries {
            if !first {
                formatter.write_str(" && ")?;
            }
            write!(formatter, "@media {query}")?;
            first = false;
        }
        Ok(())
    }
}

/// Normalize a media-query prelude for structural comparison.
///
/// Lowercases, collapses whitespace runs into a single space, and removes
/// whitespace after `(`, before `)`, and on both sides of `:` and `,`.
pub fn normalize_media_query(prelude: &str) -> String {
    let lowered = prelude.trim().to_ascii_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_space = false;
    for character in lowered.chars() {
        if character.is_ascii_whitespace() {
            pending_space = true;
            continue;
        }
        let glue_before = matches!(character, ')' | ':' | ',');
        if pending_space
            && !glue_before
            && !out.is_empty()
            && !out.ends_with(['(', ':', ','])
        {
            out.push(' ');
        }
        pending_space = false;
        out.push(character);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whitespace_and_case() {
        assert_eq!(
            normalize_media_query("  Screen   AND ( max-width : 600px )"),
            "screen and (max-width:600px)"
        );
        assert_eq!(
            normalize_media_query("print ,  screen"),
            "print,screen"
        );
    }

    #[test]
    fn equal_scopes_compare_structurally() {
        let left = MediaScope::from_preludes(["screen and (max-width: 600px)"]);
        let right = MediaScope::from_preludes(["SCREEN and (max-width:600px)"]);
        assert!(left.same_scope(&right));
        assert!(!left.same_scope(&MediaScope::unscoped()));
    }

    #[test]
    fn all_is_not_equated_with_unscoped() {
        let all = MediaScope::from_preludes(["all"]);
        assert!(!all.same_scope(&MediaScope::unscoped()));
    }

    #[test]
    fn nested_scope_overwrites_outer() {
        let outer = MediaScope::from_preludes(["screen"]);
        let nested = MediaScope::from_preludes(["screen", "(min-width: 40em)"]);
        assert!(nested.is_overwrite_of(&outer));
        assert!(nested.is_overwrite_of(&MediaScope::unscoped()));
        assert!(!outer.is_overwrite_of(&nested));
        assert!(!outer.is_overwrite_of(&outer));
    }
}
