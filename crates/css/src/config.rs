//! Configuration of a stylesheet analysis.
//!
//! Settings control how selector queries are scheduled and which optional
//! passes run. They can be built programmatically or read from environment
//! variables.

use anyhow::{Context as _, Result};
use std::env;

/// Runtime configuration for [`crate::CssAnalyzer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzerConfig {
    /// Worker threads for selector queries; `None` uses the rayon default
    pub threads: Option<usize>,
    /// Whether selectors of one state are queried in parallel
    pub parallel: bool,
    /// Whether the shorthand merger runs after the dead-rule filter
    pub merge_shorthands: bool,
    /// Whether matched elements must be able to enter the key pseudo-class state
    pub pseudo_compat: bool,
}

impl AnalyzerConfig {
    /// Construct a configuration with explicit values.
    ///
    /// A thread count of zero is treated as `None`.
    #[inline]
    #[must_use]
    pub fn new(
        threads: Option<usize>,
        parallel: bool,
        merge_shorthands: bool,
        pseudo_compat: bool,
    ) -> Self {
        Self {
            threads: threads.filter(|count| *count > 0),
            parallel,
            merge_shorthands,
            pseudo_compat,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables:
    /// - `CSS_AUDIT_THREADS`: worker threads for selector queries (default: rayon's choice)
    /// - `CSS_AUDIT_PARALLEL`: set to "0" to query selectors sequentially
    /// - `CSS_AUDIT_MERGE_SHORTHANDS`: set to "0" to skip shorthand merging
    /// - `CSS_AUDIT_PSEUDO_COMPAT`: set to "0" to skip the pseudo-class compatibility check
    ///
    /// # Errors
    ///
    /// Returns an error if `CSS_AUDIT_THREADS` is set but is not a number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a variable.
    ///
    /// # Errors
    ///
    /// Returns an error if `CSS_AUDIT_THREADS` is set but is not a number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let threads = lookup("CSS_AUDIT_THREADS")
            .map(|val| {
                val.trim()
                    .parse::<usize>()
                    .with_context(|| format!("CSS_AUDIT_THREADS must be a number, got {val:?}"))
            })
            .transpose()?;
        let enabled = |key: &str| lookup(key).as_deref().map(str::trim) != Some("0");
        Ok(Self::new(
            threads,
            enabled("CSS_AUDIT_PARALLEL"),
            enabled("CSS_AUDIT_MERGE_SHORTHANDS"),
            enabled("CSS_AUDIT_PSEUDO_COMPAT"),
        ))
    }
}

impl Default for AnalyzerConfig {
    #[inline]
    fn default() -> Self {
        Self::new(None, true, true, true)
    }
}
