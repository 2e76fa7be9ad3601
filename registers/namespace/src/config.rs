// Licensed under the Apache-2.0 license

//! Namespace configuration.

/// Default bound on alias dereferences during one traversal.
pub const DEFAULT_MAX_ALIAS_DEPTH: usize = 32;

/// Tunables carried by a [`Namespace`](crate::Namespace).
///
/// # Example
///
/// ```
/// use registers_namespace::NamespaceConfig;
///
/// let config = NamespaceConfig::with_defaults()
///     .max_alias_depth(8)
///     .warn_on_overwrite(false);
/// assert_eq!(config.max_alias_depth, 8);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceConfig {
    /// Alias chains longer than this fail with
    /// [`NamespaceError::AliasCycle`](crate::NamespaceError::AliasCycle).
    pub max_alias_depth: usize,

    /// Log a warning when a plain name is re-added to a scope. The insertion
    /// overwrites the old entry either way.
    pub warn_on_overwrite: bool,
}

impl NamespaceConfig {
    pub fn with_defaults() -> Self {
        Self {
            max_alias_depth: DEFAULT_MAX_ALIAS_DEPTH,
            warn_on_overwrite: true,
        }
    }

    pub fn max_alias_depth(mut self, depth: usize) -> Self {
        self.max_alias_depth = depth;
        self
    }

    pub fn warn_on_overwrite(mut self, warn: bool) -> Self {
        self.warn_on_overwrite = warn;
        self
    }
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}
