//! Deep-merge engine
//!
//! Merge rules, dispatched on the `(current, incoming)` tag pair:
//! - Mapping + Mapping: recurse
//! - anything + Sequence: replace (sequences are never concatenated)
//! - anything else: incoming wins
//!
//! Keys present only in the base carry through untouched.

use cfgfold_value::{ConfigNode, ConfigValue};
use serde::{Deserialize, Serialize};

use crate::error::{MergeArgument, MergeError};

/// Default recursion limit
///
/// Configuration trees are small; anything deeper is treated as a cycle.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Merge engine options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Maximum mapping nesting depth before failing with `CyclicStructure`
    pub max_depth: usize,
}

impl MergeOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set recursion limit
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Deep-merge engine
///
/// Stateless apart from its options; one instance can serve any number of
/// concurrent callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Merger {
    options: MergeOptions,
}

impl Merger {
    /// Create merger with default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create merger with options
    #[inline]
    #[must_use]
    pub fn with_options(options: MergeOptions) -> Self {
        Self { options }
    }

    /// Get options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &MergeOptions {
        &self.options
    }

    /// Merge two values that must both be mappings
    ///
    /// # Errors
    /// - `MergeError::InvalidInputKind` if either argument is not a mapping
    /// - `MergeError::CyclicStructure` if nesting exceeds `max_depth`
    pub fn merge(&self, base: &ConfigValue, overlay: &ConfigValue) -> Result<ConfigNode, MergeError> {
        let base = base
            .as_mapping()
            .ok_or_else(|| MergeError::invalid_input(MergeArgument::Base, base.kind()))?;
        let overlay = overlay
            .as_mapping()
            .ok_or_else(|| MergeError::invalid_input(MergeArgument::Override, overlay.kind()))?;
        self.merge_nodes(base, overlay)
    }

    /// Merge two mappings, `overlay` taking precedence
    ///
    /// The result is a fresh tree; neither input is modified or aliased.
    ///
    /// # Errors
    /// Returns `MergeError::CyclicStructure` if nesting exceeds `max_depth`
    pub fn merge_nodes(&self, base: &ConfigNode, overlay: &ConfigNode) -> Result<ConfigNode, MergeError> {
        let mut result = base.clone();
        let mut path = Vec::new();
        self.merge_into(&mut result, overlay, 0, &mut path)?;
        Ok(result)
    }

    /// Merge two mappings by value, reusing their allocations
    ///
    /// # Errors
    /// Returns `MergeError::CyclicStructure` if nesting exceeds `max_depth`
    pub fn merge_owned(&self, base: ConfigNode, overlay: ConfigNode) -> Result<ConfigNode, MergeError> {
        let mut result = base;
        let mut path = Vec::new();
        self.merge_owned_into(&mut result, overlay, 0, &mut path)?;
        Ok(result)
    }

    /// Fold layers left to right; later layers win
    ///
    /// An empty iterator yields an empty mapping.
    ///
    /// # Errors
    /// Returns the first merge failure
    pub fn merge_layers<I>(&self, layers: I) -> Result<ConfigNode, MergeError>
    where
        I: IntoIterator<Item = ConfigNode>,
    {
        layers
            .into_iter()
            .enumerate()
            .try_fold(ConfigNode::new(), |acc, (index, layer)| {
                tracing::debug!(layer = index, keys = layer.len(), "folding config layer");
                self.merge_owned(acc, layer)
            })
    }

    fn check_depth(&self, depth: usize, path: &[&str]) -> Result<(), MergeError> {
        if depth > self.options.max_depth {
            tracing::warn!(depth, "merge depth limit exceeded");
            return Err(MergeError::cyclic(self.options.max_depth, path));
        }
        Ok(())
    }

    fn merge_into<'a>(
        &self,
        result: &mut ConfigNode,
        overlay: &'a ConfigNode,
        depth: usize,
        path: &mut Vec<&'a str>,
    ) -> Result<(), MergeError> {
        self.check_depth(depth, path)?;

        for (key, incoming) in overlay {
            match (result.get_mut(key), incoming) {
                (Some(ConfigValue::Mapping(current)), ConfigValue::Mapping(incoming)) => {
                    tracing::trace!(key = %key, depth, "merging nested mapping");
                    path.push(key);
                    self.merge_into(current, incoming, depth + 1, path)?;
                    path.pop();
                }
                // Sequences, primitives, and mappings landing on non-mappings
                (_, incoming) => {
                    result.insert(key.clone(), incoming.clone());
                }
            }
        }
        Ok(())
    }

    fn merge_owned_into(
        &self,
        result: &mut ConfigNode,
        overlay: ConfigNode,
        depth: usize,
        path: &mut Vec<String>,
    ) -> Result<(), MergeError> {
        if depth > self.options.max_depth {
            let keys: Vec<&str> = path.iter().map(String::as_str).collect();
            return self.check_depth(depth, &keys);
        }

        for (key, incoming) in overlay {
            match (result.get_mut(&key), incoming) {
                (Some(ConfigValue::Mapping(current)), ConfigValue::Mapping(incoming)) => {
                    path.push(key);
                    self.merge_owned_into(current, incoming, depth + 1, path)?;
                    path.pop();
                }
                (_, incoming) => {
                    result.insert(key, incoming);
                }
            }
        }
        Ok(())
    }
}

/// Merge two values with default options
///
/// # Errors
/// See [`Merger::merge`]
#[inline]
pub fn merge(base: &ConfigValue, overlay: &ConfigValue) -> Result<ConfigNode, MergeError> {
    Merger::new().merge(base, overlay)
}

/// Merge two mappings with default options
///
/// # Errors
/// See [`Merger::merge_nodes`]
#[inline]
pub fn merge_nodes(base: &ConfigNode, overlay: &ConfigNode) -> Result<ConfigNode, MergeError> {
    Merger::new().merge_nodes(base, overlay)
}

/// Merge two owned mappings with default options
///
/// # Errors
/// See [`Merger::merge_owned`]
#[inline]
pub fn merge_owned(base: ConfigNode, overlay: ConfigNode) -> Result<ConfigNode, MergeError> {
    Merger::new().merge_owned(base, overlay)
}

/// Fold layers with default options
///
/// # Errors
/// See [`Merger::merge_layers`]
#[inline]
pub fn merge_layers<I>(layers: I) -> Result<ConfigNode, MergeError>
where
    I: IntoIterator<Item = ConfigNode>,
{
    Merger::new().merge_layers(layers)
}
