//! Error types for the merge engine

use std::fmt;

use cfgfold_value::ValueKind;

/// Which argument of a merge call was at fault
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeArgument {
    /// The lower-precedence tree
    Base,
    /// The higher-precedence tree
    Override,
}

impl fmt::Display for MergeArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::Override => f.write_str("override"),
        }
    }
}

/// Merge failures
///
/// Both variants indicate a caller bug; neither is retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// A merge argument was not a mapping
    #[error("merge expects mappings, but the {argument} argument is a {found}")]
    InvalidInputKind {
        /// Offending argument
        argument: MergeArgument,
        /// Kind that was found instead
        found: ValueKind,
    },

    /// Recursion went past the depth limit
    #[error("merge recursion exceeded depth {depth} at '{path}' (cyclic or runaway structure)")]
    CyclicStructure {
        /// Configured depth limit
        depth: usize,
        /// Dotted key path where the limit was hit
        path: String,
    },
}

impl MergeError {
    /// Create invalid input error
    #[inline]
    pub fn invalid_input(argument: MergeArgument, found: ValueKind) -> Self {
        Self::InvalidInputKind { argument, found }
    }

    /// Create cyclic structure error from a key path
    #[inline]
    pub fn cyclic(depth: usize, path: &[&str]) -> Self {
        Self::CyclicStructure {
            depth,
            path: path.join("."),
        }
    }

    /// Merge errors are always caller bugs, never transient
    #[inline]
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::InvalidInputKind { .. } | Self::CyclicStructure { .. })
    }
}
