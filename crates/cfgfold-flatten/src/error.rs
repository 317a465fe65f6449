//! Error types for the flattener

use crate::nested::BoxError;

/// Flatten failures
///
/// No partial result accompanies either variant.
#[derive(Debug, thiserror::Error)]
pub enum FlattenError {
    /// A pending element resolved to an error
    #[error("element {index} failed to resolve in iteration {iteration}: {source}")]
    ElementResolutionFailed {
        /// Iteration (1-based) in which the failure surfaced
        iteration: usize,
        /// Position of the element in that iteration's working sequence
        index: usize,
        /// Underlying cause
        #[source]
        source: BoxError,
    },

    /// Pending elements kept producing further pending elements
    #[error("flatten did not converge within {limit} iterations")]
    IterationLimitExceeded {
        /// Configured iteration limit
        limit: usize,
    },
}

impl FlattenError {
    /// Check if this wraps a failed element
    #[inline]
    #[must_use]
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::ElementResolutionFailed { .. })
    }

    /// Underlying cause of a failed element
    #[must_use]
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::ElementResolutionFailed { source, .. } => Some(source.as_ref()),
            Self::IterationLimitExceeded { .. } => None,
        }
    }
}
