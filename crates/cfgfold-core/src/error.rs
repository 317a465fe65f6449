//! Error types for config loading and plugin resolution
//!
//! Provides error handling for:
//! - Source files that are missing, unreadable, or malformed
//! - Merge failures while folding sources and plugin fragments
//! - Plugin hooks that fail or resolve to errors

use std::path::PathBuf;

use cfgfold_flatten::{BoxError, FlattenError};
use cfgfold_merge::MergeError;
use cfgfold_value::ValueError;

/// Main cfgfold error type
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Source parsing or format detection failed
    #[error("config value error: {0}")]
    Value(#[from] ValueError),

    /// Merge failed
    #[error("merge failed: {0}")]
    Merge(#[from] MergeError),

    /// Flattening plugin output failed
    #[error("plugin output resolution failed: {0}")]
    Flatten(#[from] FlattenError),

    /// Required source file does not exist
    #[error("config source not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// IO error reading a source
    #[error("io error reading {}: {source}", path.display())]
    Io {
        /// Source path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// A post-resolution hook failed
    #[error("plugin '{plugin}' failed in {hook}: {source}")]
    Hook {
        /// Plugin name
        plugin: String,
        /// Hook name
        hook: &'static str,
        /// Underlying error
        #[source]
        source: BoxError,
    },
}

impl CoreError {
    /// Create IO error for path
    #[inline]
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Name of the plugin behind this failure, if any
    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        match self {
            Self::Hook { plugin, .. } => Some(plugin),
            Self::Flatten(err) => err
                .cause()
                .and_then(|cause| cause.downcast_ref::<PluginHookError>())
                .map(|e| e.plugin.as_str()),
            _ => None,
        }
    }

    /// Check if error is caused by a caller bug rather than input data
    #[inline]
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(self, Self::Merge(e) if e.is_programming_error())
    }
}

/// Failure of a single plugin's config hook
///
/// Carried as the cause of `FlattenError::ElementResolutionFailed`.
#[derive(Debug, thiserror::Error)]
#[error("plugin '{plugin}' config hook failed: {source}")]
pub struct PluginHookError {
    /// Plugin name
    pub plugin: String,
    /// Underlying error
    #[source]
    pub source: BoxError,
}
