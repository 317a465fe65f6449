//! Error types for value parsing and conversion

use std::path::PathBuf;

use crate::value::ValueKind;

/// Value and format errors
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// Invalid JSON text
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Invalid YAML text
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[from] serde_yaml::Error),

    /// Invalid TOML text
    #[error("invalid TOML: {0}")]
    InvalidToml(#[from] toml::de::Error),

    /// Serialization to an output format failed
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Document root must be a mapping
    #[error("expected a mapping at the document root, found {0}")]
    NotAMapping(ValueKind),

    /// No format known for the file extension
    #[error("unsupported config format: '{}'", .0.display())]
    UnsupportedFormat(PathBuf),
}
