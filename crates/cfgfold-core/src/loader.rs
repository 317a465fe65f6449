//! Layered configuration loading
//!
//! Sources are folded left to right in priority order: each later source is
//! the override argument of the next merge. Every contributing source is
//! recorded with its origin and, for files, a sha256 digest of the raw bytes.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cfgfold_merge::{MergeOptions, Merger};
use cfgfold_value::helpers::normalize_fs_path;
use cfgfold_value::{ConfigFormat, ConfigNode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CoreError;

/// Origin of a configuration source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "name")]
pub enum ConfigOrigin {
    /// Built-in defaults
    Builtin,
    /// Configuration file
    File,
    /// In-memory override (CLI flags, programmatic)
    Inline(String),
    /// Fragment contributed by a plugin config hook
    Plugin(String),
}

/// A contributing config source with provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSource {
    /// Origin of this source
    pub origin: ConfigOrigin,

    /// File path (files only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// Format the file was parsed as (files only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ConfigFormat>,

    /// SHA-256 of raw file bytes (files only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Number of top-level keys contributed
    pub keys: usize,
}

impl ConfigSource {
    fn in_memory(origin: ConfigOrigin, node: &ConfigNode) -> Self {
        Self {
            origin,
            path: None,
            format: None,
            digest: None,
            keys: node.len(),
        }
    }
}

/// Merged configuration plus the sources it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectiveConfig {
    /// The merged configuration
    pub config: ConfigNode,

    /// Contributing sources in precedence order (lowest first)
    pub sources: Vec<ConfigSource>,
}

/// Loader options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Options for the merge engine
    pub merge: MergeOptions,

    /// Maximum accepted size of a single source file, in bytes
    pub max_file_size: Option<u64>,
}

impl LoaderOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set merge options
    #[inline]
    #[must_use]
    pub fn with_merge(mut self, merge: MergeOptions) -> Self {
        self.merge = merge;
        self
    }

    /// Set maximum file size
    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = Some(bytes);
        self
    }
}

#[derive(Debug, Clone)]
enum Pending {
    Builtin(ConfigNode),
    File { path: PathBuf, required: bool },
    Inline { name: String, node: ConfigNode },
}

/// Builder that collects ordered sources and folds them into one config
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
    sources: Vec<Pending>,
}

impl ConfigLoader {
    /// Create empty loader
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create loader with options
    #[inline]
    #[must_use]
    pub fn with_options(options: LoaderOptions) -> Self {
        Self {
            options,
            sources: Vec::new(),
        }
    }

    /// Add built-in defaults (lowest precedence when added first)
    #[must_use]
    pub fn with_defaults(mut self, defaults: ConfigNode) -> Self {
        self.sources.push(Pending::Builtin(defaults));
        self
    }

    /// Add a file that must exist
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Pending::File {
            path: path.into(),
            required: true,
        });
        self
    }

    /// Add a file that is skipped when missing
    #[must_use]
    pub fn with_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Pending::File {
            path: path.into(),
            required: false,
        });
        self
    }

    /// Add an in-memory override
    #[must_use]
    pub fn with_inline(mut self, name: impl Into<String>, node: ConfigNode) -> Self {
        self.sources.push(Pending::Inline {
            name: name.into(),
            node,
        });
        self
    }

    /// Number of registered sources
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Check if no sources are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Read every source and fold them in registration order
    ///
    /// # Errors
    /// - `CoreError::SourceNotFound` for a missing required file
    /// - `CoreError::Io` / `CoreError::Value` for unreadable or malformed files
    /// - `CoreError::Merge` if folding fails
    #[tracing::instrument(level = "debug", skip(self), fields(sources = self.sources.len()))]
    pub async fn load(self) -> Result<EffectiveConfig, CoreError> {
        let merger = Merger::with_options(self.options.merge);
        let mut config = ConfigNode::new();
        let mut sources = Vec::with_capacity(self.sources.len());

        for pending in self.sources {
            let (node, source) = match pending {
                Pending::Builtin(node) => {
                    let source = ConfigSource::in_memory(ConfigOrigin::Builtin, &node);
                    (node, source)
                }
                Pending::Inline { name, node } => {
                    let source = ConfigSource::in_memory(ConfigOrigin::Inline(name), &node);
                    (node, source)
                }
                Pending::File { path, required } => {
                    match read_source(&path, required, self.options.max_file_size).await? {
                        Some(loaded) => loaded,
                        None => continue,
                    }
                }
            };

            tracing::info!(origin = ?source.origin, keys = source.keys, "loaded config source");
            config = merger.merge_owned(config, node)?;
            sources.push(source);
        }

        Ok(EffectiveConfig { config, sources })
    }
}

async fn read_source(
    path: &Path,
    required: bool,
    max_file_size: Option<u64>,
) -> Result<Option<(ConfigNode, ConfigSource)>, CoreError> {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(e) if e.kind() == ErrorKind::NotFound => return missing_source(path, required),
        Err(e) => return Err(CoreError::io_error(path, e)),
    };

    if let Some(limit) = max_file_size {
        if meta.len() > limit {
            return Err(CoreError::io_error(
                path,
                std::io::Error::new(
                    ErrorKind::InvalidData,
                    format!("file too large: {} bytes (max: {limit})", meta.len()),
                ),
            ));
        }
    }

    let format = ConfigFormat::from_path(path)?;
    // The file may vanish between the metadata call and the read
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return missing_source(path, required),
        Err(e) => return Err(CoreError::io_error(path, e)),
    };

    let digest = hex::encode(Sha256::digest(&bytes));
    let text = String::from_utf8(bytes).map_err(|e| {
        CoreError::io_error(
            path,
            std::io::Error::new(ErrorKind::InvalidData, e),
        )
    })?;
    let node = format.parse_node(&text)?;

    let source = ConfigSource {
        origin: ConfigOrigin::File,
        path: Some(normalize_fs_path(path)),
        format: Some(format),
        digest: Some(digest),
        keys: node.len(),
    };
    Ok(Some((node, source)))
}

fn missing_source(
    path: &Path,
    required: bool,
) -> Result<Option<(ConfigNode, ConfigSource)>, CoreError> {
    if required {
        return Err(CoreError::SourceNotFound(path.to_path_buf()));
    }
    tracing::debug!(path = %path.display(), "optional config source missing, skipping");
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cfgfold_value::ConfigValue;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[tokio::test]
    async fn folds_sources_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let user = dir.path().join("farm.config.json");
        fs::write(
            &user,
            r#"{"compilation": {"sourcemap": false, "output": {"path": "./build"}}, "plugins": ["react"]}"#,
        )
        .unwrap();
        let local = dir.path().join("farm.config.local.yaml");
        fs::write(&local, "compilation:\n  sourcemap: true\nplugins:\n  - less\n").unwrap();

        let defaults = ConfigNode::new()
            .with("compilation", ConfigNode::new().with("minify", true))
            .with("server", ConfigNode::new().with("hmr", true));

        let effective = ConfigLoader::new()
            .with_defaults(defaults)
            .with_file(&user)
            .with_optional_file(dir.path().join("missing.toml"))
            .with_file(&local)
            .with_inline("cli", ConfigNode::new().with("server", ConfigNode::new().with("port", 9000)))
            .load()
            .await
            .unwrap();

        let config = &effective.config;
        assert_eq!(config.pointer("compilation.minify"), Some(&ConfigValue::Bool(true)));
        assert_eq!(config.pointer("compilation.sourcemap"), Some(&ConfigValue::Bool(true)));
        assert_eq!(config.pointer("compilation.output.path"), Some(&ConfigValue::from("./build")));
        assert_eq!(config.get("plugins"), Some(&ConfigValue::from(vec!["less"])));
        assert_eq!(config.pointer("server.hmr"), Some(&ConfigValue::Bool(true)));
        assert_eq!(config.pointer("server.port"), Some(&ConfigValue::from(9000)));

        let origins: Vec<_> = effective.sources.iter().map(|s| s.origin.clone()).collect();
        assert_eq!(
            origins,
            vec![
                ConfigOrigin::Builtin,
                ConfigOrigin::File,
                ConfigOrigin::File,
                ConfigOrigin::Inline("cli".to_string()),
            ]
        );
        assert_eq!(effective.sources[1].format, Some(ConfigFormat::Json));
        assert_eq!(effective.sources[1].digest.as_ref().map(String::len), Some(64));
    }

    #[tokio::test]
    async fn missing_required_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::new()
            .with_file(dir.path().join("nope.json"))
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::SourceNotFound(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn unreadable_file_is_not_treated_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        std::os::unix::fs::symlink(&b, &a).unwrap();
        std::os::unix::fs::symlink(&a, &b).unwrap();

        let err = ConfigLoader::new()
            .with_optional_file(&a)
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Io { ref path, .. } if *path == a));

        let err = ConfigLoader::new().with_file(&a).load().await.unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[test]
    fn vanished_source_follows_required_flag() {
        let path = Path::new("gone.json");
        assert!(missing_source(path, false).unwrap().is_none());
        match missing_source(path, true) {
            Err(CoreError::SourceNotFound(p)) => assert_eq!(p, path),
            other => panic!("expected missing source, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = ConfigLoader::new().with_file(&path).load().await.unwrap_err();
        assert!(matches!(err, CoreError::Value(_)));
    }

    #[tokio::test]
    async fn oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.json");
        fs::write(&path, r#"{"padding": "0123456789"}"#).unwrap();

        let err = ConfigLoader::with_options(LoaderOptions::new().with_max_file_size(4))
            .with_file(&path)
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
    }

    #[tokio::test]
    async fn empty_loader_yields_empty_config() {
        let effective = ConfigLoader::new().load().await.unwrap();
        assert!(effective.config.is_empty());
        assert!(effective.sources.is_empty());
    }

    #[test]
    fn origin_serializes_tagged() {
        let json = serde_json::to_value(ConfigOrigin::Plugin("less".into())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "plugin", "name": "less"}));
    }
}
