//! Primitive helpers shared by loaders and plugin drivers

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use crate::value::{ConfigNode, ConfigValue};

/// Check if value is a mapping
#[inline]
#[must_use]
pub fn is_object(value: &ConfigValue) -> bool {
    matches!(value, ConfigValue::Mapping(_))
}

/// Check if value is a sequence
#[inline]
#[must_use]
pub fn is_array(value: &ConfigValue) -> bool {
    matches!(value, ConfigValue::Sequence(_))
}

/// Check if a mapping has no keys
#[inline]
#[must_use]
pub fn is_empty_object(node: &ConfigNode) -> bool {
    node.is_empty()
}

/// Coerce a value into a sequence
///
/// Null becomes an empty sequence, a sequence is returned as is, anything
/// else is wrapped.
#[must_use]
pub fn to_array(value: ConfigValue) -> Vec<ConfigValue> {
    match value {
        ConfigValue::Null => Vec::new(),
        ConfigValue::Sequence(items) => items,
        other => vec![other],
    }
}

/// POSIX-style lexical normalization
///
/// Collapses `.` segments and repeated separators and resolves `..` against
/// preceding segments. Leading `..` segments of relative paths are kept;
/// `..` at the root is dropped. Separators are always `/`. An empty result
/// is `.`, and a trailing separator is preserved.
#[must_use]
pub fn normalize_path(id: &str) -> String {
    if id.is_empty() {
        return ".".to_string();
    }

    let absolute = id.starts_with('/');
    let trailing = id.len() > 1 && id.ends_with('/');
    let mut parts: Vec<&str> = Vec::new();

    for segment in id.split('/') {
        match segment {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                _ if !absolute => parts.push(".."),
                _ => {}
            },
            other => parts.push(other),
        }
    }

    let mut out = parts.join("/");
    if absolute {
        out.insert(0, '/');
    }
    if out.is_empty() {
        out.push('.');
    }
    if trailing && !out.ends_with('/') {
        out.push('/');
    }
    out
}

/// Lexically normalize a filesystem path (no symlink resolution)
#[must_use]
pub fn normalize_fs_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Stat a file, returning `None` if it does not exist or cannot be read
///
/// Errors other than "not found" are logged.
#[must_use]
pub fn stat_file(path: impl AsRef<Path>) -> Option<Metadata> {
    let path = path.as_ref();
    match std::fs::metadata(path) {
        Ok(meta) => Some(meta),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            tracing::error!("error accessing file {}: {}", path.display(), e);
            None
        }
    }
}

/// Indent every line of `source` by `n` spaces
#[must_use]
pub fn pad(source: &str, n: usize) -> String {
    let indent = " ".repeat(n);
    source
        .lines()
        .map(|line| format!("{indent}{line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
