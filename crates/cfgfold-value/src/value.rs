//! Configuration value model
//!
//! A configuration tree is a [`ConfigNode`] (string-keyed mapping) whose values
//! are [`ConfigValue`]s. The tag of a value decides how it takes part in a
//! merge: mappings recurse, everything else is replaced.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value as JsonValue};

/// Tag of a [`ConfigValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Absent / null value
    Null,
    /// Boolean primitive
    Bool,
    /// Numeric primitive
    Number,
    /// String primitive
    String,
    /// Ordered sequence
    Sequence,
    /// String-keyed mapping
    Mapping,
}

impl ValueKind {
    /// Check if this kind is a primitive (not a container)
    #[inline]
    #[must_use]
    pub fn is_primitive(self) -> bool {
        !matches!(self, Self::Sequence | Self::Mapping)
    }

    /// Lowercase name of the kind
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::String => "string",
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration value
///
/// Serializes untagged, so a tree round-trips through any self-describing
/// format (JSON, YAML, TOML) without wrapper objects.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Absent / null value
    #[default]
    Null,
    /// Boolean primitive
    Bool(bool),
    /// Numeric primitive
    Number(Number),
    /// String primitive
    String(String),
    /// Ordered sequence; merged by replacement, never element-wise
    Sequence(Vec<ConfigValue>),
    /// Nested mapping; merged recursively
    Mapping(ConfigNode),
}

impl ConfigValue {
    /// Tag of this value
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Number(_) => ValueKind::Number,
            Self::String(_) => ValueKind::String,
            Self::Sequence(_) => ValueKind::Sequence,
            Self::Mapping(_) => ValueKind::Mapping,
        }
    }

    /// Check if value is null
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow as mapping
    #[inline]
    #[must_use]
    pub fn as_mapping(&self) -> Option<&ConfigNode> {
        match self {
            Self::Mapping(node) => Some(node),
            _ => None,
        }
    }

    /// Borrow as mutable mapping
    #[inline]
    pub fn as_mapping_mut(&mut self) -> Option<&mut ConfigNode> {
        match self {
            Self::Mapping(node) => Some(node),
            _ => None,
        }
    }

    /// Borrow as sequence
    #[inline]
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read as boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Read as signed integer
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Read as float
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Consume into mapping
    #[inline]
    pub fn into_mapping(self) -> Option<ConfigNode> {
        match self {
            Self::Mapping(node) => Some(node),
            _ => None,
        }
    }

    /// Look up a value by dotted path (`server.hmr`)
    ///
    /// Sequence segments are addressed by index (`plugins.0`).
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&ConfigValue> {
        if path.is_empty() {
            return Some(self);
        }
        path.split('.').try_fold(self, |current, segment| match current {
            Self::Mapping(node) => node.get(segment),
            Self::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }

    /// Maximum nesting depth of containers (primitives are depth 0)
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Sequence(items) => 1 + items.iter().map(Self::depth).max().unwrap_or(0),
            Self::Mapping(node) => 1 + node.values().map(Self::depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    /// Convert to a `serde_json::Value`
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        match self {
            Self::Null => JsonValue::Null,
            Self::Bool(b) => JsonValue::Bool(*b),
            Self::Number(n) => JsonValue::Number(n.clone()),
            Self::String(s) => JsonValue::String(s.clone()),
            Self::Sequence(items) => JsonValue::Array(items.iter().map(Self::to_json).collect()),
            Self::Mapping(node) => JsonValue::Object(
                node.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Canonical string form with sorted keys
    ///
    /// Two values that compare equal produce identical canonical strings.
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        match self {
            Self::Mapping(node) => {
                let mut keys: Vec<_> = node.keys().collect();
                keys.sort();
                let parts: Vec<_> = keys
                    .into_iter()
                    .filter_map(|k| node.get(k).map(|v| format!("{:?}:{}", k, v.to_canonical_string())))
                    .collect();
                format!("{{{}}}", parts.join(","))
            }
            Self::Sequence(items) => {
                let parts: Vec<_> = items.iter().map(Self::to_canonical_string).collect();
                format!("[{}]", parts.join(","))
            }
            Self::String(s) => format!("{s:?}"),
            Self::Number(n) => n.to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Null => "null".to_string(),
        }
    }
}

impl From<JsonValue> for ConfigValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Bool(b),
            JsonValue::Number(n) => Self::Number(n),
            JsonValue::String(s) => Self::String(s),
            JsonValue::Array(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            JsonValue::Object(map) => Self::Mapping(
                map.into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<ConfigValue> for JsonValue {
    fn from(value: ConfigValue) -> Self {
        value.to_json()
    }
}

impl From<ConfigNode> for ConfigValue {
    fn from(node: ConfigNode) -> Self {
        Self::Mapping(node)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n).into())
    }
}

impl From<u64> for ConfigValue {
    fn from(n: u64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for ConfigValue {
    /// Non-finite floats have no configuration representation and become null.
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl<T: Into<ConfigValue>> From<Vec<T>> for ConfigValue {
    fn from(items: Vec<T>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConfigValue>> From<Option<T>> for ConfigValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// A mapping-typed configuration fragment
///
/// Keys are unique. Insertion order is kept for output, but equality ignores
/// it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigNode {
    entries: IndexMap<String, ConfigValue>,
}

impl ConfigNode {
    /// Create empty node
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty node with room for `capacity` keys
    #[inline]
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Builder-style insert
    #[inline]
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Insert a value, returning the previous one
    #[inline]
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a key, keeping the order of the remaining keys
    #[inline]
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.shift_remove(key)
    }

    /// Get value by key
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Get mutable value by key
    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut ConfigValue> {
        self.entries.get_mut(key)
    }

    /// Look up a value by dotted path
    #[inline]
    #[must_use]
    pub fn pointer(&self, path: &str) -> Option<&ConfigValue> {
        let (head, rest) = path.split_once('.').unwrap_or((path, ""));
        self.get(head).and_then(|v| v.pointer(rest))
    }

    /// Check if key exists
    #[inline]
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of keys
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if node has no keys
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate keys in insertion order
    #[inline]
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Iterate values in insertion order
    #[inline]
    pub fn values(&self) -> impl Iterator<Item = &ConfigValue> {
        self.entries.values()
    }

    /// Iterate entries in insertion order
    #[inline]
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, ConfigValue> {
        self.entries.iter()
    }

    /// Get the value at `key`, inserting an empty mapping if absent
    pub fn entry_mapping(&mut self, key: impl Into<String>) -> Option<&mut ConfigNode> {
        self.entries
            .entry(key.into())
            .or_insert_with(|| ConfigValue::Mapping(Self::new()))
            .as_mapping_mut()
    }

    /// Parse from a JSON string
    ///
    /// # Errors
    /// Returns error if the JSON is invalid or not an object
    pub fn from_json(json: &str) -> Result<Self, crate::ValueError> {
        crate::ConfigFormat::Json.parse_node(json)
    }

    /// Convert to a `serde_json::Value` object
    #[inline]
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        ConfigValue::Mapping(self.clone()).to_json()
    }

    /// Canonical string form with sorted keys
    #[inline]
    #[must_use]
    pub fn to_canonical_string(&self) -> String {
        ConfigValue::Mapping(self.clone()).to_canonical_string()
    }

    /// Total number of leaf (non-mapping) values in the tree
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.values()
            .map(|v| match v {
                ConfigValue::Mapping(child) => child.leaf_count(),
                _ => 1,
            })
            .sum()
    }
}

impl FromIterator<(String, ConfigValue)> for ConfigNode {
    fn from_iter<I: IntoIterator<Item = (String, ConfigValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ConfigNode {
    type Item = (String, ConfigValue);
    type IntoIter = indexmap::map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfigNode {
    type Item = (&'a String, &'a ConfigValue);
    type IntoIter = indexmap::map::Iter<'a, String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl TryFrom<JsonValue> for ConfigNode {
    type Error = crate::ValueError;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        let value = ConfigValue::from(value);
        let kind = value.kind();
        value
            .into_mapping()
            .ok_or(crate::ValueError::NotAMapping(kind))
    }
}

impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn kind_tags() {
        assert_eq!(ConfigValue::Null.kind(), ValueKind::Null);
        assert_eq!(ConfigValue::from(true).kind(), ValueKind::Bool);
        assert_eq!(ConfigValue::from(3).kind(), ValueKind::Number);
        assert_eq!(ConfigValue::from("x").kind(), ValueKind::String);
        assert_eq!(ConfigValue::from(vec![1, 2]).kind(), ValueKind::Sequence);
        assert_eq!(ConfigValue::from(ConfigNode::new()).kind(), ValueKind::Mapping);
        assert!(ValueKind::String.is_primitive());
        assert!(!ValueKind::Sequence.is_primitive());
    }

    #[test]
    fn json_roundtrip_keeps_order() {
        let json = json!({"z": 1, "a": {"c": [1, "two", null], "b": false}});
        let value = ConfigValue::from(json.clone());
        assert_eq!(value.to_json(), json);

        let node = value.as_mapping().unwrap();
        let keys: Vec<_> = node.keys().cloned().collect();
        assert_eq!(keys, vec!["z".to_string(), "a".to_string()]);
    }

    #[test]
    fn equality_ignores_key_order() {
        let a = ConfigNode::new().with("x", 1).with("y", 2);
        let b = ConfigNode::new().with("y", 2).with("x", 1);
        assert_eq!(a, b);
        assert_eq!(a.to_canonical_string(), b.to_canonical_string());
    }

    #[test]
    fn pointer_lookup() {
        let node = ConfigNode::try_from(json!({
            "compilation": {"output": {"path": "./build"}},
            "plugins": ["react", {"name": "less"}]
        }))
        .unwrap();

        assert_eq!(
            node.pointer("compilation.output.path"),
            Some(&ConfigValue::from("./build"))
        );
        assert_eq!(node.pointer("plugins.0"), Some(&ConfigValue::from("react")));
        assert_eq!(node.pointer("plugins.1.name"), Some(&ConfigValue::from("less")));
        assert_eq!(node.pointer("plugins.9"), None);
        assert_eq!(node.pointer("compilation.missing"), None);
    }

    #[test]
    fn non_object_json_is_not_a_node() {
        let result = ConfigNode::try_from(json!([1, 2]));
        assert!(matches!(
            result,
            Err(crate::ValueError::NotAMapping(ValueKind::Sequence))
        ));
    }

    #[test]
    fn depth_and_leaf_count() {
        let node = ConfigNode::try_from(json!({"a": 1, "b": {"c": {"d": [1]}}})).unwrap();
        assert_eq!(ConfigValue::from(node.clone()).depth(), 4);
        assert_eq!(node.leaf_count(), 2);
    }

    #[test]
    fn non_finite_float_is_null() {
        assert!(ConfigValue::from(f64::NAN).is_null());
    }

    #[test]
    fn serde_untagged() {
        let node = ConfigNode::new().with("hmr", true).with("port", 9000);
        let text = serde_json::to_string(&node).unwrap();
        assert_eq!(text, r#"{"hmr":true,"port":9000}"#);

        let back: ConfigNode = serde_json::from_str(&text).unwrap();
        assert_eq!(back, node);
    }
}
