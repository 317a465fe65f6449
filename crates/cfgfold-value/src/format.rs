//! Configuration file formats
//!
//! JSON and YAML are decoded through `serde_json::Value`; TOML goes through
//! `toml::Value` so datetimes and non-finite floats get an explicit mapping.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ValueError;
use crate::value::{ConfigNode, ConfigValue};

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigFormat {
    /// `.json`
    Json,
    /// `.yaml` / `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl ConfigFormat {
    /// Detect format from a file extension
    ///
    /// # Errors
    /// Returns `ValueError::UnsupportedFormat` for unknown or missing extensions
    pub fn from_path(path: &Path) -> Result<Self, ValueError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
            .ok_or_else(|| ValueError::UnsupportedFormat(path.to_path_buf()))
    }

    /// Parse text into a value of any kind
    ///
    /// # Errors
    /// Returns the format's parse error
    pub fn parse(self, text: &str) -> Result<ConfigValue, ValueError> {
        match self {
            Self::Json => Ok(serde_json::from_str::<JsonValue>(text)?.into()),
            Self::Yaml => Ok(serde_yaml::from_str::<JsonValue>(text)?.into()),
            Self::Toml => Ok(from_toml(toml::from_str::<toml::Value>(text)?)),
        }
    }

    /// Parse text whose root must be a mapping
    ///
    /// An empty YAML document is treated as an empty mapping.
    ///
    /// # Errors
    /// Returns parse errors, or `ValueError::NotAMapping` for other roots
    pub fn parse_node(self, text: &str) -> Result<ConfigNode, ValueError> {
        if self == Self::Yaml && text.trim().is_empty() {
            return Ok(ConfigNode::new());
        }
        match self.parse(text)? {
            ConfigValue::Mapping(node) => Ok(node),
            ConfigValue::Null if self == Self::Yaml => Ok(ConfigNode::new()),
            other => Err(ValueError::NotAMapping(other.kind())),
        }
    }

    /// Render a node in this format
    ///
    /// # Errors
    /// Returns `ValueError::Serialization` if the encoder rejects the tree
    /// (TOML cannot encode null values)
    pub fn render(self, node: &ConfigNode) -> Result<String, ValueError> {
        match self {
            Self::Json => serde_json::to_string_pretty(node)
                .map_err(|e| ValueError::Serialization(e.to_string())),
            Self::Yaml => {
                serde_yaml::to_string(node).map_err(|e| ValueError::Serialization(e.to_string()))
            }
            Self::Toml => {
                toml::to_string_pretty(node).map_err(|e| ValueError::Serialization(e.to_string()))
            }
        }
    }

    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "toml" => Ok(Self::Toml),
            other => Err(format!("unknown config format: {other}")),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn from_toml(value: toml::Value) -> ConfigValue {
    match value {
        toml::Value::String(s) => ConfigValue::String(s),
        toml::Value::Integer(i) => ConfigValue::from(i),
        toml::Value::Float(f) => ConfigValue::from(f),
        toml::Value::Boolean(b) => ConfigValue::Bool(b),
        toml::Value::Datetime(dt) => ConfigValue::String(dt.to_string()),
        toml::Value::Array(items) => ConfigValue::Sequence(items.into_iter().map(from_toml).collect()),
        toml::Value::Table(table) => ConfigValue::Mapping(
            table
                .into_iter()
                .map(|(k, v)| (k, from_toml(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn detects_format_from_extension() {
        assert_eq!(ConfigFormat::from_path(Path::new("farm.config.json")).unwrap(), ConfigFormat::Json);
        assert_eq!(ConfigFormat::from_path(Path::new("a/b.YML")).unwrap(), ConfigFormat::Yaml);
        assert_eq!(ConfigFormat::from_path(Path::new("x.toml")).unwrap(), ConfigFormat::Toml);
        assert!(matches!(
            ConfigFormat::from_path(Path::new("farm.config.ts")),
            Err(ValueError::UnsupportedFormat(_))
        ));
        assert!(ConfigFormat::from_path(Path::new("Makefile")).is_err());
    }

    #[test]
    fn formats_agree_on_same_tree() {
        let json = ConfigFormat::Json
            .parse_node(r#"{"server": {"hmr": true, "port": 9000}, "plugins": ["react"]}"#)
            .unwrap();
        let yaml = ConfigFormat::Yaml
            .parse_node("server:\n  hmr: true\n  port: 9000\nplugins:\n  - react\n")
            .unwrap();
        let toml = ConfigFormat::Toml
            .parse_node("plugins = [\"react\"]\n[server]\nhmr = true\nport = 9000\n")
            .unwrap();

        assert_eq!(json, yaml);
        assert_eq!(json, toml);
    }

    #[test]
    fn toml_datetime_becomes_string() {
        let node = ConfigFormat::Toml.parse_node("built = 1979-05-27T07:32:00Z").unwrap();
        assert_eq!(node.get("built"), Some(&ConfigValue::from("1979-05-27T07:32:00Z")));
    }

    #[test]
    fn empty_yaml_is_empty_node() {
        assert!(ConfigFormat::Yaml.parse_node("").unwrap().is_empty());
    }

    #[test]
    fn non_mapping_root_rejected() {
        assert!(matches!(
            ConfigFormat::Json.parse_node("[1, 2]"),
            Err(ValueError::NotAMapping(crate::ValueKind::Sequence))
        ));
        assert!(matches!(
            ConfigFormat::Json.parse_node("{"),
            Err(ValueError::InvalidJson(_))
        ));
    }

    #[test]
    fn render_roundtrips() {
        let node = ConfigNode::new()
            .with("plugins", vec!["react", "less"])
            .with("compilation", ConfigNode::new().with("sourcemap", false));

        for format in [ConfigFormat::Json, ConfigFormat::Yaml, ConfigFormat::Toml] {
            let text = format.render(&node).unwrap();
            assert_eq!(format.parse_node(&text).unwrap(), node, "format {format}");
        }
    }
}
