//! Plugin config hooks
//!
//! A plugin may contribute partial configuration through its `config` hook.
//! The hook is asynchronous and may return nothing, one fragment, or a nested
//! sequence of fragments, some of which may still be pending.

use async_trait::async_trait;
use cfgfold_flatten::{BoxError, Nested};
use cfgfold_value::ConfigNode;

/// What a plugin's `config` hook hands back
#[derive(Debug)]
pub enum Contribution {
    /// Nothing to add
    None,
    /// A single partial configuration
    Fragment(ConfigNode),
    /// Several fragments, possibly nested or still pending
    Nested(Nested<ConfigNode>),
}

impl Contribution {
    /// Convert into a nested-sequence element
    #[must_use]
    pub fn into_nested(self) -> Nested<ConfigNode> {
        match self {
            Self::None => Nested::Seq(Vec::new()),
            Self::Fragment(node) => Nested::Ready(node),
            Self::Nested(nested) => nested,
        }
    }
}

impl From<ConfigNode> for Contribution {
    fn from(node: ConfigNode) -> Self {
        Self::Fragment(node)
    }
}

impl From<Option<ConfigNode>> for Contribution {
    fn from(node: Option<ConfigNode>) -> Self {
        node.map_or(Self::None, Self::Fragment)
    }
}

impl From<Vec<ConfigNode>> for Contribution {
    fn from(nodes: Vec<ConfigNode>) -> Self {
        Self::Nested(Nested::values(nodes))
    }
}

impl From<Nested<ConfigNode>> for Contribution {
    fn from(nested: Nested<ConfigNode>) -> Self {
        Self::Nested(nested)
    }
}

/// Build-tool plugin, as seen by config resolution
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Plugin name, used in provenance and error reports
    fn name(&self) -> &str;

    /// Contribute partial configuration
    ///
    /// `config` is the user configuration before any plugin fragment is
    /// applied.
    async fn config(&self, config: &ConfigNode) -> Result<Contribution, BoxError>;

    /// Observe the fully resolved configuration
    async fn config_resolved(&self, _config: &ConfigNode) -> Result<(), BoxError> {
        Ok(())
    }
}

/// Plugin that contributes a fixed fragment
///
/// Covers declarative plugin entries whose configuration is known up front.
#[derive(Debug, Clone)]
pub struct StaticPlugin {
    name: String,
    fragment: ConfigNode,
}

impl StaticPlugin {
    /// Create plugin contributing `fragment`
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, fragment: ConfigNode) -> Self {
        Self {
            name: name.into(),
            fragment,
        }
    }
}

#[async_trait]
impl Plugin for StaticPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn config(&self, _config: &ConfigNode) -> Result<Contribution, BoxError> {
        Ok(Contribution::Fragment(self.fragment.clone()))
    }
}
