//! Plugin config-hook driver
//!
//! Invokes every plugin's `config` hook concurrently, flattens the collected
//! (possibly nested, possibly pending) results into one ordered list of
//! fragments, and folds them into the user configuration.

use std::sync::Arc;

use cfgfold_flatten::{FlattenOptions, Flattener, Nested};
use cfgfold_merge::{MergeOptions, Merger};
use cfgfold_value::helpers::to_array;
use cfgfold_value::{ConfigNode, ConfigValue};
use futures::future::join_all;

use crate::error::{CoreError, PluginHookError};
use crate::loader::{ConfigOrigin, ConfigSource};
use crate::plugin::Plugin;

/// Key holding the plugin list in user configuration
pub const PLUGINS_KEY: &str = "plugins";

/// Result of config resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// User configuration with all plugin fragments applied
    pub config: ConfigNode,
    /// Plugin fragments in the order they were applied
    pub contributions: Vec<ConfigSource>,
}

/// Drives plugin config hooks
#[derive(Clone, Default)]
pub struct PluginDriver {
    plugins: Vec<Arc<dyn Plugin>>,
    merger: Merger,
    flattener: Flattener,
}

impl std::fmt::Debug for PluginDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDriver")
            .field("plugins", &self.plugin_names())
            .field("merger", &self.merger)
            .field("flattener", &self.flattener)
            .finish()
    }
}

impl PluginDriver {
    /// Create driver with no plugins
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set merge options
    #[inline]
    #[must_use]
    pub fn with_merge_options(mut self, options: MergeOptions) -> Self {
        self.merger = Merger::with_options(options);
        self
    }

    /// Set flatten options
    #[inline]
    #[must_use]
    pub fn with_flatten_options(mut self, options: FlattenOptions) -> Self {
        self.flattener = Flattener::with_options(options);
        self
    }

    /// Register a plugin; registration order is application order
    #[must_use]
    pub fn with_plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Arc::new(plugin));
        self
    }

    /// Register a shared plugin
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Registered plugin names, in order
    #[must_use]
    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Number of registered plugins
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Check if no plugins are registered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Invoke all `config` hooks and flatten their output
    ///
    /// Hooks run concurrently; the returned fragments keep plugin order, and
    /// within one plugin, the structural order of what it returned. Each
    /// fragment is paired with the name of the plugin that produced it.
    ///
    /// # Errors
    /// Returns `CoreError::Flatten` if any hook, or anything it returned,
    /// fails. The cause is a [`PluginHookError`] naming the plugin.
    #[tracing::instrument(level = "debug", skip_all, fields(plugins = self.plugins.len()))]
    pub async fn call_config_hooks(
        &self,
        config: &ConfigNode,
    ) -> Result<Vec<(String, ConfigNode)>, CoreError> {
        let shared = Arc::new(config.clone());

        let hooks: Vec<Nested<(String, ConfigNode)>> = self
            .plugins
            .iter()
            .map(|plugin| {
                let plugin = Arc::clone(plugin);
                let config = Arc::clone(&shared);
                Nested::pending(async move {
                    let name = plugin.name().to_string();
                    match plugin.config(&config).await {
                        Ok(contribution) => Ok(tag(&name, contribution.into_nested())),
                        Err(source) => Err(PluginHookError { plugin: name, source }),
                    }
                })
            })
            .collect();

        let fragments = self.flattener.flatten(hooks).await?;
        tracing::debug!(fragments = fragments.len(), "plugin config hooks resolved");
        Ok(fragments)
    }

    /// Apply every plugin fragment to `user_config`, then notify plugins
    ///
    /// Fragments are folded left to right in plugin order, each as the
    /// override argument of one merge.
    ///
    /// # Errors
    /// - `CoreError::Flatten` if a `config` hook fails
    /// - `CoreError::Merge` if a fragment cannot be merged
    /// - `CoreError::Hook` if a `config_resolved` hook fails
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn resolve_config(&self, user_config: ConfigNode) -> Result<ResolvedConfig, CoreError> {
        let fragments = self.call_config_hooks(&user_config).await?;

        let mut config = user_config;
        let mut contributions = Vec::with_capacity(fragments.len());
        for (plugin, fragment) in fragments {
            tracing::info!(plugin = %plugin, keys = fragment.len(), "applying plugin config");
            contributions.push(ConfigSource {
                origin: ConfigOrigin::Plugin(plugin),
                path: None,
                format: None,
                digest: None,
                keys: fragment.len(),
            });
            config = self.merger.merge_owned(config, fragment)?;
        }

        self.notify_resolved(&config).await?;
        Ok(ResolvedConfig {
            config,
            contributions,
        })
    }

    async fn notify_resolved(&self, config: &ConfigNode) -> Result<(), CoreError> {
        let outcomes = join_all(self.plugins.iter().map(|p| p.config_resolved(config))).await;
        for (plugin, outcome) in self.plugins.iter().zip(outcomes) {
            if let Err(source) = outcome {
                tracing::warn!(plugin = plugin.name(), error = %source, "config_resolved hook failed");
                return Err(CoreError::Hook {
                    plugin: plugin.name().to_string(),
                    hook: "config_resolved",
                    source,
                });
            }
        }
        Ok(())
    }

    /// Plugin entries declared in user configuration
    ///
    /// A single entry is treated as a one-element list; a missing key as none.
    #[must_use]
    pub fn declared_plugins(config: &ConfigNode) -> Vec<ConfigValue> {
        to_array(config.get(PLUGINS_KEY).cloned().unwrap_or_default())
    }
}

/// Attach the plugin name to every leaf, including ones still pending
fn tag(name: &str, nested: Nested<ConfigNode>) -> Nested<(String, ConfigNode)> {
    match nested {
        Nested::Ready(node) => Nested::Ready((name.to_string(), node)),
        Nested::Seq(items) => Nested::Seq(items.into_iter().map(|item| tag(name, item)).collect()),
        Nested::Pending(future) => {
            let name = name.to_string();
            Nested::pending(async move {
                match future.await {
                    Ok(inner) => Ok(tag(&name, inner)),
                    Err(source) => Err(PluginHookError { plugin: name, source }),
                }
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::{Contribution, StaticPlugin};
    use cfgfold_flatten::BoxError;
    use pretty_assertions::assert_eq;

    #[test]
    fn declared_plugins_normalized() {
        let none = ConfigNode::new();
        assert!(PluginDriver::declared_plugins(&none).is_empty());

        let single = ConfigNode::new().with("plugins", "@farmfe/plugin-react");
        assert_eq!(
            PluginDriver::declared_plugins(&single),
            vec![ConfigValue::from("@farmfe/plugin-react")]
        );

        let list = ConfigNode::new().with("plugins", vec!["react", "less"]);
        assert_eq!(PluginDriver::declared_plugins(&list).len(), 2);
    }

    #[test]
    fn debug_lists_plugin_names() {
        let driver = PluginDriver::new().with_plugin(StaticPlugin::new("less", ConfigNode::new()));
        assert!(format!("{driver:?}").contains("less"));
        assert_eq!(driver.len(), 1);
        assert!(!driver.is_empty());
    }

    #[tokio::test]
    async fn pending_leaves_keep_plugin_name() {
        let nested = Nested::seq([
            Nested::ready(ConfigNode::new().with("a", 1)),
            Nested::deferred(async { Nested::<ConfigNode>::ready(ConfigNode::new().with("b", 2)) }),
        ]);
        let tagged = tag("multi", nested);

        let out = Flattener::new().flatten(vec![tagged]).await.unwrap();
        let names: Vec<_> = out.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["multi", "multi"]);
    }

    #[tokio::test]
    async fn nested_failure_names_plugin() {
        let nested = Nested::seq([Nested::pending(async {
            Err::<Nested<ConfigNode>, _>(BoxError::from("late failure"))
        })]);
        let err = Flattener::new()
            .flatten(vec![tag("broken", nested)])
            .await
            .unwrap_err();
        let err = CoreError::from(err);
        assert_eq!(err.plugin(), Some("broken"));
    }

    #[tokio::test]
    async fn empty_driver_returns_user_config() {
        let user = ConfigNode::new().with("root", ".");
        let resolved = PluginDriver::new().resolve_config(user.clone()).await.unwrap();
        assert_eq!(resolved.config, user);
        assert!(resolved.contributions.is_empty());
    }

    #[test]
    fn contribution_from_nested() {
        let c = Contribution::from(Nested::<ConfigNode>::seq([]));
        assert!(matches!(c, Contribution::Nested(_)));
    }
}
