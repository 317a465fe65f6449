//! cfgfold Core
//!
//! Ties the merge engine and the async flattener to the two stages that call
//! them:
//! - [`ConfigLoader`]: folds defaults, config files, and inline overrides in
//!   priority order, recording provenance for each source
//! - [`PluginDriver`]: runs plugin `config` hooks concurrently, flattens what
//!   they return, and folds the fragments into the user configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use cfgfold_core::{ConfigLoader, PluginDriver, StaticPlugin};
//! use cfgfold_value::ConfigNode;
//!
//! # async fn example() -> Result<(), cfgfold_core::CoreError> {
//! let effective = ConfigLoader::new()
//!     .with_file("farm.config.json")
//!     .with_optional_file("farm.config.local.yaml")
//!     .load()
//!     .await?;
//!
//! let driver = PluginDriver::new()
//!     .with_plugin(StaticPlugin::new("less", ConfigNode::new().with("css", true)));
//! let resolved = driver.resolve_config(effective.config).await?;
//! println!("{}", resolved.config);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod driver;
pub mod error;
pub mod loader;
pub mod plugin;

pub use driver::{PluginDriver, ResolvedConfig, PLUGINS_KEY};
pub use error::{CoreError, PluginHookError};
pub use loader::{ConfigLoader, ConfigOrigin, ConfigSource, EffectiveConfig, LoaderOptions};
pub use plugin::{Contribution, Plugin, StaticPlugin};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for resolving build configuration
    pub use crate::{
        ConfigLoader, Contribution, CoreError, EffectiveConfig, Plugin, PluginDriver,
        ResolvedConfig, StaticPlugin,
    };
    pub use cfgfold_flatten::{BoxError, Nested};
    pub use cfgfold_value::{ConfigNode, ConfigValue};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
