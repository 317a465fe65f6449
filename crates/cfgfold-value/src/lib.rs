//! cfgfold Value Model
//!
//! Tagged configuration trees shared by the merge engine, the loader, and
//! plugin drivers.
//!
//! # Core Concepts
//!
//! - [`ConfigValue`]: `Null | Bool | Number | String | Sequence | Mapping`
//! - [`ConfigNode`]: String-keyed mapping, the unit every merge operates on
//! - [`ConfigFormat`]: JSON / YAML / TOML parsing and rendering
//! - [`helpers`]: Primitive predicates and coercions (`is_object`, `to_array`, ...)
//!
//! # Example
//!
//! ```rust
//! use cfgfold_value::{ConfigFormat, ConfigValue};
//!
//! let node = ConfigFormat::Json
//!     .parse_node(r#"{"server": {"hmr": true}}"#)
//!     .unwrap();
//! assert_eq!(node.pointer("server.hmr"), Some(&ConfigValue::Bool(true)));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod format;
pub mod helpers;
mod value;

pub use error::ValueError;
pub use format::ConfigFormat;
pub use value::{ConfigNode, ConfigValue, ValueKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
