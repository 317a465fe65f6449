//! cfgfold Merge Engine
//!
//! Recursive deep-merge of mapping-typed configuration trees, used to fold a
//! user configuration together with the fragments plugins contribute.
//!
//! # Rules
//!
//! - Mappings merge key by key, recursively
//! - Sequences are replaced wholesale (plugin lists are positional)
//! - Every other value: the override wins
//!
//! # Example
//!
//! ```rust
//! use cfgfold_merge::merge_nodes;
//! use cfgfold_value::ConfigNode;
//!
//! let base = ConfigNode::new()
//!     .with("a", 1)
//!     .with("b", ConfigNode::new().with("c", 2));
//! let overlay = ConfigNode::new()
//!     .with("b", ConfigNode::new().with("d", 3))
//!     .with("e", 4);
//!
//! let merged = merge_nodes(&base, &overlay).unwrap();
//! assert_eq!(merged.pointer("b.c").and_then(|v| v.as_i64()), Some(2));
//! assert_eq!(merged.pointer("b.d").and_then(|v| v.as_i64()), Some(3));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod engine;
mod error;

pub use engine::{
    merge, merge_layers, merge_nodes, merge_owned, MergeOptions, Merger, DEFAULT_MAX_DEPTH,
};
pub use error::{MergeArgument, MergeError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
