//! cfgfold Async Flattener
//!
//! Resolves a sequence whose elements may be pending futures or nested
//! sequences (to any depth) into one flat, ordered list of leaves. Plugin
//! drivers use it on the collected return values of concurrently invoked
//! hooks.
//!
//! # Guarantees
//!
//! - Pending elements of one iteration are awaited concurrently
//! - Output order is structural (depth-first, left to right)
//! - Any failed element fails the whole call; no partial results
//! - A fully resolved input is returned without suspending
//!
//! # Example
//!
//! ```rust
//! use cfgfold_flatten::{flatten, Nested};
//!
//! # futures::executor::block_on(async {
//! let input = vec![
//!     Nested::deferred(async { Nested::<i32>::ready(1) }),
//!     Nested::seq([
//!         Nested::deferred(async { Nested::<i32>::values([2, 3]) }),
//!         Nested::deferred(async { Nested::<i32>::ready(4) }),
//!     ]),
//! ];
//! assert_eq!(flatten(input).await.unwrap(), vec![1, 2, 3, 4]);
//! # });
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod flattener;
mod nested;

pub use error::FlattenError;
pub use flattener::{flatten, FlattenOptions, FlattenStats, Flattener, DEFAULT_MAX_ITERATIONS};
pub use nested::{BoxError, Nested, PendingFuture};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
