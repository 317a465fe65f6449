//! Worklist flattener
//!
//! Each iteration awaits the current batch of pending elements concurrently,
//! then splices every structurally available nested sequence in place
//! (depth-first, left to right). Elements revealed by a resolution stay where
//! they landed, so the output order is the structural order of the input,
//! never the completion order of its futures.

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use crate::error::FlattenError;
use crate::nested::{Nested, PendingFuture};

/// Default iteration limit
pub const DEFAULT_MAX_ITERATIONS: usize = 1024;

/// Flattener options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlattenOptions {
    /// Maximum number of resolve-and-splice iterations
    pub max_iterations: usize,
}

impl FlattenOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set iteration limit
    #[inline]
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Statistics for one flatten call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenStats {
    /// Iterations that awaited a batch (0 when the input was already resolved)
    pub iterations: usize,
    /// Pending elements awaited across all iterations
    pub resolved: usize,
}

/// Working-sequence slot: either a leaf or something still to await
enum Slot<T> {
    Ready(T),
    Pending(PendingFuture<T>),
}

/// Async flattener
///
/// Holds no state between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flattener {
    options: FlattenOptions,
}

impl Flattener {
    /// Create flattener with default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create flattener with options
    #[inline]
    #[must_use]
    pub fn with_options(options: FlattenOptions) -> Self {
        Self { options }
    }

    /// Get options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &FlattenOptions {
        &self.options
    }

    /// Resolve and flatten `input` into its leaves
    ///
    /// # Errors
    /// - `FlattenError::ElementResolutionFailed` if any pending element fails
    /// - `FlattenError::IterationLimitExceeded` if resolution does not converge
    pub async fn flatten<T: Send>(&self, input: Vec<Nested<T>>) -> Result<Vec<T>, FlattenError> {
        self.flatten_with_stats(input).await.map(|(values, _)| values)
    }

    /// Like [`Flattener::flatten`], also reporting iteration statistics
    ///
    /// # Errors
    /// See [`Flattener::flatten`]
    #[tracing::instrument(level = "debug", skip_all, fields(len = input.len()))]
    pub async fn flatten_with_stats<T: Send>(
        &self,
        input: Vec<Nested<T>>,
    ) -> Result<(Vec<T>, FlattenStats), FlattenError> {
        let mut stats = FlattenStats::default();
        let mut working = splice(input);

        loop {
            let pending = working
                .iter()
                .filter(|slot| matches!(slot, Slot::Pending(_)))
                .count();
            if pending == 0 {
                break;
            }

            stats.iterations += 1;
            if stats.iterations > self.options.max_iterations {
                tracing::warn!(limit = self.options.max_iterations, "flatten did not converge");
                return Err(FlattenError::IterationLimitExceeded {
                    limit: self.options.max_iterations,
                });
            }

            tracing::debug!(
                iteration = stats.iterations,
                pending,
                len = working.len(),
                "awaiting pending batch"
            );
            stats.resolved += pending;

            // join_all waits for every element to settle before we look at errors
            let settled = join_all(working.into_iter().map(|slot| async move {
                match slot {
                    Slot::Ready(value) => Ok(Nested::Ready(value)),
                    Slot::Pending(future) => future.await,
                }
            }))
            .await;

            let mut resolved = Vec::with_capacity(settled.len());
            for (index, outcome) in settled.into_iter().enumerate() {
                match outcome {
                    Ok(element) => resolved.push(element),
                    Err(source) => {
                        tracing::warn!(
                            iteration = stats.iterations,
                            index,
                            error = %source,
                            "pending element failed"
                        );
                        return Err(FlattenError::ElementResolutionFailed {
                            iteration: stats.iterations,
                            index,
                            source,
                        });
                    }
                }
            }

            working = splice(resolved);
        }

        let values = working
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Ready(value) => Some(value),
                Slot::Pending(_) => None,
            })
            .collect::<Vec<_>>();
        tracing::debug!(
            leaves = values.len(),
            iterations = stats.iterations,
            "flatten converged"
        );
        Ok((values, stats))
    }
}

/// Resolve and flatten `input` with default options
///
/// # Errors
/// See [`Flattener::flatten`]
pub async fn flatten<T: Send>(input: Vec<Nested<T>>) -> Result<Vec<T>, FlattenError> {
    Flattener::new().flatten(input).await
}

/// Splice all structurally available nesting, depth-first, left to right
fn splice<T>(input: Vec<Nested<T>>) -> Vec<Slot<T>> {
    let mut out = Vec::with_capacity(input.len());
    let mut stack = vec![input.into_iter()];

    while let Some(top) = stack.last_mut() {
        match top.next() {
            Some(Nested::Ready(value)) => out.push(Slot::Ready(value)),
            Some(Nested::Pending(future)) => out.push(Slot::Pending(future)),
            Some(Nested::Seq(children)) => stack.push(children.into_iter()),
            None => {
                stack.pop();
            }
        }
    }
    out
}
