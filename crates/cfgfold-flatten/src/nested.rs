//! Nested, partially pending sequences

use std::fmt;
use std::future::Future;

use futures::future::{BoxFuture, FutureExt};

/// Boxed error carried by a failed pending element
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Future behind a pending element
///
/// Resolves to another element, which may itself be a sequence or pending.
pub type PendingFuture<T> = BoxFuture<'static, Result<Nested<T>, BoxError>>;

/// One element of a nested sequence
pub enum Nested<T> {
    /// Fully resolved leaf
    Ready(T),
    /// Nested sequence, spliced in place when flattened
    Seq(Vec<Nested<T>>),
    /// Value not yet available
    Pending(PendingFuture<T>),
}

impl<T> Nested<T> {
    /// Resolved leaf
    #[inline]
    pub fn ready(value: T) -> Self {
        Self::Ready(value)
    }

    /// Sequence of elements
    #[inline]
    pub fn seq(items: impl IntoIterator<Item = Nested<T>>) -> Self {
        Self::Seq(items.into_iter().collect())
    }

    /// Sequence of resolved leaves
    #[inline]
    pub fn values(items: impl IntoIterator<Item = T>) -> Self {
        Self::Seq(items.into_iter().map(Self::Ready).collect())
    }

    /// Element backed by a fallible future
    pub fn pending<F, N, E>(future: F) -> Self
    where
        F: Future<Output = Result<N, E>> + Send + 'static,
        N: Into<Nested<T>>,
        E: Into<BoxError>,
    {
        Self::Pending(
            future
                .map(|outcome| outcome.map(Into::into).map_err(Into::into))
                .boxed(),
        )
    }

    /// Element backed by a future that cannot fail
    pub fn deferred<F, N>(future: F) -> Self
    where
        F: Future<Output = N> + Send + 'static,
        N: Into<Nested<T>>,
    {
        Self::Pending(future.map(|value| Ok(value.into())).boxed())
    }

    /// Check if element is pending
    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Check if element and all its descendants are resolved
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        match self {
            Self::Ready(_) => true,
            Self::Seq(items) => items.iter().all(Self::is_resolved),
            Self::Pending(_) => false,
        }
    }
}

impl<T> From<Vec<Nested<T>>> for Nested<T> {
    fn from(items: Vec<Nested<T>>) -> Self {
        Self::Seq(items)
    }
}

impl<T> FromIterator<Nested<T>> for Nested<T> {
    fn from_iter<I: IntoIterator<Item = Nested<T>>>(iter: I) -> Self {
        Self::Seq(iter.into_iter().collect())
    }
}

impl<T: fmt::Debug> fmt::Debug for Nested<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Seq(items) => f.debug_list().entries(items).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolved_checks() {
        let resolved: Nested<i32> = Nested::seq([Nested::ready(1), Nested::values([2, 3])]);
        assert!(resolved.is_resolved());
        assert!(!resolved.is_pending());

        let partial: Nested<i32> = Nested::seq([
            Nested::ready(1),
            Nested::seq([Nested::deferred(async { Nested::<i32>::ready(2) })]),
        ]);
        assert!(!partial.is_resolved());
    }

    #[test]
    fn debug_hides_futures() {
        let nested: Nested<i32> = Nested::seq([Nested::ready(1), Nested::deferred(async { Nested::<i32>::ready(2) })]);
        assert_eq!(format!("{nested:?}"), "[Ready(1), Pending(..)]");
    }
}
