//! Ordering, concurrency, and equivalence tests for the flattener.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cfgfold_flatten::{flatten, FlattenError, Flattener, Nested};
use proptest::prelude::*;
use tokio::sync::oneshot;

/// Shape used to build random nested inputs
#[derive(Debug, Clone)]
enum Shape {
    Leaf(u32),
    Pending(Box<Shape>),
    Seq(Vec<Shape>),
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = any::<u32>().prop_map(Shape::Leaf);
    leaf.prop_recursive(6, 64, 6, |inner| {
        prop_oneof![
            inner.clone().prop_map(|s| Shape::Pending(Box::new(s))),
            proptest::collection::vec(inner, 0..6).prop_map(Shape::Seq),
        ]
    })
}

fn build(shape: &Shape) -> Nested<u32> {
    match shape {
        Shape::Leaf(v) => Nested::ready(*v),
        Shape::Pending(inner) => {
            let inner = build(inner);
            Nested::deferred(async move { inner })
        }
        Shape::Seq(items) => Nested::seq(items.iter().map(build)),
    }
}

fn depth_first(shape: &Shape, out: &mut Vec<u32>) {
    match shape {
        Shape::Leaf(v) => out.push(*v),
        Shape::Pending(inner) => depth_first(inner, out),
        Shape::Seq(items) => items.iter().for_each(|s| depth_first(s, out)),
    }
}

proptest! {
    #[test]
    fn prop_flatten_matches_depth_first_order(shapes in proptest::collection::vec(shape_strategy(), 0..8)) {
        let mut expected = Vec::new();
        shapes.iter().for_each(|s| depth_first(s, &mut expected));

        let input: Vec<Nested<u32>> = shapes.iter().map(build).collect();
        let actual = futures::executor::block_on(flatten(input)).unwrap();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_any_failure_fails_whole_call(values in proptest::collection::vec(any::<u32>(), 0..10), position in 0usize..10) {
        let mut input: Vec<Nested<u32>> = values.iter().copied().map(Nested::ready).collect();
        let position = position.min(input.len());
        input.insert(
            position,
            Nested::pending(async { Err::<Nested<u32>, _>(std::io::Error::other("hook failed")) }),
        );

        let result = futures::executor::block_on(flatten(input));
        let failed = matches!(result, Err(FlattenError::ElementResolutionFailed { .. }));
        prop_assert!(failed, "expected element resolution failure");
    }
}

/// Completion order is the reverse of structural order; output follows structure.
#[tokio::test]
async fn order_is_structural_not_completion() {
    let (tx1, rx1) = oneshot::channel::<u32>();
    let (tx2, rx2) = oneshot::channel::<u32>();
    let (tx3, rx3) = oneshot::channel::<u32>();

    let input = vec![
        Nested::pending(async move { rx1.await.map(Nested::ready) }),
        Nested::seq([
            Nested::pending(async move { rx2.await.map(Nested::ready) }),
            Nested::pending(async move { rx3.await.map(Nested::ready) }),
        ]),
    ];

    tokio::spawn(async move {
        tx3.send(3).unwrap();
        tokio::task::yield_now().await;
        tx2.send(2).unwrap();
        tokio::task::yield_now().await;
        tx1.send(1).unwrap();
    });

    assert_eq!(flatten(input).await.unwrap(), vec![1, 2, 3]);
}

/// A sibling blocked on a later event does not stop others from progressing.
#[tokio::test]
async fn batch_is_awaited_concurrently() {
    let started = Arc::new(AtomicUsize::new(0));
    let (tx, rx) = oneshot::channel::<()>();

    let gate_started = Arc::clone(&started);
    let gated = Nested::pending(async move {
        gate_started.fetch_add(1, Ordering::SeqCst);
        rx.await.map(|()| Nested::ready("gated"))
    });

    let opener_started = Arc::clone(&started);
    let opener = Nested::deferred(async move {
        opener_started.fetch_add(1, Ordering::SeqCst);
        tx.send(()).ok();
        Nested::ready("opener")
    });

    // Sequential awaiting would deadlock here: the gate opens only when the
    // second element runs.
    let values = flatten(vec![gated, opener]).await.unwrap();
    assert_eq!(values, vec!["gated", "opener"]);
    assert_eq!(started.load(Ordering::SeqCst), 2);
}

/// Plugin-style output: some hooks return nothing, some a list, some a nested list.
#[tokio::test]
async fn hook_shaped_output() {
    let hooks: Vec<Nested<String>> = vec![
        Nested::deferred(async { Nested::<String>::seq([]) }),
        Nested::deferred(async { Nested::values(["react".to_string()]) }),
        Nested::deferred(async {
            Nested::seq([
                Nested::ready("less".to_string()),
                Nested::deferred(async { Nested::values(["sass".to_string(), "postcss".to_string()]) }),
            ])
        }),
    ];

    let (values, stats) = Flattener::new().flatten_with_stats(hooks).await.unwrap();
    assert_eq!(values, vec!["react", "less", "sass", "postcss"]);
    assert_eq!(stats.iterations, 2);
}
