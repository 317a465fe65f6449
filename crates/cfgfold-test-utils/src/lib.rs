//! Testing utilities for cfgfold workspace
//!
//! Shared fixtures, proptest strategies, and pending-value builders.

#![allow(missing_docs)]

use std::time::Duration;

use cfgfold_flatten::{BoxError, Nested};
use cfgfold_value::{ConfigNode, ConfigValue};
use proptest::prelude::*;

pub fn node(value: serde_json::Value) -> ConfigNode {
    ConfigNode::try_from(value).expect("fixture must be a JSON object")
}

/// User configuration shaped like a typical front-end project config
pub fn sample_user_config() -> ConfigNode {
    node(serde_json::json!({
        "compilation": {
            "input": {"index": "./index.html"},
            "resolve": {"symlinks": true},
            "define": {"BTN": "Click me"},
            "output": {"path": "./build"},
            "sourcemap": false
        },
        "server": {"hmr": true},
        "plugins": ["@farmfe/plugin-react", {"name": "less", "additionalData": "@hoverColor: #f10215;"}]
    }))
}

/// Element that resolves to `value` after `delay`
pub fn delayed<T: Send + 'static>(value: Nested<T>, delay: Duration) -> Nested<T> {
    Nested::deferred(async move {
        tokio::time::sleep(delay).await;
        value
    })
}

/// Element that fails with `message` after yielding once
pub fn failing<T: Send + 'static>(message: &str) -> Nested<T> {
    let message = message.to_string();
    Nested::pending(async move {
        tokio::task::yield_now().await;
        Err::<Nested<T>, _>(BoxError::from(message))
    })
}

fn arb_key() -> impl Strategy<Value = String> {
    // Small alphabet so generated trees share keys often
    "[a-e]{1,2}"
}

fn arb_leaf() -> impl Strategy<Value = ConfigValue> {
    prop_oneof![
        Just(ConfigValue::Null),
        any::<bool>().prop_map(ConfigValue::Bool),
        any::<i64>().prop_map(ConfigValue::from),
        "[a-z]{0,6}".prop_map(ConfigValue::String),
    ]
}

/// Arbitrary configuration value
pub fn arb_config_value() -> impl Strategy<Value = ConfigValue> {
    arb_leaf().prop_recursive(4, 48, 5, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(ConfigValue::Sequence),
            proptest::collection::vec((arb_key(), inner), 0..5)
                .prop_map(|entries| ConfigValue::Mapping(entries.into_iter().collect())),
        ]
    })
}

/// Arbitrary mapping-typed configuration
pub fn arb_config_node() -> impl Strategy<Value = ConfigNode> {
    proptest::collection::vec((arb_key(), arb_config_value()), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}
