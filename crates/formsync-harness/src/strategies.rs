#![forbid(unsafe_code)]

//! Proptest strategies for form values and input bursts.

use std::time::Duration;

use formsync_core::{FormStatus, Value};
use proptest::prelude::*;
use serde_json::{Map, json};

/// Scalar JSON leaves, falsy ones included.
pub fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-1000i64..1000).prop_map(|n| json!(n)),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

/// Flat form models: objects with a handful of short keys.
pub fn form_model() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", json_leaf(), 0..5)
        .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<String, Value>>()))
}

pub fn form_status() -> impl Strategy<Value = FormStatus> {
    prop_oneof![
        Just(FormStatus::Valid),
        Just(FormStatus::Invalid),
        Just(FormStatus::Pending),
        Just(FormStatus::Disabled),
    ]
}

/// A burst of edits, each with the gap (in ms) that precedes it.
pub fn input_burst(max_gap_ms: u64) -> impl Strategy<Value = Vec<(Duration, Value)>> {
    prop::collection::vec(
        ((0..=max_gap_ms).prop_map(Duration::from_millis), form_model()),
        1..12,
    )
}
