#![forbid(unsafe_code)]

//! JSON helpers shared by forms and stores.
//!
//! # Merge semantics
//!
//! [`merge_patch`] is the "patch value" operation forms expose: objects are
//! merged key by key (recursively), anything else in the patch replaces the
//! target. Keys the patch does not mention are left untouched.
//!
//! | target | patch | result |
//! |--------|-------|--------|
//! | `{a:1,b:2}` | `{a:3}` | `{a:3,b:2}` |
//! | `{a:{x:1,y:2}}` | `{a:{y:5}}` | `{a:{x:1,y:5}}` |
//! | `{a:[1,2]}` | `{a:[3]}` | `{a:[3]}` |
//! | `5` | `{a:1}` | `{a:1}` |
//!
//! # Path helpers
//!
//! [`value_at`] walks object keys only; it never indexes into arrays.
//! [`set_at`] creates missing intermediate objects and replaces any
//! non-object it meets on the way.

use serde_json::{Map, Value};

use crate::path::RecordPath;

/// Merge `patch` into `target` in place.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                merge_patch(target.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

/// Look up the value at `path`, or `None` when any segment is missing.
#[must_use]
pub fn value_at<'a>(state: &'a Value, path: &RecordPath) -> Option<&'a Value> {
    segments_at(state, path.segments().iter().map(String::as_str))
}

pub(crate) fn segments_at<'a, 'p>(
    state: &'a Value,
    segments: impl IntoIterator<Item = &'p str>,
) -> Option<&'a Value> {
    segments
        .into_iter()
        .try_fold(state, |node, segment| node.as_object()?.get(segment))
}

/// Write `value` at `path`, creating intermediate objects as needed.
pub fn set_at(state: &mut Value, path: &RecordPath, value: Value) {
    *slot_at(state, path.segments().iter().map(String::as_str)) = value;
}

/// Mutable slot at the given segments, creating intermediate objects.
pub(crate) fn slot_at<'a, 'p>(
    state: &'a mut Value,
    segments: impl IntoIterator<Item = &'p str>,
) -> &'a mut Value {
    segments.into_iter().fold(state, |node, segment| {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        &mut node[segment]
    })
}

/// Move the object out of `value`, leaving `null`. A non-object yields an
/// empty map.
pub(crate) fn take_object(value: &mut Value) -> Map<String, Value> {
    match std::mem::take(value) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Truthiness of a record sub-field.
///
/// `null`, `false`, `0` and `""` are falsy. Empty objects and arrays are
/// truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
