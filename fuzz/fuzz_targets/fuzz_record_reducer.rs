//! Fuzz harness for the record reducer.
//!
//! Input is a JSON document `{"state": ..., "actions": [...]}`. Anything that
//! deserializes must reduce without panicking, and the record touched
//! last must be an object afterwards.

#![no_main]
use formsync_core::{FormAction, Value, apply_batch, value_at};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let state = doc.get("state").cloned().unwrap_or(Value::Null);
    let Some(raw_actions) = doc.get("actions").and_then(Value::as_array) else {
        return;
    };
    let actions: Vec<FormAction> = raw_actions
        .iter()
        .filter_map(|raw| serde_json::from_value(raw.clone()).ok())
        .collect();

    let (Ok(next), Some(last)) = (apply_batch(&state, &actions), actions.last()) else {
        return;
    };
    assert!(
        value_at(&next, last.path()).is_some_and(Value::is_object),
        "reduced record at {} is not an object",
        last.path()
    );
});
