//! Fuzz harness for `merge_patch`.
//!
//! Checks two properties on arbitrary JSON pairs: applying the same patch
//! twice equals applying it once, and every leaf of the patch is readable
//! from the result.

#![no_main]
use formsync_core::{Value, merge_patch};
use libfuzzer_sys::fuzz_target;

fn leaves_present(result: &Value, patch: &Value) -> bool {
    match (result, patch) {
        (Value::Object(result), Value::Object(patch)) => patch.iter().all(|(key, value)| {
            result
                .get(key)
                .is_some_and(|inner| leaves_present(inner, value))
        }),
        (result, patch) => result == patch,
    }
}

fuzz_target!(|data: &[u8]| {
    let Ok(Value::Array(pair)) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let [target, patch] = pair.as_slice() else {
        return;
    };

    let mut once = target.clone();
    merge_patch(&mut once, patch);
    let mut twice = once.clone();
    merge_patch(&mut twice, patch);

    assert_eq!(once, twice, "merge_patch is not idempotent");
    assert!(leaves_present(&once, patch), "patched leaf missing from result");
});
