#![forbid(unsafe_code)]

//! In-memory reference store.
//!
//! [`MemoryStore`] keeps the whole state tree in one [`Observable`] and
//! applies dispatched batches with [`apply_batch`]. It exists so bindings can
//! be exercised end-to-end; it persists nothing.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Malformed action in a batch | Batch rejected atomically, state untouched |
//! | [`fail_next`](MemoryStore::fail_next) armed | Batch logged and rejected without applying |
//! | Latency configured | State applied now, completion settled after the latency |

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use formsync_core::{
    FormAction, RecordPath, RecordView, Value, apply_batch, merge_patch, set_at, value_at,
};
use formsync_runtime::{
    Completion, DispatchError, Observable, Scheduler, SelectCallback, Store, Subscription,
    completion,
};
use tracing::{debug, trace};

/// Store backed by a single JSON state tree.
pub struct MemoryStore {
    state: Observable<Value>,
    dispatched: RefCell<Vec<Vec<FormAction>>>,
    failures_armed: Cell<usize>,
    latency: RefCell<Option<(Scheduler, Duration)>>,
}

impl MemoryStore {
    /// An empty store (`{}`).
    #[must_use]
    pub fn new() -> Rc<Self> {
        Self::with_state(Value::Object(serde_json::Map::new()))
    }

    #[must_use]
    pub fn with_state(state: Value) -> Rc<Self> {
        Rc::new(Self {
            state: Observable::new(state),
            dispatched: RefCell::new(Vec::new()),
            failures_armed: Cell::new(0),
            latency: RefCell::new(None),
        })
    }

    /// Snapshot of the whole state tree.
    #[must_use]
    pub fn state(&self) -> Value {
        self.state.get()
    }

    /// Number of state changes so far.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.state.version()
    }

    #[must_use]
    pub fn record(&self, path: &RecordPath) -> Option<Value> {
        self.state.with(|state| value_at(state, path).cloned())
    }

    #[must_use]
    pub fn view(&self, path: &RecordPath) -> RecordView {
        self.state.with(|state| RecordView::of(value_at(state, path)))
    }

    /// Replace the record at `path`, as another writer would.
    pub fn set_record(&self, path: &RecordPath, record: Value) {
        self.state.update(|state| set_at(state, path, record));
    }

    /// Merge `patch` into the record at `path`, as another writer would.
    pub fn patch_record(&self, path: &RecordPath, patch: Value) {
        self.state.update(|state| {
            let mut record = value_at(state, path).cloned().unwrap_or(Value::Null);
            merge_patch(&mut record, &patch);
            set_at(state, path, record);
        });
    }

    /// Every batch received, in order, rejected ones included.
    #[must_use]
    pub fn dispatched(&self) -> Vec<Vec<FormAction>> {
        self.dispatched.borrow().clone()
    }

    #[must_use]
    pub fn dispatch_count(&self) -> usize {
        self.dispatched.borrow().len()
    }

    /// Batches whose first action is of `kind` (see [`FormAction::kind`]).
    #[must_use]
    pub fn batches_of(&self, kind: &str) -> Vec<Vec<FormAction>> {
        self.dispatched
            .borrow()
            .iter()
            .filter(|batch| batch.first().is_some_and(|action| action.kind() == kind))
            .cloned()
            .collect()
    }

    /// Reject the next `count` batches.
    pub fn fail_next(&self, count: usize) {
        self.failures_armed.set(count);
    }

    /// Settle completions `latency` after dispatch on `scheduler`.
    pub fn set_latency(&self, scheduler: &Scheduler, latency: Duration) {
        *self.latency.borrow_mut() = Some((scheduler.clone(), latency));
    }

    fn settle(&self, result: Result<(), DispatchError>) -> Completion {
        let latency = self.latency.borrow().clone();
        match latency {
            Some((scheduler, latency)) => {
                let (completer, completion) = completion();
                scheduler.schedule(latency, move || completer.resolve(result));
                completion
            }
            None => Completion::settled(result),
        }
    }
}

impl Store for MemoryStore {
    fn select(&self, path: &RecordPath, callback: SelectCallback) -> Subscription {
        let callback: Rc<SelectCallback> = Rc::new(callback);
        let on_change = Rc::clone(&callback);
        let watched = path.clone();
        let subscription = self
            .state
            .subscribe(move |state: &Value| on_change(value_at(state, &watched)));
        let current = self.state.get();
        callback(value_at(&current, path));
        subscription
    }

    fn dispatch(&self, actions: Vec<FormAction>) -> Completion {
        self.dispatched.borrow_mut().push(actions.clone());

        let armed = self.failures_armed.get();
        if armed > 0 {
            self.failures_armed.set(armed - 1);
            debug!(actions = actions.len(), "rejecting batch: injected failure");
            return self.settle(Err(DispatchError::Rejected("injected failure".into())));
        }

        let next = match apply_batch(&self.state.get(), &actions) {
            Ok(next) => next,
            Err(err) => {
                debug!(error = %err, "rejecting malformed batch");
                return self.settle(Err(DispatchError::Rejected(err.to_string())));
            }
        };
        trace!(actions = actions.len(), "applying batch");
        self.state.set(next);
        self.settle(Ok(()))
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("version", &self.state.version())
            .field("dispatched", &self.dispatched.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> RecordPath {
        RecordPath::parse(s).unwrap()
    }

    #[test]
    fn select_delivers_current_then_changes() {
        let store = MemoryStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _sub = store.select(
            &path("a.b"),
            Box::new(move |v: Option<&Value>| sink.borrow_mut().push(v.cloned())),
        );
        store.set_record(&path("a.b"), json!({"model": 1}));
        assert_eq!(*seen.borrow(), vec![None, Some(json!({"model": 1}))]);
    }

    #[test]
    fn rejected_batch_leaves_state_untouched() {
        let store = MemoryStore::new();
        let bad = FormAction::UpdateFormValue {
            path: path("f"),
            value: json!(1),
            property_path: Some("a..b".into()),
        };
        let ok = FormAction::update_dirty(path("f"), true);
        let result = Rc::new(RefCell::new(None));
        let slot = Rc::clone(&result);
        store
            .dispatch(vec![ok, bad])
            .on_complete(move |r| *slot.borrow_mut() = Some(r));
        assert!(matches!(
            *result.borrow(),
            Some(Err(DispatchError::Rejected(_)))
        ));
        assert_eq!(store.state(), json!({}));
        assert_eq!(store.dispatch_count(), 1);
    }

    #[test]
    fn latency_defers_completion_not_state() {
        let scheduler = Scheduler::manual();
        let store = MemoryStore::new();
        store.set_latency(&scheduler, Duration::from_millis(20));
        let completion = store.dispatch(vec![FormAction::update_dirty(path("f"), true)]);
        assert!(!completion.is_settled());
        assert_eq!(store.view(&path("f")).dirty, Some(true));
        scheduler.advance(Duration::from_millis(20));
        assert!(completion.is_settled());
    }

    #[test]
    fn injected_failures_are_counted_down() {
        let store = MemoryStore::new();
        store.fail_next(1);
        let _ = store.dispatch(vec![FormAction::update_dirty(path("f"), true)]);
        assert_eq!(store.record(&path("f")), None);
        let _ = store.dispatch(vec![FormAction::update_dirty(path("f"), true)]);
        assert_eq!(store.view(&path("f")).dirty, Some(true));
    }

    #[test]
    fn patch_record_merges() {
        let store = MemoryStore::new();
        store.set_record(&path("f"), json!({"model": {"a": 1}, "dirty": false}));
        store.patch_record(&path("f"), json!({"model": {"b": 2}}));
        assert_eq!(
            store.record(&path("f")),
            Some(json!({"model": {"a": 1, "b": 2}, "dirty": false}))
        );
    }
}
