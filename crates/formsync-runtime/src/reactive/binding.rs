#![forbid(unsafe_code)]

//! Lifecycle management for groups of subscriptions.
//!
//! A [`BindingScope`] collects every [`Subscription`] a logical scope (one
//! form binding) establishes, so the whole group can be released at once.
//!
//! # Usage
//!
//! ```
//! use formsync_runtime::reactive::{BindingScope, EventStream, Observable};
//!
//! let mut scope = BindingScope::new();
//!
//! let model = Observable::new(42);
//! let status = EventStream::<&'static str>::new();
//! scope.hold(model.subscribe(|v| println!("model: {v}")));
//! scope.subscribe_events(&status, |s| println!("status: {s}"));
//! assert_eq!(scope.binding_count(), 2);
//!
//! scope.clear();
//! assert_eq!(model.subscriber_count(), 0);
//! ```
//!
//! # Invariants
//!
//! 1. Subscriptions are released in reverse registration order on `clear()`
//!    and on drop.
//! 2. After `clear()` or drop, no callbacks registered through this scope
//!    start a new notification cycle.
//! 3. `clear()` leaves the scope empty and reusable.
//! 4. Binding count is always accurate.

use super::event::EventStream;
use super::observable::Subscription;

/// Collects subscriptions for one logical scope.
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    /// Create an empty binding scope.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    /// Hold `sub` until the scope is cleared or dropped.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Subscribe to an event stream within this scope.
    pub fn subscribe_events<T: 'static>(
        &mut self,
        source: &EventStream<T>,
        callback: impl Fn(&T) + 'static,
    ) -> &mut Self {
        let sub = source.subscribe(callback);
        self.subscriptions.push(sub);
        self
    }

    /// Number of subscriptions held.
    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether the scope holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions now, newest first.
    pub fn clear(&mut self) {
        while let Some(sub) = self.subscriptions.pop() {
            drop(sub);
        }
    }
}

impl Default for BindingScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use crate::reactive::Observable;

    use serde_json::{Value, json};

    /// One scope watching a record snapshot and a status stream, the way a
    /// form binding does.
    type Wired = (
        BindingScope,
        Observable<Value>,
        EventStream<&'static str>,
        Rc<RefCell<Vec<String>>>,
    );

    fn wired() -> Wired {
        let record = Observable::new(json!({"model": null}));
        let status = EventStream::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut scope = BindingScope::new();
        let l = Rc::clone(&log);
        scope.hold(record.subscribe(move |r: &Value| {
            l.borrow_mut().push(format!("record {}", r["model"]));
        }));
        let l = Rc::clone(&log);
        scope.subscribe_events(&status, move |s: &&'static str| {
            l.borrow_mut().push(format!("status {s}"));
        });
        (scope, record, status, log)
    }

    #[test]
    fn scope_routes_both_sources() {
        let (scope, record, status, log) = wired();
        assert_eq!(scope.binding_count(), 2);

        record.set(json!({"model": {"title": "milk"}}));
        status.emit(&"VALID");
        assert_eq!(
            *log.borrow(),
            vec![r#"record {"title":"milk"}"#.to_string(), "status VALID".to_string()]
        );
    }

    #[test]
    fn clear_detaches_from_every_source() {
        let (mut scope, record, status, log) = wired();
        scope.clear();
        assert!(scope.is_empty());
        assert_eq!(record.subscriber_count(), 0);
        assert_eq!(status.subscriber_count(), 0);

        record.set(json!({"model": 1}));
        status.emit(&"INVALID");
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn dropping_the_scope_detaches() {
        let (scope, record, _status, log) = wired();
        drop(scope);
        record.set(json!({"model": 2}));
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn clear_releases_newest_first() {
        struct Tracked(u8, Rc<RefCell<Vec<u8>>>);
        impl Drop for Tracked {
            fn drop(&mut self) {
                self.1.borrow_mut().push(self.0);
            }
        }

        let order = Rc::new(RefCell::new(Vec::new()));
        let mut scope = BindingScope::new();
        for id in 0..3 {
            scope.hold(Subscription::from_guard(Tracked(id, Rc::clone(&order))));
        }
        scope.clear();
        assert_eq!(*order.borrow(), vec![2, 1, 0]);
    }

    #[test]
    fn cleared_scope_can_be_rewired() {
        let (mut scope, record, _status, log) = wired();
        scope.clear();

        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        scope.hold(record.subscribe(move |_| h.set(h.get() + 1)));
        record.set(json!({"model": 3}));

        assert_eq!(hits.get(), 1);
        assert!(log.borrow().is_empty());
        assert!(format!("{scope:?}").contains("binding_count: 1"));
    }
}
