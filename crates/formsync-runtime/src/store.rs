#![forbid(unsafe_code)]

//! The store interface a binding consumes.
//!
//! The store owns the state tree. A binding only observes the record at its
//! path and asks for changes through [`Store::dispatch`].

use std::cell::RefCell;
use std::rc::Rc;

use formsync_core::{FormAction, RecordPath, Value};

use crate::completion::Completion;
use crate::reactive::Subscription;

/// Callback receiving the value at a path (`None` when absent).
pub type SelectCallback = Box<dyn Fn(Option<&Value>)>;

/// One-shot variant of [`SelectCallback`].
pub type SelectOnceCallback = Box<dyn FnOnce(Option<&Value>)>;

/// A state store addressable by [`RecordPath`].
///
/// # Contract
///
/// - `select` calls `callback` with the current value immediately, then on
///   every state change. Implementations may call it with an unchanged value;
///   consumers filter repeats themselves.
/// - `select_once` calls `callback` exactly once, with the value current at
///   delivery time. Dropping the returned subscription before delivery
///   cancels it.
/// - `dispatch` applies the actions as one batch and settles the returned
///   [`Completion`]. It must not panic when the actions are rejected.
/// - No `RefCell` borrow of the store may be held while a callback runs.
pub trait Store {
    fn select(&self, path: &RecordPath, callback: SelectCallback) -> Subscription;

    fn select_once(&self, path: &RecordPath, callback: SelectOnceCallback) -> Subscription {
        let slot = RefCell::new(Some(callback));
        self.select(
            path,
            Box::new(move |value: Option<&Value>| {
                let callback = slot.borrow_mut().take();
                if let Some(callback) = callback {
                    callback(value);
                }
            }),
        )
    }

    fn dispatch(&self, actions: Vec<FormAction>) -> Completion;
}

impl<S: Store + ?Sized> Store for Rc<S> {
    fn select(&self, path: &RecordPath, callback: SelectCallback) -> Subscription {
        (**self).select(path, callback)
    }

    fn select_once(&self, path: &RecordPath, callback: SelectOnceCallback) -> Subscription {
        (**self).select_once(path, callback)
    }

    fn dispatch(&self, actions: Vec<FormAction>) -> Completion {
        (**self).dispatch(actions)
    }
}
