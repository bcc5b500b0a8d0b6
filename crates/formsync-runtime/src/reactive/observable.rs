#![forbid(unsafe_code)]

//! Version-tracked observable values and their subscriptions.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

type Callback<T> = dyn Fn(&T);

// ---------------------------------------------------------------------------
// Subscribers: shared callback list
// ---------------------------------------------------------------------------

/// Weak callback list shared by [`Observable`] and
/// [`EventStream`](super::EventStream).
pub(crate) struct Subscribers<T> {
    entries: Vec<Weak<Callback<T>>>,
}

impl<T: 'static> Subscribers<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, callback: impl Fn(&T) + 'static) -> Subscription {
        let strong: Rc<Callback<T>> = Rc::new(callback);
        self.entries.push(Rc::downgrade(&strong));
        Subscription::from_guard(strong)
    }

    /// Live callbacks in registration order; prunes dead entries.
    pub(crate) fn snapshot(&mut self) -> Vec<Rc<Callback<T>>> {
        self.entries.retain(|w| w.strong_count() > 0);
        self.entries.iter().filter_map(Weak::upgrade).collect()
    }

    pub(crate) fn live_count(&self) -> usize {
        self.entries.iter().filter(|w| w.strong_count() > 0).count()
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// RAII guard for a registered callback.
///
/// Dropping the guard unsubscribes. A subscription can also wrap any other
/// guard value (for example a store-specific handle) via
/// [`Subscription::from_guard`].
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    _guard: Box<dyn Any>,
}

impl Subscription {
    /// Wrap an arbitrary guard; it is dropped when the subscription is.
    pub fn from_guard(guard: impl Any) -> Self {
        Self {
            _guard: Box::new(guard),
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Observable<T>
// ---------------------------------------------------------------------------

struct ObservableInner<T> {
    value: T,
    version: u64,
    subscribers: Subscribers<T>,
}

/// A shared value with change notification.
///
/// Clones share the same underlying value.
///
/// ```
/// use formsync_runtime::reactive::Observable;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let count = Observable::new(0);
/// let seen = Rc::new(Cell::new(0));
/// let s = Rc::clone(&seen);
/// let _sub = count.subscribe(move |v| s.set(*v));
///
/// count.set(5);
/// assert_eq!(seen.get(), 5);
/// assert_eq!(count.version(), 1);
///
/// count.set(5); // equal: no notification, no version bump
/// assert_eq!(count.version(), 1);
/// ```
pub struct Observable<T> {
    inner: Rc<RefCell<ObservableInner<T>>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Create an observable holding `value` at version 0.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ObservableInner {
                value,
                version: 0,
                subscribers: Subscribers::new(),
            })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value.
    ///
    /// `f` must not mutate this observable.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value and notify subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
            inner.version += 1;
        }
        self.notify();
    }

    /// Mutate a copy of the value and store it if it changed.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Number of changes since creation.
    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Register `callback` for future changes.
    ///
    /// The callback is not invoked with the current value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.inner.borrow_mut().subscribers.add(callback)
    }

    /// Number of live subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.live_count()
    }

    fn notify(&self) {
        let (version, value, callbacks) = {
            let mut inner = self.inner.borrow_mut();
            let callbacks = inner.subscribers.snapshot();
            (inner.version, inner.value.clone(), callbacks)
        };
        for callback in callbacks {
            // A nested `set` has already delivered a newer value to everyone.
            if self.inner.borrow().version != version {
                break;
            }
            callback(&value);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Observable")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn get_set_and_version() {
        let obs = Observable::new(1);
        assert_eq!(obs.get(), 1);
        assert_eq!(obs.version(), 0);
        obs.set(2);
        assert_eq!(obs.get(), 2);
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn equal_set_is_noop() {
        let obs = Observable::new(String::from("a"));
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        let _sub = obs.subscribe(move |_| f.set(f.get() + 1));
        obs.set("a".into());
        assert_eq!(fired.get(), 0);
        assert_eq!(obs.version(), 0);
    }

    #[test]
    fn update_mutates_copy() {
        let obs = Observable::new(vec![1, 2]);
        obs.update(|v| v.push(3));
        assert_eq!(obs.get(), vec![1, 2, 3]);
        obs.update(|_| {});
        assert_eq!(obs.version(), 1);
    }

    #[test]
    fn subscribers_in_registration_order() {
        let obs = Observable::new(0);
        let order = Rc::new(RefCell::new(Vec::new()));
        let o1 = Rc::clone(&order);
        let _s1 = obs.subscribe(move |_| o1.borrow_mut().push(1));
        let o2 = Rc::clone(&order);
        let _s2 = obs.subscribe(move |_| o2.borrow_mut().push(2));
        obs.set(1);
        assert_eq!(*order.borrow(), vec![1, 2]);
    }

    #[test]
    fn drop_subscription_unsubscribes() {
        let obs = Observable::new(0);
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        let sub = obs.subscribe(move |v| s.set(*v));
        assert_eq!(obs.subscriber_count(), 1);
        drop(sub);
        assert_eq!(obs.subscriber_count(), 0);
        obs.set(9);
        assert_eq!(seen.get(), 0);
    }

    #[test]
    fn callback_may_set_same_observable() {
        let obs = Observable::new(0);
        let inner = obs.clone();
        let _sub = obs.subscribe(move |v| {
            if *v < 3 {
                inner.set(v + 1);
            }
        });
        obs.set(1);
        assert_eq!(obs.get(), 3);
    }

    #[test]
    fn wrapped_guard_drops_with_subscription() {
        let released = Rc::new(Cell::new(false));
        struct Release(Rc<Cell<bool>>);
        impl Drop for Release {
            fn drop(&mut self) {
                self.0.set(true);
            }
        }
        let sub = Subscription::from_guard(Release(Rc::clone(&released)));
        assert!(!released.get());
        drop(sub);
        assert!(released.get());
    }

    #[test]
    fn nested_set_supersedes_outer_cycle() {
        let obs = Observable::new(0);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let o = obs.clone();
        let _first = obs.subscribe(move |v| {
            if *v == 1 {
                o.set(2);
            }
        });
        let s = Rc::clone(&seen);
        let _second = obs.subscribe(move |v| s.borrow_mut().push(*v));

        obs.set(1);
        assert_eq!(*seen.borrow(), vec![2]);
        assert_eq!(obs.version(), 2);
    }
}
