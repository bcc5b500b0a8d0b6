#![forbid(unsafe_code)]

//! Stateless event broadcast.

use std::cell::RefCell;
use std::rc::Rc;

use super::observable::{Subscribers, Subscription};

/// Broadcasts every emitted event to all live subscribers.
///
/// Unlike [`Observable`](super::Observable) an `EventStream` keeps no value
/// and does not filter repeats: emitting the same event twice notifies twice.
/// Clones share the same subscriber list.
pub struct EventStream<T> {
    subscribers: Rc<RefCell<Subscribers<T>>>,
}

impl<T> Clone for EventStream<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Rc::clone(&self.subscribers),
        }
    }
}

impl<T: 'static> EventStream<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Rc::new(RefCell::new(Subscribers::new())),
        }
    }

    /// Deliver `event` to every live subscriber, in registration order.
    pub fn emit(&self, event: &T) {
        let callbacks = self.subscribers.borrow_mut().snapshot();
        for callback in callbacks {
            callback(event);
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        self.subscribers.borrow_mut().add(callback)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().live_count()
    }
}

impl<T: 'static> Default for EventStream<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for EventStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
