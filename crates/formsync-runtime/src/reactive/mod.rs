#![forbid(unsafe_code)]

//! Reactive primitives for form/store synchronization.
//!
//! - [`Observable`]: a shared, version-tracked value with change
//!   notification via subscriber callbacks. Setting an equal value is a no-op.
//! - [`EventStream`]: a stateless broadcast of events. Every `emit` reaches
//!   every subscriber, equal or not.
//! - [`Subscription`]: RAII guard that unsubscribes on drop.
//! - [`BindingScope`]: owns the subscriptions of one logical scope (one form
//!   binding) and releases them together.
//! - [`Distinct`]: remembers the last admitted value and filters repeats.
//!
//! # Architecture
//!
//! Everything is `Rc<RefCell<..>>` based and single-threaded. Subscribers are
//! stored as `Weak` callbacks; the strong end lives in the [`Subscription`].
//! Dead entries are pruned lazily during notification.
//!
//! Notification never holds a `RefCell` borrow while running callbacks, so a
//! callback may freely read, set, emit or subscribe on the same source.
//!
//! # Invariants
//!
//! 1. `Observable` version increments exactly once per mutation that changes
//!    the value.
//! 2. Subscribers are notified in registration order.
//! 3. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle. A cycle already in progress still reaches it.
//! 4. `EventStream::emit` with no subscribers is a no-op.
//! 5. A `set` made from inside a notification supersedes the outer cycle:
//!    no subscriber is handed a value older than one it has already seen.

pub mod binding;
pub mod distinct;
pub mod event;
pub mod observable;

pub use binding::BindingScope;
pub use distinct::Distinct;
pub use event::EventStream;
pub use observable::{Observable, Subscription};
