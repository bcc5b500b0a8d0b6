#![forbid(unsafe_code)]

//! Runtime for keeping a form and a store record in sync.
//!
//! # Role in formsync
//! `formsync-runtime` is the behavioral layer. It owns the single-threaded
//! reactive primitives, the virtual-time scheduler that drives debouncing,
//! and [`FormBinding`], the controller that links one [`Form`] to the record
//! at one path of a [`Store`].
//!
//! # How it fits in the system
//! The data model and the record reducer live in `formsync-core`. Stores and
//! forms are supplied by the embedding application through the [`Store`] and
//! [`Form`] traits; `formsync-harness` ships in-memory fixtures of both.
//!
//! Everything here is `!Send`: a binding lives on the thread that owns its
//! form, and the host drives timers with [`Scheduler::run_due`] (or
//! [`Scheduler::advance`] in tests).

pub mod completion;
pub mod debounce;
pub mod form;
pub mod reactive;
pub mod scheduler;
pub mod store;
pub mod strategy;
pub mod sync;

pub use completion::{Completer, Completion, DispatchError, DispatchResult, completion};
pub use debounce::{DebouncePolicy, Debouncer, Gate};
pub use form::{Form, Redraw};
pub use reactive::{BindingScope, Distinct, EventStream, Observable, Subscription};
pub use scheduler::{Scheduler, TimerHandle};
pub use store::{SelectCallback, SelectOnceCallback, Store};
pub use strategy::{
    DistinctValues, PassThrough, StrategyFactory, ValueChangesStrategy, clear_global_strategy,
    set_global_strategy,
};
pub use sync::{CancelToken, FormBinding, FormBindingBuilder, InFlight, ReentrancyGuard};
