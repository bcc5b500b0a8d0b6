#![forbid(unsafe_code)]

//! Single-shot dispatch completion signals.
//!
//! A store answers every dispatch with a [`Completion`] and keeps the
//! matching [`Completer`]. Whoever dispatched attaches one callback with
//! [`Completion::on_complete`]; it runs exactly once, when the store settles
//! the dispatch, or immediately if it already has.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Store rejects the dispatch | Callback gets `Err(DispatchError::Rejected)` |
//! | `Completer` dropped unsettled | Callback gets `Err(DispatchError::Abandoned)` |
//! | `Completion` dropped without callback | Result is discarded |

use std::cell::RefCell;
use std::rc::Rc;

/// Why a dispatch did not complete successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The store refused or failed to apply the actions.
    Rejected(String),
    /// The store dropped the dispatch without settling it.
    Abandoned,
}

impl std::fmt::Display for DispatchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(reason) => write!(f, "dispatch rejected: {reason}"),
            Self::Abandoned => write!(f, "dispatch abandoned before completion"),
        }
    }
}

impl std::error::Error for DispatchError {}

pub type DispatchResult = Result<(), DispatchError>;

type Callback = Box<dyn FnOnce(DispatchResult)>;

#[derive(Default)]
struct Slot {
    result: Option<DispatchResult>,
    callback: Option<Callback>,
}

impl Slot {
    /// Take result and callback together once both are present.
    fn ready(&mut self) -> Option<(DispatchResult, Callback)> {
        if self.result.is_some() && self.callback.is_some() {
            Some((self.result.take()?, self.callback.take()?))
        } else {
            None
        }
    }
}

fn deliver(slot: &RefCell<Slot>) {
    let ready = slot.borrow_mut().ready();
    if let Some((result, callback)) = ready {
        callback(result);
    }
}

/// Create a linked completer/completion pair.
#[must_use]
pub fn completion() -> (Completer, Completion) {
    let slot = Rc::new(RefCell::new(Slot::default()));
    (
        Completer {
            slot: Rc::clone(&slot),
            settled: false,
        },
        Completion { slot },
    )
}

/// Store-side half: settles the dispatch.
pub struct Completer {
    slot: Rc<RefCell<Slot>>,
    settled: bool,
}

impl Completer {
    /// Settle the dispatch with `result`.
    pub fn resolve(mut self, result: DispatchResult) {
        self.settle(result);
    }

    fn settle(&mut self, result: DispatchResult) {
        if self.settled {
            return;
        }
        self.settled = true;
        self.slot.borrow_mut().result = Some(result);
        deliver(&self.slot);
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        self.settle(Err(DispatchError::Abandoned));
    }
}

impl std::fmt::Debug for Completer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("settled", &self.settled)
            .finish()
    }
}

/// Dispatcher-side half: observes the outcome.
#[must_use = "attach a callback with `on_complete` or the outcome is discarded"]
pub struct Completion {
    slot: Rc<RefCell<Slot>>,
}

impl Completion {
    /// An already-settled completion.
    pub fn settled(result: DispatchResult) -> Self {
        let (completer, completion) = completion();
        completer.resolve(result);
        completion
    }

    /// Whether the store has settled the dispatch.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.slot.borrow().result.is_some()
    }

    /// Run `callback` with the outcome, now or when it arrives.
    pub fn on_complete(self, callback: impl FnOnce(DispatchResult) + 'static) {
        self.slot.borrow_mut().callback = Some(Box::new(callback));
        deliver(&self.slot);
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("settled", &self.is_settled())
            .finish()
    }
}
