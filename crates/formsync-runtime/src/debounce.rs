#![forbid(unsafe_code)]

//! Outbound rate limiting.
//!
//! # Policy
//!
//! [`DebouncePolicy::resolve`] decides, once per binding, how outbound
//! emissions are gated:
//!
//! | `UpdateOn` | window | mode |
//! |------------|--------|------|
//! | `Change` | `Window(d)` | trailing-edge debounce over `d` |
//! | `Change` | `Disabled` | pass-through |
//! | `Blur` / `Submit` | any | pass-through |
//!
//! # Trailing-edge debounce
//!
//! Every emission replaces the pending value and restarts the window. When
//! the window elapses without a new emission, the pending (last) value is
//! forwarded. A zero window still defers to the scheduler.
//!
//! ```text
//! input   : a---b-c-------d----
//! window  : |--X|-X-|--->  |--->
//! output  : ----------c--------d
//! ```
//!
//! # Invariants
//!
//! 1. At most one value is forwarded per quiet window.
//! 2. The forwarded value is the last one pushed, never an earlier one.
//! 3. After [`Gate::cancel`], nothing pending is forwarded.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use formsync_core::{DebounceWindow, UpdateOn};

use crate::scheduler::{Scheduler, TimerHandle};

/// How a binding gates its outbound emissions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebouncePolicy {
    /// Forward every emission synchronously.
    PassThrough,
    /// Trailing-edge debounce over the window.
    Trailing(Duration),
}

impl DebouncePolicy {
    /// Resolve the policy for a form's trigger mode and a configured window.
    #[must_use]
    pub fn resolve(update_on: UpdateOn, window: DebounceWindow) -> Self {
        match (update_on, window.duration()) {
            (UpdateOn::Change, Some(window)) => Self::Trailing(window),
            _ => Self::PassThrough,
        }
    }
}

type Sink<T> = Rc<dyn Fn(T)>;

struct DebounceState<T> {
    pending: Option<T>,
    timer: Option<TimerHandle>,
}

/// Trailing-edge debouncer feeding a sink.
pub struct Debouncer<T> {
    state: Rc<RefCell<DebounceState<T>>>,
    scheduler: Scheduler,
    window: Duration,
    sink: Sink<T>,
}

impl<T> Clone for Debouncer<T> {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
            scheduler: self.scheduler.clone(),
            window: self.window,
            sink: Rc::clone(&self.sink),
        }
    }
}

impl<T: 'static> Debouncer<T> {
    pub fn new(scheduler: Scheduler, window: Duration, sink: impl Fn(T) + 'static) -> Self {
        Self {
            state: Rc::new(RefCell::new(DebounceState {
                pending: None,
                timer: None,
            })),
            scheduler,
            window,
            sink: Rc::new(sink),
        }
    }

    /// Replace the pending value and restart the window.
    pub fn push(&self, value: T) {
        let previous = {
            let mut state = self.state.borrow_mut();
            state.pending = Some(value);
            state.timer.take()
        };
        if let Some(previous) = previous {
            self.scheduler.cancel(previous);
        }

        let weak: Weak<RefCell<DebounceState<T>>> = Rc::downgrade(&self.state);
        let sink = Rc::clone(&self.sink);
        let handle = self.scheduler.schedule(self.window, move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let value = {
                let mut state = state.borrow_mut();
                state.timer = None;
                state.pending.take()
            };
            if let Some(value) = value {
                sink(value);
            }
        });
        self.state.borrow_mut().timer = Some(handle);
    }

    /// Drop the pending value and its timer.
    pub fn cancel(&self) {
        let timer = {
            let mut state = self.state.borrow_mut();
            state.pending = None;
            state.timer.take()
        };
        if let Some(timer) = timer {
            self.scheduler.cancel(timer);
        }
    }

    /// Whether a value is waiting for its window to elapse.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.state.borrow().pending.is_some()
    }
}

/// An outbound gate resolved from a [`DebouncePolicy`].
pub enum Gate<T> {
    Immediate(Sink<T>),
    Debounced(Debouncer<T>),
}

impl<T> Clone for Gate<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Immediate(sink) => Self::Immediate(Rc::clone(sink)),
            Self::Debounced(debouncer) => Self::Debounced(debouncer.clone()),
        }
    }
}

impl<T: 'static> Gate<T> {
    pub fn new(policy: DebouncePolicy, scheduler: &Scheduler, sink: impl Fn(T) + 'static) -> Self {
        match policy {
            DebouncePolicy::PassThrough => Self::Immediate(Rc::new(sink)),
            DebouncePolicy::Trailing(window) => {
                Self::Debounced(Debouncer::new(scheduler.clone(), window, sink))
            }
        }
    }

    pub fn push(&self, value: T) {
        match self {
            Self::Immediate(sink) => sink(value),
            Self::Debounced(debouncer) => debouncer.push(value),
        }
    }

    pub fn cancel(&self) {
        if let Self::Debounced(debouncer) = self {
            debouncer.cancel();
        }
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        match self {
            Self::Immediate(_) => false,
            Self::Debounced(debouncer) => debouncer.has_pending(),
        }
    }
}

impl<T> std::fmt::Debug for Gate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Immediate(_) => f.write_str("Gate::Immediate"),
            Self::Debounced(debouncer) => f
                .debug_struct("Gate::Debounced")
                .field("window", &debouncer.window)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn collecting_gate(
        policy: DebouncePolicy,
        sched: &Scheduler,
    ) -> (Gate<u32>, Rc<RefCell<Vec<u32>>>) {
        let out = Rc::new(RefCell::new(Vec::new()));
        let o = Rc::clone(&out);
        (Gate::new(policy, sched, move |v: u32| o.borrow_mut().push(v)), out)
    }

    #[test]
    fn policy_resolution() {
        let window = DebounceWindow::Window(ms(100));
        assert_eq!(
            DebouncePolicy::resolve(UpdateOn::Change, window),
            DebouncePolicy::Trailing(ms(100))
        );
        assert_eq!(
            DebouncePolicy::resolve(UpdateOn::Blur, window),
            DebouncePolicy::PassThrough
        );
        assert_eq!(
            DebouncePolicy::resolve(UpdateOn::Submit, window),
            DebouncePolicy::PassThrough
        );
        assert_eq!(
            DebouncePolicy::resolve(UpdateOn::Change, DebounceWindow::Disabled),
            DebouncePolicy::PassThrough
        );
    }

    #[test]
    fn pass_through_is_synchronous() {
        let sched = Scheduler::manual();
        let (gate, out) = collecting_gate(DebouncePolicy::PassThrough, &sched);
        gate.push(1);
        gate.push(2);
        assert_eq!(*out.borrow(), vec![1, 2]);
        assert!(!gate.has_pending());
    }

    #[test]
    fn trailing_forwards_last_value_once() {
        let sched = Scheduler::manual();
        let (gate, out) = collecting_gate(DebouncePolicy::Trailing(ms(100)), &sched);
        gate.push(1);
        sched.advance(ms(40));
        gate.push(2);
        sched.advance(ms(40));
        gate.push(3);
        assert!(out.borrow().is_empty());
        sched.advance(ms(99));
        assert!(out.borrow().is_empty());
        sched.advance(ms(1));
        assert_eq!(*out.borrow(), vec![3]);
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn separate_windows_forward_separately() {
        let sched = Scheduler::manual();
        let (gate, out) = collecting_gate(DebouncePolicy::Trailing(ms(10)), &sched);
        gate.push(1);
        sched.advance(ms(10));
        gate.push(2);
        sched.advance(ms(10));
        assert_eq!(*out.borrow(), vec![1, 2]);
    }

    #[test]
    fn zero_window_defers() {
        let sched = Scheduler::manual();
        let (gate, out) = collecting_gate(DebouncePolicy::Trailing(Duration::ZERO), &sched);
        gate.push(5);
        assert!(out.borrow().is_empty());
        sched.run_due();
        assert_eq!(*out.borrow(), vec![5]);
    }

    #[test]
    fn cancel_drops_pending() {
        let sched = Scheduler::manual();
        let (gate, out) = collecting_gate(DebouncePolicy::Trailing(ms(10)), &sched);
        gate.push(1);
        assert!(gate.has_pending());
        gate.cancel();
        assert!(!gate.has_pending());
        sched.advance(ms(50));
        assert!(out.borrow().is_empty());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn sink_may_push_again() {
        let sched = Scheduler::manual();
        let out = Rc::new(RefCell::new(Vec::new()));
        let slot: Rc<RefCell<Option<Debouncer<u32>>>> = Rc::new(RefCell::new(None));
        let (o, s) = (Rc::clone(&out), Rc::clone(&slot));
        let debouncer = Debouncer::new(sched.clone(), ms(10), move |v: u32| {
            o.borrow_mut().push(v);
            if v == 1 {
                if let Some(d) = s.borrow().as_ref() {
                    d.push(2);
                }
            }
        });
        *slot.borrow_mut() = Some(debouncer.clone());
        debouncer.push(1);
        sched.advance(ms(10));
        sched.advance(ms(10));
        assert_eq!(*out.borrow(), vec![1, 2]);
        slot.borrow_mut().take();
    }

    proptest! {
        #[test]
        fn burst_within_window_collapses_to_last(
            values in prop::collection::vec(any::<u32>(), 1..20),
            gaps in prop::collection::vec(0_u64..100, 20),
        ) {
            let sched = Scheduler::manual();
            let (gate, out) = collecting_gate(DebouncePolicy::Trailing(ms(100)), &sched);
            for (value, gap) in values.iter().zip(&gaps) {
                gate.push(*value);
                sched.advance(ms(*gap % 100));
            }
            sched.advance(ms(100));
            prop_assert_eq!(out.borrow().clone(), vec![*values.last().unwrap()]);
        }
    }
}
