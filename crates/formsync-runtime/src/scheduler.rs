#![forbid(unsafe_code)]

//! Cooperative timer queue.
//!
//! The binding never blocks: a debounced emission is a task scheduled on a
//! [`Scheduler`] and run when the host drives time forward.
//!
//! # Clocks
//!
//! | Constructor | Time source | Driven by |
//! |-------------|-------------|-----------|
//! | [`Scheduler::manual`] | virtual | [`advance`](Scheduler::advance) |
//! | [`Scheduler::wall`] | `web_time::Instant` | [`run_due`](Scheduler::run_due) from the event loop |
//!
//! `advance` works with both clocks and always moves virtual time forward, so
//! tests stay deterministic regardless of the clock.
//!
//! # Invariants
//!
//! 1. Tasks run in deadline order; equal deadlines run in scheduling order.
//! 2. `now()` never goes backwards.
//! 3. A cancelled task never runs. Cancelling a task that already ran (or is
//!    running) returns `false`.
//! 4. No `RefCell` borrow is held while a task runs, so tasks may schedule
//!    or cancel other tasks.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct TimerKey {
    deadline: Duration,
    seq: u64,
}

/// Handle to a scheduled task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    key: TimerKey,
}

#[derive(Debug, Clone, Copy)]
enum Clock {
    Manual,
    Wall(web_time::Instant),
}

struct SchedulerInner {
    now: Duration,
    next_seq: u64,
    timers: BTreeMap<TimerKey, Box<dyn FnOnce()>>,
    clock: Clock,
}

/// Single-threaded timer queue. Clones share the same queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Scheduler {
    fn with_clock(clock: Clock) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                now: Duration::ZERO,
                next_seq: 0,
                timers: BTreeMap::new(),
                clock,
            })),
        }
    }

    /// A scheduler whose time only moves through [`advance`](Self::advance).
    #[must_use]
    pub fn manual() -> Self {
        Self::with_clock(Clock::Manual)
    }

    /// A scheduler following the wall clock from now on.
    #[must_use]
    pub fn wall() -> Self {
        Self::with_clock(Clock::Wall(web_time::Instant::now()))
    }

    /// Current time relative to the scheduler's origin.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    /// Run `task` once `delay` has elapsed.
    pub fn schedule(&self, delay: Duration, task: impl FnOnce() + 'static) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        let key = TimerKey {
            deadline: inner.now.saturating_add(delay),
            seq: inner.next_seq,
        };
        inner.next_seq += 1;
        inner.timers.insert(key, Box::new(task));
        TimerHandle { key }
    }

    /// Drop a pending task. Returns whether it was still pending.
    pub fn cancel(&self, handle: TimerHandle) -> bool {
        self.inner.borrow_mut().timers.remove(&handle.key).is_some()
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    /// Move time forward by `by`, running every task that falls due.
    ///
    /// Returns the number of tasks run.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.now().saturating_add(by);
        self.run_until(target)
    }

    /// Run tasks due at the current time.
    ///
    /// With the wall clock, current time is first caught up with the real
    /// elapsed time.
    pub fn run_due(&self) -> usize {
        let target = {
            let inner = self.inner.borrow();
            match inner.clock {
                Clock::Manual => inner.now,
                Clock::Wall(origin) => origin.elapsed().max(inner.now),
            }
        };
        self.run_until(target)
    }

    fn run_until(&self, target: Duration) -> usize {
        let mut ran = 0;
        loop {
            let task = {
                let mut inner = self.inner.borrow_mut();
                let due = inner
                    .timers
                    .first_key_value()
                    .map(|(key, _)| *key)
                    .filter(|key| key.deadline <= target);
                due.and_then(|key| {
                    inner.now = inner.now.max(key.deadline);
                    inner.timers.remove(&key)
                })
            };
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        let mut inner = self.inner.borrow_mut();
        inner.now = inner.now.max(target);
        ran
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Scheduler")
            .field("now", &inner.now)
            .field("pending", &inner.timers.len())
            .field("clock", &inner.clock)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn runs_in_deadline_then_fifo_order() {
        let sched = Scheduler::manual();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (delay, id) in [(30, 'c'), (10, 'a'), (10, 'b')] {
            let o = Rc::clone(&order);
            sched.schedule(ms(delay), move || o.borrow_mut().push(id));
        }
        assert_eq!(sched.advance(ms(30)), 3);
        assert_eq!(*order.borrow(), vec!['a', 'b', 'c']);
        assert_eq!(sched.now(), ms(30));
    }

    #[test]
    fn not_due_tasks_wait() {
        let sched = Scheduler::manual();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        sched.schedule(ms(100), move || f.set(true));
        sched.advance(ms(99));
        assert!(!fired.get());
        assert_eq!(sched.pending(), 1);
        sched.advance(ms(1));
        assert!(fired.get());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn cancel_prevents_run() {
        let sched = Scheduler::manual();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        let handle = sched.schedule(ms(5), move || f.set(true));
        assert!(sched.cancel(handle));
        assert!(!sched.cancel(handle));
        sched.advance(ms(10));
        assert!(!fired.get());
    }

    #[test]
    fn zero_delay_waits_for_run_due() {
        let sched = Scheduler::manual();
        let fired = Rc::new(Cell::new(false));
        let f = Rc::clone(&fired);
        sched.schedule(Duration::ZERO, move || f.set(true));
        assert!(!fired.get());
        assert_eq!(sched.run_due(), 1);
        assert!(fired.get());
    }

    #[test]
    fn tasks_can_schedule_tasks() {
        let sched = Scheduler::manual();
        let count = Rc::new(Cell::new(0));
        let (s, c) = (sched.clone(), Rc::clone(&count));
        sched.schedule(ms(10), move || {
            c.set(c.get() + 1);
            let c2 = Rc::clone(&c);
            s.schedule(ms(10), move || c2.set(c2.get() + 1));
        });
        sched.advance(ms(15));
        assert_eq!(count.get(), 1);
        sched.advance(ms(5));
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn wall_clock_run_due_never_goes_back() {
        let sched = Scheduler::wall();
        sched.advance(ms(1_000));
        let before = sched.now();
        sched.run_due();
        assert!(sched.now() >= before);
        assert!(format!("{sched:?}").contains("Wall"));
    }
}
