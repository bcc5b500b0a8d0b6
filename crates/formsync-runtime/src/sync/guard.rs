#![forbid(unsafe_code)]

//! Loop prevention and cancellation state shared by a binding's rules.

use std::cell::Cell;
use std::rc::Rc;

/// Counts outbound dispatches in flight.
///
/// "Updating" is true exactly while at least one [`InFlight`] ticket is
/// alive. Tickets are released when dropped, which covers success, failure
/// and abandoned completions alike.
#[derive(Clone, Debug, Default)]
pub struct ReentrancyGuard {
    in_flight: Rc<Cell<u32>>,
}

impl ReentrancyGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a ticket for one outbound dispatch.
    #[must_use = "the guard is released as soon as the ticket is dropped"]
    pub fn enter(&self) -> InFlight {
        self.in_flight.set(self.in_flight.get().saturating_add(1));
        InFlight {
            counter: Rc::clone(&self.in_flight),
        }
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.in_flight.get() > 0
    }

    #[must_use]
    pub fn in_flight(&self) -> u32 {
        self.in_flight.get()
    }
}

/// RAII ticket for one in-flight outbound dispatch.
#[derive(Debug)]
pub struct InFlight {
    counter: Rc<Cell<u32>>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.counter.set(self.counter.get().saturating_sub(1));
    }
}

/// One-way cancellation flag shared by every callback of a binding.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    cancelled: Rc<Cell<bool>>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_tracks_overlapping_tickets() {
        let guard = ReentrancyGuard::new();
        assert!(!guard.is_updating());
        let first = guard.enter();
        let second = guard.enter();
        assert_eq!(guard.in_flight(), 2);
        drop(first);
        assert!(guard.is_updating());
        drop(second);
        assert!(!guard.is_updating());
    }

    #[test]
    fn cancel_is_sticky_and_shared() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
