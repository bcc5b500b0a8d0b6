#![forbid(unsafe_code)]

//! Repeat filter for reactive callbacks.

use std::cell::RefCell;

/// Admits a value only when it differs from the previously admitted one.
///
/// The first value is always admitted.
///
/// ```
/// use formsync_runtime::reactive::Distinct;
///
/// let distinct = Distinct::new();
/// assert!(distinct.admit(&"VALID"));
/// assert!(!distinct.admit(&"VALID"));
/// assert!(distinct.admit(&"INVALID"));
/// ```
#[derive(Debug)]
pub struct Distinct<T> {
    last: RefCell<Option<T>>,
}

impl<T: Clone + PartialEq> Distinct<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: RefCell::new(None),
        }
    }

    /// Record `value` and report whether it differs from the last one.
    pub fn admit(&self, value: &T) -> bool {
        let mut last = self.last.borrow_mut();
        if last.as_ref() == Some(value) {
            return false;
        }
        *last = Some(value.clone());
        true
    }
}

impl<T: Clone + PartialEq> Default for Distinct<T> {
    fn default() -> Self {
        Self::new()
    }
}
