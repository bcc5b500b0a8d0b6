#![forbid(unsafe_code)]

//! The form interface a binding consumes.
//!
//! The UI layer owns the form; a binding keeps only a `Weak` reference and
//! never creates or destroys controls. It reads snapshots, patches values,
//! flips the dirty/disabled flags, and asks for a redraw afterwards.

use formsync_core::{FormErrors, FormStatus, UpdateOn, Value};

use crate::reactive::EventStream;

/// A form group as seen by a binding.
///
/// All methods take `&self`; implementations use interior mutability and must
/// not hold a borrow while emitting on their streams.
pub trait Form {
    /// Snapshot of the raw value, disabled controls included.
    fn raw_value(&self) -> Value;

    /// Merge `value` into the form. Keys the patch does not mention keep their
    /// current value. Emits on [`value_changes`](Self::value_changes).
    fn patch_value(&self, value: &Value);

    fn is_dirty(&self) -> bool;
    fn mark_dirty(&self);
    fn mark_pristine(&self);

    fn is_disabled(&self) -> bool;
    fn enable(&self);
    fn disable(&self);

    fn status(&self) -> FormStatus;
    fn errors(&self) -> Option<FormErrors>;

    /// When the form publishes value changes.
    fn update_on(&self) -> UpdateOn {
        UpdateOn::Change
    }

    /// Raw value after every change.
    fn value_changes(&self) -> &EventStream<Value>;

    /// Status after every validation pass, repeats included.
    fn status_changes(&self) -> &EventStream<FormStatus>;
}

/// Hook telling the UI layer that a redraw may be needed.
pub trait Redraw {
    fn request_redraw(&self);
}

impl<F: Fn()> Redraw for F {
    fn request_redraw(&self) {
        self();
    }
}
