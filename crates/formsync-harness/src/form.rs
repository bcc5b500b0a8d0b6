#![forbid(unsafe_code)]

//! Reference form and redraw fixtures.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use formsync_core::{FormErrors, FormStatus, UpdateOn, Value, merge_patch};
use formsync_runtime::{EventStream, Form, Redraw};

type Validator = Box<dyn Fn(&Value) -> Option<FormErrors>>;

/// A form group with one JSON value.
///
/// Every value change runs the optional validator, then emits the value and
/// the resulting status, in that order, like a real form group does.
pub struct TestForm {
    value: RefCell<Value>,
    dirty: Cell<bool>,
    disabled: Cell<bool>,
    status: Cell<FormStatus>,
    errors: RefCell<Option<FormErrors>>,
    update_on: UpdateOn,
    validator: RefCell<Option<Validator>>,
    patches: Cell<usize>,
    values: EventStream<Value>,
    statuses: EventStream<FormStatus>,
}

impl TestForm {
    #[must_use]
    pub fn new(value: Value) -> Rc<Self> {
        Self::with_update_on(value, UpdateOn::Change)
    }

    #[must_use]
    pub fn with_update_on(value: Value, update_on: UpdateOn) -> Rc<Self> {
        Rc::new(Self {
            value: RefCell::new(value),
            dirty: Cell::new(false),
            disabled: Cell::new(false),
            status: Cell::new(FormStatus::Valid),
            errors: RefCell::new(None),
            update_on,
            validator: RefCell::new(None),
            patches: Cell::new(0),
            values: EventStream::new(),
            statuses: EventStream::new(),
        })
    }

    /// Install a validator and re-validate without emitting.
    pub fn set_validator(&self, validator: impl Fn(&Value) -> Option<FormErrors> + 'static) {
        *self.validator.borrow_mut() = Some(Box::new(validator));
        self.validate();
    }

    /// A user edit: replaces the value and marks the form dirty.
    pub fn input(&self, value: Value) {
        self.dirty.set(true);
        self.replace(value);
    }

    /// A programmatic change that leaves the dirty flag alone.
    pub fn set_value(&self, value: Value) {
        self.replace(value);
    }

    /// Force a status and emit it, as an async validator would.
    pub fn set_status(&self, status: FormStatus) {
        self.status.set(status);
        self.statuses.emit(&status);
    }

    /// How many times `patch_value` was called.
    #[must_use]
    pub fn patch_count(&self) -> usize {
        self.patches.get()
    }

    fn replace(&self, value: Value) {
        *self.value.borrow_mut() = value;
        self.changed();
    }

    fn validate(&self) {
        if self.disabled.get() {
            self.status.set(FormStatus::Disabled);
            return;
        }
        let errors = {
            let validator = self.validator.borrow();
            let value = self.value.borrow();
            validator.as_ref().and_then(|validate| validate(&value))
        };
        let status = if errors.is_some() {
            FormStatus::Invalid
        } else {
            FormStatus::Valid
        };
        *self.errors.borrow_mut() = errors;
        self.status.set(status);
    }

    fn changed(&self) {
        self.validate();
        let value = self.value.borrow().clone();
        self.values.emit(&value);
        self.statuses.emit(&self.status.get());
    }
}

impl Form for TestForm {
    fn raw_value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn patch_value(&self, value: &Value) {
        self.patches.set(self.patches.get() + 1);
        merge_patch(&mut self.value.borrow_mut(), value);
        self.changed();
    }

    fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn mark_dirty(&self) {
        self.dirty.set(true);
    }

    fn mark_pristine(&self) {
        self.dirty.set(false);
    }

    fn is_disabled(&self) -> bool {
        self.disabled.get()
    }

    fn enable(&self) {
        self.disabled.set(false);
        self.validate();
        self.statuses.emit(&self.status.get());
    }

    fn disable(&self) {
        self.disabled.set(true);
        self.validate();
        self.statuses.emit(&self.status.get());
    }

    fn status(&self) -> FormStatus {
        self.status.get()
    }

    fn errors(&self) -> Option<FormErrors> {
        self.errors.borrow().clone()
    }

    fn update_on(&self) -> UpdateOn {
        self.update_on
    }

    fn value_changes(&self) -> &EventStream<Value> {
        &self.values
    }

    fn status_changes(&self) -> &EventStream<FormStatus> {
        &self.statuses
    }
}

/// Counts redraw requests. Clones share the count.
#[derive(Clone, Debug, Default)]
pub struct RedrawCounter {
    count: Rc<Cell<usize>>,
}

impl RedrawCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count.get()
    }
}

impl Redraw for RedrawCounter {
    fn request_redraw(&self) {
        self.count.set(self.count.get() + 1);
    }
}
