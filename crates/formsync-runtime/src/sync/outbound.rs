#![forbid(unsafe_code)]

//! Form → record rules.

use std::cell::RefCell;
use std::rc::Rc;

use formsync_core::{FormAction, FormStatus, Value};
use tracing::trace;

use super::SyncContext;
use crate::debounce::{DebouncePolicy, Gate};
use crate::form::Form;
use crate::reactive::{BindingScope, Distinct};
use crate::scheduler::Scheduler;
use crate::strategy::ValueChangesStrategy;

/// Gate feeding value changes to the store.
///
/// The strategy only decides whether a change goes out. What goes out is a
/// fresh snapshot of the form taken at emission time, so value, dirty flag
/// and errors always agree with each other.
pub(super) fn value_gate(
    ctx: &Rc<SyncContext>,
    policy: DebouncePolicy,
    scheduler: &Scheduler,
    strategy: Box<dyn ValueChangesStrategy>,
) -> Gate<Value> {
    let ctx = Rc::clone(ctx);
    let strategy = RefCell::new(strategy);
    Gate::new(policy, scheduler, move |value: Value| {
        if ctx.cancel.is_cancelled() {
            return;
        }
        let shaped = strategy.borrow_mut().shape(value);
        if shaped.is_none() {
            trace!(path = %ctx.path, "value change dropped by strategy");
            return;
        }
        let Some(form) = ctx.form() else {
            return;
        };
        let actions = vec![
            FormAction::update_value(ctx.path.clone(), form.raw_value()),
            FormAction::update_dirty(ctx.path.clone(), form.is_dirty()),
            FormAction::update_errors(ctx.path.clone(), form.errors()),
        ];
        ctx.push_guarded(actions, "value");
    })
}

/// Gate feeding status changes to the store, repeats collapsed after the
/// window.
pub(super) fn status_gate(
    ctx: &Rc<SyncContext>,
    policy: DebouncePolicy,
    scheduler: &Scheduler,
) -> Gate<FormStatus> {
    let ctx = Rc::clone(ctx);
    let distinct = Distinct::new();
    Gate::new(policy, scheduler, move |status: FormStatus| {
        if ctx.cancel.is_cancelled() || !distinct.admit(&status) {
            return;
        }
        ctx.push(vec![FormAction::update_status(ctx.path.clone(), status)], "status");
    })
}

/// Feed the form's value changes into `gate` for the lifetime of `scope`.
pub(super) fn watch_values(
    scope: &mut BindingScope,
    ctx: &Rc<SyncContext>,
    form: &dyn Form,
    gate: Gate<Value>,
) {
    let ctx = Rc::clone(ctx);
    scope.subscribe_events(form.value_changes(), move |value: &Value| {
        if !ctx.cancel.is_cancelled() {
            gate.push(value.clone());
        }
    });
}

pub(super) fn watch_status(
    scope: &mut BindingScope,
    ctx: &Rc<SyncContext>,
    form: &dyn Form,
    gate: Gate<FormStatus>,
) {
    let ctx = Rc::clone(ctx);
    scope.subscribe_events(form.status_changes(), move |status: &FormStatus| {
        if !ctx.cancel.is_cancelled() {
            gate.push(*status);
        }
    });
}
