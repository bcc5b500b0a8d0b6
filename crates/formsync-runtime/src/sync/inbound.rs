#![forbid(unsafe_code)]

//! Record → form rules.

use std::rc::Rc;

use formsync_core::{FormAction, RecordView, Value, is_truthy, merge_patch, record::field};
use tracing::trace;

use super::SyncContext;
use crate::form::Form;
use crate::reactive::{Distinct, Subscription};

/// Patch the form whenever the record's model changes.
///
/// Skipped while an outbound dispatch is in flight, for absent or falsy
/// models, and for models the form already reflects.
pub(super) fn watch_model(ctx: &Rc<SyncContext>) -> Subscription {
    let ctx = Rc::clone(ctx);
    let distinct = Distinct::new();
    let path = ctx.path.clone();
    ctx.store.clone().select(
        &path,
        Box::new(move |record: Option<&Value>| {
            if ctx.cancel.is_cancelled() {
                return;
            }
            let model = RecordView::model_of(record);
            if !distinct.admit(&model) {
                return;
            }
            if ctx.guard.is_updating() {
                trace!(path = %ctx.path, "model change ignored: own dispatch in flight");
                return;
            }
            let Some(model) = model.filter(is_truthy) else {
                return;
            };
            let Some(form) = ctx.form() else {
                return;
            };
            let current = form.raw_value();
            let mut patched = current.clone();
            merge_patch(&mut patched, &model);
            if patched == current {
                return;
            }
            trace!(path = %ctx.path, "patching form from record model");
            form.patch_value(&model);
            ctx.request_redraw();
        }),
    )
}

/// A boolean record sub-field mirrored onto the form.
#[derive(Clone, Copy, Debug)]
pub(super) enum Flag {
    Dirty,
    Disabled,
}

impl Flag {
    fn field(self) -> &'static str {
        match self {
            Self::Dirty => field::DIRTY,
            Self::Disabled => field::DISABLED,
        }
    }

    fn read(self, form: &dyn Form) -> bool {
        match self {
            Self::Dirty => form.is_dirty(),
            Self::Disabled => form.is_disabled(),
        }
    }

    fn apply(self, form: &dyn Form, on: bool) {
        match (self, on) {
            (Self::Dirty, true) => form.mark_dirty(),
            (Self::Dirty, false) => form.mark_pristine(),
            (Self::Disabled, true) => form.disable(),
            (Self::Disabled, false) => form.enable(),
        }
    }
}

/// Mirror a strict-boolean record flag onto the form.
///
/// Non-boolean or absent values are no instruction and leave the form alone.
pub(super) fn watch_flag(ctx: &Rc<SyncContext>, flag: Flag) -> Subscription {
    let ctx = Rc::clone(ctx);
    let distinct = Distinct::new();
    let path = ctx.path.clone();
    ctx.store.clone().select(
        &path,
        Box::new(move |record: Option<&Value>| {
            if ctx.cancel.is_cancelled() {
                return;
            }
            let value = RecordView::flag_of(record, flag.field());
            if !distinct.admit(&value) {
                return;
            }
            let Some(on) = value else {
                return;
            };
            let Some(form) = ctx.form() else {
                return;
            };
            if flag.read(form.as_ref()) == on {
                return;
            }
            trace!(path = %ctx.path, flag = flag.field(), on, "applying record flag to form");
            flag.apply(form.as_ref(), on);
            ctx.request_redraw();
        }),
    )
}

/// Seed the record from the form, once, on the first observation of the
/// record (present or not).
///
/// The batch carries the form's state as of activation, not as of delivery.
/// It does not take the guard: a model written while it is in flight still
/// reaches the form.
pub(super) fn initial_sync(ctx: &Rc<SyncContext>, form: &dyn Form) -> Subscription {
    let actions = vec![
        FormAction::update_value(ctx.path.clone(), form.raw_value()),
        FormAction::update_status(ctx.path.clone(), form.status()),
        FormAction::update_dirty(ctx.path.clone(), form.is_dirty()),
    ];
    let ctx = Rc::clone(ctx);
    let path = ctx.path.clone();
    ctx.store.clone().select_once(
        &path,
        Box::new(move |_record: Option<&Value>| {
            if ctx.cancel.is_cancelled() {
                return;
            }
            ctx.push(actions, "initial_sync");
        }),
    )
}
