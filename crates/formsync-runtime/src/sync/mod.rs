#![forbid(unsafe_code)]

//! Bidirectional form ↔ record synchronization.
//!
//! A [`FormBinding`] links one [`Form`] to the record at one [`RecordPath`]
//! of a [`Store`]. It owns nothing but its subscriptions: the form belongs to
//! the UI layer, the record to the store.
//!
//! # Rules
//!
//! | Direction | Trigger | Effect |
//! |-----------|---------|--------|
//! | inbound | record `model` changed | `patch_value` + redraw, unless a value dispatch of ours is in flight, the model is falsy, or the form already reflects it |
//! | inbound | record `dirty` changed | `mark_dirty` / `mark_pristine` when it is a bool that differs from the form |
//! | inbound | record `disabled` changed | `disable` / `enable`, same conditions |
//! | inbound | first observation of the record | `[UpdateFormValue, UpdateFormStatus, UpdateFormDirty]` from the form as of activation |
//! | outbound | form value changed | gate → strategy → `[UpdateFormValue, UpdateFormDirty, UpdateFormErrors]` |
//! | outbound | form status changed | gate → repeat filter → `[UpdateFormStatus]` |
//!
//! # Invariants
//!
//! 1. While a value dispatch is in flight, record model changes are not
//!    applied to the form. The initial sync never holds the guard.
//! 2. The in-flight guard is released when the dispatch settles, whether it
//!    succeeded, failed, or was abandoned by the store.
//! 3. The initial sync is pushed at most once per binding.
//! 4. After [`FormBinding::teardown`], no rule touches the form or the store
//!    again, pending debounce timers included.
//! 5. Teardown is idempotent; the optional clear is dispatched at most once.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Dispatch rejected | Store refuses the batch | `warn!`, guard released, no retry |
//! | Dispatch abandoned | Store dropped the completer | Same as rejected |
//! | Form dropped | UI layer released the form | Every rule becomes a no-op |
//! | Malformed record field | Non-bool `dirty`/`disabled`, falsy `model` | Ignored |

mod guard;
mod inbound;
mod outbound;

use std::rc::{Rc, Weak};

use formsync_core::{
    BindingConfig, BindingSettings, ConfigError, FormAction, FormStatus, RecordPath, Value,
};
use tracing::{debug, trace, warn};

pub use guard::{CancelToken, InFlight, ReentrancyGuard};

use crate::debounce::{DebouncePolicy, Gate};
use crate::form::{Form, Redraw};
use crate::reactive::BindingScope;
use crate::scheduler::Scheduler;
use crate::store::Store;
use crate::strategy::{ValueChangesStrategy, resolve_strategy};

/// State shared by every rule of one binding.
pub(crate) struct SyncContext {
    path: RecordPath,
    store: Rc<dyn Store>,
    form: Weak<dyn Form>,
    redraw: Option<Rc<dyn Redraw>>,
    guard: ReentrancyGuard,
    cancel: CancelToken,
}

impl SyncContext {
    /// The bound form, unless the binding was cancelled or the form dropped.
    fn form(&self) -> Option<Rc<dyn Form>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.form.upgrade()
    }

    fn request_redraw(&self) {
        if let Some(redraw) = &self.redraw {
            redraw.request_redraw();
        }
    }

    /// Dispatch while holding the in-flight guard until the store settles.
    fn push_guarded(&self, actions: Vec<FormAction>, origin: &'static str) {
        let ticket = self.guard.enter();
        self.send(actions, origin, Some(ticket));
    }

    /// Dispatch without touching the guard.
    fn push(&self, actions: Vec<FormAction>, origin: &'static str) {
        self.send(actions, origin, None);
    }

    fn send(&self, actions: Vec<FormAction>, origin: &'static str, ticket: Option<InFlight>) {
        trace!(path = %self.path, origin, actions = actions.len(), "dispatching");
        let path = self.path.clone();
        self.store.dispatch(actions).on_complete(move |result| {
            drop(ticket);
            if let Err(err) = result {
                warn!(path = %path, origin, error = %err, "dispatch failed");
            }
        });
    }
}

/// Configures and activates a [`FormBinding`].
pub struct FormBindingBuilder {
    settings: BindingSettings,
    strategy: Option<Box<dyn ValueChangesStrategy>>,
    redraw: Option<Rc<dyn Redraw>>,
}

impl FormBindingBuilder {
    /// Use `strategy` for this binding instead of the thread-global default.
    #[must_use]
    pub fn strategy(mut self, strategy: impl ValueChangesStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Call `redraw` after every inbound change applied to the form.
    #[must_use]
    pub fn redraw(mut self, redraw: impl Redraw + 'static) -> Self {
        self.redraw = Some(Rc::new(redraw));
        self
    }

    /// Wire the form to the store and push the initial sync.
    ///
    /// Rules are established in this order: model, dirty, disabled, initial
    /// sync, value changes, status changes. The initial-sync batch is
    /// snapshotted here; with a store that delivers the current record
    /// synchronously, a record already holding a model is therefore merged
    /// into the form before that snapshot is taken.
    pub fn activate<F, S>(self, form: &Rc<F>, store: &Rc<S>, scheduler: &Scheduler) -> FormBinding
    where
        F: Form + 'static,
        S: Store + 'static,
    {
        let form_dyn: Rc<dyn Form> = Rc::clone(form) as Rc<dyn Form>;
        let store_dyn: Rc<dyn Store> = Rc::clone(store) as Rc<dyn Store>;
        let ctx = Rc::new(SyncContext {
            path: self.settings.path.clone(),
            store: store_dyn,
            form: Rc::downgrade(&form_dyn),
            redraw: self.redraw,
            guard: ReentrancyGuard::new(),
            cancel: CancelToken::new(),
        });

        let policy = DebouncePolicy::resolve(form.update_on(), self.settings.debounce);
        let strategy = resolve_strategy(self.strategy);
        let value_gate = outbound::value_gate(&ctx, policy, scheduler, strategy);
        let status_gate = outbound::status_gate(&ctx, policy, scheduler);

        debug!(path = %ctx.path, ?policy, "activating form binding");

        let mut scope = BindingScope::new();
        scope.hold(inbound::watch_model(&ctx));
        scope.hold(inbound::watch_flag(&ctx, inbound::Flag::Dirty));
        scope.hold(inbound::watch_flag(&ctx, inbound::Flag::Disabled));
        scope.hold(inbound::initial_sync(&ctx, form.as_ref()));
        outbound::watch_values(&mut scope, &ctx, form.as_ref(), value_gate.clone());
        outbound::watch_status(&mut scope, &ctx, form.as_ref(), status_gate.clone());

        FormBinding {
            ctx,
            scope,
            value_gate,
            status_gate,
            clear_on_teardown: self.settings.clear_on_teardown,
            torn_down: false,
        }
    }
}

/// A live link between one form and one store record.
///
/// Dropping the binding tears it down.
pub struct FormBinding {
    ctx: Rc<SyncContext>,
    scope: BindingScope,
    value_gate: Gate<Value>,
    status_gate: Gate<FormStatus>,
    clear_on_teardown: bool,
    torn_down: bool,
}

impl FormBinding {
    #[must_use]
    pub fn builder(settings: BindingSettings) -> FormBindingBuilder {
        FormBindingBuilder {
            settings,
            strategy: None,
            redraw: None,
        }
    }

    /// Validate `config` and start a builder from it.
    pub fn from_config(config: &BindingConfig) -> Result<FormBindingBuilder, ConfigError> {
        Ok(Self::builder(config.validate()?))
    }

    #[must_use]
    pub fn path(&self) -> &RecordPath {
        &self.ctx.path
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.torn_down
    }

    /// Whether a value dispatch of this binding is still in flight.
    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.ctx.guard.is_updating()
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.scope.binding_count()
    }

    /// Whether a debounced value or status is waiting for its window.
    #[must_use]
    pub fn has_pending_outbound(&self) -> bool {
        self.value_gate.has_pending() || self.status_gate.has_pending()
    }

    /// Stop synchronizing.
    ///
    /// Cancels every rule, drops pending debounced emissions and, when
    /// configured, clears the record with a single whole-record update.
    /// Calling it again does nothing.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.ctx.cancel.cancel();
        self.scope.clear();
        self.value_gate.cancel();
        self.status_gate.cancel();
        debug!(path = %self.ctx.path, clear = self.clear_on_teardown, "form binding torn down");

        if self.clear_on_teardown {
            self.ctx.push(vec![FormAction::clear(self.ctx.path.clone())], "clear");
        }
    }
}

impl Drop for FormBinding {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for FormBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormBinding")
            .field("path", &self.ctx.path)
            .field("active", &self.is_active())
            .field("in_flight", &self.ctx.guard.in_flight())
            .field("subscriptions", &self.scope.binding_count())
            .finish()
    }
}
