#![forbid(unsafe_code)]

//! Update requests understood by form-record stores.
//!
//! Every [`FormAction`] targets exactly one record (its `path`) and carries one
//! semantic payload. [`apply_action`] is the reference reducer: stores that
//! keep their state as a JSON tree can use it directly.
//!
//! # Invariants
//!
//! 1. An action only touches the record at its own `path`.
//! 2. Missing intermediate objects on the way to the record are created.
//! 3. A rejected action leaves the state untouched.
//! 4. [`apply_batch`] is all-or-nothing: the first rejected action discards
//!    the whole batch.

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::patch::{slot_at, take_object};
use crate::path::{PathError, RecordPath};
use crate::record::{FormErrors, FormStatus, field};

/// Errors from applying a [`FormAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// `UpdateFormValue::property_path` was not a valid dotted path.
    InvalidPropertyPath { property_path: String, source: PathError },
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPropertyPath {
                property_path,
                source,
            } => write!(f, "invalid property path '{property_path}': {source}"),
        }
    }
}

impl std::error::Error for ActionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPropertyPath { source, .. } => Some(source),
        }
    }
}

/// A request to mutate the record at `path`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormAction {
    /// Replace model, dirty, status and errors in one go.
    UpdateForm {
        path: RecordPath,
        value: Value,
        dirty: Option<bool>,
        status: Option<FormStatus>,
        errors: Option<FormErrors>,
    },
    /// Replace the model, or one property inside it.
    UpdateFormValue {
        path: RecordPath,
        value: Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        property_path: Option<String>,
    },
    UpdateFormStatus {
        path: RecordPath,
        status: Option<FormStatus>,
    },
    UpdateFormDirty {
        path: RecordPath,
        dirty: bool,
    },
    UpdateFormErrors {
        path: RecordPath,
        errors: Option<FormErrors>,
    },
    SetFormDirty {
        path: RecordPath,
    },
    SetFormPristine {
        path: RecordPath,
    },
    SetFormDisabled {
        path: RecordPath,
    },
    SetFormEnabled {
        path: RecordPath,
    },
    /// Mark the record pristine and optionally replace its model.
    ResetForm {
        path: RecordPath,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<Value>,
    },
}

impl FormAction {
    /// The whole-record reset used when a binding clears its record.
    #[must_use]
    pub fn clear(path: RecordPath) -> Self {
        Self::UpdateForm {
            path,
            value: Value::Null,
            dirty: None,
            status: None,
            errors: None,
        }
    }

    #[must_use]
    pub fn update_value(path: RecordPath, value: Value) -> Self {
        Self::UpdateFormValue {
            path,
            value,
            property_path: None,
        }
    }

    #[must_use]
    pub fn update_status(path: RecordPath, status: FormStatus) -> Self {
        Self::UpdateFormStatus {
            path,
            status: Some(status),
        }
    }

    #[must_use]
    pub fn update_dirty(path: RecordPath, dirty: bool) -> Self {
        Self::UpdateFormDirty { path, dirty }
    }

    #[must_use]
    pub fn update_errors(path: RecordPath, errors: Option<FormErrors>) -> Self {
        Self::UpdateFormErrors { path, errors }
    }

    /// The record this action targets.
    #[must_use]
    pub fn path(&self) -> &RecordPath {
        match self {
            Self::UpdateForm { path, .. }
            | Self::UpdateFormValue { path, .. }
            | Self::UpdateFormStatus { path, .. }
            | Self::UpdateFormDirty { path, .. }
            | Self::UpdateFormErrors { path, .. }
            | Self::SetFormDirty { path }
            | Self::SetFormPristine { path }
            | Self::SetFormDisabled { path }
            | Self::SetFormEnabled { path }
            | Self::ResetForm { path, .. } => path,
        }
    }

    /// Short action name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UpdateForm { .. } => "update_form",
            Self::UpdateFormValue { .. } => "update_form_value",
            Self::UpdateFormStatus { .. } => "update_form_status",
            Self::UpdateFormDirty { .. } => "update_form_dirty",
            Self::UpdateFormErrors { .. } => "update_form_errors",
            Self::SetFormDirty { .. } => "set_form_dirty",
            Self::SetFormPristine { .. } => "set_form_pristine",
            Self::SetFormDisabled { .. } => "set_form_disabled",
            Self::SetFormEnabled { .. } => "set_form_enabled",
            Self::ResetForm { .. } => "reset_form",
        }
    }
}

fn status_value(status: Option<FormStatus>) -> Value {
    status.map_or(Value::Null, |s| Value::String(s.as_str().to_owned()))
}

fn errors_value(errors: Option<&FormErrors>) -> Value {
    errors.map_or(Value::Null, |e| Value::Object(e.clone()))
}

/// Apply one action to `state` in place.
///
/// # Errors
///
/// Returns [`ActionError`] when the action is malformed; `state` is left
/// untouched in that case.
pub fn apply_action(state: &mut Value, action: &FormAction) -> Result<(), ActionError> {
    // Validate before touching the tree.
    let property_segments = match action {
        FormAction::UpdateFormValue {
            property_path: Some(property_path),
            ..
        } => Some(RecordPath::parse(property_path).map_err(|source| {
            ActionError::InvalidPropertyPath {
                property_path: property_path.clone(),
                source,
            }
        })?),
        _ => None,
    };

    let path = action.path();
    let slot = slot_at(state, path.segments().iter().map(String::as_str));
    let mut record = take_object(slot);

    match action {
        FormAction::UpdateForm {
            value,
            dirty,
            status,
            errors,
            ..
        } => {
            record.insert(field::MODEL.into(), value.clone());
            record.insert(field::DIRTY.into(), dirty.map_or(Value::Null, Value::Bool));
            record.insert(field::STATUS.into(), status_value(*status));
            record.insert(field::ERRORS.into(), errors_value(errors.as_ref()));
        }
        FormAction::UpdateFormValue { value, .. } => match property_segments {
            Some(property) => {
                let model = record.entry(field::MODEL).or_insert(Value::Null);
                *slot_at(model, property.segments().iter().map(String::as_str)) = value.clone();
            }
            None => {
                record.insert(field::MODEL.into(), value.clone());
            }
        },
        FormAction::UpdateFormStatus { status, .. } => {
            record.insert(field::STATUS.into(), status_value(*status));
        }
        FormAction::UpdateFormDirty { dirty, .. } => {
            record.insert(field::DIRTY.into(), Value::Bool(*dirty));
        }
        FormAction::UpdateFormErrors { errors, .. } => {
            record.insert(field::ERRORS.into(), errors_value(errors.as_ref()));
        }
        FormAction::SetFormDirty { .. } => {
            record.insert(field::DIRTY.into(), Value::Bool(true));
        }
        FormAction::SetFormPristine { .. } => {
            record.insert(field::DIRTY.into(), Value::Bool(false));
        }
        FormAction::SetFormDisabled { .. } => {
            record.insert(field::DISABLED.into(), Value::Bool(true));
        }
        FormAction::SetFormEnabled { .. } => {
            record.insert(field::DISABLED.into(), Value::Bool(false));
        }
        FormAction::ResetForm { value, .. } => {
            if let Some(value) = value {
                record.insert(field::MODEL.into(), value.clone());
            }
            record.insert(field::DIRTY.into(), Value::Bool(false));
        }
    }
    *slot = Value::Object(record);
    Ok(())
}

/// Apply a batch of actions to a copy of `state`.
///
/// # Errors
///
/// Returns the first [`ActionError`]; no partial result is produced.
pub fn apply_batch(state: &Value, actions: &[FormAction]) -> Result<Value, ActionError> {
    let mut next = state.clone();
    for action in actions {
        apply_action(&mut next, action)?;
    }
    Ok(next)
}
