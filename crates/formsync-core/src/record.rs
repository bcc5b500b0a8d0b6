#![forbid(unsafe_code)]

//! The external form record and its typed projection.
//!
//! A record is a JSON object living at a [`RecordPath`](crate::RecordPath)
//! inside the store's state tree:
//!
//! ```text
//! {
//!   "model":    <any JSON>,
//!   "dirty":    true | false | <unset>,
//!   "disabled": true | false | <unset>,
//!   "status":   "VALID" | "INVALID" | "PENDING" | "DISABLED" | <unset>,
//!   "errors":   { ... } | null
//! }
//! ```
//!
//! The store owns the record. [`RecordView`] reads it leniently: a sub-field
//! with an unexpected JSON type projects to `None`, which the binding treats
//! as "no instruction".

use core::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Validation errors keyed by validator name.
pub type FormErrors = Map<String, Value>;

/// Sub-field names inside a record.
pub mod field {
    pub const MODEL: &str = "model";
    pub const DIRTY: &str = "dirty";
    pub const DISABLED: &str = "disabled";
    pub const STATUS: &str = "status";
    pub const ERRORS: &str = "errors";
}

/// Validation status of a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormStatus {
    Valid,
    Invalid,
    Pending,
    Disabled,
}

impl FormStatus {
    /// Wire representation (`"VALID"`, `"INVALID"`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Pending => "PENDING",
            Self::Disabled => "DISABLED",
        }
    }

    /// Parse the wire representation. Unknown strings yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "VALID" => Some(Self::Valid),
            "INVALID" => Some(Self::Invalid),
            "PENDING" => Some(Self::Pending),
            "DISABLED" => Some(Self::Disabled),
            _ => None,
        }
    }
}

impl fmt::Display for FormStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// When a form publishes value changes.
///
/// Only [`UpdateOn::Change`] forms are debounced; the others already emit at
/// a coarse rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOn {
    /// Every edit.
    #[default]
    Change,
    /// When the control loses focus.
    Blur,
    /// When the form is submitted.
    Submit,
}

/// Typed, lenient view of a record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordView {
    /// `model`, with `null` mapped to `None`.
    pub model: Option<Value>,
    /// `dirty` when it is a strict boolean.
    pub dirty: Option<bool>,
    /// `disabled` when it is a strict boolean.
    pub disabled: Option<bool>,
    /// `status` when it is one of the known status strings.
    pub status: Option<FormStatus>,
    /// `errors` when it is an object.
    pub errors: Option<FormErrors>,
}

impl RecordView {
    /// Project a (possibly absent) record.
    #[must_use]
    pub fn of(record: Option<&Value>) -> Self {
        Self {
            model: Self::model_of(record),
            dirty: Self::flag_of(record, field::DIRTY),
            disabled: Self::flag_of(record, field::DISABLED),
            status: record
                .and_then(|r| r.get(field::STATUS))
                .and_then(Value::as_str)
                .and_then(FormStatus::parse),
            errors: record
                .and_then(|r| r.get(field::ERRORS))
                .and_then(Value::as_object)
                .cloned(),
        }
    }

    /// The record's `model`, or `None` when absent or `null`.
    #[must_use]
    pub fn model_of(record: Option<&Value>) -> Option<Value> {
        record
            .and_then(|r| r.get(field::MODEL))
            .filter(|v| !v.is_null())
            .cloned()
    }

    /// A boolean sub-field, or `None` when absent or not a strict boolean.
    #[must_use]
    pub fn flag_of(record: Option<&Value>, name: &str) -> Option<bool> {
        record.and_then(|r| r.get(name)).and_then(Value::as_bool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_wire_format() {
        assert_eq!(FormStatus::Valid.to_string(), "VALID");
        assert_eq!(
            serde_json::to_value(FormStatus::Pending).unwrap(),
            json!("PENDING")
        );
        assert_eq!(FormStatus::parse("INVALID"), Some(FormStatus::Invalid));
        assert_eq!(FormStatus::parse("valid"), None);
    }

    #[test]
    fn update_on_defaults_to_change() {
        assert_eq!(UpdateOn::default(), UpdateOn::Change);
        let parsed: UpdateOn = serde_json::from_value(json!("blur")).unwrap();
        assert_eq!(parsed, UpdateOn::Blur);
    }

    #[test]
    fn view_of_absent_record_is_empty() {
        assert_eq!(RecordView::of(None), RecordView::default());
    }

    #[test]
    fn view_of_full_record() {
        let record = json!({
            "model": {"a": 1},
            "dirty": true,
            "disabled": false,
            "status": "INVALID",
            "errors": {"required": true}
        });
        let view = RecordView::of(Some(&record));
        assert_eq!(view.model, Some(json!({"a": 1})));
        assert_eq!(view.dirty, Some(true));
        assert_eq!(view.disabled, Some(false));
        assert_eq!(view.status, Some(FormStatus::Invalid));
        assert_eq!(view.errors.unwrap().get("required"), Some(&json!(true)));
    }

    #[test]
    fn view_ignores_malformed_fields() {
        let record = json!({
            "model": null,
            "dirty": "yes",
            "disabled": 1,
            "status": "MAYBE",
            "errors": "none"
        });
        assert_eq!(RecordView::of(Some(&record)), RecordView::default());
    }
}
