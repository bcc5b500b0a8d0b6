#![forbid(unsafe_code)]

//! Core data model for formsync.
//!
//! This crate holds everything the binding controller and the stores agree on
//! without any callbacks or time involved:
//!
//! - [`RecordPath`]: dotted address of a form record inside a state tree.
//! - [`RecordView`]: lenient typed projection of a record's sub-fields.
//! - [`FormAction`] and [`apply_action`]: update requests and the pure reducer
//!   that applies them to a JSON state tree.
//! - [`merge_patch`] and friends: JSON helpers shared by forms and stores.
//! - [`BindingConfig`]: user-facing configuration of a single binding.

pub mod action;
pub mod config;
pub mod patch;
pub mod path;
pub mod record;

pub use action::{ActionError, FormAction, apply_action, apply_batch};
pub use config::{BindingConfig, BindingSettings, ConfigError, DEFAULT_DEBOUNCE_MS, DebounceWindow};
pub use patch::{is_truthy, merge_patch, set_at, value_at};
pub use path::{PathError, RecordPath};
pub use record::{FormErrors, FormStatus, RecordView, UpdateOn};

pub use serde_json::Value;
