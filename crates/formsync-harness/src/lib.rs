#![forbid(unsafe_code)]

//! Fixtures for exercising formsync bindings end-to-end.
//!
//! - [`MemoryStore`]: a [`Store`](formsync_runtime::Store) over one JSON
//!   state tree, with a dispatch log, injectable failures and latency.
//! - [`TestForm`]: a [`Form`](formsync_runtime::Form) over one JSON value,
//!   with an optional validator.
//! - [`RedrawCounter`]: a [`Redraw`](formsync_runtime::Redraw) hook that
//!   counts requests.
//! - [`strategies`]: proptest generators for models and input bursts.

pub mod form;
pub mod store;
pub mod strategies;

pub use form::{RedrawCounter, TestForm};
pub use store::MemoryStore;

use formsync_core::RecordPath;

/// Parse a path literal, panicking on malformed input.
///
/// Meant for tests, where the literal is known good.
#[must_use]
pub fn path(literal: &str) -> RecordPath {
    match RecordPath::parse(literal) {
        Ok(path) => path,
        Err(err) => panic!("bad path literal {literal:?}: {err}"),
    }
}
