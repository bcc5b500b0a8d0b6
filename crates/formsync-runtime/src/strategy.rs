#![forbid(unsafe_code)]

//! Value-change shaping strategies.
//!
//! After the debounce gate, each outbound value change passes through a
//! [`ValueChangesStrategy`]. The strategy may drop the change (return `None`)
//! or hand on a different value; only surviving changes reach the store.
//!
//! # Resolution
//!
//! For each binding, in order of precedence:
//!
//! 1. the strategy passed to the binding builder,
//! 2. a fresh strategy from the global factory installed with
//!    [`set_global_strategy`] (thread-local),
//! 3. [`PassThrough`].

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

/// Shapes the stream of outbound value changes of one binding.
pub trait ValueChangesStrategy {
    /// Return the value to forward, or `None` to drop this change.
    fn shape(&mut self, value: Value) -> Option<Value>;
}

/// Identity strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl ValueChangesStrategy for PassThrough {
    fn shape(&mut self, value: Value) -> Option<Value> {
        Some(value)
    }
}

/// Drops changes structurally equal to the last forwarded value.
#[derive(Debug, Default, Clone)]
pub struct DistinctValues {
    last: Option<Value>,
}

impl ValueChangesStrategy for DistinctValues {
    fn shape(&mut self, value: Value) -> Option<Value> {
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }
}

impl<F: FnMut(Value) -> Option<Value>> ValueChangesStrategy for F {
    fn shape(&mut self, value: Value) -> Option<Value> {
        self(value)
    }
}

/// Builds one strategy per binding.
pub type StrategyFactory = Rc<dyn Fn() -> Box<dyn ValueChangesStrategy>>;

thread_local! {
    static GLOBAL_FACTORY: RefCell<Option<StrategyFactory>> = const { RefCell::new(None) };
}

/// Install the default strategy factory for bindings created on this thread.
pub fn set_global_strategy(factory: impl Fn() -> Box<dyn ValueChangesStrategy> + 'static) {
    GLOBAL_FACTORY.with(|slot| *slot.borrow_mut() = Some(Rc::new(factory)));
}

/// Remove the global factory; later bindings fall back to [`PassThrough`].
pub fn clear_global_strategy() {
    GLOBAL_FACTORY.with(|slot| slot.borrow_mut().take());
}

/// Resolve the strategy for a new binding.
#[must_use]
pub fn resolve_strategy(
    explicit: Option<Box<dyn ValueChangesStrategy>>,
) -> Box<dyn ValueChangesStrategy> {
    if let Some(strategy) = explicit {
        return strategy;
    }
    let factory = GLOBAL_FACTORY.with(|slot| slot.borrow().clone());
    match factory {
        Some(factory) => factory(),
        None => Box::new(PassThrough),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pass_through_is_identity() {
        let mut s = PassThrough;
        assert_eq!(s.shape(json!({"a": 1})), Some(json!({"a": 1})));
    }

    #[test]
    fn distinct_values_drops_repeats() {
        let mut s = DistinctValues::default();
        assert_eq!(s.shape(json!(1)), Some(json!(1)));
        assert_eq!(s.shape(json!(1)), None);
        assert_eq!(s.shape(json!(2)), Some(json!(2)));
        assert_eq!(s.shape(json!(1)), Some(json!(1)));
    }

    #[test]
    fn closures_are_strategies() {
        let mut only_objects = |v: Value| v.is_object().then_some(v);
        assert_eq!(only_objects.shape(json!(3)), None);
        assert_eq!(only_objects.shape(json!({})), Some(json!({})));
    }

    #[test]
    fn resolution_order() {
        clear_global_strategy();
        let mut fallback = resolve_strategy(None);
        assert_eq!(fallback.shape(json!(1)), Some(json!(1)));
        assert_eq!(fallback.shape(json!(1)), Some(json!(1)));

        set_global_strategy(|| Box::new(DistinctValues::default()));
        let mut global = resolve_strategy(None);
        assert_eq!(global.shape(json!(1)), Some(json!(1)));
        assert_eq!(global.shape(json!(1)), None);

        let mut explicit = resolve_strategy(Some(Box::new(|_: Value| -> Option<Value> { None })));
        assert_eq!(explicit.shape(json!(1)), None);

        clear_global_strategy();
        let mut cleared = resolve_strategy(None);
        assert_eq!(cleared.shape(json!(1)), Some(json!(1)));
        assert_eq!(cleared.shape(json!(1)), Some(json!(1)));
    }
}
