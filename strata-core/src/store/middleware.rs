//! Middleware chain around the mutation pipeline.
//!
//! Middlewares wrap dispatch: each one observes the action before the
//! reducers run and may pass it through unchanged, rewrite the action or its
//! payload, or swallow the dispatch entirely. Composition is declared-array
//! order, applied outer-to-inner, so the first declared middleware observes
//! the action first.

use indexmap::IndexMap;
use serde_json::Value;

use crate::slice::ActionType;

/// A dispatch wrapper.
///
/// Any `FnMut(A, Value, &state) -> Option<(A, Value)>` closure qualifies
/// through the blanket implementation.
pub trait Middleware<A: ActionType> {
    /// Observe a dispatch before it reaches the reducers.
    ///
    /// Return `Some((action, payload))` to forward, possibly rewritten, or
    /// `None` to swallow the dispatch; a swallowed dispatch runs no reducers
    /// and produces an empty mutation record.
    fn process(
        &mut self,
        action: A,
        payload: Value,
        state: &IndexMap<String, Value>,
    ) -> Option<(A, Value)>;
}

impl<A, F> Middleware<A> for F
where
    A: ActionType,
    F: FnMut(A, Value, &IndexMap<String, Value>) -> Option<(A, Value)>,
{
    fn process(
        &mut self,
        action: A,
        payload: Value,
        state: &IndexMap<String, Value>,
    ) -> Option<(A, Value)> {
        self(action, payload, state)
    }
}

pub(crate) type MiddlewareStack<A> = Vec<Box<dyn Middleware<A>>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn closures_implement_the_trait() {
        let mut doubler = |action: &'static str, payload: Value, _state: &IndexMap<String, Value>| {
            Some((action, json!(payload.as_i64().unwrap_or(0) * 2)))
        };

        let state = IndexMap::new();
        let (action, payload) = doubler.process("BUMP", json!(3), &state).unwrap();
        assert_eq!(action, "BUMP");
        assert_eq!(payload, json!(6));
    }

    #[test]
    fn swallowing_returns_none() {
        let mut filter = |_action: &'static str, _payload: Value, _state: &IndexMap<String, Value>| {
            None::<(&'static str, Value)>
        };
        let state = IndexMap::new();
        assert!(filter.process("BUMP", Value::Null, &state).is_none());
    }
}
