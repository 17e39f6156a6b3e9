//! Store construction.
//!
//! The builder collects the declaration set and the plumbing around it
//! (saved state, effects, middlewares, preprocessors, the equality
//! strategy) and hands the slices to the dependency graph resolver on
//! [`build`](StoreBuilder::build). All declaration errors surface there;
//! a failed build leaves no usable store.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::error::StoreError;
use crate::graph::resolve;
use crate::slice::{ActionType, Slice};
use crate::value::Equality;

use super::listener::ListenerSet;
use super::middleware::{Middleware, MiddlewareStack};
use super::store::{EffectFn, PreprocessorFn, Store};

/// Collects declarations and produces a [`Store`].
pub struct StoreBuilder<A: ActionType> {
    slices: IndexMap<String, Slice<A>>,
    saved_state: Option<IndexMap<String, Value>>,
    effects: Vec<(A, EffectFn<A>)>,
    middlewares: MiddlewareStack<A>,
    preprocessors: HashMap<A, PreprocessorFn>,
    equality: Equality,
}

impl<A: ActionType> StoreBuilder<A> {
    pub fn new() -> Self {
        Self {
            slices: IndexMap::new(),
            saved_state: None,
            effects: Vec::new(),
            middlewares: Vec::new(),
            preprocessors: HashMap::new(),
            equality: Equality::default(),
        }
    }

    /// Declare a slice. Names are unique across the set; redeclaring a name
    /// replaces the earlier declaration.
    pub fn slice(mut self, name: impl Into<String>, slice: Slice<A>) -> Self {
        let name = name.into();
        if self.slices.insert(name.clone(), slice).is_some() {
            warn!(slice = %name, "slice redeclared, replacing earlier declaration");
        }
        self
    }

    /// Persisted values to merge over the resolved initial state, last write
    /// wins, applied once before any dispatch. Only source slices are
    /// merged; derived slices always recompute from their dependencies.
    pub fn saved_state(mut self, saved: impl IntoIterator<Item = (String, Value)>) -> Self {
        let merged = self
            .saved_state
            .get_or_insert_with(IndexMap::new);
        merged.extend(saved);
        self
    }

    /// Register an effect for an action. Effects run after the mutation
    /// pipeline and listener notification; each receives the live store and
    /// the payload, and may re-dispatch.
    pub fn effect(mut self, action: A, effect: impl Fn(&mut Store<A>, &Value) + 'static) -> Self {
        self.effects.push((action, Rc::new(effect)));
        self
    }

    /// Append a middleware. Chains run in declaration order: the first
    /// declared middleware observes the action first.
    pub fn middleware(mut self, middleware: impl Middleware<A> + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Register a payload preprocessor for an action, run after middleware
    /// and before routing. One preprocessor per action; a later registration
    /// replaces the earlier one.
    pub fn preprocessor(mut self, action: A, preprocess: impl Fn(Value) -> Value + 'static) -> Self {
        self.preprocessors.insert(action, Box::new(preprocess));
        self
    }

    /// Pick the equality strategy; [`Equality::Deep`] if never called.
    pub fn equality(mut self, equality: Equality) -> Self {
        self.equality = equality;
        self
    }

    /// Resolve the declaration set and produce the store.
    pub fn build(self) -> Result<Store<A>, StoreError> {
        let resolved = resolve(self.slices, self.saved_state)?;

        let mut effects: HashMap<A, Vec<EffectFn<A>>> = HashMap::new();
        for (action, effect) in self.effects {
            effects.entry(action).or_default().push(effect);
        }

        let initial_state = resolved.state.clone();
        Ok(Store {
            state: resolved.state,
            initial_state,
            sources: resolved.sources,
            derived: resolved.derived,
            dependents: resolved.dependents,
            routes: resolved.routes,
            effects,
            middlewares: self.middlewares,
            preprocessors: self.preprocessors,
            equality: self.equality,
            listeners: ListenerSet::new(),
        })
    }
}

impl<A: ActionType> Default for StoreBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}
