//! The store: state map, dispatch pipeline, and synthetic updates.
//!
//! A [`Store`] owns the state map, the per-slice specs, the reverse
//! dependency index, and the action routing table produced by resolution.
//! External code never holds a mutable reference to state; it sees values
//! through `&` views and through mutation records.
//!
//! # How a Dispatch Runs
//!
//! 1. The middleware chain observes the action, outermost first. Any
//!    middleware may rewrite the pair or swallow the dispatch.
//! 2. A registered payload preprocessor, if any, transforms the payload.
//! 3. The routing table fans the action out to every source slice with a
//!    reducer bound to it, in declaration order. An action with no reducers
//!    and no effects fails with `UnknownActionType`.
//! 4. Each reducer runs under the copy-on-write draft contract. A committed
//!    value that differs from the old one is written to state, recorded in
//!    the mutation record, and propagated through the dependency graph,
//!    appending any cascaded derived changes to the same record.
//! 5. Listeners observe the finished record, in subscription order.
//! 6. Effects bound to the action run last; each receives the live store
//!    and may re-dispatch. Re-entrant dispatches complete fully, with their
//!    own records, before the effect returns.
//!
//! # Threading
//!
//! The store is single-threaded by design: `dispatch` takes `&mut self` and
//! runs to completion before returning, so no two dispatches can interleave
//! their mutation records. Embedding in a multi-threaded host requires
//! serializing dispatches externally; the store provides no internal
//! locking and is deliberately not `Send` or `Sync`.

use std::collections::HashMap;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

use crate::error::StoreError;
use crate::graph::{DerivedSpec, SourceSpec};
use crate::slice::ActionType;
use crate::value::Equality;

use super::builder::StoreBuilder;
use super::listener::{ListenerId, ListenerSet};
use super::middleware::MiddlewareStack;
use super::mutation::{Delta, Mutation};
use super::propagation::PropagationPass;

/// An alternate action handler: receives the live store and the payload,
/// and may re-dispatch. Effects do not participate in the dependency graph.
pub(crate) type EffectFn<A> = Rc<dyn Fn(&mut Store<A>, &Value)>;

/// A per-action payload transformer, run before routing.
pub(crate) type PreprocessorFn = Box<dyn Fn(Value) -> Value>;

/// A sliced state container with derived-value propagation.
///
/// Built with [`StoreBuilder`]; see the crate docs for a worked example.
pub struct Store<A: ActionType> {
    pub(crate) state: IndexMap<String, Value>,
    /// Deep copy of state as it stood right after construction, including
    /// the saved-state merge; `synthetic_reset` replays it.
    pub(crate) initial_state: IndexMap<String, Value>,
    pub(crate) sources: IndexMap<String, SourceSpec<A>>,
    pub(crate) derived: IndexMap<String, DerivedSpec>,
    pub(crate) dependents: HashMap<String, SmallVec<[String; 2]>>,
    pub(crate) routes: HashMap<A, SmallVec<[String; 2]>>,
    pub(crate) effects: HashMap<A, Vec<EffectFn<A>>>,
    pub(crate) middlewares: MiddlewareStack<A>,
    pub(crate) preprocessors: HashMap<A, PreprocessorFn>,
    pub(crate) equality: Equality,
    pub(crate) listeners: ListenerSet<A>,
}

impl<A: ActionType + std::fmt::Debug> std::fmt::Debug for Store<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .field("initial_state", &self.initial_state)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("derived", &self.derived.keys().collect::<Vec<_>>())
            .field("dependents", &self.dependents)
            .field("routes", &self.routes)
            .field("equality", &self.equality)
            .finish()
    }
}

impl<A: ActionType> Store<A> {
    /// Start declaring a store.
    pub fn builder() -> StoreBuilder<A> {
        StoreBuilder::new()
    }

    /// Read view of the whole state map.
    pub fn state(&self) -> &IndexMap<String, Value> {
        &self.state
    }

    /// Current value of one slice.
    pub fn get(&self, slice: &str) -> Option<&Value> {
        self.state.get(slice)
    }

    /// Names of every declared slice.
    pub fn slice_names(&self) -> impl Iterator<Item = &str> {
        self.state.keys().map(String::as_str)
    }

    /// Whether dispatching this action would reach any reducer or effect.
    pub fn has_action(&self, action: &A) -> bool {
        self.routes.contains_key(action) || self.effects.contains_key(action)
    }

    /// The equality strategy this store was built with.
    pub fn equality(&self) -> Equality {
        self.equality
    }

    /// Register a listener; it observes every mutation record from now on.
    pub fn subscribe(&mut self, listener: impl FnMut(&Mutation<A>) + 'static) -> ListenerId {
        self.listeners.insert(Box::new(listener))
    }

    /// Remove a listener. Returns `false` when the id was already removed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    /// Route an action through the mutation pipeline.
    ///
    /// Returns the mutation record summarizing every slice that changed,
    /// including cascaded derived changes. A dispatch swallowed by
    /// middleware returns an empty record.
    pub fn dispatch(&mut self, action: A, payload: impl Into<Value>) -> Result<Mutation<A>, StoreError> {
        let payload: Value = payload.into();

        let Some((action, payload)) = self.run_middlewares(action, payload) else {
            debug!("dispatch swallowed by middleware");
            return Ok(Mutation::swallowed());
        };

        let payload = match self.preprocessors.get(&action) {
            Some(preprocess) => preprocess(payload),
            None => payload,
        };

        let targets: SmallVec<[String; 2]> =
            self.routes.get(&action).cloned().unwrap_or_default();
        let has_effects = self.effects.contains_key(&action);
        if targets.is_empty() && !has_effects {
            return Err(StoreError::UnknownActionType { action: format!("{action:?}") });
        }

        debug!(action = ?action, reducers = targets.len(), "dispatching");
        let mut record = Mutation::for_action(action.clone(), payload.clone());

        for slice in &targets {
            let old = self
                .state
                .get(slice.as_str())
                .cloned()
                .expect("routed slice exists in state");
            let mut draft = old.clone();
            let committed = {
                let spec = self
                    .sources
                    .get(slice.as_str())
                    .expect("routing table only names source slices");
                let reducer = spec
                    .reducers
                    .get(&action)
                    .expect("route entries carry a reducer for the action");
                match reducer(&mut draft, &payload) {
                    Some(replacement) => replacement,
                    None => draft,
                }
            };

            if self.equality.eq(&old, &committed) {
                trace!(slice = %slice, "reducer result unchanged, skipping");
                continue;
            }

            self.state.insert(slice.clone(), committed.clone());
            record
                .changed
                .insert(slice.clone(), Delta { old, new: committed });

            let mut pass = PropagationPass {
                state: &mut self.state,
                derived: &self.derived,
                dependents: &self.dependents,
                equality: self.equality,
                changed: &mut record.changed,
            };
            pass.notify_changed(slice)?;
        }

        self.listeners.notify(&record);

        if has_effects {
            let effects: Vec<EffectFn<A>> =
                self.effects.get(&action).cloned().unwrap_or_default();
            for effect in effects {
                (*effect)(self, &payload);
            }
        }

        Ok(record)
    }

    /// Write slice values directly, bypassing the mutation pipeline.
    ///
    /// No reducers run and no propagation happens; the given values land in
    /// state as-is and listeners observe a record flagged `synthetic`. Every
    /// named slice is recorded, changed or not. This exists for external
    /// tooling that needs to force state outside normal dispatch; it can
    /// leave derived slices out of sync until the next dispatch.
    pub fn synthetic_update(
        &mut self,
        updates: impl IntoIterator<Item = (String, Value)>,
    ) -> Mutation<A> {
        let mut record = Mutation::for_synthetic();
        for (slice, value) in updates {
            match self.state.get(&slice) {
                Some(old) => {
                    let old = old.clone();
                    self.state.insert(slice.clone(), value.clone());
                    record.changed.insert(slice, Delta { old, new: value });
                }
                None => warn!(slice = %slice, "ignoring synthetic update for undeclared slice"),
            }
        }
        self.listeners.notify(&record);
        record
    }

    /// Reset every slice to its post-construction value through
    /// [`synthetic_update`](Self::synthetic_update).
    pub fn synthetic_reset(&mut self) -> Mutation<A> {
        let initial: Vec<(String, Value)> = self
            .initial_state
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();
        self.synthetic_update(initial)
    }

    /// Run the middleware chain in declared order. `None` means some
    /// middleware swallowed the dispatch.
    fn run_middlewares(&mut self, action: A, payload: Value) -> Option<(A, Value)> {
        if self.middlewares.is_empty() {
            return Some((action, payload));
        }

        // The stack is moved out for the duration of the chain so each
        // middleware can observe the state map while the store is borrowed.
        let mut middlewares = std::mem::take(&mut self.middlewares);
        let mut current = Some((action, payload));
        for middleware in middlewares.iter_mut() {
            let Some((action, payload)) = current.take() else {
                break;
            };
            current = middleware.process(action, payload, &self.state);
        }
        self.middlewares = middlewares;
        current
    }
}
