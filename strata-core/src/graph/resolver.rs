//! Initialization-time resolution of the slice declaration set.
//!
//! # Algorithm
//!
//! 1. Partition the declarations in declaration order. Source slices resolve
//!    immediately: their initial value goes straight into the state map and
//!    their reducer bindings are scanned into the action routing table.
//!    Derived slice names enter the resolution queue.
//!
//! 2. Merge any saved state over the resolved source values. This happens
//!    before derived resolution so that derived initials settle against the
//!    saved values, never against discarded ones.
//!
//! 3. Work the queue: if every dependency of the head is present in state,
//!    compute its value (arguments in declared dependency order), store it,
//!    and register the slice in the reverse-dependency index under each of
//!    its dependencies. Otherwise rotate the head to the tail. A dependency
//!    name that is not declared anywhere fails immediately; a queue
//!    configuration that repeats fails as a cycle.
//!
//! The queue and its snapshot history are discarded on success; what remains
//! is the initial state map, the per-slice specs, the reverse-dependency
//! index, and the routing table.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::error::StoreError;
use crate::slice::{ActionType, Compute, Reducer, Slice};

use super::ResolutionQueue;

/// A resolved source slice: its reducers, keyed by action type.
pub(crate) struct SourceSpec<A> {
    pub reducers: HashMap<A, Reducer>,
}

/// A resolved derived slice: its dependency list and compute function.
pub(crate) struct DerivedSpec {
    pub deps: SmallVec<[String; 4]>,
    pub compute: Compute,
}

/// Everything the resolver hands to the store.
pub(crate) struct ResolvedGraph<A> {
    /// Initial value of every declared slice, in declaration order (sources)
    /// followed by resolution order (derived).
    pub state: IndexMap<String, Value>,
    pub sources: IndexMap<String, SourceSpec<A>>,
    /// Derived specs in resolution order.
    pub derived: IndexMap<String, DerivedSpec>,
    /// Reverse-dependency index: slice name to the derived slices that list
    /// it as a dependency, in resolution order.
    pub dependents: HashMap<String, SmallVec<[String; 2]>>,
    /// Action routing table: action to the source slices whose reducers it
    /// fans out to, in declaration order.
    pub routes: HashMap<A, SmallVec<[String; 2]>>,
}

impl<A: std::fmt::Debug> std::fmt::Debug for ResolvedGraph<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedGraph")
            .field("state", &self.state)
            .field("sources", &self.sources.keys().collect::<Vec<_>>())
            .field("derived", &self.derived.keys().collect::<Vec<_>>())
            .field("dependents", &self.dependents)
            .field("routes", &self.routes)
            .finish()
    }
}

/// Resolve the declaration set into `(initial state, reverse index, specs)`.
pub(crate) fn resolve<A: ActionType>(
    slices: IndexMap<String, Slice<A>>,
    saved_state: Option<IndexMap<String, Value>>,
) -> Result<ResolvedGraph<A>, StoreError> {
    let mut state: IndexMap<String, Value> = IndexMap::with_capacity(slices.len());
    let mut sources: IndexMap<String, SourceSpec<A>> = IndexMap::new();
    let mut routes: HashMap<A, SmallVec<[String; 2]>> = HashMap::new();

    // Derived declarations, still keyed in declaration order. Compute
    // functions are taken out of here as their slices resolve.
    let mut pending: IndexMap<String, (SmallVec<[String; 4]>, Option<Compute>)> = IndexMap::new();

    for (name, slice) in slices {
        if slice.is_derived() {
            pending.insert(name, (slice.deps, slice.compute));
            continue;
        }

        let initial = slice
            .initial
            .ok_or_else(|| StoreError::MissingInitialValue { slice: name.clone() })?;
        state.insert(name.clone(), initial);

        let mut reducers: HashMap<A, Reducer> = HashMap::with_capacity(slice.reducers.len());
        for (action, reducer) in slice.reducers {
            // First binding wins; the routing table records each slice once
            // per action.
            if let Entry::Vacant(entry) = reducers.entry(action.clone()) {
                entry.insert(reducer);
                routes.entry(action).or_default().push(name.clone());
            }
        }
        sources.insert(name, SourceSpec { reducers });
    }

    if let Some(saved) = saved_state {
        merge_saved(&mut state, &pending, saved);
    }

    let mut queue = ResolutionQueue::new(pending.keys().cloned());
    let mut derived: IndexMap<String, DerivedSpec> = IndexMap::with_capacity(pending.len());
    let mut dependents: HashMap<String, SmallVec<[String; 2]>> = HashMap::new();

    while !queue.is_empty() {
        let name = queue
            .head()
            .expect("non-empty queue has a head")
            .to_owned();
        let decl = pending.get(&name).expect("queued name is declared");
        if decl.1.is_none() {
            return Err(StoreError::MissingComputeFunction { slice: name });
        }
        let deps = decl.0.clone();

        let mut ready = true;
        for dep in &deps {
            if state.contains_key(dep.as_str()) {
                continue;
            }
            if !pending.contains_key(dep.as_str()) {
                return Err(StoreError::UnknownDependency {
                    slice: name,
                    dep: dep.clone(),
                });
            }
            // Declared but not resolved yet: come back to this slice later.
            ready = false;
            break;
        }

        if ready {
            let dep_values: Vec<Value> = deps
                .iter()
                .map(|dep| {
                    state
                        .get(dep.as_str())
                        .cloned()
                        .expect("readiness check saw every dependency in state")
                })
                .collect();
            let compute = pending
                .get_mut(&name)
                .and_then(|decl| decl.1.take())
                .expect("presence checked at head inspection");
            let value = (compute)(&dep_values)
                .ok_or_else(|| StoreError::ComputeReturnedNone { slice: name.clone() })?;

            debug!(slice = %name, deps = deps.len(), "resolved derived slice");
            state.insert(name.clone(), value);
            queue.resolve_head();
            for dep in &deps {
                dependents.entry(dep.clone()).or_default().push(name.clone());
            }
            derived.insert(name, DerivedSpec { deps, compute });
        } else {
            queue.defer_head();
        }

        if queue.record_step() {
            return Err(StoreError::CyclicDependency {
                slices: queue.remaining(),
            });
        }
    }

    debug!(
        sources = sources.len(),
        derived = derived.len(),
        "declaration set resolved"
    );

    Ok(ResolvedGraph {
        state,
        sources,
        derived,
        dependents,
        routes,
    })
}

/// Overwrite resolved source values with saved ones, last write wins.
/// Derived slices are recomputed from their dependencies, so saved values
/// for them are dropped; so are keys naming no declared slice.
fn merge_saved(
    state: &mut IndexMap<String, Value>,
    pending: &IndexMap<String, (SmallVec<[String; 4]>, Option<Compute>)>,
    saved: IndexMap<String, Value>,
) {
    for (name, value) in saved {
        if let Some(slot) = state.get_mut(&name) {
            *slot = value;
        } else if pending.contains_key(&name) {
            warn!(slice = %name, "ignoring saved value for derived slice");
        } else {
            warn!(slice = %name, "ignoring saved value for undeclared slice");
        }
    }
}
