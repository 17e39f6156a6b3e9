//! Incremental propagation through the dependency graph.
//!
//! After a slice's stored value has been freshly written, every derived
//! slice that transitively reads it must be brought up to date. A
//! [`PropagationPass`] borrows the store's state, specs and reverse index
//! for the duration of one dispatch and cascades recomputation:
//!
//! 1. Look up the changed slice in the reverse-dependency index; no entry
//!    means a leaf, nothing to do.
//! 2. For each dependent, gather its dependency values, run its compute
//!    function, and compare the result to the stored value with the store's
//!    equality strategy.
//! 3. If the value changed: store it, record the old/new pair, and recurse
//!    on the dependent's own name. If it did not: stop, pruning the whole
//!    branch below that edge.
//!
//! Termination is guaranteed because the graph is statically acyclic
//! (enforced at resolution) and finite; recursion depth is bounded by the
//! longest dependency chain.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::Value;
use smallvec::SmallVec;
use tracing::trace;

use crate::error::StoreError;
use crate::graph::DerivedSpec;
use crate::value::Equality;

use super::mutation::Delta;

/// One propagation cascade, borrowing the store's moving parts.
pub(crate) struct PropagationPass<'a> {
    pub state: &'a mut IndexMap<String, Value>,
    pub derived: &'a IndexMap<String, DerivedSpec>,
    pub dependents: &'a HashMap<String, SmallVec<[String; 2]>>,
    pub equality: Equality,
    /// The current mutation record's change map; cascaded changes land here.
    pub changed: &'a mut IndexMap<String, Delta>,
}

impl PropagationPass<'_> {
    /// Recompute all transitive dependents of `slice`, recording every value
    /// that actually changed.
    pub fn notify_changed(&mut self, slice: &str) -> Result<(), StoreError> {
        let Some(targets) = self.dependents.get(slice) else {
            return Ok(());
        };

        for dependent in targets.clone() {
            let new = self.recompute(&dependent)?;
            let old = self
                .state
                .get(&dependent)
                .cloned()
                .expect("derived slice was resolved at construction");

            if self.equality.eq(&old, &new) {
                trace!(slice = %dependent, "compute result unchanged, pruning branch");
                continue;
            }

            self.state.insert(dependent.clone(), new.clone());
            self.changed.insert(dependent.clone(), Delta { old, new });
            self.notify_changed(&dependent)?;
        }

        Ok(())
    }

    fn recompute(&self, slice: &str) -> Result<Value, StoreError> {
        let spec = self
            .derived
            .get(slice)
            .expect("reverse index only names derived slices");
        let dep_values: Vec<Value> = spec
            .deps
            .iter()
            .map(|dep| {
                self.state
                    .get(dep.as_str())
                    .cloned()
                    .expect("dependency was resolved at construction")
            })
            .collect();

        (spec.compute)(&dep_values)
            .ok_or_else(|| StoreError::ComputeReturnedNone { slice: slice.to_owned() })
    }
}
