//! Per-dispatch mutation records.
//!
//! A mutation record is the transient summary of one dispatch (or one
//! synthetic update): the action identity, the payload, and an old/new pair
//! for every slice whose value actually changed, including cascaded derived
//! changes. It is populated during propagation, handed to listeners by
//! reference, returned to the dispatcher, and then discarded; the store
//! never retains it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Old and new value of one slice that changed during a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    pub old: Value,
    pub new: Value,
}

/// Summary of one dispatch or synthetic update.
///
/// Serializable so external tooling (debuggers, change logs) can record
/// dispatch history; the action type only needs `Serialize` when that is
/// actually done.
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "A: Serialize"))]
pub struct Mutation<A> {
    /// The dispatched action, absent for synthetic updates and for
    /// dispatches swallowed by middleware.
    pub action: Option<A>,
    /// The payload as it reached the pipeline, absent for synthetic updates.
    pub payload: Option<Value>,
    /// Every slice that actually changed, in the order the changes landed.
    pub changed: IndexMap<String, Delta>,
    /// True when the record was produced by `synthetic_update` or
    /// `synthetic_reset` rather than by the mutation pipeline.
    pub synthetic: bool,
}

impl<A> Mutation<A> {
    pub(crate) fn for_action(action: A, payload: Value) -> Self {
        Self {
            action: Some(action),
            payload: Some(payload),
            changed: IndexMap::new(),
            synthetic: false,
        }
    }

    pub(crate) fn for_synthetic() -> Self {
        Self {
            action: None,
            payload: None,
            changed: IndexMap::new(),
            synthetic: true,
        }
    }

    pub(crate) fn swallowed() -> Self {
        Self {
            action: None,
            payload: None,
            changed: IndexMap::new(),
            synthetic: false,
        }
    }

    /// True when no slice changed.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// The old/new pair recorded for a slice, if it changed.
    pub fn delta(&self, slice: &str) -> Option<&Delta> {
        self.changed.get(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn action_record_carries_identity_and_payload() {
        let record = Mutation::for_action("BUMP", json!(2));
        assert_eq!(record.action, Some("BUMP"));
        assert_eq!(record.payload, Some(json!(2)));
        assert!(record.is_empty());
        assert!(!record.synthetic);
    }

    #[test]
    fn synthetic_record_has_no_action() {
        let record = Mutation::<&str>::for_synthetic();
        assert_eq!(record.action, None);
        assert!(record.synthetic);
    }

    #[test]
    fn records_serialize_for_tooling() {
        let mut record = Mutation::for_action("BUMP", json!(1));
        record.changed.insert(
            "count".to_string(),
            Delta { old: json!(0), new: json!(1) },
        );

        let out = serde_json::to_value(&record).unwrap();
        assert_eq!(out["action"], json!("BUMP"));
        assert_eq!(out["changed"]["count"]["new"], json!(1));
        assert_eq!(out["synthetic"], json!(false));
    }

    #[test]
    fn delta_lookup_by_slice_name() {
        let mut record = Mutation::for_action("BUMP", Value::Null);
        record.changed.insert(
            "count".to_string(),
            Delta { old: json!(0), new: json!(1) },
        );

        assert!(!record.is_empty());
        assert_eq!(record.delta("count").unwrap().new, json!(1));
        assert!(record.delta("other").is_none());
    }
}
