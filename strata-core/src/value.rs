//! Slice value model and equality strategies.
//!
//! Slice values are plain composite data, represented as [`serde_json::Value`]:
//! null, booleans, numbers, strings, arrays and objects. Deep copies are
//! ordinary `Value::clone` calls; the interesting part is deciding whether a
//! freshly computed value counts as a *change*, because that decision gates
//! both propagation and listener notification.
//!
//! # Equality Strategies
//!
//! A store picks one strategy at construction and holds it fixed:
//!
//! - [`Equality::Deep`] recurses through the whole structure. Two values are
//!   equal when they are structurally identical. This is the default: owned
//!   values have no reference identity, so full structural comparison is the
//!   faithful notion of "nothing changed".
//!
//! - [`Equality::Shallow`] compares one level deep. Scalars compare by value;
//!   nested arrays and objects always compare unequal, mimicking
//!   reference-identity change detection where every rebuild of a nested
//!   composite counts as a change. Propagation fires more eagerly under this
//!   strategy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a store decides whether a slice's value actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Equality {
    /// One level deep: scalar entries compare by value, nested composites
    /// always compare unequal.
    Shallow,

    /// Full structural recursion.
    #[default]
    Deep,
}

impl Equality {
    /// Compare two slice values under this strategy.
    pub fn eq(&self, a: &Value, b: &Value) -> bool {
        match self {
            Equality::Deep => a == b,
            Equality::Shallow => shallow_eq(a, b),
        }
    }
}

fn is_composite(v: &Value) -> bool {
    v.is_array() || v.is_object()
}

/// Entry comparison one level down: scalars by value, composites never equal.
fn entry_eq(a: &Value, b: &Value) -> bool {
    if is_composite(a) || is_composite(b) {
        return false;
    }
    a == b
}

fn shallow_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(u, v)| entry_eq(u, v))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter().all(|(k, u)| y.get(k).map_or(false, |v| entry_eq(u, v)))
        }
        _ => entry_eq(a, b),
    }
}
