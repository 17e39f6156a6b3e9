//! Strata Core
//!
//! This crate provides the core engine for the Strata sliced state
//! container. It implements:
//!
//! - Named state cells ("slices"): sources mutated by dispatched actions,
//!   and derived slices computed from other slices
//! - Construction-time dependency graph resolution with cycle detection
//! - Incremental propagation with value-equality pruning
//! - A synchronous dispatch pipeline with middleware, payload
//!   preprocessors, effects, and listener notification
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `slice`: slice declarations and the reducer/compute contracts
//! - `graph`: construction-time resolution of the dependency graph
//! - `store`: the store itself: dispatch, propagation, subscriptions
//! - `value`: the slice value model and equality strategies
//! - `error`: the error taxonomy for construction and dispatch
//!
//! # Example
//!
//! ```rust
//! use serde_json::{json, Value};
//! use strata_core::{Slice, Store};
//!
//! #[derive(Clone, Debug, PartialEq, Eq, Hash)]
//! enum Action {
//!     Increment,
//! }
//!
//! let mut store = Store::builder()
//!     .slice(
//!         "count",
//!         Slice::source()
//!             .initial(0)
//!             .reducer(Action::Increment, |draft, _payload| {
//!                 Some(json!(draft.as_i64().unwrap() + 1))
//!             }),
//!     )
//!     .slice(
//!         "doubled",
//!         Slice::derived(["count"])
//!             .compute(|deps| Some(json!(deps[0].as_i64().unwrap() * 2))),
//!     )
//!     .build()
//!     .unwrap();
//!
//! store.subscribe(|record| {
//!     println!("{} slices changed", record.changed.len());
//! });
//!
//! let record = store.dispatch(Action::Increment, Value::Null).unwrap();
//! assert_eq!(store.get("count"), Some(&json!(1)));
//! assert_eq!(store.get("doubled"), Some(&json!(2)));
//! assert_eq!(record.changed.len(), 2);
//! ```

pub mod error;
mod graph;
pub mod slice;
pub mod store;
pub mod value;

pub use error::StoreError;
pub use slice::{ActionType, Compute, Reducer, Slice};
pub use store::{Delta, ListenerId, Middleware, Mutation, Store, StoreBuilder};
pub use value::Equality;
