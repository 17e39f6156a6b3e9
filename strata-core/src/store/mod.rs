//! The store and its dispatch plumbing.
//!
//! This module wires the resolved dependency graph into a running state
//! container:
//!
//! - [`Store`] owns the state map and runs the mutation pipeline.
//! - [`StoreBuilder`] collects declarations and plumbing, then resolves.
//! - [`Mutation`] is the per-dispatch record of what changed.
//! - [`Middleware`] wraps dispatch; listeners observe finished records.
//!
//! Propagation itself lives in a private submodule: it borrows the store's
//! state and specs for the duration of a single dispatch and is never
//! visible to callers.

mod builder;
mod listener;
mod middleware;
mod mutation;
mod propagation;
#[allow(clippy::module_inception)]
mod store;

pub use builder::StoreBuilder;
pub use listener::ListenerId;
pub use middleware::Middleware;
pub use mutation::{Delta, Mutation};
pub use store::Store;
