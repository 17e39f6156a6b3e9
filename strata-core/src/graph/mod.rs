//! Dependency Graph Resolution
//!
//! This module turns a declaration set into a running state map and the
//! reverse-dependency index that drives propagation.
//!
//! # Overview
//!
//! The dependency graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are slices: sources at the roots, derived slices below them
//! - Edges point from a dependency to the derived slices that read it
//!
//! Resolution happens exactly once, at store construction. Source slices
//! resolve immediately from their declared initial values; derived slices
//! are resolved by repeated rotation of a FIFO queue until every compute
//! function has been run against fully resolved dependencies. Cycles are
//! detected by watching the queue revisit an earlier configuration.
//!
//! # Design Decisions
//!
//! 1. Rotation-based resolution instead of an explicit topological sort: it
//!    handles partial and interleaved readiness without a graph traversal,
//!    at the cost of O(n²) rotations in the worst case. Graphs are small and
//!    resolved once per store lifetime, so the trade is acceptable.
//!
//! 2. The reverse index is built while resolving and is read-only
//!    afterwards; the graph does not support dynamic dependency changes.

mod queue;
mod resolver;

pub(crate) use queue::ResolutionQueue;
pub(crate) use resolver::{resolve, DerivedSpec, ResolvedGraph, SourceSpec};
