//! Error types for store construction and dispatch.
//!
//! Every variant represents a construction-time or misuse error, not a
//! recoverable runtime condition. Errors are surfaced synchronously to the
//! caller and never retried or swallowed: a malformed declaration set or a
//! broken reducer/compute contract is a programming error in caller code.
//!
//! A construction error leaves no usable store. An error raised mid-dispatch
//! propagates out of `dispatch` with state left in whatever partial form
//! existed at the point of failure; the mutation pipeline is not
//! transactional.

use thiserror::Error;

/// Errors raised by store construction and dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A source slice was declared without an initial value.
    #[error("slice \"{slice}\" is missing an initial value")]
    MissingInitialValue { slice: String },

    /// A derived slice was declared without a compute function.
    #[error("derived slice \"{slice}\" is missing a compute function")]
    MissingComputeFunction { slice: String },

    /// A derived slice names a dependency that is not declared anywhere
    /// in the slice set.
    #[error("unknown dependency \"{dep}\" declared by slice \"{slice}\": no such slice exists in the store")]
    UnknownDependency { slice: String, dep: String },

    /// The derived slices left in the resolution queue form a cycle and can
    /// never be resolved.
    #[error("cyclic dependency involving slices: {slices:?}")]
    CyclicDependency { slices: Vec<String> },

    /// The dispatched action has no reducer and no effect registered for it.
    #[error("no reducer or effect registered for action {action}")]
    UnknownActionType { action: String },

    /// A compute function yielded no value. Computes must always produce a
    /// value; callers that want an "empty" result should return `Value::Null`.
    #[error("compute for slice \"{slice}\" produced no value")]
    ComputeReturnedNone { slice: String },
}
