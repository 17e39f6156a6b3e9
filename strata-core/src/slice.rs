//! Slice declarations.
//!
//! A slice is a single named cell of application state. There are two kinds:
//!
//! - A **source** slice owns a value that changes only through reducers bound
//!   to action types.
//! - A **derived** slice is a pure function of other slices' values. It lists
//!   its dependencies by name and recomputes whenever one of them changes.
//!
//! Declarations are immutable inputs to [`StoreBuilder`](crate::StoreBuilder);
//! the dependency graph resolver consumes them at construction time.
//!
//! # The Reducer Contract
//!
//! A reducer receives a *draft*, a scratch clone of the slice's current
//! value, together with the action payload. It may either mutate the draft
//! in place and return `None` (the draft is committed), or return
//! `Some(replacement)` (the replacement is committed). Either way the
//! committed value is diffed against the old value with the store's equality
//! strategy, so a reducer that ends up producing an equal value causes no
//! mutation record entry and no downstream recomputation.
//!
//! # The Compute Contract
//!
//! A compute function receives its dependencies' current values in declared
//! order and must produce a value. Returning `None` is treated as a
//! programming error and fails the surrounding operation with
//! [`ComputeReturnedNone`](crate::StoreError::ComputeReturnedNone).

use std::fmt::Debug;
use std::hash::Hash;

use serde_json::Value;
use smallvec::SmallVec;

/// Bound alias for the action types a store routes on.
///
/// Callers declare an enum of action names; any `Clone + Eq + Hash + Debug`
/// type qualifies through the blanket implementation.
pub trait ActionType: Clone + Eq + Hash + Debug + 'static {}

impl<T> ActionType for T where T: Clone + Eq + Hash + Debug + 'static {}

/// A reducer bound to one action type on one source slice.
///
/// Receives the draft and the payload; see the module docs for the
/// copy-on-write contract.
pub type Reducer = Box<dyn Fn(&mut Value, &Value) -> Option<Value>>;

/// A derived slice's compute function. Arguments arrive in declared
/// dependency order.
pub type Compute = Box<dyn Fn(&[Value]) -> Option<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SliceKind {
    Source,
    Derived,
}

/// Declaration of one named slice, built fluently.
///
/// ```
/// use strata_core::Slice;
/// use serde_json::json;
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// enum Action {
///     Increment,
/// }
///
/// let count = Slice::source()
///     .initial(0)
///     .reducer(Action::Increment, |draft, _payload| {
///         Some(json!(draft.as_i64().unwrap_or(0) + 1))
///     });
///
/// let doubled = Slice::<Action>::derived(["count"])
///     .compute(|deps| Some(json!(deps[0].as_i64().unwrap_or(0) * 2)));
/// # let _ = (count, doubled);
/// ```
pub struct Slice<A> {
    pub(crate) kind: SliceKind,
    pub(crate) initial: Option<Value>,
    pub(crate) reducers: Vec<(A, Reducer)>,
    pub(crate) deps: SmallVec<[String; 4]>,
    pub(crate) compute: Option<Compute>,
}

impl<A: ActionType> Slice<A> {
    /// Declare a source slice. Give it a value with [`initial`](Self::initial)
    /// and bind reducers with [`reducer`](Self::reducer).
    pub fn source() -> Self {
        Self {
            kind: SliceKind::Source,
            initial: None,
            reducers: Vec::new(),
            deps: SmallVec::new(),
            compute: None,
        }
    }

    /// Declare a derived slice over the named dependencies. Attach its
    /// function with [`compute`](Self::compute).
    pub fn derived<I, S>(deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: SliceKind::Derived,
            initial: None,
            reducers: Vec::new(),
            deps: deps.into_iter().map(Into::into).collect(),
            compute: None,
        }
    }

    /// Set the initial value of a source slice.
    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.initial = Some(value.into());
        self
    }

    /// Bind a reducer to an action type. One action may be bound on several
    /// slices; dispatching it then fans out to each of them. Binding the
    /// same action twice on one slice keeps the first binding.
    pub fn reducer<F>(mut self, action: A, f: F) -> Self
    where
        F: Fn(&mut Value, &Value) -> Option<Value> + 'static,
    {
        self.reducers.push((action, Box::new(f)));
        self
    }

    /// Set the compute function of a derived slice.
    pub fn compute<F>(mut self, f: F) -> Self
    where
        F: Fn(&[Value]) -> Option<Value> + 'static,
    {
        self.compute = Some(Box::new(f));
        self
    }

    pub(crate) fn is_derived(&self) -> bool {
        self.kind == SliceKind::Derived
    }
}
