//! Node bookkeeping: identities, the state machine, and the input view
//! handed to node closures.

use std::fmt;
use std::sync::Arc;

use strata_core::{MaskError, PipelineError};

/// A value a pipeline node can produce: cheap to share, cloneable for
/// mutating consumers, and reporting a grid dimension for observers.
pub trait NodeValue: Clone + Send + Sync + 'static {
    /// Grid dimension of the produced value.
    fn size(&self) -> u32;
}

/// Identifies one node within its pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a node.
///
/// `Pending → Queued → Running → Done` on success; any state before
/// `Done` can transition to `Failed`. `Done` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    /// Declared; not yet demanded or waiting on dependencies.
    Pending,
    /// Ready and handed to the worker pool.
    Queued,
    /// A worker is executing the closure.
    Running,
    /// The result is stored and immutable.
    Done,
    /// The closure or an upstream dependency failed.
    Failed,
}

/// The completed upstream results handed to a node's closure, in
/// declaration order.
///
/// [`NodeInputs::shared`] grants read access; a consumer that wants to
/// mutate takes a private copy via [`NodeInputs::owned`]. There is no
/// way to reach `&mut` through the shared results, which is what makes
/// concurrent fan-out from one upstream node race-free.
pub struct NodeInputs<M> {
    inputs: Vec<Arc<M>>,
}

impl<M: NodeValue> NodeInputs<M> {
    pub(crate) fn new(inputs: Vec<Arc<M>>) -> Self {
        Self { inputs }
    }

    /// Read-only access to the `index`-th dependency's result.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the declared dependencies.
    pub fn shared(&self, index: usize) -> &M {
        &self.inputs[index]
    }

    /// A private copy of the `index`-th dependency's result, free to
    /// mutate.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range for the declared dependencies.
    pub fn owned(&self, index: usize) -> M {
        (*self.inputs[index]).clone()
    }

    /// Number of dependencies.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Whether the node declared no dependencies.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

/// The closure type a node runs exactly once.
pub(crate) type NodeOp<M> = Box<dyn FnOnce(&NodeInputs<M>) -> Result<M, MaskError> + Send>;

/// One deferred, memoized unit of work.
pub(crate) struct Node<M> {
    pub name: String,
    pub deps: Vec<NodeId>,
    pub dependents: Vec<NodeId>,
    pub op: Option<NodeOp<M>>,
    pub state: NodeState,
    pub result: Option<Arc<M>>,
    pub error: Option<PipelineError>,
    pub demanded: bool,
}

impl<M> Node<M> {
    pub fn new(name: String, deps: Vec<NodeId>, op: NodeOp<M>) -> Self {
        Self {
            name,
            deps,
            dependents: Vec::new(),
            op: Some(op),
            state: NodeState::Pending,
            result: None,
            error: None,
            demanded: false,
        }
    }
}
