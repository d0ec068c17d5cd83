//! The [`PipelineObserver`] capability trait.
//!
//! Visualization and diagnostics hook into the pipeline through an
//! injected observer object rather than process-wide state. The default
//! is a no-op; a debugger or test harness supplies its own impl at
//! pipeline construction.

/// Receives node lifecycle events from a pipeline.
///
/// All methods have empty default bodies, so an observer only overrides
/// the events it cares about. Implementations must be cheap and must not
/// block: they are called from worker threads with no lock held.
pub trait PipelineObserver: Send + Sync {
    /// A node was appended to the graph.
    fn node_added(&self, name: &str) {
        let _ = name;
    }

    /// A worker began executing the node's closure.
    fn node_started(&self, name: &str) {
        let _ = name;
    }

    /// The node completed; `size` is the produced grid's dimension.
    fn node_completed(&self, name: &str, size: u32) {
        let _ = (name, size);
    }

    /// The node's closure returned an error, or an upstream failure
    /// propagated to it.
    fn node_failed(&self, name: &str) {
        let _ = name;
    }
}

/// The default observer: ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
