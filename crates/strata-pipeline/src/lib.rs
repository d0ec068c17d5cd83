//! Deferred dependency-graph execution for mask pipelines.
//!
//! Application code declares mask operations eagerly through the fluent
//! [`DeferredBitMask`]/[`DeferredScalarMask`] handles; nothing executes
//! until a `finish()` call demands a node, at which point the scheduler
//! runs the node's transitive dependencies on a fixed worker pool,
//! each node exactly once, concurrently where the graph allows.
//!
//! Results are shared read-only (`Arc`) between dependents; a consumer
//! that mutates takes a private copy first
//! ([`NodeInputs::owned`]) — the invariant that makes parallel fan-out
//! from one upstream mask race-free.
//!
//! Determinism: every node closure is a pure function of its inputs
//! and the seeds captured when the handle chain was declared, so a
//! pipeline produces bit-identical grids for any worker count.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod handle;
pub mod node;
pub mod payload;
pub mod scheduler;

pub use handle::{DeferredBitMask, DeferredScalarMask};
pub use node::{NodeId, NodeInputs, NodeState, NodeValue};
pub use payload::MaskPayload;
pub use scheduler::{Pipeline, PipelineConfig};
