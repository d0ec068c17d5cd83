//! Strata: procedural terrain masks under enforced N-fold symmetry,
//! composed lazily through a dependency-tracked pipeline.
//!
//! This is the top-level facade crate re-exporting the public API of
//! the Strata workspace. For most users, depending on `strata` alone is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use strata::prelude::*;
//!
//! let settings = Arc::new(SymmetrySettings::uniform(Symmetry::Point2));
//! let pipeline = Pipeline::new(PipelineConfig::default());
//!
//! // Declare eagerly; nothing runs yet.
//! let land = DeferredBitMask::new(&pipeline, 64, 42, settings.clone(), "land")
//!     .randomize(0.4)
//!     .smooth(2, 0.5, SymmetryScope::Terrain)
//!     .fill_gaps(4);
//! let heights = DeferredScalarMask::new(&pipeline, 64, 43, settings, "heights")
//!     .init(&land, 0.0, 8.0)
//!     .smooth(2);
//!
//! // Demand the results; the graph executes once, concurrently.
//! let land = land.finish().unwrap();
//! let heights = heights.finish().unwrap();
//! assert_eq!(land.size(), heights.size());
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Cell traits, error types, observer capability |
//! | [`symmetry`] | `strata-symmetry` | Symmetry kinds, canonical regions, image geometry |
//! | [`mask`] | `strata-mask` | `Mask<T>` grids and mask algebra |
//! | [`pipeline`] | `strata-pipeline` | Deferred scheduler and fluent handles |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Cell traits, shared error types, and the observer capability
/// (`strata-core`).
pub use strata_core as types;

/// Symmetry groups, settings, canonical regions, and symmetric-image
/// geometry (`strata-symmetry`).
pub use strata_symmetry as symmetry;

/// Grid masks and mask algebra (`strata-mask`).
pub use strata_mask as mask;

/// The deferred dependency-graph scheduler and fluent mask handles
/// (`strata-pipeline`).
pub use strata_pipeline as pipeline;

/// Common imports for typical Strata usage.
pub mod prelude {
    pub use strata_core::{Element, MaskError, NoopObserver, PipelineError, PipelineObserver};
    pub use strata_mask::{BitMask, Mask, ScalarMask};
    pub use strata_pipeline::{
        DeferredBitMask, DeferredScalarMask, MaskPayload, NodeId, Pipeline, PipelineConfig,
    };
    pub use strata_symmetry::{
        in_half, in_team_half, symmetric_cells, symmetric_images, symmetric_rotations,
        CanonicalRegion, Symmetry, SymmetryScope, SymmetrySettings,
    };
}
