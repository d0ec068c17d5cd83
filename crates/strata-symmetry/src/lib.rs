//! Symmetry geometry for the Strata terrain-mask engine.
//!
//! This crate is pure geometry: it knows nothing about grids' contents.
//! It defines the closed set of supported symmetry groups ([`Symmetry`]),
//! the per-run configuration triple ([`SymmetrySettings`]), and the
//! functions that map a cell to its symmetric images, enumerate the
//! canonical generating region, and mirror orientation angles.
//!
//! # Coordinate convention
//!
//! Grids are square, `size × size`, with `x` and `y` in `[0, size)`.
//! Mirror axes reflect a single coordinate; rotational groups rotate
//! about the grid center `(size/2, size/2)`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod image;
pub mod kind;
pub mod region;
pub mod rotation;
pub mod settings;

pub use image::{symmetric_cells, symmetric_images, SymmetryImage};
pub use kind::Symmetry;
pub use region::{in_half, in_team_half, CanonicalRegion};
pub use rotation::symmetric_rotations;
pub use settings::{SymmetryError, SymmetryScope, SymmetrySettings};
