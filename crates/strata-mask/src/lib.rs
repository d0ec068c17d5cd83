//! Symmetric grid masks and mask algebra.
//!
//! A [`Mask`] owns a square buffer of cells (boolean or scalar), the
//! [`SymmetrySettings`](strata_symmetry::SymmetrySettings) of the map it
//! belongs to, and an optional seeded random source for stochastic
//! operations. Every public mutating operation leaves the grid symmetric
//! under the scope relevant to that operation: stochastic edits, region
//! fills, resizes and morphology re-propagate explicitly, while pure
//! elementwise combinations of already-symmetric operands preserve the
//! invariant by construction.
//!
//! The two concrete instantiations are [`BitMask`] (presence masks,
//! morphology and set algebra) and [`ScalarMask`] (heights and weights,
//! numeric algebra, smoothing, gradients, noise).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bit;
pub mod distance;
pub mod fill;
pub mod mask;
pub mod scalar;

pub use mask::{BitMask, Mask, ScalarMask};
