//! The [`Element`] trait bounding grid cell types.
//!
//! Masks are monomorphized over exactly two cell types — `bool` for
//! presence masks and `f32` for scalar fields. The trait carries the
//! bounds every generic grid operation needs; type-specific algebra
//! (thresholding, arithmetic) lives in inherent impls on the concrete
//! instantiations, so there is no virtual dispatch on the per-cell path.

use std::fmt::Debug;

/// A value that can populate one grid cell.
///
/// Implemented by `bool` and `f32` only. The `Default` value is what a
/// freshly allocated mask is filled with (`false` / `0.0`).
pub trait Element: Copy + Default + PartialEq + Debug + Send + Sync + 'static {}

impl Element for bool {}

impl Element for f32 {}
