//! Fluent deferred-mask handles.
//!
//! A handle is a lightweight front for one pipeline node: every
//! transformation method appends a new node depending on the current
//! one (plus any argument handles) and returns a new handle. Handles
//! own no mask state; the grids live in the pipeline's result slots.
//!
//! Seeding contract: each handle carries a declaration-time generator.
//! Seeds for new masks ([`DeferredBitMask::new`], `copy`, `to_bit`,
//! `distance_field`) are drawn from it while the chain is being
//! declared, never inside node closures, so the produced grids are
//! identical for any worker count.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use strata_core::{MaskError, PipelineError};
use strata_mask::{BitMask, Mask, ScalarMask};
use strata_symmetry::{SymmetryScope, SymmetrySettings};

use crate::node::NodeId;
use crate::payload::MaskPayload;
use crate::scheduler::{Core, Pipeline};

/// A deferred handle over a boolean mask chain.
pub struct DeferredBitMask {
    core: Arc<Core<MaskPayload>>,
    node: NodeId,
    name: String,
    symmetry: Arc<SymmetrySettings>,
    rng: ChaCha8Rng,
}

impl DeferredBitMask {
    /// Declare a zero-filled boolean mask. The mask's own seed is
    /// derived from `seed` at declaration time.
    pub fn new(
        pipeline: &Pipeline<MaskPayload>,
        size: u32,
        seed: u64,
        symmetry: Arc<SymmetrySettings>,
        name: &str,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mask_seed = rng.next_u64();
        let settings = symmetry.clone();
        let node = pipeline.add_node(name, vec![], move |_| {
            Ok(MaskPayload::Bit(Mask::new(size, Some(mask_seed), settings)))
        });
        Self {
            core: pipeline.core(),
            node,
            name: name.to_string(),
            symmetry,
            rng,
        }
    }

    /// The mask chain's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node this handle currently points at.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// The symmetry settings the chain is bound to.
    pub fn symmetry(&self) -> &Arc<SymmetrySettings> {
        &self.symmetry
    }

    /// Append a unary node: private copy of the current result, run
    /// `op` on it.
    fn apply<F>(self, op: F) -> Self
    where
        F: FnOnce(&mut BitMask) -> Result<(), MaskError> + Send + 'static,
    {
        let node = self.core.add_node(&self.name, vec![self.node], move |inputs| {
            let mut mask = inputs.owned(0).into_bit()?;
            op(&mut mask)?;
            Ok(MaskPayload::Bit(mask))
        });
        Self { node, ..self }
    }

    /// Append a binary node: private copy of the current result plus
    /// shared read access to `other`'s result.
    fn apply_with<F>(self, other: NodeId, op: F) -> Self
    where
        F: FnOnce(&mut BitMask, &MaskPayload) -> Result<(), MaskError> + Send + 'static,
    {
        let node = self
            .core
            .add_node(&self.name, vec![self.node, other], move |inputs| {
                let mut mask = inputs.owned(0).into_bit()?;
                op(&mut mask, inputs.shared(1))?;
                Ok(MaskPayload::Bit(mask))
            });
        Self { node, ..self }
    }

    /// Reset to all-false.
    pub fn clear(self) -> Self {
        self.apply(|mask| {
            mask.clear();
            Ok(())
        })
    }

    /// Randomize the canonical region with the given density.
    pub fn randomize(self, density: f32) -> Self {
        self.apply(move |mask| {
            mask.randomize(density);
            Ok(())
        })
    }

    /// Logical NOT of every cell.
    pub fn invert(self) -> Self {
        self.apply(|mask| {
            mask.invert();
            Ok(())
        })
    }

    /// Stochastic dilation steps under `scope`.
    pub fn grow(self, strength: f32, scope: SymmetryScope, count: u32) -> Self {
        self.apply(move |mask| {
            mask.grow(strength, scope, count);
            Ok(())
        })
    }

    /// Stochastic erosion steps under `scope`.
    pub fn erode(self, strength: f32, scope: SymmetryScope, count: u32) -> Self {
        self.apply(move |mask| {
            mask.erode(strength, scope, count);
            Ok(())
        })
    }

    /// Expand true regions by `radius`.
    pub fn inflate(self, radius: f32) -> Self {
        self.apply(move |mask| {
            mask.inflate(radius);
            Ok(())
        })
    }

    /// Contract true regions by `radius`.
    pub fn deflate(self, radius: f32) -> Self {
        self.apply(move |mask| {
            mask.deflate(radius);
            Ok(())
        })
    }

    /// Keep only region edges.
    pub fn outline(self) -> Self {
        self.apply(|mask| {
            mask.outline();
            Ok(())
        })
    }

    /// Trim single-cell spurs and corners.
    pub fn cut_corners(self) -> Self {
        self.apply(|mask| {
            mask.cut_corners();
            Ok(())
        })
    }

    /// Box-vote smoothing under `scope`.
    pub fn smooth(self, radius: u32, density: f32, scope: SymmetryScope) -> Self {
        self.apply(move |mask| {
            mask.smooth(radius, density, scope);
            Ok(())
        })
    }

    /// Fill a disk.
    pub fn fill_circle(self, cx: f32, cy: f32, radius: f32, value: bool) -> Self {
        self.apply(move |mask| {
            mask.fill_circle(cx, cy, radius, value);
            Ok(())
        })
    }

    /// Fill a rectangle.
    pub fn fill_rect(self, x: u32, y: u32, width: u32, height: u32, value: bool) -> Self {
        self.apply(move |mask| {
            mask.fill_rect(x, y, width, height, value);
            Ok(())
        })
    }

    /// Fill a sheared rectangle.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_parallelogram(
        self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        x_slope: i32,
        y_slope: i32,
        value: bool,
    ) -> Self {
        self.apply(move |mask| {
            mask.fill_parallelogram(x, y, width, height, x_slope, y_slope, value);
            Ok(())
        })
    }

    /// Fill the border rim.
    pub fn fill_edge(self, rim_width: u32, value: bool) -> Self {
        self.apply(move |mask| {
            mask.fill_edge(rim_width, value);
            Ok(())
        })
    }

    /// Fill the centered square.
    pub fn fill_center(self, extent: u32, value: bool) -> Self {
        self.apply(move |mask| {
            mask.fill_center(extent, value);
            Ok(())
        })
    }

    /// Close false regions narrower than `min_distance`.
    pub fn fill_gaps(self, min_distance: u32) -> Self {
        self.apply(move |mask| {
            mask.fill_gaps(min_distance);
            Ok(())
        })
    }

    /// Remove true necks narrower than `min_distance`.
    pub fn widen_gaps(self, min_distance: u32) -> Self {
        self.apply(move |mask| {
            mask.widen_gaps(min_distance);
            Ok(())
        })
    }

    /// Clear true components smaller than `min_area`.
    pub fn remove_areas_smaller_than(self, min_area: usize) -> Self {
        self.apply(move |mask| {
            mask.remove_areas_smaller_than(min_area);
            Ok(())
        })
    }

    /// Clear true components larger than `max_area`.
    pub fn remove_areas_bigger_than(self, max_area: usize) -> Self {
        self.apply(move |mask| {
            mask.remove_areas_bigger_than(max_area);
            Ok(())
        })
    }

    /// Scatter random walkers.
    pub fn random_walk(self, walkers: u32, steps: u32) -> Self {
        self.apply(move |mask| {
            mask.random_walk(walkers, steps);
            Ok(())
        })
    }

    /// Mirror the grid through the 2-fold kind of `scope`.
    pub fn flip(self, scope: SymmetryScope) -> Self {
        self.apply(move |mask| {
            mask.flip(scope)?;
            Ok(())
        })
    }

    /// Grow the grid to `size`.
    pub fn enlarge(self, size: u32) -> Self {
        self.apply(move |mask| {
            mask.enlarge(size);
            Ok(())
        })
    }

    /// Shrink the grid to `size`.
    pub fn shrink(self, size: u32) -> Self {
        self.apply(move |mask| {
            mask.shrink(size);
            Ok(())
        })
    }

    /// Resize the grid to `size`.
    pub fn set_size(self, size: u32) -> Self {
        self.apply(move |mask| {
            mask.set_size(size);
            Ok(())
        })
    }

    /// Union with `other`'s current result.
    pub fn combine(self, other: &DeferredBitMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.combine(other.as_bit()?)?;
            Ok(())
        })
    }

    /// Intersection with `other`'s current result.
    pub fn intersect(self, other: &DeferredBitMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.intersect(other.as_bit()?)?;
            Ok(())
        })
    }

    /// Difference with `other`'s current result.
    pub fn minus(self, other: &DeferredBitMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.minus(other.as_bit()?)?;
            Ok(())
        })
    }

    /// Overwrite with `other`'s current result.
    pub fn replace(self, other: &DeferredBitMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.replace(other.as_bit()?)?;
            Ok(())
        })
    }

    /// Branch the chain: a new handle whose mask is a reseeded snapshot
    /// of this node's result. The branch seed is drawn from this
    /// handle's generator now, at declaration time.
    pub fn copy(&mut self) -> Self {
        let mask_seed = self.rng.next_u64();
        let handle_seed = self.rng.next_u64();
        let name = format!("{}-copy", self.name);
        let node = self.core.add_node(&name, vec![self.node], move |inputs| {
            let mut mask = inputs.owned(0).into_bit()?;
            mask.reseed(mask_seed);
            Ok(MaskPayload::Bit(mask))
        });
        Self {
            core: self.core.clone(),
            node,
            name,
            symmetry: self.symmetry.clone(),
            rng: ChaCha8Rng::seed_from_u64(handle_seed),
        }
    }

    /// Declare the city-block distance field of this node's result.
    pub fn distance_field(&mut self) -> DeferredScalarMask {
        let mask_seed = self.rng.next_u64();
        let handle_seed = self.rng.next_u64();
        let name = format!("{}-distance", self.name);
        let node = self.core.add_node(&name, vec![self.node], move |inputs| {
            let mut field = inputs.shared(0).as_bit()?.distance_field();
            field.reseed(mask_seed);
            Ok(MaskPayload::Scalar(field))
        });
        DeferredScalarMask {
            core: self.core.clone(),
            node,
            name,
            symmetry: self.symmetry.clone(),
            rng: ChaCha8Rng::seed_from_u64(handle_seed),
        }
    }

    /// Execute this node's subgraph (where not already executed) and
    /// return an owned copy of the result.
    pub fn finish(&self) -> Result<BitMask, PipelineError> {
        let payload = self.core.await_node(self.node)?;
        match payload.as_bit() {
            Ok(mask) => Ok(mask.clone()),
            Err(reason) => Err(PipelineError::NodeFailed {
                name: self.name.clone(),
                reason,
            }),
        }
    }
}

/// A deferred handle over a scalar mask chain.
pub struct DeferredScalarMask {
    core: Arc<Core<MaskPayload>>,
    node: NodeId,
    name: String,
    symmetry: Arc<SymmetrySettings>,
    rng: ChaCha8Rng,
}

impl DeferredScalarMask {
    /// Declare a zero-filled scalar mask. The mask's own seed is
    /// derived from `seed` at declaration time.
    pub fn new(
        pipeline: &Pipeline<MaskPayload>,
        size: u32,
        seed: u64,
        symmetry: Arc<SymmetrySettings>,
        name: &str,
    ) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mask_seed = rng.next_u64();
        let settings = symmetry.clone();
        let node = pipeline.add_node(name, vec![], move |_| {
            Ok(MaskPayload::Scalar(Mask::new(
                size,
                Some(mask_seed),
                settings,
            )))
        });
        Self {
            core: pipeline.core(),
            node,
            name: name.to_string(),
            symmetry,
            rng,
        }
    }

    /// The mask chain's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node this handle currently points at.
    pub fn node_id(&self) -> NodeId {
        self.node
    }

    /// The symmetry settings the chain is bound to.
    pub fn symmetry(&self) -> &Arc<SymmetrySettings> {
        &self.symmetry
    }

    fn apply<F>(self, op: F) -> Self
    where
        F: FnOnce(&mut ScalarMask) -> Result<(), MaskError> + Send + 'static,
    {
        let node = self.core.add_node(&self.name, vec![self.node], move |inputs| {
            let mut mask = inputs.owned(0).into_scalar()?;
            op(&mut mask)?;
            Ok(MaskPayload::Scalar(mask))
        });
        Self { node, ..self }
    }

    fn apply_with<F>(self, other: NodeId, op: F) -> Self
    where
        F: FnOnce(&mut ScalarMask, &MaskPayload) -> Result<(), MaskError> + Send + 'static,
    {
        let node = self
            .core
            .add_node(&self.name, vec![self.node, other], move |inputs| {
                let mut mask = inputs.owned(0).into_scalar()?;
                op(&mut mask, inputs.shared(1))?;
                Ok(MaskPayload::Scalar(mask))
            });
        Self { node, ..self }
    }

    /// Reset to all-zero.
    pub fn clear(self) -> Self {
        self.apply(|mask| {
            mask.clear();
            Ok(())
        })
    }

    /// Set cells to `high` where `other` is true and `low` elsewhere.
    pub fn init(self, other: &DeferredBitMask, low: f32, high: f32) -> Self {
        self.apply_with(other.node, move |mask, other| {
            mask.init(other.as_bit()?, low, high)?;
            Ok(())
        })
    }

    /// Elementwise addition.
    pub fn add(self, other: &DeferredScalarMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.add(other.as_scalar()?)?;
            Ok(())
        })
    }

    /// Elementwise subtraction.
    pub fn subtract(self, other: &DeferredScalarMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.subtract(other.as_scalar()?)?;
            Ok(())
        })
    }

    /// Elementwise multiplication.
    pub fn multiply(self, other: &DeferredScalarMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.multiply(other.as_scalar()?)?;
            Ok(())
        })
    }

    /// Elementwise minimum.
    pub fn min(self, other: &DeferredScalarMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.min(other.as_scalar()?)?;
            Ok(())
        })
    }

    /// Elementwise maximum.
    pub fn max(self, other: &DeferredScalarMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.max(other.as_scalar()?)?;
            Ok(())
        })
    }

    /// Add a constant everywhere.
    pub fn add_scalar(self, value: f32) -> Self {
        self.apply(move |mask| {
            mask.add_scalar(value);
            Ok(())
        })
    }

    /// Multiply by a constant everywhere.
    pub fn multiply_scalar(self, value: f32) -> Self {
        self.apply(move |mask| {
            mask.multiply_scalar(value);
            Ok(())
        })
    }

    /// Clamp from below.
    pub fn clamp_min(self, value: f32) -> Self {
        self.apply(move |mask| {
            mask.clamp_min(value);
            Ok(())
        })
    }

    /// Clamp from above.
    pub fn clamp_max(self, value: f32) -> Self {
        self.apply(move |mask| {
            mask.clamp_max(value);
            Ok(())
        })
    }

    /// Zero cells below `threshold`.
    pub fn zero_below(self, threshold: f32) -> Self {
        self.apply(move |mask| {
            mask.zero_below(threshold);
            Ok(())
        })
    }

    /// Add `value` where `other` is true.
    pub fn add_masked(self, other: &DeferredBitMask, value: f32) -> Self {
        self.apply_with(other.node, move |mask, other| {
            mask.add_masked(other.as_bit()?, value)?;
            Ok(())
        })
    }

    /// Subtract `value` where `other` is true.
    pub fn subtract_masked(self, other: &DeferredBitMask, value: f32) -> Self {
        self.apply_with(other.node, move |mask, other| {
            mask.subtract_masked(other.as_bit()?, value)?;
            Ok(())
        })
    }

    /// Zero cells outside `other`'s true region.
    pub fn remove_outside(self, other: &DeferredBitMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.remove_outside(other.as_bit()?)?;
            Ok(())
        })
    }

    /// Zero cells inside `other`'s true region.
    pub fn remove_inside(self, other: &DeferredBitMask) -> Self {
        self.apply_with(other.node, |mask, other| {
            mask.remove_inside(other.as_bit()?)?;
            Ok(())
        })
    }

    /// Box-average smoothing.
    pub fn smooth(self, radius: u32) -> Self {
        self.apply(move |mask| {
            mask.smooth(radius);
            Ok(())
        })
    }

    /// Smoothing restricted to `limiter`'s true region.
    pub fn smooth_within(self, radius: u32, limiter: &DeferredBitMask) -> Self {
        self.apply_with(limiter.node, move |mask, limiter| {
            mask.smooth_within(radius, limiter.as_bit()?)?;
            Ok(())
        })
    }

    /// Central-difference slope magnitude.
    pub fn gradient(self) -> Self {
        self.apply(|mask| {
            mask.gradient();
            Ok(())
        })
    }

    /// Maximum forward directional difference.
    pub fn max_slope(self) -> Self {
        self.apply(|mask| {
            mask.max_slope();
            Ok(())
        })
    }

    /// Seeded Gaussian noise.
    pub fn add_gaussian_noise(self, scale: f32) -> Self {
        self.apply(move |mask| {
            mask.add_gaussian_noise(scale);
            Ok(())
        })
    }

    /// Seeded uniform noise.
    pub fn add_white_noise(self, scale: f32) -> Self {
        self.apply(move |mask| {
            mask.add_white_noise(scale);
            Ok(())
        })
    }

    /// Grow the grid to `size`.
    pub fn enlarge(self, size: u32) -> Self {
        self.apply(move |mask| {
            mask.enlarge(size);
            Ok(())
        })
    }

    /// Shrink the grid to `size`.
    pub fn shrink(self, size: u32) -> Self {
        self.apply(move |mask| {
            mask.shrink(size);
            Ok(())
        })
    }

    /// Resize the grid to `size`.
    pub fn set_size(self, size: u32) -> Self {
        self.apply(move |mask| {
            mask.set_size(size);
            Ok(())
        })
    }

    /// Threshold into a boolean chain: `value >= threshold → true`.
    /// The new mask's seed is drawn from this handle's generator now.
    pub fn to_bit(&mut self, threshold: f32) -> DeferredBitMask {
        let mask_seed = self.rng.next_u64();
        let handle_seed = self.rng.next_u64();
        let name = format!("{}-bit", self.name);
        let node = self.core.add_node(&name, vec![self.node], move |inputs| {
            let scalar = inputs.shared(0).as_scalar()?;
            Ok(MaskPayload::Bit(BitMask::from_scalar(
                scalar,
                threshold,
                Some(mask_seed),
            )))
        });
        DeferredBitMask {
            core: self.core.clone(),
            node,
            name,
            symmetry: self.symmetry.clone(),
            rng: ChaCha8Rng::seed_from_u64(handle_seed),
        }
    }

    /// Branch the chain with a reseeded snapshot of this node's result.
    pub fn copy(&mut self) -> Self {
        let mask_seed = self.rng.next_u64();
        let handle_seed = self.rng.next_u64();
        let name = format!("{}-copy", self.name);
        let node = self.core.add_node(&name, vec![self.node], move |inputs| {
            let mut mask = inputs.owned(0).into_scalar()?;
            mask.reseed(mask_seed);
            Ok(MaskPayload::Scalar(mask))
        });
        Self {
            core: self.core.clone(),
            node,
            name,
            symmetry: self.symmetry.clone(),
            rng: ChaCha8Rng::seed_from_u64(handle_seed),
        }
    }

    /// Execute this node's subgraph (where not already executed) and
    /// return an owned copy of the result.
    pub fn finish(&self) -> Result<ScalarMask, PipelineError> {
        let payload = self.core.await_node(self.node)?;
        match payload.as_scalar() {
            Ok(mask) => Ok(mask.clone()),
            Err(reason) => Err(PipelineError::NodeFailed {
                name: self.name.clone(),
                reason,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::PipelineConfig;
    use strata_symmetry::Symmetry;

    fn pipeline(workers: usize) -> Pipeline<MaskPayload> {
        Pipeline::new(PipelineConfig {
            workers,
            observer: Arc::new(strata_core::NoopObserver),
        })
    }

    fn settings() -> Arc<SymmetrySettings> {
        Arc::new(SymmetrySettings::uniform(Symmetry::Point2))
    }

    #[test]
    fn fluent_chain_produces_the_declared_mask() {
        let p = pipeline(2);
        let land = DeferredBitMask::new(&p, 16, 42, settings(), "land")
            .fill_rect(2, 2, 4, 4, true)
            .inflate(1.0);
        let mask = land.finish().unwrap();
        assert!(mask.get(3, 3));
        assert!(mask.get(1, 3), "inflated by one");
        // Point2 mirror of the filled block.
        assert!(mask.get(12, 12));
    }

    #[test]
    fn handles_own_no_state_until_finish() {
        let p = pipeline(2);
        let base = DeferredBitMask::new(&p, 8, 1, settings(), "base").randomize(0.5);
        // Declaring more work after the fact extends the chain.
        let refined = base.smooth(1, 0.5, SymmetryScope::Terrain);
        let mask = refined.finish().unwrap();
        assert_eq!(mask.size(), 8);
    }

    #[test]
    fn branches_diverge_after_copy() {
        let p = pipeline(2);
        let mut base = DeferredBitMask::new(&p, 8, 9, settings(), "base").randomize(0.5);
        let a = base.copy().invert();
        let b = base.copy();
        let base_mask = base.finish().unwrap();
        let a_mask = a.finish().unwrap();
        let b_mask = b.finish().unwrap();
        assert_eq!(base_mask, b_mask, "copy snapshots the upstream result");
        assert_eq!(
            a_mask.count() + b_mask.count(),
            (8 * 8) as usize,
            "inverted branch complements the other"
        );
    }

    #[test]
    fn scalar_chain_with_cross_kind_nodes() {
        let p = pipeline(4);
        let shape = DeferredBitMask::new(&p, 8, 5, settings(), "shape").fill_circle(
            2.0, 2.0, 1.5, true,
        );
        let mut heights = DeferredScalarMask::new(&p, 8, 6, settings(), "heights")
            .init(&shape, 0.0, 4.0)
            .smooth(1);
        let bit = heights.to_bit(1.0);
        let mask = bit.finish().unwrap();
        assert!(mask.get(2, 2), "peak survives threshold");
        assert!(!mask.get(6, 1));
    }

    #[test]
    fn distance_field_handle_measures_from_shape() {
        let p = pipeline(2);
        let mut shape =
            DeferredBitMask::new(&p, 8, 3, settings(), "shape").fill_rect(0, 0, 1, 1, true);
        let field = shape.distance_field().finish().unwrap();
        assert_eq!(field.get(0, 0), 0.0);
        assert_eq!(field.get(1, 0), 1.0);
        // fill_rect propagated the point2 mirror, so (7, 7) is a source.
        assert_eq!(field.get(7, 7), 0.0);
    }

    #[test]
    fn size_mismatch_fails_the_consuming_node() {
        let p = pipeline(2);
        let small = DeferredBitMask::new(&p, 4, 1, settings(), "small");
        let big = DeferredBitMask::new(&p, 8, 2, settings(), "big");
        let bad = small.combine(&big);
        match bad.finish() {
            Err(PipelineError::NodeFailed { reason, .. }) => {
                assert_eq!(
                    reason,
                    MaskError::SizeMismatch {
                        expected: 4,
                        actual: 8
                    }
                );
            }
            other => panic!("expected NodeFailed, got {other:?}"),
        }
    }
}
