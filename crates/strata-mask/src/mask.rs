//! The generic [`Mask`] grid type: storage, symmetry propagation,
//! interpolation, and resizing.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;

use strata_core::{Element, MaskError};
use strata_symmetry::{
    in_half, symmetric_cells, CanonicalRegion, Symmetry, SymmetryScope, SymmetrySettings,
};

/// A boolean presence mask.
pub type BitMask = Mask<bool>;

/// A scalar field mask (heights, texture weights, distances).
pub type ScalarMask = Mask<f32>;

/// A square grid of cells held invariant under the map's symmetry.
///
/// The buffer is row-major by `x`; all coordinates are `[0, size)`.
/// Cloning copies the buffer and the random source state; use
/// [`Mask::copy`] to branch with a freshly derived seed instead.
#[derive(Clone, Debug)]
pub struct Mask<T: Element> {
    cells: Vec<T>,
    size: u32,
    symmetry: Arc<SymmetrySettings>,
    rng: Option<ChaCha8Rng>,
}

impl<T: Element> Mask<T> {
    /// Create a zero-filled mask.
    ///
    /// A `seed` of `None` produces a mask without a random source;
    /// stochastic operations on it panic.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    pub fn new(size: u32, seed: Option<u64>, symmetry: Arc<SymmetrySettings>) -> Self {
        assert!(size > 0, "mask size must be nonzero");
        Self {
            cells: vec![T::default(); (size as usize) * (size as usize)],
            size,
            symmetry,
            rng: seed.map(ChaCha8Rng::seed_from_u64),
        }
    }

    /// Grid dimension.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The symmetry configuration this mask is bound to.
    pub fn symmetry(&self) -> &Arc<SymmetrySettings> {
        &self.symmetry
    }

    /// Whether `(x, y)` lies inside the grid.
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.size && y < self.size
    }

    pub(crate) fn idx(&self, x: u32, y: u32) -> usize {
        assert!(
            self.in_bounds(x, y),
            "cell ({x}, {y}) out of bounds for mask of size {}",
            self.size
        );
        (x as usize) * (self.size as usize) + (y as usize)
    }

    /// Read one cell.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds — a geometry bug, not a
    /// recoverable condition.
    pub fn get(&self, x: u32, y: u32) -> T {
        self.cells[self.idx(x, y)]
    }

    /// Write one cell without symmetry propagation. This is the raw
    /// escape hatch; pair it with [`Mask::apply_symmetry`] or use
    /// [`Mask::set_symmetric`].
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: T) {
        let i = self.idx(x, y);
        self.cells[i] = value;
    }

    /// Write one cell and all of its symmetric images under `scope`.
    pub fn set_symmetric(&mut self, x: u32, y: u32, value: T, scope: SymmetryScope) -> &mut Self {
        self.set(x, y, value);
        for (ix, iy) in symmetric_cells(&self.symmetry, scope, self.size, x, y) {
            self.set(ix, iy, value);
        }
        self
    }

    /// Reset every cell to the default value and re-propagate.
    pub fn clear(&mut self) -> &mut Self {
        self.cells.fill(T::default());
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Branch this mask: a copy whose random source is reseeded from
    /// this mask's generator (or absent if this mask has none).
    pub fn copy(&mut self) -> Self {
        let seed = self.rng.as_mut().map(RngCore::next_u64);
        let mut copied = self.clone();
        copied.rng = seed.map(ChaCha8Rng::seed_from_u64);
        copied
    }

    /// Replace the random source with one seeded from `seed`.
    pub fn reseed(&mut self, seed: u64) -> &mut Self {
        self.rng = Some(ChaCha8Rng::seed_from_u64(seed));
        self
    }

    /// Take the random source for a stochastic operation; put it back
    /// with [`Mask::put_rng`].
    ///
    /// # Panics
    ///
    /// Panics if the mask was constructed without a seed.
    pub(crate) fn take_rng(&mut self) -> ChaCha8Rng {
        match self.rng.take() {
            Some(rng) => rng,
            None => panic!("stochastic operation on a mask with no random source"),
        }
    }

    pub(crate) fn put_rng(&mut self, rng: ChaCha8Rng) {
        self.rng = Some(rng);
    }

    /// Draw a child seed from this mask's generator, if it has one.
    pub(crate) fn derive_seed(&mut self) -> Option<u64> {
        self.rng.as_mut().map(RngCore::next_u64)
    }

    pub(crate) fn data(&self) -> &[T] {
        &self.cells
    }

    pub(crate) fn data_mut(&mut self) -> &mut [T] {
        &mut self.cells
    }

    /// Check that `other` has the same dimension.
    pub(crate) fn check_size<U: Element>(&self, other: &Mask<U>) -> Result<(), MaskError> {
        if self.size != other.size {
            return Err(MaskError::SizeMismatch {
                expected: self.size,
                actual: other.size,
            });
        }
        Ok(())
    }

    /// Propagate the canonical region's values to all symmetric images
    /// under `scope`, then interpolate any cells the (approximate)
    /// region missed when the kind is not exact.
    pub fn apply_symmetry(&mut self, scope: SymmetryScope) -> &mut Self {
        let kind = self.symmetry.kind(scope);
        if kind == Symmetry::None {
            return self;
        }
        let region = CanonicalRegion::new(&self.symmetry, scope, self.size);
        let mut touched = vec![false; self.cells.len()];
        for (x, y) in region.cells() {
            touched[self.idx(x, y)] = true;
            let value = self.get(x, y);
            for (ix, iy) in symmetric_cells(&self.symmetry, scope, self.size, x, y) {
                self.set(ix, iy, value);
                touched[self.idx(ix, iy)] = true;
            }
        }
        if !kind.is_exact() {
            self.interpolate(&touched);
        }
        self
    }

    /// Reverse propagation: read each canonical cell's value back from
    /// its images (the images are the source of truth). Leaves no gaps,
    /// so no interpolation runs.
    pub fn apply_symmetry_reverse(&mut self, scope: SymmetryScope) -> &mut Self {
        let kind = self.symmetry.kind(scope);
        if kind == Symmetry::None {
            return self;
        }
        let region = CanonicalRegion::new(&self.symmetry, scope, self.size);
        for (x, y) in region.cells() {
            for (ix, iy) in symmetric_cells(&self.symmetry, scope, self.size, x, y) {
                let value = self.get(ix, iy);
                self.set(x, y, value);
            }
        }
        self
    }

    /// Copy the half-plane starting at `angle` degrees through the
    /// spawn point reflection.
    ///
    /// # Errors
    ///
    /// [`MaskError::InvalidSymmetry`] unless the spawn kind is
    /// [`Symmetry::Point2`].
    pub fn apply_half_symmetry(&mut self, angle: f32) -> Result<&mut Self, MaskError> {
        if self.symmetry.spawn() != Symmetry::Point2 {
            return Err(MaskError::InvalidSymmetry {
                reason: format!(
                    "half-plane propagation needs spawn symmetry point2, got {}",
                    self.symmetry.spawn()
                ),
            });
        }
        for x in 0..self.size {
            for y in 0..self.size {
                if in_half(self.size, x as f32, y as f32, angle) {
                    let value = self.get(x, y);
                    for (ix, iy) in
                        symmetric_cells(&self.symmetry, SymmetryScope::Spawn, self.size, x, y)
                    {
                        self.set(ix, iy, value);
                    }
                }
            }
        }
        Ok(self)
    }

    /// Mirror the whole grid through the 2-fold kind governing `scope`.
    ///
    /// # Errors
    ///
    /// [`MaskError::InvalidSymmetry`] if the kind is not a single-axis
    /// (2-fold) group.
    pub fn flip(&mut self, scope: SymmetryScope) -> Result<&mut Self, MaskError> {
        let kind = self.symmetry.kind(scope);
        if kind.num_symmetric_points() != 2 {
            return Err(MaskError::InvalidSymmetry {
                reason: format!("cannot flip through non single-axis symmetry {kind}"),
            });
        }
        let mut flipped = vec![T::default(); self.cells.len()];
        for x in 0..self.size {
            for y in 0..self.size {
                let images = symmetric_cells(&self.symmetry, scope, self.size, x, y);
                let (ix, iy) = images[0];
                flipped[self.idx(x, y)] = self.get(ix, iy);
            }
        }
        self.cells = flipped;
        Ok(self)
    }

    /// Fill every never-touched cell from its nearest touched neighbor
    /// (deterministic expanding ring search, 8-neighborhood).
    fn interpolate(&mut self, touched: &[bool]) {
        let size = self.size;
        for x in 0..size {
            for y in 0..size {
                if touched[self.idx(x, y)] {
                    continue;
                }
                if let Some(value) = self.nearest_touched(touched, x, y) {
                    self.set(x, y, value);
                }
            }
        }
    }

    fn nearest_touched(&self, touched: &[bool], x: u32, y: u32) -> Option<T> {
        let size = self.size as i64;
        for r in 1..size {
            for dx in -r..=r {
                for dy in -r..=r {
                    if dx.abs().max(dy.abs()) != r {
                        continue;
                    }
                    let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                    if nx < 0 || nx >= size || ny < 0 || ny >= size {
                        continue;
                    }
                    let (nx, ny) = (nx as u32, ny as u32);
                    if touched[self.idx(nx, ny)] {
                        return Some(self.get(nx, ny));
                    }
                }
            }
        }
        None
    }

    /// Grow the buffer to `new_size` by nearest-neighbor resampling,
    /// then re-propagate under the spawn scope (resampling can
    /// desynchronize symmetric images at non-integral ratios).
    ///
    /// # Panics
    ///
    /// Panics if `new_size` is smaller than the current size.
    pub fn enlarge(&mut self, new_size: u32) -> &mut Self {
        assert!(
            new_size >= self.size,
            "enlarge target {new_size} is smaller than current size {}",
            self.size
        );
        if new_size == self.size {
            return self;
        }
        let old = self.size;
        let scale = new_size / old;
        let mut cells = vec![T::default(); (new_size as usize) * (new_size as usize)];
        for x in 0..new_size {
            let sx = (x / scale).min(old - 1);
            for y in 0..new_size {
                let sy = (y / scale).min(old - 1);
                cells[(x as usize) * (new_size as usize) + (y as usize)] = self.get(sx, sy);
            }
        }
        self.cells = cells;
        self.size = new_size;
        self.apply_symmetry(SymmetryScope::Spawn);
        self
    }

    /// Shrink the buffer to `new_size` by sampling window centers, then
    /// re-propagate under the spawn scope.
    ///
    /// # Panics
    ///
    /// Panics if `new_size` is zero or larger than the current size.
    pub fn shrink(&mut self, new_size: u32) -> &mut Self {
        assert!(
            new_size > 0 && new_size <= self.size,
            "shrink target {new_size} invalid for current size {}",
            self.size
        );
        if new_size == self.size {
            return self;
        }
        let old = self.size;
        let mut cells = vec![T::default(); (new_size as usize) * (new_size as usize)];
        for x in 0..new_size {
            let lx = ((x * old) / new_size + old / new_size / 2).min(old - 1);
            for y in 0..new_size {
                let ly = ((y * old) / new_size + old / new_size / 2).min(old - 1);
                cells[(x as usize) * (new_size as usize) + (y as usize)] = self.get(lx, ly);
            }
        }
        self.cells = cells;
        self.size = new_size;
        self.apply_symmetry(SymmetryScope::Spawn);
        self
    }

    /// Resize to `size`, dispatching to [`Mask::enlarge`] or
    /// [`Mask::shrink`].
    pub fn set_size(&mut self, size: u32) -> &mut Self {
        if size > self.size {
            self.enlarge(size);
        } else if size < self.size {
            self.shrink(size);
        }
        self
    }
}

impl<T: Element> PartialEq for Mask<T> {
    /// Value equality: dimension and cell contents. The random source
    /// state is deliberately ignored.
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.cells == other.cells
    }
}

/// FNV-1a accumulator shared by the per-type canonical hashes.
pub(crate) fn fnv1a(hash: &mut u64, bytes: &[u8]) {
    for &b in bytes {
        *hash ^= u64::from(b);
        *hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
}

/// FNV-1a offset basis.
pub(crate) const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(kind: Symmetry) -> Arc<SymmetrySettings> {
        Arc::new(SymmetrySettings::uniform(kind))
    }

    #[test]
    fn new_mask_is_zero_filled() {
        let mask: BitMask = Mask::new(8, Some(1), settings(Symmetry::Point2));
        assert_eq!(mask.size(), 8);
        assert!((0..8).all(|x| (0..8).all(|y| !mask.get(x, y))));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn out_of_bounds_get_panics() {
        let mask: BitMask = Mask::new(4, None, settings(Symmetry::None));
        mask.get(4, 0);
    }

    #[test]
    fn point2_propagation_scenario() {
        // Size 4, point2: (0,0) must land on (3,3) and nowhere else.
        let mut mask: BitMask = Mask::new(4, None, settings(Symmetry::Point2));
        mask.set(0, 0, true);
        mask.apply_symmetry(SymmetryScope::Terrain);
        for x in 0..4 {
            for y in 0..4 {
                let expected = (x, y) == (0, 0) || (x, y) == (3, 3);
                assert_eq!(mask.get(x, y), expected, "cell ({x}, {y})");
            }
        }
    }

    #[test]
    fn reverse_propagation_reads_image_back() {
        let mut mask: BitMask = Mask::new(4, None, settings(Symmetry::Point2));
        mask.set(3, 3, true);
        mask.apply_symmetry_reverse(SymmetryScope::Terrain);
        assert!(mask.get(0, 0));
        assert!(mask.get(3, 3));
    }

    #[test]
    fn apply_symmetry_is_idempotent() {
        let mut mask: ScalarMask = Mask::new(8, Some(7), settings(Symmetry::Point4));
        mask.set(1, 2, 3.5);
        mask.set(0, 0, -1.0);
        mask.apply_symmetry(SymmetryScope::Terrain);
        let once = mask.clone();
        mask.apply_symmetry(SymmetryScope::Terrain);
        assert_eq!(mask, once);
    }

    #[test]
    fn point6_propagation_interpolates_gaps() {
        let mut mask: ScalarMask = Mask::new(16, None, settings(Symmetry::Point6));
        for x in 0..16 {
            for y in 0..16 {
                mask.set(x, y, 2.0);
            }
        }
        mask.apply_symmetry(SymmetryScope::Terrain);
        // A uniform grid stays uniform: every gap interpolates from a
        // touched neighbor holding the same value.
        assert!((0..16).all(|x| (0..16).all(|y| mask.get(x, y) == 2.0)));
    }

    #[test]
    fn set_symmetric_writes_all_images() {
        let mut mask: BitMask = Mask::new(8, None, settings(Symmetry::Point4));
        mask.set_symmetric(1, 2, true, SymmetryScope::Terrain);
        assert!(mask.get(1, 2));
        assert!(mask.get(6, 5));
        assert!(mask.get(2, 6));
        assert!(mask.get(5, 1));
    }

    #[test]
    fn flip_mirrors_across_axis() {
        let mut mask: BitMask = Mask::new(4, None, settings(Symmetry::X));
        mask.set(0, 1, true);
        mask.flip(SymmetryScope::Terrain).unwrap();
        assert!(mask.get(3, 1));
        assert!(!mask.get(0, 1));
    }

    #[test]
    fn flip_rejects_wide_groups() {
        let mut mask: BitMask = Mask::new(4, None, settings(Symmetry::Point4));
        assert!(matches!(
            mask.flip(SymmetryScope::Terrain),
            Err(MaskError::InvalidSymmetry { .. })
        ));
    }

    #[test]
    fn half_symmetry_requires_point2_spawn() {
        let mut mask: BitMask = Mask::new(4, None, settings(Symmetry::X));
        assert!(mask.apply_half_symmetry(0.0).is_err());
        let mut mask: BitMask = Mask::new(4, None, settings(Symmetry::Point2));
        assert!(mask.apply_half_symmetry(0.0).is_ok());
    }

    #[test]
    fn resize_round_trip_keeps_symmetry() {
        let mut mask: BitMask = Mask::new(8, Some(3), settings(Symmetry::Point2));
        mask.set(1, 1, true);
        mask.apply_symmetry(SymmetryScope::Terrain);
        mask.shrink(4).enlarge(8);
        for x in 0..8 {
            for y in 0..8 {
                for (ix, iy) in
                    symmetric_cells(mask.symmetry(), SymmetryScope::Terrain, 8, x, y)
                {
                    assert_eq!(mask.get(x, y), mask.get(ix, iy), "cell ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn copy_derives_a_fresh_seed() {
        let mut mask: BitMask = Mask::new(4, Some(11), settings(Symmetry::Point2));
        let mut a = mask.copy();
        let mut b = mask.copy();
        // Two successive branches draw different child seeds.
        assert_ne!(a.take_rng().next_u64(), b.take_rng().next_u64());
    }

    #[test]
    #[should_panic(expected = "no random source")]
    fn stochastic_op_without_seed_panics() {
        let mut mask: BitMask = Mask::new(4, None, settings(Symmetry::Point2));
        mask.take_rng();
    }

    #[test]
    fn equality_ignores_rng_state() {
        let a: BitMask = Mask::new(4, Some(1), settings(Symmetry::Point2));
        let b: BitMask = Mask::new(4, Some(2), settings(Symmetry::Point2));
        assert_eq!(a, b);
    }
}
