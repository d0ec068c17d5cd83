//! Scalar mask algebra: elementwise arithmetic, summed-area-table
//! smoothing, gradients, and seeded noise.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use strata_core::MaskError;
use strata_symmetry::{CanonicalRegion, SymmetryScope};

use crate::mask::{fnv1a, BitMask, Mask, ScalarMask, FNV_OFFSET};

/// Prefix-sum grid over `values`, with per-cell quantization to 1/1000
/// to keep long accumulation runs stable.
pub(crate) fn inner_count(values: &[f32], size: usize) -> Vec<f32> {
    let mut counts = vec![0.0f32; size * size];
    for x in 0..size {
        for y in 0..size {
            let i = x * size + y;
            let mut v = (values[i] * 1000.0).round() / 1000.0;
            if x > 0 {
                v += counts[i - size];
            }
            if y > 0 {
                v += counts[i - 1];
            }
            if x > 0 && y > 0 {
                v -= counts[i - size - 1];
            }
            counts[i] = v;
        }
    }
    counts
}

/// Box average of `values` with the given radius, O(1) per cell via
/// inclusion-exclusion over the prefix-sum grid. Windows clamp at the
/// grid border, so border cells average over smaller areas.
pub(crate) fn box_average(values: &[f32], size: usize, radius: usize) -> Vec<f32> {
    let counts = inner_count(values, size);
    let at = |x: usize, y: usize| counts[x * size + y];
    let mut out = vec![0.0f32; size * size];
    for x in 0..size {
        for y in 0..size {
            let x_left = x.saturating_sub(radius);
            let x_right = (x + radius).min(size - 1);
            let y_up = y.saturating_sub(radius);
            let y_down = (y + radius).min(size - 1);
            let a = if x_left > 0 && y_up > 0 {
                at(x_left - 1, y_up - 1)
            } else {
                0.0
            };
            let b = if y_up > 0 { at(x_right, y_up - 1) } else { 0.0 };
            let c = if x_left > 0 { at(x_left - 1, y_down) } else { 0.0 };
            let d = at(x_right, y_down);
            let count = d + a - b - c;
            let area = ((x_right - x_left + 1) * (y_down - y_up + 1)) as f32;
            out[x * size + y] = count / area;
        }
    }
    out
}

/// Standard-normal sample via the Box-Muller transform.
fn gaussian(rng: &mut ChaCha8Rng) -> f32 {
    let u1: f64 = rng.random::<f64>().max(1e-300);
    let u2: f64 = rng.random();
    ((-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()) as f32
}

impl ScalarMask {
    /// Set cells to `high` where `other` is true and `low` elsewhere.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn init(&mut self, other: &BitMask, low: f32, high: f32) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell = if v { high } else { low };
        }
        Ok(self)
    }

    /// Elementwise addition.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn add(&mut self, other: &ScalarMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell += v;
        }
        Ok(self)
    }

    /// Elementwise subtraction.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn subtract(&mut self, other: &ScalarMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell -= v;
        }
        Ok(self)
    }

    /// Elementwise multiplication.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn multiply(&mut self, other: &ScalarMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell *= v;
        }
        Ok(self)
    }

    /// Elementwise minimum with `other`.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn min(&mut self, other: &ScalarMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell = cell.min(v);
        }
        Ok(self)
    }

    /// Elementwise maximum with `other`.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn max(&mut self, other: &ScalarMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell = cell.max(v);
        }
        Ok(self)
    }

    /// Add a constant to every cell.
    pub fn add_scalar(&mut self, value: f32) -> &mut Self {
        for cell in self.data_mut() {
            *cell += value;
        }
        self
    }

    /// Multiply every cell by a constant.
    pub fn multiply_scalar(&mut self, value: f32) -> &mut Self {
        for cell in self.data_mut() {
            *cell *= value;
        }
        self
    }

    /// Raise every cell to at least `value`.
    pub fn clamp_min(&mut self, value: f32) -> &mut Self {
        for cell in self.data_mut() {
            *cell = cell.max(value);
        }
        self
    }

    /// Lower every cell to at most `value`.
    pub fn clamp_max(&mut self, value: f32) -> &mut Self {
        for cell in self.data_mut() {
            *cell = cell.min(value);
        }
        self
    }

    /// Zero every cell below `threshold`.
    pub fn zero_below(&mut self, threshold: f32) -> &mut Self {
        for cell in self.data_mut() {
            if *cell < threshold {
                *cell = 0.0;
            }
        }
        self
    }

    /// Add `value` to every cell where `other` is true.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn add_masked(&mut self, other: &BitMask, value: f32) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            if v {
                *cell += value;
            }
        }
        Ok(self)
    }

    /// Subtract `value` from every cell where `other` is true.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn subtract_masked(&mut self, other: &BitMask, value: f32) -> Result<&mut Self, MaskError> {
        self.add_masked(other, -value)
    }

    /// Zero every cell outside the true region of `other`.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn remove_outside(&mut self, other: &BitMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            if !v {
                *cell = 0.0;
            }
        }
        Ok(self)
    }

    /// Zero every cell inside the true region of `other`.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn remove_inside(&mut self, other: &BitMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            if v {
                *cell = 0.0;
            }
        }
        Ok(self)
    }

    /// Box-average smoothing over a `(2·radius+1)²` window, O(1) per
    /// cell regardless of radius.
    pub fn smooth(&mut self, radius: u32) -> &mut Self {
        let size = self.size() as usize;
        let averaged = box_average(self.data(), size, radius as usize);
        self.data_mut().copy_from_slice(&averaged);
        self
    }

    /// Like [`ScalarMask::smooth`], but only cells where `limiter` is
    /// true are replaced.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn smooth_within(
        &mut self,
        radius: u32,
        limiter: &BitMask,
    ) -> Result<&mut Self, MaskError> {
        self.check_size(limiter)?;
        let size = self.size() as usize;
        let averaged = box_average(self.data(), size, radius as usize);
        for ((cell, avg), &keep) in self
            .data_mut()
            .iter_mut()
            .zip(averaged)
            .zip(limiter.data())
        {
            if keep {
                *cell = avg;
            }
        }
        Ok(self)
    }

    /// Replace every cell with its central-difference slope magnitude.
    pub fn gradient(&mut self) -> &mut Self {
        let size = self.size();
        let mut slopes = vec![0.0f32; self.data().len()];
        for x in 0..size {
            for y in 0..size {
                let x_neg = x.saturating_sub(1);
                let x_pos = (x + 1).min(size - 1);
                let y_neg = y.saturating_sub(1);
                let y_pos = (y + 1).min(size - 1);
                let x_slope = self.get(x_pos, y) - self.get(x_neg, y);
                let y_slope = self.get(x, y_pos) - self.get(x, y_neg);
                slopes[self.idx(x, y)] = (x_slope * x_slope + y_slope * y_slope).sqrt();
            }
        }
        self.data_mut().copy_from_slice(&slopes);
        self
    }

    /// Replace every cell with the maximum of its three forward
    /// directional differences (right, down, down-right) — the slope
    /// metric the target engine itself uses for passability.
    pub fn max_slope(&mut self) -> &mut Self {
        let size = self.size();
        let mut slopes = vec![0.0f32; self.data().len()];
        for x in 0..size {
            for y in 0..size {
                let x_pos = (x + 1).min(size - 1);
                let y_pos = (y + 1).min(size - 1);
                let v = self.get(x, y);
                let x_slope = (v - self.get(x_pos, y)).abs();
                let y_slope = (v - self.get(x, y_pos)).abs();
                let diag_slope = (v - self.get(x_pos, y_pos)).abs();
                slopes[self.idx(x, y)] = x_slope.max(y_slope).max(diag_slope);
            }
        }
        self.data_mut().copy_from_slice(&slopes);
        self
    }

    /// Add seeded Gaussian noise with standard deviation `scale`, then
    /// propagate the terrain symmetry.
    ///
    /// # Panics
    ///
    /// Panics if the mask has no random source.
    pub fn add_gaussian_noise(&mut self, scale: f32) -> &mut Self {
        let mut rng = self.take_rng();
        for cell in self.data_mut() {
            *cell += gaussian(&mut rng) * scale;
        }
        self.put_rng(rng);
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Add seeded uniform noise in `[0, scale)`, then propagate the
    /// terrain symmetry.
    ///
    /// # Panics
    ///
    /// Panics if the mask has no random source.
    pub fn add_white_noise(&mut self, scale: f32) -> &mut Self {
        let mut rng = self.take_rng();
        for cell in self.data_mut() {
            *cell += rng.random::<f32>() * scale;
        }
        self.put_rng(rng);
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Threshold into a presence mask: `value >= threshold → true`.
    /// The new mask's seed is derived from this mask's generator when
    /// one is present.
    pub fn to_bit(&mut self, threshold: f32) -> BitMask {
        let seed = self.derive_seed();
        BitMask::from_scalar(self, threshold, seed)
    }

    /// Smallest cell value.
    pub fn min_value(&self) -> f32 {
        self.data().iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Largest cell value.
    pub fn max_value(&self) -> f32 {
        self.data()
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Sum over all cells.
    pub fn sum(&self) -> f32 {
        self.data().iter().sum()
    }

    /// Mean over all cells.
    pub fn mean(&self) -> f32 {
        self.sum() / self.data().len() as f32
    }

    /// Whether no in-bounds 8-neighbor exceeds the cell's value.
    pub fn is_local_max(&self, x: u32, y: u32) -> bool {
        let size = self.size() as i64;
        let v = self.get(x, y);
        for dx in -1..=1i64 {
            for dy in -1..=1i64 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let (nx, ny) = (x as i64 + dx, y as i64 + dy);
                if nx >= 0 && nx < size && ny >= 0 && ny < size {
                    if self.get(nx as u32, ny as u32) > v {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Presence mask of local maxima with values strictly inside
    /// `(min_value, max_value)`. The result's seed is derived from this
    /// mask's generator when one is present.
    pub fn local_maxima(&mut self, min_value: f32, max_value: f32) -> BitMask {
        let seed = self.derive_seed();
        let mut maxima: BitMask = Mask::new(self.size(), seed, self.symmetry().clone());
        for x in 0..self.size() {
            for y in 0..self.size() {
                let v = self.get(x, y);
                if v > min_value && v < max_value && self.is_local_max(x, y) {
                    maxima.set(x, y, true);
                }
            }
        }
        maxima
    }

    /// FNV-1a hash of the spawn-scope canonical region's bit patterns,
    /// for determinism checks.
    pub fn canonical_hash(&self) -> u64 {
        let region = CanonicalRegion::new(self.symmetry(), SymmetryScope::Spawn, self.size());
        let mut hash = FNV_OFFSET;
        for (x, y) in region.cells() {
            fnv1a(&mut hash, &self.get(x, y).to_bits().to_le_bytes());
        }
        hash
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_symmetry::{Symmetry, SymmetrySettings};

    fn mask(size: u32, seed: Option<u64>, kind: Symmetry) -> ScalarMask {
        Mask::new(size, seed, Arc::new(SymmetrySettings::uniform(kind)))
    }

    #[test]
    fn uniform_grid_is_smooth_fixed_point() {
        let mut m = mask(4, None, Symmetry::None);
        m.add_scalar(1.0);
        m.smooth(1);
        assert!((0..4).all(|x| (0..4).all(|y| m.get(x, y) == 1.0)));
    }

    #[test]
    fn smooth_averages_neighborhood() {
        let mut m = mask(8, None, Symmetry::None);
        m.set(3, 3, 9.0);
        m.smooth(1);
        // Interior window: 9 cells, one of them 9.0.
        assert!((m.get(3, 3) - 1.0).abs() < 1e-4);
        assert!((m.get(2, 2) - 1.0).abs() < 1e-4);
        assert_eq!(m.get(6, 6), 0.0);
    }

    #[test]
    fn smooth_within_respects_limiter() {
        let settings = Arc::new(SymmetrySettings::uniform(Symmetry::None));
        let mut m = mask(8, None, Symmetry::None);
        m.set(3, 3, 9.0);
        let mut limiter: BitMask = Mask::new(8, None, settings);
        limiter.set(0, 0, true);
        m.smooth_within(1, &limiter).unwrap();
        // (3, 3) outside the limiter keeps its value.
        assert_eq!(m.get(3, 3), 9.0);
        assert_eq!(m.get(0, 0), 0.0);
    }

    #[test]
    fn elementwise_arithmetic() {
        let mut a = mask(4, None, Symmetry::None);
        let mut b = mask(4, None, Symmetry::None);
        a.add_scalar(2.0);
        b.add_scalar(3.0);
        a.add(&b).unwrap();
        assert_eq!(a.get(1, 1), 5.0);
        a.multiply(&b).unwrap();
        assert_eq!(a.get(1, 1), 15.0);
        a.subtract(&b).unwrap();
        assert_eq!(a.get(1, 1), 12.0);
        a.min(&b).unwrap();
        assert_eq!(a.get(1, 1), 3.0);
        b.multiply_scalar(10.0);
        a.max(&b).unwrap();
        assert_eq!(a.get(1, 1), 30.0);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut a = mask(4, None, Symmetry::None);
        let b = mask(8, None, Symmetry::None);
        assert!(matches!(
            a.add(&b),
            Err(MaskError::SizeMismatch {
                expected: 4,
                actual: 8
            })
        ));
    }

    #[test]
    fn clamps_and_threshold() {
        let mut m = mask(4, None, Symmetry::None);
        m.set(0, 0, 5.0);
        m.set(1, 1, -5.0);
        m.clamp_max(3.0).clamp_min(-3.0);
        assert_eq!(m.get(0, 0), 3.0);
        assert_eq!(m.get(1, 1), -3.0);
        m.zero_below(0.0);
        assert_eq!(m.get(1, 1), 0.0);
        assert_eq!(m.get(0, 0), 3.0);
    }

    #[test]
    fn init_and_masked_add() {
        let settings = Arc::new(SymmetrySettings::uniform(Symmetry::None));
        let mut bit: BitMask = Mask::new(4, None, settings);
        bit.set(2, 2, true);
        let mut m = mask(4, None, Symmetry::None);
        m.init(&bit, 0.5, 2.0).unwrap();
        assert_eq!(m.get(2, 2), 2.0);
        assert_eq!(m.get(0, 0), 0.5);
        m.add_masked(&bit, 1.0).unwrap();
        assert_eq!(m.get(2, 2), 3.0);
        assert_eq!(m.get(0, 0), 0.5);
    }

    #[test]
    fn gradient_of_ramp_is_constant() {
        let mut m = mask(8, None, Symmetry::None);
        for x in 0..8 {
            for y in 0..8 {
                m.set(x, y, x as f32);
            }
        }
        m.gradient();
        // Central difference over a unit ramp: (x+1) - (x-1) = 2.
        assert!((m.get(3, 3) - 2.0).abs() < 1e-6);
        // Clamped one-sided difference at the border.
        assert!((m.get(0, 3) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn max_slope_takes_steepest_direction() {
        let mut m = mask(4, None, Symmetry::None);
        m.set(1, 1, 1.0);
        m.set(2, 1, 4.0);
        m.set(1, 2, 2.0);
        m.set(2, 2, 1.5);
        m.max_slope();
        assert_eq!(m.get(1, 1), 3.0);
    }

    #[test]
    fn noise_is_symmetric_and_seed_deterministic() {
        let mut a = mask(8, Some(21), Symmetry::Point2);
        let mut b = mask(8, Some(21), Symmetry::Point2);
        a.add_gaussian_noise(1.0);
        b.add_gaussian_noise(1.0);
        assert_eq!(a, b);
        for x in 0..8 {
            for y in 0..8 {
                assert_eq!(a.get(x, y), a.get(7 - x, 7 - y));
            }
        }
    }

    #[test]
    fn to_bit_thresholds() {
        let mut m = mask(4, Some(1), Symmetry::None);
        m.set(1, 1, 0.7);
        let bit = m.to_bit(0.5);
        assert!(bit.get(1, 1));
        assert!(!bit.get(0, 0));
    }

    #[test]
    fn stats_and_local_maxima() {
        let mut m = mask(8, Some(1), Symmetry::None);
        m.set(3, 3, 5.0);
        m.set(6, 6, 9.0);
        assert_eq!(m.max_value(), 9.0);
        assert_eq!(m.min_value(), 0.0);
        assert!((m.mean() - 14.0 / 64.0).abs() < 1e-6);
        let maxima = m.local_maxima(1.0, 8.0);
        assert!(maxima.get(3, 3));
        assert!(!maxima.get(6, 6), "9.0 is outside the value window");
        assert!(!maxima.get(0, 0));
    }

    #[test]
    fn canonical_hash_tracks_canonical_half() {
        let mut a = mask(8, None, Symmetry::Point2);
        let mut b = mask(8, None, Symmetry::Point2);
        a.set(1, 1, 1.0);
        b.set(1, 1, 1.0);
        assert_eq!(a.canonical_hash(), b.canonical_hash());
        b.set(2, 2, 1.0);
        assert_ne!(a.canonical_hash(), b.canonical_hash());
    }
}
