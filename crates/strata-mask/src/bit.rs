//! Boolean mask algebra: morphology, set operations, component
//! filtering, and stochastic shaping.

use rand::Rng;
use std::collections::VecDeque;

use strata_core::MaskError;
use strata_symmetry::{CanonicalRegion, SymmetryScope};

use crate::mask::{fnv1a, BitMask, Mask, ScalarMask, FNV_OFFSET};
use crate::scalar::box_average;

/// Whether any in-bounds 8-neighbor of `(x, y)` equals `value`.
fn has_neighbor8(cells: &[bool], size: u32, x: u32, y: u32, value: bool) -> bool {
    let size = size as i64;
    let (x, y) = (x as i64, y as i64);
    for dx in -1..=1i64 {
        for dy in -1..=1i64 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let (nx, ny) = (x + dx, y + dy);
            if nx >= 0 && nx < size && ny >= 0 && ny < size {
                if cells[(nx * size + ny) as usize] == value {
                    return true;
                }
            }
        }
    }
    false
}

/// Whether any in-bounds 4-neighbor of `(x, y)` equals `value`.
fn has_neighbor4(cells: &[bool], size: u32, x: u32, y: u32, value: bool) -> bool {
    count_neighbors4(cells, size, x, y, value) > 0
}

/// Count of in-bounds 4-neighbors of `(x, y)` equal to `value`.
fn count_neighbors4(cells: &[bool], size: u32, x: u32, y: u32, value: bool) -> u32 {
    let size = size as i64;
    let (x, y) = (x as i64, y as i64);
    let mut count = 0;
    for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
        if nx >= 0 && nx < size && ny >= 0 && ny < size {
            if cells[(nx * size + ny) as usize] == value {
                count += 1;
            }
        }
    }
    count
}

impl BitMask {
    /// A presence mask thresholded from a scalar mask:
    /// `value >= threshold → true`. Shares the source's symmetry
    /// settings; `seed` feeds the new mask's random source.
    pub fn from_scalar(source: &ScalarMask, threshold: f32, seed: Option<u64>) -> BitMask {
        let mut mask: BitMask = Mask::new(source.size(), seed, source.symmetry().clone());
        for (out, &v) in mask.data_mut().iter_mut().zip(source.data()) {
            *out = v >= threshold;
        }
        mask
    }

    /// Number of `true` cells.
    pub fn count(&self) -> usize {
        self.data().iter().filter(|&&v| v).count()
    }

    /// Set each canonical-region cell `true` with probability
    /// `density`, then propagate.
    ///
    /// # Panics
    ///
    /// Panics if the mask has no random source.
    pub fn randomize(&mut self, density: f32) -> &mut Self {
        let mut rng = self.take_rng();
        let region = CanonicalRegion::new(self.symmetry(), SymmetryScope::Terrain, self.size());
        for (x, y) in region.cells() {
            let value = rng.random::<f32>() < density;
            self.set(x, y, value);
        }
        self.put_rng(rng);
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Logical NOT of every cell.
    pub fn invert(&mut self) -> &mut Self {
        for cell in self.data_mut() {
            *cell = !*cell;
        }
        self
    }

    /// One stochastic dilation step per `count`: a false canonical cell
    /// with a true 8-neighbor becomes true with probability `strength`,
    /// mirrored under `scope` after each step.
    ///
    /// # Panics
    ///
    /// Panics if the mask has no random source.
    pub fn grow(&mut self, strength: f32, scope: SymmetryScope, count: u32) -> &mut Self {
        let mut rng = self.take_rng();
        for _ in 0..count {
            let snapshot = self.data().to_vec();
            let size = self.size();
            let region = CanonicalRegion::new(self.symmetry(), scope, size);
            for (x, y) in region.cells() {
                let i = self.idx(x, y);
                if !snapshot[i]
                    && has_neighbor8(&snapshot, size, x, y, true)
                    && rng.random::<f32>() < strength
                {
                    self.set(x, y, true);
                }
            }
            self.apply_symmetry(scope);
        }
        self.put_rng(rng);
        self
    }

    /// One stochastic erosion step per `count`: a true canonical cell
    /// with a false 8-neighbor becomes false with probability
    /// `strength`, mirrored under `scope` after each step.
    ///
    /// # Panics
    ///
    /// Panics if the mask has no random source.
    pub fn erode(&mut self, strength: f32, scope: SymmetryScope, count: u32) -> &mut Self {
        let mut rng = self.take_rng();
        for _ in 0..count {
            let snapshot = self.data().to_vec();
            let size = self.size();
            let region = CanonicalRegion::new(self.symmetry(), scope, size);
            for (x, y) in region.cells() {
                let i = self.idx(x, y);
                if snapshot[i]
                    && has_neighbor8(&snapshot, size, x, y, false)
                    && rng.random::<f32>() < strength
                {
                    self.set(x, y, false);
                }
            }
            self.apply_symmetry(scope);
        }
        self.put_rng(rng);
        self
    }

    /// Expand true regions by `radius` in city-block distance. Unlike
    /// iterated [`BitMask::grow`], the cost is independent of the
    /// radius.
    pub fn inflate(&mut self, radius: f32) -> &mut Self {
        let dist = self.distance_to(true);
        for (cell, d) in self.data_mut().iter_mut().zip(dist) {
            if d <= radius {
                *cell = true;
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Contract true regions by `radius` in city-block distance.
    pub fn deflate(&mut self, radius: f32) -> &mut Self {
        let dist = self.distance_to(false);
        for (cell, d) in self.data_mut().iter_mut().zip(dist) {
            if d <= radius {
                *cell = false;
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Morphological closing: fill false regions narrower than
    /// `min_distance`.
    pub fn fill_gaps(&mut self, min_distance: u32) -> &mut Self {
        let radius = min_distance as f32 / 2.0;
        self.inflate(radius).deflate(radius)
    }

    /// Morphological opening: widen false regions by removing true
    /// necks narrower than `min_distance`.
    pub fn widen_gaps(&mut self, min_distance: u32) -> &mut Self {
        let radius = min_distance as f32 / 2.0;
        self.deflate(radius).inflate(radius)
    }

    /// Keep only the edge of every true region: true cells with at
    /// least one false 4-neighbor.
    pub fn outline(&mut self) -> &mut Self {
        let snapshot = self.data().to_vec();
        let size = self.size();
        for x in 0..size {
            for y in 0..size {
                let i = self.idx(x, y);
                let value = snapshot[i] && has_neighbor4(&snapshot, size, x, y, false);
                self.set(x, y, value);
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Drop true cells with fewer than two true 4-neighbors, rounding
    /// off single-cell spurs and corners.
    pub fn cut_corners(&mut self) -> &mut Self {
        let snapshot = self.data().to_vec();
        let size = self.size();
        for x in 0..size {
            for y in 0..size {
                let i = self.idx(x, y);
                if snapshot[i] && count_neighbors4(&snapshot, size, x, y, true) < 2 {
                    self.set(x, y, false);
                }
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Box-vote smoothing: a cell becomes true when the fraction of
    /// true cells in its `(2·radius+1)²` window exceeds `density`.
    pub fn smooth(&mut self, radius: u32, density: f32, scope: SymmetryScope) -> &mut Self {
        let size = self.size() as usize;
        let values: Vec<f32> = self.data().iter().map(|&v| if v { 1.0 } else { 0.0 }).collect();
        let averaged = box_average(&values, size, radius as usize);
        for (cell, avg) in self.data_mut().iter_mut().zip(averaged) {
            *cell = avg > density;
        }
        self.apply_symmetry(scope);
        self
    }

    /// Union with `other` (logical OR).
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn combine(&mut self, other: &BitMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell |= v;
        }
        Ok(self)
    }

    /// Intersection with `other` (logical AND).
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn intersect(&mut self, other: &BitMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell &= v;
        }
        Ok(self)
    }

    /// Difference: keep true cells not set in `other`.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn minus(&mut self, other: &BitMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        for (cell, &v) in self.data_mut().iter_mut().zip(other.data()) {
            *cell &= !v;
        }
        Ok(self)
    }

    /// Overwrite this mask's cells with `other`'s.
    ///
    /// # Errors
    ///
    /// [`MaskError::SizeMismatch`] if the dimensions differ.
    pub fn replace(&mut self, other: &BitMask) -> Result<&mut Self, MaskError> {
        self.check_size(other)?;
        self.data_mut().copy_from_slice(other.data());
        Ok(self)
    }

    /// Clear every 4-connected true component whose area fails `keep`.
    /// The decision uses the full component size, found by flood fill
    /// before anything is cleared.
    fn filter_components(&mut self, keep: impl Fn(usize) -> bool) -> &mut Self {
        let size = self.size() as usize;
        let n = size * size;
        let mut visited = vec![false; n];
        let mut queue = VecDeque::new();
        let mut component = Vec::new();
        for start in 0..n {
            if visited[start] || !self.data()[start] {
                continue;
            }
            component.clear();
            queue.clear();
            visited[start] = true;
            queue.push_back(start);
            while let Some(i) = queue.pop_front() {
                component.push(i);
                let (x, y) = (i / size, i % size);
                let mut visit = |j: usize, cells: &[bool], visited: &mut Vec<bool>, queue: &mut VecDeque<usize>| {
                    if !visited[j] && cells[j] {
                        visited[j] = true;
                        queue.push_back(j);
                    }
                };
                let cells = self.data();
                if x > 0 {
                    visit(i - size, cells, &mut visited, &mut queue);
                }
                if x + 1 < size {
                    visit(i + size, cells, &mut visited, &mut queue);
                }
                if y > 0 {
                    visit(i - 1, cells, &mut visited, &mut queue);
                }
                if y + 1 < size {
                    visit(i + 1, cells, &mut visited, &mut queue);
                }
            }
            if !keep(component.len()) {
                for &i in &component {
                    self.data_mut()[i] = false;
                }
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Clear 4-connected true components smaller than `min_area` cells.
    pub fn remove_areas_smaller_than(&mut self, min_area: usize) -> &mut Self {
        self.filter_components(|area| area >= min_area)
    }

    /// Clear 4-connected true components larger than `max_area` cells.
    pub fn remove_areas_bigger_than(&mut self, max_area: usize) -> &mut Self {
        self.filter_components(|area| area <= max_area)
    }

    /// Scatter `walkers` random walkers for `steps` steps each, marking
    /// every visited in-bounds cell true, then propagate.
    ///
    /// # Panics
    ///
    /// Panics if the mask has no random source.
    pub fn random_walk(&mut self, walkers: u32, steps: u32) -> &mut Self {
        let mut rng = self.take_rng();
        let size = self.size();
        for _ in 0..walkers {
            let mut x = rng.random_range(0..size) as i64;
            let mut y = rng.random_range(0..size) as i64;
            for _ in 0..steps {
                if x >= 0 && x < size as i64 && y >= 0 && y < size as i64 {
                    self.set(x as u32, y as u32, true);
                }
                match rng.random_range(0..4u32) {
                    0 => x += 1,
                    1 => x -= 1,
                    2 => y += 1,
                    _ => y -= 1,
                }
            }
        }
        self.put_rng(rng);
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Randomly pick true cells at least `spacing` apart (Euclidean),
    /// until no candidate remains. Used to seed brush and resource
    /// placement.
    ///
    /// # Panics
    ///
    /// Panics if the mask has no random source.
    pub fn random_coordinates(&mut self, spacing: f32) -> Vec<(u32, u32)> {
        let mut rng = self.take_rng();
        let size = self.size();
        let mut candidates: Vec<(u32, u32)> = (0..size)
            .flat_map(|x| (0..size).map(move |y| (x, y)))
            .filter(|&(x, y)| self.get(x, y))
            .collect();
        let mut picked = Vec::new();
        while !candidates.is_empty() {
            let (cx, cy) = candidates[rng.random_range(0..candidates.len())];
            picked.push((cx, cy));
            candidates.retain(|&(x, y)| {
                let (dx, dy) = (x as f32 - cx as f32, y as f32 - cy as f32);
                (dx * dx + dy * dy).sqrt() > spacing
            });
        }
        self.put_rng(rng);
        picked
    }

    /// FNV-1a hash of the spawn-scope canonical region, for
    /// determinism checks.
    pub fn canonical_hash(&self) -> u64 {
        let region = CanonicalRegion::new(self.symmetry(), SymmetryScope::Spawn, self.size());
        let mut hash = FNV_OFFSET;
        for (x, y) in region.cells() {
            fnv1a(&mut hash, &[u8::from(self.get(x, y))]);
        }
        hash
    }
}
