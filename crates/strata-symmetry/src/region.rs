//! Canonical iteration regions and half-plane predicates.
//!
//! The canonical region of a symmetry kind is the minimal subregion
//! whose symmetric images cover the whole grid: propagation iterates
//! only this region and writes through [`crate::symmetric_cells`].
//! Mirror and low-order point groups have exact rectangular or
//! triangular regions; higher rotational groups use an arc
//! approximation bounded by the group angle, and the few boundary
//! cells the approximation misses are closed by interpolation on the
//! mask side.

use crate::kind::Symmetry;
use crate::settings::{SymmetryScope, SymmetrySettings};

/// The canonical generating region for one symmetry kind on one grid
/// size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicalRegion {
    kind: Symmetry,
    size: u32,
}

impl CanonicalRegion {
    /// Region for the kind governing `scope` in `settings`.
    pub fn new(settings: &SymmetrySettings, scope: SymmetryScope, size: u32) -> Self {
        Self::of_kind(settings.kind(scope), size)
    }

    /// Region for an explicit kind.
    pub fn of_kind(kind: Symmetry, size: u32) -> Self {
        Self { kind, size }
    }

    /// Exclusive upper bound on `x` (the lower bound is always 0).
    pub fn max_x(&self) -> u32 {
        match self.kind.rotation_order() {
            Some(n) => self
                .arc_max_x(360.0 / n as f32)
                .max(self.size / 2),
            None => match self.kind {
                Symmetry::X | Symmetry::Quad | Symmetry::Diag => self.size / 2,
                _ => self.size,
            },
        }
    }

    /// Half-open `y` range for column `x`. May be empty near the arc
    /// boundary of rotational groups.
    pub fn y_bounds(&self, x: u32) -> (u32, u32) {
        let min = match self.kind.rotation_order() {
            Some(n) => self.arc_min_y(x, 360.0 / n as f32),
            None => match self.kind {
                Symmetry::Diagonal | Symmetry::Diag => x,
                _ => 0,
            },
        };
        let max = match self.kind.rotation_order() {
            Some(n) => self.arc_max_y(x, 360.0 / n as f32),
            None => match self.kind {
                Symmetry::AntiDiagonal | Symmetry::Diag => self.size - x,
                Symmetry::Z | Symmetry::Quad => self.size / 2,
                _ => self.size,
            },
        };
        (min, max)
    }

    /// Whether the cell lies inside the region.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        if x >= self.max_x() {
            return false;
        }
        let (lo, hi) = self.y_bounds(x);
        y >= lo && y < hi
    }

    /// Iterate the region's cells, `x` outer, `y` inner.
    pub fn cells(&self) -> RegionCells {
        RegionCells::new(*self)
    }

    /// Largest `x` reached by the bounding arc of `angle` degrees.
    fn arc_max_x(&self, angle: f32) -> u32 {
        let s = self.size as f32;
        let x = (((angle + 180.0) / 180.0 % 2.0) * std::f32::consts::PI).cos() * s + s / 2.0;
        (x.round() as i64).clamp(0, self.size as i64) as u32
    }

    /// Lower `y` bound on the arc for column `x`.
    fn arc_min_y(&self, x: u32, angle: f32) -> u32 {
        let s = self.size as f32;
        let dx = x as f32 - s / 2.0;
        let y = if x > self.arc_max_x(angle) {
            let tan = (((angle + 180.0) / 180.0 % 2.0) * std::f32::consts::PI).tan();
            ((self.size / 2) as f32 + tan * dx) as i64
        } else {
            (s / 2.0 - (s * s - dx * dx).sqrt()).round() as i64
        };
        y.clamp(0, self.size as i64) as u32
    }

    /// Upper `y` bound on the arc for column `x`.
    fn arc_max_y(&self, x: u32, angle: f32) -> u32 {
        let dx = x as f32 - self.size as f32 / 2.0;
        let y = if x > self.size / 2 {
            let tan = (((angle + 180.0) / 180.0 % 2.0) * std::f32::consts::PI).tan();
            ((self.size / 2) as f32 + tan * dx) as i64
        } else {
            (self.size / 2) as i64
        };
        y.clamp(0, self.size as i64) as u32
    }
}

/// Iterator over the cells of a [`CanonicalRegion`].
#[derive(Clone, Debug)]
pub struct RegionCells {
    region: CanonicalRegion,
    x: u32,
    y: u32,
    y_max: u32,
}

impl RegionCells {
    fn new(region: CanonicalRegion) -> Self {
        let (y, y_max) = if region.max_x() > 0 {
            region.y_bounds(0)
        } else {
            (0, 0)
        };
        Self {
            region,
            x: 0,
            y,
            y_max,
        }
    }
}

impl Iterator for RegionCells {
    type Item = (u32, u32);

    fn next(&mut self) -> Option<(u32, u32)> {
        let max_x = self.region.max_x();
        loop {
            if self.x >= max_x {
                return None;
            }
            if self.y < self.y_max {
                let cell = (self.x, self.y);
                self.y += 1;
                return Some(cell);
            }
            self.x += 1;
            if self.x < max_x {
                let (lo, hi) = self.region.y_bounds(self.x);
                self.y = lo;
                self.y_max = hi;
            }
        }
    }
}

/// Whether the cell belongs to the team half of the map: membership in
/// the team scope's canonical region.
pub fn in_team_half(settings: &SymmetrySettings, size: u32, x: u32, y: u32) -> bool {
    x < size && y < size && CanonicalRegion::new(settings, SymmetryScope::Team, size).contains(x, y)
}

/// Whether the location lies in the half-plane that starts at `angle`
/// degrees (measured clockwise from the top of the map, about the grid
/// center) and spans 180 degrees.
pub fn in_half(size: u32, x: f32, y: f32, angle: f32) -> bool {
    let c = size as f32 / 2.0;
    let vector_angle = ((y - c).atan2(x - c).to_degrees() + 90.0 + 360.0) % 360.0;
    let upper = (angle + 180.0) % 360.0;
    let inside = if angle >= 180.0 {
        vector_angle >= angle || vector_angle < upper
    } else {
        vector_angle >= angle && vector_angle < upper
    };
    inside && x >= 0.0 && x < size as f32 && y >= 0.0 && y < size as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::symmetric_cells;
    use crate::kind::ALL_KINDS;
    use proptest::prelude::*;
    use std::collections::HashSet;

    proptest! {
        /// Canonical cells and their images stay in bounds for every
        /// kind and size.
        #[test]
        fn region_and_images_stay_in_bounds(
            kind in prop::sample::select(ALL_KINDS.to_vec()),
            size in prop::sample::select(vec![4u32, 8, 16, 32]),
        ) {
            let settings = SymmetrySettings::uniform(kind);
            let region = CanonicalRegion::of_kind(kind, size);
            for (x, y) in region.cells() {
                prop_assert!(x < size && y < size, "canonical cell ({x}, {y})");
                for (ix, iy) in symmetric_cells(&settings, SymmetryScope::Terrain, size, x, y) {
                    prop_assert!(ix < size && iy < size, "image ({ix}, {iy})");
                }
            }
        }

        /// `contains` agrees with the cell iterator.
        #[test]
        fn contains_matches_iteration(
            kind in prop::sample::select(ALL_KINDS.to_vec()),
            size in prop::sample::select(vec![4u32, 8, 16]),
        ) {
            let region = CanonicalRegion::of_kind(kind, size);
            let cells: HashSet<(u32, u32)> = region.cells().collect();
            for x in 0..size {
                for y in 0..size {
                    prop_assert_eq!(region.contains(x, y), cells.contains(&(x, y)));
                }
            }
        }
    }

    #[test]
    fn point2_region_is_lower_half() {
        let region = CanonicalRegion::of_kind(Symmetry::Point2, 8);
        assert_eq!(region.max_x(), 8);
        for x in 0..8 {
            assert_eq!(region.y_bounds(x), (0, 4), "column {x}");
        }
        assert_eq!(region.cells().count(), 32);
    }

    #[test]
    fn x_region_is_left_half() {
        let region = CanonicalRegion::of_kind(Symmetry::X, 8);
        assert_eq!(region.max_x(), 4);
        assert_eq!(region.y_bounds(2), (0, 8));
    }

    #[test]
    fn point4_region_is_quadrant() {
        let region = CanonicalRegion::of_kind(Symmetry::Point4, 8);
        assert_eq!(region.max_x(), 4);
        for x in 0..4 {
            assert_eq!(region.y_bounds(x), (0, 4), "column {x}");
        }
    }

    #[test]
    fn diagonal_region_is_upper_triangle() {
        let region = CanonicalRegion::of_kind(Symmetry::Diagonal, 8);
        assert_eq!(region.max_x(), 8);
        assert_eq!(region.y_bounds(0), (0, 8));
        assert_eq!(region.y_bounds(5), (5, 8));
    }

    #[test]
    fn diag_region_is_wedge() {
        let region = CanonicalRegion::of_kind(Symmetry::Diag, 8);
        assert_eq!(region.max_x(), 4);
        assert_eq!(region.y_bounds(1), (1, 7));
    }

    #[test]
    fn none_region_is_whole_grid() {
        let region = CanonicalRegion::of_kind(Symmetry::None, 8);
        assert_eq!(region.cells().count(), 64);
    }

    #[test]
    fn exact_kinds_cover_grid_from_canonical_region() {
        let size = 8;
        for kind in [
            Symmetry::X,
            Symmetry::Z,
            Symmetry::Diagonal,
            Symmetry::AntiDiagonal,
            Symmetry::Point2,
            Symmetry::Point4,
            Symmetry::Quad,
            Symmetry::Diag,
        ] {
            let settings = SymmetrySettings::uniform(kind);
            let region = CanonicalRegion::of_kind(kind, size);
            let mut covered = HashSet::new();
            for (x, y) in region.cells() {
                covered.insert((x, y));
                for cell in symmetric_cells(&settings, SymmetryScope::Terrain, size, x, y) {
                    covered.insert(cell);
                }
            }
            assert_eq!(
                covered.len(),
                (size * size) as usize,
                "{kind} leaves cells uncovered"
            );
        }
    }

    #[test]
    fn team_half_is_exactly_half_for_two_fold_kinds() {
        let size = 8;
        for team in [Symmetry::X, Symmetry::Z, Symmetry::Point2] {
            let settings = SymmetrySettings::new(Symmetry::Point2, team, Symmetry::Point2).unwrap();
            let count = (0..size)
                .flat_map(|x| (0..size).map(move |y| (x, y)))
                .filter(|&(x, y)| in_team_half(&settings, size, x, y))
                .count();
            assert_eq!(count, 32, "team kind {team}");
        }
    }

    #[test]
    fn half_plane_splits_grid_evenly() {
        let size = 8;
        let inside = (0..size)
            .flat_map(|x| (0..size).map(move |y| (x as f32, y as f32)))
            .filter(|&(x, y)| in_half(size, x, y, 0.0))
            .count();
        let outside = (0..size)
            .flat_map(|x| (0..size).map(move |y| (x as f32, y as f32)))
            .filter(|&(x, y)| in_half(size, x, y, 180.0))
            .count();
        assert_eq!(inside + outside, 64);
    }
}
