//! Region fills: write a constant into a geometric region, then
//! re-propagate the terrain symmetry.

use strata_core::Element;
use strata_symmetry::SymmetryScope;

use crate::mask::Mask;

impl<T: Element> Mask<T> {
    /// Fill the disk of `radius` around `(cx, cy)` with `value`.
    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, value: T) -> &mut Self {
        let size = self.size() as i64;
        let r = radius.ceil() as i64;
        let (cxi, cyi) = (cx.floor() as i64, cy.floor() as i64);
        let r2 = radius * radius;
        for x in (cxi - r).max(0)..=(cxi + r).min(size - 1) {
            for y in (cyi - r).max(0)..=(cyi + r).min(size - 1) {
                let (dx, dy) = (x as f32 - cx, y as f32 - cy);
                if dx * dx + dy * dy <= r2 {
                    self.set(x as u32, y as u32, value);
                }
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Fill the axis-aligned rectangle at `(x, y)` with the given
    /// extent, clipped to the grid.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, value: T) -> &mut Self {
        let size = self.size();
        for px in x..(x + width).min(size) {
            for py in y..(y + height).min(size) {
                self.set(px, py, value);
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Fill a sheared rectangle: row `py` shifts by `x_slope * py`,
    /// column `px` shifts by `y_slope * px`. Cells falling outside the
    /// grid are skipped.
    pub fn fill_parallelogram(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        x_slope: i32,
        y_slope: i32,
        value: T,
    ) -> &mut Self {
        for px in 0..width {
            for py in 0..height {
                let cx = x + px + py * x_slope;
                let cy = y + py + px * y_slope;
                if cx >= 0 && cy >= 0 && self.in_bounds(cx as u32, cy as u32) {
                    self.set(cx as u32, cy as u32, value);
                }
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Fill a rim of `rim_width` cells along all four edges.
    pub fn fill_edge(&mut self, rim_width: u32, value: T) -> &mut Self {
        let size = self.size();
        let w = rim_width.min(size);
        for x in 0..size {
            for y in 0..size {
                if x < w || y < w || x >= size - w || y >= size - w {
                    self.set(x, y, value);
                }
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }

    /// Fill the centered square of side `extent`.
    pub fn fill_center(&mut self, extent: u32, value: T) -> &mut Self {
        let size = self.size();
        let extent = extent.min(size);
        let offset = (size - extent) / 2;
        for x in offset..offset + extent {
            for y in offset..offset + extent {
                self.set(x, y, value);
            }
        }
        self.apply_symmetry(SymmetryScope::Terrain);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::BitMask;
    use std::sync::Arc;
    use strata_symmetry::{Symmetry, SymmetrySettings};

    fn mask(kind: Symmetry) -> BitMask {
        Mask::new(8, None, Arc::new(SymmetrySettings::uniform(kind)))
    }

    #[test]
    fn circle_fill_is_propagated() {
        let mut m = mask(Symmetry::Point2);
        m.fill_circle(1.0, 1.0, 1.0, true);
        // The mirrored circle appears around (6, 6).
        assert!(m.get(1, 1));
        assert!(m.get(6, 6));
    }

    #[test]
    fn rect_fill_clips_to_grid() {
        let mut m = mask(Symmetry::None);
        m.fill_rect(6, 6, 4, 4, true);
        assert!(m.get(7, 7));
        assert_eq!(
            (0..8).flat_map(|x| (0..8).map(move |y| (x, y)))
                .filter(|&(x, y)| m.get(x, y))
                .count(),
            4
        );
    }

    #[test]
    fn edge_fill_leaves_interior() {
        let mut m = mask(Symmetry::None);
        m.fill_edge(1, true);
        assert!(m.get(0, 3));
        assert!(m.get(7, 7));
        assert!(!m.get(3, 3));
    }

    #[test]
    fn center_fill_is_centered() {
        let mut m = mask(Symmetry::None);
        m.fill_center(2, true);
        assert!(m.get(3, 3) && m.get(4, 4));
        assert!(!m.get(2, 3) && !m.get(5, 5));
    }

    #[test]
    fn parallelogram_shears_rows() {
        let mut m = mask(Symmetry::None);
        m.fill_parallelogram(0, 0, 2, 2, 1, 0, true);
        assert!(m.get(0, 0) && m.get(1, 0));
        assert!(m.get(1, 1) && m.get(2, 1));
        assert!(!m.get(0, 1));
    }
}
