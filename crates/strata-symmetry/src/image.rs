//! Symmetric-image computation: map one location to all of its copies
//! under a configured symmetry group.
//!
//! Two entry points: [`symmetric_images`] works in continuous
//! coordinates and is the placement API (spawns, resources, props);
//! [`symmetric_cells`] works on integer grid cells and applies the
//! drop rule for rotational images that miss the lattice.

use crate::kind::Symmetry;
use crate::settings::{SymmetryScope, SymmetrySettings};
use smallvec::{smallvec, SmallVec};

/// Tolerance for treating a rotated coordinate as landing on an
/// integer grid cell.
const INTEGRAL_EPS: f32 = 1e-3;

/// One symmetric copy of a location, tagged with the individual
/// symmetry that produced it.
///
/// The tag matters for composite groups: [`Symmetry::Quad`] and
/// [`Symmetry::Diag`] produce images under different single axes, and
/// orientation mirroring needs to know which. Produced on demand,
/// never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SymmetryImage {
    /// Image x coordinate.
    pub x: f32,
    /// Image y coordinate.
    pub y: f32,
    /// The individual symmetry that maps the source to this image.
    pub source: Symmetry,
}

impl SymmetryImage {
    fn new(x: f32, y: f32, source: Symmetry) -> Self {
        Self { x, y, source }
    }
}

/// Rotate `(x, y)` about the grid center by `angle` radians.
fn rotate_about_center(size: u32, x: f32, y: f32, angle: f32) -> (f32, f32) {
    let c = size as f32 / 2.0;
    let (sin, cos) = angle.sin_cos();
    let nx = (x - c) * cos - (y - c) * sin + c;
    let ny = (x - c) * sin + (y - c) * cos + c;
    (nx, ny)
}

fn in_bounds(size: u32, x: i64, y: i64) -> bool {
    x >= 0 && x < size as i64 && y >= 0 && y < size as i64
}

/// The ordered symmetric images of a continuous location `(x, y)`
/// under the kind governing `scope`, the location itself excluded.
///
/// Empty for [`Symmetry::None`]. Rotational images (order six and up)
/// whose truncated coordinates fall outside the grid are silently
/// dropped; the geometry is approximate for those groups.
pub fn symmetric_images(
    settings: &SymmetrySettings,
    scope: SymmetryScope,
    size: u32,
    x: f32,
    y: f32,
) -> SmallVec<[SymmetryImage; 4]> {
    let s1 = (size - 1) as f32;
    match settings.kind(scope) {
        Symmetry::None => SmallVec::new(),
        Symmetry::X => smallvec![SymmetryImage::new(s1 - x, y, Symmetry::X)],
        Symmetry::Z => smallvec![SymmetryImage::new(x, s1 - y, Symmetry::Z)],
        Symmetry::Diagonal => smallvec![SymmetryImage::new(y, x, Symmetry::Diagonal)],
        Symmetry::AntiDiagonal => {
            smallvec![SymmetryImage::new(s1 - y, s1 - x, Symmetry::AntiDiagonal)]
        }
        Symmetry::Point2 => smallvec![SymmetryImage::new(s1 - x, s1 - y, Symmetry::Point2)],
        Symmetry::Point4 => smallvec![
            SymmetryImage::new(s1 - x, s1 - y, Symmetry::Point2),
            SymmetryImage::new(y, s1 - x, Symmetry::Point2),
            SymmetryImage::new(s1 - y, x, Symmetry::Point2),
        ],
        kind @ (Symmetry::Point6
        | Symmetry::Point8
        | Symmetry::Point10
        | Symmetry::Point12
        | Symmetry::Point14
        | Symmetry::Point16) => {
            let n = kind.num_symmetric_points();
            let mut images: SmallVec<[SymmetryImage; 4]> =
                smallvec![SymmetryImage::new(s1 - x, s1 - y, Symmetry::Point2)];
            for i in 1..n / 2 {
                let angle = 2.0 * std::f32::consts::PI * i as f32 / n as f32;
                for half_turn in [0.0, std::f32::consts::PI] {
                    let (nx, ny) = rotate_about_center(size, x, y, angle + half_turn);
                    if in_bounds(size, nx as i64, ny as i64) {
                        images.push(SymmetryImage::new(nx, ny, Symmetry::Point2));
                    }
                }
            }
            images
        }
        Symmetry::Quad => {
            if settings.team() == Symmetry::Z {
                smallvec![
                    SymmetryImage::new(x, s1 - y, Symmetry::Z),
                    SymmetryImage::new(s1 - x, y, Symmetry::X),
                    SymmetryImage::new(s1 - x, s1 - y, Symmetry::Z),
                ]
            } else {
                smallvec![
                    SymmetryImage::new(s1 - x, y, Symmetry::X),
                    SymmetryImage::new(x, s1 - y, Symmetry::Z),
                    SymmetryImage::new(s1 - x, s1 - y, Symmetry::X),
                ]
            }
        }
        Symmetry::Diag => {
            if settings.team() == Symmetry::AntiDiagonal {
                smallvec![
                    SymmetryImage::new(s1 - y, s1 - x, Symmetry::AntiDiagonal),
                    SymmetryImage::new(y, x, Symmetry::Diagonal),
                    SymmetryImage::new(s1 - x, s1 - y, Symmetry::AntiDiagonal),
                ]
            } else {
                smallvec![
                    SymmetryImage::new(y, x, Symmetry::Diagonal),
                    SymmetryImage::new(s1 - y, s1 - x, Symmetry::AntiDiagonal),
                    SymmetryImage::new(s1 - x, s1 - y, Symmetry::Diagonal),
                ]
            }
        }
    }
}

/// The ordered symmetric images of the integer cell `(x, y)`, the cell
/// itself excluded.
///
/// Exact groups map integer cells to integer cells by construction.
/// For rotational groups of order six and up, a computed image is kept
/// only if both coordinates land on the lattice within a small
/// tolerance and the rounded cell is in range; everything else is
/// silently dropped and later closed by interpolation.
///
/// # Panics
///
/// Panics if `(x, y)` is outside `[0, size)`.
pub fn symmetric_cells(
    settings: &SymmetrySettings,
    scope: SymmetryScope,
    size: u32,
    x: u32,
    y: u32,
) -> SmallVec<[(u32, u32); 4]> {
    assert!(
        x < size && y < size,
        "cell ({x}, {y}) out of bounds for size {size}"
    );
    let kind = settings.kind(scope);
    match kind.rotation_order() {
        Some(n) if n >= 6 => {
            let s1 = size - 1;
            let mut cells: SmallVec<[(u32, u32); 4]> = smallvec![(s1 - x, s1 - y)];
            for i in 1..n / 2 {
                let angle = 2.0 * std::f32::consts::PI * i as f32 / n as f32;
                for half_turn in [0.0, std::f32::consts::PI] {
                    let (nx, ny) =
                        rotate_about_center(size, x as f32, y as f32, angle + half_turn);
                    if (nx - nx.round()).abs() > INTEGRAL_EPS
                        || (ny - ny.round()).abs() > INTEGRAL_EPS
                    {
                        continue;
                    }
                    let (cx, cy) = (nx.round() as i64, ny.round() as i64);
                    if in_bounds(size, cx, cy) {
                        cells.push((cx as u32, cy as u32));
                    }
                }
            }
            cells
        }
        _ => symmetric_images(settings, scope, size, x as f32, y as f32)
            .into_iter()
            .map(|img| (img.x as u32, img.y as u32))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(kind: Symmetry) -> SymmetrySettings {
        SymmetrySettings::uniform(kind)
    }

    const SCOPE: SymmetryScope = SymmetryScope::Terrain;

    #[test]
    fn none_has_no_images() {
        assert!(symmetric_cells(&uniform(Symmetry::None), SCOPE, 8, 3, 5).is_empty());
    }

    #[test]
    fn mirror_formulas() {
        let size = 8;
        let (x, y) = (1, 3);
        assert_eq!(
            symmetric_cells(&uniform(Symmetry::X), SCOPE, size, x, y).as_slice(),
            &[(6, 3)]
        );
        assert_eq!(
            symmetric_cells(&uniform(Symmetry::Z), SCOPE, size, x, y).as_slice(),
            &[(1, 4)]
        );
        assert_eq!(
            symmetric_cells(&uniform(Symmetry::Diagonal), SCOPE, size, x, y).as_slice(),
            &[(3, 1)]
        );
        assert_eq!(
            symmetric_cells(&uniform(Symmetry::AntiDiagonal), SCOPE, size, x, y).as_slice(),
            &[(4, 6)]
        );
    }

    #[test]
    fn point2_is_point_reflection() {
        assert_eq!(
            symmetric_cells(&uniform(Symmetry::Point2), SCOPE, 4, 0, 0).as_slice(),
            &[(3, 3)]
        );
    }

    #[test]
    fn point4_produces_three_images() {
        let cells = symmetric_cells(&uniform(Symmetry::Point4), SCOPE, 8, 1, 2);
        assert_eq!(cells.as_slice(), &[(6, 5), (2, 6), (5, 1)]);
    }

    #[test]
    fn point6_drops_off_lattice_images() {
        // (0, 0) rotated by multiples of 60 degrees about (4, 4) never
        // lands on the lattice; only the exact point reflection remains.
        let cells = symmetric_cells(&uniform(Symmetry::Point6), SCOPE, 8, 0, 0);
        assert_eq!(cells.as_slice(), &[(7, 7)]);
    }

    #[test]
    fn point6_keeps_fractional_images_in_continuous_space() {
        // The placement API keeps in-bounds fractional images.
        let images = symmetric_images(&uniform(Symmetry::Point6), SCOPE, 8, 2.0, 4.0);
        assert!(images.len() > 1);
        assert!(images
            .iter()
            .all(|img| img.x >= 0.0 && img.x < 8.0 && img.y >= 0.0 && img.y < 8.0));
    }

    #[test]
    fn quad_ordering_follows_team_axis() {
        let z_first =
            SymmetrySettings::new(Symmetry::Quad, Symmetry::Z, Symmetry::Quad).unwrap();
        let x_first =
            SymmetrySettings::new(Symmetry::Quad, Symmetry::X, Symmetry::Quad).unwrap();
        let a = symmetric_cells(&z_first, SCOPE, 8, 1, 2);
        let b = symmetric_cells(&x_first, SCOPE, 8, 1, 2);
        // Same coverage, different iteration order.
        assert_eq!(a.as_slice(), &[(1, 5), (6, 2), (6, 5)]);
        assert_eq!(b.as_slice(), &[(6, 2), (1, 5), (6, 5)]);
    }

    #[test]
    fn diag_images_cover_both_diagonals() {
        let cells = symmetric_cells(&uniform(Symmetry::Diag), SCOPE, 8, 1, 2);
        assert_eq!(cells.as_slice(), &[(2, 1), (5, 6), (6, 5)]);
    }
}
