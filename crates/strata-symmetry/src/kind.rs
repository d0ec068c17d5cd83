//! The [`Symmetry`] enum: the closed set of supported symmetry groups.

use std::fmt;

/// A geometric symmetry group a grid can be held invariant under.
///
/// Mirror axes reflect one coordinate. `PointN` groups rotate about the
/// grid center in multiples of `360°/N`. The composite team groups
/// [`Symmetry::Quad`] and [`Symmetry::Diag`] are unions of two single-axis
/// mirrors and their composition, producing four symmetric copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symmetry {
    /// No symmetry: every cell is its own only image.
    None,
    /// Mirror across the vertical axis: `(x, y) → (S-1-x, y)`.
    X,
    /// Mirror across the horizontal axis: `(x, y) → (x, S-1-y)`.
    Z,
    /// Mirror across the main diagonal: `(x, y) → (y, x)`.
    Diagonal,
    /// Mirror across the anti-diagonal: `(x, y) → (S-1-y, S-1-x)`.
    AntiDiagonal,
    /// 2-fold rotation (point reflection through the center).
    Point2,
    /// 4-fold rotation.
    Point4,
    /// 6-fold rotation (approximate; gaps are interpolated).
    Point6,
    /// 8-fold rotation (approximate; gaps are interpolated).
    Point8,
    /// 10-fold rotation (approximate; gaps are interpolated).
    Point10,
    /// 12-fold rotation (approximate; gaps are interpolated).
    Point12,
    /// 14-fold rotation (approximate; gaps are interpolated).
    Point14,
    /// 16-fold rotation (approximate; gaps are interpolated).
    Point16,
    /// Four copies via the X and Z mirrors and their composition,
    /// ordered by the team axis.
    Quad,
    /// Four copies via the two diagonal mirrors and their composition,
    /// ordered by the team axis.
    Diag,
}

impl Symmetry {
    /// Number of symmetric copies of a generic cell under this group,
    /// the cell itself included.
    pub fn num_symmetric_points(self) -> u32 {
        match self {
            Self::None => 1,
            Self::X | Self::Z | Self::Diagonal | Self::AntiDiagonal | Self::Point2 => 2,
            Self::Point4 | Self::Quad | Self::Diag => 4,
            Self::Point6 => 6,
            Self::Point8 => 8,
            Self::Point10 => 10,
            Self::Point12 => 12,
            Self::Point14 => 14,
            Self::Point16 => 16,
        }
    }

    /// Whether every image of an integer cell lands exactly on an
    /// integer cell.
    ///
    /// Exact groups need no interpolation after propagation. Rotational
    /// groups of order six and above produce fractional image
    /// coordinates and rely on the interpolation pass to fill the cells
    /// their canonical region never reaches.
    pub fn is_exact(self) -> bool {
        !matches!(
            self,
            Self::Point6 | Self::Point8 | Self::Point10 | Self::Point12 | Self::Point14 | Self::Point16
        )
    }

    /// The rotation order `N` for `PointN` groups, `None` otherwise.
    pub fn rotation_order(self) -> Option<u32> {
        match self {
            Self::Point2 => Some(2),
            Self::Point4 => Some(4),
            Self::Point6 => Some(6),
            Self::Point8 => Some(8),
            Self::Point10 => Some(10),
            Self::Point12 => Some(12),
            Self::Point14 => Some(14),
            Self::Point16 => Some(16),
            _ => None,
        }
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::X => "x",
            Self::Z => "z",
            Self::Diagonal => "diagonal",
            Self::AntiDiagonal => "anti-diagonal",
            Self::Point2 => "point2",
            Self::Point4 => "point4",
            Self::Point6 => "point6",
            Self::Point8 => "point8",
            Self::Point10 => "point10",
            Self::Point12 => "point12",
            Self::Point14 => "point14",
            Self::Point16 => "point16",
            Self::Quad => "quad",
            Self::Diag => "diag",
        };
        f.write_str(name)
    }
}

/// All supported symmetry kinds, in declaration order. Handy for tests
/// and exhaustive validation sweeps.
pub const ALL_KINDS: [Symmetry; 15] = [
    Symmetry::None,
    Symmetry::X,
    Symmetry::Z,
    Symmetry::Diagonal,
    Symmetry::AntiDiagonal,
    Symmetry::Point2,
    Symmetry::Point4,
    Symmetry::Point6,
    Symmetry::Point8,
    Symmetry::Point10,
    Symmetry::Point12,
    Symmetry::Point14,
    Symmetry::Point16,
    Symmetry::Quad,
    Symmetry::Diag,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_groups_report_order() {
        assert_eq!(Symmetry::Point2.rotation_order(), Some(2));
        assert_eq!(Symmetry::Point16.rotation_order(), Some(16));
        assert_eq!(Symmetry::Quad.rotation_order(), None);
    }

    #[test]
    fn exactness_splits_at_point6() {
        for kind in ALL_KINDS {
            let expected = !matches!(kind.rotation_order(), Some(n) if n >= 6);
            assert_eq!(kind.is_exact(), expected, "{kind}");
        }
    }

    #[test]
    fn num_points_matches_group_order() {
        assert_eq!(Symmetry::None.num_symmetric_points(), 1);
        assert_eq!(Symmetry::X.num_symmetric_points(), 2);
        assert_eq!(Symmetry::Quad.num_symmetric_points(), 4);
        assert_eq!(Symmetry::Point12.num_symmetric_points(), 12);
    }
}
