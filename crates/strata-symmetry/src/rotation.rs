//! Orientation-angle mirroring: map a unit/spawn facing through a
//! symmetry group so each placed copy faces the correct way.

use crate::kind::Symmetry;
use crate::settings::{SymmetryScope, SymmetrySettings};
use smallvec::{smallvec, SmallVec};
use std::f32::consts::PI;

/// The facings of the symmetric copies of an object with heading
/// `angle` (radians), one entry per image of
/// [`crate::symmetric_images`], in the same order.
///
/// Mirror axes use arctangent reflection formulas; rotational groups
/// add whole-group increments of `2π/N`.
pub fn symmetric_rotations(
    settings: &SymmetrySettings,
    scope: SymmetryScope,
    angle: f32,
) -> SmallVec<[f32; 4]> {
    let x_rotation = (-angle.sin()).atan2(angle.cos());
    let z_rotation = (-angle.cos()).atan2(angle.sin());
    let diag_rotation = (-angle.cos()).atan2(-angle.sin());
    match settings.kind(scope) {
        Symmetry::None => SmallVec::new(),
        Symmetry::X => smallvec![x_rotation],
        Symmetry::Z => smallvec![z_rotation],
        Symmetry::Diagonal | Symmetry::AntiDiagonal => smallvec![diag_rotation],
        Symmetry::Point2 => smallvec![angle + PI],
        Symmetry::Point4 => smallvec![angle + PI, angle + PI / 2.0, angle - PI / 2.0],
        kind @ (Symmetry::Point6
        | Symmetry::Point8
        | Symmetry::Point10
        | Symmetry::Point12
        | Symmetry::Point14
        | Symmetry::Point16) => {
            let n = kind.num_symmetric_points();
            (1..n)
                .map(|i| angle + 2.0 * PI * i as f32 / n as f32)
                .collect()
        }
        Symmetry::Quad => {
            if settings.team() == Symmetry::Z {
                smallvec![z_rotation, x_rotation, angle + PI]
            } else {
                smallvec![x_rotation, z_rotation, angle + PI]
            }
        }
        Symmetry::Diag => smallvec![diag_rotation, diag_rotation, angle + PI],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(a: f32) -> f32 {
        a.rem_euclid(2.0 * PI)
    }

    #[test]
    fn point2_adds_half_turn() {
        let settings = SymmetrySettings::uniform(Symmetry::Point2);
        let rots = symmetric_rotations(&settings, SymmetryScope::Spawn, 0.3);
        assert_eq!(rots.len(), 1);
        assert!((norm(rots[0]) - norm(0.3 + PI)).abs() < 1e-6);
    }

    #[test]
    fn point_groups_emit_full_orbit() {
        let settings = SymmetrySettings::uniform(Symmetry::Point8);
        let rots = symmetric_rotations(&settings, SymmetryScope::Spawn, 0.0);
        assert_eq!(rots.len(), 7);
        assert!((norm(rots[0]) - norm(2.0 * PI / 8.0)).abs() < 1e-5);
    }

    #[test]
    fn x_mirror_reflects_heading() {
        let settings = SymmetrySettings::uniform(Symmetry::X);
        // A heading along +x reflects to -x under the X mirror.
        let rots = symmetric_rotations(&settings, SymmetryScope::Spawn, 0.0);
        assert_eq!(rots.len(), 1);
        assert!((norm(rots[0])).abs() < 1e-6);
        let rots = symmetric_rotations(&settings, SymmetryScope::Spawn, PI / 2.0);
        assert!((norm(rots[0]) - norm(-PI / 2.0)).abs() < 1e-5);
    }

    #[test]
    fn image_count_matches_group_order() {
        for kind in [Symmetry::Point4, Symmetry::Quad, Symmetry::Diag] {
            let settings = SymmetrySettings::uniform(kind);
            let rots = symmetric_rotations(&settings, SymmetryScope::Spawn, 1.0);
            assert_eq!(rots.len() as u32, kind.num_symmetric_points() - 1);
        }
    }
}
