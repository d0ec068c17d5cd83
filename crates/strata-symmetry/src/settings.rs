//! Per-run symmetry configuration: [`SymmetrySettings`] and
//! [`SymmetryScope`].

use crate::kind::Symmetry;
use std::error::Error;
use std::fmt;

/// Selects which of the three configured symmetry kinds governs an
/// operation.
///
/// Terrain shaping, team-fairness layout, and spawn placement can each
/// run under a different group; every mask operation names the scope it
/// re-establishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymmetryScope {
    /// Governs spawn-point placement and whole-map replication.
    Spawn,
    /// Governs team-fairness layout (always a 2-fold group).
    Team,
    /// Governs terrain shape.
    Terrain,
}

/// Errors from symmetry configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymmetryError {
    /// The team kind must mirror the map into exactly two halves.
    TeamSymmetryNotTwoFold {
        /// The rejected team kind.
        team: Symmetry,
    },
}

impl fmt::Display for SymmetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TeamSymmetryNotTwoFold { team } => {
                write!(f, "team symmetry must be a 2-fold group, got {team}")
            }
        }
    }
}

impl Error for SymmetryError {}

/// The immutable symmetry triple bound to one logical map space.
///
/// Constructed once per run and shared by reference (`Arc`) by every
/// mask built over the same space. Never mutated after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymmetrySettings {
    spawn: Symmetry,
    team: Symmetry,
    terrain: Symmetry,
}

impl SymmetrySettings {
    /// Create a settings triple, validating the group constraints.
    ///
    /// # Errors
    ///
    /// [`SymmetryError::TeamSymmetryNotTwoFold`] if `team` is neither
    /// [`Symmetry::None`] nor a group with exactly two symmetric points.
    pub fn new(
        spawn: Symmetry,
        team: Symmetry,
        terrain: Symmetry,
    ) -> Result<Self, SymmetryError> {
        if team != Symmetry::None && team.num_symmetric_points() != 2 {
            return Err(SymmetryError::TeamSymmetryNotTwoFold { team });
        }
        Ok(Self {
            spawn,
            team,
            terrain,
        })
    }

    /// Shorthand for the common case of one group governing all three
    /// scopes. The team slot falls back to [`Symmetry::Point2`] when the
    /// shared kind is not 2-fold.
    pub fn uniform(kind: Symmetry) -> Self {
        let team = if kind == Symmetry::None || kind.num_symmetric_points() == 2 {
            kind
        } else {
            Symmetry::Point2
        };
        Self {
            spawn: kind,
            team,
            terrain: kind,
        }
    }

    /// The kind governing the given scope.
    pub fn kind(&self, scope: SymmetryScope) -> Symmetry {
        match scope {
            SymmetryScope::Spawn => self.spawn,
            SymmetryScope::Team => self.team,
            SymmetryScope::Terrain => self.terrain,
        }
    }

    /// The spawn-placement kind.
    pub fn spawn(&self) -> Symmetry {
        self.spawn
    }

    /// The team-layout kind.
    pub fn team(&self) -> Symmetry {
        self.team
    }

    /// The terrain-shape kind.
    pub fn terrain(&self) -> Symmetry {
        self.terrain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_two_fold_team() {
        for team in [
            Symmetry::None,
            Symmetry::X,
            Symmetry::Z,
            Symmetry::Diagonal,
            Symmetry::AntiDiagonal,
            Symmetry::Point2,
        ] {
            assert!(SymmetrySettings::new(Symmetry::Point2, team, Symmetry::Point2).is_ok());
        }
    }

    #[test]
    fn rejects_wide_team_group() {
        let err = SymmetrySettings::new(Symmetry::Point4, Symmetry::Point4, Symmetry::Point4)
            .unwrap_err();
        assert_eq!(
            err,
            SymmetryError::TeamSymmetryNotTwoFold {
                team: Symmetry::Point4
            }
        );
    }

    #[test]
    fn uniform_falls_back_to_point2_team() {
        let settings = SymmetrySettings::uniform(Symmetry::Point4);
        assert_eq!(settings.spawn(), Symmetry::Point4);
        assert_eq!(settings.team(), Symmetry::Point2);
        assert_eq!(settings.terrain(), Symmetry::Point4);
    }

    #[test]
    fn scope_lookup() {
        let settings =
            SymmetrySettings::new(Symmetry::Point2, Symmetry::Z, Symmetry::Quad).unwrap();
        assert_eq!(settings.kind(SymmetryScope::Spawn), Symmetry::Point2);
        assert_eq!(settings.kind(SymmetryScope::Team), Symmetry::Z);
        assert_eq!(settings.kind(SymmetryScope::Terrain), Symmetry::Quad);
    }
}
