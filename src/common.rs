//! Shot outcomes and the typed errors of the rules engine.
//!
//! Expected game situations are ordinary values, never panics: a refused
//! placement, a re-aimed cell, a shot outside the playing phase or an undo
//! on empty history all come back as variants the caller can match on, and
//! the refused operation leaves the game untouched.

use core::fmt;

use crate::ship::ShipClass;
use crate::team::TeamId;

/// Result of resolving one shot against one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// The cell was aimed at before. Nothing changed, zero points.
    Already,
    /// Open water.
    Miss,
    /// Ship segment hit, worth one point. Carries the class of a ship this
    /// hit finished off, if any.
    Hit { sunk: Option<ShipClass> },
}

impl ShotOutcome {
    /// Points the shooter earns from this outcome.
    pub fn points(self) -> u32 {
        match self {
            ShotOutcome::Hit { .. } => 1,
            ShotOutcome::Already | ShotOutcome::Miss => 0,
        }
    }

    pub fn is_hit(self) -> bool {
        matches!(self, ShotOutcome::Hit { .. })
    }

    /// Class of the ship this outcome sank, if any.
    pub fn sunk(self) -> Option<ShipClass> {
        match self {
            ShotOutcome::Hit { sunk } => sunk,
            _ => None,
        }
    }
}

/// Why a ship could not be placed, moved or generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// The run leaves the grid.
    OutOfBounds,
    /// The run crosses a cell another ship occupies.
    Overlap,
    /// Contact is disallowed and a surrounding cell holds a ship.
    Contact,
    /// The grid already holds a ship of this class.
    DuplicateClass,
    /// No ship of this class on the grid.
    NoSuchShip,
    /// Random placement gave up after the configured attempt cap.
    Exhausted { class: ShipClass, attempts: u32 },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds => write!(f, "ship does not fit on the grid"),
            PlacementError::Overlap => write!(f, "ship overlaps another ship"),
            PlacementError::Contact => write!(f, "ship touches another ship and contact is off"),
            PlacementError::DuplicateClass => write!(f, "grid already has a ship of this class"),
            PlacementError::NoSuchShip => write!(f, "no ship of this class on the grid"),
            PlacementError::Exhausted { class, attempts } => {
                write!(f, "no legal spot for the {} after {} attempts", class, attempts)
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Why the orchestrator refused an operation. Every variant is a
/// recoverable no-op; the game state did not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameError {
    /// The operation only makes sense during preparation.
    NotInPreparation,
    /// The operation only makes sense while the game is being played.
    NotPlaying,
    /// A shot arrived while an end-of-game finalization is pending.
    EndPending,
    /// This team's grid is missing ships, so play cannot start.
    FleetIncomplete(TeamId),
    /// The team is not part of this match.
    UnknownTeam(TeamId),
    /// A match needs two to four distinct teams.
    InvalidRoster,
    /// A placement operation failed; carries the grid-level reason.
    Placement(PlacementError),
}

impl From<PlacementError> for GameError {
    fn from(err: PlacementError) -> Self {
        GameError::Placement(err)
    }
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::NotInPreparation => write!(f, "only possible during preparation"),
            GameError::NotPlaying => write!(f, "the game is not being played"),
            GameError::EndPending => write!(f, "the game is about to end; no more shots"),
            GameError::FleetIncomplete(team) => {
                write!(f, "team {} has not placed its whole fleet", team)
            }
            GameError::UnknownTeam(team) => write!(f, "team {} is not in this match", team),
            GameError::InvalidRoster => write!(f, "a match needs 2 to 4 distinct teams"),
            GameError::Placement(err) => write!(f, "placement failed: {}", err),
        }
    }
}

impl std::error::Error for GameError {}
