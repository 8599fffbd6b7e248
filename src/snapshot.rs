//! The persisted state image: a full, field-name-stable JSON rendition of
//! the game, written to the shared slot after every mutation and reloaded
//! wholesale by display surfaces.
//!
//! Loading is a complete replace, never a merge. The only values not taken
//! at face value are the sunk flags, which are recomputed from each grid's
//! hit list, and missing cells, which fall back to untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::common::ShotOutcome;
use crate::coord::Coord;
use crate::game::{Game, GridShot, Phase, Settings, ShotRecord};
use crate::grid::{Cell, Grid};
use crate::ship::{Orientation, Ship, ShipClass};
use crate::team::{Team, TeamId};

/// One ship as persisted. `size` repeats what the class implies; display
/// consumers read it without knowing hull classes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipSnapshot {
    #[serde(rename = "type")]
    pub class: ShipClass,
    pub size: usize,
    pub orientation: Orientation,
    pub positions: Vec<Coord>,
    pub is_sunk: bool,
}

impl From<&Ship> for ShipSnapshot {
    fn from(ship: &Ship) -> ShipSnapshot {
        ShipSnapshot {
            class: ship.class(),
            size: ship.class().size(),
            orientation: ship.orientation(),
            positions: ship.positions().to_vec(),
            is_sunk: ship.is_sunk(),
        }
    }
}

impl From<&ShipSnapshot> for Ship {
    fn from(snap: &ShipSnapshot) -> Ship {
        Ship::from_parts(
            snap.class,
            snap.orientation,
            snap.positions.clone(),
            snap.is_sunk,
        )
    }
}

/// One grid as persisted, keyed from outside by its team id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSnapshot {
    pub cells: BTreeMap<Coord, Cell>,
    pub ships: Vec<ShipSnapshot>,
    pub hit_positions: Vec<Coord>,
}

impl From<&Grid> for GridSnapshot {
    fn from(grid: &Grid) -> GridSnapshot {
        GridSnapshot {
            cells: grid.cells().clone(),
            ships: grid.ships().iter().map(ShipSnapshot::from).collect(),
            hit_positions: grid.hit_positions().to_vec(),
        }
    }
}

impl GridSnapshot {
    fn into_grid(self, team: TeamId) -> Grid {
        let ships = self.ships.iter().map(Ship::from).collect();
        Grid::from_parts(team, &self.cells, ships, self.hit_positions)
    }
}

/// Per-grid outcome tag inside a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShotResult {
    Already,
    Hit,
    Miss,
}

/// Per-grid outcome inside a history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridShotSnapshot {
    pub grid_id: TeamId,
    pub result: ShotResult,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunk_ship: Option<ShipClass>,
}

impl From<&GridShot> for GridShotSnapshot {
    fn from(shot: &GridShot) -> GridShotSnapshot {
        let (result, sunk_ship) = match shot.outcome {
            ShotOutcome::Already => (ShotResult::Already, None),
            ShotOutcome::Miss => (ShotResult::Miss, None),
            ShotOutcome::Hit { sunk } => (ShotResult::Hit, sunk),
        };
        GridShotSnapshot {
            grid_id: shot.grid,
            result,
            points: shot.outcome.points(),
            sunk_ship,
        }
    }
}

impl From<&GridShotSnapshot> for GridShot {
    fn from(snap: &GridShotSnapshot) -> GridShot {
        let outcome = match snap.result {
            ShotResult::Already => ShotOutcome::Already,
            ShotResult::Miss => ShotOutcome::Miss,
            ShotResult::Hit => ShotOutcome::Hit {
                sunk: snap.sunk_ship,
            },
        };
        GridShot {
            grid: snap.grid_id,
            outcome,
        }
    }
}

/// One shot-history entry as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShotRecordSnapshot {
    pub team_id: TeamId,
    pub coord: Coord,
    pub results: Vec<GridShotSnapshot>,
    pub points_gained: u32,
    pub timestamp: u64,
}

impl From<&ShotRecord> for ShotRecordSnapshot {
    fn from(record: &ShotRecord) -> ShotRecordSnapshot {
        ShotRecordSnapshot {
            team_id: record.team,
            coord: record.coord,
            results: record.results.iter().map(GridShotSnapshot::from).collect(),
            points_gained: record.points_gained,
            timestamp: record.timestamp,
        }
    }
}

impl From<&ShotRecordSnapshot> for ShotRecord {
    fn from(snap: &ShotRecordSnapshot) -> ShotRecord {
        ShotRecord {
            team: snap.team_id,
            coord: snap.coord,
            results: snap.results.iter().map(GridShot::from).collect(),
            points_gained: snap.points_gained,
            timestamp: snap.timestamp,
        }
    }
}

/// The authoritative state image. Field names are the wire contract; every
/// console and display instance reads and writes this exact shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub teams: Vec<Team>,
    pub grids: BTreeMap<TeamId, GridSnapshot>,
    pub current_team: TeamId,
    #[serde(rename = "gameState")]
    pub phase: Phase,
    pub shot_history: Vec<ShotRecordSnapshot>,
    pub settings: Settings,
    pub last_update: u64,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> GameSnapshot {
        GameSnapshot {
            teams: game.teams().to_vec(),
            grids: game
                .grids()
                .map(|g| (g.team(), GridSnapshot::from(g)))
                .collect(),
            current_team: game.current_team(),
            phase: game.phase(),
            shot_history: game.history().iter().map(ShotRecordSnapshot::from).collect(),
            settings: game.settings(),
            last_update: game.last_update(),
        }
    }
}

impl From<GameSnapshot> for Game {
    fn from(snap: GameSnapshot) -> Game {
        let grids = snap
            .grids
            .into_iter()
            .map(|(id, g)| (id, g.into_grid(id)))
            .collect();
        let shot_history = snap.shot_history.iter().map(ShotRecord::from).collect();
        Game::from_parts(
            snap.teams,
            grids,
            snap.current_team,
            snap.phase,
            shot_history,
            snap.settings,
            snap.last_update,
        )
    }
}

impl Game {
    /// Full state image for persistence or a display surface.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(self)
    }

    /// Rebuild a game from a persisted image, replacing nothing by parts:
    /// the caller drops its old state and adopts this one whole.
    pub fn from_snapshot(snap: GameSnapshot) -> Game {
        Game::from(snap)
    }
}
