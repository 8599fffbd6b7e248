//! One team's 5x5 grid: per-cell shot state, the placed ships and the
//! ordered list of hit coordinates.
//!
//! Placement and shooting are all-or-nothing: any validation failure leaves
//! every cell, ship and list exactly as it was.

use std::collections::BTreeMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::common::{PlacementError, ShotOutcome};
use crate::coord::Coord;
use crate::ship::{Ship, ShipClass};
use crate::team::TeamId;

/// What a cell shows after zero or more shots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellState {
    /// Never resolved.
    Neutral,
    /// Resolved and a ship segment was there.
    Hit,
    /// Resolved as open water.
    Water,
}

/// One grid cell. A grid holds exactly one per coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub contains_ship: bool,
    pub already_aimed: bool,
    pub state: CellState,
}

impl Cell {
    fn untouched() -> Cell {
        Cell {
            contains_ship: false,
            already_aimed: false,
            state: CellState::Neutral,
        }
    }
}

/// One team's board. Mutation happens through placement, [`Grid::shoot`]
/// and [`Grid::undo_shot`]; everything else is read-only access.
#[derive(Debug, Clone)]
pub struct Grid {
    team: TeamId,
    cells: BTreeMap<Coord, Cell>,
    ships: Vec<Ship>,
    hits: Vec<Coord>,
}

impl Grid {
    /// Empty grid with all cells untouched.
    pub fn new(team: TeamId) -> Grid {
        let cells = Coord::all().map(|c| (c, Cell::untouched())).collect();
        Grid {
            team,
            cells,
            ships: Vec::new(),
            hits: Vec::new(),
        }
    }

    /// Rebuild a grid from persisted parts. Stored cells are overlaid on a
    /// fresh grid, so missing entries fall back to untouched; every ship's
    /// sunk flag is recomputed from the hit list rather than trusted.
    pub(crate) fn from_parts(
        team: TeamId,
        stored_cells: &BTreeMap<Coord, Cell>,
        ships: Vec<Ship>,
        hits: Vec<Coord>,
    ) -> Grid {
        let mut grid = Grid::new(team);
        for (&coord, &cell) in stored_cells {
            grid.cells.insert(coord, cell);
        }
        grid.ships = ships;
        grid.hits = hits;
        let Grid { ships, hits, .. } = &mut grid;
        for ship in ships.iter_mut() {
            ship.recompute_sunk(hits);
        }
        grid
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    /// The cell at `coord`. Grids are seeded with every coordinate and no
    /// entry is ever removed.
    pub fn cell(&self, coord: Coord) -> Cell {
        self.cells[&coord]
    }

    pub fn cells(&self) -> &BTreeMap<Coord, Cell> {
        &self.cells
    }

    pub fn ships(&self) -> &[Ship] {
        &self.ships
    }

    /// Hit coordinates in the order they landed.
    pub fn hit_positions(&self) -> &[Coord] {
        &self.hits
    }

    /// The ship of `class`, if placed.
    pub fn ship(&self, class: ShipClass) -> Option<&Ship> {
        self.ships.iter().find(|s| s.class() == class)
    }

    /// The ship covering `coord`, if any.
    pub fn ship_at(&self, coord: Coord) -> Option<&Ship> {
        self.ships.iter().find(|s| s.contains(coord))
    }

    /// All ships sunk. An empty grid counts as eliminated, so callers check
    /// fleet completeness before play starts.
    pub fn is_eliminated(&self) -> bool {
        self.ships.iter().all(|s| s.is_sunk())
    }

    fn cell_mut(&mut self, coord: Coord) -> &mut Cell {
        self.cells
            .get_mut(&coord)
            .expect("grid holds a cell for every coordinate")
    }

    /// Add a ship to the grid. Validates first and marks cells only on
    /// success.
    pub fn place_ship(&mut self, ship: Ship, allow_contact: bool) -> Result<(), PlacementError> {
        self.validate_placement(&ship, allow_contact)?;
        for &pos in ship.positions() {
            self.cell_mut(pos).contains_ship = true;
        }
        debug!(
            "grid {}: {} placed at {} ({:?})",
            self.team,
            ship.class(),
            ship.anchor(),
            ship.orientation()
        );
        self.ships.push(ship);
        Ok(())
    }

    /// Check class uniqueness, overlap and, when contact is disallowed, the
    /// eight-neighbor rule. Bounds are guaranteed by [`Ship::span`].
    pub fn validate_placement(
        &self,
        ship: &Ship,
        allow_contact: bool,
    ) -> Result<(), PlacementError> {
        if self.ship(ship.class()).is_some() {
            return Err(PlacementError::DuplicateClass);
        }
        if ship.positions().iter().any(|p| self.cells[p].contains_ship) {
            return Err(PlacementError::Overlap);
        }
        if !allow_contact {
            for &pos in ship.positions() {
                for n in pos.neighbors() {
                    if self.cells[&n].contains_ship {
                        return Err(PlacementError::Contact);
                    }
                }
            }
        }
        Ok(())
    }

    /// Resolve one shot at `coord`. A re-aimed cell is `Already` and leaves
    /// everything untouched; a hit appends to the hit list and refreshes
    /// the covering ship's sunk flag.
    pub fn shoot(&mut self, coord: Coord) -> ShotOutcome {
        if self.cells[&coord].already_aimed {
            return ShotOutcome::Already;
        }
        let cell = self.cell_mut(coord);
        cell.already_aimed = true;
        if !cell.contains_ship {
            cell.state = CellState::Water;
            return ShotOutcome::Miss;
        }
        cell.state = CellState::Hit;
        self.hits.push(coord);
        let mut sunk = None;
        let hits = &self.hits;
        for ship in self.ships.iter_mut() {
            if ship.contains(coord) && ship.recompute_sunk(hits) {
                sunk = Some(ship.class());
            }
        }
        ShotOutcome::Hit { sunk }
    }

    /// Reverse one resolved shot: the cell returns to unaimed neutral, a
    /// hit leaves the hit list and affected sunk flags are recomputed. An
    /// `Already` outcome resolved nothing, so it reverses to nothing.
    pub fn undo_shot(&mut self, coord: Coord, outcome: ShotOutcome) {
        if outcome == ShotOutcome::Already {
            return;
        }
        let cell = self.cell_mut(coord);
        cell.already_aimed = false;
        cell.state = CellState::Neutral;
        if outcome.is_hit() {
            if let Some(i) = self.hits.iter().position(|&c| c == coord) {
                self.hits.remove(i);
            }
            let hits = &self.hits;
            for ship in self.ships.iter_mut() {
                if ship.contains(coord) {
                    ship.recompute_sunk(hits);
                }
            }
        }
    }

    /// Move the ship of `class` so its run starts at `anchor`, keeping its
    /// orientation. Manual adjustment checks bounds and overlap only; the
    /// contact rule does not apply here.
    pub fn move_ship(&mut self, class: ShipClass, anchor: Coord) -> Result<(), PlacementError> {
        let idx = self
            .ships
            .iter()
            .position(|s| s.class() == class)
            .ok_or(PlacementError::NoSuchShip)?;
        let replacement = Ship::span(class, self.ships[idx].orientation(), anchor)?;
        self.replace_ship(idx, replacement)
    }

    /// Flip the ship of `class` between horizontal and vertical around its
    /// anchor. Same validation as [`Grid::move_ship`].
    pub fn rotate_ship(&mut self, class: ShipClass) -> Result<(), PlacementError> {
        let idx = self
            .ships
            .iter()
            .position(|s| s.class() == class)
            .ok_or(PlacementError::NoSuchShip)?;
        let ship = &self.ships[idx];
        let replacement = Ship::span(class, ship.orientation().flipped(), ship.anchor())?;
        self.replace_ship(idx, replacement)
    }

    /// Swap `ships[idx]` for `replacement` if the new run is free of other
    /// ships. The old run is lifted first, so a ship may cross its own
    /// previous cells.
    fn replace_ship(&mut self, idx: usize, mut replacement: Ship) -> Result<(), PlacementError> {
        let overlaps = replacement.positions().iter().any(|&p| {
            self.ships
                .iter()
                .enumerate()
                .any(|(i, s)| i != idx && s.contains(p))
        });
        if overlaps {
            return Err(PlacementError::Overlap);
        }
        let old_positions: Vec<Coord> = self.ships[idx].positions().to_vec();
        for &p in &old_positions {
            self.cell_mut(p).contains_ship = false;
        }
        for &p in replacement.positions() {
            self.cell_mut(p).contains_ship = true;
        }
        replacement.recompute_sunk(&self.hits);
        debug!(
            "grid {}: {} now at {} ({:?})",
            self.team,
            replacement.class(),
            replacement.anchor(),
            replacement.orientation()
        );
        self.ships[idx] = replacement;
        Ok(())
    }
}
