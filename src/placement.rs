//! Retry-bounded random fleet placement.
//!
//! Rejection sampling with a cap: each attempt draws a uniform orientation
//! and a uniform anchor from the positions where the run fits, then lets the
//! grid validate. Running out of attempts is the typed `Exhausted` failure,
//! and the grid is left holding whatever was placed so far.

use log::warn;
use rand::Rng;

use crate::common::PlacementError;
use crate::config::{FLEET, GRID_SIZE};
use crate::coord::Coord;
use crate::grid::Grid;
use crate::ship::{Orientation, Ship, ShipClass};

/// Draw one candidate ship of `class`: uniform orientation, uniform anchor
/// among those where the whole run stays on the grid.
pub fn random_ship<R: Rng>(rng: &mut R, class: ShipClass) -> Result<Ship, PlacementError> {
    let orientation = if rng.random() {
        Orientation::Horizontal
    } else {
        Orientation::Vertical
    };
    let len = class.size() as u8;
    let (max_col, max_row) = match orientation {
        Orientation::Horizontal => (GRID_SIZE - len, GRID_SIZE - 1),
        Orientation::Vertical => (GRID_SIZE - 1, GRID_SIZE - len),
    };
    let col = rng.random_range(0..=max_col);
    let row = rng.random_range(0..=max_row);
    let anchor = Coord::new(col, row).ok_or(PlacementError::OutOfBounds)?;
    Ship::span(class, orientation, anchor)
}

/// Sample-and-place one ship of `class`, up to `attempts` draws.
pub fn place_one<R: Rng>(
    rng: &mut R,
    grid: &mut Grid,
    class: ShipClass,
    allow_contact: bool,
    attempts: u32,
) -> Result<(), PlacementError> {
    for _ in 0..attempts {
        let ship = random_ship(rng, class)?;
        if grid.place_ship(ship, allow_contact).is_ok() {
            return Ok(());
        }
    }
    warn!(
        "grid {}: no legal spot for the {} after {} attempts",
        grid.team(),
        class,
        attempts
    );
    Err(PlacementError::Exhausted { class, attempts })
}

/// Place the whole fleet on `grid`, largest ship first. Stops at the first
/// exhausted ship; the grid keeps the ships already placed and stays
/// incomplete, which blocks the start of play.
pub fn place_fleet<R: Rng>(
    rng: &mut R,
    grid: &mut Grid,
    allow_contact: bool,
    attempts: u32,
) -> Result<(), PlacementError> {
    for class in FLEET {
        place_one(rng, grid, class, allow_contact, attempts)?;
    }
    Ok(())
}
