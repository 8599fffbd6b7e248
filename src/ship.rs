//! Ship geometry: hull class, orientation, and the contiguous run of cells
//! a placed ship occupies.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::common::PlacementError;
use crate::coord::Coord;

/// The two hull classes every team fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShipClass {
    Carrier,
    Corvette,
}

impl ShipClass {
    /// Number of cells the hull covers.
    pub const fn size(self) -> usize {
        match self {
            ShipClass::Carrier => 4,
            ShipClass::Corvette => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ShipClass::Carrier => "carrier",
            ShipClass::Corvette => "corvette",
        }
    }
}

impl fmt::Display for ShipClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Axis a ship extends along from its anchor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    /// Columns increase: `A1 B1 C1 ...`
    #[serde(rename = "H")]
    Horizontal,
    /// Rows increase: `A1 A2 A3 ...`
    #[serde(rename = "V")]
    Vertical,
}

impl Orientation {
    pub fn flipped(self) -> Orientation {
        match self {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        }
    }
}

/// A placed ship: its class, orientation and the ordered cells it covers.
/// The run is contiguous and in bounds by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    class: ShipClass,
    orientation: Orientation,
    positions: Vec<Coord>,
    sunk: bool,
}

impl Ship {
    /// Lay out the run of `class.size()` cells starting at `anchor` and
    /// extending along `orientation`. Fails when the run leaves the grid.
    pub fn span(
        class: ShipClass,
        orientation: Orientation,
        anchor: Coord,
    ) -> Result<Ship, PlacementError> {
        let mut positions = Vec::with_capacity(class.size());
        positions.push(anchor);
        let mut cursor = anchor;
        for _ in 1..class.size() {
            cursor = match orientation {
                Orientation::Horizontal => cursor.offset(1, 0),
                Orientation::Vertical => cursor.offset(0, 1),
            }
            .ok_or(PlacementError::OutOfBounds)?;
            positions.push(cursor);
        }
        Ok(Ship {
            class,
            orientation,
            positions,
            sunk: false,
        })
    }

    /// Rebuild a ship from persisted parts. The sunk flag is provisional;
    /// grids recompute it from their hit list after loading.
    pub(crate) fn from_parts(
        class: ShipClass,
        orientation: Orientation,
        positions: Vec<Coord>,
        sunk: bool,
    ) -> Ship {
        Ship {
            class,
            orientation,
            positions,
            sunk,
        }
    }

    pub fn class(&self) -> ShipClass {
        self.class
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Cells the hull covers, anchor first.
    pub fn positions(&self) -> &[Coord] {
        &self.positions
    }

    /// First cell of the run.
    pub fn anchor(&self) -> Coord {
        self.positions[0]
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.positions.contains(&coord)
    }

    pub fn is_sunk(&self) -> bool {
        self.sunk
    }

    /// Re-derive the sunk flag from a grid's hit list: sunk exactly when
    /// every hull cell has been hit. Returns the new value.
    pub fn recompute_sunk(&mut self, hits: &[Coord]) -> bool {
        self.sunk = self.positions.iter().all(|p| hits.contains(p));
        self.sunk
    }
}
