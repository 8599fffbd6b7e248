//! Board coordinates in the `A1`..`E5` notation used across the console,
//! the persisted state and the shot history.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::GRID_SIZE;

/// One cell address: column letter `A`-`E`, row digit `1`-`5`.
///
/// Stored zero-based and kept in bounds by construction, so code holding a
/// `Coord` never range-checks. Ordering is column-major (`A1 < A5 < B1`),
/// which keeps serialized cell maps in a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Coord {
    col: u8,
    row: u8,
}

impl Coord {
    /// Build from zero-based column and row. `None` when off the grid.
    pub fn new(col: u8, row: u8) -> Option<Coord> {
        if col < GRID_SIZE && row < GRID_SIZE {
            Some(Coord { col, row })
        } else {
            None
        }
    }

    /// Zero-based column (`A` = 0).
    pub fn col(self) -> u8 {
        self.col
    }

    /// Zero-based row (`1` = 0).
    pub fn row(self) -> u8 {
        self.row
    }

    /// The coordinate shifted by the given deltas, if it stays on the grid.
    pub fn offset(self, dc: i8, dr: i8) -> Option<Coord> {
        let col = self.col as i8 + dc;
        let row = self.row as i8 + dr;
        if (0..GRID_SIZE as i8).contains(&col) && (0..GRID_SIZE as i8).contains(&row) {
            Some(Coord {
                col: col as u8,
                row: row as u8,
            })
        } else {
            None
        }
    }

    /// The up to eight surrounding cells, clipped at the edges.
    pub fn neighbors(self) -> impl Iterator<Item = Coord> {
        const OFFSETS: [(i8, i8); 8] = [
            (-1, -1),
            (-1, 0),
            (-1, 1),
            (0, -1),
            (0, 1),
            (1, -1),
            (1, 0),
            (1, 1),
        ];
        OFFSETS.iter().filter_map(move |&(dc, dr)| self.offset(dc, dr))
    }

    /// Every cell of the grid in column-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..GRID_SIZE).flat_map(|col| (0..GRID_SIZE).map(move |row| Coord { col, row }))
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row + 1)
    }
}

/// Rejected coordinate text, carried for the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCoordError(String);

impl fmt::Display for ParseCoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid coordinate {:?}: expected a column A-E followed by a row 1-5",
            self.0
        )
    }
}

impl std::error::Error for ParseCoordError {}

impl FromStr for Coord {
    type Err = ParseCoordError;

    /// Strict parse of the canonical notation: exactly one uppercase letter
    /// `A`-`E` followed by one digit `1`-`5`. Callers normalize case first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(ParseCoordError(s.to_string()));
        }
        let col = bytes[0].wrapping_sub(b'A');
        let row = bytes[1].wrapping_sub(b'1');
        if col >= GRID_SIZE || row >= GRID_SIZE {
            return Err(ParseCoordError(s.to_string()));
        }
        Ok(Coord { col, row })
    }
}

impl TryFrom<String> for Coord {
    type Error = ParseCoordError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Coord> for String {
    fn from(coord: Coord) -> String {
        coord.to_string()
    }
}
