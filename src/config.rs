use crate::ship::ShipClass;
use crate::team::TeamId;

/// Grid edge length: columns `A`-`E`, rows `1`-`5`.
pub const GRID_SIZE: u8 = 5;

/// Ships every team fields, in placement order (largest first).
pub const FLEET: [ShipClass; 2] = [ShipClass::Carrier, ShipClass::Corvette];

/// Ships a grid must hold before play can start.
pub const FLEET_SIZE: usize = FLEET.len();

/// Cap on random-placement attempts per ship.
pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 100;

/// Roster of a standard four-team match.
pub const DEFAULT_TEAMS: [TeamId; 4] = [TeamId::A, TeamId::B, TeamId::C, TeamId::D];
