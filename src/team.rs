//! Team identity, score and elimination status.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of one of the (at most four) competing teams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamId {
    A,
    B,
    C,
    D,
}

impl TeamId {
    pub const ALL: [TeamId; 4] = [TeamId::A, TeamId::B, TeamId::C, TeamId::D];

    pub fn as_str(self) -> &'static str {
        match self {
            TeamId::A => "a",
            TeamId::B => "b",
            TeamId::C => "c",
            TeamId::D => "d",
        }
    }

    /// Display name used until an operator renames the team.
    pub fn default_name(self) -> &'static str {
        match self {
            TeamId::A => "Team A",
            TeamId::B => "Team B",
            TeamId::C => "Team C",
            TeamId::D => "Team D",
        }
    }

    /// Scoreboard accent color for display surfaces.
    pub fn color(self) -> &'static str {
        match self {
            TeamId::A => "#ef4444",
            TeamId::B => "#3b82f6",
            TeamId::C => "#10b981",
            TeamId::D => "#f59e0b",
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected team text, carried for the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTeamError(String);

impl fmt::Display for ParseTeamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid team {:?}: expected a, b, c or d", self.0)
    }
}

impl std::error::Error for ParseTeamError {}

impl FromStr for TeamId {
    type Err = ParseTeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "a" | "A" => Ok(TeamId::A),
            "b" | "B" => Ok(TeamId::B),
            "c" | "C" => Ok(TeamId::C),
            "d" | "D" => Ok(TeamId::D),
            other => Err(ParseTeamError(other.to_string())),
        }
    }
}

/// Whether a team is still in the fight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Active,
    Eliminated,
}

/// One competing team. Score only ever moves through shots and their undo;
/// status flips to eliminated when the team's whole fleet is sunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub score: u32,
    pub status: TeamStatus,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Team {
        Team {
            id,
            name: name.into(),
            score: 0,
            status: TeamStatus::Active,
        }
    }

    pub fn is_eliminated(&self) -> bool {
        self.status == TeamStatus::Eliminated
    }
}
