//! Read-only text rendering of grids, scoreboard, banner and history.
//! Works from a live game or one rebuilt out of a snapshot; never mutates.

use crate::common::ShotOutcome;
use crate::config::GRID_SIZE;
use crate::coord::Coord;
use crate::game::{Game, Phase, ShotRecord, ShotReport, VictoryReason};
use crate::grid::{Cell, CellState, Grid};
use crate::team::TeamId;

/// Shots shown at the bottom of the dashboard.
const HISTORY_LINES: usize = 10;

fn glyph(cell: Cell, reveal: bool) -> char {
    match cell.state {
        CellState::Hit => 'X',
        CellState::Water => 'o',
        CellState::Neutral => {
            if reveal && cell.contains_ship {
                'S'
            } else {
                '.'
            }
        }
    }
}

/// One team's board as a bordered block, `reveal` showing un-hit ship cells.
pub fn render_grid(grid: &Grid, reveal: bool) -> String {
    let mut out = String::new();
    let border = "═".repeat(2 * GRID_SIZE as usize + 5);
    out.push_str(&format!("╔{}╗\n", border));
    let mut header = String::from("║    ");
    for c in 0..GRID_SIZE {
        header.push((b'A' + c) as char);
        header.push(' ');
    }
    out.push_str(&format!("{} ║\n", header));
    out.push_str(&format!("╠{}╣\n", border));
    for r in 0..GRID_SIZE {
        let mut line = format!("║ {}  ", r + 1);
        for c in 0..GRID_SIZE {
            // Coord::new never fails for c, r below GRID_SIZE
            if let Some(coord) = Coord::new(c, r) {
                line.push(glyph(grid.cell(coord), reveal));
                line.push(' ');
            }
        }
        out.push_str(&format!("{} ║\n", line));
    }
    out.push_str(&format!("╚{}╝\n", border));
    out
}

fn team_name(game: &Game, id: TeamId) -> &str {
    game.team(id).map(|t| t.name.as_str()).unwrap_or(id.as_str())
}

/// Teams by descending score, one line each.
pub fn render_scoreboard(game: &Game) -> String {
    let mut out = String::from("Scores:\n");
    for team in game.scoreboard() {
        let marker = if team.id == game.current_team() {
            "▶"
        } else {
            " "
        };
        let status = if team.is_eliminated() {
            "  ELIMINATED"
        } else {
            ""
        };
        out.push_str(&format!(
            "{} {} ({})  {} pt{}{}\n",
            marker,
            team.name,
            team.id,
            team.score,
            if team.score == 1 { "" } else { "s" },
            status
        ));
    }
    out
}

/// Phase headline: whose turn it is, or who won and why.
pub fn render_banner(game: &Game) -> String {
    match game.phase() {
        Phase::Preparation => {
            let missing = game.incomplete_teams();
            if missing.is_empty() {
                "PREPARATION — all fleets placed, ready to start".to_string()
            } else {
                let names: Vec<&str> = missing.iter().map(|&id| id.as_str()).collect();
                format!("PREPARATION — waiting on fleet(s): {}", names.join(", "))
            }
        }
        Phase::Playing => {
            let turn = format!(
                "{}'S TURN TO SHOOT",
                team_name(game, game.current_team()).to_uppercase()
            );
            if game.settings().game_ending {
                format!("{} — FINISH PENDING", turn)
            } else {
                turn
            }
        }
        Phase::Finished => {
            let victory = game.victory();
            match victory.reason {
                VictoryReason::Elimination => format!(
                    "{} WINS — LAST FLEET STANDING",
                    team_name(game, victory.winners[0]).to_uppercase()
                ),
                VictoryReason::Score => {
                    let names: Vec<String> = victory
                        .winners
                        .iter()
                        .map(|&id| team_name(game, id).to_uppercase())
                        .collect();
                    if names.len() == 1 {
                        format!("{} WINS ON POINTS", names[0])
                    } else {
                        format!("TIE BETWEEN {}", names.join(" AND "))
                    }
                }
            }
        }
    }
}

fn outcome_label(outcome: ShotOutcome) -> String {
    match outcome {
        ShotOutcome::Already => "already aimed".to_string(),
        ShotOutcome::Miss => "miss".to_string(),
        ShotOutcome::Hit { sunk: None } => "HIT".to_string(),
        ShotOutcome::Hit { sunk: Some(class) } => format!("HIT, {} sunk", class),
    }
}

fn clock(timestamp_ms: u64) -> String {
    let s = timestamp_ms / 1000;
    format!("{:02}:{:02}:{:02}", s / 3600 % 24, s / 60 % 60, s % 60)
}

fn history_line(game: &Game, record: &ShotRecord) -> String {
    let per_grid: Vec<String> = record
        .results
        .iter()
        .map(|r| format!("{}: {}", r.grid, outcome_label(r.outcome)))
        .collect();
    format!(
        "{}  {} → {}  [{}]  +{} pt{}",
        clock(record.timestamp),
        team_name(game, record.team),
        record.coord,
        per_grid.join(", "),
        record.points_gained,
        if record.points_gained == 1 { "" } else { "s" }
    )
}

/// The most recent shots, newest first.
pub fn render_history(game: &Game, count: usize) -> String {
    if game.history().is_empty() {
        return "No shots fired yet.\n".to_string();
    }
    let mut out = String::from("Recent shots:\n");
    for record in game.recent_history(count) {
        out.push_str(&format!("  {}\n", history_line(game, record)));
    }
    out
}

/// One fired salvo, spelled out per opposing grid.
pub fn render_shot_report(game: &Game, report: &ShotReport) -> String {
    let per_grid: Vec<String> = report
        .results
        .iter()
        .map(|r| format!("{}: {}", team_name(game, r.grid), outcome_label(r.outcome)))
        .collect();
    format!(
        "{} fired {} → {} — +{} point{}",
        team_name(game, report.team),
        report.coord,
        per_grid.join(", "),
        report.total_points,
        if report.total_points == 1 { "" } else { "s" }
    )
}

/// The full dashboard: banner, scoreboard, every grid, legend, history.
pub fn render_game(game: &Game, reveal: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n\n", render_banner(game)));
    out.push_str(&render_scoreboard(game));
    out.push('\n');
    for team in game.teams() {
        let status = if team.is_eliminated() {
            " — ELIMINATED"
        } else {
            ""
        };
        out.push_str(&format!("{} ({}){}\n", team.name, team.id, status));
        if let Some(grid) = game.grid(team.id) {
            out.push_str(&render_grid(grid, reveal));
        }
        out.push('\n');
    }
    if reveal {
        out.push_str("Legend: X=Hit  o=Miss  S=Ship  .=Water\n");
    } else {
        out.push_str("Legend: X=Hit  o=Miss  .=Unknown\n");
    }
    out.push('\n');
    out.push_str(&render_history(game, HISTORY_LINES));
    out
}
