use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::{GameError, PlacementError, ShotOutcome};
use crate::config::{DEFAULT_PLACEMENT_ATTEMPTS, DEFAULT_TEAMS, FLEET_SIZE};
use crate::coord::Coord;
use crate::grid::Grid;
use crate::placement;
use crate::ship::{Ship, ShipClass};
use crate::team::{Team, TeamId, TeamStatus};

/// Lifecycle phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Preparation,
    Playing,
    Finished,
}

/// Operator-adjustable settings, persisted with the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Ships may touch when placed. Manual moves skip this rule either way.
    pub allow_contact: bool,
    pub mute_sounds: bool,
    /// Display surfaces reveal un-hit ship cells.
    pub show_boats: bool,
    /// Latched when elimination leaves at most one team standing; the
    /// actual finish waits for [`Game::finalize_end`]. Cleared by the
    /// finish itself, by a start and by a reset.
    pub game_ending: bool,
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            allow_contact: true,
            mute_sounds: false,
            show_boats: false,
            game_ending: false,
        }
    }
}

/// Outcome of one fired coordinate on one opposing grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShot {
    pub grid: TeamId,
    pub outcome: ShotOutcome,
}

/// One shot-history entry. Appended for every fired coordinate, including
/// all-`Already` ones; only a LIFO undo removes entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShotRecord {
    /// Team that fired.
    pub team: TeamId,
    pub coord: Coord,
    /// One outcome per opposing grid.
    pub results: Vec<GridShot>,
    pub points_gained: u32,
    /// Unix epoch milliseconds.
    pub timestamp: u64,
}

/// Proof that a shot latched the end of the game. Single-use: consumed by
/// [`Game::finalize_end`] once the shot's external effects are done. Not
/// constructible outside this module, so the two-phase finish cannot be
/// forged.
#[derive(Debug)]
#[must_use = "an unconsumed end token leaves the game suspended in the playing phase"]
pub struct EndToken(());

/// Everything one fan-out shot did, summarized for the caller.
#[derive(Debug)]
pub struct ShotReport {
    pub team: TeamId,
    pub coord: Coord,
    pub results: Vec<GridShot>,
    pub total_points: u32,
    pub any_hit: bool,
    pub any_sunk: bool,
    /// Present when this shot left at most one team standing. The game
    /// stays in `playing` until the token is passed back.
    pub end_pending: Option<EndToken>,
}

/// Why the game finished. Derived from standings on demand, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VictoryReason {
    /// One team outlasted every other fleet.
    Elimination,
    /// Ended manually; the top score wins.
    Score,
}

/// Final (or would-be) standings summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Victory {
    pub reason: VictoryReason,
    /// A single id for an elimination win; score ties can hold several.
    pub winners: Vec<TeamId>,
}

/// The authoritative match state: teams, grids, turn, phase, history and
/// settings. Every mutation passes through one of its methods and stamps
/// [`Game::last_update`]; collaborators hold a reference or work from a
/// [`crate::snapshot::GameSnapshot`], never a global.
#[derive(Debug)]
pub struct Game {
    teams: Vec<Team>,
    grids: BTreeMap<TeamId, Grid>,
    current_team: TeamId,
    phase: Phase,
    shot_history: Vec<ShotRecord>,
    settings: Settings,
    last_update: u64,
}

impl Game {
    /// Standard four-team match in preparation.
    pub fn new() -> Game {
        Game::build(
            DEFAULT_TEAMS
                .iter()
                .map(|&id| Team::new(id, id.default_name()))
                .collect(),
        )
    }

    /// Match with a custom roster of two to four distinct teams.
    pub fn with_teams(ids: &[TeamId]) -> Result<Game, GameError> {
        if ids.len() < 2 || ids.len() > 4 {
            return Err(GameError::InvalidRoster);
        }
        for (i, id) in ids.iter().enumerate() {
            if ids[..i].contains(id) {
                return Err(GameError::InvalidRoster);
            }
        }
        Ok(Game::build(
            ids.iter()
                .map(|&id| Team::new(id, id.default_name()))
                .collect(),
        ))
    }

    /// `teams` is non-empty and duplicate-free; both public constructors
    /// guarantee it.
    fn build(teams: Vec<Team>) -> Game {
        let grids = teams.iter().map(|t| (t.id, Grid::new(t.id))).collect();
        let current_team = teams[0].id;
        Game {
            teams,
            grids,
            current_team,
            phase: Phase::Preparation,
            shot_history: Vec::new(),
            settings: Settings::default(),
            last_update: 0,
        }
    }

    /// Rebuild from persisted parts. Trusted except where cheap to check:
    /// teams missing a grid get a fresh empty one.
    pub(crate) fn from_parts(
        teams: Vec<Team>,
        mut grids: BTreeMap<TeamId, Grid>,
        current_team: TeamId,
        phase: Phase,
        shot_history: Vec<ShotRecord>,
        settings: Settings,
        last_update: u64,
    ) -> Game {
        for team in &teams {
            grids.entry(team.id).or_insert_with(|| Grid::new(team.id));
        }
        Game {
            teams,
            grids,
            current_team,
            phase,
            shot_history,
            settings,
            last_update,
        }
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    fn team_mut(&mut self, id: TeamId) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == id)
    }

    pub fn grid(&self, id: TeamId) -> Option<&Grid> {
        self.grids.get(&id)
    }

    pub fn grids(&self) -> impl Iterator<Item = &Grid> {
        self.grids.values()
    }

    pub fn current_team(&self) -> TeamId {
        self.current_team
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn history(&self) -> &[ShotRecord] {
        &self.shot_history
    }

    /// The `count` most recent shots, newest first.
    pub fn recent_history(&self, count: usize) -> impl Iterator<Item = &ShotRecord> {
        self.shot_history.iter().rev().take(count)
    }

    /// Stamp of the last mutation, Unix epoch milliseconds. Strictly
    /// increases with every mutation, so readers compare it to decide
    /// whether a reload is news.
    pub fn last_update(&self) -> u64 {
        self.last_update
    }

    /// Teams ordered by descending score, the scoreboard display order.
    pub fn scoreboard(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.iter().collect();
        teams.sort_by(|a, b| b.score.cmp(&a.score));
        teams
    }

    /// Teams whose grids hold fewer ships than the fleet requires.
    pub fn incomplete_teams(&self) -> Vec<TeamId> {
        self.teams
            .iter()
            .filter(|t| self.grids[&t.id].ships().len() < FLEET_SIZE)
            .map(|t| t.id)
            .collect()
    }

    /// Every team's full fleet is on its grid.
    pub fn placement_ready(&self) -> bool {
        self.incomplete_teams().is_empty()
    }

    /// Standings summary: a sole survivor wins by elimination, otherwise
    /// the top score wins (ties share the win).
    pub fn victory(&self) -> Victory {
        let eliminated = self.teams.iter().filter(|t| t.is_eliminated()).count();
        if eliminated >= self.teams.len().saturating_sub(1) {
            if let Some(last) = self.teams.iter().find(|t| !t.is_eliminated()) {
                return Victory {
                    reason: VictoryReason::Elimination,
                    winners: vec![last.id],
                };
            }
        }
        let top = self.teams.iter().map(|t| t.score).max().unwrap_or(0);
        Victory {
            reason: VictoryReason::Score,
            winners: self
                .teams
                .iter()
                .filter(|t| t.score == top)
                .map(|t| t.id)
                .collect(),
        }
    }

    fn ensure_preparation(&self) -> Result<(), GameError> {
        if self.phase == Phase::Preparation {
            Ok(())
        } else {
            Err(GameError::NotInPreparation)
        }
    }

    /// Bump the mutation stamp. Monotonic even when the wall clock is not.
    fn touch(&mut self) {
        self.last_update = now_millis().max(self.last_update + 1);
    }

    /// `preparation` -> `playing`. Refused outside preparation and while
    /// any team's fleet is incomplete.
    pub fn start(&mut self) -> Result<(), GameError> {
        self.ensure_preparation()?;
        if let Some(&team) = self.incomplete_teams().first() {
            return Err(GameError::FleetIncomplete(team));
        }
        self.phase = Phase::Playing;
        self.settings.game_ending = false;
        self.touch();
        info!("game started, {} opens", self.current_team);
        Ok(())
    }

    /// `playing` -> `finished`, the manual operator action.
    pub fn end(&mut self) -> Result<(), GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        self.finish();
        Ok(())
    }

    /// Commit a deferred finish. The token proves a shot left at most one
    /// team standing; if the game has moved on since (manual end, reset,
    /// undo), consuming it is a no-op.
    pub fn finalize_end(&mut self, _token: EndToken) {
        if self.phase == Phase::Playing && self.settings.game_ending {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        self.settings.game_ending = false;
        self.touch();
        let victory = self.victory();
        match victory.reason {
            VictoryReason::Elimination => {
                info!("game over, {} wins by elimination", victory.winners[0])
            }
            VictoryReason::Score => info!("game over, winners on points: {:?}", victory.winners),
        }
    }

    /// Back to a fresh preparation: zero scores, everyone active, empty
    /// grids, no history. Teams and their names survive.
    pub fn reset(&mut self) {
        for team in self.teams.iter_mut() {
            team.score = 0;
            team.status = TeamStatus::Active;
        }
        self.current_team = self.teams[0].id;
        self.phase = Phase::Preparation;
        self.shot_history.clear();
        self.settings.game_ending = false;
        for (&id, grid) in self.grids.iter_mut() {
            *grid = Grid::new(id);
        }
        self.touch();
        info!("game reset");
    }

    /// Hand the turn to `id`. The operator stays in charge: no liveness or
    /// ordering rule, an eliminated pick is only logged.
    pub fn set_current_team(&mut self, id: TeamId) -> Result<(), GameError> {
        if !self.grids.contains_key(&id) {
            return Err(GameError::UnknownTeam(id));
        }
        if self.team(id).is_some_and(|t| t.is_eliminated()) {
            warn!("turn handed to eliminated team {}", id);
        }
        self.current_team = id;
        self.touch();
        Ok(())
    }

    /// Rename a team. Scores, status and grid are untouched.
    pub fn rename_team(&mut self, id: TeamId, name: impl Into<String>) -> Result<(), GameError> {
        let team = self.team_mut(id).ok_or(GameError::UnknownTeam(id))?;
        team.name = name.into();
        self.touch();
        Ok(())
    }

    pub fn set_allow_contact(&mut self, allow: bool) {
        self.settings.allow_contact = allow;
        self.touch();
    }

    pub fn set_mute_sounds(&mut self, mute: bool) {
        self.settings.mute_sounds = mute;
        self.touch();
    }

    pub fn set_show_boats(&mut self, show: bool) {
        self.settings.show_boats = show;
        self.touch();
    }

    /// Manually place one ship during preparation. The contact rule follows
    /// the current settings.
    pub fn place_ship(&mut self, team: TeamId, ship: Ship) -> Result<(), GameError> {
        self.ensure_preparation()?;
        let allow_contact = self.settings.allow_contact;
        let grid = self
            .grids
            .get_mut(&team)
            .ok_or(GameError::UnknownTeam(team))?;
        grid.place_ship(ship, allow_contact)?;
        self.touch();
        Ok(())
    }

    /// Move a placed ship to a new anchor during preparation.
    pub fn move_ship(
        &mut self,
        team: TeamId,
        class: ShipClass,
        anchor: Coord,
    ) -> Result<(), GameError> {
        self.ensure_preparation()?;
        let grid = self
            .grids
            .get_mut(&team)
            .ok_or(GameError::UnknownTeam(team))?;
        grid.move_ship(class, anchor)?;
        self.touch();
        Ok(())
    }

    /// Rotate a placed ship around its anchor during preparation.
    pub fn rotate_ship(&mut self, team: TeamId, class: ShipClass) -> Result<(), GameError> {
        self.ensure_preparation()?;
        let grid = self
            .grids
            .get_mut(&team)
            .ok_or(GameError::UnknownTeam(team))?;
        grid.rotate_ship(class)?;
        self.touch();
        Ok(())
    }

    /// Empty one team's grid during preparation.
    pub fn clear_grid(&mut self, team: TeamId) -> Result<(), GameError> {
        self.ensure_preparation()?;
        if !self.grids.contains_key(&team) {
            return Err(GameError::UnknownTeam(team));
        }
        self.grids.insert(team, Grid::new(team));
        self.touch();
        Ok(())
    }

    /// Re-roll every grid: recreate it empty and fill it with randomly
    /// placed fleets. Grids are independent, so one exhausted grid does not
    /// stop the others; it comes back in the failure list instead, stays
    /// incomplete and blocks [`Game::start`].
    pub fn randomize_placement<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<Vec<(TeamId, PlacementError)>, GameError> {
        self.ensure_preparation()?;
        let allow_contact = self.settings.allow_contact;
        let mut failures = Vec::new();
        for (&id, grid) in self.grids.iter_mut() {
            *grid = Grid::new(id);
            if let Err(err) =
                placement::place_fleet(rng, grid, allow_contact, DEFAULT_PLACEMENT_ATTEMPTS)
            {
                failures.push((id, err));
            }
        }
        self.touch();
        info!(
            "fleets re-rolled for {} grids ({} failures)",
            self.grids.len(),
            failures.len()
        );
        Ok(failures)
    }

    /// Fire `coord` for the current team at every opposing grid.
    ///
    /// Per grid the outcome is `Already`, `Miss` or `Hit`; each hit is one
    /// point for the shooter. The record lands in the history whatever the
    /// outcomes. Elimination is re-checked afterwards: when at most one
    /// team is left standing the end latch is set and the report carries an
    /// [`EndToken`]; further shots are refused until the token is consumed
    /// (or an undo releases the latch).
    pub fn shoot(&mut self, coord: Coord) -> Result<ShotReport, GameError> {
        if self.phase != Phase::Playing {
            return Err(GameError::NotPlaying);
        }
        if self.settings.game_ending {
            return Err(GameError::EndPending);
        }
        let shooter = self.current_team;
        let mut results = Vec::with_capacity(self.teams.len().saturating_sub(1));
        let mut total_points = 0;
        let mut any_hit = false;
        let mut any_sunk = false;
        for (&id, grid) in self.grids.iter_mut() {
            if id == shooter {
                continue;
            }
            let outcome = grid.shoot(coord);
            debug!("{} fires {} at grid {}: {:?}", shooter, coord, id, outcome);
            total_points += outcome.points();
            any_hit |= outcome.is_hit();
            any_sunk |= outcome.sunk().is_some();
            results.push(GridShot { grid: id, outcome });
        }
        if let Some(team) = self.team_mut(shooter) {
            team.score += total_points;
        }
        self.check_eliminations();
        let end_pending = if self.settings.game_ending {
            Some(EndToken(()))
        } else {
            None
        };
        self.shot_history.push(ShotRecord {
            team: shooter,
            coord,
            results: results.clone(),
            points_gained: total_points,
            timestamp: now_millis(),
        });
        self.touch();
        info!("{} fired {}: +{} point(s)", shooter, coord, total_points);
        Ok(ShotReport {
            team: shooter,
            coord,
            results,
            total_points,
            any_hit,
            any_sunk,
            end_pending,
        })
    }

    /// Flip newly dead teams to eliminated, then latch the end when at most
    /// one team is still standing.
    fn check_eliminations(&mut self) {
        for team in self.teams.iter_mut() {
            if team.status == TeamStatus::Eliminated {
                continue;
            }
            if self.grids[&team.id].is_eliminated() {
                team.status = TeamStatus::Eliminated;
                info!("{} ({}) is eliminated", team.name, team.id);
            }
        }
        let eliminated = self.teams.iter().filter(|t| t.is_eliminated()).count();
        if self.phase == Phase::Playing && eliminated + 1 >= self.teams.len() {
            self.settings.game_ending = true;
            info!("at most one fleet left standing, finish pending");
        }
    }

    /// Pop the newest shot and reverse it exactly: the shooter's points
    /// come back off, each touched cell returns to unaimed neutral, hit
    /// lists shrink and sunk flags are recomputed. Elimination statuses are
    /// deliberately left as they were; a pending end latch is released so
    /// play can resume. `None` on empty history.
    pub fn undo_last_shot(&mut self) -> Option<ShotRecord> {
        let record = self.shot_history.pop()?;
        if let Some(team) = self.team_mut(record.team) {
            team.score = team.score.saturating_sub(record.points_gained);
        }
        for shot in &record.results {
            if let Some(grid) = self.grids.get_mut(&shot.grid) {
                grid.undo_shot(record.coord, shot.outcome);
            }
        }
        if self.phase == Phase::Playing {
            self.settings.game_ending = false;
        }
        self.touch();
        info!(
            "undid {} by {} (-{} point(s))",
            record.coord, record.team, record.points_gained
        );
        Some(record)
    }

}

impl Default for Game {
    fn default() -> Game {
        Game::new()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
