//! The interactive operator console: parses commands, drives the game,
//! persists the full state after every mutation and plays the shot cue
//! before committing a deferred end of game.

use std::io::{self, Write};

use log::{debug, info};
use rand::rngs::SmallRng;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::common::GameError;
use crate::coord::Coord;
use crate::cue::{CueSink, ShotCue};
use crate::game::Game;
use crate::render;
use crate::ship::ShipClass;
use crate::store::{Slot, StateStore};
use crate::team::TeamId;

const HELP: &str = "Commands:
  start                      begin play (every fleet must be placed)
  end                        end the game now
  reset                      back to preparation, everything cleared
  shoot <coord>              fire at every opposing grid (e.g. shoot C4)
  <coord>                    shorthand for shoot
  undo                       take back the latest shot
  team <a-d>                 hand the turn to a team
  name <a-d> <name>          rename a team
  randomize                  re-roll every grid's fleet
  move <a-d> <ship> <coord>  move a ship (carrier|corvette), same orientation
  rotate <a-d> <ship>        flip a ship between horizontal and vertical
  clear <a-d>                empty a team's grid
  contact on|off             allow or forbid touching ships
  mute on|off                mute shot cues
  boats on|off               reveal un-hit ships on displays
  show                       print the dashboard
  help                       this text
  quit                       leave the console";

/// One parsed operator command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    End,
    Reset,
    Shoot(Coord),
    Undo,
    Team(TeamId),
    Name(TeamId, String),
    Randomize,
    Move(TeamId, ShipClass, Coord),
    Rotate(TeamId, ShipClass),
    Clear(TeamId),
    Contact(bool),
    Mute(bool),
    Boats(bool),
    Show,
    Help,
    Quit,
}

fn parse_coord(token: Option<&str>) -> Result<Coord, String> {
    let token = token.ok_or("expected a coordinate like C4")?;
    token
        .to_ascii_uppercase()
        .parse()
        .map_err(|e: crate::coord::ParseCoordError| e.to_string())
}

fn parse_team(token: Option<&str>) -> Result<TeamId, String> {
    let token = token.ok_or("expected a team letter a-d")?;
    token
        .parse()
        .map_err(|e: crate::team::ParseTeamError| e.to_string())
}

fn parse_class(token: Option<&str>) -> Result<ShipClass, String> {
    let token = token.ok_or("expected a ship: carrier or corvette")?;
    if token.eq_ignore_ascii_case("carrier") {
        Ok(ShipClass::Carrier)
    } else if token.eq_ignore_ascii_case("corvette") {
        Ok(ShipClass::Corvette)
    } else {
        Err(format!("unknown ship {:?}: expected carrier or corvette", token))
    }
}

fn parse_on_off(token: Option<&str>) -> Result<bool, String> {
    match token {
        Some(t) if t.eq_ignore_ascii_case("on") => Ok(true),
        Some(t) if t.eq_ignore_ascii_case("off") => Ok(false),
        Some(t) => Err(format!("expected on or off, got {:?}", t)),
        None => Err("expected on or off".to_string()),
    }
}

impl Command {
    /// Parse one operator line. Keywords are case-insensitive; coordinates
    /// are normalized to the canonical `A1` notation before the strict
    /// parse.
    pub fn parse(line: &str) -> Result<Command, String> {
        let mut tokens = line.split_whitespace();
        let head = tokens.next().ok_or("empty command")?.to_ascii_lowercase();
        let cmd = match head.as_str() {
            "start" => Command::Start,
            "end" => Command::End,
            "reset" => Command::Reset,
            "undo" => Command::Undo,
            "randomize" | "random" => Command::Randomize,
            "show" | "board" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "shoot" | "fire" => Command::Shoot(parse_coord(tokens.next())?),
            "team" => Command::Team(parse_team(tokens.next())?),
            "name" => {
                let team = parse_team(tokens.next())?;
                let rest: Vec<&str> = tokens.collect();
                if rest.is_empty() {
                    return Err("expected a new name".to_string());
                }
                return Ok(Command::Name(team, rest.join(" ")));
            }
            "move" => {
                let team = parse_team(tokens.next())?;
                let class = parse_class(tokens.next())?;
                let anchor = parse_coord(tokens.next())?;
                Command::Move(team, class, anchor)
            }
            "rotate" => Command::Rotate(parse_team(tokens.next())?, parse_class(tokens.next())?),
            "clear" => Command::Clear(parse_team(tokens.next())?),
            "contact" => Command::Contact(parse_on_off(tokens.next())?),
            "mute" => Command::Mute(parse_on_off(tokens.next())?),
            "boats" | "reveal" => Command::Boats(parse_on_off(tokens.next())?),
            other => {
                // a bare coordinate is shorthand for a shot
                if let Ok(coord) = other.to_ascii_uppercase().parse::<Coord>() {
                    Command::Shoot(coord)
                } else {
                    return Err(format!("unknown command {:?} (try 'help')", other));
                }
            }
        };
        if tokens.next().is_some() {
            return Err("unexpected input after the command".to_string());
        }
        Ok(cmd)
    }
}

/// The console that owns the authoritative game. Every mutating command
/// ends with a full-state persist; shots additionally run their cue and
/// only then finalize a pending end.
pub struct OperatorConsole<S: Slot> {
    game: Game,
    store: StateStore<S>,
    cues: Box<dyn CueSink>,
    rng: SmallRng,
}

impl<S: Slot> OperatorConsole<S> {
    pub fn new(
        game: Game,
        store: StateStore<S>,
        cues: Box<dyn CueSink>,
        rng: SmallRng,
    ) -> OperatorConsole<S> {
        OperatorConsole {
            game,
            store,
            cues,
            rng,
        }
    }

    /// Adopt the game persisted in the slot, or start a fresh one when the
    /// slot is empty or unreadable.
    pub async fn resume_or_new(
        store: StateStore<S>,
        cues: Box<dyn CueSink>,
        rng: SmallRng,
    ) -> anyhow::Result<OperatorConsole<S>> {
        let game = match store.load().await? {
            Some(snapshot) => {
                info!(
                    "resuming saved game (phase {:?}, lastUpdate {})",
                    snapshot.phase, snapshot.last_update
                );
                Game::from_snapshot(snapshot)
            }
            None => {
                info!("no saved game, starting fresh");
                Game::new()
            }
        };
        Ok(OperatorConsole::new(game, store, cues, rng))
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    async fn persist(&self) -> anyhow::Result<()> {
        self.store.persist(&self.game).await?;
        Ok(())
    }

    fn show(&self) {
        println!(
            "{}",
            render::render_game(&self.game, self.game.settings().show_boats)
        );
    }

    /// Print the outcome of a refusable operation; true when it succeeded.
    fn confirm(&self, result: Result<(), GameError>, done: &str) -> bool {
        match result {
            Ok(()) => {
                println!("{}", done);
                true
            }
            Err(e) => {
                println!("✗ {}", e);
                false
            }
        }
    }

    /// Fan-out shot: resolve, persist, cue, then commit a pending end.
    async fn fire(&mut self, coord: Coord) -> anyhow::Result<()> {
        let report = match self.game.shoot(coord) {
            Ok(report) => report,
            Err(e) => {
                println!("✗ {}", e);
                return Ok(());
            }
        };
        self.persist().await?;
        println!("{}", render::render_shot_report(&self.game, &report));
        let cue = ShotCue::for_report(&report);
        if self.game.settings().mute_sounds {
            debug!("muted, skipping {} cue", cue.name());
        } else {
            info!("cue: {}", cue.name());
            self.cues.play(cue).await?;
        }
        if let Some(token) = report.end_pending {
            self.game.finalize_end(token);
            self.persist().await?;
            println!("{}", render::render_banner(&self.game));
        }
        Ok(())
    }

    /// Apply one command. Returns false when the console should exit.
    pub async fn execute(&mut self, cmd: Command) -> anyhow::Result<bool> {
        match cmd {
            Command::Help => println!("{}", HELP),
            Command::Show => self.show(),
            Command::Quit => return Ok(false),
            Command::Start => {
                let res = self.game.start();
                if self.confirm(res, "Game on.") {
                    self.persist().await?;
                    println!("{}", render::render_banner(&self.game));
                }
            }
            Command::End => {
                let res = self.game.end();
                if self.confirm(res, "Game ended.") {
                    self.persist().await?;
                    println!("{}", render::render_banner(&self.game));
                }
            }
            Command::Reset => {
                self.game.reset();
                self.persist().await?;
                println!("Back to preparation.");
            }
            Command::Shoot(coord) => self.fire(coord).await?,
            Command::Undo => match self.game.undo_last_shot() {
                Some(record) => {
                    self.persist().await?;
                    println!(
                        "Undid {} by {} (-{} point{}).",
                        record.coord,
                        record.team,
                        record.points_gained,
                        if record.points_gained == 1 { "" } else { "s" }
                    );
                }
                None => println!("Nothing to undo."),
            },
            Command::Team(id) => {
                let res = self.game.set_current_team(id);
                if self.confirm(res, "Turn changed.") {
                    self.persist().await?;
                }
            }
            Command::Name(id, name) => {
                let res = self.game.rename_team(id, name);
                if self.confirm(res, "Team renamed.") {
                    self.persist().await?;
                }
            }
            Command::Randomize => match self.game.randomize_placement(&mut self.rng) {
                Ok(failures) => {
                    self.persist().await?;
                    if failures.is_empty() {
                        println!("Fleets placed.");
                    } else {
                        for (team, err) in failures {
                            println!("✗ grid {}: {}", team, err);
                        }
                    }
                }
                Err(e) => println!("✗ {}", e),
            },
            Command::Move(team, class, anchor) => {
                let res = self.game.move_ship(team, class, anchor);
                if self.confirm(res, "Ship moved.") {
                    self.persist().await?;
                }
            }
            Command::Rotate(team, class) => {
                let res = self.game.rotate_ship(team, class);
                if self.confirm(res, "Ship rotated.") {
                    self.persist().await?;
                }
            }
            Command::Clear(team) => {
                let res = self.game.clear_grid(team);
                if self.confirm(res, "Grid cleared.") {
                    self.persist().await?;
                }
            }
            Command::Contact(v) => {
                self.game.set_allow_contact(v);
                self.persist().await?;
                println!("Contact {}.", if v { "allowed" } else { "forbidden" });
            }
            Command::Mute(v) => {
                self.game.set_mute_sounds(v);
                self.persist().await?;
                println!("Cues {}.", if v { "muted" } else { "unmuted" });
            }
            Command::Boats(v) => {
                self.game.set_show_boats(v);
                self.persist().await?;
                println!("Boats {}.", if v { "shown" } else { "hidden" });
            }
        }
        Ok(true)
    }

    /// Read operator lines from stdin until quit or end of input.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}", HELP);
        println!();
        self.show();
        let stdin = BufReader::new(tokio::io::stdin());
        let mut lines = stdin.lines();
        prompt();
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if !line.is_empty() {
                match Command::parse(line) {
                    Ok(cmd) => {
                        if !self.execute(cmd).await? {
                            break;
                        }
                    }
                    Err(msg) => println!("✗ {}", msg),
                }
            }
            prompt();
        }
        Ok(())
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
