use broadside::{
    Command, Coord, Game, MemorySlot, OperatorConsole, Phase, ShipClass, SilentCues, StateStore,
    TeamId,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn c(s: &str) -> Coord {
    s.parse().unwrap()
}

#[test]
fn keywords_parse_case_insensitively() {
    assert_eq!(Command::parse("start").unwrap(), Command::Start);
    assert_eq!(Command::parse("START").unwrap(), Command::Start);
    assert_eq!(Command::parse("end").unwrap(), Command::End);
    assert_eq!(Command::parse("reset").unwrap(), Command::Reset);
    assert_eq!(Command::parse("undo").unwrap(), Command::Undo);
    assert_eq!(Command::parse("randomize").unwrap(), Command::Randomize);
    assert_eq!(Command::parse("random").unwrap(), Command::Randomize);
    assert_eq!(Command::parse("show").unwrap(), Command::Show);
    assert_eq!(Command::parse("help").unwrap(), Command::Help);
    assert_eq!(Command::parse("?").unwrap(), Command::Help);
    assert_eq!(Command::parse("quit").unwrap(), Command::Quit);
    assert_eq!(Command::parse("exit").unwrap(), Command::Quit);
}

#[test]
fn shot_commands_and_the_bare_coordinate_shorthand() {
    assert_eq!(Command::parse("shoot C4").unwrap(), Command::Shoot(c("C4")));
    assert_eq!(Command::parse("fire c4").unwrap(), Command::Shoot(c("C4")));
    assert_eq!(Command::parse("c4").unwrap(), Command::Shoot(c("C4")));
    assert_eq!(Command::parse("E5").unwrap(), Command::Shoot(c("E5")));
    assert!(Command::parse("shoot").is_err());
    assert!(Command::parse("shoot F9").is_err());
    assert!(Command::parse("f9").is_err());
}

#[test]
fn team_and_name_commands() {
    assert_eq!(Command::parse("team b").unwrap(), Command::Team(TeamId::B));
    assert!(Command::parse("team x").is_err());
    assert!(Command::parse("team").is_err());
    assert_eq!(
        Command::parse("name d The Deep Divers").unwrap(),
        Command::Name(TeamId::D, "The Deep Divers".to_string())
    );
    assert!(Command::parse("name d").is_err());
}

#[test]
fn placement_adjustment_commands() {
    assert_eq!(
        Command::parse("move a carrier B2").unwrap(),
        Command::Move(TeamId::A, ShipClass::Carrier, c("B2"))
    );
    assert_eq!(
        Command::parse("rotate c corvette").unwrap(),
        Command::Rotate(TeamId::C, ShipClass::Corvette)
    );
    assert_eq!(Command::parse("clear b").unwrap(), Command::Clear(TeamId::B));
    assert!(Command::parse("move a frigate B2").is_err());
    assert!(Command::parse("move a carrier").is_err());
    assert!(Command::parse("rotate c").is_err());
}

#[test]
fn settings_toggles_take_on_or_off() {
    assert_eq!(Command::parse("contact on").unwrap(), Command::Contact(true));
    assert_eq!(Command::parse("contact off").unwrap(), Command::Contact(false));
    assert_eq!(Command::parse("mute on").unwrap(), Command::Mute(true));
    assert_eq!(Command::parse("boats off").unwrap(), Command::Boats(false));
    assert_eq!(Command::parse("reveal on").unwrap(), Command::Boats(true));
    assert!(Command::parse("contact maybe").is_err());
    assert!(Command::parse("mute").is_err());
}

#[test]
fn junk_and_trailing_input_are_rejected() {
    assert!(Command::parse("").is_err());
    assert!(Command::parse("launch").is_err());
    assert!(Command::parse("start now").is_err());
    assert!(Command::parse("undo everything").is_err());
}

fn console_over(slot: MemorySlot) -> OperatorConsole<MemorySlot> {
    OperatorConsole::new(
        Game::new(),
        StateStore::new(slot),
        Box::new(SilentCues),
        SmallRng::seed_from_u64(9),
    )
}

#[tokio::test]
async fn every_mutating_command_persists_the_new_state() {
    let slot = MemorySlot::new();
    let mirror = StateStore::new(slot.clone());
    let mut console = console_over(slot);

    console.execute(Command::Randomize).await.unwrap();
    let snapshot = mirror.load().await.unwrap().unwrap();
    assert_eq!(snapshot.phase, Phase::Preparation);

    console.execute(Command::Start).await.unwrap();
    let snapshot = mirror.load().await.unwrap().unwrap();
    assert_eq!(snapshot.phase, Phase::Playing);

    console.execute(Command::Shoot(c("C3"))).await.unwrap();
    let snapshot = mirror.load().await.unwrap().unwrap();
    assert_eq!(snapshot.shot_history.len(), 1);

    console.execute(Command::Undo).await.unwrap();
    let snapshot = mirror.load().await.unwrap().unwrap();
    assert!(snapshot.shot_history.is_empty());

    console.execute(Command::End).await.unwrap();
    let snapshot = mirror.load().await.unwrap().unwrap();
    assert_eq!(snapshot.phase, Phase::Finished);
}

#[tokio::test]
async fn refused_commands_leave_the_slot_untouched() {
    let slot = MemorySlot::new();
    let mirror = StateStore::new(slot.clone());
    let mut console = console_over(slot);

    // start with empty grids: refused, nothing persisted
    console.execute(Command::Start).await.unwrap();
    assert!(mirror.load().await.unwrap().is_none());

    // a shot outside playing: refused, nothing persisted
    console.execute(Command::Shoot(c("A1"))).await.unwrap();
    assert!(mirror.load().await.unwrap().is_none());
}

#[tokio::test]
async fn a_finishing_salvo_runs_cue_then_commits_the_end() {
    let slot = MemorySlot::new();
    let mirror = StateStore::new(slot.clone());
    let mut console = console_over(slot);

    console.execute(Command::Randomize).await.unwrap();
    console.execute(Command::Start).await.unwrap();
    // sweep the whole board; every opposing fleet must fall eventually
    for coord in Coord::all() {
        console.execute(Command::Shoot(coord)).await.unwrap();
        if console.game().phase() == Phase::Finished {
            break;
        }
    }
    assert_eq!(console.game().phase(), Phase::Finished);
    // the deferred finish was persisted too
    let snapshot = mirror.load().await.unwrap().unwrap();
    assert_eq!(snapshot.phase, Phase::Finished);

    console.execute(Command::Reset).await.unwrap();
    let snapshot = mirror.load().await.unwrap().unwrap();
    assert_eq!(snapshot.phase, Phase::Preparation);
    assert!(snapshot.shot_history.is_empty());
}

#[tokio::test]
async fn resume_adopts_the_persisted_game() {
    let slot = MemorySlot::new();
    {
        let mut console = console_over(slot.clone());
        console.execute(Command::Randomize).await.unwrap();
        console.execute(Command::Start).await.unwrap();
        console.execute(Command::Shoot(c("B4"))).await.unwrap();
    }
    let resumed = OperatorConsole::resume_or_new(
        StateStore::new(slot),
        Box::new(SilentCues),
        SmallRng::seed_from_u64(10),
    )
    .await
    .unwrap();
    assert_eq!(resumed.game().phase(), Phase::Playing);
    assert_eq!(resumed.game().history().len(), 1);
}
