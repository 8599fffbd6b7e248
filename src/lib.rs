mod common;
mod config;
pub mod console;
mod coord;
pub mod cue;
mod game;
mod grid;
mod logging;
mod placement;
pub mod render;
mod ship;
pub mod snapshot;
pub mod store;
mod team;

pub use common::*;
pub use config::*;
pub use console::{Command, OperatorConsole};
pub use coord::*;
pub use cue::{CueSink, ShotCue, SilentCues};
pub use game::*;
pub use grid::*;
pub use logging::init_logging;
pub use placement::*;
pub use render::render_game;
pub use ship::*;
pub use snapshot::*;
pub use store::{FileSlot, MemorySlot, Slot, StateStore};
pub use team::*;
