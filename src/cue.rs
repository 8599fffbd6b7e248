//! Shot cues: the per-salvo sound effect is an external collaborator. The
//! engine only decides which cue fires; the hosting console waits for the
//! cue to finish before committing a deferred end of game.

use crate::game::ShotReport;

/// Cue for the loudest thing a salvo did: a sunk ship outranks a plain hit,
/// which outranks all-water.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotCue {
    Miss,
    Hit,
    Sunk,
}

impl ShotCue {
    pub fn for_report(report: &ShotReport) -> ShotCue {
        if report.any_sunk {
            ShotCue::Sunk
        } else if report.any_hit {
            ShotCue::Hit
        } else {
            ShotCue::Miss
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShotCue::Miss => "splash",
            ShotCue::Hit => "hit",
            ShotCue::Sunk => "big splash",
        }
    }
}

/// Playback sink. `play` resolving means the effect ran to completion (or
/// was skipped); only then does the console finalize a pending end.
#[async_trait::async_trait]
pub trait CueSink: Send {
    async fn play(&mut self, cue: ShotCue) -> anyhow::Result<()>;
}

/// The no-audio path: every cue completes immediately.
pub struct SilentCues;

#[async_trait::async_trait]
impl CueSink for SilentCues {
    async fn play(&mut self, _cue: ShotCue) -> anyhow::Result<()> {
        Ok(())
    }
}
