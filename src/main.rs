use std::path::PathBuf;

use broadside::{
    init_logging, render_game, FileSlot, Game, OperatorConsole, SilentCues, StateStore,
};

use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};

#[derive(Parser)]
#[command(author, version, about = "Multi-team battleship: operator console and display surfaces sharing one persisted state", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Parser)]
enum Commands {
    /// Run the operator console that owns the authoritative game.
    Operator {
        #[arg(long, default_value = "broadside-state.json")]
        store: PathBuf,
        #[arg(long, help = "Fix RNG seed for reproducible placement (e.g., --seed 12345)")]
        seed: Option<u64>,
    },
    /// Run a passive display that mirrors the persisted game.
    Display {
        #[arg(long, default_value = "broadside-state.json")]
        store: PathBuf,
        #[arg(long, default_value_t = 1000, help = "Polling interval in milliseconds")]
        interval_ms: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Operator { store, seed } => {
            println!("Operator console, state at {}", store.display());
            if let Some(s) = seed {
                println!("Using fixed seed: {} (placement will be reproducible)", s);
            }
            let rng = if let Some(s) = seed {
                SmallRng::seed_from_u64(s)
            } else {
                let mut seed_rng = rand::rng();
                SmallRng::from_rng(&mut seed_rng)
            };
            let store = StateStore::new(FileSlot::new(store));
            let mut console =
                OperatorConsole::resume_or_new(store, Box::new(SilentCues), rng).await?;
            console.run().await
        }
        Commands::Display { store, interval_ms } => {
            println!("Display surface, state at {}", store.display());
            let store = StateStore::new(FileSlot::new(store));
            run_display(store, Duration::from_millis(interval_ms)).await
        }
    }
}

/// Mirror the persisted game: redraw whenever `lastUpdate` advances. Wakes
/// on the in-process change signal and on its polling tick, so it follows
/// consoles in the same process immediately and consoles in other processes
/// within one interval.
async fn run_display(
    store: StateStore<FileSlot>,
    interval: Duration,
) -> anyhow::Result<()> {
    let mut signal: Option<watch::Receiver<()>> = Some(store.subscribe());
    let mut last_seen = 0;
    loop {
        if let Some(snapshot) = store.load().await? {
            if snapshot.last_update != last_seen {
                last_seen = snapshot.last_update;
                let game = Game::from_snapshot(snapshot);
                println!("──────────────────────────────────────────");
                println!("{}", render_game(&game, game.settings().show_boats));
            }
        }
        match signal.as_mut() {
            Some(rx) => {
                tokio::select! {
                    changed = rx.changed() => {
                        // writer gone: fall back to pure polling
                        if changed.is_err() {
                            signal = None;
                        }
                    }
                    _ = sleep(interval) => {}
                }
            }
            None => sleep(interval).await,
        }
    }
}
