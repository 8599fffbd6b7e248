//! The shared persisted slot and the state store over it.
//!
//! Every mutation ends with a full-state write plus a payload-free change
//! signal; readers reload wholesale when signaled, on their own polling
//! cadence, or both. Writes are last-write-wins at full-state granularity:
//! two consoles racing on one slot silently keep only the later image. That
//! limitation is part of the protocol, kept visible here rather than hidden
//! behind merge logic.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use log::{debug, warn};
use tokio::sync::watch;

use crate::game::Game;
use crate::snapshot::GameSnapshot;

/// A shared persisted byte cell plus its change signal.
///
/// The signal carries no payload; a woken subscriber reads the slot to see
/// what changed. How far the signal travels depends on the implementation.
#[async_trait::async_trait]
pub trait Slot: Send + Sync {
    /// Replace the slot's contents.
    async fn write(&self, bytes: Vec<u8>) -> anyhow::Result<()>;

    /// Current contents, `None` before the first write.
    async fn read(&self) -> anyhow::Result<Option<Vec<u8>>>;

    /// Receiver woken after every write.
    fn subscribe(&self) -> watch::Receiver<()>;
}

/// In-process slot shared by cloning. The signal reaches every clone, so
/// console and display instances in one process stay in lockstep.
#[derive(Clone)]
pub struct MemorySlot {
    bytes: Arc<Mutex<Option<Vec<u8>>>>,
    tx: Arc<watch::Sender<()>>,
}

impl MemorySlot {
    pub fn new() -> MemorySlot {
        let (tx, _) = watch::channel(());
        MemorySlot {
            bytes: Arc::new(Mutex::new(None)),
            tx: Arc::new(tx),
        }
    }
}

impl Default for MemorySlot {
    fn default() -> MemorySlot {
        MemorySlot::new()
    }
}

#[async_trait::async_trait]
impl Slot for MemorySlot {
    async fn write(&self, bytes: Vec<u8>) -> anyhow::Result<()> {
        *self.bytes.lock().unwrap() = Some(bytes);
        self.tx.send_replace(());
        Ok(())
    }

    async fn read(&self) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.bytes.lock().unwrap().clone())
    }

    fn subscribe(&self) -> watch::Receiver<()> {
        self.tx.subscribe()
    }
}

/// File-backed slot for cross-process sync. Writes go to a temp file first
/// and land by rename, so a reader never observes a torn image. The change
/// signal only reaches subscribers inside the writing process; separate
/// processes poll the file instead.
pub struct FileSlot {
    path: PathBuf,
    tx: Arc<watch::Sender<()>>,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> FileSlot {
        let (tx, _) = watch::channel(());
        FileSlot {
            path: path.into(),
            tx: Arc::new(tx),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl Slot for FileSlot {
    async fn write(&self, bytes: Vec<u8>) -> anyhow::Result<()> {
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;
        self.tx.send_replace(());
        Ok(())
    }

    async fn read(&self) -> anyhow::Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", self.path.display())),
        }
    }

    fn subscribe(&self) -> watch::Receiver<()> {
        self.tx.subscribe()
    }
}

/// Persistence facade the hosting console drives: serialize, write, signal
/// after every mutation; forced wholesale reload on demand.
pub struct StateStore<S: Slot> {
    slot: S,
}

impl<S: Slot> StateStore<S> {
    pub fn new(slot: S) -> StateStore<S> {
        StateStore { slot }
    }

    /// Serialize the full game into the slot and signal the change.
    /// Returns the persisted `lastUpdate` stamp.
    pub async fn persist(&self, game: &Game) -> anyhow::Result<u64> {
        let snapshot = game.snapshot();
        let bytes = serde_json::to_vec(&snapshot).context("serializing game state")?;
        self.slot.write(bytes).await?;
        debug!("state persisted (lastUpdate {})", snapshot.last_update);
        Ok(snapshot.last_update)
    }

    /// Reload the authoritative state. Missing or unreadable contents mean
    /// "no prior state": logged, never fatal.
    pub async fn load(&self) -> anyhow::Result<Option<GameSnapshot>> {
        let Some(bytes) = self.slot.read().await? else {
            return Ok(None);
        };
        match serde_json::from_slice(&bytes) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                warn!("persisted state unreadable, treating as absent: {}", e);
                Ok(None)
            }
        }
    }

    /// Change signal. A woken receiver calls [`StateStore::load`]; whether
    /// it also polls between signals is its own choice.
    pub fn subscribe(&self) -> watch::Receiver<()> {
        self.slot.subscribe()
    }
}
