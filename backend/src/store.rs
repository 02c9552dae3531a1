//! Shared game store
//!
//! `GameStore` owns the whole `World` behind one `tokio::sync::RwLock`
//! plus the notice fan-out channel. The locking discipline is the
//! concurrency model of the entire system:
//!
//! - One write-guard scope per logical engine operation. That scope IS
//!   the atomic transaction: every read-modify-write inside it (share
//!   recomputation, defection payout, elimination redistribution) commits
//!   together or not at all.
//! - No `.await` while holding a guard. A suspended task can therefore
//!   never expose a torn intermediate state, and cancelling a loop
//!   between operations cannot corrupt money.
//!
//! With ~10 actors and short operations a coarse lock wins over per-actor
//! locking: there is nothing to shard and no lock-order hazard.

use std::sync::Arc;

use tokio::sync::{broadcast, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::state::World;
use crate::notice::Notice;

const NOTICE_CHANNEL_CAPACITY: usize = 256;

/// Shared handle to the world and the notice bus.
#[derive(Debug)]
pub struct GameStore {
    world: RwLock<World>,
    notices: broadcast::Sender<Notice>,
}

impl GameStore {
    /// Wrap a freshly built world.
    pub fn new(world: World) -> Arc<Self> {
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);
        Arc::new(Self {
            world: RwLock::new(world),
            notices,
        })
    }

    /// Open a read transaction.
    pub async fn read(&self) -> RwLockReadGuard<'_, World> {
        self.world.read().await
    }

    /// Open the write transaction. Hold the guard for exactly one
    /// logical operation and never across an `.await`.
    pub async fn write(&self) -> RwLockWriteGuard<'_, World> {
        self.world.write().await
    }

    /// Subscribe to the notice stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Fire-and-forget notice publication. Engines must not block on
    /// delivery, and "nobody is listening" is not an error.
    pub fn publish(&self, notice: Notice) {
        let _ = self.notices.send(notice);
    }

    /// Current game second as persisted by the scheduler's event loop.
    pub async fn now_secs(&self) -> u64 {
        self.world.read().await.game_state.elapsed_secs
    }

    /// Current game hour as persisted by the scheduler's event loop.
    pub async fn current_hour(&self) -> u32 {
        self.world.read().await.game_state.current_hour
    }
}
