//! Reputation engine
//!
//! The single mutation path for reputation. `modify_in` reads the current
//! value, clamps `current + delta` to [0, 100], and writes the change-log
//! row together with the new value inside the caller's transaction, so
//! every reputation change in the whole system is logged with a reason.
//!
//! Other engines never touch `Actor::set_reputation` directly; they call
//! `modify_in` from inside their own write transaction, or `modify` when
//! standing alone.

use std::sync::Arc;

use crate::errors::{EngineError, EngineResult};
use crate::models::actor::ReputationChange;
use crate::models::state::World;
use crate::store::GameStore;

/// Engine owning the reputation mutation path.
#[derive(Debug)]
pub struct ReputationEngine {
    store: Arc<GameStore>,
}

impl ReputationEngine {
    pub fn new(store: Arc<GameStore>) -> Self {
        Self { store }
    }

    /// Apply a clamped reputation delta inside an open transaction.
    ///
    /// Returns the new value. This is the only place reputation is
    /// written, which is what makes the change log complete.
    pub(crate) fn modify_in(
        world: &mut World,
        actor_id: &str,
        delta: i32,
        reason: &str,
    ) -> EngineResult<i32> {
        let now = world.game_state.elapsed_secs;
        let actor = world
            .actor_mut(actor_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {actor_id}")))?;
        let old_value = actor.reputation();
        let new_value = (old_value + delta).clamp(0, 100);
        actor.set_reputation(new_value);
        world.reputation_log.push(ReputationChange {
            actor_id: actor_id.to_string(),
            delta,
            reason: reason.to_string(),
            new_value,
            at_secs: now,
        });
        tracing::info!(actor_id, old_value, new_value, delta, reason, "reputation changed");
        Ok(new_value)
    }

    /// Standalone reputation change in its own transaction.
    pub async fn modify(&self, actor_id: &str, delta: i32, reason: &str) -> EngineResult<i32> {
        let mut world = self.store.write().await;
        Self::modify_in(&mut world, actor_id, delta, reason)
    }

    /// Current reputation for an actor.
    pub async fn reputation_of(&self, actor_id: &str) -> EngineResult<i32> {
        let world = self.store.read().await;
        world
            .actor(actor_id)
            .map(|a| a.reputation())
            .ok_or_else(|| EngineError::not_found(format!("actor {actor_id}")))
    }

    /// Most recent reputation changes for an actor, newest first.
    pub async fn history(&self, actor_id: &str, limit: usize) -> Vec<ReputationChange> {
        let world = self.store.read().await;
        world
            .reputation_log
            .iter()
            .rev()
            .filter(|c| c.actor_id == actor_id)
            .take(limit)
            .cloned()
            .collect()
    }
}
