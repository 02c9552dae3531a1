//! Events & elimination engine
//!
//! Scheduled disruption events, the periodic elimination of the weakest
//! actor with redistribution to the leaders, the community tribunal, and
//! rank snapshots.
//!
//! The engine marks an event triggered (at most once) and returns its
//! payload; it never moves the price itself - applying impacts is the
//! scheduler's job, which dispatches to the market engine. The margin
//! call likewise delegates to the trading engine.
//!
//! CRITICAL: All money values are i64 (cents)

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::event::{
    Elimination, EventKind, RankSnapshot, SnapshotEntry, SystemEvent, TribunalVote,
};
use crate::notice::Notice;
use crate::reputation::ReputationEngine;
use crate::store::GameStore;

/// Outcome of a resolved tribunal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TribunalOutcome {
    pub target_id: String,
    pub votes: usize,
    pub penalty: i64,
    /// voter -> share of the penalty; sums exactly to `penalty` when
    /// non-empty
    pub redistribution: Vec<(String, i64)>,
}

/// Engine for scripted events, eliminations, tribunals, and snapshots.
#[derive(Debug)]
pub struct EventsEngine {
    store: Arc<GameStore>,
    config: GameConfig,
}

impl EventsEngine {
    pub fn new(store: Arc<GameStore>, config: GameConfig) -> Self {
        Self { store, config }
    }

    // ── Scripted events ──────────────────────────────────────────────

    /// The standard event catalogue for a full-length run. Headline
    /// impact percentages are what observers see; the market engine
    /// clamps each application to its per-shock cap.
    fn catalogue() -> Vec<SystemEvent> {
        vec![
            SystemEvent::new(
                EventKind::WhaleAlert,
                3,
                "WHALE ALERT: unknown wallet purchased a large block",
                Some(0.33),
                Some(20),
            ),
            SystemEvent::new(
                EventKind::FlashCrash,
                7,
                "MARKET SELL-OFF DETECTED",
                Some(-0.55),
                Some(10),
            ),
            SystemEvent::new(
                EventKind::SecurityBreach,
                9,
                "TRADING PAUSED: investigating unauthorized network access",
                None,
                Some(30),
            ),
            SystemEvent::new(
                EventKind::Tribunal,
                12,
                "COMMUNITY VOTE: who deserves an immediate penalty?",
                None,
                Some(30),
            ),
            SystemEvent::new(
                EventKind::Gaslighting,
                14,
                "Dashboard display glitch for a targeted actor",
                None,
                Some(60),
            ),
            SystemEvent::new(
                EventKind::FeeIncrease,
                15,
                "Network congestion: transaction fees increased",
                Some(-0.05),
                None,
            ),
            SystemEvent::new(
                EventKind::MarginCall,
                19,
                "All leverage positions force-liquidated by risk management",
                Some(-0.25),
                Some(15),
            ),
            SystemEvent::new(
                EventKind::FinalPump,
                22,
                "Exchange listing confirmed: major announcement imminent",
                Some(0.77),
                Some(60),
            ),
            SystemEvent::new(
                EventKind::FakeLeak,
                23,
                "ADMIN NOTE: public launch cancelled, the token is worthless",
                Some(-0.15),
                Some(30),
            ),
        ]
    }

    /// Seed the scheduled catalogue at game start. Does nothing when
    /// events already exist, so a restart cannot double-seed.
    pub async fn seed_events(&self) {
        let mut world = self.store.write().await;
        if world.events.is_empty() {
            world.events = Self::catalogue();
            tracing::info!(count = world.events.len(), "event catalogue seeded");
        }
    }

    /// Schedule an ad-hoc event.
    pub async fn create_custom_event(
        &self,
        description: &str,
        trigger_hour: u32,
        price_impact: Option<f64>,
        duration_minutes: Option<u32>,
    ) -> EngineResult<SystemEvent> {
        if description.trim().is_empty() {
            return Err(EngineError::validation("event description cannot be empty"));
        }
        let mut world = self.store.write().await;
        let event = SystemEvent::new(
            EventKind::Custom,
            trigger_hour,
            description.trim(),
            price_impact,
            duration_minutes,
        );
        let snapshot = event.clone();
        world.events.push(event);
        Ok(snapshot)
    }

    /// Events due at or before `hour` that have not fired yet.
    pub async fn pending_events(&self, hour: u32) -> Vec<SystemEvent> {
        let world = self.store.read().await;
        let mut due: Vec<SystemEvent> = world
            .events
            .iter()
            .filter(|e| !e.triggered && e.trigger_hour <= hour)
            .cloned()
            .collect();
        due.sort_by_key(|e| e.trigger_hour);
        due
    }

    /// Mark an event triggered and return its payload for the caller to
    /// apply. A triggered event can never fire again: the marker is
    /// checked and set in the same transaction.
    pub async fn trigger_event(&self, event_id: &str) -> EngineResult<SystemEvent> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let event = world
            .events
            .iter_mut()
            .find(|e| e.id() == event_id)
            .ok_or_else(|| EngineError::not_found(format!("event {event_id}")))?;
        if event.triggered {
            return Err(EngineError::rule("event already triggered"));
        }
        event.triggered = true;
        event.triggered_at_secs = Some(now);
        Ok(event.clone())
    }

    /// Full event history.
    pub async fn event_history(&self) -> Vec<SystemEvent> {
        self.store.read().await.events.clone()
    }

    // ── Elimination ──────────────────────────────────────────────────

    /// Run the elimination checkpoint for `hour`.
    ///
    /// Returns `Ok(None)` when `hour` is not a checkpoint or this
    /// checkpoint has already been processed - re-invocation is a no-op,
    /// the processed marker (the recorded `Elimination` row) is checked
    /// and written in the same transaction as the effect.
    pub async fn run_elimination(&self, hour: u32) -> EngineResult<Option<Elimination>> {
        if !self.config.elimination_hours.contains(&hour) {
            return Ok(None);
        }
        let mut world = self.store.write().await;
        if world.eliminations.iter().any(|e| e.hour == hour) {
            return Ok(None);
        }

        // Lowest balance, ties broken by lowest reputation, then id.
        let victim_id = match world
            .active_actors()
            .min_by(|a, b| {
                a.balance()
                    .cmp(&b.balance())
                    .then(a.reputation().cmp(&b.reputation()))
                    .then(a.id().cmp(b.id()))
            })
            .map(|a| a.id().to_string())
        {
            Some(id) => id,
            None => return Err(EngineError::rule("no actors left to eliminate")),
        };

        let elimination = Self::eliminate_in(
            &mut world,
            &victim_id,
            hour,
            self.config.redistribution_top_n,
        )?;
        drop(world);

        self.store.publish(Notice::Elimination {
            actor: elimination.actor_id.clone(),
            hour,
            final_balance: elimination.final_balance,
        });
        tracing::warn!(
            victim = %elimination.actor_id,
            hour,
            final_balance = elimination.final_balance,
            "actor eliminated"
        );
        Ok(Some(elimination))
    }

    /// Admin path: eliminate a named actor immediately with the same
    /// redistribution rules as an organic checkpoint.
    pub async fn force_eliminate(&self, actor_id: &str, hour: u32) -> EngineResult<Elimination> {
        let mut world = self.store.write().await;
        let elimination = Self::eliminate_in(
            &mut world,
            actor_id,
            hour,
            self.config.redistribution_top_n,
        )?;
        drop(world);

        self.store.publish(Notice::Elimination {
            actor: elimination.actor_id.clone(),
            hour,
            final_balance: elimination.final_balance,
        });
        Ok(elimination)
    }

    fn eliminate_in(
        world: &mut crate::models::state::World,
        victim_id: &str,
        hour: u32,
        top_n: usize,
    ) -> EngineResult<Elimination> {
        let victim = world
            .active_actor(victim_id)
            .ok_or_else(|| EngineError::rule(format!("actor {victim_id} not found or eliminated")))?;
        let final_balance = victim.balance();
        let final_reputation = victim.reputation();

        // Top N remaining actors split the balance evenly; the rounding
        // residual goes to the leader so the split reconciles exactly.
        let recipients: Vec<String> = world
            .leaderboard()
            .into_iter()
            .filter(|a| a.id() != victim_id)
            .take(top_n)
            .map(|a| a.id().to_string())
            .collect();

        let mut redistribution = Vec::new();
        if !recipients.is_empty() && final_balance > 0 {
            let share = final_balance / recipients.len() as i64;
            let residual = final_balance - share * recipients.len() as i64;
            for (i, recipient) in recipients.iter().enumerate() {
                let amount = if i == 0 { share + residual } else { share };
                world
                    .actor_mut(recipient)
                    .expect("leaderboard entries exist")
                    .credit(amount);
                redistribution.push((recipient.clone(), amount));
            }
        } else if final_balance > 0 {
            // Nobody left to inherit; the balance leaves the economy.
            world.game_state.total_circulation -= final_balance;
        }

        world
            .actor_mut(victim_id)
            .expect("checked above")
            .eliminate(hour);
        world.game_state.actors_remaining = world.active_actors().count();

        let elimination = Elimination {
            actor_id: victim_id.to_string(),
            hour,
            final_balance,
            final_reputation,
            redistribution,
        };
        world.eliminations.push(elimination.clone());
        Ok(elimination)
    }

    /// All recorded eliminations in checkpoint order.
    pub async fn elimination_history(&self) -> Vec<Elimination> {
        self.store.read().await.eliminations.clone()
    }

    // ── Tribunal ─────────────────────────────────────────────────────

    /// Cast one tribunal vote. Each actor votes at most once per
    /// tribunal window, self-votes are rejected.
    pub async fn cast_tribunal_vote(
        &self,
        voter_id: &str,
        target_id: &str,
        hour: u32,
        reason: Option<&str>,
    ) -> EngineResult<()> {
        if voter_id == target_id {
            return Err(EngineError::validation("cannot vote for yourself"));
        }
        let mut world = self.store.write().await;
        if world.active_actor(voter_id).is_none() {
            return Err(EngineError::rule(format!(
                "actor {voter_id} not found or eliminated"
            )));
        }
        if world.actor(target_id).is_none() {
            return Err(EngineError::not_found(format!("target actor {target_id}")));
        }
        if world
            .tribunal_votes
            .iter()
            .any(|v| v.voter_id == voter_id && v.hour == hour)
        {
            return Err(EngineError::rule("already voted in this tribunal"));
        }
        world.tribunal_votes.push(TribunalVote {
            voter_id: voter_id.to_string(),
            target_id: target_id.to_string(),
            reason: reason.map(str::to_string),
            hour,
        });
        Ok(())
    }

    /// Resolve the tribunal for `hour`: the most-voted target loses half
    /// their balance (reputation zeroed) and the penalty is split evenly
    /// among the voters who are still active. Returns `Ok(None)` when no
    /// votes were cast.
    pub async fn resolve_tribunal(&self, hour: u32) -> EngineResult<Option<TribunalOutcome>> {
        let mut world = self.store.write().await;

        let mut counts: std::collections::BTreeMap<String, usize> =
            std::collections::BTreeMap::new();
        for vote in world.tribunal_votes.iter().filter(|v| v.hour == hour) {
            *counts.entry(vote.target_id.clone()).or_default() += 1;
        }
        // Most votes wins; on a tie the first key in BTreeMap order
        // (lowest id) keeps the slot, which keeps resolution
        // deterministic.
        let mut best: Option<(String, usize)> = None;
        for (id, count) in &counts {
            let replace = match &best {
                None => true,
                Some((_, current)) => *count > *current,
            };
            if replace {
                best = Some((id.clone(), *count));
            }
        }
        let (target_id, votes) = match best {
            Some(winner) => winner,
            None => return Ok(None),
        };

        let target = world
            .actor(&target_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {target_id}")))?;
        let penalty = target.balance() / 2;
        let target_rep = target.reputation();

        world
            .actor_mut(&target_id)
            .expect("checked above")
            .debit(penalty)
            .map_err(|e| EngineError::Fault(e.to_string()))?;
        ReputationEngine::modify_in(&mut world, &target_id, -target_rep, "tribunal_guilty")?;

        let voters: Vec<String> = world
            .tribunal_votes
            .iter()
            .filter(|v| v.hour == hour)
            .map(|v| v.voter_id.clone())
            .filter(|v| world.active_actor(v).is_some())
            .collect();

        let mut redistribution = Vec::new();
        if !voters.is_empty() && penalty > 0 {
            let share = penalty / voters.len() as i64;
            let residual = penalty - share * voters.len() as i64;
            for (i, voter) in voters.iter().enumerate() {
                let amount = if i == 0 { share + residual } else { share };
                world
                    .actor_mut(voter)
                    .expect("filtered to active")
                    .credit(amount);
                redistribution.push((voter.clone(), amount));
            }
        } else if penalty > 0 {
            world.game_state.total_circulation -= penalty;
            tracing::warn!(hour, penalty, "tribunal penalty burned: no active voters");
        }
        drop(world);

        self.store.publish(Notice::TribunalResolved {
            target: target_id.clone(),
            votes,
            penalty,
        });
        tracing::warn!(%target_id, votes, penalty, "tribunal resolved");
        Ok(Some(TribunalOutcome {
            target_id,
            votes,
            penalty,
            redistribution,
        }))
    }

    // ── Fees & snapshots ─────────────────────────────────────────────

    /// Raise (or lower) the live trade fee. Used by the fee-increase
    /// event and the admin surface.
    pub async fn set_fee_rate(&self, fee: i64) -> EngineResult<()> {
        if fee < 0 {
            return Err(EngineError::validation("fee cannot be negative"));
        }
        let mut world = self.store.write().await;
        world.game_state.fee_rate = fee;
        tracing::info!(fee, "trade fee updated");
        Ok(())
    }

    /// Record a ranked balance/reputation snapshot of all active actors.
    pub async fn take_snapshot(&self, hour: u32) -> RankSnapshot {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let entries: Vec<SnapshotEntry> = world
            .leaderboard()
            .into_iter()
            .enumerate()
            .map(|(i, actor)| SnapshotEntry {
                actor_id: actor.id().to_string(),
                balance: actor.balance(),
                reputation: actor.reputation(),
                rank: i + 1,
            })
            .collect();
        let snapshot = RankSnapshot::new(hour, now, entries);
        world.snapshots.push(snapshot.clone());
        snapshot
    }
}
