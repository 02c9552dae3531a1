//! Alliance engine
//!
//! Group formation, the pooled treasury with periodic staking yield, and
//! the betrayal state machine: a silent countdown started by
//! `initiate_defection`, an execution that steals most of the treasury,
//! a scheduler sweep that fires matured countdowns, and the emergency
//! majority-vote ejection that can cut a defector off first.
//!
//! Every operation runs inside one store transaction, so a share
//! recomputation always sees a consistent membership snapshot and the
//! defection payout credits every beneficiary atomically.
//!
//! CRITICAL: All money values are i64 (cents)

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::alliance::{Alliance, AllianceMember, AllianceStatus};
use crate::notice::Notice;
use crate::reputation::ReputationEngine;
use crate::store::GameStore;

/// Outcome of one executed defection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefectionResult {
    pub alliance_id: String,
    pub betrayer_id: String,
    pub stolen: i64,
    pub remainder: i64,
    /// beneficiary -> amount; sums exactly to `remainder` when non-empty
    pub distributions: Vec<(String, i64)>,
}

/// Treasury overview for one alliance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreasuryView {
    pub alliance_id: String,
    pub treasury: i64,
    pub shares: Vec<(String, f64, i64)>,
}

/// Engine for alliance lifecycle, treasury, and betrayal.
#[derive(Debug)]
pub struct AllianceEngine {
    store: Arc<GameStore>,
    config: GameConfig,
}

/// Split `total` across `weights` proportionally, assigning the rounding
/// residual to the final recipient so the parts always sum back to the
/// whole. Equal weights are substituted when every weight is zero.
fn split_proportional(total: i64, weights: &[(String, f64)]) -> Vec<(String, i64)> {
    if weights.is_empty() || total <= 0 {
        return Vec::new();
    }
    let weight_sum: f64 = weights.iter().map(|(_, w)| w).sum();
    let mut parts = Vec::with_capacity(weights.len());
    let mut assigned = 0i64;
    for (i, (id, weight)) in weights.iter().enumerate() {
        let amount = if i == weights.len() - 1 {
            total - assigned
        } else if weight_sum > 0.0 {
            (total as f64 * weight / weight_sum).floor() as i64
        } else {
            total / weights.len() as i64
        };
        assigned += amount;
        parts.push((id.clone(), amount));
    }
    parts
}

impl AllianceEngine {
    pub fn new(store: Arc<GameStore>, config: GameConfig) -> Self {
        Self { store, config }
    }

    fn countdown_secs(&self) -> u64 {
        self.config.betrayal_countdown_hours as u64 * 3600
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Found an alliance with the founder as its first member.
    pub async fn create_alliance(&self, founder_id: &str, name: &str) -> EngineResult<Alliance> {
        if name.trim().is_empty() {
            return Err(EngineError::validation("alliance name cannot be empty"));
        }
        let mut world = self.store.write().await;
        if world.active_actor(founder_id).is_none() {
            return Err(EngineError::rule(format!(
                "actor {founder_id} not found or eliminated"
            )));
        }
        let alliance = Alliance::new(
            name.trim().to_string(),
            founder_id.to_string(),
            world.game_state.elapsed_secs,
        );
        let snapshot = alliance.clone();
        world.alliances.insert(alliance.id().to_string(), alliance);
        drop(world);

        self.publish_event(snapshot.id(), "created", Some(founder_id));
        tracing::info!(alliance_id = snapshot.id(), founder_id, "alliance created");
        Ok(snapshot)
    }

    /// Join an active alliance as a new member.
    pub async fn join(&self, alliance_id: &str, actor_id: &str) -> EngineResult<()> {
        let mut world = self.store.write().await;
        if world.active_actor(actor_id).is_none() {
            return Err(EngineError::rule(format!(
                "actor {actor_id} not found or eliminated"
            )));
        }
        let now = world.game_state.elapsed_secs;
        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        if alliance.member(actor_id).is_some() {
            return Err(EngineError::rule("already a member of this alliance"));
        }
        alliance
            .members
            .push(AllianceMember::new(actor_id.to_string(), now));
        alliance.recalculate_shares();
        drop(world);

        self.publish_event(alliance_id, "joined", Some(actor_id));
        Ok(())
    }

    /// Leave an alliance, taking the member's treasury share with them.
    ///
    /// Blocked while the member has a pending defection. Remaining
    /// members' shares are recomputed from the surviving contributions.
    pub async fn leave(&self, alliance_id: &str, actor_id: &str) -> EngineResult<i64> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        let member = alliance
            .member(actor_id)
            .ok_or_else(|| EngineError::rule("not an active member of this alliance"))?;
        if member.defection_initiated_secs.is_some() {
            return Err(EngineError::rule("cannot leave while a defection is pending"));
        }

        let payout = alliance.share_amount(actor_id).min(alliance.treasury);
        alliance.treasury -= payout;

        let member = alliance.member_mut(actor_id).expect("checked above");
        member.active = false;
        member.left_secs = Some(now);
        alliance.recalculate_shares();

        if payout > 0 {
            world
                .actor_mut(actor_id)
                .ok_or_else(|| EngineError::not_found(format!("actor {actor_id}")))?
                .credit(payout);
        }
        drop(world);

        self.publish_event(alliance_id, "left", Some(actor_id));
        tracing::info!(alliance_id, actor_id, payout, "member left alliance");
        Ok(payout)
    }

    /// Founder dissolves the alliance; every active member is paid their
    /// proportional share and the treasury empties.
    pub async fn dissolve(&self, alliance_id: &str, founder_id: &str) -> EngineResult<Vec<(String, i64)>> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        if alliance.founder_id != founder_id {
            return Err(EngineError::rule("only the founder can dissolve the alliance"));
        }

        let weights: Vec<(String, f64)> = alliance
            .active_members()
            .map(|m| (m.actor_id.clone(), m.share_percent))
            .collect();
        let distributions = split_proportional(alliance.treasury, &weights);

        alliance.treasury = 0;
        alliance.status = AllianceStatus::Dissolved { at_secs: now };
        for member in alliance.members.iter_mut().filter(|m| m.active) {
            member.active = false;
            member.left_secs = Some(now);
            member.defection_initiated_secs = None;
        }

        for (actor_id, amount) in &distributions {
            if let Some(actor) = world.actor_mut(actor_id) {
                actor.credit(*amount);
            }
        }
        drop(world);

        self.publish_event(alliance_id, "dissolved", Some(founder_id));
        Ok(distributions)
    }

    // ── Treasury ─────────────────────────────────────────────────────

    /// Contribute credits to the treasury. The flat alliance fee is
    /// skimmed off (burned); the net amount raises both the treasury and
    /// the member's contribution tally, and shares are recomputed.
    pub async fn contribute(
        &self,
        alliance_id: &str,
        actor_id: &str,
        amount: i64,
    ) -> EngineResult<i64> {
        let fee = self.config.alliance_fee;
        if amount <= 0 {
            return Err(EngineError::validation("contribution must be positive"));
        }
        if amount <= fee {
            return Err(EngineError::validation(format!(
                "contribution must exceed the {fee} fee"
            )));
        }

        let mut world = self.store.write().await;
        {
            let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
            if alliance.member(actor_id).is_none() {
                return Err(EngineError::rule("not an active member of this alliance"));
            }
        }
        let actor = world
            .actor_mut(actor_id)
            .filter(|a| a.is_active())
            .ok_or_else(|| EngineError::rule(format!("actor {actor_id} not found or eliminated")))?;
        actor
            .debit(amount)
            .map_err(|e| EngineError::rule(e.to_string()))?;

        let net = amount - fee;
        world.game_state.total_circulation -= fee;
        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        alliance.treasury += net;
        alliance
            .member_mut(actor_id)
            .expect("membership checked above")
            .contribution += net;
        alliance.recalculate_shares();
        let treasury = alliance.treasury;
        drop(world);

        self.publish_event(alliance_id, "contributed", Some(actor_id));
        tracing::info!(alliance_id, actor_id, amount, net, treasury, "treasury contribution");
        Ok(net)
    }

    /// Grow the treasury by the staking rate if it is non-empty and the
    /// cooldown since the last bonus (or creation) has elapsed. The
    /// bonus is minted.
    pub async fn apply_staking_bonus(&self, alliance_id: &str) -> EngineResult<i64> {
        let interval = self.config.staking_interval_hours as u64 * 3600;
        let rate = self.config.staking_bonus_rate;

        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        if alliance.treasury <= 0 {
            return Err(EngineError::rule("treasury is empty; no bonus to apply"));
        }
        let reference = alliance.last_bonus_secs.unwrap_or(alliance.created_secs);
        if now.saturating_sub(reference) < interval {
            return Err(EngineError::rule("staking bonus is on cooldown"));
        }

        let bonus = (alliance.treasury as f64 * rate).round() as i64;
        alliance.treasury += bonus;
        alliance.last_bonus_secs = Some(now);
        world.game_state.total_circulation += bonus;
        drop(world);

        self.publish_event(alliance_id, "staking_bonus", None);
        tracing::info!(alliance_id, bonus, "staking bonus applied");
        Ok(bonus)
    }

    /// Treasury balance with each active member's share breakdown.
    pub async fn treasury_view(&self, alliance_id: &str) -> EngineResult<TreasuryView> {
        let world = self.store.read().await;
        let alliance = world
            .alliances
            .get(alliance_id)
            .ok_or_else(|| EngineError::not_found(format!("alliance {alliance_id}")))?;
        Ok(TreasuryView {
            alliance_id: alliance_id.to_string(),
            treasury: alliance.treasury,
            shares: alliance
                .active_members()
                .map(|m| {
                    (
                        m.actor_id.clone(),
                        m.share_percent,
                        alliance.share_amount(&m.actor_id),
                    )
                })
                .collect(),
        })
    }

    /// All alliances that are still active.
    pub async fn list_active(&self) -> Vec<Alliance> {
        let world = self.store.read().await;
        world
            .alliances
            .values()
            .filter(|a| a.is_active())
            .cloned()
            .collect()
    }

    // ── Betrayal ─────────────────────────────────────────────────────

    /// Start the silent defection countdown. Other members are not
    /// notified; they must discover the pending betrayal themselves.
    pub async fn initiate_defection(&self, alliance_id: &str, actor_id: &str) -> EngineResult<u64> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        let member = alliance
            .member_mut(actor_id)
            .ok_or_else(|| EngineError::rule("not an active member of this alliance"))?;
        if member.defection_initiated_secs.is_some() {
            return Err(EngineError::rule("defection already initiated"));
        }
        member.defection_initiated_secs = Some(now);
        let executes_at = now + self.countdown_secs();
        tracing::info!(alliance_id, actor_id, executes_at, "defection initiated");
        Ok(executes_at)
    }

    /// Cancel a pending defection before the countdown completes.
    pub async fn cancel_defection(&self, alliance_id: &str, actor_id: &str) -> EngineResult<()> {
        let mut world = self.store.write().await;
        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        let member = alliance
            .member_mut(actor_id)
            .ok_or_else(|| EngineError::rule("not an active member of this alliance"))?;
        if member.defection_initiated_secs.take().is_none() {
            return Err(EngineError::rule("no pending defection to cancel"));
        }
        tracing::info!(alliance_id, actor_id, "defection cancelled");
        Ok(())
    }

    /// Execute a matured defection.
    ///
    /// The betrayer takes the steal percentage of the treasury; the
    /// remainder is split among the other active members proportional to
    /// their shares (equal split when all shares are zero, residual to
    /// the last beneficiary so it reconciles exactly). The alliance goes
    /// terminal, every membership deactivates, and the betrayer takes
    /// the betrayal reputation penalty.
    pub async fn execute_defection(
        &self,
        alliance_id: &str,
        actor_id: &str,
    ) -> EngineResult<DefectionResult> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;

        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        let member = alliance
            .member(actor_id)
            .ok_or_else(|| EngineError::rule("not an active member of this alliance"))?;
        let initiated = member
            .defection_initiated_secs
            .ok_or_else(|| EngineError::rule("no pending defection for this actor"))?;
        if now.saturating_sub(initiated) < self.countdown_secs() {
            return Err(EngineError::rule("defection countdown not yet complete"));
        }

        let treasury = alliance.treasury;
        let stolen = (treasury as f64 * self.config.betrayal_steal_percent).round() as i64;
        let remainder = treasury - stolen;

        let weights: Vec<(String, f64)> = alliance
            .active_members()
            .filter(|m| m.actor_id != actor_id)
            .map(|m| (m.actor_id.clone(), m.share_percent))
            .collect();
        let distributions = split_proportional(remainder, &weights);

        alliance.treasury = 0;
        alliance.status = AllianceStatus::Betrayed {
            by: actor_id.to_string(),
            at_secs: now,
        };
        for member in alliance.members.iter_mut().filter(|m| m.active) {
            member.active = false;
            member.left_secs = Some(now);
            member.defection_initiated_secs = None;
        }

        if let Some(betrayer) = world.actor_mut(actor_id) {
            betrayer.credit(stolen);
        }
        for (beneficiary, amount) in &distributions {
            if let Some(actor) = world.actor_mut(beneficiary) {
                actor.credit(*amount);
            }
        }
        if distributions.is_empty() && remainder > 0 {
            // Solo alliance: nobody left to pay, the remainder is burned.
            world.game_state.total_circulation -= remainder;
            tracing::warn!(alliance_id, remainder, "defection remainder burned");
        }

        ReputationEngine::modify_in(&mut world, actor_id, self.config.rep_betrayal, "betrayal")?;
        drop(world);

        self.publish_event(alliance_id, "defection_executed", Some(actor_id));
        tracing::warn!(alliance_id, actor_id, stolen, remainder, "defection executed");
        Ok(DefectionResult {
            alliance_id: alliance_id.to_string(),
            betrayer_id: actor_id.to_string(),
            stolen,
            remainder,
            distributions,
        })
    }

    /// Scan-and-execute sweep over every matured defection countdown.
    ///
    /// Safe to run concurrently with `initiate_defection` and
    /// `cancel_defection`: each execution re-validates the countdown
    /// under the write transaction, and a processed defection clears its
    /// marker so it can never fire twice. One failed item does not stop
    /// the sweep.
    pub async fn check_pending_defections(&self) -> Vec<DefectionResult> {
        let matured: Vec<(String, String)> = {
            let world = self.store.read().await;
            let now = world.game_state.elapsed_secs;
            let countdown = self.countdown_secs();
            world
                .alliances
                .values()
                .filter(|a| a.is_active())
                .flat_map(|a| {
                    a.active_members()
                        .filter(move |m| {
                            m.defection_initiated_secs
                                .is_some_and(|t| now.saturating_sub(t) >= countdown)
                        })
                        .map(move |m| (a.id().to_string(), m.actor_id.clone()))
                })
                .collect()
        };

        let mut executed = Vec::new();
        for (alliance_id, actor_id) in matured {
            match self.execute_defection(&alliance_id, &actor_id).await {
                Ok(result) => executed.push(result),
                // The member may have been ejected or the alliance
                // dissolved between scan and execute; skip and move on.
                Err(err) => {
                    tracing::debug!(%alliance_id, %actor_id, %err, "defection skipped")
                }
            }
        }
        executed
    }

    /// Majority-vote ejection of a member before their defection lands.
    ///
    /// Eligible voters are the active members excluding the target; a
    /// simple majority is required. The ejected member receives only
    /// their raw contribution back, capped at the available treasury.
    pub async fn emergency_eject(
        &self,
        alliance_id: &str,
        target_id: &str,
        voter_ids: &[String],
    ) -> EngineResult<i64> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let alliance = active_alliance_mut(&mut world.alliances, alliance_id)?;
        let target = alliance
            .member(target_id)
            .ok_or_else(|| EngineError::rule("target is not an active member of this alliance"))?;
        let refund = target.contribution.min(alliance.treasury);

        let eligible: Vec<&str> = alliance
            .active_members()
            .filter(|m| m.actor_id != target_id)
            .map(|m| m.actor_id.as_str())
            .collect();
        let valid_votes = voter_ids
            .iter()
            .filter(|v| eligible.contains(&v.as_str()))
            .count();
        let majority = eligible.len() / 2 + 1;
        if valid_votes < majority {
            return Err(EngineError::rule(format!(
                "insufficient votes: {valid_votes}/{majority} needed"
            )));
        }

        alliance.treasury -= refund;
        let member = alliance.member_mut(target_id).expect("checked above");
        member.active = false;
        member.left_secs = Some(now);
        member.defection_initiated_secs = None;
        alliance.recalculate_shares();

        if refund > 0 {
            if let Some(actor) = world.actor_mut(target_id) {
                actor.credit(refund);
            }
        }
        drop(world);

        self.publish_event(alliance_id, "member_ejected", Some(target_id));
        tracing::info!(alliance_id, target_id, refund, valid_votes, "member ejected by vote");
        Ok(refund)
    }

    fn publish_event(&self, alliance_id: &str, event: &str, actor: Option<&str>) {
        self.store.publish(Notice::AllianceEvent {
            alliance_id: alliance_id.to_string(),
            event: event.to_string(),
            actor: actor.map(str::to_string),
        });
    }
}

fn active_alliance_mut<'a>(
    alliances: &'a mut std::collections::BTreeMap<String, Alliance>,
    alliance_id: &str,
) -> EngineResult<&'a mut Alliance> {
    let alliance = alliances
        .get_mut(alliance_id)
        .ok_or_else(|| EngineError::not_found(format!("alliance {alliance_id}")))?;
    if !alliance.is_active() {
        return Err(EngineError::rule(format!(
            "alliance {alliance_id} is not active"
        )));
    }
    Ok(alliance)
}
