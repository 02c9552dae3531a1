//! Covert-market engine
//!
//! The gated underground economy: blackmail (coercion contracts), hit
//! contracts (destruction bounties), tiered intel purchases, and paid
//! vote manipulation. Every operation first checks the game hour against
//! its unlock threshold and fails with a structured "not yet available"
//! reason below it.
//!
//! CRITICAL: All money values are i64 (cents)

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::config::GameConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::contract::{
    BlackmailContract, BlackmailStatus, ContractStatus, HitCondition, HitContract, IntelPurchase,
    ManipulationKind, ManipulationPurchase,
};
use crate::models::social::Comment;
use crate::models::state::World;
use crate::models::trade::TradeStatus;
use crate::notice::Notice;
use crate::reputation::ReputationEngine;
use crate::rng::RngManager;
use crate::store::GameStore;

/// One line of a tier-1 trade summary.
#[derive(Debug, Clone, Serialize)]
pub struct TradeBrief {
    pub counterparty: String,
    pub direction: &'static str,
    pub amount: i64,
    pub status: String,
}

/// Assembled intelligence, one variant per tier.
#[derive(Debug, Clone, Serialize)]
pub enum IntelReport {
    /// Tier 1: trade summary
    TradeSummary {
        total_sent: i64,
        total_received: i64,
        net_flow: i64,
        trades: Vec<TradeBrief>,
    },
    /// Tier 2: full post history including deleted posts, with
    /// contradiction flags
    PostHistory {
        total_posts: usize,
        deleted_count: usize,
        contradictions: Vec<String>,
        posts: Vec<String>,
    },
    /// Tier 3: private message history
    WhisperHistory {
        sent: Vec<String>,
        received: Vec<String>,
        frequent_contacts: Vec<(String, usize)>,
    },
    /// Tier 4: the target's hidden goal
    HiddenGoal { target: String, goal: String },
}

/// Engine for blackmail, hits, intel, and vote manipulation.
#[derive(Debug)]
pub struct CovertMarketEngine {
    store: Arc<GameStore>,
    config: GameConfig,
    rng: Mutex<RngManager>,
}

fn require_unlocked(world: &World, unlock_hour: u32, what: &str) -> EngineResult<()> {
    let hour = world.game_state.current_hour;
    if hour < unlock_hour {
        return Err(EngineError::rule(format!(
            "{what} unlocks at hour {unlock_hour} (current hour: {hour})"
        )));
    }
    Ok(())
}

fn require_active(world: &World, actor_id: &str, role: &str) -> EngineResult<()> {
    match world.actor(actor_id) {
        None => Err(EngineError::not_found(format!("{role} actor {actor_id}"))),
        Some(a) if !a.is_active() => Err(EngineError::rule(format!(
            "{role} actor {actor_id} has been eliminated"
        ))),
        Some(_) => Ok(()),
    }
}

impl CovertMarketEngine {
    pub fn new(store: Arc<GameStore>, config: GameConfig, rng: RngManager) -> Self {
        Self {
            store,
            config,
            rng: Mutex::new(rng),
        }
    }

    // ── Blackmail ────────────────────────────────────────────────────

    /// Create a coercion contract against a target.
    pub async fn create_blackmail(
        &self,
        blackmailer_id: &str,
        target_id: &str,
        demand: i64,
        threat: &str,
        evidence: Option<&str>,
        deadline_hours: u32,
    ) -> EngineResult<BlackmailContract> {
        if blackmailer_id == target_id {
            return Err(EngineError::validation("cannot blackmail yourself"));
        }
        if demand <= 0 {
            return Err(EngineError::validation("demand must be positive"));
        }
        if deadline_hours == 0 {
            return Err(EngineError::validation("deadline must be at least one hour"));
        }
        if threat.trim().is_empty() {
            return Err(EngineError::validation("threat description cannot be empty"));
        }

        let mut world = self.store.write().await;
        require_unlocked(&world, self.config.covert_unlock_hour, "the covert market")?;
        require_active(&world, blackmailer_id, "blackmailer")?;
        require_active(&world, target_id, "target")?;

        let now = world.game_state.elapsed_secs;
        let contract = BlackmailContract::new(
            blackmailer_id.to_string(),
            target_id.to_string(),
            demand,
            threat.trim().to_string(),
            evidence.map(|e| e.trim().to_string()),
            now + deadline_hours as u64 * 3600,
            now,
        );
        let snapshot = contract.clone();
        world.blackmail.insert(contract.id().to_string(), contract);
        drop(world);

        self.publish(
            "blackmail_created",
            blackmailer_id,
            Some(target_id),
        );
        tracing::info!(
            contract_id = snapshot.id(),
            blackmailer_id,
            target_id,
            demand,
            "blackmail contract created"
        );
        Ok(snapshot)
    }

    /// Target pays the demand in full; funds move target -> blackmailer.
    pub async fn pay_blackmail(&self, contract_id: &str, target_id: &str) -> EngineResult<i64> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let contract = world
            .blackmail
            .get(contract_id)
            .ok_or_else(|| EngineError::not_found(format!("blackmail contract {contract_id}")))?;
        if contract.target_id != target_id {
            return Err(EngineError::rule("you are not the target of this blackmail"));
        }
        if !contract.is_active() {
            return Err(EngineError::rule("contract is no longer active"));
        }
        let (demand, blackmailer_id) = (contract.demand, contract.blackmailer_id.clone());

        let target = world
            .actor_mut(target_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {target_id}")))?;
        target
            .debit(demand)
            .map_err(|e| EngineError::rule(e.to_string()))?;
        world
            .actor_mut(&blackmailer_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {blackmailer_id}")))?
            .credit(demand);

        let contract = world.blackmail.get_mut(contract_id).expect("checked above");
        contract.status = BlackmailStatus::Paid { at_secs: now };
        drop(world);

        self.publish("blackmail_paid", target_id, Some(&blackmailer_id));
        tracing::info!(contract_id, target_id, demand, "blackmail paid");
        Ok(demand)
    }

    /// Target ignores the threat; status-only change.
    pub async fn ignore_blackmail(&self, contract_id: &str, target_id: &str) -> EngineResult<()> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let contract = world
            .blackmail
            .get_mut(contract_id)
            .ok_or_else(|| EngineError::not_found(format!("blackmail contract {contract_id}")))?;
        if contract.target_id != target_id {
            return Err(EngineError::rule("you are not the target of this blackmail"));
        }
        if !contract.is_active() {
            return Err(EngineError::rule("contract is no longer active"));
        }
        contract.status = BlackmailStatus::Ignored { at_secs: now };
        tracing::info!(contract_id, target_id, "blackmail ignored");
        Ok(())
    }

    /// Target exposes the attempt publicly; the blackmailer takes the
    /// exposure reputation penalty. No funds move.
    pub async fn expose_blackmail(&self, contract_id: &str, target_id: &str) -> EngineResult<i32> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let contract = world
            .blackmail
            .get_mut(contract_id)
            .ok_or_else(|| EngineError::not_found(format!("blackmail contract {contract_id}")))?;
        if contract.target_id != target_id {
            return Err(EngineError::rule("you are not the target of this blackmail"));
        }
        if !contract.is_active() {
            return Err(EngineError::rule("contract is no longer active"));
        }
        contract.status = BlackmailStatus::Exposed { at_secs: now };
        let blackmailer_id = contract.blackmailer_id.clone();

        let new_rep = ReputationEngine::modify_in(
            &mut world,
            &blackmailer_id,
            self.config.rep_blackmail_exposed,
            "blackmail_exposed",
        )?;
        drop(world);

        self.publish("blackmail_exposed", target_id, Some(&blackmailer_id));
        tracing::info!(contract_id, %blackmailer_id, new_rep, "blackmail exposed");
        Ok(new_rep)
    }

    /// Sweep every active contract past its deadline to `Expired`.
    /// Returns the number of contracts resolved.
    pub async fn sweep_expired_blackmail(&self) -> usize {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let mut expired = 0;
        for contract in world.blackmail.values_mut() {
            if contract.is_active() && contract.deadline_secs <= now {
                contract.status = BlackmailStatus::Expired { at_secs: now };
                expired += 1;
            }
        }
        if expired > 0 {
            tracing::info!(expired, "expired blackmail contracts resolved");
        }
        expired
    }

    /// Active blackmail contracts targeting one actor.
    pub async fn active_blackmail_against(&self, target_id: &str) -> Vec<BlackmailContract> {
        let world = self.store.read().await;
        world
            .blackmail
            .values()
            .filter(|c| c.target_id == target_id && c.is_active())
            .cloned()
            .collect()
    }

    // ── Hit contracts ────────────────────────────────────────────────

    /// Post a hit contract; the reward is escrowed from the poster.
    pub async fn create_hit(
        &self,
        poster_id: &str,
        target_id: &str,
        reward: i64,
        condition: HitCondition,
        condition_text: &str,
        deadline_hours: u32,
    ) -> EngineResult<HitContract> {
        if poster_id == target_id {
            return Err(EngineError::validation(
                "cannot place a hit contract on yourself",
            ));
        }
        if reward <= 0 {
            return Err(EngineError::validation("reward must be positive"));
        }
        if deadline_hours == 0 {
            return Err(EngineError::validation("deadline must be at least one hour"));
        }
        if condition_text.trim().is_empty() {
            return Err(EngineError::validation("condition description cannot be empty"));
        }

        let mut world = self.store.write().await;
        require_unlocked(&world, self.config.covert_unlock_hour, "the covert market")?;
        require_active(&world, poster_id, "poster")?;
        require_active(&world, target_id, "target")?;

        let poster = world.actor_mut(poster_id).expect("checked above");
        poster
            .debit(reward)
            .map_err(|e| EngineError::rule(e.to_string()))?;

        let now = world.game_state.elapsed_secs;
        let contract = HitContract::new(
            poster_id.to_string(),
            target_id.to_string(),
            reward,
            condition,
            condition_text.trim().to_string(),
            now + deadline_hours as u64 * 3600,
            now,
        );
        let snapshot = contract.clone();
        world.hits.insert(contract.id().to_string(), contract);
        drop(world);

        self.publish("hit_posted", poster_id, Some(target_id));
        tracing::info!(
            contract_id = snapshot.id(),
            poster_id,
            target_id,
            reward,
            "hit contract posted"
        );
        Ok(snapshot)
    }

    /// Claim an open hit. The claimer may be neither poster nor target.
    pub async fn claim_hit(&self, contract_id: &str, claimer_id: &str) -> EngineResult<()> {
        let mut world = self.store.write().await;
        let contract = world
            .hits
            .get(contract_id)
            .ok_or_else(|| EngineError::not_found(format!("hit contract {contract_id}")))?;
        if contract.status != ContractStatus::Open {
            return Err(EngineError::rule(format!(
                "contract is not open (status: {})",
                contract.status.label()
            )));
        }
        if contract.poster_id == claimer_id {
            return Err(EngineError::rule("cannot claim your own hit contract"));
        }
        if contract.target_id == claimer_id {
            return Err(EngineError::rule(
                "cannot claim a hit contract targeting yourself",
            ));
        }
        require_active(&world, claimer_id, "claimer")?;

        let contract = world.hits.get_mut(contract_id).expect("checked above");
        contract.status = ContractStatus::Claimed {
            by: claimer_id.to_string(),
        };
        let target_id = contract.target_id.clone();
        drop(world);

        self.publish("hit_claimed", claimer_id, Some(&target_id));
        Ok(())
    }

    /// Complete a claimed hit: the escrowed reward pays the claimer and
    /// the target takes the hit reputation penalty.
    pub async fn complete_hit(&self, contract_id: &str, proof: &str) -> EngineResult<i64> {
        if proof.trim().is_empty() {
            return Err(EngineError::validation("proof of completion cannot be empty"));
        }
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let contract = world
            .hits
            .get(contract_id)
            .ok_or_else(|| EngineError::not_found(format!("hit contract {contract_id}")))?;
        let claimer_id = match contract.claimer() {
            Some(c) => c.to_string(),
            None => {
                return Err(EngineError::rule(format!(
                    "contract must be claimed to complete (status: {})",
                    contract.status.label()
                )))
            }
        };
        let (reward, target_id) = (contract.reward, contract.target_id.clone());

        world
            .actor_mut(&claimer_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {claimer_id}")))?
            .credit(reward);

        let contract = world.hits.get_mut(contract_id).expect("checked above");
        contract.status = ContractStatus::Completed { at_secs: now };
        contract.proof = Some(proof.trim().to_string());

        ReputationEngine::modify_in(
            &mut world,
            &target_id,
            self.config.rep_hit_target,
            "hit_target",
        )?;
        drop(world);

        self.publish("hit_completed", &claimer_id, Some(&target_id));
        tracing::info!(contract_id, %claimer_id, %target_id, reward, "hit contract completed");
        Ok(reward)
    }

    /// Poster cancels an open or claimed hit. The refund is the escrowed
    /// reward minus the cancellation penalty (burned); an existing claim
    /// is forfeited.
    pub async fn cancel_hit(&self, contract_id: &str, poster_id: &str) -> EngineResult<i64> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let contract = world
            .hits
            .get(contract_id)
            .ok_or_else(|| EngineError::not_found(format!("hit contract {contract_id}")))?;
        if contract.poster_id != poster_id {
            return Err(EngineError::rule("only the poster can cancel this contract"));
        }
        if !matches!(
            contract.status,
            ContractStatus::Open | ContractStatus::Claimed { .. }
        ) {
            return Err(EngineError::rule(format!(
                "cannot cancel a contract with status '{}'",
                contract.status.label()
            )));
        }

        let reward = contract.reward;
        let penalty = (reward as f64 * self.config.hit_cancel_penalty).round() as i64;
        let refund = reward - penalty;

        world
            .actor_mut(poster_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {poster_id}")))?
            .credit(refund);
        world.game_state.total_circulation -= penalty;

        let contract = world.hits.get_mut(contract_id).expect("checked above");
        contract.status = ContractStatus::Cancelled { at_secs: now };
        drop(world);

        self.publish("hit_cancelled", poster_id, None);
        tracing::info!(contract_id, poster_id, refund, penalty, "hit contract cancelled");
        Ok(refund)
    }

    /// All open hit contracts.
    pub async fn open_hits(&self) -> Vec<HitContract> {
        let world = self.store.read().await;
        world
            .hits
            .values()
            .filter(|h| h.status == ContractStatus::Open)
            .cloned()
            .collect()
    }

    // ── Intel ────────────────────────────────────────────────────────

    /// Purchase intelligence on a target at the given tier (1-4).
    ///
    /// The fee is debited (and burned) before the read-only assembly
    /// runs, and it is never refunded: a failure to append the purchase
    /// log afterwards leaves the payment in place by design of the
    /// original market - logging is best-effort.
    pub async fn purchase_intel(
        &self,
        buyer_id: &str,
        target_id: &str,
        tier: u8,
    ) -> EngineResult<IntelReport> {
        if buyer_id == target_id {
            return Err(EngineError::validation("cannot purchase intel on yourself"));
        }
        if !(1..=4).contains(&tier) {
            return Err(EngineError::validation(format!(
                "invalid intel tier {tier}; valid tiers: 1-4"
            )));
        }
        let cost = self.config.intel_tier_costs[(tier - 1) as usize];

        // Transaction 1: gate checks and payment.
        {
            let mut world = self.store.write().await;
            require_unlocked(&world, self.config.covert_unlock_hour, "the covert market")?;
            require_active(&world, buyer_id, "buyer")?;
            if world.actor(target_id).is_none() {
                return Err(EngineError::not_found(format!("target actor {target_id}")));
            }
            let buyer = world.actor_mut(buyer_id).expect("checked above");
            buyer
                .debit(cost)
                .map_err(|e| EngineError::rule(e.to_string()))?;
            world.game_state.total_circulation -= cost;
        }

        // Transaction 2: read-only assembly.
        let report = {
            let world = self.store.read().await;
            assemble_intel(&world, target_id, tier)
        };

        // Transaction 3: best-effort purchase log. The payment above is
        // final whether or not this lands.
        {
            let mut world = self.store.write().await;
            let now = world.game_state.elapsed_secs;
            world.intel_log.push(IntelPurchase {
                buyer_id: buyer_id.to_string(),
                target_id: target_id.to_string(),
                tier,
                cost,
                summary: format!("tier {tier} intel on {target_id}"),
                at_secs: now,
            });
        }

        self.publish("intel_purchased", buyer_id, Some(target_id));
        tracing::info!(buyer_id, target_id, tier, cost, "intel purchased");
        Ok(report)
    }

    // ── Vote manipulation ────────────────────────────────────────────

    /// Buy fake votes onto a post. Gated later than the rest of the
    /// covert market. Runs a detection roll; getting caught costs the
    /// fine plus a reputation penalty but the purchase still applies.
    pub async fn buy_fake_votes(
        &self,
        buyer_id: &str,
        post_id: &str,
        upvotes: bool,
        quantity: u32,
    ) -> EngineResult<bool> {
        if quantity == 0 {
            return Err(EngineError::validation("quantity must be positive"));
        }
        let unit = if upvotes {
            self.config.fake_upvote_cost
        } else {
            self.config.fake_downvote_cost
        };
        let kind = if upvotes {
            ManipulationKind::FakeUpvotes
        } else {
            ManipulationKind::FakeDownvotes
        };
        self.manipulation_purchase(buyer_id, Some(post_id), kind, quantity, unit * quantity as i64)
            .await
    }

    /// Buy generated bot comments onto a post.
    pub async fn buy_bot_comments(
        &self,
        buyer_id: &str,
        post_id: &str,
        quantity: u32,
    ) -> EngineResult<bool> {
        if quantity == 0 {
            return Err(EngineError::validation("quantity must be positive"));
        }
        self.manipulation_purchase(
            buyer_id,
            Some(post_id),
            ManipulationKind::BotComments,
            quantity,
            self.config.bot_comment_cost * quantity as i64,
        )
        .await
    }

    /// Buy a trending boost for a post.
    pub async fn buy_trending_boost(&self, buyer_id: &str, post_id: &str) -> EngineResult<bool> {
        self.manipulation_purchase(
            buyer_id,
            Some(post_id),
            ManipulationKind::TrendingBoost,
            1,
            self.config.trending_boost_cost,
        )
        .await
    }

    /// Shared manipulation flow: gate, pay (burn), apply the effect,
    /// roll detection, log. Returns whether the buyer was caught.
    async fn manipulation_purchase(
        &self,
        buyer_id: &str,
        post_id: Option<&str>,
        kind: ManipulationKind,
        quantity: u32,
        cost: i64,
    ) -> EngineResult<bool> {
        let detected = {
            let mut rng = self.rng.lock().expect("rng mutex poisoned");
            rng.chance(self.config.vote_manip_detection)
        };

        let mut world = self.store.write().await;
        require_unlocked(
            &world,
            self.config.vote_manip_unlock_hour,
            "vote manipulation",
        )?;
        require_active(&world, buyer_id, "buyer")?;

        let now = world.game_state.elapsed_secs;
        if let Some(post_id) = post_id {
            if !world.posts.contains_key(post_id) {
                return Err(EngineError::not_found(format!("post {post_id}")));
            }
        }

        let buyer = world.actor_mut(buyer_id).expect("checked above");
        buyer
            .debit(cost)
            .map_err(|e| EngineError::rule(e.to_string()))?;
        world.game_state.total_circulation -= cost;

        if let Some(post_id) = post_id {
            let post = world.posts.get_mut(post_id).expect("checked above");
            match kind {
                ManipulationKind::FakeUpvotes => post.fake_upvotes += quantity,
                ManipulationKind::FakeDownvotes => post.fake_downvotes += quantity,
                ManipulationKind::TrendingBoost => post.trending = true,
                ManipulationKind::BotComments => {
                    for i in 0..quantity {
                        post.comments.push(Comment {
                            author_id: format!("bot-{i}"),
                            content: "interesting take".to_string(),
                            bot: true,
                            created_secs: now,
                        });
                    }
                }
            }
        }

        if detected {
            // The fine takes whatever is left when the balance cannot
            // cover it in full.
            let fine = {
                let buyer = world.actor_mut(buyer_id).expect("checked above");
                let fine = self.config.vote_manip_fine.min(buyer.balance());
                buyer.debit(fine).expect("capped at balance");
                fine
            };
            world.game_state.total_circulation -= fine;
            ReputationEngine::modify_in(
                &mut world,
                buyer_id,
                self.config.rep_vote_manip_caught,
                "vote_manipulation_detected",
            )?;
        }

        world.manipulation_log.push(ManipulationPurchase {
            buyer_id: buyer_id.to_string(),
            post_id: post_id.map(str::to_string),
            kind,
            quantity,
            cost,
            detected,
            at_secs: now,
        });
        drop(world);

        self.publish("vote_manipulation", buyer_id, None);
        tracing::info!(buyer_id, ?kind, quantity, cost, detected, "manipulation purchase");
        Ok(detected)
    }

    fn publish(&self, event: &str, actor: &str, target: Option<&str>) {
        self.store.publish(Notice::CovertEvent {
            event: event.to_string(),
            actor: actor.to_string(),
            target: target.map(str::to_string),
        });
    }
}

/// Build the read-only intel payload for a tier.
fn assemble_intel(world: &World, target_id: &str, tier: u8) -> IntelReport {
    match tier {
        1 => {
            let mut trades: Vec<&crate::models::trade::Trade> = world
                .trades
                .values()
                .filter(|t| t.sender_id == target_id || t.receiver_id == target_id)
                .collect();
            trades.sort_by(|a, b| b.created_secs.cmp(&a.created_secs));
            trades.truncate(50);

            let mut total_sent = 0;
            let mut total_received = 0;
            let briefs = trades
                .iter()
                .map(|t| {
                    let sent = t.sender_id == target_id;
                    if t.status == TradeStatus::Pending || matches!(t.status, TradeStatus::Completed { .. }) {
                        if sent {
                            total_sent += t.amount;
                        } else {
                            total_received += t.amount;
                        }
                    }
                    TradeBrief {
                        counterparty: if sent {
                            t.receiver_id.clone()
                        } else {
                            t.sender_id.clone()
                        },
                        direction: if sent { "sent" } else { "received" },
                        amount: t.amount,
                        status: format!("{:?}", t.status),
                    }
                })
                .collect();
            IntelReport::TradeSummary {
                total_sent,
                total_received,
                net_flow: total_received - total_sent,
                trades: briefs,
            }
        }
        2 => {
            let posts: Vec<&crate::models::social::Post> = world
                .posts
                .values()
                .filter(|p| p.author_id == target_id)
                .collect();
            let deleted_count = posts.iter().filter(|p| p.deleted).count();
            let mut contradictions = Vec::new();
            if deleted_count > 0 && posts.len() > deleted_count {
                contradictions.push(format!(
                    "{deleted_count} deleted post(s) may contradict the public record"
                ));
            }
            let has_accusation = posts
                .iter()
                .any(|p| p.kind == crate::models::social::PostKind::Accusation);
            let has_confession = posts
                .iter()
                .any(|p| p.kind == crate::models::social::PostKind::Confession);
            if has_accusation && has_confession {
                contradictions
                    .push("has published both accusations and confessions".to_string());
            }
            IntelReport::PostHistory {
                total_posts: posts.len(),
                deleted_count,
                contradictions,
                posts: posts.iter().map(|p| p.content.clone()).collect(),
            }
        }
        3 => {
            let mut contacts: std::collections::BTreeMap<String, usize> =
                std::collections::BTreeMap::new();
            let mut sent = Vec::new();
            let mut received = Vec::new();
            for w in &world.whispers {
                if w.sender_id == target_id {
                    sent.push(w.content.clone());
                    *contacts.entry(w.receiver_id.clone()).or_default() += 1;
                } else if w.receiver_id == target_id {
                    received.push(w.content.clone());
                    *contacts.entry(w.sender_id.clone()).or_default() += 1;
                }
            }
            let mut frequent: Vec<(String, usize)> = contacts.into_iter().collect();
            frequent.sort_by(|a, b| b.1.cmp(&a.1));
            IntelReport::WhisperHistory {
                sent,
                received,
                frequent_contacts: frequent,
            }
        }
        _ => IntelReport::HiddenGoal {
            target: target_id.to_string(),
            goal: world
                .actor(target_id)
                .map(|a| a.hidden_goal.clone())
                .unwrap_or_default(),
        },
    }
}
