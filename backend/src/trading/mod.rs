//! Trading engine
//!
//! All direct economic interactions between actors: peer-to-peer trade
//! offers, tipping, leveraged directional bets, and open bounties, plus
//! the admin-facing balance adjustment and the leaderboard query.
//!
//! Escrow discipline: whatever leaves a balance at creation time (bounty
//! rewards, leverage stakes) is reflected later as exactly one credit to
//! a recipient, one refund, or an explicit burn. Fees are burns: they
//! reduce `total_circulation` and disappear from the economy.
//!
//! CRITICAL: All money values are i64 (cents)

use std::sync::Arc;

use serde::Serialize;

use crate::config::GameConfig;
use crate::errors::{EngineError, EngineResult};
use crate::models::actor::reputation_badge;
use crate::models::contract::{Bounty, ContractStatus};
use crate::models::leverage::{LeverageDirection, LeveragePosition, LeverageStatus};
use crate::models::state::World;
use crate::models::trade::{Trade, TradeStatus};
use crate::notice::Notice;
use crate::reputation::ReputationEngine;
use crate::store::GameStore;

/// One leaderboard row.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub actor_id: String,
    pub balance: i64,
    pub reputation: i32,
    pub badge: &'static str,
    pub total_trades: u32,
}

/// Outcome of settling one leverage position.
#[derive(Debug, Clone)]
pub struct SettlementResult {
    pub position: LeveragePosition,
    pub payout: i64,
}

/// Engine for trades, tips, leverage, and bounties.
#[derive(Debug)]
pub struct TradingEngine {
    store: Arc<GameStore>,
    config: GameConfig,
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

impl TradingEngine {
    pub fn new(store: Arc<GameStore>, config: GameConfig) -> Self {
        Self { store, config }
    }

    // ── P2P trading ──────────────────────────────────────────────────

    /// Create a pending trade offer. No funds move until acceptance.
    pub async fn create_trade_offer(
        &self,
        sender_id: &str,
        receiver_id: &str,
        amount: i64,
        price: f64,
    ) -> EngineResult<Trade> {
        if sender_id == receiver_id {
            return Err(EngineError::validation("cannot trade with yourself"));
        }
        if amount <= 0 {
            return Err(EngineError::validation("trade amount must be positive"));
        }
        if price <= 0.0 {
            return Err(EngineError::validation("price must be positive"));
        }

        let mut world = self.store.write().await;
        require_active(&world, sender_id, "sender")?;
        require_active(&world, receiver_id, "receiver")?;
        if world.game_state.trading_frozen {
            return Err(EngineError::rule("trading is currently frozen"));
        }

        let fee = world.game_state.fee_rate;
        let sender = world.actor(sender_id).expect("checked above");
        if !sender.can_pay(amount + fee) {
            return Err(EngineError::rule(format!(
                "sender has {} but needs {} (amount + fee)",
                sender.balance(),
                amount + fee
            )));
        }

        let trade = Trade::new(
            sender_id.to_string(),
            receiver_id.to_string(),
            amount,
            price,
            fee,
            world.game_state.elapsed_secs,
        );
        let snapshot = trade.clone();
        world.trades.insert(trade.id().to_string(), trade);
        drop(world);

        self.store.publish(Notice::TradeOffered {
            trade_id: snapshot.id().to_string(),
            sender: snapshot.sender_id.clone(),
            receiver: snapshot.receiver_id.clone(),
            amount: snapshot.amount,
        });
        tracing::info!(
            trade_id = snapshot.id(),
            sender_id,
            receiver_id,
            amount,
            "trade offer created"
        );
        Ok(snapshot)
    }

    /// Receiver accepts a pending trade.
    ///
    /// Atomically debits the sender `amount + fee`, credits the receiver
    /// `amount`, and bumps both trade counters. Fails cleanly - with no
    /// partial debit - if the sender's balance moved since the offer.
    pub async fn accept_trade(&self, trade_id: &str, actor_id: &str) -> EngineResult<Trade> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;

        let trade = world
            .trades
            .get(trade_id)
            .ok_or_else(|| EngineError::not_found(format!("trade {trade_id}")))?;
        if trade.status != TradeStatus::Pending {
            return Err(EngineError::rule(format!("trade {trade_id} is not pending")));
        }
        if trade.receiver_id != actor_id {
            return Err(EngineError::rule(format!(
                "actor {actor_id} is not the receiver of trade {trade_id}"
            )));
        }

        let (sender_id, receiver_id, amount, fee) = (
            trade.sender_id.clone(),
            trade.receiver_id.clone(),
            trade.amount,
            trade.fee,
        );
        require_active(&world, &sender_id, "sender")?;
        require_active(&world, &receiver_id, "receiver")?;

        // Balance re-check: another operation may have drained the sender
        // between offer and accept.
        let sender = world.actor_mut(&sender_id).expect("checked above");
        sender
            .debit(amount + fee)
            .map_err(|e| EngineError::rule(e.to_string()))?;
        sender.total_trades += 1;

        let receiver = world
            .actor_mut(&receiver_id)
            .ok_or_else(|| EngineError::not_found(format!("receiver actor {receiver_id}")))?;
        receiver.credit(amount);
        receiver.total_trades += 1;

        world.game_state.total_circulation -= fee;
        let trade = world.trades.get_mut(trade_id).expect("checked above");
        trade.status = TradeStatus::Completed { at_secs: now };
        let snapshot = trade.clone();
        drop(world);

        self.store.publish(Notice::TradeCompleted {
            trade_id: trade_id.to_string(),
            sender: snapshot.sender_id.clone(),
            receiver: snapshot.receiver_id.clone(),
            amount: snapshot.amount,
            fee: snapshot.fee,
        });
        tracing::info!(trade_id, amount, fee, "trade accepted");
        Ok(snapshot)
    }

    /// Receiver declines a pending trade. No balances are touched.
    pub async fn reject_trade(&self, trade_id: &str, actor_id: &str) -> EngineResult<Trade> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let trade = world
            .trades
            .get_mut(trade_id)
            .ok_or_else(|| EngineError::not_found(format!("trade {trade_id}")))?;
        if trade.status != TradeStatus::Pending {
            return Err(EngineError::rule(format!("trade {trade_id} is not pending")));
        }
        if trade.receiver_id != actor_id {
            return Err(EngineError::rule(format!(
                "actor {actor_id} is not the receiver of trade {trade_id}"
            )));
        }
        trade.status = TradeStatus::Rejected { at_secs: now };
        let snapshot = trade.clone();
        tracing::info!(trade_id, actor_id, "trade rejected");
        Ok(snapshot)
    }

    /// Mark a pending trade as a scam.
    ///
    /// The sender simply never pays: no funds move, the trade goes
    /// terminal, and the sender takes the scam reputation penalty.
    pub async fn mark_scam(&self, trade_id: &str) -> EngineResult<Trade> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let trade = world
            .trades
            .get_mut(trade_id)
            .ok_or_else(|| EngineError::not_found(format!("trade {trade_id}")))?;
        if trade.status != TradeStatus::Pending {
            return Err(EngineError::rule(format!("trade {trade_id} is not pending")));
        }
        trade.status = TradeStatus::Scam { at_secs: now };
        let snapshot = trade.clone();

        ReputationEngine::modify_in(
            &mut world,
            &snapshot.sender_id,
            self.config.rep_scam_confirmed,
            "scam_confirmed",
        )?;
        drop(world);

        self.store.publish(Notice::TradeScam {
            trade_id: trade_id.to_string(),
            scammer: snapshot.sender_id.clone(),
            victim: snapshot.receiver_id.clone(),
        });
        tracing::warn!(
            trade_id,
            scammer = %snapshot.sender_id,
            victim = %snapshot.receiver_id,
            "trade marked as scam"
        );
        Ok(snapshot)
    }

    /// Pending trades where `actor_id` is the receiver.
    pub async fn pending_trades_for(&self, actor_id: &str) -> Vec<Trade> {
        let world = self.store.read().await;
        world
            .trades
            .values()
            .filter(|t| t.receiver_id == actor_id && t.status == TradeStatus::Pending)
            .cloned()
            .collect()
    }

    /// Terminal trades involving `actor_id`, newest first.
    pub async fn trade_history(&self, actor_id: &str, limit: usize) -> Vec<Trade> {
        let world = self.store.read().await;
        let mut trades: Vec<Trade> = world
            .trades
            .values()
            .filter(|t| {
                t.status.is_terminal()
                    && (t.sender_id == actor_id || t.receiver_id == actor_id)
            })
            .cloned()
            .collect();
        trades.sort_by(|a, b| b.created_secs.cmp(&a.created_secs));
        trades.truncate(limit);
        trades
    }

    // ── Tipping ──────────────────────────────────────────────────────

    /// Transfer a small fee-free tip; both parties gain a little
    /// reputation.
    pub async fn send_tip(
        &self,
        sender_id: &str,
        receiver_id: &str,
        amount: i64,
    ) -> EngineResult<()> {
        if sender_id == receiver_id {
            return Err(EngineError::validation("cannot tip yourself"));
        }
        if amount < self.config.tip_min || amount > self.config.tip_max {
            return Err(EngineError::validation(format!(
                "tip must be between {} and {} cents",
                self.config.tip_min, self.config.tip_max
            )));
        }

        let mut world = self.store.write().await;
        require_active(&world, sender_id, "sender")?;
        require_active(&world, receiver_id, "receiver")?;

        let sender = world.actor_mut(sender_id).expect("checked above");
        sender
            .debit(amount)
            .map_err(|e| EngineError::rule(e.to_string()))?;
        world
            .actor_mut(receiver_id)
            .expect("checked above")
            .credit(amount);

        ReputationEngine::modify_in(&mut world, sender_id, self.config.rep_tip, "tip_given")?;
        ReputationEngine::modify_in(&mut world, receiver_id, self.config.rep_tip, "tip_received")?;
        drop(world);

        self.store.publish(Notice::TipSent {
            sender: sender_id.to_string(),
            receiver: receiver_id.to_string(),
            amount,
        });
        Ok(())
    }

    // ── Leverage ─────────────────────────────────────────────────────

    /// Open a leveraged directional bet. Stake plus the flat fee leave
    /// the balance immediately; the fee is burned.
    pub async fn open_position(
        &self,
        actor_id: &str,
        direction: LeverageDirection,
        target_price: f64,
        stake: i64,
        hours_until_settlement: u32,
    ) -> EngineResult<LeveragePosition> {
        if stake <= 0 {
            return Err(EngineError::validation("stake must be positive"));
        }
        if target_price <= 0.0 {
            return Err(EngineError::validation("target price must be positive"));
        }
        if hours_until_settlement == 0 {
            return Err(EngineError::validation(
                "settlement horizon must be at least one hour",
            ));
        }

        let mut world = self.store.write().await;
        let hour = world.game_state.current_hour;
        if hour < self.config.leverage_unlock_hour {
            return Err(EngineError::rule(format!(
                "leverage trading unlocks at hour {} (current hour: {hour})",
                self.config.leverage_unlock_hour
            )));
        }
        require_active(&world, actor_id, "betting")?;

        let active_count = world
            .positions
            .values()
            .filter(|p| p.actor_id == actor_id && p.is_active())
            .count();
        if active_count >= self.config.max_leverage_positions {
            return Err(EngineError::rule(format!(
                "actor {actor_id} already has {active_count} active position(s) (max {})",
                self.config.max_leverage_positions
            )));
        }

        let fee = self.config.leverage_fee;
        let actor = world.actor_mut(actor_id).expect("checked above");
        actor
            .debit(stake + fee)
            .map_err(|e| EngineError::rule(e.to_string()))?;
        world.game_state.total_circulation -= fee;

        let potential_return = (stake as f64 * self.config.leverage_multiplier).round() as i64;
        let now = world.game_state.elapsed_secs;
        let position = LeveragePosition::new(
            actor_id.to_string(),
            direction,
            target_price,
            stake,
            potential_return,
            fee,
            now + hours_until_settlement as u64 * 3600,
            now,
        );
        let snapshot = position.clone();
        world.positions.insert(position.id().to_string(), position);
        drop(world);

        self.store.publish(Notice::LeverageOpened {
            position_id: snapshot.id().to_string(),
            actor: actor_id.to_string(),
            stake,
        });
        tracing::info!(
            position_id = snapshot.id(),
            actor_id,
            direction = direction.label(),
            target_price,
            stake,
            "leverage position opened"
        );
        Ok(snapshot)
    }

    /// Settle one active position against `settled_price`.
    ///
    /// A win credits the fixed potential return (the escrowed stake is
    /// replaced by freshly minted winnings); a loss burns the stake.
    pub async fn settle_position(
        &self,
        position_id: &str,
        settled_price: f64,
    ) -> EngineResult<SettlementResult> {
        let mut world = self.store.write().await;
        let result = Self::settle_in(&mut world, position_id, settled_price)?;
        drop(world);
        self.publish_settlement(&result);
        Ok(result)
    }

    /// Settle every active position whose settlement time has arrived.
    ///
    /// Sweep-tolerant: one failed item is logged and skipped, the rest
    /// still settle.
    pub async fn settle_due_positions(&self, settled_price: f64) -> Vec<SettlementResult> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let due: Vec<String> = world
            .positions
            .values()
            .filter(|p| p.is_active() && p.settle_at_secs <= now)
            .map(|p| p.id().to_string())
            .collect();

        let mut results = Vec::new();
        for id in due {
            match Self::settle_in(&mut world, &id, settled_price) {
                Ok(result) => results.push(result),
                Err(err) => tracing::error!(position_id = %id, %err, "settlement failed"),
            }
        }
        drop(world);

        for result in &results {
            self.publish_settlement(result);
        }
        results
    }

    /// Force-liquidate every active position to zero payout. Stakes are
    /// burned. Triggered by a margin-call event.
    pub async fn liquidate_all(&self) -> EngineResult<usize> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let active: Vec<String> = world
            .positions
            .values()
            .filter(|p| p.is_active())
            .map(|p| p.id().to_string())
            .collect();

        let mut liquidated = Vec::new();
        for id in &active {
            let position = world.positions.get_mut(id).expect("listed above");
            position.status = LeverageStatus::Liquidated { at_secs: now };
            let stake = position.stake;
            let snapshot = position.clone();
            world.game_state.total_circulation -= stake;
            liquidated.push(snapshot);
        }
        drop(world);

        for position in &liquidated {
            self.store.publish(Notice::LeverageSettled {
                position_id: position.id().to_string(),
                actor: position.actor_id.clone(),
                direction: position.direction.label().to_string(),
                stake: position.stake,
                payout: 0,
                outcome: "liquidated".to_string(),
            });
        }
        tracing::warn!(count = liquidated.len(), "mass liquidation executed");
        Ok(liquidated.len())
    }

    /// Active positions for one actor.
    pub async fn active_positions(&self, actor_id: &str) -> Vec<LeveragePosition> {
        let world = self.store.read().await;
        world
            .positions
            .values()
            .filter(|p| p.actor_id == actor_id && p.is_active())
            .cloned()
            .collect()
    }

    fn settle_in(
        world: &mut World,
        position_id: &str,
        settled_price: f64,
    ) -> EngineResult<SettlementResult> {
        let now = world.game_state.elapsed_secs;
        let position = world
            .positions
            .get_mut(position_id)
            .ok_or_else(|| EngineError::not_found(format!("position {position_id}")))?;
        if !position.is_active() {
            return Err(EngineError::rule(format!(
                "position {position_id} is not active"
            )));
        }

        let won = position.direction.wins(settled_price, position.target_price);
        let payout = if won { position.potential_return } else { 0 };
        let stake = position.stake;
        let actor_id = position.actor_id.clone();

        position.status = if won {
            LeverageStatus::Won {
                settled_price,
                payout,
                at_secs: now,
            }
        } else {
            LeverageStatus::Lost {
                settled_price,
                at_secs: now,
            }
        };
        let snapshot = position.clone();

        if won {
            if let Some(actor) = world.actor_mut(&actor_id) {
                actor.credit(payout);
            }
            // The escrowed stake re-enters circulation as part of the
            // payout; the excess is minted by the house.
            world.game_state.total_circulation += payout - stake;
        } else {
            world.game_state.total_circulation -= stake;
        }

        Ok(SettlementResult {
            position: snapshot,
            payout,
        })
    }

    fn publish_settlement(&self, result: &SettlementResult) {
        let outcome = match result.position.status {
            LeverageStatus::Won { .. } => "won",
            LeverageStatus::Lost { .. } => "lost",
            LeverageStatus::Liquidated { .. } => "liquidated",
            LeverageStatus::Active => "active",
        };
        self.store.publish(Notice::LeverageSettled {
            position_id: result.position.id().to_string(),
            actor: result.position.actor_id.clone(),
            direction: result.position.direction.label().to_string(),
            stake: result.position.stake,
            payout: result.payout,
            outcome: outcome.to_string(),
        });
        tracing::info!(
            position_id = result.position.id(),
            actor = %result.position.actor_id,
            outcome,
            payout = result.payout,
            "leverage position settled"
        );
    }

    // ── Bounties ─────────────────────────────────────────────────────

    /// Post a bounty; the reward is escrowed immediately.
    pub async fn create_bounty(
        &self,
        poster_id: &str,
        description: &str,
        reward: i64,
    ) -> EngineResult<Bounty> {
        if reward <= 0 {
            return Err(EngineError::validation("bounty reward must be positive"));
        }
        if description.trim().is_empty() {
            return Err(EngineError::validation("bounty description cannot be empty"));
        }

        let mut world = self.store.write().await;
        require_active(&world, poster_id, "poster")?;
        let actor = world.actor_mut(poster_id).expect("checked above");
        actor
            .debit(reward)
            .map_err(|e| EngineError::rule(e.to_string()))?;

        let bounty = Bounty::new(
            poster_id.to_string(),
            description.trim().to_string(),
            reward,
            world.game_state.elapsed_secs,
        );
        let snapshot = bounty.clone();
        world.bounties.insert(bounty.id().to_string(), bounty);
        drop(world);

        self.store.publish(Notice::BountyPosted {
            bounty_id: snapshot.id().to_string(),
            poster: poster_id.to_string(),
            reward,
        });
        Ok(snapshot)
    }

    /// Pay out an open bounty to a non-poster claimer in full.
    pub async fn claim_bounty(&self, bounty_id: &str, claimer_id: &str) -> EngineResult<Bounty> {
        let mut world = self.store.write().await;
        let now = world.game_state.elapsed_secs;
        let bounty = world
            .bounties
            .get(bounty_id)
            .ok_or_else(|| EngineError::not_found(format!("bounty {bounty_id}")))?;
        if bounty.status != ContractStatus::Open {
            return Err(EngineError::rule(format!(
                "bounty {bounty_id} is not open (status: {})",
                bounty.status.label()
            )));
        }
        if bounty.poster_id == claimer_id {
            return Err(EngineError::rule("poster cannot claim their own bounty"));
        }
        require_active(&world, claimer_id, "claimer")?;

        let reward = bounty.reward;
        world
            .actor_mut(claimer_id)
            .expect("checked above")
            .credit(reward);

        let bounty = world.bounties.get_mut(bounty_id).expect("checked above");
        bounty.claimer_id = Some(claimer_id.to_string());
        bounty.status = ContractStatus::Completed { at_secs: now };
        let snapshot = bounty.clone();

        ReputationEngine::modify_in(
            &mut world,
            claimer_id,
            self.config.rep_bounty_complete,
            "bounty_complete",
        )?;
        drop(world);

        self.store.publish(Notice::BountyClaimed {
            bounty_id: bounty_id.to_string(),
            claimer: claimer_id.to_string(),
            reward,
        });
        Ok(snapshot)
    }

    /// All open bounties.
    pub async fn open_bounties(&self) -> Vec<Bounty> {
        let world = self.store.read().await;
        world
            .bounties
            .values()
            .filter(|b| b.status == ContractStatus::Open)
            .cloned()
            .collect()
    }

    // ── Balance management ───────────────────────────────────────────

    /// Admin-facing signed balance adjustment. Minting and burning both
    /// move `total_circulation` so conservation accounting stays honest.
    pub async fn adjust_balance(
        &self,
        actor_id: &str,
        delta: i64,
        reason: &str,
    ) -> EngineResult<i64> {
        if delta == 0 {
            return Err(EngineError::validation("adjustment must be non-zero"));
        }
        let mut world = self.store.write().await;
        let actor = world
            .actor_mut(actor_id)
            .ok_or_else(|| EngineError::not_found(format!("actor {actor_id}")))?;
        if delta > 0 {
            actor.credit(delta);
        } else {
            actor
                .debit(-delta)
                .map_err(|e| EngineError::rule(e.to_string()))?;
        }
        let new_balance = actor.balance();
        world.game_state.total_circulation += delta;
        drop(world);

        tracing::info!(actor_id, delta, reason, new_balance, "balance adjusted");
        Ok(new_balance)
    }

    /// Active actors ranked by balance.
    pub async fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        let world = self.store.read().await;
        world
            .leaderboard()
            .into_iter()
            .enumerate()
            .map(|(i, actor)| LeaderboardEntry {
                rank: i + 1,
                actor_id: actor.id().to_string(),
                balance: actor.balance(),
                reputation: actor.reputation(),
                badge: reputation_badge(actor.reputation()),
                total_trades: actor.total_trades,
            })
            .collect()
    }
}
