//! Decision-layer boundary
//!
//! The external decision generator (out of scope here) produces one
//! `ActionRequest` per decision cycle; the dispatcher routes it to the
//! owning engine, which owns all validation and effects. The policy that
//! chooses actions sits behind the `DecisionPolicy` trait so the natural-
//! language layer, a scripted test policy, and the built-in heuristic are
//! interchangeable.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::alliance::AllianceEngine;
use crate::covert::CovertMarketEngine;
use crate::errors::EngineError;
use crate::events::EventsEngine;
use crate::market::MarketEngine;
use crate::models::contract::{HitCondition, ManipulationKind};
use crate::models::leverage::LeverageDirection;
use crate::models::social::PostKind;
use crate::reputation::ReputationEngine;
use crate::rng::RngManager;
use crate::social::SocialEngine;
use crate::store::GameStore;
use crate::trading::TradingEngine;

/// The closed set of actions the decision layer can request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRequest {
    Trade {
        receiver_id: String,
        amount: i64,
        price: f64,
    },
    AcceptTrade {
        trade_id: String,
    },
    RejectTrade {
        trade_id: String,
    },
    Post {
        kind: PostKind,
        content: String,
    },
    Comment {
        post_id: String,
        content: String,
    },
    Vote {
        post_id: String,
        upvote: bool,
    },
    Tip {
        receiver_id: String,
        amount: i64,
    },
    LeverageBet {
        direction: LeverageDirection,
        target_price: f64,
        stake: i64,
        hours_until_settlement: u32,
    },
    Whisper {
        receiver_id: String,
        content: String,
    },
    AllianceCreate {
        name: String,
    },
    AllianceJoin {
        alliance_id: String,
    },
    AllianceLeave {
        alliance_id: String,
    },
    AllianceContribute {
        alliance_id: String,
        amount: i64,
    },
    AllianceDefect {
        alliance_id: String,
    },
    BlackmailCreate {
        target_id: String,
        demand: i64,
        threat: String,
        deadline_hours: u32,
    },
    BlackmailPay {
        contract_id: String,
    },
    BlackmailIgnore {
        contract_id: String,
    },
    BlackmailExpose {
        contract_id: String,
    },
    HitContractCreate {
        target_id: String,
        reward: i64,
        condition: HitCondition,
        condition_text: String,
        deadline_hours: u32,
    },
    HitContractClaim {
        contract_id: String,
    },
    IntelPurchase {
        target_id: String,
        tier: u8,
    },
    VoteManipulation {
        post_id: String,
        kind: ManipulationKind,
        quantity: u32,
    },
    BountyCreate {
        description: String,
        reward: i64,
    },
    BountyClaim {
        bounty_id: String,
    },
    TribunalVote {
        target_id: String,
        reason: Option<String>,
    },
    None,
}

impl ActionRequest {
    /// Stable label for logs and the decision record.
    pub fn label(&self) -> &'static str {
        match self {
            ActionRequest::Trade { .. } => "trade",
            ActionRequest::AcceptTrade { .. } => "accept_trade",
            ActionRequest::RejectTrade { .. } => "reject_trade",
            ActionRequest::Post { .. } => "post",
            ActionRequest::Comment { .. } => "comment",
            ActionRequest::Vote { .. } => "vote",
            ActionRequest::Tip { .. } => "tip",
            ActionRequest::LeverageBet { .. } => "leverage_bet",
            ActionRequest::Whisper { .. } => "whisper",
            ActionRequest::AllianceCreate { .. } => "alliance_create",
            ActionRequest::AllianceJoin { .. } => "alliance_join",
            ActionRequest::AllianceLeave { .. } => "alliance_leave",
            ActionRequest::AllianceContribute { .. } => "alliance_contribute",
            ActionRequest::AllianceDefect { .. } => "alliance_defect",
            ActionRequest::BlackmailCreate { .. } => "blackmail_create",
            ActionRequest::BlackmailPay { .. } => "blackmail_pay",
            ActionRequest::BlackmailIgnore { .. } => "blackmail_ignore",
            ActionRequest::BlackmailExpose { .. } => "blackmail_expose",
            ActionRequest::HitContractCreate { .. } => "hit_contract_create",
            ActionRequest::HitContractClaim { .. } => "hit_contract_claim",
            ActionRequest::IntelPurchase { .. } => "intel_purchase",
            ActionRequest::VoteManipulation { .. } => "vote_manipulation",
            ActionRequest::BountyCreate { .. } => "bounty_create",
            ActionRequest::BountyClaim { .. } => "bounty_claim",
            ActionRequest::TribunalVote { .. } => "tribunal_vote",
            ActionRequest::None => "none",
        }
    }
}

/// What the dispatcher reports back per decision.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub actor_id: String,
    pub action: &'static str,
    pub success: bool,
    pub message: String,
}

/// Everything an actor's policy gets to see when deciding.
#[derive(Debug, Clone)]
pub struct PerceptionView {
    pub actor_id: String,
    pub balance: i64,
    pub reputation: i32,
    pub hour: u32,
    pub price: f64,
    pub trading_frozen: bool,
    /// Other active actors and their balances
    pub peers: Vec<(String, i64)>,
    /// Trade ids pending this actor's acceptance
    pub pending_trades: Vec<String>,
    /// Alliances this actor is an active member of
    pub alliances: Vec<String>,
}

/// Pluggable per-actor decision maker. The production implementation is
/// the external natural-language layer; tests and the cli use scripted
/// or heuristic policies.
pub trait DecisionPolicy: Send + Sync {
    fn decide(&self, view: &PerceptionView) -> ActionRequest;
}

/// All engines the dispatcher can route to. The scheduler owns one of
/// each and hands this bundle to its loops - no ambient singletons.
#[derive(Clone)]
pub struct EngineSet {
    pub store: Arc<GameStore>,
    pub market: Arc<MarketEngine>,
    pub trading: Arc<TradingEngine>,
    pub alliance: Arc<AllianceEngine>,
    pub covert: Arc<CovertMarketEngine>,
    pub social: Arc<SocialEngine>,
    pub events: Arc<EventsEngine>,
    pub reputation: Arc<ReputationEngine>,
}

/// Build the perception view for one actor.
pub async fn perceive(store: &GameStore, actor_id: &str) -> Option<PerceptionView> {
    let world = store.read().await;
    let actor = world.active_actor(actor_id)?;
    Some(PerceptionView {
        actor_id: actor_id.to_string(),
        balance: actor.balance(),
        reputation: actor.reputation(),
        hour: world.game_state.current_hour,
        price: world.market.price,
        trading_frozen: world.game_state.trading_frozen,
        peers: world
            .active_actors()
            .filter(|a| a.id() != actor_id)
            .map(|a| (a.id().to_string(), a.balance()))
            .collect(),
        pending_trades: world
            .trades
            .values()
            .filter(|t| {
                t.receiver_id == actor_id && t.status == crate::models::trade::TradeStatus::Pending
            })
            .map(|t| t.id().to_string())
            .collect(),
        alliances: world
            .alliances
            .values()
            .filter(|a| a.is_active() && a.member(actor_id).is_some())
            .map(|a| a.id().to_string())
            .collect(),
    })
}

/// Route one action request to its owning engine.
///
/// The dispatcher adds nothing of its own: engines validate, mutate, and
/// emit notices. Completed trades are echoed into the market engine as
/// buy volume (the one cross-engine call the scheduler layer owns).
pub async fn dispatch(engines: &EngineSet, actor_id: &str, request: ActionRequest) -> ActionOutcome {
    let action = request.label();
    let result: Result<String, EngineError> = match request {
        ActionRequest::Trade {
            receiver_id,
            amount,
            price,
        } => engines
            .trading
            .create_trade_offer(actor_id, &receiver_id, amount, price)
            .await
            .map(|t| format!("trade {} offered", t.id())),
        ActionRequest::AcceptTrade { trade_id } => {
            match engines.trading.accept_trade(&trade_id, actor_id).await {
                Ok(trade) => {
                    // Accepted volume counts as buy pressure; a frozen
                    // market simply drops it.
                    let _ = engines.market.record_trade(trade.amount, true).await;
                    Ok(format!("trade {trade_id} accepted"))
                }
                Err(e) => Err(e),
            }
        }
        ActionRequest::RejectTrade { trade_id } => engines
            .trading
            .reject_trade(&trade_id, actor_id)
            .await
            .map(|_| format!("trade {trade_id} rejected")),
        ActionRequest::Post { kind, content } => engines
            .social
            .create_post(actor_id, kind, &content)
            .await
            .map(|p| format!("post {} published", p.id())),
        ActionRequest::Comment { post_id, content } => engines
            .social
            .create_comment(&post_id, actor_id, &content)
            .await
            .map(|_| "comment added".to_string()),
        ActionRequest::Vote { post_id, upvote } => engines
            .social
            .vote(&post_id, actor_id, upvote)
            .await
            .map(|_| "vote recorded".to_string()),
        ActionRequest::Tip {
            receiver_id,
            amount,
        } => engines
            .trading
            .send_tip(actor_id, &receiver_id, amount)
            .await
            .map(|_| format!("tipped {receiver_id}")),
        ActionRequest::LeverageBet {
            direction,
            target_price,
            stake,
            hours_until_settlement,
        } => engines
            .trading
            .open_position(actor_id, direction, target_price, stake, hours_until_settlement)
            .await
            .map(|p| format!("position {} opened", p.id())),
        ActionRequest::Whisper {
            receiver_id,
            content,
        } => engines
            .social
            .send_whisper(actor_id, &receiver_id, &content)
            .await
            .map(|_| format!("whispered to {receiver_id}")),
        ActionRequest::AllianceCreate { name } => engines
            .alliance
            .create_alliance(actor_id, &name)
            .await
            .map(|a| format!("alliance {} founded", a.id())),
        ActionRequest::AllianceJoin { alliance_id } => engines
            .alliance
            .join(&alliance_id, actor_id)
            .await
            .map(|_| format!("joined alliance {alliance_id}")),
        ActionRequest::AllianceLeave { alliance_id } => engines
            .alliance
            .leave(&alliance_id, actor_id)
            .await
            .map(|payout| format!("left alliance with {payout} returned")),
        ActionRequest::AllianceContribute {
            alliance_id,
            amount,
        } => engines
            .alliance
            .contribute(&alliance_id, actor_id, amount)
            .await
            .map(|net| format!("contributed {net} to the treasury")),
        ActionRequest::AllianceDefect { alliance_id } => engines
            .alliance
            .initiate_defection(&alliance_id, actor_id)
            .await
            .map(|at| format!("defection countdown running, executes at {at}")),
        ActionRequest::BlackmailCreate {
            target_id,
            demand,
            threat,
            deadline_hours,
        } => engines
            .covert
            .create_blackmail(actor_id, &target_id, demand, &threat, None, deadline_hours)
            .await
            .map(|c| format!("blackmail contract {} created", c.id())),
        ActionRequest::BlackmailPay { contract_id } => engines
            .covert
            .pay_blackmail(&contract_id, actor_id)
            .await
            .map(|paid| format!("paid {paid} to satisfy blackmail")),
        ActionRequest::BlackmailIgnore { contract_id } => engines
            .covert
            .ignore_blackmail(&contract_id, actor_id)
            .await
            .map(|_| "blackmail ignored".to_string()),
        ActionRequest::BlackmailExpose { contract_id } => engines
            .covert
            .expose_blackmail(&contract_id, actor_id)
            .await
            .map(|rep| format!("blackmailer exposed, reputation now {rep}")),
        ActionRequest::HitContractCreate {
            target_id,
            reward,
            condition,
            condition_text,
            deadline_hours,
        } => engines
            .covert
            .create_hit(
                actor_id,
                &target_id,
                reward,
                condition,
                &condition_text,
                deadline_hours,
            )
            .await
            .map(|c| format!("hit contract {} posted", c.id())),
        ActionRequest::HitContractClaim { contract_id } => engines
            .covert
            .claim_hit(&contract_id, actor_id)
            .await
            .map(|_| format!("claimed hit contract {contract_id}")),
        ActionRequest::IntelPurchase { target_id, tier } => engines
            .covert
            .purchase_intel(actor_id, &target_id, tier)
            .await
            .map(|_| format!("tier {tier} intel purchased on {target_id}")),
        ActionRequest::VoteManipulation {
            post_id,
            kind,
            quantity,
        } => {
            let result = match kind {
                ManipulationKind::FakeUpvotes => {
                    engines
                        .covert
                        .buy_fake_votes(actor_id, &post_id, true, quantity)
                        .await
                }
                ManipulationKind::FakeDownvotes => {
                    engines
                        .covert
                        .buy_fake_votes(actor_id, &post_id, false, quantity)
                        .await
                }
                ManipulationKind::BotComments => {
                    engines
                        .covert
                        .buy_bot_comments(actor_id, &post_id, quantity)
                        .await
                }
                ManipulationKind::TrendingBoost => {
                    engines.covert.buy_trending_boost(actor_id, &post_id).await
                }
            };
            result.map(|detected| {
                if detected {
                    "manipulation applied but detected".to_string()
                } else {
                    "manipulation applied".to_string()
                }
            })
        }
        ActionRequest::BountyCreate {
            description,
            reward,
        } => engines
            .trading
            .create_bounty(actor_id, &description, reward)
            .await
            .map(|b| format!("bounty {} posted", b.id())),
        ActionRequest::BountyClaim { bounty_id } => engines
            .trading
            .claim_bounty(&bounty_id, actor_id)
            .await
            .map(|b| format!("bounty claimed for {}", b.reward)),
        ActionRequest::TribunalVote { target_id, reason } => {
            let hour = engines.store.current_hour().await;
            engines
                .events
                .cast_tribunal_vote(actor_id, &target_id, hour, reason.as_deref())
                .await
                .map(|_| format!("tribunal vote cast against {target_id}"))
        }
        ActionRequest::None => Ok("no action".to_string()),
    };

    let outcome = match result {
        Ok(message) => ActionOutcome {
            actor_id: actor_id.to_string(),
            action,
            success: true,
            message,
        },
        Err(err) => ActionOutcome {
            actor_id: actor_id.to_string(),
            action,
            success: false,
            message: err.to_string(),
        },
    };

    // Record the decision on the actor; failures are part of the record.
    {
        let mut world = engines.store.write().await;
        if let Some(actor) = world.actor_mut(actor_id) {
            actor.decision_count += 1;
        }
    }

    if outcome.success {
        tracing::debug!(actor_id, action, %outcome.message, "action dispatched");
    } else {
        tracing::debug!(actor_id, action, %outcome.message, "action refused");
    }
    outcome
}

/// Built-in deterministic policy for the cli and integration tests.
///
/// Roughly mirrors how a live decision layer spreads its activity:
/// mostly small trades, tips, and posts, with occasional leverage and
/// covert moves once their gates open.
pub struct HeuristicPolicy {
    rng: Mutex<RngManager>,
}

impl HeuristicPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(RngManager::new(seed)),
        }
    }
}

impl DecisionPolicy for HeuristicPolicy {
    fn decide(&self, view: &PerceptionView) -> ActionRequest {
        let mut rng = self.rng.lock().expect("rng mutex poisoned");

        // Answer pending offers first.
        if let Some(trade_id) = view.pending_trades.first() {
            return if rng.chance(0.7) {
                ActionRequest::AcceptTrade {
                    trade_id: trade_id.clone(),
                }
            } else {
                ActionRequest::RejectTrade {
                    trade_id: trade_id.clone(),
                }
            };
        }

        if view.peers.is_empty() {
            return ActionRequest::None;
        }
        let peer = view.peers[rng.pick(view.peers.len())].0.clone();

        match rng.range_i64(0, 100) {
            0..=14 if !view.trading_frozen && view.balance > 120 => ActionRequest::Trade {
                receiver_id: peer,
                amount: rng.range_i64(10, (view.balance / 4).max(11)),
                price: view.price,
            },
            15..=24 if view.balance > 60 => ActionRequest::Tip {
                receiver_id: peer,
                amount: rng.range_i64(10, 51),
            },
            25..=39 => ActionRequest::Post {
                kind: PostKind::General,
                content: format!("market looks wild at {:.2}", view.price),
            },
            40..=49 if view.balance > 30 => ActionRequest::Whisper {
                receiver_id: peer,
                content: "watch the next tick".to_string(),
            },
            50..=59 if view.hour >= 6 && view.balance > 200 => ActionRequest::LeverageBet {
                direction: if rng.chance(0.5) {
                    LeverageDirection::Above
                } else {
                    LeverageDirection::Below
                },
                target_price: view.price,
                stake: rng.range_i64(40, (view.balance / 5).max(41)),
                hours_until_settlement: 1 + rng.range_i64(0, 3) as u32,
            },
            60..=64 if view.hour >= 8 && view.balance > 150 => ActionRequest::IntelPurchase {
                target_id: peer,
                tier: 1,
            },
            65..=69 if view.alliances.is_empty() => ActionRequest::AllianceCreate {
                name: format!("{}-pact", view.actor_id),
            },
            _ => ActionRequest::None,
        }
    }
}
