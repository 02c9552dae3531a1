//! Domain notices
//!
//! Every state-changing engine operation emits a typed `Notice` for the
//! external broadcaster (dashboard, observers). Delivery is fire-and-
//! forget over a `tokio::sync::broadcast` channel: engines never block on
//! it and a send with no subscribers is not an error.

use serde::{Deserialize, Serialize};

/// One observable state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    GameStarted {
        duration_hours: u32,
        actor_count: usize,
    },
    GameEnded,
    PriceUpdate {
        price: f64,
        change_pct: f64,
        volume: i64,
    },
    TradeOffered {
        trade_id: String,
        sender: String,
        receiver: String,
        amount: i64,
    },
    TradeCompleted {
        trade_id: String,
        sender: String,
        receiver: String,
        amount: i64,
        fee: i64,
    },
    TradeScam {
        trade_id: String,
        scammer: String,
        victim: String,
    },
    TipSent {
        sender: String,
        receiver: String,
        amount: i64,
    },
    LeverageOpened {
        position_id: String,
        actor: String,
        stake: i64,
    },
    LeverageSettled {
        position_id: String,
        actor: String,
        direction: String,
        stake: i64,
        payout: i64,
        outcome: String,
    },
    BountyPosted {
        bounty_id: String,
        poster: String,
        reward: i64,
    },
    BountyClaimed {
        bounty_id: String,
        claimer: String,
        reward: i64,
    },
    AllianceEvent {
        alliance_id: String,
        event: String,
        actor: Option<String>,
    },
    CovertEvent {
        event: String,
        actor: String,
        target: Option<String>,
    },
    PostPublished {
        post_id: String,
        author: String,
    },
    Elimination {
        actor: String,
        hour: u32,
        final_balance: i64,
    },
    SystemEvent {
        event: String,
        description: String,
        price_impact: Option<f64>,
    },
    TribunalResolved {
        target: String,
        votes: usize,
        penalty: i64,
    },
    TradingFrozen,
    TradingResumed,
}
