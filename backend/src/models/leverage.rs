//! Leverage position model
//!
//! A directional bet on the market price: the owner stakes credits on the
//! price being above or below a target at settlement time. The stake and
//! a flat fee leave the balance at creation (escrow); a win pays
//! `stake x multiplier`, a loss pays nothing, and a margin-call event can
//! liquidate every active position to zero regardless of direction.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

/// Which side of the target the owner bet on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeverageDirection {
    Above,
    Below,
}

impl LeverageDirection {
    pub fn label(&self) -> &'static str {
        match self {
            LeverageDirection::Above => "above",
            LeverageDirection::Below => "below",
        }
    }

    /// Whether `settled_price` wins against `target_price` for this side.
    pub fn wins(&self, settled_price: f64, target_price: f64) -> bool {
        match self {
            LeverageDirection::Above => settled_price > target_price,
            LeverageDirection::Below => settled_price < target_price,
        }
    }
}

/// Position lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LeverageStatus {
    Active,
    Won {
        settled_price: f64,
        payout: i64,
        at_secs: u64,
    },
    Lost {
        settled_price: f64,
        at_secs: u64,
    },
    /// Force-closed by a margin call, zero payout
    Liquidated { at_secs: u64 },
}

/// One leveraged directional bet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeveragePosition {
    id: String,
    pub actor_id: String,
    pub direction: LeverageDirection,
    pub target_price: f64,

    /// Escrowed stake (cents), debited at creation
    pub stake: i64,

    /// Payout credited on a win (cents), fixed at creation
    pub potential_return: i64,

    /// Flat fee (cents), debited at creation and burned
    pub fee: i64,

    /// Game second the position matures at
    pub settle_at_secs: u64,

    pub status: LeverageStatus,
    pub created_secs: u64,
}

impl LeveragePosition {
    pub fn new(
        actor_id: String,
        direction: LeverageDirection,
        target_price: f64,
        stake: i64,
        potential_return: i64,
        fee: i64,
        settle_at_secs: u64,
        created_secs: u64,
    ) -> Self {
        assert!(stake > 0, "stake must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            actor_id,
            direction,
            target_price,
            stake,
            potential_return,
            fee,
            settle_at_secs,
            status: LeverageStatus::Active,
            created_secs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, LeverageStatus::Active)
    }
}
