//! Covert-market contract models
//!
//! Blackmail (coercion), hit contracts (destruction bounties), open
//! bounties, and the purchase logs for intel and vote manipulation.
//! Escrow discipline: a reward leaves the poster's balance at creation
//! and is reflected as exactly one later credit (claimer payout or
//! refund) or an explicit forfeit.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

/// Blackmail contract lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlackmailStatus {
    Active,
    /// Target paid the demand in full
    Paid { at_secs: u64 },
    /// Target shrugged; the blackmailer may still act on the threat
    Ignored { at_secs: u64 },
    /// Target went public; the blackmailer took a reputation penalty
    Exposed { at_secs: u64 },
    /// Deadline passed while still active
    Expired { at_secs: u64 },
}

/// A coercion contract: pay the demand before the deadline or face the
/// threat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlackmailContract {
    id: String,
    pub blackmailer_id: String,
    pub target_id: String,
    pub demand: i64,
    pub threat: String,
    pub evidence: Option<String>,
    pub deadline_secs: u64,
    pub status: BlackmailStatus,
    pub created_secs: u64,
}

impl BlackmailContract {
    pub fn new(
        blackmailer_id: String,
        target_id: String,
        demand: i64,
        threat: String,
        evidence: Option<String>,
        deadline_secs: u64,
        created_secs: u64,
    ) -> Self {
        assert!(demand > 0, "demand must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            blackmailer_id,
            target_id,
            demand,
            threat,
            evidence,
            deadline_secs,
            status: BlackmailStatus::Active,
            created_secs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, BlackmailStatus::Active)
    }
}

/// Shared lifecycle for escrow-backed contracts (hits and bounties).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    Open,
    Claimed { by: String },
    Completed { at_secs: u64 },
    Cancelled { at_secs: u64 },
}

impl ContractStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ContractStatus::Open => "open",
            ContractStatus::Claimed { .. } => "claimed",
            ContractStatus::Completed { .. } => "completed",
            ContractStatus::Cancelled { .. } => "cancelled",
        }
    }
}

/// What a hit contract demands of its executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitCondition {
    ReputationDestruction,
    WealthElimination,
    SocialIsolation,
    PlatformElimination,
}

/// A destruction bounty against a specific target. The reward is
/// escrowed at posting; completion pays the claimer and penalises the
/// target's reputation; cancellation refunds the poster minus a penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitContract {
    id: String,
    pub poster_id: String,
    pub target_id: String,
    pub reward: i64,
    pub condition: HitCondition,
    pub condition_text: String,
    pub deadline_secs: u64,
    pub proof: Option<String>,
    pub status: ContractStatus,
    pub created_secs: u64,
}

impl HitContract {
    pub fn new(
        poster_id: String,
        target_id: String,
        reward: i64,
        condition: HitCondition,
        condition_text: String,
        deadline_secs: u64,
        created_secs: u64,
    ) -> Self {
        assert!(reward > 0, "reward must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            poster_id,
            target_id,
            reward,
            condition,
            condition_text,
            deadline_secs,
            proof: None,
            status: ContractStatus::Open,
            created_secs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The claimer, when the contract has been claimed.
    pub fn claimer(&self) -> Option<&str> {
        match &self.status {
            ContractStatus::Claimed { by } => Some(by),
            _ => None,
        }
    }
}

/// An open bounty with no named target. Same escrow discipline as a hit
/// contract; claiming pays the full reward, there is no partial
/// completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bounty {
    id: String,
    pub poster_id: String,
    pub description: String,
    pub reward: i64,
    pub claimer_id: Option<String>,
    pub status: ContractStatus,
    pub created_secs: u64,
}

impl Bounty {
    pub fn new(poster_id: String, description: String, reward: i64, created_secs: u64) -> Self {
        assert!(reward > 0, "reward must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            poster_id,
            description,
            reward,
            claimer_id: None,
            status: ContractStatus::Open,
            created_secs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Record of a paid intel purchase. The fee is taken before assembly and
/// never refunded, even when writing this record fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntelPurchase {
    pub buyer_id: String,
    pub target_id: String,
    pub tier: u8,
    pub cost: i64,
    pub summary: String,
    pub at_secs: u64,
}

/// What a vote-manipulation purchase bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManipulationKind {
    FakeUpvotes,
    FakeDownvotes,
    BotComments,
    TrendingBoost,
}

/// Record of a vote-manipulation purchase and whether it was detected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManipulationPurchase {
    pub buyer_id: String,
    pub post_id: Option<String>,
    pub kind: ManipulationKind,
    pub quantity: u32,
    pub cost: i64,
    pub detected: bool,
    pub at_secs: u64,
}
