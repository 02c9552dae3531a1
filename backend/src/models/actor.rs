//! Actor model
//!
//! Represents one seat in the closed economy. Each actor has:
//! - A conserved credit balance (i64 cents)
//! - A reputation score clamped to 0-100
//! - An elimination flag set once by the elimination checkpoint
//!
//! The emotional-state scalars belong to the external decision layer and
//! are persisted here only so observers can display them.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during direct balance mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActorError {
    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("actor {0} has been eliminated")]
    Eliminated(String),
}

/// One participant in the game.
///
/// # Example
/// ```
/// use gauntlet_sim_core_rs::Actor;
///
/// let mut actor = Actor::new("vega".to_string(), 1_000, 50);
/// actor.debit(300).unwrap();
/// assert_eq!(actor.balance(), 700);
/// assert!(actor.is_active());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    /// Unique seat identifier (display name)
    id: String,

    /// Credit balance (i64 cents). Never negative: debits that would
    /// overdraw are rejected, the economy has no credit facility.
    balance: i64,

    /// Reputation score, clamped to [0, 100] by the reputation engine
    reputation: i32,

    /// The actor's secret win condition (revealed only by tier-4 intel)
    pub hidden_goal: String,

    /// Elimination flag. Once set the actor can never again be a
    /// counterparty to a trade, bet, alliance action, or contract.
    eliminated: bool,

    /// Game hour the actor was eliminated at
    pub eliminated_at_hour: Option<u32>,

    // Emotional-state scalars, owned by the decision layer
    pub stress: i32,
    pub confidence: i32,
    pub paranoia: i32,
    pub aggression: i32,
    pub guilt: i32,

    /// Number of decisions the dispatch loop has run for this actor
    pub decision_count: u32,

    /// Completed-trade counter (both sides increment)
    pub total_trades: u32,

    /// Lifetime post counter
    pub total_posts: u32,

    /// Posts published during `posts_hour` (spam guard)
    pub posts_this_hour: u32,

    /// Game hour `posts_this_hour` refers to
    pub posts_hour: u32,
}

impl Actor {
    /// Create an actor with an opening balance and reputation.
    ///
    /// # Panics
    /// Panics if `balance` is negative.
    pub fn new(id: String, balance: i64, reputation: i32) -> Self {
        assert!(balance >= 0, "opening balance must be non-negative");
        Self {
            id,
            balance,
            reputation: reputation.clamp(0, 100),
            hidden_goal: String::new(),
            eliminated: false,
            eliminated_at_hour: None,
            stress: 30,
            confidence: 50,
            paranoia: 20,
            aggression: 30,
            guilt: 10,
            decision_count: 0,
            total_trades: 0,
            total_posts: 0,
            posts_this_hour: 0,
            posts_hour: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn reputation(&self) -> i32 {
        self.reputation
    }

    /// Whether the actor is still in the game.
    pub fn is_active(&self) -> bool {
        !self.eliminated
    }

    /// Whether the actor can cover `amount` from its balance.
    pub fn can_pay(&self, amount: i64) -> bool {
        self.balance >= amount
    }

    /// Remove `amount` from the balance.
    ///
    /// Fails without side effect when the balance cannot cover it; the
    /// balance never goes negative.
    pub fn debit(&mut self, amount: i64) -> Result<(), ActorError> {
        assert!(amount >= 0, "debit amount must be non-negative");
        if self.balance < amount {
            return Err(ActorError::InsufficientBalance {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Add `amount` to the balance.
    pub fn credit(&mut self, amount: i64) {
        assert!(amount >= 0, "credit amount must be non-negative");
        self.balance += amount;
    }

    /// Write a new clamped reputation value. Only the reputation engine
    /// calls this, so every change carries a logged reason.
    pub(crate) fn set_reputation(&mut self, value: i32) {
        self.reputation = value.clamp(0, 100);
    }

    /// Mark the actor eliminated and zero the balance (the caller is
    /// responsible for redistributing it first).
    pub(crate) fn eliminate(&mut self, hour: u32) {
        self.eliminated = true;
        self.eliminated_at_hour = Some(hour);
        self.balance = 0;
    }
}

/// One row of the reputation change log. Every mutation that goes through
/// `ReputationEngine::modify` appends exactly one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReputationChange {
    pub actor_id: String,
    pub delta: i32,
    pub reason: String,
    pub new_value: i32,
    pub at_secs: u64,
}

/// Badge tier derived from reputation, highest match wins.
pub fn reputation_badge(reputation: i32) -> &'static str {
    match reputation {
        r if r >= 80 => "VERIFIED",
        r if r >= 30 => "NORMAL",
        r if r >= 10 => "UNTRUSTED",
        _ => "PARIAH",
    }
}
