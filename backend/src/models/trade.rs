//! Trade model
//!
//! A peer-to-peer credit transfer offer. No funds move at offer time;
//! the sender's balance is only touched when the receiver accepts.
//!
//! Lifecycle: `Pending -> {Completed | Rejected | Scam}` - every
//! terminal transition records the game second it happened at.
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};

/// Trade lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    /// Offer created, waiting for the receiver
    Pending,

    /// Accepted and settled: sender paid amount + fee, receiver got amount
    Completed { at_secs: u64 },

    /// Receiver declined; no balances touched
    Rejected { at_secs: u64 },

    /// Marked as a scam: the sender never delivered, no funds moved,
    /// the sender took a reputation penalty
    Scam { at_secs: u64 },
}

impl TradeStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TradeStatus::Pending)
    }
}

/// A peer-to-peer trade offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Unique trade identifier (UUID)
    id: String,

    /// Offering actor - pays amount + fee on acceptance
    pub sender_id: String,

    /// Receiving actor - credited the amount on acceptance
    pub receiver_id: String,

    /// Transfer amount (cents)
    pub amount: i64,

    /// Market quote at offer time (display only)
    pub price: f64,

    /// Fee the sender pays on acceptance; removed from circulation
    pub fee: i64,

    pub status: TradeStatus,

    /// Game second the offer was created at
    pub created_secs: u64,
}

impl Trade {
    /// Create a pending offer.
    ///
    /// # Panics
    /// Panics if `amount` is not positive (engines validate first; this
    /// is the last line of defence).
    pub fn new(
        sender_id: String,
        receiver_id: String,
        amount: i64,
        price: f64,
        fee: i64,
        created_secs: u64,
    ) -> Self {
        assert!(amount > 0, "trade amount must be positive");
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender_id,
            receiver_id,
            amount,
            price,
            fee,
            status: TradeStatus::Pending,
            created_secs,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Total the sender must cover to accept: amount plus fee.
    pub fn sender_cost(&self) -> i64 {
        self.amount + self.fee
    }
}
