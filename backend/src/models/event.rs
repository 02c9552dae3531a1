//! System events, eliminations, tribunal votes, and rank snapshots.
//!
//! A `SystemEvent` is a scripted disruption with a trigger hour. The
//! events engine marks it triggered (at most once) and hands the payload
//! back to the scheduler, which knows how to apply it - the event model
//! itself never moves the price.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Kind of scripted disruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    WhaleAlert,
    FlashCrash,
    SecurityBreach,
    FeeIncrease,
    MarginCall,
    FinalPump,
    Tribunal,
    Gaslighting,
    FakeLeak,
    TradingFreeze,
    Custom,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::WhaleAlert => "whale_alert",
            EventKind::FlashCrash => "flash_crash",
            EventKind::SecurityBreach => "security_breach",
            EventKind::FeeIncrease => "fee_increase",
            EventKind::MarginCall => "margin_call",
            EventKind::FinalPump => "final_pump",
            EventKind::Tribunal => "tribunal",
            EventKind::Gaslighting => "gaslighting",
            EventKind::FakeLeak => "fake_leak",
            EventKind::TradingFreeze => "trading_freeze",
            EventKind::Custom => "custom",
        }
    }
}

/// A scheduled or ad-hoc disruption event. Triggered at most once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemEvent {
    id: String,
    pub kind: EventKind,
    pub trigger_hour: u32,
    pub description: String,

    /// Fractional price impact the scheduler should apply (the market
    /// engine clamps every application to its per-shock cap)
    pub price_impact: Option<f64>,

    /// How long the effect lasts, for freeze / voting windows
    pub duration_minutes: Option<u32>,

    pub triggered: bool,
    pub triggered_at_secs: Option<u64>,
}

impl SystemEvent {
    pub fn new(
        kind: EventKind,
        trigger_hour: u32,
        description: impl Into<String>,
        price_impact: Option<f64>,
        duration_minutes: Option<u32>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            trigger_hour,
            description: description.into(),
            price_impact,
            duration_minutes,
            triggered: false,
            triggered_at_secs: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Record of one elimination checkpoint outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Elimination {
    pub actor_id: String,
    pub hour: u32,
    pub final_balance: i64,
    pub final_reputation: i32,
    /// recipient -> amount credited during redistribution
    pub redistribution: Vec<(String, i64)>,
}

/// One tribunal vote. At most one per voter per tribunal window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TribunalVote {
    pub voter_id: String,
    pub target_id: String,
    pub reason: Option<String>,
    pub hour: u32,
}

/// One row of a rank snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub actor_id: String,
    pub balance: i64,
    pub reputation: i32,
    pub rank: usize,
}

/// Periodic balance/reputation snapshot of every active actor, carrying
/// a digest so exported history can be integrity-checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankSnapshot {
    pub hour: u32,
    pub at_secs: u64,
    pub entries: Vec<SnapshotEntry>,
    pub digest: String,
}

impl RankSnapshot {
    /// Build a snapshot from ranked entries, computing the digest over
    /// their serialized form.
    pub fn new(hour: u32, at_secs: u64, entries: Vec<SnapshotEntry>) -> Self {
        let serialized = serde_json::to_vec(&entries).unwrap_or_default();
        let digest = Sha256::digest(&serialized)
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect();
        Self {
            hour,
            at_secs,
            entries,
            digest,
        }
    }
}
