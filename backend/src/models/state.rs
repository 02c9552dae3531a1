//! World state
//!
//! The complete state of a running game: every table of the durable
//! schema plus the `GameState` singleton. One `World` instance lives
//! behind the store's transaction boundary; engines only ever see it
//! through a single guard per logical operation.
//!
//! # Critical Invariants
//!
//! 1. **Conservation**: the sum of actor balances, alliance treasuries,
//!    open contract escrows, and active leverage stakes only changes
//!    through explicit burns (fees, whisper costs, fines, forfeits)
//! 2. **No negative balances**: debits that would overdraw are rejected
//! 3. **Deterministic iteration**: tables are BTreeMaps so sweeps visit
//!    entries in a stable order run-over-run

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::actor::{Actor, ReputationChange};
use crate::models::alliance::Alliance;
use crate::models::contract::{
    BlackmailContract, Bounty, HitContract, IntelPurchase, ManipulationPurchase,
};
use crate::models::event::{Elimination, RankSnapshot, SystemEvent, TribunalVote};
use crate::models::leverage::LeveragePosition;
use crate::models::social::{Post, Whisper};
use crate::models::trade::Trade;

/// The singleton game row: run lifecycle, clock mirror, and the knobs
/// events can move at runtime (fee rate, freeze flag).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub active: bool,
    pub current_hour: u32,
    pub elapsed_secs: u64,
    pub phase: String,
    pub trading_frozen: bool,

    /// Current trade fee (cents) - events can raise it mid-game
    pub fee_rate: i64,

    /// Total credits minted at game start (cents)
    pub total_circulation: i64,

    pub actors_remaining: usize,
    pub started_unix: Option<u64>,
    pub ends_unix: Option<u64>,
}

impl GameState {
    pub fn new(total_circulation: i64, actor_count: usize, fee_rate: i64) -> Self {
        Self {
            active: false,
            current_hour: 0,
            elapsed_secs: 0,
            phase: "pre_game".to_string(),
            trading_frozen: false,
            fee_rate,
            total_circulation,
            actors_remaining: actor_count,
            started_unix: None,
            ends_unix: None,
        }
    }
}

/// Live market quote state: the price plus the volume accumulated since
/// the last tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketState {
    pub price: f64,
    pub buy_volume: i64,
    pub sell_volume: i64,
}

impl MarketState {
    pub fn new(price: f64) -> Self {
        Self {
            price,
            buy_volume: 0,
            sell_volume: 0,
        }
    }

    pub fn total_volume(&self) -> i64 {
        self.buy_volume + self.sell_volume
    }

    pub fn reset_volume(&mut self) {
        self.buy_volume = 0;
        self.sell_volume = 0;
    }
}

/// One row of the append-only price log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecord {
    pub price: f64,
    pub buy_volume: i64,
    pub sell_volume: i64,
    pub pressure: f64,
    pub volatility: f64,
    /// Set when the record came from a shock rather than a tick
    pub event_label: Option<String>,
    pub at_secs: u64,
}

/// Complete game state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub game_state: GameState,
    pub market: MarketState,

    pub actors: BTreeMap<String, Actor>,
    pub trades: BTreeMap<String, Trade>,
    pub positions: BTreeMap<String, LeveragePosition>,
    pub alliances: BTreeMap<String, Alliance>,
    pub blackmail: BTreeMap<String, BlackmailContract>,
    pub hits: BTreeMap<String, HitContract>,
    pub bounties: BTreeMap<String, Bounty>,
    pub posts: BTreeMap<String, Post>,

    pub whispers: Vec<Whisper>,
    pub events: Vec<SystemEvent>,
    pub eliminations: Vec<Elimination>,
    pub tribunal_votes: Vec<TribunalVote>,
    pub snapshots: Vec<RankSnapshot>,
    pub price_log: Vec<PriceRecord>,
    pub reputation_log: Vec<ReputationChange>,
    pub intel_log: Vec<IntelPurchase>,
    pub manipulation_log: Vec<ManipulationPurchase>,
}

impl World {
    /// Create a world with the given actors, opening price, and fee rate.
    pub fn new(actors: Vec<Actor>, starting_price: f64, fee_rate: i64) -> Self {
        let total: i64 = actors.iter().map(|a| a.balance()).sum();
        let count = actors.len();
        let actors = actors
            .into_iter()
            .map(|a| (a.id().to_string(), a))
            .collect();
        Self {
            game_state: GameState::new(total, count, fee_rate),
            market: MarketState::new(starting_price),
            actors,
            trades: BTreeMap::new(),
            positions: BTreeMap::new(),
            alliances: BTreeMap::new(),
            blackmail: BTreeMap::new(),
            hits: BTreeMap::new(),
            bounties: BTreeMap::new(),
            posts: BTreeMap::new(),
            whispers: Vec::new(),
            events: Vec::new(),
            eliminations: Vec::new(),
            tribunal_votes: Vec::new(),
            snapshots: Vec::new(),
            price_log: Vec::new(),
            reputation_log: Vec::new(),
            intel_log: Vec::new(),
            manipulation_log: Vec::new(),
        }
    }

    pub fn actor(&self, id: &str) -> Option<&Actor> {
        self.actors.get(id)
    }

    pub fn actor_mut(&mut self, id: &str) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    /// The actor, only if it exists and has not been eliminated.
    pub fn active_actor(&self, id: &str) -> Option<&Actor> {
        self.actors.get(id).filter(|a| a.is_active())
    }

    /// All non-eliminated actors.
    pub fn active_actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values().filter(|a| a.is_active())
    }

    /// Active actors ranked by balance descending (reputation breaks
    /// ties, then id for full determinism).
    pub fn leaderboard(&self) -> Vec<&Actor> {
        let mut ranked: Vec<&Actor> = self.active_actors().collect();
        ranked.sort_by(|a, b| {
            b.balance()
                .cmp(&a.balance())
                .then(b.reputation().cmp(&a.reputation()))
                .then(a.id().cmp(b.id()))
        });
        ranked
    }

    /// Sum of every credit currently held somewhere: actor balances,
    /// alliance treasuries, open escrows, and active stakes. Used by the
    /// conservation tests.
    pub fn circulating_total(&self) -> i64 {
        let balances: i64 = self.actors.values().map(|a| a.balance()).sum();
        let treasuries: i64 = self
            .alliances
            .values()
            .filter(|a| a.is_active())
            .map(|a| a.treasury)
            .sum();
        let hit_escrow: i64 = self
            .hits
            .values()
            .filter(|h| {
                matches!(
                    h.status,
                    crate::models::contract::ContractStatus::Open
                        | crate::models::contract::ContractStatus::Claimed { .. }
                )
            })
            .map(|h| h.reward)
            .sum();
        let bounty_escrow: i64 = self
            .bounties
            .values()
            .filter(|b| matches!(b.status, crate::models::contract::ContractStatus::Open))
            .map(|b| b.reward)
            .sum();
        let stakes: i64 = self
            .positions
            .values()
            .filter(|p| p.is_active())
            .map(|p| p.stake)
            .sum();
        balances + treasuries + hit_escrow + bounty_escrow + stakes
    }
}
